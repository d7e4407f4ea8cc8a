// MIT License
// Copyright (c) 2024 Graham King

use crate::metric::embedding::Embed;

pub const EMBED_MODEL: &str = "text-embedding-3-small";
const EMBED_URL: &str = "https://api.openai.com/v1/embeddings";

// Keeps input under the API's 8191 token limit
const MAX_INPUT_CHARS: usize = 24_000;

#[derive(Debug, serde::Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, serde::Deserialize)]
struct EmbedResponse {
    data: Vec<Embedding>,
}

#[derive(Debug, serde::Deserialize)]
struct Embedding {
    embedding: Vec<f64>,
}

/// OpenAI embeddings over blocking HTTP. Each call costs money.
pub struct Embedder {
    api_key: String,
    model: String,
    client: reqwest::blocking::Client,
}

impl Embedder {
    pub fn new(api_key: String, model: &str) -> Embedder {
        Embedder {
            api_key,
            model: model.to_string(),
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl Embed for Embedder {
    fn embed(&mut self, text: &str) -> anyhow::Result<Vec<f64>> {
        let input = truncate(text, MAX_INPUT_CHARS);
        let req = EmbedRequest {
            model: &self.model,
            input,
        };
        let res = self
            .client
            .post(EMBED_URL)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()?;
        if res.status() != http::StatusCode::OK {
            return Err(anyhow::anyhow!("HTTP error {}", res.status()));
        }
        let mut out: EmbedResponse = res.json()?;
        if out.data.is_empty() {
            anyhow::bail!("empty embedding response");
        }
        Ok(out.data.remove(0).embedding)

        /* Example response
        {
          "object": "list",
          "data": [
            {
              "object": "embedding",
              "index": 0,
              "embedding": [
                -0.006929283495992422,
                ... (omitted for spacing)
                -0.024047505110502243
              ],
            }
          ],
          "model": "text-embedding-3-small",
          "usage": {
            "prompt_tokens": 5,
            "total_tokens": 5
          }
        }
        */
    }
}

// Cut on a char boundary
fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::truncate;

    #[test]
    fn truncate_on_char_boundary() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("short", 100), "short");
        assert_eq!(truncate("", 3), "");
    }

    #[test]
    fn request_shape() {
        let req = super::EmbedRequest {
            model: super::EMBED_MODEL,
            input: "hello",
        };
        assert_eq!(
            serde_json::to_string(&req).unwrap(),
            r#"{"model":"text-embedding-3-small","input":"hello"}"#
        );
    }
}
