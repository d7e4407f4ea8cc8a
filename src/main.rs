// MIT License
// Copyright (c) 2024 Graham King

use std::env;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod article;
mod canonical_url;
mod commands;
mod config;
mod error;
mod id_file;
mod metric;
mod normalize;
mod openai;
mod pairs;
mod ratings;
mod status;
mod timing;

#[cfg(test)]
mod test_support;

#[derive(Parser)]
#[command(about = "Score new news articles against approved ones to find likely duplicates")]
struct Cli {
    #[command(flatten)]
    db: config::DbArgs,

    /// Rows per transaction (default 1000, 500 for embeddingsearch)
    #[arg(long, env = "DEDUP_BATCH_SIZE", global = true)]
    batch_size: Option<usize>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show pair counts and how far each metric has got
    Status {
        /// CSV of new article ids, to count those not paired yet
        #[arg(long, value_name = "PATH", env = "PATH_TO_CSV")]
        csv_path: Option<PathBuf>,
        /// Print as JSON
        #[clap(long)]
        json: bool,
    },

    /// 1. Pair every article id in a CSV (column articleId) with every approved article
    Load {
        /// CSV of new article ids
        #[arg(long, value_name = "PATH", env = "PATH_TO_CSV")]
        csv_path: Option<PathBuf>,
        /// Re-derive pairs even for ids already paired with the whole pool.
        /// Existing pairs and their scores are never touched.
        #[clap(long)]
        force: bool,
    },

    /// Delete every pair and all their scores
    Reset {
        /// Required, nothing happens without it
        #[clap(long)]
        confirm: bool,
    },

    /// 2. Score pairs whose canonical URLs are identical
    Urlcheck {
        /// Recompute every pair, not only those without a score
        #[clap(long)]
        force: bool,
    },

    /// 3. Score pairs whose normalized headline and body are identical
    Contenthash {
        /// Recompute every pair, not only those without a score
        #[clap(long)]
        force: bool,
    },

    /// 4. Score pairs by embedding similarity. Calls OpenAI's embedding API, which
    ///    costs money and needs OPENAI_API_KEY.
    Embeddingsearch {
        /// Recompute every pair, not only those without a score
        #[clap(long)]
        force: bool,
        /// Embedding model
        #[arg(long, default_value = openai::EMBED_MODEL)]
        model: String,
    },
}

fn main() -> anyhow::Result<()> {
    // Logs on stderr, command summaries on stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let (csv_path, embedding_model) = match &cli.command {
        Commands::Status { csv_path, .. } | Commands::Load { csv_path, .. } => {
            (csv_path.clone(), openai::EMBED_MODEL.to_string())
        }
        Commands::Embeddingsearch { model, .. } => (None, model.clone()),
        _ => (None, openai::EMBED_MODEL.to_string()),
    };
    let cfg = config::Config {
        db_path: cli.db.resolve()?,
        csv_path,
        batch_size: cli.batch_size,
        openai_api_key: env::var("OPENAI_API_KEY").ok(),
        embedding_model,
    };

    match cli.command {
        Commands::Status { json, .. } => commands::do_status(&cfg, json),
        Commands::Load { force, .. } => commands::do_load(&cfg, force),
        Commands::Reset { confirm } => commands::do_reset(&cfg, confirm),
        Commands::Urlcheck { force } => commands::do_metric(&cfg, &metric::URL_CHECK, force),
        Commands::Contenthash { force } => {
            commands::do_metric(&cfg, &metric::CONTENT_HASH, force)
        }
        Commands::Embeddingsearch { force, .. } => {
            commands::do_metric(&cfg, &metric::EMBEDDING_SEARCH, force)
        }
    }
}
