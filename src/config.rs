// MIT License
// Copyright (c) 2024 Graham King

use std::path::PathBuf;

use anyhow::Context;

/// Where the database lives. Either a full path, or the directory and file name
/// pair the ingestion system's `.env` uses.
#[derive(clap::Args, Debug)]
pub struct DbArgs {
    /// Path to the sqlite database holding the article tables
    #[arg(long, value_name = "PATH", env = "DEDUP_DB_PATH", global = true)]
    db_path: Option<PathBuf>,

    /// Directory of the database, joined with --database-name
    #[arg(long, value_name = "DIR", env = "PATH_TO_DATABASE", global = true)]
    database_dir: Option<PathBuf>,

    /// File name of the database inside --database-dir
    #[arg(long, value_name = "NAME", env = "NAME_DB", global = true)]
    database_name: Option<String>,
}

impl DbArgs {
    pub fn resolve(&self) -> anyhow::Result<PathBuf> {
        let path = match (&self.db_path, &self.database_dir, &self.database_name) {
            (Some(p), _, _) => p.clone(),
            (None, Some(dir), Some(name)) => dir.join(name),
            _ => anyhow::bail!(
                "No database configured, pass --db-path or set PATH_TO_DATABASE and NAME_DB"
            ),
        };
        // The article tables come from elsewhere, never create an empty database
        let meta = std::fs::metadata(&path)
            .with_context(|| format!("database {}", path.display()))?;
        if !meta.is_file() {
            anyhow::bail!("database {} is not a file", path.display());
        }
        Ok(path)
    }
}

/// Everything a command needs, resolved once in main.
#[derive(Debug)]
pub struct Config {
    pub db_path: PathBuf,
    /// CSV of new article ids
    pub csv_path: Option<PathBuf>,
    /// Overrides each command's default
    pub batch_size: Option<usize>,
    pub openai_api_key: Option<String>,
    pub embedding_model: String,
}

impl Config {
    pub fn batch_size_or(&self, default: usize) -> usize {
        self.batch_size.unwrap_or(default)
    }

    #[cfg(test)]
    pub fn for_tests() -> Config {
        Config {
            db_path: PathBuf::from("test.db"),
            csv_path: None,
            batch_size: None,
            openai_api_key: None,
            embedding_model: crate::openai::EMBED_MODEL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(db_path: Option<PathBuf>, dir: Option<PathBuf>, name: Option<&str>) -> DbArgs {
        DbArgs {
            db_path,
            database_dir: dir,
            database_name: name.map(String::from),
        }
    }

    #[test]
    fn explicit_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.db");
        std::fs::write(&file, b"").unwrap();
        let got = args(Some(file.clone()), Some(dir.path().into()), Some("b.db"))
            .resolve()
            .unwrap();
        assert_eq!(got, file);
    }

    #[test]
    fn dir_and_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("news.db"), b"").unwrap();
        let got = args(None, Some(dir.path().into()), Some("news.db"))
            .resolve()
            .unwrap();
        assert_eq!(got, dir.path().join("news.db"));
    }

    #[test]
    fn missing_database() {
        let dir = tempfile::tempdir().unwrap();
        assert!(args(None, None, None).resolve().is_err());
        assert!(args(None, Some(dir.path().into()), None).resolve().is_err());
        assert!(args(Some(dir.path().join("nope.db")), None, None)
            .resolve()
            .is_err());
        assert!(args(Some(dir.path().into()), None, None).resolve().is_err());
    }

    #[test]
    fn batch_size_default() {
        let mut cfg = Config::for_tests();
        assert_eq!(cfg.batch_size_or(1000), 1000);
        cfg.batch_size = Some(50);
        assert_eq!(cfg.batch_size_or(1000), 50);
    }
}
