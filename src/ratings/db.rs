// MIT License
// Copyright (c) 2024 Graham King

// One row per (new, approved) pair. Score columns start NULL, each is owned by a
// single metric. Columns for metrics added later are appended by `ensure_columns`.
pub const CREATE_RATINGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS ArticleDuplicateRatings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    articleIdNew INTEGER NOT NULL,
    articleIdApproved INTEGER NOT NULL,
    urlCheck REAL NULL,
    contentHash REAL NULL,
    embeddingSearch REAL NULL,
    createdAt DATETIME NOT NULL,
    updatedAt DATETIME NOT NULL,
    UNIQUE (articleIdNew, articleIdApproved)
)
"#;

pub const CREATE_APPROVED_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_duplicate_ratings_approved
    ON ArticleDuplicateRatings (articleIdApproved)
"#;

pub const INSERT_PAIR: &str = r#"
INSERT OR IGNORE INTO ArticleDuplicateRatings
    (articleIdNew, articleIdApproved, createdAt, updatedAt)
VALUES (?1, ?2, ?3, ?3)
"#;

pub const COUNT_PAIRED_WITH_POOL: &str = r#"
SELECT COUNT(*) FROM ArticleDuplicateRatings r
WHERE r.articleIdNew = ?1
  AND r.articleIdApproved IN (SELECT articleId FROM ArticleApproveds)
"#;

// Tables owned by the ingestion system, only read here
pub const REQUIRED_TABLES: [&str; 2] = ["Articles", "ArticleApproveds"];
