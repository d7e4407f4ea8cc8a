// MIT License
// Copyright (c) 2024 Graham King

use std::collections::HashSet;
use std::io;
use std::path::Path;

use crate::error::{DedupError, Result};

/// Header names accepted for the id column
pub const ID_COLUMNS: [&str; 2] = ["articleId", "article_id"];

#[derive(Debug, Default, PartialEq)]
pub struct IdList {
    /// Unique ids, in the order first seen
    pub ids: Vec<i64>,
    /// Cells that were not an integer
    pub rejected: Vec<Rejected>,
}

#[derive(Debug, PartialEq)]
pub struct Rejected {
    pub line: u64,
    pub value: String,
}

/// Read new article ids from a CSV file with a header row.
pub fn read(path: &Path) -> Result<IdList> {
    let file = std::fs::File::open(path).map_err(|err| malformed(path, err))?;
    parse(file, path)
}

pub fn parse<R: io::Read>(rdr: R, path: &Path) -> Result<IdList> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(rdr);

    let headers = reader.headers().map_err(|err| malformed(path, err))?;
    let Some(col) = headers.iter().position(|h| {
        let h = h.trim_start_matches('\u{feff}').trim();
        ID_COLUMNS.contains(&h)
    }) else {
        let found: Vec<&str> = headers.iter().collect();
        return Err(DedupError::MalformedIdFile {
            path: path.to_path_buf(),
            reason: format!("no '{}' column, found {found:?}", ID_COLUMNS[0]),
        });
    };

    let mut out = IdList::default();
    let mut seen = HashSet::new();
    for record in reader.records() {
        let record = record.map_err(|err| malformed(path, err))?;
        let Some(cell) = record.get(col).filter(|c| !c.is_empty()) else {
            continue;
        };
        match cell.parse::<i64>() {
            Ok(id) => {
                if seen.insert(id) {
                    out.ids.push(id);
                }
            }
            Err(_) => {
                let line = record.position().map(|p| p.line()).unwrap_or_default();
                tracing::warn!(line, value = cell, "not an article id, skipping");
                out.rejected.push(Rejected {
                    line,
                    value: cell.to_string(),
                });
            }
        }
    }
    Ok(out)
}

fn malformed(path: &Path, err: impl std::fmt::Display) -> DedupError {
    DedupError::MalformedIdFile {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(s: &str) -> Result<IdList> {
        parse(s.as_bytes(), Path::new("ids.csv"))
    }

    #[test]
    fn ids_in_order_without_duplicates() {
        let got = parse_str("articleId\n5\n3\n5\n\n7\n").unwrap();
        assert_eq!(got.ids, vec![5, 3, 7]);
        assert!(got.rejected.is_empty());
    }

    #[test]
    fn other_columns_and_bom() {
        let got = parse_str("\u{feff}title, articleId ,url\nA, 12 ,x\nB,13,y\n").unwrap();
        assert_eq!(got.ids, vec![12, 13]);
    }

    #[test]
    fn snake_case_header() {
        let got = parse_str("article_id\n1\n").unwrap();
        assert_eq!(got.ids, vec![1]);
    }

    #[test]
    fn bad_cells_rejected_individually() {
        let got = parse_str("articleId\n1\nabc\n2\n").unwrap();
        assert_eq!(got.ids, vec![1, 2]);
        assert_eq!(
            got.rejected,
            vec![Rejected {
                line: 3,
                value: "abc".to_string()
            }]
        );
    }

    #[test]
    fn missing_id_column() {
        let err = parse_str("id,url\n1,x\n").unwrap_err();
        assert!(matches!(err, DedupError::MalformedIdFile { .. }));
    }

    #[test]
    fn missing_file() {
        let err = read(Path::new("/nonexistent/ids.csv")).unwrap_err();
        assert!(matches!(err, DedupError::MalformedIdFile { .. }));
    }

    #[test]
    fn reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ids.csv");
        std::fs::write(&path, "articleId\n9\n8\n").unwrap();
        assert_eq!(read(&path).unwrap().ids, vec![9, 8]);
    }
}
