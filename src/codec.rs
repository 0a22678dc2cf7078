//! Physical encodings for the three collections: a JSON array document for
//! users, and a header-plus-delimited-rows table for attendance and grades.
//! The codec moves text; numeric fields are re-parsed by consumers.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

pub const DELIMITER: char = ',';

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("file not found")]
    NotFound,
    #[error("malformed content: {0}")]
    Malformed(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tabular {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Tabular {
    pub fn has_column(&self, name: &str) -> bool {
        self.header.iter().any(|h| h == name)
    }

    /// Value of `name` in `row`, by header position. None when the column is
    /// absent or the row is shorter than the header.
    pub fn field<'a>(&self, row: &'a [String], name: &str) -> Option<&'a str> {
        let idx = self.header.iter().position(|h| h == name)?;
        row.get(idx).map(|v| v.as_str())
    }
}

pub fn read_json_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, CodecError> {
    let text = read_text(path)?;
    serde_json::from_str(&text).map_err(|e| CodecError::Malformed(e.to_string()))
}

pub fn write_json_array<T: Serialize>(path: &Path, items: &[T]) -> Result<(), CodecError> {
    let text = serde_json::to_string_pretty(items)
        .map_err(|e| CodecError::Malformed(e.to_string()))?;
    std::fs::write(path, text)?;
    Ok(())
}

pub fn read_tabular(path: &Path) -> Result<Tabular, CodecError> {
    Ok(parse_tabular(&read_text(path)?))
}

pub fn parse_tabular(text: &str) -> Tabular {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let Some(first) = lines.next() else {
        return Tabular::default();
    };
    Tabular {
        header: split_row(first),
        rows: lines.map(split_row).collect(),
    }
}

/// Writes `rows` under the fixed `header`. The schema is validated before
/// anything touches the disk: every row must match the header width and no
/// value may contain the delimiter or a line break. An empty collection is a
/// no-op that reports success.
pub fn write_tabular(path: &Path, header: &[&str], rows: &[Vec<String>]) -> Result<(), CodecError> {
    if rows.is_empty() {
        return Ok(());
    }
    for (i, row) in rows.iter().enumerate() {
        if row.len() != header.len() {
            return Err(CodecError::Malformed(format!(
                "row {} has {} fields, schema has {}",
                i,
                row.len(),
                header.len()
            )));
        }
        for value in row {
            if value.contains(DELIMITER) || value.contains('\n') || value.contains('\r') {
                return Err(CodecError::Malformed(format!(
                    "row {} value {:?} contains a delimiter or line break",
                    i, value
                )));
            }
        }
    }

    let mut out = String::new();
    out.push_str(&header.join(","));
    out.push('\n');
    for row in rows {
        out.push_str(&row.join(","));
        out.push('\n');
    }
    std::fs::write(path, out)?;
    Ok(())
}

fn read_text(path: &Path) -> Result<String, CodecError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(CodecError::NotFound),
        Err(e) => Err(CodecError::Io(e)),
    }
}

fn split_row(line: &str) -> Vec<String> {
    line.split(DELIMITER).map(|v| v.trim().to_string()).collect()
}
