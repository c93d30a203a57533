//! Tabular inputs given inline or as delimited text files

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FEAError, FEAResult};

/// Row-oriented numeric data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Table {
    /// Path to a text file, one row per line
    File(PathBuf),
    /// Rows written directly in the configuration
    Inline(Vec<Vec<f64>>),
}

/// A single column of values, one per DOF
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnSource {
    /// Path to a text file, one value per line
    File(PathBuf),
    /// Values written directly in the configuration
    Inline(Vec<f64>),
}

/// `path` relative to `base_dir` unless already absolute
pub fn resolve(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// Parse delimited text: rows are lines, values are separated by commas,
/// spaces or tabs. Blank lines are skipped.
pub fn parse_delimited(text: &str, source: &str) -> FEAResult<Vec<Vec<f64>>> {
    let mut rows = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let row = line
            .split([',', ' ', '\t'])
            .filter(|token| !token.is_empty())
            .map(|token| {
                token.parse::<f64>().map_err(|_| {
                    FEAError::Config(format!(
                        "{}, line {}: cannot parse '{}' as a number",
                        source,
                        line_no + 1,
                        token
                    ))
                })
            })
            .collect::<FEAResult<Vec<f64>>>()?;
        rows.push(row);
    }

    Ok(rows)
}

fn read_file(base_dir: &Path, path: &Path, key: &str) -> FEAResult<Vec<Vec<f64>>> {
    let full_path = resolve(base_dir, path);
    let text = fs::read_to_string(&full_path).map_err(|e| {
        FEAError::Config(format!(
            "cannot read {} for '{}': {}",
            full_path.display(),
            key,
            e
        ))
    })?;

    let rows = parse_delimited(&text, &full_path.display().to_string())?;
    if rows.is_empty() {
        return Err(FEAError::Config(format!(
            "no data was loaded for '{}' from {}",
            key,
            full_path.display()
        )));
    }
    Ok(rows)
}

impl Table {
    /// Load the rows, reading the file if needed
    pub fn rows(&self, base_dir: &Path, key: &str) -> FEAResult<Vec<Vec<f64>>> {
        match self {
            Table::File(path) => read_file(base_dir, path, key),
            Table::Inline(rows) => Ok(rows.clone()),
        }
    }

    /// Same table with a file path resolved against `base_dir`
    pub fn resolved(&self, base_dir: &Path) -> Self {
        match self {
            Table::File(path) => Table::File(resolve(base_dir, path)),
            Table::Inline(_) => self.clone(),
        }
    }
}

impl ColumnSource {
    /// Load the values, reading the file if needed
    pub fn values(&self, base_dir: &Path, key: &str) -> FEAResult<Vec<f64>> {
        match self {
            ColumnSource::Inline(values) => Ok(values.clone()),
            ColumnSource::File(path) => read_file(base_dir, path, key)?
                .into_iter()
                .enumerate()
                .map(|(i, row)| match row.as_slice() {
                    [value] => Ok(*value),
                    _ => Err(FEAError::Config(format!(
                        "row {} of '{}' has {} values, expected one value per line",
                        i,
                        key,
                        row.len()
                    ))),
                })
                .collect(),
        }
    }

    pub fn resolved(&self, base_dir: &Path) -> Self {
        match self {
            ColumnSource::File(path) => ColumnSource::File(resolve(base_dir, path)),
            ColumnSource::Inline(_) => self.clone(),
        }
    }
}
