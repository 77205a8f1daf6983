//! Load the claims dataset from delimited text
//!
//! One header row supplies column names; every following row is data. The
//! canonical delimiter is `|`; tab is available for exports that use it.

use super::frame::{Column, Dataset};
use super::value::Value;
use crate::error::{AnalyticsError, Result};
use log::info;
use std::path::Path;

/// Field delimiter of the input file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delimiter {
    /// Pipe-separated (`|`), the canonical claims export format
    #[default]
    Pipe,
    /// Tab-separated
    Tab,
}

impl Delimiter {
    fn as_byte(self) -> u8 {
        match self {
            Delimiter::Pipe => b'|',
            Delimiter::Tab => b'\t',
        }
    }
}

/// Loader configuration
#[derive(Debug, Clone, Default)]
pub struct LoaderOptions {
    pub delimiter: Delimiter,
}

/// Load a delimited claims file into a dataset.
///
/// Cell types are inferred per field (integer, float, bool, text; empty
/// fields become null). A row with the wrong field count is an error; there
/// is no partial-load recovery.
pub fn load_claims<P: AsRef<Path>>(path: P, options: &LoaderOptions) -> Result<Dataset> {
    let path = path.as_ref();
    let reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter.as_byte())
        .from_path(path)
        .map_err(|source| AnalyticsError::DataLoad {
            path: path.to_path_buf(),
            source,
        })?;

    let dataset = read_rows(reader, path)?;
    info!(
        "loaded {} rows x {} columns from {}",
        dataset.n_rows(),
        dataset.n_columns(),
        path.display()
    );
    Ok(dataset)
}

/// Load claims from any reader (e.g. a string buffer in tests).
pub fn load_claims_from_reader<R: std::io::Read>(
    reader: R,
    options: &LoaderOptions,
) -> Result<Dataset> {
    let csv_reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter.as_byte())
        .from_reader(reader);
    read_rows(csv_reader, Path::new("<reader>"))
}

fn read_rows<R: std::io::Read>(mut reader: csv::Reader<R>, path: &Path) -> Result<Dataset> {
    let wrap = |source: csv::Error| AnalyticsError::DataLoad {
        path: path.to_path_buf(),
        source,
    };

    let headers: Vec<String> = reader
        .headers()
        .map_err(wrap)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut columns: Vec<Vec<Value>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record.map_err(wrap)?;
        for (idx, field) in record.iter().enumerate() {
            columns[idx].push(Value::infer(field));
        }
    }

    Dataset::new(
        headers
            .into_iter()
            .zip(columns)
            .map(|(name, values)| Column::new(name, values))
            .collect(),
    )
}
