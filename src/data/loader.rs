//! CSV Data Loader Module
//! Handles CSV file loading using Polars.

use log::info;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::Dataset;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("CSV file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Failed to parse CSV: {0}")]
    Parse(#[from] PolarsError),
    #[error("No data loaded")]
    NoData,
    #[error("Failed to encode rows: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Handles CSV file loading with Polars.
#[derive(Debug, Clone)]
pub struct DataLoader {
    infer_schema_length: Option<usize>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self {
            infer_schema_length: Some(10000),
        }
    }

    /// Number of rows inspected to infer column types. `None` scans the whole file.
    pub fn with_infer_schema_length(mut self, rows: Option<usize>) -> Self {
        self.infer_schema_length = rows;
        self
    }

    /// Load a CSV file with a header row.
    pub fn load_csv(&self, file_path: impl AsRef<Path>) -> Result<Dataset, LoaderError> {
        let path = file_path.as_ref();
        if !path.is_file() {
            return Err(LoaderError::NotFound(path.to_path_buf()));
        }

        // Malformed rows must surface, so errors are not ignored here
        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(self.infer_schema_length)
            .finish()
            .and_then(|lazy| lazy.collect())
            .map_err(|e| match e {
                PolarsError::NoData(_) => LoaderError::NoData,
                other => LoaderError::Parse(other),
            })?;

        info!(
            "Loaded {} rows, {} columns from {}",
            df.height(),
            df.width(),
            path.display()
        );

        Ok(Dataset::from_frame(df)?.with_source(path))
    }
}
