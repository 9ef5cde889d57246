//! Dataset Module
//! Immutable in-memory table shared by every chart built over it.

use polars::prelude::*;
use serde_json::{Map, Number, Value};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::loader::LoaderError;

/// A single row, keyed by column header.
pub type Record = Map<String, Value>;

/// Column typing inferred by the CSV reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Boolean,
    Temporal,
    Text,
}

impl ColumnKind {
    fn from_dtype(dtype: &DataType) -> Self {
        match dtype {
            DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64 => ColumnKind::Numeric,
            DataType::Boolean => ColumnKind::Boolean,
            DataType::Date | DataType::Datetime(_, _) | DataType::Time => ColumnKind::Temporal,
            _ => ColumnKind::Text,
        }
    }
}

/// Table loaded once and never mutated afterwards.
///
/// Charts hold it behind an `Arc`, so building a chart never copies rows.
#[derive(Debug, Clone)]
pub struct Dataset {
    frame: DataFrame,
    columns: Vec<String>,
    kinds: HashMap<String, ColumnKind>,
    records: Vec<Record>,
    name: String,
    source: Option<PathBuf>,
}

impl Dataset {
    /// Wrap an already materialized DataFrame.
    pub fn from_frame(frame: DataFrame) -> Result<Self, LoaderError> {
        let columns: Vec<String> = frame
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let kinds = frame
            .get_columns()
            .iter()
            .map(|col| (col.name().to_string(), ColumnKind::from_dtype(col.dtype())))
            .collect();

        let mut records = Vec::with_capacity(frame.height());
        for i in 0..frame.height() {
            let mut record = Record::new();
            for col in frame.get_columns() {
                record.insert(col.name().to_string(), any_to_json(col.get(i)?));
            }
            records.push(record);
        }

        let digest = Sha256::digest(serde_json::to_vec(&records)?);
        let hash = format!("{:x}", digest);
        let name = format!("data-{}", &hash[..32]);

        Ok(Self {
            frame,
            columns,
            kinds,
            records,
            name,
            source: None,
        })
    }

    pub(crate) fn with_source(mut self, path: &Path) -> Self {
        self.source = Some(path.to_path_buf());
        self
    }

    /// Column headers in file order.
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    /// Exact header match.
    pub fn has_field(&self, field: &str) -> bool {
        self.kinds.contains_key(field)
    }

    pub fn column_kind(&self, field: &str) -> Option<ColumnKind> {
        self.kinds.get(field).copied()
    }

    /// Number of data rows (header excluded).
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Values of one column in row order.
    pub fn values(&self, field: &str) -> Option<Vec<&Value>> {
        if !self.has_field(field) {
            return None;
        }
        Some(
            self.records
                .iter()
                .map(|r| r.get(field).unwrap_or(&Value::Null))
                .collect(),
        )
    }

    /// Content-derived name used when the rows are inlined into a spec.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

fn any_to_json(value: AnyValue<'_>) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => Value::Bool(b),
        AnyValue::Int8(v) => Value::from(v),
        AnyValue::Int16(v) => Value::from(v),
        AnyValue::Int32(v) => Value::from(v),
        AnyValue::Int64(v) => Value::from(v),
        AnyValue::UInt8(v) => Value::from(v),
        AnyValue::UInt16(v) => Value::from(v),
        AnyValue::UInt32(v) => Value::from(v),
        AnyValue::UInt64(v) => Value::from(v),
        AnyValue::Float32(v) => float_to_json(v as f64),
        AnyValue::Float64(v) => float_to_json(v),
        AnyValue::String(s) => Value::String(s.to_string()),
        AnyValue::StringOwned(s) => Value::String(s.to_string()),
        other => Value::String(other.to_string().trim_matches('"').to_string()),
    }
}

// NaN and infinities have no JSON form.
fn float_to_json(v: f64) -> Value {
    Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null)
}
