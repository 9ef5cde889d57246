//! Transform Module
//! Per-chart reshaping of the row view (window, fold).
//!
//! Transforms operate on a copy of the rows handed to them; the dataset a
//! chart was built from is never touched.

use serde_json::{json, Value};

use crate::data::Record;
use crate::render::RenderError;

/// Window operation deriving a per-row value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowOp {
    /// Running count over the unsorted frame, i.e. 1..=n.
    Count,
    RowNumber,
}

impl WindowOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            WindowOp::Count => "count",
            WindowOp::RowNumber => "row_number",
        }
    }

    /// Parse `"count()"` style shorthand.
    pub fn parse(shorthand: &str) -> Option<Self> {
        match shorthand.trim().trim_end_matches("()") {
            "count" => Some(WindowOp::Count),
            "row_number" => Some(WindowOp::RowNumber),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Transform {
    Window {
        op: WindowOp,
        output: String,
    },
    Fold {
        fields: Vec<String>,
        key: String,
        value: String,
    },
}

impl Transform {
    pub fn window(output: impl Into<String>, op: WindowOp) -> Self {
        Transform::Window {
            op,
            output: output.into(),
        }
    }

    pub fn fold<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::fold_as(fields, "key", "value")
    }

    pub fn fold_as<I, S>(fields: I, key: impl Into<String>, value: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Transform::Fold {
            fields: fields.into_iter().map(Into::into).collect(),
            key: key.into(),
            value: value.into(),
        }
    }

    /// Fields this transform reads from its input.
    pub fn input_fields(&self) -> &[String] {
        match self {
            Transform::Window { .. } => &[],
            Transform::Fold { fields, .. } => fields,
        }
    }

    /// Field names visible after this transform, given those visible before.
    pub fn output_fields(&self, fields: &mut Vec<String>) {
        let derived: Vec<&String> = match self {
            Transform::Window { output, .. } => vec![output],
            Transform::Fold { key, value, .. } => vec![key, value],
        };
        for name in derived {
            if !fields.contains(name) {
                fields.push(name.clone());
            }
        }
    }

    /// Check inputs against the fields visible at this point.
    pub fn validate(&self, fields: &[String]) -> Result<(), RenderError> {
        for name in self.input_fields() {
            if !fields.contains(name) {
                return Err(RenderError::UnknownField {
                    context: "fold transform".to_string(),
                    field: name.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn apply(&self, rows: Vec<Record>) -> Vec<Record> {
        match self {
            Transform::Window { output, .. } => rows
                .into_iter()
                .enumerate()
                .map(|(i, mut row)| {
                    row.insert(output.clone(), Value::from(i as u64 + 1));
                    row
                })
                .collect(),
            Transform::Fold { fields, key, value } => {
                let mut out = Vec::with_capacity(rows.len() * fields.len());
                for row in &rows {
                    for name in fields {
                        let mut folded = row.clone();
                        let v = row.get(name).cloned().unwrap_or(Value::Null);
                        folded.insert(key.clone(), Value::from(name.as_str()));
                        folded.insert(value.clone(), v);
                        out.push(folded);
                    }
                }
                out
            }
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Transform::Window { op, output } => {
                json!({"window": [{"op": op.as_str(), "as": output}]})
            }
            Transform::Fold { fields, key, value } => {
                if key == "key" && value == "value" {
                    json!({"fold": fields})
                } else {
                    json!({"fold": fields, "as": [key, value]})
                }
            }
        }
    }
}
