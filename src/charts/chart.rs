//! Chart Builder Module
//! Immutable chart specifications built by chained configuration calls.

use std::sync::Arc;

use crate::charts::encoding::{Aggregate, Encoding, FieldDef, FieldRef, FieldType, RepeatRef};
use crate::charts::mark::{MarkDef, MarkKind};
use crate::charts::transform::{Transform, WindowOp};
use crate::data::Dataset;
use crate::render::RenderError;

/// A single-view chart: one mark, one encoding, optional transforms.
///
/// Every builder method consumes the chart and returns a new one. Cloning is
/// cheap because the dataset is shared.
#[derive(Debug, Clone)]
pub struct Chart {
    data: Arc<Dataset>,
    mark: Option<MarkDef>,
    encoding: Encoding,
    transforms: Vec<Transform>,
    width: Option<u32>,
    height: Option<u32>,
    title: Option<String>,
    interactive: bool,
}

impl Chart {
    pub fn new(data: Arc<Dataset>) -> Self {
        Self {
            data,
            mark: None,
            encoding: Encoding::new(),
            transforms: Vec::new(),
            width: None,
            height: None,
            title: None,
            interactive: false,
        }
    }

    pub fn mark(mut self, mark: impl Into<MarkDef>) -> Self {
        self.mark = Some(mark.into());
        self
    }

    pub fn mark_bar(self) -> Self {
        self.mark(MarkKind::Bar)
    }

    pub fn mark_point(self) -> Self {
        self.mark(MarkKind::Point)
    }

    pub fn mark_circle(self) -> Self {
        self.mark(MarkKind::Circle)
    }

    pub fn mark_line(self) -> Self {
        self.mark(MarkKind::Line)
    }

    pub fn encode(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    /// Width and height in one call.
    pub fn properties(self, width: u32, height: u32) -> Self {
        self.width(width).height(height)
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Enable pan/zoom (scales bound to an interval selection).
    pub fn interactive(mut self) -> Self {
        self.interactive = true;
        self
    }

    pub fn transform(mut self, transform: Transform) -> Self {
        self.transforms.push(transform);
        self
    }

    pub fn transform_window(self, output: impl Into<String>, op: WindowOp) -> Self {
        self.transform(Transform::window(output, op))
    }

    pub fn transform_fold<I, S>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.transform(Transform::fold(fields))
    }

    pub fn transform_fold_as<I, S>(
        self,
        fields: I,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.transform(Transform::fold_as(fields, key, value))
    }

    /// Instantiate this chart once per (row, column) field pair.
    pub fn repeat<R, C, S>(self, row: R, column: C) -> RepeatChart
    where
        R: IntoIterator<Item = S>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RepeatChart {
            template: self,
            row: row.into_iter().map(Into::into).collect(),
            column: column.into_iter().map(Into::into).collect(),
        }
    }

    pub fn data(&self) -> &Arc<Dataset> {
        &self.data
    }

    pub fn mark_def(&self) -> Option<&MarkDef> {
        self.mark.as_ref()
    }

    pub fn encoding(&self) -> &Encoding {
        &self.encoding
    }

    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    pub fn view_width(&self) -> Option<u32> {
        self.width
    }

    pub fn view_height(&self) -> Option<u32> {
        self.height
    }

    pub fn view_title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Explicit type of `def`, else the type inferred from transforms and dataset columns.
    pub fn field_type(&self, def: &FieldDef) -> Option<FieldType> {
        if def.ty.is_some() {
            return def.ty;
        }
        if def.aggregate == Some(Aggregate::Count) {
            return Some(FieldType::Quantitative);
        }
        let name = def.field_name()?;
        // Later transforms shadow earlier ones and the source columns
        for transform in self.transforms.iter().rev() {
            match transform {
                Transform::Window { output, .. } if output == name => {
                    return Some(FieldType::Quantitative)
                }
                Transform::Fold { key, .. } if key == name => return Some(FieldType::Nominal),
                Transform::Fold { value, .. } if value == name => {
                    return Some(FieldType::Quantitative)
                }
                _ => {}
            }
        }
        self.data.column_kind(name).map(FieldType::from_kind)
    }

    /// Replace repeat references with concrete field names.
    pub fn resolve_repeat(&self, row: Option<&str>, column: Option<&str>) -> Result<Chart, RenderError> {
        let encoding = self.encoding.map_fields(|channel, def| {
            let Some(which) = def.repeat_ref() else {
                return Ok(def.clone());
            };
            let name = match which {
                RepeatRef::Row => row,
                RepeatRef::Column => column,
            };
            match name {
                Some(name) => Ok(FieldDef {
                    field: Some(FieldRef::Name(name.to_string())),
                    ..def.clone()
                }),
                None => Err(RenderError::UnresolvedRepeat { channel, which }),
            }
        })?;
        Ok(Chart {
            encoding,
            ..self.clone()
        })
    }
}

/// One chart instance of a repeat grid.
#[derive(Debug, Clone)]
pub struct RepeatCell {
    pub row: Option<String>,
    pub column: Option<String>,
    pub chart: Chart,
}

/// Encoding template instantiated across row x column field lists.
#[derive(Debug, Clone)]
pub struct RepeatChart {
    template: Chart,
    row: Vec<String>,
    column: Vec<String>,
}

impl RepeatChart {
    pub fn interactive(mut self) -> Self {
        self.template = self.template.interactive();
        self
    }

    pub fn template(&self) -> &Chart {
        &self.template
    }

    pub fn rows(&self) -> &[String] {
        &self.row
    }

    pub fn columns(&self) -> &[String] {
        &self.column
    }

    /// Grid shape as (rows, columns). An empty list counts as one unrepeated track.
    pub fn grid_shape(&self) -> (usize, usize) {
        (self.row.len().max(1), self.column.len().max(1))
    }

    /// Row-major cells, one per (row, column) pair.
    pub fn cells(&self) -> Result<Vec<RepeatCell>, RenderError> {
        if self.row.is_empty() && self.column.is_empty() {
            return Err(RenderError::EmptyRepeat);
        }
        let rows: Vec<Option<&str>> = if self.row.is_empty() {
            vec![None]
        } else {
            self.row.iter().map(|r| Some(r.as_str())).collect()
        };
        let columns: Vec<Option<&str>> = if self.column.is_empty() {
            vec![None]
        } else {
            self.column.iter().map(|c| Some(c.as_str())).collect()
        };

        let mut cells = Vec::with_capacity(rows.len() * columns.len());
        for row in &rows {
            for column in &columns {
                cells.push(RepeatCell {
                    row: row.map(str::to_string),
                    column: column.map(str::to_string),
                    chart: self.template.resolve_repeat(*row, *column)?,
                });
            }
        }
        Ok(cells)
    }
}
