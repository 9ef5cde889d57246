//! Mark Module
//! Geometric primitives and their default geometry.

use serde_json::{json, Map, Value};

/// Primitive used to draw each row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkKind {
    Bar,
    Point,
    Circle,
    Line,
}

impl MarkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkKind::Bar => "bar",
            MarkKind::Point => "point",
            MarkKind::Circle => "circle",
            MarkKind::Line => "line",
        }
    }

    pub fn default_opacity(&self) -> f64 {
        match self {
            MarkKind::Point | MarkKind::Circle => 0.7,
            MarkKind::Bar | MarkKind::Line => 1.0,
        }
    }

    /// Symbol area in square pixels.
    pub fn default_size(&self) -> f64 {
        30.0
    }

    /// `point` is drawn hollow unless `filled` is set.
    pub fn default_filled(&self) -> bool {
        !matches!(self, MarkKind::Point)
    }
}

/// Mark type plus optional constant properties.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkDef {
    pub kind: MarkKind,
    pub color: Option<String>,
    pub opacity: Option<f64>,
    pub size: Option<f64>,
    pub stroke_width: Option<f64>,
    pub filled: Option<bool>,
}

impl MarkDef {
    pub fn new(kind: MarkKind) -> Self {
        Self {
            kind,
            color: None,
            opacity: None,
            size: None,
            stroke_width: None,
            filled: None,
        }
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn stroke_width(mut self, width: f64) -> Self {
        self.stroke_width = Some(width);
        self
    }

    pub fn filled(mut self, filled: bool) -> Self {
        self.filled = Some(filled);
        self
    }

    pub fn effective_opacity(&self) -> f64 {
        self.opacity.unwrap_or_else(|| self.kind.default_opacity())
    }

    pub fn effective_size(&self) -> f64 {
        self.size.unwrap_or_else(|| self.kind.default_size())
    }

    pub fn effective_filled(&self) -> bool {
        self.filled.unwrap_or_else(|| self.kind.default_filled())
    }

    pub fn effective_stroke_width(&self) -> f64 {
        self.stroke_width.unwrap_or(2.0)
    }

    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("type".into(), json!(self.kind.as_str()));
        if let Some(color) = &self.color {
            obj.insert("color".into(), json!(color));
        }
        if let Some(opacity) = self.opacity {
            obj.insert("opacity".into(), json!(opacity));
        }
        if let Some(size) = self.size {
            obj.insert("size".into(), json!(size));
        }
        if let Some(width) = self.stroke_width {
            obj.insert("strokeWidth".into(), json!(width));
        }
        if let Some(filled) = self.filled {
            obj.insert("filled".into(), json!(filled));
        }
        Value::Object(obj)
    }
}

impl From<MarkKind> for MarkDef {
    fn from(kind: MarkKind) -> Self {
        MarkDef::new(kind)
    }
}
