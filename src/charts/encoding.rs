//! Encoding Module
//! Channel-to-field bindings, type hints and shorthand parsing.

use serde_json::Value;

use crate::data::ColumnKind;

/// Visual channels a mark can vary along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channel {
    X,
    Y,
    Color,
    Size,
    Tooltip,
    Opacity,
    Detail,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::X => "x",
            Channel::Y => "y",
            Channel::Color => "color",
            Channel::Size => "size",
            Channel::Tooltip => "tooltip",
            Channel::Opacity => "opacity",
            Channel::Detail => "detail",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Measurement type of an encoded field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Quantitative,
    Nominal,
    Ordinal,
    Temporal,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Quantitative => "quantitative",
            FieldType::Nominal => "nominal",
            FieldType::Ordinal => "ordinal",
            FieldType::Temporal => "temporal",
        }
    }

    /// Accepts shorthand codes (`Q`, `N`, `O`, `T`) and full names.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "q" | "quantitative" => Some(FieldType::Quantitative),
            "n" | "nominal" => Some(FieldType::Nominal),
            "o" | "ordinal" => Some(FieldType::Ordinal),
            "t" | "temporal" => Some(FieldType::Temporal),
            _ => None,
        }
    }

    pub fn from_kind(kind: ColumnKind) -> Self {
        match kind {
            ColumnKind::Numeric => FieldType::Quantitative,
            ColumnKind::Temporal => FieldType::Temporal,
            ColumnKind::Boolean | ColumnKind::Text => FieldType::Nominal,
        }
    }

    pub fn is_discrete(&self) -> bool {
        matches!(self, FieldType::Nominal | FieldType::Ordinal)
    }
}

/// Aggregation applied before encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Count,
    Sum,
    Mean,
    Median,
    Min,
    Max,
}

impl Aggregate {
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregate::Count => "count",
            Aggregate::Sum => "sum",
            Aggregate::Mean => "mean",
            Aggregate::Median => "median",
            Aggregate::Min => "min",
            Aggregate::Max => "max",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "count" => Some(Aggregate::Count),
            "sum" => Some(Aggregate::Sum),
            "mean" | "average" => Some(Aggregate::Mean),
            "median" => Some(Aggregate::Median),
            "min" => Some(Aggregate::Min),
            "max" => Some(Aggregate::Max),
            _ => None,
        }
    }
}

/// Which repeat list a templated field is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatRef {
    Row,
    Column,
}

impl RepeatRef {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepeatRef::Row => "row",
            RepeatRef::Column => "column",
        }
    }
}

impl std::fmt::Display for RepeatRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldRef {
    Name(String),
    Repeat(RepeatRef),
}

/// Scale customization for a field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scale {
    pub scheme: Option<String>,
    pub zero: Option<bool>,
}

impl Scale {
    pub fn new() -> Self {
        Self::default()
    }

    /// Named color scheme, e.g. `spectral` or `magma`.
    pub fn scheme(name: impl Into<String>) -> Self {
        Self {
            scheme: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn zero(mut self, zero: bool) -> Self {
        self.zero = Some(zero);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.scheme.is_none() && self.zero.is_none()
    }
}

/// A field binding with optional type hint, aggregate and scale.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub field: Option<FieldRef>,
    pub ty: Option<FieldType>,
    pub aggregate: Option<Aggregate>,
    pub scale: Option<Scale>,
    pub title: Option<String>,
}

impl FieldDef {
    /// Parse a shorthand such as `"Region"`, `"key:N"` or `"count()"`.
    pub fn new(shorthand: &str) -> Self {
        parse_shorthand(shorthand)
    }

    pub fn repeat(which: RepeatRef) -> Self {
        Self {
            field: Some(FieldRef::Repeat(which)),
            ty: None,
            aggregate: None,
            scale: None,
            title: None,
        }
    }

    pub fn ty(mut self, ty: FieldType) -> Self {
        self.ty = Some(ty);
        self
    }

    pub fn aggregate(mut self, aggregate: Aggregate) -> Self {
        self.aggregate = Some(aggregate);
        self
    }

    pub fn scale(mut self, scale: Scale) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Concrete field name, `None` for `count()` and unresolved repeats.
    pub fn field_name(&self) -> Option<&str> {
        match &self.field {
            Some(FieldRef::Name(name)) => Some(name),
            _ => None,
        }
    }

    pub fn repeat_ref(&self) -> Option<RepeatRef> {
        match &self.field {
            Some(FieldRef::Repeat(which)) => Some(*which),
            _ => None,
        }
    }

    /// Name of the value this definition produces in the row view.
    pub fn output_name(&self) -> String {
        match (self.aggregate, self.field_name()) {
            (Some(Aggregate::Count), _) => "__count".to_string(),
            (Some(agg), Some(name)) => format!("{}_{}", agg.as_str(), name),
            (None, Some(name)) => name.to_string(),
            (Some(agg), None) => agg.as_str().to_string(),
            (None, None) => String::new(),
        }
    }

    /// Default axis/legend title.
    pub fn display_title(&self) -> String {
        if let Some(title) = &self.title {
            return title.clone();
        }
        match (self.aggregate, self.field_name()) {
            (Some(Aggregate::Count), _) => "Count of Records".to_string(),
            (Some(agg), Some(name)) => {
                let op = agg.as_str();
                format!("{}{} of {}", op[..1].to_ascii_uppercase(), &op[1..], name)
            }
            (_, Some(name)) => name.to_string(),
            _ => String::new(),
        }
    }
}

/// Binding for a single channel: a field or a literal constant.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelDef {
    Field(FieldDef),
    Value(Value),
}

impl ChannelDef {
    pub fn as_field(&self) -> Option<&FieldDef> {
        match self {
            ChannelDef::Field(def) => Some(def),
            ChannelDef::Value(_) => None,
        }
    }
}

impl From<&str> for ChannelDef {
    fn from(shorthand: &str) -> Self {
        ChannelDef::Field(FieldDef::new(shorthand))
    }
}

impl From<String> for ChannelDef {
    fn from(shorthand: String) -> Self {
        ChannelDef::Field(FieldDef::new(&shorthand))
    }
}

impl From<FieldDef> for ChannelDef {
    fn from(def: FieldDef) -> Self {
        ChannelDef::Field(def)
    }
}

impl From<&str> for FieldDef {
    fn from(shorthand: &str) -> Self {
        FieldDef::new(shorthand)
    }
}

impl From<String> for FieldDef {
    fn from(shorthand: String) -> Self {
        FieldDef::new(&shorthand)
    }
}

/// Field binding from shorthand.
pub fn field(shorthand: &str) -> FieldDef {
    FieldDef::new(shorthand)
}

/// Literal constant for a channel, e.g. `value(0.5)` for opacity.
pub fn value(v: impl Into<Value>) -> ChannelDef {
    ChannelDef::Value(v.into())
}

/// Field taken from the enclosing repeat's row or column list.
pub fn repeat(which: RepeatRef) -> FieldDef {
    FieldDef::repeat(which)
}

fn parse_shorthand(shorthand: &str) -> FieldDef {
    let (body, ty) = match shorthand.rsplit_once(':') {
        Some((body, code)) => match FieldType::from_code(code) {
            Some(ty) => (body, Some(ty)),
            None => (shorthand, None),
        },
        None => (shorthand, None),
    };

    let mut def = FieldDef {
        field: Some(FieldRef::Name(body.to_string())),
        ty,
        aggregate: None,
        scale: None,
        title: None,
    };

    if let Some(open) = body.find('(') {
        if body.ends_with(')') {
            if let Some(agg) = Aggregate::from_name(&body[..open]) {
                let inner = &body[open + 1..body.len() - 1];
                def.aggregate = Some(agg);
                def.field = if inner.is_empty() {
                    None
                } else {
                    Some(FieldRef::Name(inner.to_string()))
                };
                if agg == Aggregate::Count && def.ty.is_none() {
                    def.ty = Some(FieldType::Quantitative);
                }
            }
        }
    }

    def
}

/// Channel bindings of one chart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Encoding {
    pub x: Option<ChannelDef>,
    pub y: Option<ChannelDef>,
    pub color: Option<ChannelDef>,
    pub size: Option<ChannelDef>,
    pub opacity: Option<ChannelDef>,
    pub detail: Option<ChannelDef>,
    pub tooltip: Vec<FieldDef>,
}

impl Encoding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn x(mut self, def: impl Into<ChannelDef>) -> Self {
        self.x = Some(def.into());
        self
    }

    pub fn y(mut self, def: impl Into<ChannelDef>) -> Self {
        self.y = Some(def.into());
        self
    }

    pub fn color(mut self, def: impl Into<ChannelDef>) -> Self {
        self.color = Some(def.into());
        self
    }

    pub fn size(mut self, def: impl Into<ChannelDef>) -> Self {
        self.size = Some(def.into());
        self
    }

    pub fn opacity(mut self, def: impl Into<ChannelDef>) -> Self {
        self.opacity = Some(def.into());
        self
    }

    pub fn detail(mut self, def: impl Into<ChannelDef>) -> Self {
        self.detail = Some(def.into());
        self
    }

    pub fn tooltip<I, F>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<FieldDef>,
    {
        self.tooltip = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn get(&self, channel: Channel) -> Option<&ChannelDef> {
        match channel {
            Channel::X => self.x.as_ref(),
            Channel::Y => self.y.as_ref(),
            Channel::Color => self.color.as_ref(),
            Channel::Size => self.size.as_ref(),
            Channel::Opacity => self.opacity.as_ref(),
            Channel::Detail => self.detail.as_ref(),
            Channel::Tooltip => None,
        }
    }

    /// Single-valued channels in serialization order.
    pub fn channels(&self) -> impl Iterator<Item = (Channel, &ChannelDef)> {
        [
            Channel::X,
            Channel::Y,
            Channel::Color,
            Channel::Size,
            Channel::Opacity,
            Channel::Detail,
        ]
        .into_iter()
        .filter_map(move |ch| self.get(ch).map(|def| (ch, def)))
    }

    /// Every field definition, tooltip entries included.
    pub fn field_defs(&self) -> Vec<(Channel, &FieldDef)> {
        let mut defs: Vec<(Channel, &FieldDef)> = self
            .channels()
            .filter_map(|(ch, def)| def.as_field().map(|f| (ch, f)))
            .collect();
        defs.extend(self.tooltip.iter().map(|f| (Channel::Tooltip, f)));
        defs
    }

    pub(crate) fn map_fields<E>(
        &self,
        mut f: impl FnMut(Channel, &FieldDef) -> Result<FieldDef, E>,
    ) -> Result<Encoding, E> {
        let mut map = |ch: Channel, def: &Option<ChannelDef>| -> Result<Option<ChannelDef>, E> {
            Ok(match def {
                Some(ChannelDef::Field(fd)) => Some(ChannelDef::Field(f(ch, fd)?)),
                other => other.clone(),
            })
        };
        let x = map(Channel::X, &self.x)?;
        let y = map(Channel::Y, &self.y)?;
        let color = map(Channel::Color, &self.color)?;
        let size = map(Channel::Size, &self.size)?;
        let opacity = map(Channel::Opacity, &self.opacity)?;
        let detail = map(Channel::Detail, &self.detail)?;
        let tooltip = self
            .tooltip
            .iter()
            .map(|fd| f(Channel::Tooltip, fd))
            .collect::<Result<Vec<_>, E>>()?;
        Ok(Encoding {
            x,
            y,
            color,
            size,
            opacity,
            detail,
            tooltip,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorthand_plain_field() {
        let def = FieldDef::new("Health (Life Expectancy)");
        assert_eq!(def.field_name(), Some("Health (Life Expectancy)"));
        assert_eq!(def.ty, None);
        assert_eq!(def.aggregate, None);
    }

    #[test]
    fn test_shorthand_type_suffix() {
        let def = FieldDef::new("Happiness Rank:Q");
        assert_eq!(def.field_name(), Some("Happiness Rank"));
        assert_eq!(def.ty, Some(FieldType::Quantitative));

        let def = FieldDef::new("key:N");
        assert_eq!(def.ty, Some(FieldType::Nominal));
    }

    #[test]
    fn test_colon_without_type_code_is_part_of_name() {
        let def = FieldDef::new("ratio:high");
        assert_eq!(def.field_name(), Some("ratio:high"));
        assert_eq!(def.ty, None);
    }

    #[test]
    fn test_shorthand_aggregates() {
        let count = FieldDef::new("count()");
        assert_eq!(count.aggregate, Some(Aggregate::Count));
        assert_eq!(count.field, None);
        assert_eq!(count.ty, Some(FieldType::Quantitative));
        assert_eq!(count.display_title(), "Count of Records");

        let sum = FieldDef::new("sum(Generosity):Q");
        assert_eq!(sum.aggregate, Some(Aggregate::Sum));
        assert_eq!(sum.field_name(), Some("Generosity"));
        assert_eq!(sum.output_name(), "sum_Generosity");
        assert_eq!(sum.display_title(), "Sum of Generosity");
    }

    #[test]
    fn test_builder_replaces_channel() {
        let enc = Encoding::new().x("Region").x("Country");
        assert_eq!(
            enc.x.as_ref().and_then(|d| d.as_field()).and_then(|f| f.field_name()),
            Some("Country")
        );
    }

    #[test]
    fn test_field_defs_include_tooltip() {
        let enc = Encoding::new()
            .x("Region")
            .opacity(value(0.5))
            .tooltip(["Country", "Happiness Score"]);
        let defs = enc.field_defs();
        assert_eq!(defs.len(), 3);
        assert_eq!(defs[0].0, Channel::X);
        assert_eq!(defs[2].1.field_name(), Some("Happiness Score"));
    }
}
