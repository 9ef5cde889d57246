//! Scene Module
//! Compiles chart specifications against their data into positioned marks.
//!
//! Layout:
//! 1. Each unit chart becomes one view: plot area plus margins for axes,
//!    title and color legend.
//! 2. Concatenations place views side by side (or stacked) with fixed spacing.
//! 3. Repeat grids place cells row-major, aligned on the widest cell per
//!    column and tallest cell per row.

use log::debug;
use serde_json::Value;
use std::collections::HashMap;

use super::color::{lookup_scheme, ColorScale, Rgb, DEFAULT_MARK_COLOR};
use super::scale::{
    as_number, discrete_domain, discrete_key, format_number, BandScale, LinearScale, PointScale,
    PositionScale,
};
use super::validate::check_unit;
use super::RenderError;
use crate::charts::{
    Aggregate, Channel, ChannelDef, Chart, ChartSpec, FieldDef, FieldType, MarkDef, MarkKind,
    CONTINUOUS_SIZE,
};
use crate::data::Record;

const DISCRETE_STEP: f64 = 20.0;
const SPACING: f64 = 20.0;
const PADDING: f64 = 5.0;
const BAND_PADDING_INNER: f64 = 0.1;
const BAND_PADDING_OUTER: f64 = 0.05;
const POINT_PADDING: f64 = 0.5;
const CONTINUOUS_BAND: f64 = 5.0;
const SIZE_RANGE: (f64, f64) = (9.0, 361.0);
const OPACITY_RANGE: (f64, f64) = (0.3, 0.8);
const CHAR_WIDTH: f64 = 6.0;
const LEGEND_SAMPLES: usize = 5;

static NULL: Value = Value::Null;

/// Values a mark was drawn from.
#[derive(Debug, Clone, PartialEq)]
pub struct Datum {
    pub x: Value,
    pub y: Value,
    pub tooltip: Vec<(String, String)>,
}

/// Positioned mark, coordinates relative to the plot area's top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkItem {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Rgb,
        opacity: f64,
        datum: Datum,
    },
    Symbol {
        x: f64,
        y: f64,
        radius: f64,
        fill: Rgb,
        opacity: f64,
        filled: bool,
        datum: Datum,
    },
    Line {
        points: Vec<(f64, f64)>,
        stroke: Rgb,
        opacity: f64,
        stroke_width: f64,
        group: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub position: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub title: String,
    pub ticks: Vec<Tick>,
    pub discrete: bool,
    pub rotate_labels: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    pub title: String,
    pub entries: Vec<LegendEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

/// One plot area with its marks and guides.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewScene {
    /// Absolute position of the plot area's top-left corner.
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
    pub title: Option<String>,
    pub marks: Vec<MarkItem>,
    pub x_axis: Option<Axis>,
    pub y_axis: Option<Axis>,
    pub legend: Option<Legend>,
    pub interactive: bool,
}

impl ViewScene {
    /// Size including margins.
    pub fn outer_size(&self) -> (f64, f64) {
        (
            self.margin.left + self.width + self.margin.right,
            self.margin.top + self.height + self.margin.bottom,
        )
    }

    /// Absolute top-left corner including margins.
    pub fn outer_origin(&self) -> (f64, f64) {
        (self.x - self.margin.left, self.y - self.margin.top)
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }
}

/// Flat list of positioned views making up one rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub views: Vec<ViewScene>,
}

impl Scene {
    pub fn compile(spec: &ChartSpec) -> Result<Scene, RenderError> {
        let (mut views, width, height) = layout(spec)?;
        for view in &mut views {
            view.translate(PADDING, PADDING);
        }
        debug!("Compiled scene with {} views ({}x{})", views.len(), width, height);
        Ok(Scene {
            width: width + 2.0 * PADDING,
            height: height + 2.0 * PADDING,
            views,
        })
    }
}

fn layout(spec: &ChartSpec) -> Result<(Vec<ViewScene>, f64, f64), RenderError> {
    match spec {
        ChartSpec::Unit(chart) => {
            let view = compile_unit(chart)?;
            let (w, h) = view.outer_size();
            Ok((vec![view], w, h))
        }
        ChartSpec::Repeat(repeat) => {
            let cells = repeat.cells()?;
            let (rows, cols) = repeat.grid_shape();
            let views = cells
                .iter()
                .map(|cell| compile_unit(&cell.chart))
                .collect::<Result<Vec<_>, _>>()?;

            let mut col_w = vec![0.0f64; cols];
            let mut row_h = vec![0.0f64; rows];
            for (i, view) in views.iter().enumerate() {
                let (w, h) = view.outer_size();
                col_w[i % cols] = col_w[i % cols].max(w);
                row_h[i / cols] = row_h[i / cols].max(h);
            }

            let mut placed = Vec::with_capacity(views.len());
            for (i, mut view) in views.into_iter().enumerate() {
                let (r, c) = (i / cols, i % cols);
                let dx: f64 = col_w[..c].iter().sum::<f64>() + SPACING * c as f64;
                let dy: f64 = row_h[..r].iter().sum::<f64>() + SPACING * r as f64;
                view.translate(dx, dy);
                placed.push(view);
            }
            let width = col_w.iter().sum::<f64>() + SPACING * (cols as f64 - 1.0);
            let height = row_h.iter().sum::<f64>() + SPACING * (rows as f64 - 1.0);
            Ok((placed, width, height))
        }
        ChartSpec::HConcat(specs) => concat(specs, true),
        ChartSpec::VConcat(specs) => concat(specs, false),
    }
}

fn concat(specs: &[ChartSpec], horizontal: bool) -> Result<(Vec<ViewScene>, f64, f64), RenderError> {
    let mut views = Vec::new();
    let mut offset = 0.0;
    let mut cross = 0.0f64;
    for (i, spec) in specs.iter().enumerate() {
        if i > 0 {
            offset += SPACING;
        }
        let (children, w, h) = layout(spec)?;
        for mut view in children {
            if horizontal {
                view.translate(offset, 0.0);
            } else {
                view.translate(0.0, offset);
            }
            views.push(view);
        }
        if horizontal {
            offset += w;
            cross = cross.max(h);
        } else {
            offset += h;
            cross = cross.max(w);
        }
    }
    if horizontal {
        Ok((views, offset, cross))
    } else {
        Ok((views, cross, offset))
    }
}

/// A field binding with its resolved row-view name and type.
struct Resolved<'a> {
    def: &'a FieldDef,
    name: String,
    ty: FieldType,
}

fn resolve(chart: &Chart, channel: Channel) -> Option<Resolved<'_>> {
    let def = chart.encoding().get(channel)?.as_field()?;
    Some(Resolved {
        def,
        name: def.output_name(),
        ty: chart.field_type(def).unwrap_or(FieldType::Nominal),
    })
}

fn cell<'a>(row: &'a Record, name: &str) -> &'a Value {
    row.get(name).unwrap_or(&NULL)
}

/// Rows after transforms and aggregation, with every referenced field checked.
fn view_rows(chart: &Chart) -> Result<Vec<Record>, RenderError> {
    check_unit(chart)?;
    let mut rows: Vec<Record> = chart.data().records().to_vec();
    for transform in chart.transforms() {
        rows = transform.apply(rows);
    }

    let defs = chart.encoding().field_defs();
    if defs.iter().any(|(_, def)| def.aggregate.is_some()) {
        rows = aggregate_rows(rows, &defs);
    }
    Ok(rows)
}

/// Group by every non-aggregated field and reduce the aggregated ones.
fn aggregate_rows(rows: Vec<Record>, defs: &[(Channel, &FieldDef)]) -> Vec<Record> {
    let mut group_fields: Vec<String> = Vec::new();
    for (_, def) in defs {
        if def.aggregate.is_none() {
            if let Some(name) = def.field_name() {
                if !group_fields.iter().any(|g| g == name) {
                    group_fields.push(name.to_string());
                }
            }
        }
    }

    let mut order: Vec<Vec<Record>> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for row in rows {
        let key = group_fields
            .iter()
            .map(|g| discrete_key(cell(&row, g)))
            .collect::<Vec<_>>()
            .join("\u{1f}");
        let slot = *index.entry(key).or_insert_with(|| {
            order.push(Vec::new());
            order.len() - 1
        });
        order[slot].push(row);
    }

    order
        .into_iter()
        .map(|members| {
            let mut out = Record::new();
            for g in &group_fields {
                out.insert(g.clone(), cell(&members[0], g).clone());
            }
            for (_, def) in defs {
                let Some(agg) = def.aggregate else { continue };
                let numbers: Vec<f64> = def
                    .field_name()
                    .map(|name| members.iter().filter_map(|r| as_number(cell(r, name))).collect())
                    .unwrap_or_default();
                out.insert(def.output_name(), reduce(agg, &numbers, members.len()));
            }
            out
        })
        .collect()
}

fn reduce(agg: Aggregate, values: &[f64], count: usize) -> Value {
    if agg == Aggregate::Count {
        return Value::from(count as u64);
    }
    if values.is_empty() {
        return Value::Null;
    }
    let v = match agg {
        Aggregate::Sum => values.iter().sum(),
        Aggregate::Mean => values.iter().sum::<f64>() / values.len() as f64,
        Aggregate::Median => {
            let mut sorted = values.to_vec();
            sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            let n = sorted.len();
            if n % 2 == 0 {
                (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
            } else {
                sorted[n / 2]
            }
        }
        Aggregate::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
        Aggregate::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        Aggregate::Count => count as f64,
    };
    serde_json::Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null)
}

fn numeric_extent(rows: &[Record], name: &str) -> (f64, f64) {
    rows.iter()
        .filter_map(|r| as_number(cell(r, name)))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

/// Extent of stacked sums, positive and negative stacks kept apart.
fn stack_extent(rows: &[Record], group: &str, value: &str) -> (f64, f64) {
    let mut stacks: HashMap<(String, bool), f64> = HashMap::new();
    let (mut lo, mut hi) = (0.0f64, 0.0f64);
    for row in rows {
        let Some(v) = as_number(cell(row, value)) else { continue };
        let top = stacks
            .entry((discrete_key(cell(row, group)), v >= 0.0))
            .or_insert(0.0);
        *top += v;
        lo = lo.min(*top);
        hi = hi.max(*top);
    }
    (lo, hi)
}

fn tick_count(extent: f64) -> usize {
    ((extent / 40.0).ceil() as usize).max(2)
}

fn default_extent(res: Option<&Resolved>, rows: &[Record]) -> f64 {
    match res {
        Some(r) if r.ty.is_discrete() => {
            let n = discrete_domain(rows.iter().map(|row| cell(row, &r.name))).len();
            DISCRETE_STEP * n.max(1) as f64
        }
        Some(_) => CONTINUOUS_SIZE as f64,
        None => DISCRETE_STEP,
    }
}

fn position_scale(
    res: &Resolved,
    rows: &[Record],
    extent: f64,
    vertical: bool,
    banded: bool,
    stacked: Option<(f64, f64)>,
) -> PositionScale {
    if res.ty.is_discrete() {
        let domain = discrete_domain(rows.iter().map(|r| cell(r, &res.name)));
        return if banded {
            PositionScale::Band(BandScale::new(
                domain,
                (0.0, extent),
                BAND_PADDING_INNER,
                BAND_PADDING_OUTER,
            ))
        } else {
            PositionScale::Point(PointScale::new(domain, (0.0, extent), POINT_PADDING))
        };
    }
    let (min, max) = stacked.unwrap_or_else(|| numeric_extent(rows, &res.name));
    let zero = res.def.scale.as_ref().and_then(|s| s.zero).unwrap_or(true);
    let range = if vertical { (extent, 0.0) } else { (0.0, extent) };
    PositionScale::Linear(LinearScale::nice(min, max, zero, range, tick_count(extent)))
}

/// Color for each row.
enum ColorEncoding {
    Constant(Rgb),
    Scaled { name: String, scale: ColorScale, fallback: Rgb },
}

impl ColorEncoding {
    fn eval(&self, row: &Record) -> Rgb {
        match self {
            ColorEncoding::Constant(c) => *c,
            ColorEncoding::Scaled {
                name,
                scale,
                fallback,
            } => {
                let v = cell(row, name);
                let color = match scale {
                    ColorScale::Categorical { .. } => scale.map_key(&discrete_key(v)),
                    ColorScale::Sequential { .. } => as_number(v).and_then(|n| scale.map_number(n)),
                };
                color.unwrap_or(*fallback)
            }
        }
    }
}

fn color_encoding(
    chart: &Chart,
    mark: &MarkDef,
    rows: &[Record],
) -> Result<(ColorEncoding, Option<Legend>), RenderError> {
    let fallback = match &mark.color {
        Some(c) => Rgb::parse(c).ok_or_else(|| RenderError::InvalidValue {
            channel: Channel::Color,
            value: c.clone(),
        })?,
        None => DEFAULT_MARK_COLOR,
    };

    let def = match chart.encoding().color.as_ref() {
        None => return Ok((ColorEncoding::Constant(fallback), None)),
        Some(ChannelDef::Value(v)) => {
            let color = v.as_str().and_then(Rgb::parse).ok_or_else(|| {
                RenderError::InvalidValue {
                    channel: Channel::Color,
                    value: v.to_string(),
                }
            })?;
            return Ok((ColorEncoding::Constant(color), None));
        }
        Some(ChannelDef::Field(def)) => def,
    };

    let res = Resolved {
        def,
        name: def.output_name(),
        ty: chart.field_type(def).unwrap_or(FieldType::Nominal),
    };
    let requested = def.scale.as_ref().and_then(|s| s.scheme.as_deref());
    let default_scheme = if res.ty.is_discrete() { "tableau10" } else { "blues" };
    let scheme_name = requested.unwrap_or(default_scheme);
    let scheme =
        lookup_scheme(scheme_name).ok_or_else(|| RenderError::UnknownScheme(scheme_name.to_string()))?;

    let (scale, entries) = if res.ty.is_discrete() {
        let domain = discrete_domain(rows.iter().map(|r| cell(r, &res.name)));
        let scale = ColorScale::categorical(domain, scheme);
        let entries = match &scale {
            ColorScale::Categorical { domain, colors } => domain
                .iter()
                .zip(colors)
                .map(|(label, color)| LegendEntry {
                    label: label.clone(),
                    color: *color,
                })
                .collect(),
            ColorScale::Sequential { .. } => Vec::new(),
        };
        (scale, entries)
    } else {
        let (lo, hi) = numeric_extent(rows, &res.name);
        let (lo, hi) = if lo.is_finite() { (lo, hi) } else { (0.0, 1.0) };
        let scale = ColorScale::sequential(lo, hi, scheme);
        let entries = (0..LEGEND_SAMPLES)
            .map(|i| {
                let v = lo + (hi - lo) * i as f64 / (LEGEND_SAMPLES - 1) as f64;
                LegendEntry {
                    label: format_number(v, 2),
                    color: scale.map_number(v).unwrap_or(fallback),
                }
            })
            .collect();
        (scale, entries)
    };

    let legend = Legend {
        title: def.display_title(),
        entries,
    };
    Ok((
        ColorEncoding::Scaled {
            name: res.name,
            scale,
            fallback,
        },
        Some(legend),
    ))
}

/// Numeric channel (size, opacity) for each row.
enum NumericEncoding {
    Constant(f64),
    Linear { name: String, lo: f64, hi: f64, range: (f64, f64) },
    Discrete { name: String, domain: Vec<String>, range: (f64, f64) },
}

impl NumericEncoding {
    fn eval(&self, row: &Record) -> f64 {
        match self {
            NumericEncoding::Constant(v) => *v,
            NumericEncoding::Linear {
                name,
                lo,
                hi,
                range,
            } => {
                let Some(v) = as_number(cell(row, name)) else {
                    return range.0;
                };
                let t = if hi > lo { (v - lo) / (hi - lo) } else { 1.0 };
                range.0 + t.clamp(0.0, 1.0) * (range.1 - range.0)
            }
            NumericEncoding::Discrete {
                name,
                domain,
                range,
            } => {
                let key = discrete_key(cell(row, name));
                let i = domain.iter().position(|d| *d == key).unwrap_or(0);
                let t = if domain.len() > 1 {
                    i as f64 / (domain.len() - 1) as f64
                } else {
                    1.0
                };
                range.0 + t * (range.1 - range.0)
            }
        }
    }
}

fn numeric_encoding(
    chart: &Chart,
    channel: Channel,
    default: f64,
    range: (f64, f64),
    zero: bool,
    rows: &[Record],
) -> Result<NumericEncoding, RenderError> {
    match chart.encoding().get(channel) {
        None => Ok(NumericEncoding::Constant(default)),
        Some(ChannelDef::Value(v)) => v
            .as_f64()
            .map(NumericEncoding::Constant)
            .ok_or_else(|| RenderError::InvalidValue {
                channel,
                value: v.to_string(),
            }),
        Some(ChannelDef::Field(def)) => {
            let name = def.output_name();
            let ty = chart.field_type(def).unwrap_or(FieldType::Nominal);
            if ty.is_discrete() {
                let domain = discrete_domain(rows.iter().map(|r| cell(r, &name)));
                return Ok(NumericEncoding::Discrete {
                    name,
                    domain,
                    range,
                });
            }
            let (lo, hi) = numeric_extent(rows, &name);
            let (lo, hi) = if lo.is_finite() { (lo, hi) } else { (0.0, 1.0) };
            let lo = if zero { lo.min(0.0) } else { lo };
            Ok(NumericEncoding::Linear {
                name,
                lo,
                hi,
                range,
            })
        }
    }
}

fn format_cell(v: &Value) -> String {
    match v {
        Value::Number(n) => n.as_f64().map(|f| format_number(f, 3)).unwrap_or_else(|| n.to_string()),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn axis(res: &Resolved, scale: &PositionScale, rotate: bool) -> Axis {
    Axis {
        title: res.def.display_title(),
        ticks: scale
            .ticks()
            .into_iter()
            .map(|(position, label)| Tick { position, label })
            .collect(),
        discrete: scale.is_discrete(),
        rotate_labels: rotate,
    }
}

fn label_extent(axis: &Axis) -> f64 {
    let chars = axis.ticks.iter().map(|t| t.label.chars().count()).max().unwrap_or(0);
    (chars as f64 * CHAR_WIDTH + 8.0).min(140.0)
}

fn margins(
    title: bool,
    x_axis: Option<&Axis>,
    y_axis: Option<&Axis>,
    legend: Option<&Legend>,
) -> Margin {
    let left = match y_axis {
        Some(a) => label_extent(a) + 20.0,
        None => 10.0,
    };
    let bottom = match x_axis {
        Some(a) if a.rotate_labels => label_extent(a) + 24.0,
        Some(_) => 40.0,
        None => 10.0,
    };
    let right = match legend {
        Some(l) => {
            let chars = l
                .entries
                .iter()
                .map(|e| e.label.chars().count())
                .chain(std::iter::once(l.title.chars().count()))
                .max()
                .unwrap_or(0);
            (chars as f64 * CHAR_WIDTH + 40.0).min(200.0)
        }
        None => 10.0,
    };
    Margin {
        top: if title { 26.0 } else { 10.0 },
        right,
        bottom,
        left,
    }
}

/// Band (start, length) along an axis for bars.
fn span(scale: Option<&PositionScale>, v: &Value, extent: f64) -> Option<(f64, f64)> {
    match scale {
        None => Some((0.0, extent)),
        Some(PositionScale::Band(b)) => b.map(&discrete_key(v)).map(|s| (s, b.bandwidth())),
        Some(PositionScale::Point(p)) => p
            .map(&discrete_key(v))
            .map(|c| (c - CONTINUOUS_BAND / 2.0, CONTINUOUS_BAND)),
        Some(PositionScale::Linear(l)) => {
            as_number(v).map(|n| (l.map(n) - CONTINUOUS_BAND / 2.0, CONTINUOUS_BAND))
        }
    }
}

fn compile_unit(chart: &Chart) -> Result<ViewScene, RenderError> {
    let mark = chart.mark_def().ok_or(RenderError::MissingMark)?;
    let rows = view_rows(chart)?;

    let x = resolve(chart, Channel::X);
    let y = resolve(chart, Channel::Y);
    let is_bar = mark.kind == MarkKind::Bar;
    let continuous = |r: &Option<Resolved>| r.as_ref().map_or(false, |r| !r.ty.is_discrete());
    let discrete = |r: &Option<Resolved>| r.as_ref().map_or(false, |r| r.ty.is_discrete());
    let horizontal = is_bar && continuous(&x) && discrete(&y);

    // Bars on a discrete axis stack along the continuous one
    let stacked = is_bar
        && if horizontal {
            continuous(&x) && discrete(&y)
        } else {
            continuous(&y) && discrete(&x)
        };
    let stack_fields = match (&x, &y) {
        (Some(x), Some(y)) if stacked => Some(if horizontal {
            (y.name.clone(), x.name.clone())
        } else {
            (x.name.clone(), y.name.clone())
        }),
        _ => None,
    };
    let stack_range = stack_fields
        .as_ref()
        .map(|(group, value)| stack_extent(&rows, group, value));

    let width = chart
        .view_width()
        .map(f64::from)
        .unwrap_or_else(|| default_extent(x.as_ref(), &rows));
    let height = chart
        .view_height()
        .map(f64::from)
        .unwrap_or_else(|| default_extent(y.as_ref(), &rows));

    let x_scale = x.as_ref().map(|r| {
        position_scale(r, &rows, width, false, is_bar, if horizontal { stack_range } else { None })
    });
    let y_scale = y.as_ref().map(|r| {
        position_scale(r, &rows, height, true, is_bar, if horizontal { None } else { stack_range })
    });

    let (colors, legend) = color_encoding(chart, mark, &rows)?;
    let sizes = numeric_encoding(chart, Channel::Size, mark.effective_size(), SIZE_RANGE, true, &rows)?;
    let opacities = numeric_encoding(
        chart,
        Channel::Opacity,
        mark.effective_opacity(),
        OPACITY_RANGE,
        false,
        &rows,
    )?;

    let x_name = x.as_ref().map(|r| r.name.as_str());
    let y_name = y.as_ref().map(|r| r.name.as_str());
    let datum = |row: &Record| Datum {
        x: x_name.map(|n| cell(row, n).clone()).unwrap_or(Value::Null),
        y: y_name.map(|n| cell(row, n).clone()).unwrap_or(Value::Null),
        tooltip: chart
            .encoding()
            .tooltip
            .iter()
            .map(|def| (def.display_title(), format_cell(cell(row, &def.output_name()))))
            .collect(),
    };

    let mut marks = Vec::new();
    match mark.kind {
        MarkKind::Bar => {
            let mut stacks: HashMap<(String, bool), f64> = HashMap::new();
            for row in &rows {
                let (group_scale, group_extent, value_scale, value_extent) = if horizontal {
                    (y_scale.as_ref(), height, x_scale.as_ref(), width)
                } else {
                    (x_scale.as_ref(), width, y_scale.as_ref(), height)
                };
                let (group_name, value_name) = if horizontal {
                    (y_name, x_name)
                } else {
                    (x_name, y_name)
                };
                let group_v = group_name.map(|n| cell(row, n)).unwrap_or(&NULL);
                let value_v = value_name.map(|n| cell(row, n)).unwrap_or(&NULL);

                let Some(group_span) = span(group_scale, group_v, group_extent) else {
                    continue;
                };
                let value_span = match value_scale {
                    Some(PositionScale::Linear(l)) => {
                        let Some(v) = as_number(value_v) else { continue };
                        let base = if stacked {
                            let top = stacks
                                .entry((discrete_key(group_v), v >= 0.0))
                                .or_insert(0.0);
                            let base = *top;
                            *top += v;
                            base
                        } else {
                            0.0
                        };
                        let (a, b) = (l.map(base), l.map(base + v));
                        (a.min(b), (a - b).abs())
                    }
                    other => {
                        let Some(s) = span(other, value_v, value_extent) else { continue };
                        s
                    }
                };
                let ((x0, w), (y0, h)) = if horizontal {
                    (value_span, group_span)
                } else {
                    (group_span, value_span)
                };
                marks.push(MarkItem::Rect {
                    x: x0,
                    y: y0,
                    width: w,
                    height: h,
                    fill: colors.eval(row),
                    opacity: opacities.eval(row),
                    datum: datum(row),
                });
            }
        }
        MarkKind::Point | MarkKind::Circle => {
            for row in &rows {
                let px = match (&x_scale, x_name) {
                    (Some(s), Some(n)) => s.center(cell(row, n)),
                    _ => Some(width / 2.0),
                };
                let py = match (&y_scale, y_name) {
                    (Some(s), Some(n)) => s.center(cell(row, n)),
                    _ => Some(height / 2.0),
                };
                let (Some(px), Some(py)) = (px, py) else { continue };
                marks.push(MarkItem::Symbol {
                    x: px,
                    y: py,
                    radius: (sizes.eval(row) / std::f64::consts::PI).sqrt(),
                    fill: colors.eval(row),
                    opacity: opacities.eval(row),
                    filled: mark.effective_filled(),
                    datum: datum(row),
                });
            }
        }
        MarkKind::Line => {
            let color_group = resolve(chart, Channel::Color).filter(|r| r.ty.is_discrete());
            let detail = resolve(chart, Channel::Detail);
            let mut groups: Vec<(String, Vec<&Record>)> = Vec::new();
            for row in &rows {
                let key = [color_group.as_ref(), detail.as_ref()]
                    .into_iter()
                    .flatten()
                    .map(|r| discrete_key(cell(row, &r.name)))
                    .collect::<Vec<_>>()
                    .join("/");
                match groups.iter_mut().find(|(k, _)| *k == key) {
                    Some((_, members)) => members.push(row),
                    None => groups.push((key, vec![row])),
                }
            }

            for (key, mut members) in groups {
                if let (Some(s), Some(n)) = (&x_scale, x_name) {
                    members.sort_by(|a, b| {
                        let oa = s.order(cell(a, n)).unwrap_or(f64::INFINITY);
                        let ob = s.order(cell(b, n)).unwrap_or(f64::INFINITY);
                        oa.partial_cmp(&ob).unwrap_or(std::cmp::Ordering::Equal)
                    });
                }
                let points: Vec<(f64, f64)> = members
                    .iter()
                    .filter_map(|row| {
                        let px = match (&x_scale, x_name) {
                            (Some(s), Some(n)) => s.center(cell(row, n))?,
                            _ => width / 2.0,
                        };
                        let py = match (&y_scale, y_name) {
                            (Some(s), Some(n)) => s.center(cell(row, n))?,
                            _ => height / 2.0,
                        };
                        Some((px, py))
                    })
                    .collect();
                if points.is_empty() {
                    continue;
                }
                marks.push(MarkItem::Line {
                    points,
                    stroke: colors.eval(members[0]),
                    opacity: opacities.eval(members[0]),
                    stroke_width: mark.effective_stroke_width(),
                    group: (!key.is_empty()).then_some(key),
                });
            }
        }
    }

    let x_axis = match (&x, &x_scale) {
        (Some(r), Some(s)) => Some(axis(r, s, s.is_discrete())),
        _ => None,
    };
    let y_axis = match (&y, &y_scale) {
        (Some(r), Some(s)) => Some(axis(r, s, false)),
        _ => None,
    };
    let title = chart.view_title().map(str::to_string);
    let margin = margins(title.is_some(), x_axis.as_ref(), y_axis.as_ref(), legend.as_ref());

    Ok(ViewScene {
        x: margin.left,
        y: margin.top,
        width,
        height,
        margin,
        title,
        marks,
        x_axis,
        y_axis,
        legend,
        interactive: chart.is_interactive(),
    })
}
