//! Scale Module
//! Position scales: linear (niced), band and point.

use serde_json::Value;
use std::cmp::Ordering;

/// Numeric view of a cell. Numeric strings are not coerced.
pub fn as_number(v: &Value) -> Option<f64> {
    v.as_f64().filter(|n| n.is_finite())
}

/// Key used to place a value on a discrete scale.
pub fn discrete_key(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Sorted unique keys. Numbers sort numerically, anything else by key text.
pub fn discrete_domain<'a>(values: impl IntoIterator<Item = &'a Value>) -> Vec<String> {
    let mut seen: Vec<(String, Option<f64>)> = Vec::new();
    for v in values {
        let key = discrete_key(v);
        if !seen.iter().any(|(k, _)| k == &key) {
            seen.push((key, as_number(v)));
        }
    }
    if seen.iter().all(|(_, n)| n.is_some()) {
        seen.sort_by(|a, b| {
            a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal)
        });
    } else {
        seen.sort_by(|a, b| a.0.cmp(&b.0));
    }
    seen.into_iter().map(|(k, _)| k).collect()
}

/// Step between ticks covering [start, stop] with roughly `count` ticks.
pub fn tick_step(start: f64, stop: f64, count: usize) -> f64 {
    let span = (stop - start).abs();
    if span == 0.0 || count == 0 {
        return 1.0;
    }
    let raw = span / count as f64;
    let power = 10f64.powf(raw.log10().floor());
    let error = raw / power;
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    factor * power
}

/// Decimal places needed to print ticks of the given step.
pub fn step_precision(step: f64) -> usize {
    if step <= 0.0 || !step.is_finite() {
        return 0;
    }
    (-step.log10().floor()).max(0.0) as usize
}

/// Compact label: integers without a fraction, otherwise up to `max_decimals`.
pub fn format_number(v: f64, max_decimals: usize) -> String {
    let s = format!("{:.*}", max_decimals, v);
    let s = if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    };
    if s == "-0" {
        "0".to_string()
    } else {
        s
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
    step: f64,
}

impl LinearScale {
    /// Niced domain over the given extent; `zero` pulls the domain to include 0.
    pub fn nice(min: f64, max: f64, zero: bool, range: (f64, f64), tick_count: usize) -> Self {
        let (mut lo, mut hi) = if min.is_finite() && max.is_finite() {
            (min, max)
        } else {
            (0.0, 1.0)
        };
        if zero {
            lo = lo.min(0.0);
            hi = hi.max(0.0);
        }
        if lo == hi {
            if lo == 0.0 {
                hi = 1.0;
            } else {
                let pad = lo.abs() * 0.5;
                lo -= pad;
                hi += pad;
            }
        }
        let step = tick_step(lo, hi, tick_count.max(2));
        let lo = (lo / step).floor() * step;
        let hi = (hi / step).ceil() * step;
        Self {
            domain: (lo, hi),
            range,
            step,
        }
    }

    pub fn map(&self, v: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return (r0 + r1) / 2.0;
        }
        r0 + (v - d0) / (d1 - d0) * (r1 - r0)
    }

    pub fn ticks(&self) -> Vec<f64> {
        let (lo, hi) = self.domain;
        let n = ((hi - lo) / self.step).round() as i64;
        (0..=n)
            .map(|i| {
                let t = lo + i as f64 * self.step;
                // Snap away float drift such as 0.30000000000000004
                let p = 10f64.powi(step_precision(self.step) as i32 + 2);
                (t * p).round() / p
            })
            .collect()
    }

    pub fn step(&self) -> f64 {
        self.step
    }
}

/// Discrete bands with inner/outer padding.
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale {
    pub domain: Vec<String>,
    pub range: (f64, f64),
    start: f64,
    step: f64,
    bandwidth: f64,
}

impl BandScale {
    pub fn new(domain: Vec<String>, range: (f64, f64), padding_inner: f64, padding_outer: f64) -> Self {
        let n = domain.len() as f64;
        let (r0, r1) = range;
        let step = (r1 - r0) / (n - padding_inner + 2.0 * padding_outer).max(1.0);
        let start = r0 + (r1 - r0 - step * (n - padding_inner)) / 2.0;
        Self {
            domain,
            range,
            start,
            step,
            bandwidth: step * (1.0 - padding_inner),
        }
    }

    /// Start of the band for `key`.
    pub fn map(&self, key: &str) -> Option<f64> {
        self.domain
            .iter()
            .position(|d| d == key)
            .map(|i| self.start + self.step * i as f64)
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }
}

/// Discrete positions evenly spaced with half-step padding at both ends.
#[derive(Debug, Clone, PartialEq)]
pub struct PointScale {
    pub domain: Vec<String>,
    pub range: (f64, f64),
    start: f64,
    step: f64,
}

impl PointScale {
    pub fn new(domain: Vec<String>, range: (f64, f64), padding: f64) -> Self {
        let n = domain.len() as f64;
        let (r0, r1) = range;
        let step = (r1 - r0) / (n - 1.0 + 2.0 * padding).max(1.0);
        let start = r0 + (r1 - r0 - step * (n - 1.0)) / 2.0;
        Self {
            domain,
            range,
            start,
            step,
        }
    }

    pub fn map(&self, key: &str) -> Option<f64> {
        self.domain
            .iter()
            .position(|d| d == key)
            .map(|i| self.start + self.step * i as f64)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PositionScale {
    Linear(LinearScale),
    Band(BandScale),
    Point(PointScale),
}

impl PositionScale {
    pub fn is_discrete(&self) -> bool {
        !matches!(self, PositionScale::Linear(_))
    }

    /// Pixel center for a value, `None` when it falls outside the scale's domain.
    pub fn center(&self, v: &Value) -> Option<f64> {
        match self {
            PositionScale::Linear(s) => as_number(v).map(|n| s.map(n)),
            PositionScale::Band(s) => s.map(&discrete_key(v)).map(|p| p + s.bandwidth() / 2.0),
            PositionScale::Point(s) => s.map(&discrete_key(v)),
        }
    }

    /// Order of a value along the axis, used to sort line vertices.
    pub fn order(&self, v: &Value) -> Option<f64> {
        match self {
            PositionScale::Linear(_) => as_number(v),
            PositionScale::Band(s) => s.domain.iter().position(|d| *d == discrete_key(v)).map(|i| i as f64),
            PositionScale::Point(s) => s.domain.iter().position(|d| *d == discrete_key(v)).map(|i| i as f64),
        }
    }

    /// Tick positions and labels.
    pub fn ticks(&self) -> Vec<(f64, String)> {
        match self {
            PositionScale::Linear(s) => {
                let precision = step_precision(s.step());
                s.ticks()
                    .into_iter()
                    .map(|t| (s.map(t), format_number(t, precision)))
                    .collect()
            }
            PositionScale::Band(s) => s
                .domain
                .iter()
                .filter_map(|d| s.map(d).map(|p| (p + s.bandwidth() / 2.0, d.clone())))
                .collect(),
            PositionScale::Point(s) => s
                .domain
                .iter()
                .filter_map(|d| s.map(d).map(|p| (p, d.clone())))
                .collect(),
        }
    }
}
