//! Composition Module
//! Structural combinators placing charts side by side or stacked.

use std::ops::{BitAnd, BitOr};

use crate::charts::chart::{Chart, RepeatChart};

/// Any renderable specification: a unit chart, a repeat grid or a concatenation.
#[derive(Debug, Clone)]
pub enum ChartSpec {
    Unit(Chart),
    Repeat(RepeatChart),
    HConcat(Vec<ChartSpec>),
    VConcat(Vec<ChartSpec>),
}

impl ChartSpec {
    /// Horizontal concatenation. Nested horizontal concatenations are flattened.
    pub fn hconcat<I, S>(specs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ChartSpec>,
    {
        let mut flat = Vec::new();
        for spec in specs {
            match spec.into() {
                ChartSpec::HConcat(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        ChartSpec::HConcat(flat)
    }

    /// Vertical concatenation. Nested vertical concatenations are flattened.
    pub fn vconcat<I, S>(specs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ChartSpec>,
    {
        let mut flat = Vec::new();
        for spec in specs {
            match spec.into() {
                ChartSpec::VConcat(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        ChartSpec::VConcat(flat)
    }

    /// Unit charts in left-to-right, top-to-bottom order (repeat templates included once).
    pub fn unit_charts(&self) -> Vec<&Chart> {
        match self {
            ChartSpec::Unit(chart) => vec![chart],
            ChartSpec::Repeat(repeat) => vec![repeat.template()],
            ChartSpec::HConcat(specs) | ChartSpec::VConcat(specs) => {
                specs.iter().flat_map(|s| s.unit_charts()).collect()
            }
        }
    }
}

impl From<Chart> for ChartSpec {
    fn from(chart: Chart) -> Self {
        ChartSpec::Unit(chart)
    }
}

impl From<RepeatChart> for ChartSpec {
    fn from(repeat: RepeatChart) -> Self {
        ChartSpec::Repeat(repeat)
    }
}

macro_rules! impl_compose_ops {
    ($($ty:ty),*) => {
        $(
            impl<R: Into<ChartSpec>> BitOr<R> for $ty {
                type Output = ChartSpec;

                fn bitor(self, rhs: R) -> ChartSpec {
                    ChartSpec::hconcat([ChartSpec::from(self), rhs.into()])
                }
            }

            impl<R: Into<ChartSpec>> BitAnd<R> for $ty {
                type Output = ChartSpec;

                fn bitand(self, rhs: R) -> ChartSpec {
                    ChartSpec::vconcat([ChartSpec::from(self), rhs.into()])
                }
            }
        )*
    };
}

impl_compose_ops!(Chart, RepeatChart, ChartSpec);
