//! Render module - Static rendering of chart specifications

mod color;
mod scale;
mod scene;
mod svg;
mod validate;

pub use color::{lookup_scheme, ColorScale, Rgb, Scheme, DEFAULT_MARK_COLOR};
pub use scale::{BandScale, LinearScale, PointScale, PositionScale};
pub use scene::{Axis, Datum, Legend, LegendEntry, Margin, MarkItem, Scene, Tick, ViewScene};
pub use svg::SvgRenderer;

use log::debug;
use thiserror::Error;

use crate::charts::{Channel, ChartSpec, RepeatRef};

/// Errors raised when a specification is checked against its data.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Unknown field '{field}' referenced by {context}")]
    UnknownField { context: String, field: String },

    #[error("Channel {channel} references the repeat {which} but no {which} list was given")]
    UnresolvedRepeat { channel: Channel, which: RepeatRef },

    #[error("Channel {channel} uses the repeat {which} field without a type")]
    UnresolvedType { channel: Channel, which: RepeatRef },

    #[error("Channel {0} has no field")]
    MissingField(Channel),

    #[error("Chart has no mark")]
    MissingMark,

    #[error("Repeat needs at least one row or column field")]
    EmptyRepeat,

    #[error("Unknown color scheme '{0}'")]
    UnknownScheme(String),

    #[error("Invalid value {value} for channel {channel}")]
    InvalidValue { channel: Channel, value: String },

    #[error("Serialization failed: {0}")]
    Serialize(String),

    #[error("Drawing failed: {0}")]
    Backend(String),
}

/// A rendered specification: the positioned scene and its SVG drawing.
#[derive(Debug, Clone)]
pub struct Rendering {
    pub scene: Scene,
    pub svg: String,
}

impl ChartSpec {
    /// Check the specification against its data and draw it.
    pub fn render(&self) -> Result<Rendering, RenderError> {
        let scene = Scene::compile(self)?;
        let svg = SvgRenderer::draw(&scene)?;
        debug!("Rendered {} bytes of SVG", svg.len());
        Ok(Rendering { scene, svg })
    }
}
