//! Chartify Grammar - Declarative charts over CSV data
//!
//! Load a CSV file into a shared dataset, describe charts by binding fields
//! to visual channels, compose them side by side, stacked or repeated, then
//! render to SVG or export a standalone Vega-Lite web page.

pub mod charts;
pub mod config;
pub mod data;
pub mod export;
pub mod notebook;
pub mod render;

pub use charts::{
    field, repeat, value, Chart, ChartSpec, Encoding, FieldDef, FieldType, MarkDef, MarkKind,
    RepeatChart, RepeatRef, Scale, WindowOp,
};
pub use config::NotebookConfig;
pub use data::{DataLoader, Dataset, LoaderError};
pub use export::{DisplayError, EmbedOptions, EmbedRenderer, ExportError, Viewer};
pub use render::{RenderError, Rendering};
