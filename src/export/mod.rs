//! Export module - Saving and displaying chart specifications

mod html;
mod viewer;

pub use html::HtmlExporter;
pub use viewer::{DisplayError, Viewer};

use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::charts::{Chart, ChartSpec, RepeatChart};
use crate::render::RenderError;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported export format '{0}' (expected .html, .json or .svg)")]
    UnsupportedFormat(String),

    #[error("Failed to encode embed options: {0}")]
    Json(#[from] serde_json::Error),
}

/// Renderer vega-embed draws with in the browser.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedRenderer {
    #[default]
    Svg,
    Canvas,
}

impl EmbedRenderer {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbedRenderer::Svg => "svg",
            EmbedRenderer::Canvas => "canvas",
        }
    }
}

/// Options for standalone HTML documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedOptions {
    pub renderer: EmbedRenderer,
    /// Show the export/source action menu.
    pub actions: bool,
    /// Include a pre-rendered SVG inside `<noscript>`.
    pub static_fallback: bool,
}

impl Default for EmbedOptions {
    fn default() -> Self {
        Self {
            renderer: EmbedRenderer::Svg,
            actions: true,
            static_fallback: true,
        }
    }
}

/// Output formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Html,
    Json,
    Svg,
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "html" | "htm" => Ok(ExportFormat::Html),
            "json" => Ok(ExportFormat::Json),
            "svg" => Ok(ExportFormat::Svg),
            _ => Err(ExportError::UnsupportedFormat(ext)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Html => "HTML",
            ExportFormat::Json => "JSON",
            ExportFormat::Svg => "SVG",
        }
    }
}

impl ChartSpec {
    /// Document contents for `format`. Nothing is written.
    pub fn export_string(&self, format: ExportFormat, options: &EmbedOptions) -> Result<String, ExportError> {
        match format {
            ExportFormat::Html => {
                let spec = self.to_vega_lite()?;
                let fallback = if options.static_fallback {
                    Some(self.render()?.svg)
                } else {
                    None
                };
                HtmlExporter::document(&spec, options, fallback.as_deref())
            }
            ExportFormat::Json => Ok(self.to_json_string()?),
            ExportFormat::Svg => Ok(self.render()?.svg),
        }
    }

    /// Write the chart to `path`, format chosen by extension.
    ///
    /// The specification is fully checked before the file is created, so a
    /// failing chart leaves no partial output behind.
    pub fn save(self, path: impl AsRef<Path>, options: &EmbedOptions) -> Result<(), ExportError> {
        let path = path.as_ref();
        let format = ExportFormat::from_path(path)?;
        let contents = self.export_string(format, options)?;
        fs::write(path, contents.as_bytes()).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Saved {} chart to {}", format.as_str(), path.display());
        Ok(())
    }

    /// Render and hand the drawing to `viewer`.
    pub fn display(self, viewer: &Viewer) -> Result<PathBuf, DisplayError> {
        let rendering = self.render()?;
        viewer.show(&rendering.svg)
    }
}

macro_rules! impl_output_methods {
    ($($ty:ty),*) => {
        $(
            impl $ty {
                pub fn save(self, path: impl AsRef<Path>, options: &EmbedOptions) -> Result<(), ExportError> {
                    ChartSpec::from(self).save(path, options)
                }

                pub fn display(self, viewer: &Viewer) -> Result<PathBuf, DisplayError> {
                    ChartSpec::from(self).display(viewer)
                }
            }
        )*
    };
}

impl_output_methods!(Chart, RepeatChart);
