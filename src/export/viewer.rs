//! Viewer Module
//! Inline display: drawings land in a directory and may be opened with the system viewer.

use log::{info, warn};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::render::RenderError;

#[derive(Error, Debug)]
pub enum DisplayError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open {path}: {source}")]
    Launch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where displayed charts go.
#[derive(Debug, Clone)]
pub struct Viewer {
    dir: PathBuf,
    launch: bool,
}

impl Viewer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            launch: false,
        }
    }

    /// Open each drawing with the system default application.
    pub fn launch(mut self, launch: bool) -> Self {
        self.launch = launch;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `svg` under a content-derived name and return its path.
    pub fn show(&self, svg: &str) -> Result<PathBuf, DisplayError> {
        fs::create_dir_all(&self.dir).map_err(|source| DisplayError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let hash = format!("{:x}", Sha256::digest(svg.as_bytes()));
        let path = self.dir.join(format!("chart-{}.svg", &hash[..16]));
        fs::write(&path, svg).map_err(|source| DisplayError::Io {
            path: path.clone(),
            source,
        })?;
        info!("Displayed chart at {}", path.display());

        if self.launch {
            if let Err(source) = open::that(&path) {
                warn!("Could not open {}: {}", path.display(), source);
                return Err(DisplayError::Launch { path, source });
            }
        }
        Ok(path)
    }
}
