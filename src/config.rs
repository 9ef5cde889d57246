//! Walkthrough configuration, read from `chartify.json` when present.

use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::export::EmbedOptions;

pub const CONFIG_FILE: &str = "chartify.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotebookConfig {
    pub data_path: PathBuf,
    pub output_path: PathBuf,
    pub viewer_dir: PathBuf,
    pub open_viewer: bool,
    pub embed: EmbedOptions,
}

impl Default for NotebookConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/World_Happiness_2016.csv"),
            output_path: PathBuf::from("webchart.html"),
            viewer_dir: PathBuf::from("charts"),
            open_viewer: false,
            embed: EmbedOptions::default(),
        }
    }
}

impl NotebookConfig {
    /// Read `path`; a missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let config = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn load_or_default() -> Result<Self, ConfigError> {
        Self::load(CONFIG_FILE)
    }
}
