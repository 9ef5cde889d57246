//! Chartify - World Happiness walkthrough
//!
//! Loads the 2016 World Happiness table, renders each walkthrough chart into
//! the viewer directory and saves the interactive scatterplot matrix as a web page.

use anyhow::{Context, Result};
use log::info;
use std::sync::Arc;

use chartify_grammar::notebook::Notebook;
use chartify_grammar::{DataLoader, NotebookConfig, Viewer};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = NotebookConfig::load_or_default().context("Failed to load configuration")?;

    let data = DataLoader::new()
        .load_csv(&config.data_path)
        .with_context(|| format!("Failed to load {}", config.data_path.display()))?;
    info!("Columns: {}", data.column_names().join(", "));

    let notebook = Notebook::new(Arc::new(data));
    let viewer = Viewer::new(&config.viewer_dir).launch(config.open_viewer);

    for (label, spec) in notebook.cells() {
        let path = spec
            .display(&viewer)
            .with_context(|| format!("Failed to display '{}'", label))?;
        info!("{} -> {}", label, path.display());
    }

    notebook
        .interactive_matrix()
        .save(&config.output_path, &config.embed)
        .with_context(|| format!("Failed to save {}", config.output_path.display()))?;

    Ok(())
}
