use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::config::{OutputConfig, RunConfig};

// ---------------------------------------------------------------------------
// Output path resolution
// ---------------------------------------------------------------------------

/// Outcome of asking where the figure should go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Paths(Vec<PathBuf>),
    Cancelled,
}

/// Decides the files the figure is written to.
pub trait OutputResolver {
    fn resolve(&self) -> Result<Resolution>;
}

/// A fixed directory and a list of file names.
#[derive(Debug, Clone)]
pub struct FixedPaths {
    pub directory: PathBuf,
    pub file_names: Vec<String>,
}

impl OutputResolver for FixedPaths {
    fn resolve(&self) -> Result<Resolution> {
        Ok(Resolution::Paths(
            self.file_names
                .iter()
                .map(|name| self.directory.join(name))
                .collect(),
        ))
    }
}

/// Native "Save as" dialog.
#[derive(Debug, Clone)]
pub struct SaveDialog {
    pub directory: PathBuf,
    pub default_name: String,
}

impl OutputResolver for SaveDialog {
    fn resolve(&self) -> Result<Resolution> {
        let file = rfd::FileDialog::new()
            .set_title("Save Plot As")
            .set_directory(&self.directory)
            .set_file_name(&self.default_name)
            .add_filter("PNG Image", &["png"])
            .add_filter("SVG Image", &["svg"])
            .save_file();

        Ok(match file {
            Some(path) => Resolution::Paths(vec![with_default_extension(path)]),
            None => Resolution::Cancelled,
        })
    }
}

/// Append `.png` when the chosen name has no extension.
pub fn with_default_extension(path: PathBuf) -> PathBuf {
    if path.extension().is_some() {
        path
    } else {
        path.with_extension("png")
    }
}

/// Build the resolver selected by the configuration.
pub fn resolver_for(config: &RunConfig) -> Box<dyn OutputResolver> {
    let fallback_dir = config.input_dir();
    match &config.output {
        OutputConfig::Fixed {
            directory,
            file_names,
            ..
        } => Box::new(FixedPaths {
            directory: directory.clone().unwrap_or(fallback_dir),
            file_names: file_names.clone(),
        }),
        OutputConfig::Dialog {
            directory,
            default_name,
            ..
        } => Box::new(SaveDialog {
            directory: directory.clone().unwrap_or(fallback_dir),
            default_name: default_name.clone(),
        }),
    }
}

/// Dialog resolver for an interactive "Save as…" next to `dir`.
pub fn dialog_in(dir: &Path) -> SaveDialog {
    SaveDialog {
        directory: dir.to_path_buf(),
        default_name: "plot.png".to_string(),
    }
}
