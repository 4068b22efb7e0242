use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::extract::ExtractOptions;
use crate::render::PlotStyle;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading config file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config file {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("stride must be at least 3 columns, got {0}")]
    Stride(usize),
}

// ---------------------------------------------------------------------------
// Run configuration
// ---------------------------------------------------------------------------

/// Everything one run needs. Every field has a default, so a config file
/// only lists what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub input: InputConfig,
    pub extraction: ExtractOptions,
    pub style: PlotStyle,
    pub output: OutputConfig,
    /// Open the viewer window after export.
    pub show_window: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            input: InputConfig::default(),
            extraction: ExtractOptions::default(),
            style: PlotStyle::default(),
            output: OutputConfig::default(),
            show_window: true,
        }
    }
}

/// Where the table comes from and how its leading rows are laid out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub path: PathBuf,
    /// Worksheet name; the first sheet when unset.
    pub sheet: Option<String>,
    /// Metadata rows above the column-name row.
    pub skip_rows: usize,
    /// Whether the first row after `skip_rows` holds column names.
    pub header_row: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data_plotting.xlsx"),
            sheet: None,
            skip_rows: 2,
            header_row: true,
        }
    }
}

/// How output paths are chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum OutputConfig {
    /// Write every file name into one directory.
    Fixed {
        /// Defaults to the input file's directory.
        #[serde(default)]
        directory: Option<PathBuf>,
        #[serde(default = "default_file_names")]
        file_names: Vec<String>,
        /// Raster resolution; the style dpi when unset.
        #[serde(default)]
        dpi: Option<u32>,
    },
    /// Ask with a save dialog.
    Dialog {
        #[serde(default)]
        directory: Option<PathBuf>,
        #[serde(default = "default_dialog_name")]
        default_name: String,
        #[serde(default = "default_dialog_dpi")]
        dpi: Option<u32>,
    },
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig::Fixed {
            directory: None,
            file_names: default_file_names(),
            dpi: None,
        }
    }
}

impl OutputConfig {
    pub fn dpi(&self) -> Option<u32> {
        match self {
            OutputConfig::Fixed { dpi, .. } | OutputConfig::Dialog { dpi, .. } => *dpi,
        }
    }
}

fn default_file_names() -> Vec<String> {
    vec!["plot-shaded.png".to_string(), "plot-shaded.svg".to_string()]
}

fn default_dialog_name() -> String {
    "plot.png".to_string()
}

fn default_dialog_dpi() -> Option<u32> {
    Some(600)
}

impl RunConfig {
    /// Read a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: RunConfig =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.extraction.stride < 3 {
            return Err(ConfigError::Stride(self.extraction.stride));
        }
        Ok(())
    }

    /// Directory holding the input file, used as the default output location.
    pub fn input_dir(&self) -> PathBuf {
        self.input
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
