use std::path::PathBuf;

use crate::data::extract::{ExtractWarning, Extraction, Series};
use crate::output::dialog_in;
use crate::pipeline::export;
use crate::render::PlotStyle;

// ---------------------------------------------------------------------------
// Viewer state
// ---------------------------------------------------------------------------

/// What the viewer window shows, independent of rendering.
pub struct ViewerState {
    /// Extracted series, in group order.
    pub series: Vec<Series>,

    /// Extraction warnings (already logged).
    pub warnings: Vec<ExtractWarning>,

    /// Style shared with the exported figure.
    pub style: PlotStyle,

    /// Starting directory for "Save as…".
    pub save_dir: PathBuf,

    /// Raster resolution for "Save as…".
    pub dpi: u32,

    /// Files written so far.
    pub saved: Vec<PathBuf>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Whether the last status message reports a failure.
    pub status_is_error: bool,
}

impl ViewerState {
    pub fn new(
        extraction: Extraction,
        style: PlotStyle,
        save_dir: PathBuf,
        dpi: u32,
        saved: Vec<PathBuf>,
    ) -> Self {
        Self {
            series: extraction.series,
            warnings: extraction.warnings,
            style,
            save_dir,
            dpi,
            saved,
            status_message: None,
            status_is_error: false,
        }
    }

    /// Ask for a path with the save dialog and export the figure there.
    pub fn save_as(&mut self) {
        let resolver = dialog_in(&self.save_dir);
        match export(&self.series, &self.style, &resolver, self.dpi) {
            Ok(paths) if paths.is_empty() => {
                self.set_status("Save cancelled", false);
            }
            Ok(paths) => {
                if let Some(dir) = paths.first().and_then(|p| p.parent()) {
                    self.save_dir = dir.to_path_buf();
                }
                let names: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
                self.set_status(&format!("Saved {}", names.join(", ")), false);
                self.saved.extend(paths);
            }
            Err(e) => {
                log::error!("Failed to save plot: {e:#}");
                self.set_status(&format!("Error: {e:#}"), true);
            }
        }
    }

    /// One-based numbers of the datasets that raised a warning, ascending.
    pub fn flagged_datasets(&self) -> Vec<usize> {
        let mut groups: Vec<usize> = self.warnings.iter().map(|w| w.group() + 1).collect();
        groups.sort_unstable();
        groups.dedup();
        groups
    }

    fn set_status(&mut self, message: &str, is_error: bool) {
        self.status_message = Some(message.to_string());
        self.status_is_error = is_error;
    }
}
