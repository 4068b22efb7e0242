use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::app;
use crate::config::RunConfig;
use crate::data::extract::{Extraction, Series, extract};
use crate::data::loader::load_table;
use crate::output::{OutputResolver, Resolution, resolver_for};
use crate::render::{PlotStyle, render_figure};
use crate::state::ViewerState;

// ---------------------------------------------------------------------------
// Run: load → extract → export → display
// ---------------------------------------------------------------------------

/// Execute one full run. Only load, config and render failures are errors.
pub fn run(config: RunConfig) -> Result<()> {
    run_with_viewer(config, app::show)
}

/// [`run`] with the viewer passed in.
///
/// The figure is on disk before the viewer starts, so a viewer failure
/// (no display, no GL) is logged and the run still succeeds.
fn run_with_viewer<F>(config: RunConfig, show: F) -> Result<()>
where
    F: FnOnce(ViewerState) -> Result<()>,
{
    let extraction = load_and_extract(&config)?;

    let resolver = resolver_for(&config);
    let dpi = config.output.dpi().unwrap_or(config.style.dpi);
    let saved = export(&extraction.series, &config.style, resolver.as_ref(), dpi)?;

    if config.show_window {
        let save_dir = config.input_dir();
        let state = ViewerState::new(extraction, config.style, save_dir, dpi, saved);
        if let Err(e) = show(state) {
            log::warn!("could not open the plot window: {e:#}");
        }
    }
    Ok(())
}

/// Load the configured table and slice it into series, logging every warning.
pub fn load_and_extract(config: &RunConfig) -> Result<Extraction> {
    let table = load_table(&config.input.path, &config.input)?;
    let extraction = extract(&table, &config.extraction);

    for warning in &extraction.warnings {
        log::warn!("{warning}");
    }
    log::info!(
        "extracted {} of {} datasets",
        extraction.series.len(),
        config.extraction.num_groups
    );
    Ok(extraction)
}

/// Ask the resolver for output paths and render the figure to each of them.
///
/// Returns the written paths; empty when the user cancelled.
pub fn export(
    series: &[Series],
    style: &PlotStyle,
    resolver: &dyn OutputResolver,
    dpi: u32,
) -> Result<Vec<PathBuf>> {
    let paths = match resolver.resolve().context("choosing output path")? {
        Resolution::Paths(paths) => paths,
        Resolution::Cancelled => {
            log::info!("Save operation cancelled. Plot was not saved.");
            return Ok(Vec::new());
        }
    };

    for path in &paths {
        render_figure(path, series, style, dpi)
            .with_context(|| format!("saving plot to {}", path.display()))?;
        log::info!("Plot saved successfully at: {}", path.display());
    }
    Ok(paths)
}
