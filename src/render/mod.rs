/// Figure export: draws extracted series to PNG or SVG with plotters.
///
/// All visual settings travel in one immutable [`PlotStyle`] value; nothing
/// here keeps global state between calls.
mod figure;

use std::ops::Range;
use std::path::{Path, PathBuf};

use plotters::prelude::{BitMapBackend, IntoDrawingArea, SVGBackend};
use serde::{Deserialize, Serialize};

use crate::data::extract::Series;

// ---------------------------------------------------------------------------
// Style
// ---------------------------------------------------------------------------

/// Grid lines on major (and optionally minor) ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridStyle {
    pub enabled: bool,
    /// Minor grid lines between two major ticks; 0 disables them.
    pub minor_lines: usize,
    /// Line width in points.
    pub line_width: f64,
    pub alpha: f64,
}

impl Default for GridStyle {
    fn default() -> Self {
        Self {
            enabled: true,
            minor_lines: 4,
            line_width: 0.5,
            alpha: 0.7,
        }
    }
}

/// Figure appearance. Sizes are in points unless stated otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotStyle {
    pub font_family: String,
    pub title: Option<String>,
    pub title_size: f64,
    pub x_label: String,
    pub y_label: String,
    pub axis_label_size: f64,
    pub tick_label_size: f64,
    pub major_tick_length: f64,
    pub axis_width: f64,
    pub line_width: f64,
    pub markers: bool,
    pub marker_size: f64,
    pub legend_title: String,
    pub legend_title_size: f64,
    pub legend_font_size: f64,
    pub legend_shadow: bool,
    /// Prefix of every series label, followed by the group's y value.
    pub label_prefix: String,
    /// Width and height in inches.
    pub figure_size: (f64, f64),
    pub dpi: u32,
    /// Share of the figure width given to the axes; the legend uses the rest.
    pub plot_fraction: f64,
    pub grid: GridStyle,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            font_family: "serif".to_string(),
            title: None,
            title_size: 14.0,
            x_label: "Line sweep, X (cm)".to_string(),
            y_label: "Index measured (n)".to_string(),
            axis_label_size: 14.0,
            tick_label_size: 10.0,
            major_tick_length: 7.0,
            axis_width: 1.5,
            line_width: 2.0,
            markers: true,
            marker_size: 6.0,
            legend_title: "Y (cm)".to_string(),
            legend_title_size: 12.0,
            legend_font_size: 10.0,
            legend_shadow: true,
            label_prefix: "y = ".to_string(),
            figure_size: (10.0, 6.0),
            dpi: 300,
            plot_fraction: 0.75,
            grid: GridStyle::default(),
        }
    }
}

impl PlotStyle {
    /// Canvas size in pixels at the given resolution.
    pub fn pixel_size(&self, dpi: u32) -> (u32, u32) {
        let (w, h) = self.figure_size;
        let dpi = f64::from(dpi);
        (
            (w * dpi).round().max(1.0) as u32,
            (h * dpi).round().max(1.0) as u32,
        )
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PlotError {
    #[error("unsupported image format '.{0}' (expected .png or .svg)")]
    UnsupportedFormat(String),
    #[error("creating output directory {}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("drawing figure: {0}")]
    Draw(String),
}

pub(crate) fn draw_err<E: std::fmt::Display>(e: E) -> PlotError {
    PlotError::Draw(e.to_string())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// SVG output uses one user unit per point.
const VECTOR_DPI: u32 = 72;

/// Render the series to `path`; the extension selects PNG or SVG.
///
/// `dpi` only affects raster output.
pub fn render_figure(
    path: &Path,
    series: &[Series],
    style: &PlotStyle,
    dpi: u32,
) -> Result<(), PlotError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| PlotError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    match ext.as_str() {
        "png" => {
            let root = BitMapBackend::new(path, style.pixel_size(dpi)).into_drawing_area();
            figure::draw(&root, series, style, f64::from(dpi) / 72.0)?;
            root.present().map_err(draw_err)?;
        }
        "svg" => {
            let root = SVGBackend::new(path, style.pixel_size(VECTOR_DPI)).into_drawing_area();
            figure::draw(&root, series, style, 1.0)?;
            root.present().map_err(draw_err)?;
        }
        other => return Err(PlotError::UnsupportedFormat(other.to_string())),
    }

    log::debug!("rendered {} series to {}", series.len(), path.display());
    Ok(())
}

/// Axis range covering every value with 5 % padding on each side.
///
/// Empty input gives `0..1`; a single value is widened by 0.5 each way.
pub(crate) fn axis_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if min > max {
        return 0.0..1.0;
    }
    let span = max - min;
    if span == 0.0 {
        return (min - 0.5)..(max + 0.5);
    }
    let pad = span * 0.05;
    (min - pad)..(max + pad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Cell;

    fn gapped_series() -> Series {
        Series {
            group: 0,
            x: vec![Some(0.0), None, Some(2.0), Some(3.0)],
            z: vec![Some(1.40), Some(1.41), Some(1.43), Some(1.44)],
            y_label: Cell::Float(1.0),
        }
    }

    fn assert_written(path: &Path) {
        let len = std::fs::metadata(path).unwrap().len();
        assert!(len > 0, "{} is empty", path.display());
    }

    #[test]
    fn renders_svg_and_png_with_a_gap() {
        let dir = tempfile::tempdir().unwrap();
        let series = [gapped_series()];
        let style = PlotStyle::default();
        for name in ["plot.svg", "plot.png"] {
            let path = dir.path().join(name);
            render_figure(&path, &series, &style, 50).unwrap();
            assert_written(&path);
        }
        let svg = std::fs::read_to_string(dir.path().join("plot.svg")).unwrap();
        assert!(svg.contains("y = 1.0"));
    }

    #[test]
    fn zero_series_still_produce_a_figure() {
        let dir = tempfile::tempdir().unwrap();
        let style = PlotStyle::default();
        for name in ["nested/empty.svg", "nested/empty.png"] {
            let path = dir.path().join(name);
            render_figure(&path, &[], &style, 50).unwrap();
            assert_written(&path);
        }
    }

    #[test]
    fn axis_range_pads_five_percent() {
        let r = axis_range([1.0, 3.0, 2.0].into_iter());
        assert!((r.start - 0.9).abs() < 1e-12);
        assert!((r.end - 3.1).abs() < 1e-12);
    }

    #[test]
    fn axis_range_handles_degenerate_input() {
        assert_eq!(axis_range(std::iter::empty()), 0.0..1.0);
        assert_eq!(axis_range([2.0, 2.0].into_iter()), 1.5..2.5);
        assert_eq!(axis_range([f64::NAN, f64::INFINITY].into_iter()), 0.0..1.0);
    }

    #[test]
    fn pixel_size_scales_with_dpi() {
        let style = PlotStyle::default();
        assert_eq!(style.pixel_size(300), (3000, 1800));
        assert_eq!(style.pixel_size(72), (720, 432));
    }

    #[test]
    fn unknown_extension_is_rejected_before_drawing() {
        let dir = tempfile::tempdir().unwrap();
        let err = render_figure(
            &dir.path().join("plot.pdf"),
            &[],
            &PlotStyle::default(),
            300,
        )
        .unwrap_err();
        assert!(matches!(err, PlotError::UnsupportedFormat(ext) if ext == "pdf"));
    }
}
