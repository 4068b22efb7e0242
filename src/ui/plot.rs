use eframe::egui::{Color32, Ui};
use egui_plot::{Corner, Legend, Line, MarkerShape, Plot, PlotPoints, Points};

use crate::color::generate_palette;
use crate::state::ViewerState;

// ---------------------------------------------------------------------------
// Series plot (central panel)
// ---------------------------------------------------------------------------

/// Render z against x for every extracted series.
pub fn series_plot(ui: &mut Ui, state: &ViewerState) {
    if state.series.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No datasets could be extracted from the input table");
        });
        return;
    }

    let style = &state.style;
    let colours: Vec<Color32> = generate_palette(state.series.len())
        .into_iter()
        .map(|c| Color32::from_rgb(c.red, c.green, c.blue))
        .collect();

    Plot::new("series_plot")
        .legend(Legend::default().position(Corner::RightTop))
        .x_axis_label(style.x_label.clone())
        .y_axis_label(style.y_label.clone())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (series, &color) in state.series.iter().zip(&colours) {
                // Items sharing a name share one legend entry.
                let name = series.label(&style.label_prefix);

                for segment in series.segments() {
                    let points: PlotPoints = segment.iter().map(|&(x, z)| [x, z]).collect();
                    let line = Line::new(points)
                        .name(&name)
                        .color(color)
                        .width(style.line_width as f32);
                    plot_ui.line(line);
                }

                if style.markers {
                    let points: PlotPoints = series.points().map(|(x, z)| [x, z]).collect();
                    let markers = Points::new(points)
                        .name(&name)
                        .color(color)
                        .shape(MarkerShape::Circle)
                        .filled(true)
                        .radius(style.marker_size as f32 / 2.0);
                    plot_ui.points(markers);
                }
            }
        });
}
