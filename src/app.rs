use anyhow::{Result, anyhow};
use eframe::egui;

use crate::state::ViewerState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct XyzViewerApp {
    pub state: ViewerState,
}

impl eframe::App for XyzViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::series_plot(ui, &self.state);
        });
    }
}

/// Open the viewer and block until the window is closed.
pub fn show(state: ViewerState) -> Result<()> {
    let (w, h) = state.style.figure_size;
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([(w * 100.0) as f32, (h * 100.0) as f32])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "xyz-plot",
        options,
        Box::new(move |_cc| Ok(Box::new(XyzViewerApp { state }))),
    )
    .map_err(|e| anyhow!("display window failed: {e}"))
}
