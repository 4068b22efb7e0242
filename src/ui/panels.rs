use eframe::egui::{self, Color32, RichText, Ui};

use crate::state::ViewerState;

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut ViewerState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Save as…").clicked() {
                ui.close_menu();
                state.save_as();
            }
        });

        ui.separator();

        ui.label(format!("{} series plotted", state.series.len()));

        if !state.warnings.is_empty() {
            let flagged: Vec<String> = state
                .flagged_datasets()
                .iter()
                .map(|g| g.to_string())
                .collect();
            let details: Vec<String> = state.warnings.iter().map(|w| w.to_string()).collect();
            ui.label(
                RichText::new(format!("warnings for datasets {}", flagged.join(", ")))
                    .color(Color32::YELLOW),
            )
            .on_hover_text(details.join("\n"));
        }

        if let Some(last) = state.saved.last() {
            ui.separator();
            ui.label(format!("last saved: {}", last.display()));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            let text = RichText::new(msg);
            ui.label(if state.status_is_error {
                text.color(Color32::RED)
            } else {
                text
            });
        }
    });
}
