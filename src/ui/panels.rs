use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::{View, ViewerState};

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the view switcher and the output path.
pub fn top_bar(ui: &mut Ui, state: &mut ViewerState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.selectable_value(&mut state.view, View::Interactive, "Interactive");
        ui.selectable_value(&mut state.view, View::SavedImage, "Saved image");

        ui.separator();

        ui.label(format!("{} panels", state.figure.panels.len()));

        ui.separator();

        let exists = state.image_path.exists();
        let text = RichText::new(state.image_path.display().to_string());
        ui.label(if exists { text } else { text.color(Color32::RED) });
    });
}

// ---------------------------------------------------------------------------
// Saved image view
// ---------------------------------------------------------------------------

/// Show the PNG on disk at its natural size, scrolling when it does not fit.
pub fn saved_image(ui: &mut Ui, state: &ViewerState) {
    ScrollArea::both()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.add(egui::Image::new(state.image_uri()).fit_to_original_size(1.0));
        });
}
