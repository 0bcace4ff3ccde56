use std::path::Path;

use eframe::egui;

use crate::chart::Figure;
use crate::state::{View, ViewerState};
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct FigureViewerApp {
    pub state: ViewerState,
}

impl FigureViewerApp {
    pub fn new(state: ViewerState) -> Self {
        Self { state }
    }
}

impl eframe::App for FigureViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: view switcher ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Central panel: figure ----
        egui::CentralPanel::default().show(ctx, |ui| match self.state.view {
            View::Interactive => plot::figure_grid(ui, &self.state.figure),
            View::SavedImage => panels::saved_image(ui, &self.state),
        });
    }
}

// ---------------------------------------------------------------------------
// Window entry point
// ---------------------------------------------------------------------------

/// Open a window showing `figure` and block until it is closed.
pub fn show(title: &str, figure: Figure, image_path: &Path) -> eframe::Result {
    let (width, height) = figure.size;
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(title)
            .with_inner_size([width as f32 + 40.0, height as f32 + 80.0])
            .with_min_inner_size([600.0, 300.0]),
        ..Default::default()
    };

    let state = ViewerState::new(figure, image_path.to_path_buf());
    eframe::run_native(
        title,
        options,
        Box::new(|cc| {
            // Install image loaders so egui can show the saved png.
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(FigureViewerApp::new(state)))
        }),
    )
}
