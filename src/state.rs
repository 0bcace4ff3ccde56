use std::path::PathBuf;

use crate::chart::Figure;

// ---------------------------------------------------------------------------
// Viewer state
// ---------------------------------------------------------------------------

/// What the central panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// The figure redrawn with egui_plot: zoom, drag, hover.
    Interactive,
    /// The PNG exactly as written to disk.
    SavedImage,
}

/// The full UI state, independent of rendering.
pub struct ViewerState {
    pub figure: Figure,

    /// Where the PNG of `figure` was written.
    pub image_path: PathBuf,

    pub view: View,
}

impl ViewerState {
    pub fn new(figure: Figure, image_path: PathBuf) -> Self {
        Self {
            figure,
            image_path,
            view: View::Interactive,
        }
    }

    /// URI the egui_extras file loader resolves.
    pub fn image_uri(&self) -> String {
        format!("file://{}", self.image_path.display())
    }
}
