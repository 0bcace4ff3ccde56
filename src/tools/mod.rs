//! One module per plotting tool.
//!
//! Every tool follows the same pipeline:
//!
//! ```text
//!   input ──► aggregate() ──► figure() ──► publish()
//!                                           ├── render::save_png   (cwd/<tool>.png)
//!                                           └── app::show          (interactive window)
//! ```

use std::env;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::chart::Figure;
use crate::{app, render};

pub mod age_by_gender_hist;
pub mod gender_hist;
pub mod pose_hist;
pub mod visualize_log;

/// Write `figure` to `output` in the working directory, then show it.
///
/// The PNG is the deliverable: a viewer that cannot start (no display, for
/// instance) is reported and otherwise ignored.
pub fn publish(figure: Figure, output: &str, window_title: &str) -> Result<()> {
    let path = env::current_dir()
        .context("resolving the working directory")?
        .join(output);
    render::save_png(&figure, &path)?;

    if let Err(err) = app::show(window_title, figure, &path) {
        log::warn!("Could not open the viewer ({err}); figure saved to {}", path.display());
    }
    Ok(())
}

/// Dump an aggregate as JSON at debug level.
pub(crate) fn log_aggregate<T: Serialize>(name: &str, aggregate: &T) {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }
    match serde_json::to_string(aggregate) {
        Ok(json) => log::debug!("{name}: {json}"),
        Err(err) => log::debug!("{name}: not serializable ({err})"),
    }
}
