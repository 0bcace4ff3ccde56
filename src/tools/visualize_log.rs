use std::path::Path;

use anyhow::{Context, Result};

use crate::chart::{figure_size, Figure, LineSeries, Panel, PanelBody};
use crate::color::{CRIMSON, DODGER_BLUE, ORANGE};
use crate::data::training_log::TrainingLog;

pub const OUTPUT: &str = "visualize-log.png";

const WINDOW_TITLE: &str = "Training log";

pub fn aggregate(log: &Path) -> Result<TrainingLog> {
    let parsed = TrainingLog::load(log).with_context(|| format!("reading training log {}", log.display()))?;
    super::log_aggregate("training log", &parsed);
    Ok(parsed)
}

/// Loss on the left, train/test accuracy on the right, both against epoch.
/// The learning rate is parsed but not plotted.
pub fn figure(log: &TrainingLog) -> Figure {
    let loss = LineSeries {
        label: "Average Loss".into(),
        color: ORANGE,
        points: log.training.iter().map(|p| (p.epoch as f64, p.loss)).collect(),
    };
    let train_accuracy = LineSeries {
        label: "Train Accuracy".into(),
        color: CRIMSON,
        points: log
            .validation
            .iter()
            .map(|p| (p.epoch as f64, p.train_accuracy))
            .collect(),
    };
    let test_accuracy = LineSeries {
        label: "Test Accuracy".into(),
        color: DODGER_BLUE,
        points: log
            .validation
            .iter()
            .map(|p| (p.epoch as f64, p.test_accuracy))
            .collect(),
    };

    let panels = vec![
        Panel::new("Training", PanelBody::Lines(vec![loss]))
            .x_label("Epoch")
            .y_label("Loss")
            .with_legend(),
        Panel::new("Validation", PanelBody::Lines(vec![train_accuracy, test_accuracy]))
            .x_label("Epoch")
            .y_label("Accuracy")
            .with_legend(),
    ];

    // Loss and accuracy live on different scales.
    let mut figure = Figure::new(figure_size(12, 4), 1, 2, panels);
    figure.share_y = false;
    figure
}

pub fn run(log: &Path) -> Result<()> {
    let parsed = aggregate(log)?;
    super::publish(figure(&parsed), OUTPUT, WINDOW_TITLE)
}
