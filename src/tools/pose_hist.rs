use std::path::Path;

use anyhow::{Context, Result};

use crate::chart::{figure_size, Figure, HistogramSeries, Panel, PanelBody};
use crate::color::{SeriesColor, CRIMSON, DODGER_BLUE, LAWN_GREEN};
use crate::data::model::{Angle, OutOfRange, PoseHistogram, Split};
use crate::data::pose::{find_annotation_files, read_pose};
use crate::histogram::BinEdges;

pub const OUTPUT: &str = "pose-hist.png";

const WINDOW_TITLE: &str = "Angle count by head pose";

fn angle_color(angle: Angle) -> SeriesColor {
    match angle {
        Angle::Pitch => CRIMSON,
        Angle::Yaw => DODGER_BLUE,
        Angle::Roll => LAWN_GREEN,
    }
}

/// Diagnostic for an angle that fell outside the pose table.
pub fn out_of_range_message(angle: Angle, file: &Path) -> String {
    format!("{angle} of {} is out of range!!", file.display())
}

/// Walk `<dataset>/train` and `<dataset>/test`, binning every angle of every
/// annotation. An angle outside the table is dropped on its own; the other
/// two angles of the same file are still counted.
pub fn aggregate(dataset: &Path) -> Result<PoseHistogram> {
    let bins = BinEdges::pose();
    let mut hist = PoseHistogram::new();

    for split in Split::ALL {
        let dir = dataset.join(split.as_str());
        let files = find_annotation_files(&dir)
            .with_context(|| format!("listing {split} annotations under {}", dataset.display()))?;
        log::info!("{split}: {} annotation files in {}", files.len(), dir.display());

        for file in files {
            let degrees = read_pose(&file)?.to_degrees();
            for angle in Angle::ALL {
                let value = degrees.get(angle);
                match bins.representative(value) {
                    Some(representative) => hist.record(split, angle, representative),
                    None => {
                        log::warn!("{}", out_of_range_message(angle, &file));
                        hist.record_dropped(OutOfRange {
                            split,
                            angle,
                            file: file.clone(),
                            degrees: value,
                        });
                    }
                }
            }
        }
    }

    if !hist.dropped().is_empty() {
        log::info!("Dropped {} out-of-range angles", hist.dropped().len());
    }
    super::log_aggregate("pose histogram", &hist);
    Ok(hist)
}

/// Rows train/test, columns pitch/yaw/roll, all binned on the pose table.
pub fn figure(hist: &PoseHistogram) -> Figure {
    let bins = BinEdges::pose();
    let panels = Split::ALL
        .iter()
        .flat_map(|&split| Angle::ALL.iter().map(move |&angle| (split, angle)))
        .map(|(split, angle)| {
            let series = HistogramSeries::new(
                angle.title(),
                angle_color(angle),
                bins.clone(),
                hist.values(split, angle),
            );
            Panel::new(
                format!("Angle count by {angle} ({})", split.title()),
                PanelBody::Histograms(vec![series]),
            )
            .x_range(-100.0, 100.0)
            .with_legend()
        })
        .collect();

    Figure::new(figure_size(18, 8), 2, 3, panels)
}

pub fn run(dataset: &Path) -> Result<()> {
    let hist = aggregate(dataset)?;
    super::publish(figure(&hist), OUTPUT, WINDOW_TITLE)
}
