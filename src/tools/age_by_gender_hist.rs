use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::chart::{figure_size, Figure, HistogramSeries, Panel, PanelBody};
use crate::color::{SeriesColor, DEEP_PINK, DODGER_BLUE};
use crate::data::filter::ages_for_category;
use crate::data::loader::{load_split_labels, AGE_COLUMN, GENDER_COLUMN};
use crate::data::model::{LabelRecord, PerSplit, Split};
use crate::histogram::{BinEdges, AUTO_MAX_BINS};

pub const OUTPUT: &str = "age-by-gender-hist.png";

const WINDOW_TITLE: &str = "Face count by age and gender";

/// Plotted genders in legend order. Other categories are not plotted.
const GENDERS: [(&str, SeriesColor); 2] = [("Male", DODGER_BLUE), ("Female", DEEP_PINK)];

/// Ages of one gender within one split, in file order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenderAges {
    pub gender: &'static str,
    pub ages: Vec<f64>,
}

pub fn aggregate(dataset: &Path) -> Result<PerSplit<Vec<GenderAges>>> {
    let labels = load_split_labels(dataset, &[GENDER_COLUMN, AGE_COLUMN])
        .with_context(|| format!("loading labels from {}", dataset.display()))?;
    let ages = PerSplit {
        train: split_ages(Split::Train, &labels.train),
        test: split_ages(Split::Test, &labels.test),
    };
    super::log_aggregate("ages by gender", &ages);
    Ok(ages)
}

fn split_ages(split: Split, records: &[LabelRecord]) -> Vec<GenderAges> {
    GENDERS
        .iter()
        .map(|&(gender, _)| {
            let (ages, missing) = ages_for_category(records, gender);
            if missing > 0 {
                log::warn!("{split}: skipped {missing} {gender} rows without an age");
            }
            GenderAges { gender, ages }
        })
        .collect()
}

/// Overlaid Male/Female histograms per split, each with its own bins.
pub fn figure(ages: &PerSplit<Vec<GenderAges>>) -> Figure {
    let panels = Split::ALL
        .iter()
        .map(|&split| {
            let series = ages
                .get(split)
                .iter()
                .zip(GENDERS)
                .filter_map(|(group, (_, color))| {
                    let edges = BinEdges::auto(&group.ages, AUTO_MAX_BINS)?;
                    Some(HistogramSeries::new(group.gender, color, edges, &group.ages))
                })
                .collect();
            Panel::new(
                format!("Face count by age and gender ({})", split.title()),
                PanelBody::Histograms(series),
            )
            .x_label("Age")
            .x_range(0.0, 116.0)
            .with_legend()
        })
        .collect();

    Figure::new(figure_size(12, 4), 1, 2, panels)
}

pub fn run(dataset: &Path) -> Result<()> {
    let ages = aggregate(dataset)?;
    super::publish(figure(&ages), OUTPUT, WINDOW_TITLE)
}
