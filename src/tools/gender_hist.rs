use std::path::Path;

use anyhow::{Context, Result};

use crate::chart::{figure_size, Bar, Figure, Panel, PanelBody};
use crate::color::{ColorMap, DEEP_PINK, DODGER_BLUE};
use crate::data::filter::labelled_genders;
use crate::data::loader::{load_split_labels, GENDER_COLUMN};
use crate::data::model::{CategoryCounts, LabelRecord, PerSplit, Split};

pub const OUTPUT: &str = "gender-hist.png";

const WINDOW_TITLE: &str = "Face count by gender";

/// Gender value counts of `train.csv` and `test.csv`. Blank cells are not
/// counted.
pub fn aggregate(dataset: &Path) -> Result<PerSplit<CategoryCounts>> {
    let labels = load_split_labels(dataset, &[GENDER_COLUMN])
        .with_context(|| format!("loading labels from {}", dataset.display()))?;
    let counts = PerSplit {
        train: split_counts(Split::Train, &labels.train),
        test: split_counts(Split::Test, &labels.test),
    };
    super::log_aggregate("gender counts", &counts);
    Ok(counts)
}

fn split_counts(split: Split, records: &[LabelRecord]) -> CategoryCounts {
    let (genders, blank) = labelled_genders(records);
    if blank > 0 {
        log::warn!("{split}: skipped {blank} rows without a gender");
    }
    CategoryCounts::from_values(genders)
}

/// One bar panel per split, bars in descending count order.
pub fn figure(counts: &PerSplit<CategoryCounts>) -> Figure {
    let colors = ColorMap::new(&[("Male", DODGER_BLUE), ("Female", DEEP_PINK)]);

    let panels = Split::ALL
        .iter()
        .map(|&split| {
            let counts = counts.get(split);
            let palette = colors.resolve(counts.iter().map(|(category, _)| category));
            let bars = counts
                .iter()
                .zip(palette)
                .map(|((category, count), color)| Bar {
                    category: category.to_string(),
                    value: count as f64,
                    color,
                })
                .collect();
            Panel::new(format!("Face count by gender ({})", split.title()), PanelBody::Bars(bars))
        })
        .collect();

    Figure::new(figure_size(12, 4), 1, 2, panels)
}

pub fn run(dataset: &Path) -> Result<()> {
    let counts = aggregate(dataset)?;
    for split in Split::ALL {
        log::info!("{split}: {} faces in {} categories", counts.get(split).total(), counts.get(split).len());
    }
    super::publish(figure(&counts), OUTPUT, WINDOW_TITLE)
}
