//! Backend-independent figure description.
//!
//! Tools build a [`Figure`] once; [`crate::render`] draws it into a PNG and
//! [`crate::ui::plot`] draws the same figure interactively.

use crate::color::SeriesColor;
use crate::histogram::BinEdges;

/// Output resolution, matching the 80 DPI the figures were designed at.
pub const DPI: u32 = 80;

/// Pixel size of a figure given in inches.
pub const fn figure_size(width_in: u32, height_in: u32) -> (u32, u32) {
    (width_in * DPI, height_in * DPI)
}

/// Headroom above the tallest bar or line point.
const Y_PADDING: f64 = 0.05;

// ---------------------------------------------------------------------------
// Figure
// ---------------------------------------------------------------------------

/// A grid of panels, laid out row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub size: (u32, u32),
    pub rows: usize,
    pub cols: usize,
    /// All panels use the union of their y extents.
    pub share_y: bool,
    pub panels: Vec<Panel>,
}

/// Axis limits of one panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: (f64, f64),
    pub y: (f64, f64),
}

impl Figure {
    pub fn new(size: (u32, u32), rows: usize, cols: usize, panels: Vec<Panel>) -> Self {
        Self {
            size,
            rows,
            cols,
            share_y: true,
            panels,
        }
    }

    fn shared_y(&self) -> Option<(f64, f64)> {
        self.panels
            .iter()
            .filter_map(|panel| panel.body.data_bounds())
            .map(|bounds| bounds.y)
            .reduce(|a, b| (a.0.min(b.0), a.1.max(b.1)))
    }

    /// Axis limits for `panels[index]`, including padding and y sharing.
    pub fn panel_bounds(&self, index: usize) -> Bounds {
        let panel = &self.panels[index];
        let data = panel.body.data_bounds();

        let (x_min, mut x_max) = panel
            .x_range
            .or(data.map(|bounds| bounds.x))
            .unwrap_or((0.0, 1.0));
        if x_max <= x_min {
            x_max = x_min + 1.0;
        }

        let y = if self.share_y {
            self.shared_y()
        } else {
            data.map(|bounds| bounds.y)
        };
        let (mut y_min, mut y_max) = y.unwrap_or((0.0, 1.0));

        if y_max <= y_min {
            y_max = y_min + 1.0;
        }
        let pad = (y_max - y_min) * Y_PADDING;
        if !panel.body.is_counts() {
            y_min -= pad;
        }
        y_max += pad;

        Bounds {
            x: (x_min, x_max),
            y: (y_min, y_max),
        }
    }
}

// ---------------------------------------------------------------------------
// Panel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub title: String,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    /// Fixed x limits; otherwise the data extent is used.
    pub x_range: Option<(f64, f64)>,
    pub legend: bool,
    pub body: PanelBody,
}

impl Panel {
    pub fn new(title: impl Into<String>, body: PanelBody) -> Self {
        Self {
            title: title.into(),
            x_label: None,
            y_label: None,
            x_range: None,
            legend: false,
            body,
        }
    }

    pub fn x_label(mut self, label: impl Into<String>) -> Self {
        self.x_label = Some(label.into());
        self
    }

    pub fn y_label(mut self, label: impl Into<String>) -> Self {
        self.y_label = Some(label.into());
        self
    }

    pub fn x_range(mut self, min: f64, max: f64) -> Self {
        self.x_range = Some((min, max));
        self
    }

    pub fn with_legend(mut self) -> Self {
        self.legend = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelBody {
    /// One bar per category, evenly spaced.
    Bars(Vec<Bar>),
    /// Overlaid histograms with their own bin edges.
    Histograms(Vec<HistogramSeries>),
    Lines(Vec<LineSeries>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub category: String,
    pub value: f64,
    pub color: SeriesColor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSeries {
    pub label: String,
    pub color: SeriesColor,
    pub edges: BinEdges,
    pub counts: Vec<usize>,
}

impl HistogramSeries {
    pub fn new(label: impl Into<String>, color: SeriesColor, edges: BinEdges, values: &[f64]) -> Self {
        let counts = edges.counts(values);
        Self {
            label: label.into(),
            color,
            edges,
            counts,
        }
    }

    /// `(lower edge, upper edge, count)` per bin.
    pub fn bins(&self) -> impl Iterator<Item = (f64, f64, usize)> + '_ {
        self.edges
            .edges()
            .windows(2)
            .zip(&self.counts)
            .map(|(pair, &count)| (pair[0], pair[1], count))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineSeries {
    pub label: String,
    pub color: SeriesColor,
    pub points: Vec<(f64, f64)>,
}

impl PanelBody {
    /// Bars and histograms are anchored at zero.
    pub fn is_counts(&self) -> bool {
        !matches!(self, PanelBody::Lines(_))
    }

    /// Extent of the plotted data, `None` when there is nothing to draw.
    pub fn data_bounds(&self) -> Option<Bounds> {
        match self {
            PanelBody::Bars(bars) => {
                let top = bars.iter().map(|bar| bar.value).reduce(f64::max)?;
                Some(Bounds {
                    x: (-0.5, bars.len() as f64 - 0.5),
                    y: (0.0, top),
                })
            }
            PanelBody::Histograms(series) => {
                let non_empty: Vec<&HistogramSeries> =
                    series.iter().filter(|s| s.edges.bin_count() > 0).collect();
                let x_min = non_empty.iter().map(|s| s.edges.first()).reduce(f64::min)?;
                let x_max = non_empty.iter().map(|s| s.edges.last()).reduce(f64::max)?;
                let top = non_empty
                    .iter()
                    .flat_map(|s| s.counts.iter())
                    .copied()
                    .max()
                    .unwrap_or(0);
                Some(Bounds {
                    x: (x_min, x_max),
                    y: (0.0, top as f64),
                })
            }
            PanelBody::Lines(lines) => {
                let points = || lines.iter().flat_map(|line| line.points.iter().copied());
                let x_min = points().map(|p| p.0).reduce(f64::min)?;
                let x_max = points().map(|p| p.0).reduce(f64::max)?;
                let y_min = points().map(|p| p.1).reduce(f64::min)?;
                let y_max = points().map(|p| p.1).reduce(f64::max)?;
                Some(Bounds {
                    x: (x_min, x_max),
                    y: (y_min, y_max),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{CRIMSON, DODGER_BLUE};
    use approx::assert_relative_eq;

    fn bars(values: &[f64]) -> PanelBody {
        PanelBody::Bars(
            values
                .iter()
                .enumerate()
                .map(|(i, &value)| Bar {
                    category: format!("c{i}"),
                    value,
                    color: DODGER_BLUE,
                })
                .collect(),
        )
    }

    #[test]
    fn shared_y_uses_tallest_panel() {
        let figure = Figure::new(
            figure_size(12, 4),
            1,
            2,
            vec![Panel::new("left", bars(&[2.0, 1.0])), Panel::new("right", bars(&[10.0]))],
        );
        let left = figure.panel_bounds(0);
        assert_eq!(left.y.0, 0.0);
        assert_relative_eq!(left.y.1, 10.5);
        assert_eq!(left.x, (-0.5, 1.5));
        assert_eq!(figure.panel_bounds(1).y, left.y);
    }

    #[test]
    fn unshared_y_and_fixed_x() {
        let edges = BinEdges::linear(0.0, 10.0, 2);
        let hist = HistogramSeries::new("a", CRIMSON, edges, &[1.0, 2.0, 15.0]);
        let mut figure = Figure::new(
            (100, 100),
            1,
            2,
            vec![
                Panel::new("h", PanelBody::Histograms(vec![hist])).x_range(-5.0, 25.0),
                Panel::new("b", bars(&[40.0])),
            ],
        );
        figure.share_y = false;

        let bounds = figure.panel_bounds(0);
        assert_eq!(bounds.x, (-5.0, 25.0));
        assert_relative_eq!(bounds.y.1, 2.1);
    }

    #[test]
    fn lines_are_padded_on_both_sides() {
        let line = LineSeries {
            label: "loss".into(),
            color: CRIMSON,
            points: vec![(1.0, 1.0), (2.0, 3.0)],
        };
        let figure = Figure::new((100, 100), 1, 1, vec![Panel::new("l", PanelBody::Lines(vec![line]))]);
        let bounds = figure.panel_bounds(0);
        assert_eq!(bounds.x, (1.0, 2.0));
        assert_relative_eq!(bounds.y.0, 0.9);
        assert_relative_eq!(bounds.y.1, 3.1);
    }

    #[test]
    fn empty_panels_fall_back_to_unit_axes() {
        let figure = Figure::new((100, 100), 1, 1, vec![Panel::new("empty", PanelBody::Lines(vec![]))]);
        let bounds = figure.panel_bounds(0);
        assert_eq!(bounds.x, (0.0, 1.0));
        assert_relative_eq!(bounds.y.0, -0.05);
        assert_relative_eq!(bounds.y.1, 1.05);
    }
}
