//! Fixed-width binning.

use once_cell::sync::Lazy;
use serde::Serialize;

/// Lower edge of the first pose bin, in degrees.
pub const POSE_BIN_START: f64 = -99.0;
/// Width of every pose bin, in degrees.
pub const POSE_BIN_WIDTH: f64 = 3.0;
/// Number of pose bins; together they cover `[-99, 99)`.
pub const POSE_BIN_COUNT: usize = 66;

/// Upper bound on automatically chosen bin counts.
pub const AUTO_MAX_BINS: usize = 50;

static POSE_BINS: Lazy<BinEdges> =
    Lazy::new(|| BinEdges::linear(POSE_BIN_START, POSE_BIN_WIDTH, POSE_BIN_COUNT));

/// Ordered bin edges. Bin `i` is the half-open interval `[edge[i], edge[i + 1])`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinEdges {
    edges: Vec<f64>,
}

impl BinEdges {
    /// `count` bins of equal `width` starting at `start`.
    pub fn linear(start: f64, width: f64, count: usize) -> Self {
        Self {
            edges: (0..=count).map(|i| start + i as f64 * width).collect(),
        }
    }

    /// `count` equal bins spanning `[min, max]`.
    pub fn spanning(min: f64, max: f64, count: usize) -> Self {
        let count = count.max(1);
        let width = (max - min) / count as f64;
        let mut edges: Vec<f64> = (0..count).map(|i| min + i as f64 * width).collect();
        edges.push(max);
        Self { edges }
    }

    /// The head-pose table: edges `-99, -96, ..., 99`.
    pub fn pose() -> &'static BinEdges {
        &POSE_BINS
    }

    /// Bins chosen with the Freedman–Diaconis rule, capped at `max_bins`.
    ///
    /// Fewer than two values give a single bin; a zero interquartile range
    /// falls back to `sqrt(n)` bins. Returns `None` for an empty input.
    pub fn auto(values: &[f64], max_bins: usize) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len();
        let (mut min, mut max) = (sorted[0], sorted[n - 1]);

        let count = if n < 2 {
            1
        } else {
            let iqr = percentile(&sorted, 75.0) - percentile(&sorted, 25.0);
            let width = 2.0 * iqr / (n as f64).cbrt();
            if width == 0.0 {
                (n as f64).sqrt() as usize
            } else {
                ((max - min) / width).ceil() as usize
            }
        };

        if min == max {
            min -= 0.5;
            max += 0.5;
        }
        Some(Self::spanning(min, max, count.clamp(1, max_bins.max(1))))
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn bin_count(&self) -> usize {
        self.edges.len().saturating_sub(1)
    }

    pub fn first(&self) -> f64 {
        self.edges.first().copied().unwrap_or(0.0)
    }

    pub fn last(&self) -> f64 {
        self.edges.last().copied().unwrap_or(0.0)
    }

    /// Index of the first bin with `edge[i] <= value < edge[i + 1]`.
    /// Values outside the table, and NaN, have no bin.
    pub fn classify(&self, value: f64) -> Option<usize> {
        self.edges
            .windows(2)
            .position(|pair| pair[0] <= value && value < pair[1])
    }

    /// Lower edge of the bin holding `value`.
    pub fn representative(&self, value: f64) -> Option<f64> {
        self.classify(value).map(|bin| self.edges[bin])
    }

    /// Per-bin counts.
    ///
    /// Like a plotted histogram, the last bin also takes values equal to the
    /// final edge. Values without a bin are ignored.
    pub fn counts(&self, values: &[f64]) -> Vec<usize> {
        let mut counts = vec![0; self.bin_count()];
        let last = self.last();
        for &value in values {
            let bin = self
                .classify(value)
                .or_else(|| (value == last && !counts.is_empty()).then(|| counts.len() - 1));
            if let Some(bin) = bin {
                counts[bin] += 1;
            }
        }
        counts
    }
}

/// Linear-interpolated percentile of sorted data.
fn percentile(sorted: &[f64], pct: f64) -> f64 {
    let rank = pct / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn pose_table_layout() {
        let bins = BinEdges::pose();
        assert_eq!(bins.bin_count(), 66);
        assert_eq!(bins.first(), -99.0);
        assert_eq!(bins.last(), 99.0);
        assert!(bins.edges().windows(2).all(|pair| pair[1] - pair[0] == 3.0));
    }

    #[test]
    fn representative_matches_closed_form() {
        let bins = BinEdges::pose();
        // quarter-degree grid over [-99, 99)
        for step in 0..(198 * 4) {
            let value = -99.0 + step as f64 * 0.25;
            let expected = -99.0 + 3.0 * ((value + 99.0) / 3.0).floor();
            assert_eq!(bins.representative(value), Some(expected), "value {value}");
        }
    }

    #[test]
    fn range_boundaries() {
        let bins = BinEdges::pose();
        assert_eq!(bins.representative(-99.0), Some(-99.0));
        assert_eq!(bins.representative(98.999), Some(96.0));
        assert_eq!(bins.representative(99.0), None);
        assert_eq!(bins.representative(-100.0), None);
        assert_eq!(bins.representative(f64::NAN), None);
    }

    #[test]
    fn counts_close_the_last_bin() {
        let bins = BinEdges::linear(0.0, 1.0, 3);
        assert_eq!(bins.counts(&[0.0, 0.5, 2.5, 3.0, 3.5, -1.0]), vec![2, 0, 2]);
    }

    #[test]
    fn auto_bins_follow_freedman_diaconis() {
        // iqr = 50, width = 100 / 101^(1/3) ≈ 21.47, range 100 → 5 bins
        let values: Vec<f64> = (0..=100).map(f64::from).collect();
        let bins = BinEdges::auto(&values, AUTO_MAX_BINS).unwrap();
        assert_eq!(bins.bin_count(), 5);
        assert_relative_eq!(bins.first(), 0.0);
        assert_relative_eq!(bins.last(), 100.0);
        assert_eq!(bins.counts(&values).iter().sum::<usize>(), 101);
    }

    #[test]
    fn auto_bins_degenerate_inputs() {
        assert_eq!(BinEdges::auto(&[], AUTO_MAX_BINS), None);

        let single = BinEdges::auto(&[7.0], AUTO_MAX_BINS).unwrap();
        assert_eq!(single.edges(), &[6.5, 7.5]);

        // zero IQR: sqrt(9) = 3 bins
        let flat = BinEdges::auto(&[1.0, 2.0, 2.0, 2.0, 2.0, 2.0, 2.0, 2.0, 3.0], AUTO_MAX_BINS).unwrap();
        assert_eq!(flat.bin_count(), 3);

        // a far outlier stretches the range well past 50 bin widths
        let mut spread: Vec<f64> = (0..1000).map(f64::from).collect();
        spread.push(1e6);
        let capped = BinEdges::auto(&spread, 50).unwrap();
        assert_eq!(capped.bin_count(), 50);
    }
}
