use std::collections::{BTreeMap, HashMap};
use std::f64::consts::PI;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize, Serializer};

// ---------------------------------------------------------------------------
// Split / Angle – the fixed keys every tool aggregates over
// ---------------------------------------------------------------------------

/// A named partition of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Test,
}

impl Split {
    /// Panel order: train first, then test.
    pub const ALL: [Split; 2] = [Split::Train, Split::Test];

    /// Directory / file stem used on disk.
    pub fn as_str(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Test => "test",
        }
    }

    /// Capitalised form used in chart titles.
    pub fn title(self) -> &'static str {
        match self {
            Split::Train => "Train",
            Split::Test => "Test",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the three Euler angles of a head pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Angle {
    Pitch,
    Yaw,
    Roll,
}

impl Angle {
    /// Storage order inside `Pose_Para` and column order of the pose figure.
    pub const ALL: [Angle; 3] = [Angle::Pitch, Angle::Yaw, Angle::Roll];

    pub fn as_str(self) -> &'static str {
        match self {
            Angle::Pitch => "pitch",
            Angle::Yaw => "yaw",
            Angle::Roll => "roll",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Angle::Pitch => "Pitch",
            Angle::Yaw => "Yaw",
            Angle::Roll => "Roll",
        }
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value per split.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PerSplit<T> {
    pub train: T,
    pub test: T,
}

impl<T> PerSplit<T> {
    pub fn get(&self, split: Split) -> &T {
        match split {
            Split::Train => &self.train,
            Split::Test => &self.test,
        }
    }

    /// Build both halves with the same fallible loader, train first.
    pub fn try_from_fn<E>(mut f: impl FnMut(Split) -> Result<T, E>) -> Result<Self, E> {
        Ok(Self {
            train: f(Split::Train)?,
            test: f(Split::Test)?,
        })
    }
}

// ---------------------------------------------------------------------------
// LabelRecord – one row of train.csv / test.csv
// ---------------------------------------------------------------------------

/// A single labelled face. Columns other than `Gender` and `Age` are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LabelRecord {
    #[serde(rename = "Gender")]
    pub gender: String,
    /// Empty cells and files without an `Age` column give `None`.
    #[serde(rename = "Age", default)]
    pub age: Option<f64>,
}

// ---------------------------------------------------------------------------
// CategoryCounts – value counts of a categorical column
// ---------------------------------------------------------------------------

/// Occurrence counts ordered by descending count; ties keep first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryCounts {
    entries: Vec<(String, usize)>,
}

impl CategoryCounts {
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries: Vec<(String, usize)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for value in values {
            let value = value.as_ref();
            match index.get(value) {
                Some(&slot) => entries[slot].1 += 1,
                None => {
                    index.insert(value.to_string(), entries.len());
                    entries.push((value.to_string(), 1));
                }
            }
        }

        // sort_by is stable, so equal counts stay in appearance order
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        Self { entries }
    }

    pub fn get(&self, category: &str) -> usize {
        self.entries
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(name, count)| (name.as_str(), *count))
    }
}

impl Serialize for CategoryCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

// ---------------------------------------------------------------------------
// PoseAngles – the first three entries of Pose_Para
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PoseAngles {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

impl PoseAngles {
    pub fn get(&self, angle: Angle) -> f64 {
        match angle {
            Angle::Pitch => self.pitch,
            Angle::Yaw => self.yaw,
            Angle::Roll => self.roll,
        }
    }

    /// Radians to degrees, computed as `rad * 180 / PI`.
    pub fn to_degrees(self) -> Self {
        let convert = |rad: f64| rad * 180.0 / PI;
        Self {
            pitch: convert(self.pitch),
            yaw: convert(self.yaw),
            roll: convert(self.roll),
        }
    }
}

// ---------------------------------------------------------------------------
// PoseHistogram – (split, angle) → collected bin representatives
// ---------------------------------------------------------------------------

/// An angle that fell outside every bin and was dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutOfRange {
    pub split: Split,
    pub angle: Angle,
    pub file: PathBuf,
    pub degrees: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoseHistogram {
    values: BTreeMap<(Split, Angle), Vec<f64>>,
    dropped: Vec<OutOfRange>,
}

impl PoseHistogram {
    /// An aggregate with all six sequences present and empty.
    pub fn new() -> Self {
        let values = Split::ALL
            .iter()
            .flat_map(|&split| Angle::ALL.iter().map(move |&angle| ((split, angle), Vec::new())))
            .collect();
        Self {
            values,
            dropped: Vec::new(),
        }
    }

    pub fn record(&mut self, split: Split, angle: Angle, representative: f64) {
        self.values.entry((split, angle)).or_default().push(representative);
    }

    pub fn record_dropped(&mut self, dropped: OutOfRange) {
        self.dropped.push(dropped);
    }

    pub fn values(&self, split: Split, angle: Angle) -> &[f64] {
        self.values
            .get(&(split, angle))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn dropped(&self) -> &[OutOfRange] {
        &self.dropped
    }
}

impl Serialize for PoseHistogram {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(
            self.values
                .iter()
                .map(|((split, angle), values)| (format!("{split}/{angle}"), values)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn category_counts_are_ordered_by_count() {
        let counts = CategoryCounts::from_values(["Female", "Male", "Male", "Other", "Male"]);
        let ordered: Vec<_> = counts.iter().collect();
        assert_eq!(ordered, vec![("Male", 3), ("Female", 1), ("Other", 1)]);
        assert_eq!(counts.total(), 5);
        assert_eq!(counts.get("Unknown"), 0);
    }

    #[test]
    fn category_counts_serialize_in_order() {
        let counts = CategoryCounts::from_values(["b", "a", "a"]);
        let json = serde_json::to_string(&counts).unwrap();
        assert_eq!(json, r#"{"a":2,"b":1}"#);
    }

    #[test]
    fn degrees_conversion() {
        let pose = PoseAngles {
            pitch: PI / 2.0,
            yaw: -PI,
            roll: 0.0,
        }
        .to_degrees();
        assert_relative_eq!(pose.pitch, 90.0);
        assert_relative_eq!(pose.yaw, -180.0);
        assert_relative_eq!(pose.roll, 0.0);
    }

    #[test]
    fn pose_histogram_starts_with_six_empty_series() {
        let hist = PoseHistogram::new();
        let json = serde_json::to_value(&hist).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 6);
        assert!(hist.values(Split::Test, Angle::Roll).is_empty());
    }
}
