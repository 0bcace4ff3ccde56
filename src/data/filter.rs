use super::model::LabelRecord;

// ---------------------------------------------------------------------------
// Row selection by category
// ---------------------------------------------------------------------------

/// Ages of the records whose gender equals `category`, in file order.
///
/// Records without an age are left out; the second value counts them so the
/// caller can report how many rows were skipped.
pub fn ages_for_category(records: &[LabelRecord], category: &str) -> (Vec<f64>, usize) {
    let mut missing = 0;
    let ages = records
        .iter()
        .filter(|record| record.gender == category)
        .filter_map(|record| {
            if record.age.is_none() {
                missing += 1;
            }
            record.age
        })
        .collect();
    (ages, missing)
}

/// Non-blank gender labels in file order, plus how many blank cells were
/// left out. A blank cell is a missing label, not a category of its own.
pub fn labelled_genders(records: &[LabelRecord]) -> (Vec<&str>, usize) {
    let mut blank = 0;
    let genders = records
        .iter()
        .map(|record| record.gender.as_str())
        .filter(|gender| {
            let keep = !gender.trim().is_empty();
            if !keep {
                blank += 1;
            }
            keep
        })
        .collect();
    (genders, blank)
}
