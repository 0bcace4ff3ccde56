use std::fs::File;
use std::path::Path;

use super::error::DataError;
use super::model::{LabelRecord, PerSplit};

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

pub const GENDER_COLUMN: &str = "Gender";
pub const AGE_COLUMN: &str = "Age";

// ---------------------------------------------------------------------------
// CSV label loader
// ---------------------------------------------------------------------------

/// Load `train.csv` and `test.csv` from a dataset directory.
///
/// Either split failing fails the whole load.
pub fn load_split_labels(
    dataset: &Path,
    required_columns: &[&str],
) -> Result<PerSplit<Vec<LabelRecord>>, DataError> {
    PerSplit::try_from_fn(|split| {
        let path = dataset.join(format!("{split}.csv"));
        load_labels(&path, required_columns)
    })
}

/// CSV layout: header row, then one face per row. Only the `Gender` and
/// `Age` columns are read; every column in `required_columns` must be present
/// in the header.
pub fn load_labels(path: &Path, required_columns: &[&str]) -> Result<Vec<LabelRecord>, DataError> {
    let csv_error = |source: csv::Error| DataError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::Reader::from_reader(file);

    let headers = reader.headers().map_err(csv_error)?.clone();
    for column in required_columns {
        if !headers.iter().any(|h| h == *column) {
            return Err(DataError::MissingColumn {
                path: path.to_path_buf(),
                column: column.to_string(),
            });
        }
    }

    let records = reader
        .deserialize::<LabelRecord>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(csv_error)?;

    log::info!("Loaded {} labels from {}", records.len(), path.display());
    Ok(records)
}
