use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::mat::MatError;

/// Failures while loading labels, annotations or training logs.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse CSV {path}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path} has no '{column}' column")]
    MissingColumn { path: PathBuf, column: String },

    #[error("failed to walk {path}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to decode MAT file {path}")]
    Mat {
        path: PathBuf,
        #[source]
        source: MatError,
    },

    #[error("{path} has no numeric variable '{name}'")]
    MissingVariable { path: PathBuf, name: String },

    #[error("'{name}' in {path} holds {found} values per row, expected at least {expected}")]
    ShortVariable {
        path: PathBuf,
        name: String,
        found: usize,
        expected: usize,
    },

    #[error("malformed metric on line {line}")]
    LogLine {
        line: usize,
        #[source]
        source: NumberError,
    },
}

/// A captured log field that does not parse as a number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} '{value}' is not a number")]
pub struct NumberError {
    pub field: &'static str,
    pub value: String,
}
