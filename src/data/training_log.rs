use std::fs;
use std::path::Path;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;

use super::error::{DataError, NumberError};

static TRAINING_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Epoch: ([0-9]+), learning Rate: ([0-9\.]+), average loss: ([0-9\.]+)")
        .expect("training line pattern is valid")
});

static VALIDATION_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Epoch: ([0-9]+), train accuracy: ([0-9\.]+), test accuracy: ([0-9\.]+)")
        .expect("validation line pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrainingPoint {
    pub epoch: u64,
    pub learning_rate: f64,
    pub loss: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValidationPoint {
    pub epoch: u64,
    pub train_accuracy: f64,
    pub test_accuracy: f64,
}

/// What one log line contributed. Both patterns are tried independently.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParsedLine {
    pub training: Option<TrainingPoint>,
    pub validation: Option<ValidationPoint>,
}

fn capture<T: FromStr>(caps: &Captures<'_>, group: usize, field: &'static str) -> Result<T, NumberError> {
    let value = &caps[group];
    value.parse().map_err(|_| NumberError {
        field,
        value: value.to_string(),
    })
}

/// Match a line against both patterns, anchored at the start of the line.
/// Text after the matched prefix is ignored.
pub fn parse_line(line: &str) -> Result<ParsedLine, NumberError> {
    let training = match TRAINING_LINE.captures(line) {
        Some(caps) => Some(TrainingPoint {
            epoch: capture(&caps, 1, "epoch")?,
            learning_rate: capture(&caps, 2, "learning rate")?,
            loss: capture(&caps, 3, "average loss")?,
        }),
        None => None,
    };

    let validation = match VALIDATION_LINE.captures(line) {
        Some(caps) => Some(ValidationPoint {
            epoch: capture(&caps, 1, "epoch")?,
            train_accuracy: capture(&caps, 2, "train accuracy")?,
            test_accuracy: capture(&caps, 3, "test accuracy")?,
        }),
        None => None,
    };

    Ok(ParsedLine {
        training,
        validation,
    })
}

/// Per-epoch metrics in the order they appear in the log.
///
/// Repeated or out-of-order epochs are kept as written, so a restarted run
/// shows up as a jagged line rather than being silently merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrainingLog {
    pub training: Vec<TrainingPoint>,
    pub validation: Vec<ValidationPoint>,
}

impl TrainingLog {
    pub fn load(path: &Path) -> Result<Self, DataError> {
        let text = fs::read_to_string(path).map_err(|source| DataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let log = Self::parse(&text)?;
        log::info!(
            "Parsed {} training and {} validation entries from {}",
            log.training.len(),
            log.validation.len(),
            path.display()
        );
        Ok(log)
    }

    pub fn parse(text: &str) -> Result<Self, DataError> {
        let mut log = Self::default();
        for (index, line) in text.lines().enumerate() {
            let parsed = parse_line(line).map_err(|source| DataError::LogLine {
                line: index + 1,
                source,
            })?;
            log.training.extend(parsed.training);
            log.validation.extend(parsed.validation);
        }
        Ok(log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn training_line() {
        let parsed = parse_line("Epoch: 3, learning Rate: 0.01, average loss: 0.523").unwrap();
        assert_eq!(
            parsed.training,
            Some(TrainingPoint {
                epoch: 3,
                learning_rate: 0.01,
                loss: 0.523
            })
        );
        assert_eq!(parsed.validation, None);
    }

    #[test]
    fn validation_line() {
        let parsed = parse_line("Epoch: 3, train accuracy: 0.91, test accuracy: 0.88").unwrap();
        assert_eq!(
            parsed.validation,
            Some(ValidationPoint {
                epoch: 3,
                train_accuracy: 0.91,
                test_accuracy: 0.88
            })
        );
        assert_eq!(parsed.training, None);
    }

    #[test]
    fn garbage_contributes_nothing() {
        assert_eq!(parse_line("garbage").unwrap(), ParsedLine::default());
    }

    #[test]
    fn match_is_anchored_at_line_start_only() {
        let prefixed = parse_line("[info] Epoch: 3, learning Rate: 0.01, average loss: 0.5").unwrap();
        assert_eq!(prefixed.training, None);

        let suffixed = parse_line("Epoch: 3, learning Rate: 0.01, average loss: 0.5 (12.3s)").unwrap();
        assert_eq!(suffixed.training.map(|p| p.loss), Some(0.5));
    }

    #[test]
    fn series_keep_file_order_and_duplicates() {
        let text = "\
Epoch: 2, learning Rate: 0.1, average loss: 0.9
noise
Epoch: 1, learning Rate: 0.1, average loss: 1.2
Epoch: 1, train accuracy: 0.5, test accuracy: 0.4
Epoch: 2, learning Rate: 0.1, average loss: 0.8
";
        let log = TrainingLog::parse(text).unwrap();
        let epochs: Vec<u64> = log.training.iter().map(|p| p.epoch).collect();
        assert_eq!(epochs, vec![2, 1, 2]);
        assert_eq!(log.validation.len(), 1);
    }

    #[test]
    fn malformed_number_is_fatal() {
        let err = TrainingLog::parse("ok\nEpoch: 1, learning Rate: 0.1.2, average loss: 0.5\n").unwrap_err();
        match err {
            DataError::LogLine { line, source } => {
                assert_eq!(line, 2);
                assert_eq!(source.field, "learning rate");
                assert_eq!(source.value, "0.1.2");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
