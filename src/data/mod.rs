/// Data layer: record types, loaders and row selection.
///
/// Architecture:
/// ```text
///  train.csv / test.csv     <split>/**/*.mat        training log
///        │                        │                      │
///        ▼                        ▼                      ▼
///   ┌──────────┐          ┌─────────────┐       ┌──────────────┐
///   │  loader   │          │ pose + mat  │       │ training_log │
///   └──────────┘          └─────────────┘       └──────────────┘
///        │                        │                      │
///        ▼                        ▼                      ▼
///   ┌──────────┐          ┌─────────────┐       ┌──────────────┐
///   │  filter   │          │ PoseAngles  │       │ TrainingLog  │
///   └──────────┘          └─────────────┘       └──────────────┘
/// ```

pub mod error;
pub mod filter;
pub mod loader;
pub mod mat;
pub mod model;
pub mod pose;
pub mod training_log;

pub use error::DataError;
