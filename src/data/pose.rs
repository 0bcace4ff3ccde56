use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::error::DataError;
use super::mat::MatFile;
use super::model::PoseAngles;

/// Extension of pose annotation files.
pub const ANNOTATION_EXTENSION: &str = "mat";
/// Stem suffix of the landmark files stored next to each annotation.
pub const LANDMARK_SUFFIX: &str = "_pts";
/// `[pitch yaw roll tdx tdy tdz scale_factor]`, angles in radians.
pub const POSE_VARIABLE: &str = "Pose_Para";

/// Whether `path` names a pose annotation rather than a landmark companion.
pub fn is_annotation_file(path: &Path) -> bool {
    let has_extension = path.extension().and_then(|ext| ext.to_str()) == Some(ANNOTATION_EXTENSION);
    let is_landmarks = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map_or(true, |stem| stem.ends_with(LANDMARK_SUFFIX));
    has_extension && !is_landmarks
}

/// Recursively collect annotation files under `dir`, in walk order.
///
/// Symlinked files are collected; symlinked directories are not descended.
pub fn find_annotation_files(dir: &Path) -> Result<Vec<PathBuf>, DataError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|source| DataError::Walk {
            path: dir.to_path_buf(),
            source,
        })?;
        let is_file = entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file());
        if is_file && is_annotation_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    log::debug!("found {} annotation files under {}", files.len(), dir.display());
    Ok(files)
}

/// Read pitch, yaw and roll (radians) from the first row of `Pose_Para`.
pub fn read_pose(path: &Path) -> Result<PoseAngles, DataError> {
    let mat = MatFile::open(path).map_err(|source| DataError::Mat {
        path: path.to_path_buf(),
        source,
    })?;

    let params = mat
        .variable(POSE_VARIABLE)
        .ok_or_else(|| DataError::MissingVariable {
            path: path.to_path_buf(),
            name: POSE_VARIABLE.to_string(),
        })?;

    let row = params.row(0).unwrap_or_default();
    match row[..] {
        [pitch, yaw, roll, ..] => Ok(PoseAngles { pitch, yaw, roll }),
        _ => Err(DataError::ShortVariable {
            path: path.to_path_buf(),
            name: POSE_VARIABLE.to_string(),
            found: row.len(),
            expected: 3,
        }),
    }
}
