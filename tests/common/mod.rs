use std::fs;
use std::ops::Deref;
use std::path::{Path, PathBuf};

use face_training_plots::data::mat::{Compression, MatArray, MatFile};
use face_training_plots::data::pose::POSE_VARIABLE;

/// A fresh, empty directory under the system temp dir, unique per test and
/// removed again on drop.
pub struct ScratchDir(PathBuf);

impl Deref for ScratchDir {
    type Target = Path;

    fn deref(&self) -> &Path {
        &self.0
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

pub fn scratch_dir(name: &str) -> ScratchDir {
    let dir = std::env::temp_dir().join(format!(
        "face-training-plots-tools-{name}-{}",
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    ScratchDir(dir)
}

pub fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// A `Pose_Para` annotation with angles given in degrees.
pub fn write_pose(path: &Path, degrees: [f64; 3], compression: Compression) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let params = [
        degrees[0].to_radians(),
        degrees[1].to_radians(),
        degrees[2].to_radians(),
        200.0,
        210.0,
        0.0,
        0.002,
    ];
    MatFile::new(vec![MatArray::from_rows(POSE_VARIABLE, 1, params.len(), &params)])
        .save(path, compression)
        .unwrap();
}
