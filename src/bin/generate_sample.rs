use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use face_training_plots::cli::init_logging;
use face_training_plots::data::mat::{Compression, MatArray, MatFile};
use face_training_plots::data::pose::POSE_VARIABLE;

/// Write a small synthetic dataset that every plotting tool can read.
#[derive(Parser, Debug)]
#[command(author, version)]
struct Args {
    /// Output directory
    #[arg(long, default_value = "sample-data")]
    out: PathBuf,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

// ---------------------------------------------------------------------------
// Labels: train.csv / test.csv
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct LabelRow {
    #[serde(rename = "Path")]
    path: String,
    #[serde(rename = "Gender")]
    gender: &'static str,
    #[serde(rename = "Age")]
    age: Option<u32>,
}

fn write_labels(path: &Path, faces: usize, rng: &mut SimpleRng) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    for i in 0..faces {
        let gender = if rng.next_f64() < 0.55 { "Male" } else { "Female" };
        let mean = if gender == "Male" { 38.0 } else { 31.0 };
        // Every 40th face has no age, as in hand-labelled sets.
        let age = (i % 40 != 39).then(|| rng.gauss(mean, 14.0).clamp(1.0, 100.0).round() as u32);
        writer.serialize(LabelRow {
            path: format!("images/{i:05}.jpg"),
            gender,
            age,
        })?;
    }
    writer.flush()?;
    log::info!("Wrote {faces} labels to {}", path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Pose annotations: <split>/<subset>/*.mat
// ---------------------------------------------------------------------------

const SUBSETS: [&str; 3] = ["AFW", "HELEN", "LFPW"];

fn write_annotations(dir: &Path, files: usize, rng: &mut SimpleRng) -> Result<()> {
    let mut out_of_range = 0;
    for i in 0..files {
        let subset_dir = dir.join(SUBSETS[i % SUBSETS.len()]);
        fs::create_dir_all(&subset_dir).with_context(|| format!("creating {}", subset_dir.display()))?;

        let pitch = rng.gauss(0.0, 15.0).to_radians();
        let mut yaw = rng.gauss(0.0, 35.0).to_radians();
        let roll = rng.gauss(0.0, 8.0).to_radians();
        // Every 25th face turns past the edge of the pose table.
        if i % 25 == 24 {
            yaw = 105f64.to_radians().copysign(yaw);
            out_of_range += 1;
        }

        // [pitch yaw roll tdx tdy tdz scale_factor]
        let params = [pitch, yaw, roll, 220.0, 230.0, 0.0, 0.0017];
        let pose = MatFile::new(vec![MatArray::from_rows(POSE_VARIABLE, 1, params.len(), &params)]);

        let stem = format!("image_{i:05}");
        let compression = if i % 2 == 0 { Compression::Zlib } else { Compression::None };
        let path = subset_dir.join(format!("{stem}.mat"));
        pose.save(&path, compression)
            .with_context(|| format!("writing {}", path.display()))?;

        // Landmark companion, which the pose tool must skip.
        let landmarks: Vec<f64> = (0..68 * 2).map(|_| rng.next_f64() * 450.0).collect();
        let pts = MatFile::new(vec![MatArray::from_rows("pts_2d", 68, 2, &landmarks)]);
        let pts_path = subset_dir.join(format!("{stem}_pts.mat"));
        pts.save(&pts_path, Compression::None)
            .with_context(|| format!("writing {}", pts_path.display()))?;
    }
    log::info!("Wrote {files} annotations under {} ({out_of_range} out of range)", dir.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Training log
// ---------------------------------------------------------------------------

fn write_log(path: &Path, epochs: u64, rng: &mut SimpleRng) -> Result<()> {
    let file = fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);

    writeln!(out, "Loading dataset...")?;
    let mut learning_rate = 0.1;
    for epoch in 1..=epochs {
        if epoch % 20 == 0 {
            learning_rate *= 0.1;
        }
        let loss = (2.5 * (-(epoch as f64) / 15.0).exp() + 0.05 + rng.next_f64() * 0.03).max(0.0);
        writeln!(out, "Epoch: {epoch}, learning Rate: {learning_rate:.6}, average loss: {loss:.6}")?;

        if epoch % 5 == 0 {
            let train = (1.0 - 0.5 * (-(epoch as f64) / 10.0).exp() - rng.next_f64() * 0.02).clamp(0.0, 1.0);
            let test = (train - 0.05 - rng.next_f64() * 0.03).clamp(0.0, 1.0);
            writeln!(out, "Epoch: {epoch}, train accuracy: {train:.6}, test accuracy: {test:.6}")?;
        }
    }
    writeln!(out, "Done.")?;
    out.flush()?;
    log::info!("Wrote {epochs} epochs to {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();
    let mut rng = SimpleRng::new(42);

    fs::create_dir_all(&args.out).with_context(|| format!("creating {}", args.out.display()))?;

    write_labels(&args.out.join("train.csv"), 800, &mut rng)?;
    write_labels(&args.out.join("test.csv"), 200, &mut rng)?;
    write_annotations(&args.out.join("train"), 300, &mut rng)?;
    write_annotations(&args.out.join("test"), 100, &mut rng)?;
    write_log(&args.out.join("train.log"), 60, &mut rng)?;

    println!("Wrote sample dataset to {}", args.out.display());
    Ok(())
}
