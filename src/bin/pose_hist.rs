use clap::Parser;
use face_training_plots::cli::{init_logging, DatasetArgs};
use face_training_plots::tools::pose_hist;

fn main() -> anyhow::Result<()> {
    init_logging();
    let args = DatasetArgs::parse();
    pose_hist::run(&args.dataset)
}
