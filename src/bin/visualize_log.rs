use clap::Parser;
use face_training_plots::cli::{init_logging, LogArgs};
use face_training_plots::tools::visualize_log;

fn main() -> anyhow::Result<()> {
    init_logging();
    let args = LogArgs::parse();
    visualize_log::run(&args.log)
}
