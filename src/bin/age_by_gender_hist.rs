use clap::Parser;
use face_training_plots::cli::{init_logging, DatasetArgs};
use face_training_plots::tools::age_by_gender_hist;

fn main() -> anyhow::Result<()> {
    init_logging();
    let args = DatasetArgs::parse();
    age_by_gender_hist::run(&args.dataset)
}
