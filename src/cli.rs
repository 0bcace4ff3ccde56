use std::path::PathBuf;

use clap::Parser;

/// Arguments of the dataset tools.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct DatasetArgs {
    /// Dataset directory holding train.csv/test.csv or train/ and test/
    #[arg(value_name = "DATASET")]
    pub dataset: PathBuf,
}

/// Arguments of the training-log visualizer.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct LogArgs {
    /// Training log written by the training run
    #[arg(value_name = "LOG")]
    pub log: PathBuf,
}

/// `RUST_LOG` wins; otherwise everything at info and above goes to stdout.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stdout)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_is_positional() {
        let args = DatasetArgs::try_parse_from(["gender-hist", "data/faces"]).unwrap();
        assert_eq!(args.dataset, PathBuf::from("data/faces"));
    }

    #[test]
    fn missing_argument_is_rejected() {
        assert!(LogArgs::try_parse_from(["visualize-log"]).is_err());
        assert!(DatasetArgs::try_parse_from(["pose-hist", "a", "b"]).is_err());
    }
}
