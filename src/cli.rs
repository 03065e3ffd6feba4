use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "agriscore",
    version,
    about = "Agricultural sensor dashboard with crop and disease insights"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to config.yaml
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override SQLite data directory
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Override the backend base URL from the config file
    #[arg(long)]
    pub base_url: Option<String>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Re-run interactive setup
    Init,
    /// Validate config and test the backend connection
    Check,
    /// Print the AgriScore for a reading without starting the dashboard
    Score(ScoreArgs),
}

/// Fields left out fall back to the configured initial reading.
#[derive(Args, Debug, Default)]
pub struct ScoreArgs {
    /// Nitrogen (mg/kg)
    #[arg(long)]
    pub n: Option<f64>,
    /// Phosphorus (mg/kg)
    #[arg(long)]
    pub p: Option<f64>,
    /// Potassium (mg/kg)
    #[arg(long)]
    pub k: Option<f64>,
    /// Temperature (°C)
    #[arg(long)]
    pub temp: Option<f64>,
    /// Relative humidity (%)
    #[arg(long)]
    pub humidity: Option<f64>,
    /// Soil pH
    #[arg(long)]
    pub ph: Option<f64>,
    /// Rainfall (mm)
    #[arg(long)]
    pub rainfall: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_score_subcommand() {
        let cli = Cli::try_parse_from(["agriscore", "score", "--n", "120", "--ph", "6.5"]).unwrap();
        match cli.command {
            Some(Commands::Score(args)) => {
                assert_eq!(args.n, Some(120.0));
                assert_eq!(args.ph, Some(6.5));
                assert!(args.temp.is_none());
            }
            _ => panic!("expected score subcommand"),
        }
    }

    #[test]
    fn verbosity_counts() {
        let cli = Cli::try_parse_from(["agriscore", "-vv", "--base-url", "http://localhost:8000"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.base_url.as_deref(), Some("http://localhost:8000"));
        assert!(cli.command.is_none());
    }
}
