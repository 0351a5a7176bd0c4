use crate::utils::constants::RECENT_YEARS;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "station-pair-anomaly")]
#[command(about = "Temperature anomaly ensembles from paired legacy/modern weather stations")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(
        short,
        long,
        global = true,
        help = "TOML configuration file with baseline settings and station pairs"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Stitch each pair, select baselines and build the strict and inclusive ensembles
    Analyze {
        #[arg(short, long, help = "Directory of cached GHCN-Daily <STATION_ID>.csv files")]
        data_dir: PathBuf,

        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,

        #[arg(long, default_value_t = num_cpus::get())]
        max_workers: usize,

        #[arg(
            long,
            default_value_t = RECENT_YEARS,
            help = "Years averaged for the recent-mean summary"
        )]
        recent_years: usize,

        #[arg(
            long,
            help = "Skip station rows with unparseable dates instead of failing the file"
        )]
        skip_bad_dates: bool,

        #[arg(short, long, help = "Suppress the progress bar")]
        quiet: bool,
    },

    /// List the configured station pairs
    Pairs,
}
