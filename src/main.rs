use clap::Parser;
use station_pair_anomaly::cli::{run, Cli};
use station_pair_anomaly::error::Result;

fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}
