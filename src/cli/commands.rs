use crate::analyzers::TrendAnalyzer;
use crate::cli::args::{Cli, Commands};
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::processors::PairProcessor;
use crate::utils::progress::ProgressReporter;
use crate::writers::ReportWriter;
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    let config = AnalysisConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze {
            data_dir,
            output_dir,
            max_workers,
            recent_years,
            skip_bad_dates,
            quiet,
        } => {
            println!("Analyzing {} station pairs...", config.pairs.len());
            println!("Data directory: {}", data_dir.display());
            println!("Output directory: {}", output_dir.display());
            println!("Workers: {}", max_workers);

            let progress =
                ProgressReporter::new(config.pairs.len() as u64, "Processing pairs...", quiet);

            let processor = PairProcessor::new(max_workers)
                .with_settings(config.baseline.clone())
                .with_skip_bad_dates(skip_bad_dates);
            let report = processor.process_directory(&config.pairs, &data_dir, Some(&progress))?;

            let analyzer = TrendAnalyzer::new().with_recent_years(recent_years);
            println!("\n{}", analyzer.generate_summary(&report));

            let written = ReportWriter::new().write_all(&output_dir, &report)?;
            for path in &written {
                println!("Wrote {}", path.display());
            }

            info!(
                strict = report.strict_pairs().count(),
                inclusive = report.inclusive_pairs().count(),
                fully_dropped = report.fully_dropped().count(),
                "Analysis complete"
            );
        }

        Commands::Pairs => {
            println!("Configured station pairs ({}):", config.pairs.len());
            for (i, pair) in config.pairs.iter().enumerate() {
                println!(
                    "{:>3}. {} [{} -> {}] {} ({:.4}, {:.4})",
                    i + 1,
                    pair.title(),
                    pair.legacy_id,
                    pair.modern_id,
                    pair.state,
                    pair.latitude,
                    pair.longitude
                );
            }
            println!(
                "\nStrict baseline: {} (min {} years)",
                config.baseline.strict_period(),
                config.baseline.min_strict_years
            );
            let alternatives: Vec<String> = config
                .baseline
                .alternative_windows
                .iter()
                .map(|w| w.label())
                .collect();
            println!("Alternative windows: {}", alternatives.join(", "));
        }
    }

    Ok(())
}

fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second initialisation (e.g. from tests) is ignored
    match log_file {
        Some(path) => {
            let file = File::create(path)?;
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init();
        }
    }
    Ok(())
}
