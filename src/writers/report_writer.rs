use crate::analyzers::TrendAnalyzer;
use crate::error::Result;
use crate::models::{AnalysisReport, DroppedPair, EnsembleSeries, PairSummary};
use crate::utils::constants::{
    INCLUSIVE_ANNUAL_FILE, INCLUSIVE_MONTHLY_FILE, REPORT_FILE, STRICT_ANNUAL_FILE,
    STRICT_MONTHLY_FILE,
};
use serde::Serialize;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Serialize)]
struct MonthlyRow {
    year: i32,
    month: u32,
    anomaly: f64,
    pairs: usize,
}

#[derive(Debug, Serialize)]
struct AnnualRow {
    year: i32,
    anomaly: f64,
    months: usize,
    rolling_mean: Option<f64>,
}

#[derive(Debug, Serialize)]
struct ReportDocument<'a> {
    strict_pairs: usize,
    inclusive_pairs: usize,
    pairs: Vec<PairSummary>,
    dropped: &'a [DroppedPair],
    fully_dropped_pairs: Vec<String>,
}

pub struct ReportWriter;

impl ReportWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn write_monthly_csv(&self, path: &Path, ensemble: &EnsembleSeries) -> Result<()> {
        Self::ensure_parent(path)?;
        let mut writer = csv::Writer::from_path(path)?;
        for month in &ensemble.monthly {
            writer.serialize(MonthlyRow {
                year: month.month.year,
                month: month.month.month,
                anomaly: month.anomaly,
                pairs: month.pairs,
            })?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Annual series with its centred rolling mean; years with too few
    /// neighbours leave `rolling_mean` blank
    pub fn write_annual_csv(&self, path: &Path, ensemble: &EnsembleSeries) -> Result<()> {
        Self::ensure_parent(path)?;
        let points = TrendAnalyzer::new().default_rolling(ensemble);
        let mut rolling = points.iter().peekable();

        let mut writer = csv::Writer::from_path(path)?;
        for year in &ensemble.annual {
            let rolling_mean = rolling
                .next_if(|point| point.year == year.year)
                .map(|point| point.mean);
            writer.serialize(AnnualRow {
                year: year.year,
                anomaly: year.anomaly,
                months: year.months,
                rolling_mean,
            })?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write_report_json(&self, path: &Path, report: &AnalysisReport) -> Result<()> {
        Self::ensure_parent(path)?;
        let document = ReportDocument {
            strict_pairs: report.strict_pairs().count(),
            inclusive_pairs: report.inclusive_pairs().count(),
            pairs: report.summaries(),
            dropped: &report.dropped,
            fully_dropped_pairs: report.fully_dropped().map(|o| o.name()).collect(),
        };
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, &document)?;
        Ok(())
    }

    /// Write every available output into `output_dir`, returning the paths written
    pub fn write_all(&self, output_dir: &Path, report: &AnalysisReport) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(output_dir)?;
        let mut written = Vec::new();

        let ensembles = [
            (&report.strict, STRICT_MONTHLY_FILE, STRICT_ANNUAL_FILE),
            (&report.inclusive, INCLUSIVE_MONTHLY_FILE, INCLUSIVE_ANNUAL_FILE),
        ];
        for (ensemble, monthly_file, annual_file) in ensembles {
            if let Some(ensemble) = ensemble {
                let monthly_path = output_dir.join(monthly_file);
                self.write_monthly_csv(&monthly_path, ensemble)?;
                written.push(monthly_path);

                let annual_path = output_dir.join(annual_file);
                self.write_annual_csv(&annual_path, ensemble)?;
                written.push(annual_path);
            }
        }

        let report_path = output_dir.join(REPORT_FILE);
        self.write_report_json(&report_path, report)?;
        written.push(report_path);

        info!(files = written.len(), dir = %output_dir.display(), "Wrote outputs");
        Ok(written)
    }

    fn ensure_parent(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

impl Default for ReportWriter {
    fn default() -> Self {
        Self::new()
    }
}
