use crate::models::{AnalysisReport, EnsembleSeries, QualificationTier};
use crate::utils::constants::{RECENT_MONTHS, RECENT_YEARS, ROLLING_MIN_PERIODS, ROLLING_WINDOW};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RollingPoint {
    pub year: i32,
    pub mean: f64,
}

/// Headline numbers for one ensemble.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendStatistics {
    pub pair_count: usize,
    pub first_year: i32,
    pub last_year: i32,
    pub recent_annual_mean: f64,
    pub recent_monthly_mean: f64,
    pub monthly_points: usize,
    /// Last point of the default centred rolling mean
    pub latest_rolling: Option<RollingPoint>,
}

pub struct TrendAnalyzer {
    recent_years: usize,
    recent_months: usize,
}

impl TrendAnalyzer {
    pub fn new() -> Self {
        Self {
            recent_years: RECENT_YEARS,
            recent_months: RECENT_MONTHS,
        }
    }

    pub fn with_recent_years(mut self, years: usize) -> Self {
        self.recent_years = years;
        self.recent_months = years * 12;
        self
    }

    /// Mean of the last `n` annual values
    pub fn recent_annual_mean(&self, ensemble: &EnsembleSeries, n: usize) -> Option<f64> {
        let values: Vec<f64> = ensemble.annual.iter().map(|a| a.anomaly).collect();
        tail_mean(&values, n)
    }

    /// Mean of the last `n` monthly values
    pub fn recent_monthly_mean(&self, ensemble: &EnsembleSeries, n: usize) -> Option<f64> {
        let values: Vec<f64> = ensemble.monthly.iter().map(|m| m.anomaly).collect();
        tail_mean(&values, n)
    }

    pub fn year_range(&self, ensemble: &EnsembleSeries) -> Option<(i32, i32)> {
        match (ensemble.annual.first(), ensemble.annual.last()) {
            (Some(first), Some(last)) => Some((first.year, last.year)),
            _ => None,
        }
    }

    /// Centred rolling mean over the annual series. For position `i` the
    /// window spans `i - window/2 ..= i + (window-1)/2`, clipped to the
    /// series; positions with fewer than `min_periods` values are omitted.
    pub fn rolling_annual_mean(
        &self,
        ensemble: &EnsembleSeries,
        window: usize,
        min_periods: usize,
    ) -> Vec<RollingPoint> {
        let annual = &ensemble.annual;
        if window == 0 {
            return Vec::new();
        }

        let before = window / 2;
        let after = (window - 1) / 2;
        annual
            .iter()
            .enumerate()
            .filter_map(|(i, point)| {
                let lo = i.saturating_sub(before);
                let hi = (i + after).min(annual.len() - 1);
                let slice = &annual[lo..=hi];
                if slice.len() < min_periods.max(1) {
                    return None;
                }
                let mean = slice.iter().map(|a| a.anomaly).sum::<f64>() / slice.len() as f64;
                Some(RollingPoint {
                    year: point.year,
                    mean,
                })
            })
            .collect()
    }

    pub fn statistics(&self, ensemble: &EnsembleSeries) -> Option<TrendStatistics> {
        let (first_year, last_year) = self.year_range(ensemble)?;
        Some(TrendStatistics {
            pair_count: ensemble.pair_count,
            first_year,
            last_year,
            recent_annual_mean: self.recent_annual_mean(ensemble, self.recent_years)?,
            recent_monthly_mean: self.recent_monthly_mean(ensemble, self.recent_months)?,
            monthly_points: ensemble.monthly.len(),
            latest_rolling: self.default_rolling(ensemble).last().copied(),
        })
    }

    /// Console summary of a full run
    pub fn generate_summary(&self, report: &AnalysisReport) -> String {
        let mut summary = String::new();

        summary.push_str("=== Ensemble Anomaly Report ===\n");
        summary.push_str(&format!(
            "INCLUSIVE Approach: {} pairs (mixed baselines)\n",
            report.inclusive_pairs().count()
        ));
        summary.push_str(&format!(
            "STRICT Approach: {} pairs (uniform baseline)\n",
            report.strict_pairs().count()
        ));
        summary.push_str(&format!("Dropped entries: {}\n", report.dropped.len()));

        for (label, ensemble) in [("INCLUSIVE", &report.inclusive), ("STRICT", &report.strict)] {
            match ensemble.as_ref().and_then(|e| self.statistics(e)) {
                Some(stats) => {
                    summary.push_str(&format!("\n{} Results (Annual):\n", label));
                    summary.push_str(&format!(
                        "  Years: {}-{}\n",
                        stats.first_year, stats.last_year
                    ));
                    summary.push_str(&format!(
                        "  Recent {}yr avg: {:+.2}°C\n",
                        self.recent_years, stats.recent_annual_mean
                    ));
                    summary.push_str(&format!(
                        "  Monthly data points: {}\n",
                        stats.monthly_points
                    ));
                    summary.push_str(&format!(
                        "  Recent {}yr monthly avg: {:+.2}°C\n",
                        self.recent_years, stats.recent_monthly_mean
                    ));
                    if let Some(point) = stats.latest_rolling {
                        summary.push_str(&format!(
                            "  {}yr rolling mean ({}): {:+.2}°C\n",
                            ROLLING_WINDOW, point.year, point.mean
                        ));
                    }
                }
                None => {
                    summary.push_str(&format!("\nNo valid pairs for {} approach.\n", label));
                }
            }
        }

        summary.push_str("\nStation Qualification Summary:\n");
        for outcome in &report.outcomes {
            let tier = outcome.tier();
            summary.push_str(&format!(
                "  {}: {} ({})\n",
                tier.as_str(),
                outcome.name(),
                outcome.pair.state
            ));
            match tier {
                QualificationTier::Strict | QualificationTier::Inclusive => {
                    if let Some(label) = outcome.strict_label() {
                        summary.push_str(&format!("      strict: {}\n", label));
                    }
                    if let Some(label) = outcome.inclusive_label() {
                        summary.push_str(&format!("      inclusive: {}\n", label));
                    }
                }
                QualificationTier::None => {}
            }
        }

        if !report.dropped.is_empty() {
            summary.push_str("\nDropped:\n");
            for dropped in &report.dropped {
                summary.push_str(&format!("  {}\n", dropped.describe()));
            }
        }

        summary
    }

    pub fn default_rolling(&self, ensemble: &EnsembleSeries) -> Vec<RollingPoint> {
        self.rolling_annual_mean(ensemble, ROLLING_WINDOW, ROLLING_MIN_PERIODS)
    }
}

impl Default for TrendAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn tail_mean(values: &[f64], n: usize) -> Option<f64> {
    if values.is_empty() || n == 0 {
        return None;
    }
    let tail = &values[values.len().saturating_sub(n)..];
    Some(tail.iter().sum::<f64>() / tail.len() as f64)
}
