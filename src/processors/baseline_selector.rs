use crate::config::BaselineSettings;
use crate::models::observation::{distinct_years, mean_tmax};
use crate::models::{
    BaselinePeriod, BaselineResult, BaselineSource, DropReason, QualificationTier, StitchedSeries,
};
use tracing::debug;

/// Strict and inclusive baseline decisions for one stitched series.
#[derive(Debug, Clone, PartialEq)]
pub struct BaselineSelection {
    pub strict: std::result::Result<BaselineResult, DropReason>,
    pub inclusive: std::result::Result<BaselineResult, DropReason>,
}

pub struct BaselineSelector {
    settings: BaselineSettings,
}

impl BaselineSelector {
    pub fn new() -> Self {
        Self {
            settings: BaselineSettings::default(),
        }
    }

    pub fn with_settings(settings: BaselineSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &BaselineSettings {
        &self.settings
    }

    /// Run both policies. Inclusive reuses the strict baseline whenever
    /// strict qualifies.
    pub fn select(&self, series: &StitchedSeries) -> BaselineSelection {
        let strict = self.select_strict(series);
        let inclusive = match &strict {
            Ok(baseline) => Ok(baseline.clone()),
            Err(_) => self.select_alternative(series),
        };

        BaselineSelection { strict, inclusive }
    }

    /// Fixed strict window with a minimum number of distinct years
    pub fn select_strict(
        &self,
        series: &StitchedSeries,
    ) -> std::result::Result<BaselineResult, DropReason> {
        let period = self.settings.strict_period();
        let window = series
            .series
            .years_window(period.start_year, period.end_year);
        let years = distinct_years(window).len();

        match mean_tmax(window) {
            Some(mean) if years >= self.settings.min_strict_years => Ok(BaselineResult {
                mean,
                period,
                tier: QualificationTier::Strict,
                source: BaselineSource::Standard,
                years,
                observations: window.len(),
            }),
            _ => Err(DropReason::InsufficientStrictBaseline {
                years,
                required: self.settings.min_strict_years,
            }),
        }
    }

    /// Fallback chain used when the strict window is inadequate: the fixed
    /// alternative windows in order, then a span derived from the years
    /// actually present.
    pub fn select_alternative(
        &self,
        series: &StitchedSeries,
    ) -> std::result::Result<BaselineResult, DropReason> {
        for &period in &self.settings.alternative_windows {
            let window = series
                .series
                .years_window(period.start_year, period.end_year);
            if window.len() < self.settings.min_alternative_observations {
                debug!(
                    period = %period,
                    observations = window.len(),
                    "Alternative baseline window too sparse"
                );
                continue;
            }
            if let Some(mean) = mean_tmax(window) {
                return Ok(BaselineResult {
                    mean,
                    period,
                    tier: QualificationTier::Inclusive,
                    source: BaselineSource::Alternative,
                    years: distinct_years(window).len(),
                    observations: window.len(),
                });
            }
        }

        self.select_data_driven(series)
    }

    fn select_data_driven(
        &self,
        series: &StitchedSeries,
    ) -> std::result::Result<BaselineResult, DropReason> {
        let years = series.series.distinct_years();
        let count = years.len();

        if count < self.settings.min_fallback_years {
            return Err(DropReason::NoBaselineEstablishable { years: count });
        }

        let span = self.settings.fallback_span_years;
        let (period, source) = if count >= span {
            // Asymmetric around the midpoint: span/2 years before, span/2 - 1 after
            let mid = count / 2;
            let start = years[mid - span / 2];
            let end = years[mid + span / 2 - 1];
            (BaselinePeriod::new(start, end), BaselineSource::DataDriven)
        } else {
            (
                BaselinePeriod::new(years[0], years[count - 1]),
                BaselineSource::FullRecord,
            )
        };

        let window = series
            .series
            .years_window(period.start_year, period.end_year);
        match mean_tmax(window) {
            Some(mean) => Ok(BaselineResult {
                mean,
                period,
                tier: QualificationTier::Inclusive,
                source,
                years: distinct_years(window).len(),
                observations: window.len(),
            }),
            None => Err(DropReason::NoBaselineEstablishable { years: count }),
        }
    }
}

impl Default for BaselineSelector {
    fn default() -> Self {
        Self::new()
    }
}
