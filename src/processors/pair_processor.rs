use crate::config::BaselineSettings;
use crate::error::{ProcessingError, Result};
use crate::models::{
    AnalysisReport, DropReason, DroppedPair, MonthlyAnomalySeries, PairOutcome, QualifiedPair,
    StationPairDescriptor, StationSeries,
};
use crate::processors::{
    AnomalyComputer, BaselineSelector, EnsembleAggregator, RecordStitcher, StitchOutcome,
};
use crate::readers::GhcnDailyReader;
use crate::utils::progress::ProgressReporter;
use rayon::prelude::*;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Raw records supplied for one configured pair.
#[derive(Debug, Clone)]
pub struct PairInput {
    pub pair: StationPairDescriptor,
    pub legacy: Option<StationSeries>,
    pub modern: Option<StationSeries>,
}

impl PairInput {
    pub fn new(
        pair: StationPairDescriptor,
        legacy: Option<StationSeries>,
        modern: Option<StationSeries>,
    ) -> Self {
        Self {
            pair,
            legacy,
            modern,
        }
    }
}

pub struct PairProcessor {
    max_workers: usize,
    settings: BaselineSettings,
    skip_bad_dates: bool,
}

impl PairProcessor {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers,
            settings: BaselineSettings::default(),
            skip_bad_dates: false,
        }
    }

    pub fn with_settings(mut self, settings: BaselineSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Skip rows with unparseable dates when reading station files
    pub fn with_skip_bad_dates(mut self, skip_bad_dates: bool) -> Self {
        self.skip_bad_dates = skip_bad_dates;
        self
    }

    /// Stitch, select baselines and derive anomalies for one pair.
    ///
    /// Every per-pair failure is captured as a drop reason on the outcome.
    pub fn process_pair(&self, input: PairInput) -> PairOutcome {
        let PairInput {
            pair,
            legacy,
            modern,
        } = input;
        let name = pair.display_name();
        info!(pair = %name, "Processing pair");

        let stitched = match RecordStitcher::new().stitch(legacy, modern) {
            Ok(StitchOutcome::Stitched(series)) => series,
            Ok(StitchOutcome::Dropped(reason)) => {
                warn!(pair = %name, %reason, "Pair dropped");
                return PairOutcome::dropped(pair, reason);
            }
            Err(e) => {
                let reason = DropReason::InvalidSeries {
                    detail: e.to_string(),
                };
                warn!(pair = %name, %reason, "Pair dropped");
                return PairOutcome::dropped(pair, reason);
            }
        };

        let selector = BaselineSelector::with_settings(self.settings.clone());
        let computer = AnomalyComputer::new();
        let selection = selector.select(&stitched);
        let mut drop_reasons = Vec::new();

        let strict = match selection.strict {
            Ok(baseline) => {
                info!(
                    pair = %name,
                    period = %baseline.period,
                    years = baseline.years,
                    "STRICT baseline established"
                );
                let anomalies = computer.compute_monthly_anomaly(&stitched, baseline.mean);
                Some(QualifiedPair {
                    baseline,
                    anomalies,
                })
            }
            Err(reason) => {
                warn!(pair = %name, %reason, "STRICT baseline unavailable");
                drop_reasons.push(reason);
                None
            }
        };

        let inclusive = match selection.inclusive {
            Ok(baseline) => {
                info!(pair = %name, period = %baseline.period, "INCLUSIVE baseline established");
                // Identical baseline means identical anomalies
                let anomalies = match &strict {
                    Some(q) if q.baseline == baseline => q.anomalies.clone(),
                    _ => computer.compute_monthly_anomaly(&stitched, baseline.mean),
                };
                Some(QualifiedPair {
                    baseline,
                    anomalies,
                })
            }
            Err(reason) => {
                warn!(pair = %name, %reason, "INCLUSIVE baseline unavailable");
                drop_reasons.push(reason);
                None
            }
        };

        PairOutcome {
            pair,
            source: Some(stitched.source),
            data_span: stitched.year_span(),
            strict,
            inclusive,
            drop_reasons,
        }
    }

    /// Process every pair on a worker pool. Outcomes keep input order, so
    /// the report matches a sequential run.
    pub fn process_all(
        &self,
        inputs: Vec<PairInput>,
        progress: Option<&ProgressReporter>,
    ) -> Result<AnalysisReport> {
        let total = inputs.len();
        let processed_count = Arc::new(AtomicUsize::new(0));

        if let Some(p) = progress {
            p.set_message(&format!("Processing {} station pairs...", total));
        }

        let pool = self.build_pool()?;
        let outcomes: Vec<PairOutcome> = pool.install(|| {
            inputs
                .into_par_iter()
                .map(|input| {
                    let outcome = self.process_pair(input);

                    let count = processed_count.fetch_add(1, Ordering::Relaxed) + 1;
                    if let Some(p) = progress {
                        p.update(count as u64);
                    }

                    outcome
                })
                .collect()
        });

        let report = Self::build_report(outcomes);

        if let Some(p) = progress {
            p.finish_with_message(&format!("Processed {} station pairs", total));
        }

        Ok(report)
    }

    /// Read each pair's cached GHCN-Daily files from `data_dir` and process
    /// them. A station file that cannot be read counts as absent.
    pub fn process_directory(
        &self,
        pairs: &[StationPairDescriptor],
        data_dir: &Path,
        progress: Option<&ProgressReporter>,
    ) -> Result<AnalysisReport> {
        if let Some(p) = progress {
            p.set_message("Reading station data...");
        }

        let reader = GhcnDailyReader::with_skip_bad_dates(self.skip_bad_dates);
        let pool = self.build_pool()?;
        let inputs: Vec<PairInput> = pool.install(|| {
            pairs
                .par_iter()
                .map(|pair| {
                    PairInput::new(
                        pair.clone(),
                        Self::read_or_absent(&reader, data_dir, &pair.legacy_id),
                        Self::read_or_absent(&reader, data_dir, &pair.modern_id),
                    )
                })
                .collect()
        });

        self.process_all(inputs, progress)
    }

    fn read_or_absent(
        reader: &GhcnDailyReader,
        data_dir: &Path,
        station_id: &str,
    ) -> Option<StationSeries> {
        match reader.read_station(data_dir, station_id) {
            Ok(Some(series)) => Some(series),
            Ok(None) => {
                warn!(station_id, "No cached data file");
                None
            }
            Err(e) => {
                warn!(station_id, error = %e, "Could not read station data");
                None
            }
        }
    }

    fn build_pool(&self) -> Result<rayon::ThreadPool> {
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| ProcessingError::Config(e.to_string()))
    }

    /// Fold per-pair outcomes into the two ensembles and the drop list
    pub fn build_report(outcomes: Vec<PairOutcome>) -> AnalysisReport {
        let aggregator = EnsembleAggregator::new();

        let strict_series: Vec<&MonthlyAnomalySeries> = outcomes
            .iter()
            .filter_map(|o| o.strict.as_ref().map(|q| &q.anomalies))
            .collect();
        let inclusive_series: Vec<&MonthlyAnomalySeries> = outcomes
            .iter()
            .filter_map(|o| o.inclusive.as_ref().map(|q| &q.anomalies))
            .collect();

        if strict_series.is_empty() {
            info!("No valid pairs for STRICT approach");
        }
        if inclusive_series.is_empty() {
            info!("No valid pairs for INCLUSIVE approach");
        }

        let strict = aggregator.aggregate(&strict_series);
        let inclusive = aggregator.aggregate(&inclusive_series);

        let dropped = outcomes
            .iter()
            .flat_map(|o| {
                o.drop_reasons
                    .iter()
                    .map(move |reason| DroppedPair::new(o.name(), reason.clone()))
            })
            .collect();

        AnalysisReport {
            outcomes,
            strict,
            inclusive,
            dropped,
        }
    }
}

impl Default for PairProcessor {
    fn default() -> Self {
        Self::new(num_cpus::get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DailyObservation, QualificationTier, StitchSource, TemperatureUnit};
    use chrono::NaiveDate;

    fn pair(n: usize) -> StationPairDescriptor {
        StationPairDescriptor::new(
            &format!("USC0000000{}", n),
            &format!("LEGACY_{}", n),
            &format!("USW0000000{}", n),
            &format!("MODERN_{}", n),
            35.0,
            -100.0,
            "TX",
        )
    }

    /// Monthly observations (15th) in tenths for the given years
    fn monthly_tenths(id: &str, years: std::ops::RangeInclusive<i32>, raw: f64) -> StationSeries {
        let mut observations = Vec::new();
        for year in years {
            for month in 1..=12 {
                observations.push(DailyObservation::new(
                    NaiveDate::from_ymd_opt(year, month, 15).unwrap(),
                    raw,
                ));
            }
        }
        StationSeries::new(id, TemperatureUnit::Tenths, observations)
    }

    #[test]
    fn test_missing_legacy_outcome() {
        let processor = PairProcessor::new(1);
        let outcome = processor
            .process_pair(PairInput::new(pair(1), None, None));

        assert_eq!(outcome.tier(), QualificationTier::None);
        assert_eq!(outcome.drop_reasons, vec![DropReason::MissingLegacyData]);
        assert!(outcome.source.is_none());
    }

    #[test]
    fn test_strict_pair_also_inclusive() {
        let processor = PairProcessor::new(1);
        let outcome = processor
            .process_pair(PairInput::new(
                pair(1),
                Some(monthly_tenths("L", 1955..=2000, 100.0)),
                Some(monthly_tenths("M", 2001..=2020, 120.0)),
            ));

        assert_eq!(outcome.tier(), QualificationTier::Strict);
        assert_eq!(outcome.source, Some(StitchSource::Combined));
        assert_eq!(outcome.data_span, Some((1955, 2020)));
        assert_eq!(outcome.strict_label().as_deref(), Some("1960-1980 (21yr)"));
        assert_eq!(outcome.inclusive_label().as_deref(), Some("1960-1980"));

        let strict = outcome.strict.as_ref().unwrap();
        let inclusive = outcome.inclusive.as_ref().unwrap();
        assert_eq!(strict.baseline.mean, inclusive.baseline.mean);
        assert_eq!(strict.anomalies, inclusive.anomalies);
        assert!(outcome.drop_reasons.is_empty());
    }

    #[test]
    fn test_inclusive_only_pair() {
        let processor = PairProcessor::new(1);
        let outcome = processor
            .process_pair(PairInput::new(
                pair(2),
                Some(monthly_tenths("L", 1985..=2000, 100.0)),
                None,
            ));

        assert_eq!(outcome.tier(), QualificationTier::Inclusive);
        assert_eq!(outcome.source, Some(StitchSource::LegacyOnly));
        assert_eq!(outcome.inclusive_label().as_deref(), Some("1971-1990"));
        assert_eq!(
            outcome.drop_reasons,
            vec![DropReason::InsufficientStrictBaseline {
                years: 0,
                required: 15
            }]
        );
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let inputs: Vec<PairInput> = (1..=6)
            .map(|n| {
                PairInput::new(
                    pair(n),
                    Some(monthly_tenths("L", 1950 + n as i32..=1995, 100.0 + n as f64)),
                    Some(monthly_tenths("M", 1996..=2015, 130.0 - n as f64)),
                )
            })
            .collect();

        let parallel = PairProcessor::new(4)
            .process_all(inputs.clone(), None)
            .unwrap();
        let sequential = PairProcessor::new(1).process_all(inputs, None).unwrap();

        assert_eq!(parallel, sequential);
        assert_eq!(parallel.outcomes[0].name(), "LEGACY_1 / MODERN_1");
        assert_eq!(parallel.outcomes[5].name(), "LEGACY_6 / MODERN_6");
    }

    #[test]
    fn test_report_drop_list() {
        let inputs = vec![
            PairInput::new(pair(1), None, None),
            PairInput::new(
                pair(2),
                Some(monthly_tenths("L", 2012..=2015, 100.0)),
                None,
            ),
        ];

        let report = PairProcessor::new(1).process_all(inputs, None).unwrap();

        assert!(report.strict.is_none());
        assert!(report.inclusive.is_none());
        let described: Vec<String> = report.dropped.iter().map(|d| d.describe()).collect();
        assert_eq!(
            described,
            vec![
                "LEGACY_1 / MODERN_1 - No legacy data".to_string(),
                "LEGACY_2 / MODERN_2 - Only 0 baseline years".to_string(),
                "LEGACY_2 / MODERN_2 - Cannot establish any baseline".to_string(),
            ]
        );
    }

    #[test]
    fn test_fully_dropped_separated_from_strict_only() {
        let inputs = vec![
            PairInput::new(pair(1), None, None),
            PairInput::new(
                pair(2),
                Some(monthly_tenths("L", 1985..=2000, 100.0)),
                None,
            ),
            PairInput::new(
                pair(3),
                Some(monthly_tenths("L", 2012..=2015, 100.0)),
                None,
            ),
        ];

        let report = PairProcessor::new(1).process_all(inputs, None).unwrap();

        let flags: Vec<(String, bool)> = report
            .dropped
            .iter()
            .map(|d| (d.name.clone(), d.fully_dropped))
            .collect();
        assert_eq!(
            flags,
            vec![
                ("LEGACY_1 / MODERN_1".to_string(), true),
                ("LEGACY_2 / MODERN_2".to_string(), false),
                ("LEGACY_3 / MODERN_3".to_string(), false),
                ("LEGACY_3 / MODERN_3".to_string(), true),
            ]
        );

        let fully: Vec<String> = report.fully_dropped().map(|o| o.name()).collect();
        assert_eq!(
            fully,
            vec![
                "LEGACY_1 / MODERN_1".to_string(),
                "LEGACY_3 / MODERN_3".to_string()
            ]
        );
    }

    #[test]
    fn test_unusable_pairs_do_not_abort_run() {
        let inputs = vec![
            PairInput::new(
                pair(1),
                Some(StationSeries::new("L", TemperatureUnit::Tenths, Vec::new())),
                Some(monthly_tenths("M", 2001..=2020, 120.0)),
            ),
            // Legacy record lies entirely after the modern start
            PairInput::new(
                pair(2),
                Some(monthly_tenths("L", 2010..=2015, 100.0)),
                Some(monthly_tenths("M", 2001..=2020, 120.0)),
            ),
            PairInput::new(
                pair(3),
                Some(monthly_tenths("L", 1955..=2000, 100.0)),
                Some(monthly_tenths("M", 2001..=2020, 120.0)),
            ),
        ];

        let report = PairProcessor::new(2).process_all(inputs, None).unwrap();

        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(
            report.outcomes[0].drop_reasons,
            vec![DropReason::MissingLegacyData]
        );
        assert_eq!(report.outcomes[1].data_span, Some((2001, 2020)));
        assert_eq!(report.outcomes[1].tier(), QualificationTier::Inclusive);
        assert_eq!(report.outcomes[2].tier(), QualificationTier::Strict);
        assert_eq!(report.strict.as_ref().map(|e| e.pair_count), Some(1));
        assert_eq!(report.inclusive.as_ref().map(|e| e.pair_count), Some(2));
    }

    #[test]
    fn test_directory_read_honours_skip_bad_dates() {
        use std::fmt::Write as _;

        let dir = tempfile::TempDir::new().unwrap();
        let mut legacy = String::from("DATE,TMAX\n1960/01/01,100\n");
        for year in 1960..=1980 {
            for month in 1..=12 {
                writeln!(legacy, "{}-{:02}-15,100", year, month).unwrap();
            }
        }
        std::fs::write(dir.path().join("USC00000001.csv"), legacy).unwrap();
        let pairs = vec![pair(1)];

        // Strict reading rejects the file, which then counts as missing
        let report = PairProcessor::new(1)
            .process_directory(&pairs, dir.path(), None)
            .unwrap();
        assert_eq!(
            report.outcomes[0].drop_reasons,
            vec![DropReason::MissingLegacyData]
        );

        let report = PairProcessor::new(1)
            .with_skip_bad_dates(true)
            .process_directory(&pairs, dir.path(), None)
            .unwrap();
        assert_eq!(report.outcomes[0].tier(), QualificationTier::Strict);
    }
}
