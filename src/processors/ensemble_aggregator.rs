use crate::models::{
    AnnualAnomaly, EnsembleMonth, EnsembleSeries, MonthlyAnomalySeries, YearMonth,
};
use std::collections::BTreeMap;
use tracing::info;

pub struct EnsembleAggregator;

impl EnsembleAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Cross-pair mean anomaly over the union of months covered by any pair.
    ///
    /// Pairs without a value for a month are skipped for that month rather
    /// than counted as zero, and months nobody covers are left out. Returns
    /// `None` for an empty pair list.
    pub fn aggregate(&self, pair_series: &[&MonthlyAnomalySeries]) -> Option<EnsembleSeries> {
        if pair_series.is_empty() {
            return None;
        }

        let start = pair_series.iter().filter_map(|s| s.first_month()).min();
        let end = pair_series.iter().filter_map(|s| s.last_month()).max();

        let mut monthly = Vec::new();
        if let (Some(start), Some(end)) = (start, end) {
            // Per-pair cursors; each series has strictly increasing months
            let mut cursors = vec![0usize; pair_series.len()];
            for month in YearMonth::range_inclusive(start, end) {
                let mut sum = 0.0;
                let mut pairs = 0;
                for (series, cursor) in pair_series.iter().zip(cursors.iter_mut()) {
                    if let Some(value) = series.values().get(*cursor) {
                        if value.month == month {
                            sum += value.anomaly;
                            pairs += 1;
                            *cursor += 1;
                        }
                    }
                }
                if pairs > 0 {
                    monthly.push(EnsembleMonth {
                        month,
                        anomaly: sum / pairs as f64,
                        pairs,
                    });
                }
            }
        }

        let annual = self.annual_means(&monthly);

        info!(
            pairs = pair_series.len(),
            months = monthly.len(),
            years = annual.len(),
            "Built ensemble"
        );

        Some(EnsembleSeries {
            pair_count: pair_series.len(),
            monthly,
            annual,
        })
    }

    /// Calendar-year mean of whichever ensemble months exist
    pub fn annual_means(&self, monthly: &[EnsembleMonth]) -> Vec<AnnualAnomaly> {
        let mut years: BTreeMap<i32, (f64, usize)> = BTreeMap::new();
        for month in monthly {
            let entry = years.entry(month.month.year).or_insert((0.0, 0));
            entry.0 += month.anomaly;
            entry.1 += 1;
        }

        years
            .into_iter()
            .map(|(year, (sum, months))| AnnualAnomaly {
                year,
                anomaly: sum / months as f64,
                months,
            })
            .collect()
    }
}

impl Default for EnsembleAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MonthlyAnomaly;

    fn series(
        year: i32,
        months: std::ops::RangeInclusive<u32>,
        value: f64,
    ) -> MonthlyAnomalySeries {
        MonthlyAnomalySeries::new(
            months
                .map(|m| MonthlyAnomaly {
                    month: YearMonth::new(year, m),
                    anomaly: value,
                })
                .collect(),
        )
    }

    #[test]
    fn test_empty_input_yields_none() {
        assert!(EnsembleAggregator::new().aggregate(&[]).is_none());
    }

    #[test]
    fn test_union_of_months() {
        let a = series(2000, 1..=6, 1.0);
        let b = series(2000, 4..=9, 3.0);

        let ensemble = EnsembleAggregator::new().aggregate(&[&a, &b]).unwrap();

        assert_eq!(ensemble.pair_count, 2);
        assert_eq!(ensemble.monthly.len(), 9);
        assert_eq!(ensemble.monthly[0].month, YearMonth::new(2000, 1));
        assert_eq!(ensemble.monthly[8].month, YearMonth::new(2000, 9));
        for m in 1..=3 {
            assert_eq!(ensemble.monthly_value(YearMonth::new(2000, m)), Some(1.0));
        }
        for m in 4..=6 {
            assert_eq!(ensemble.monthly_value(YearMonth::new(2000, m)), Some(2.0));
            assert_eq!(ensemble.monthly[(m - 1) as usize].pairs, 2);
        }
        for m in 7..=9 {
            assert_eq!(ensemble.monthly_value(YearMonth::new(2000, m)), Some(3.0));
        }
    }

    #[test]
    fn test_uncovered_months_dropped() {
        let a = series(2000, 1..=2, 1.0);
        let b = series(2000, 11..=12, -1.0);

        let ensemble = EnsembleAggregator::new().aggregate(&[&a, &b]).unwrap();

        assert_eq!(ensemble.monthly.len(), 4);
        assert!(ensemble.monthly.iter().all(|m| m.anomaly.is_finite()));
        assert_eq!(ensemble.monthly_value(YearMonth::new(2000, 6)), None);
    }

    #[test]
    fn test_partial_year_annual_mean() {
        let a = MonthlyAnomalySeries::new(vec![
            MonthlyAnomaly {
                month: YearMonth::new(2001, 2),
                anomaly: 1.0,
            },
            MonthlyAnomaly {
                month: YearMonth::new(2001, 5),
                anomaly: 2.0,
            },
            MonthlyAnomaly {
                month: YearMonth::new(2001, 11),
                anomaly: 6.0,
            },
        ]);

        let ensemble = EnsembleAggregator::new().aggregate(&[&a]).unwrap();

        assert_eq!(ensemble.annual.len(), 1);
        assert_eq!(ensemble.annual[0].year, 2001);
        assert_eq!(ensemble.annual[0].months, 3);
        assert_eq!(ensemble.annual_value(2001), Some(3.0));
    }

    #[test]
    fn test_pairs_with_empty_series_still_counted() {
        let a = series(2000, 1..=1, 4.0);
        let empty = MonthlyAnomalySeries::default();

        let ensemble = EnsembleAggregator::new().aggregate(&[&a, &empty]).unwrap();
        assert_eq!(ensemble.pair_count, 2);
        assert_eq!(ensemble.monthly_value(YearMonth::new(2000, 1)), Some(4.0));
    }

    #[test]
    fn test_unordered_and_repeated_months() {
        let month = |m: u32, anomaly: f64| MonthlyAnomaly {
            month: YearMonth::new(2000, m),
            anomaly,
        };
        let unordered = MonthlyAnomalySeries::new(vec![month(3, 3.0), month(1, 1.0)]);
        let repeated = MonthlyAnomalySeries::new(vec![month(1, 1.0), month(1, 5.0), month(2, 2.0)]);

        let ensemble = EnsembleAggregator::new().aggregate(&[&unordered]).unwrap();
        let values: Vec<_> = ensemble.monthly.iter().map(|m| (m.month, m.anomaly)).collect();
        assert_eq!(
            values,
            vec![(YearMonth::new(2000, 1), 1.0), (YearMonth::new(2000, 3), 3.0)]
        );

        let ensemble = EnsembleAggregator::new().aggregate(&[&repeated]).unwrap();
        let values: Vec<_> = ensemble.monthly.iter().map(|m| (m.month, m.anomaly)).collect();
        assert_eq!(
            values,
            vec![(YearMonth::new(2000, 1), 5.0), (YearMonth::new(2000, 2), 2.0)]
        );
    }
}
