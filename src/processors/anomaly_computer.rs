use crate::models::{MonthlyAnomaly, MonthlyAnomalySeries, StitchedSeries, YearMonth};
use std::collections::BTreeMap;

pub struct AnomalyComputer;

impl AnomalyComputer {
    pub fn new() -> Self {
        Self
    }

    /// Calendar-month mean daily maximum minus a single baseline mean.
    /// Months without observations produce no entry.
    pub fn compute_monthly_anomaly(
        &self,
        series: &StitchedSeries,
        baseline_mean: f64,
    ) -> MonthlyAnomalySeries {
        let mut months: BTreeMap<YearMonth, (f64, usize)> = BTreeMap::new();
        for observation in series.observations() {
            let entry = months
                .entry(YearMonth::from_date(observation.date))
                .or_insert((0.0, 0));
            entry.0 += observation.tmax;
            entry.1 += 1;
        }

        let values = months
            .into_iter()
            .map(|(month, (sum, count))| MonthlyAnomaly {
                month,
                anomaly: sum / count as f64 - baseline_mean,
            })
            .collect();

        MonthlyAnomalySeries::new(values)
    }
}

impl Default for AnomalyComputer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DailyObservation, StationSeries, StitchSource, TemperatureUnit};
    use chrono::NaiveDate;

    fn obs(y: i32, m: u32, d: u32, tmax: f64) -> DailyObservation {
        DailyObservation::new(NaiveDate::from_ymd_opt(y, m, d).unwrap(), tmax)
    }

    #[test]
    fn test_monthly_means_minus_baseline() {
        let series = StitchedSeries {
            series: StationSeries::new(
                "TEST",
                TemperatureUnit::Celsius,
                vec![
                    obs(2000, 1, 1, 10.0),
                    obs(2000, 1, 2, 14.0),
                    obs(2000, 3, 1, 20.0),
                ],
            ),
            source: StitchSource::Combined,
        };

        let anomalies = AnomalyComputer::new().compute_monthly_anomaly(&series, 10.0);

        // February has no data and is skipped
        assert_eq!(anomalies.len(), 2);
        assert_eq!(anomalies.values()[0].month, YearMonth::new(2000, 1));
        assert_eq!(anomalies.values()[0].anomaly, 2.0);
        assert_eq!(anomalies.values()[1].month, YearMonth::new(2000, 3));
        assert_eq!(anomalies.values()[1].anomaly, 10.0);
        assert_eq!(anomalies.get(YearMonth::new(2000, 2)), None);
    }

    #[test]
    fn test_empty_series() {
        let series = StitchedSeries {
            series: StationSeries::new("TEST", TemperatureUnit::Celsius, vec![]),
            source: StitchSource::LegacyOnly,
        };
        assert!(AnomalyComputer::new()
            .compute_monthly_anomaly(&series, 0.0)
            .is_empty());
    }
}
