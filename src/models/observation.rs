use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{ProcessingError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyObservation {
    pub date: NaiveDate,
    pub tmax: f64,
}

impl DailyObservation {
    pub fn new(date: NaiveDate, tmax: f64) -> Self {
        Self { date, tmax }
    }
}

/// Unit of the stored maximum-temperature magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemperatureUnit {
    /// Tenths of a degree Celsius, as GHCN-Daily encodes TMAX
    Tenths,
    Celsius,
}

impl TemperatureUnit {
    pub fn to_celsius(&self, value: f64) -> f64 {
        match self {
            TemperatureUnit::Tenths => value / 10.0,
            TemperatureUnit::Celsius => value,
        }
    }
}

/// Date-ordered daily maximum temperatures for a single station.
///
/// Dates are strictly increasing. Construction through [`StationSeries::new`]
/// sorts the input and resolves duplicate dates in favour of the later
/// observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationSeries {
    pub station_id: String,
    pub unit: TemperatureUnit,
    observations: Vec<DailyObservation>,
}

impl StationSeries {
    pub fn new(
        station_id: impl Into<String>,
        unit: TemperatureUnit,
        observations: Vec<DailyObservation>,
    ) -> Self {
        let mut by_date = BTreeMap::new();
        for observation in observations {
            by_date.insert(observation.date, observation);
        }

        Self {
            station_id: station_id.into(),
            unit,
            observations: by_date.into_values().collect(),
        }
    }

    pub fn observations(&self) -> &[DailyObservation] {
        &self.observations
    }

    pub fn into_observations(self) -> Vec<DailyObservation> {
        self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.observations.first().map(|o| o.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.last().map(|o| o.date)
    }

    /// Convert the stored magnitudes to whole degrees Celsius
    pub fn normalized(self) -> Self {
        let unit = self.unit;
        let observations = self
            .observations
            .into_iter()
            .map(|o| DailyObservation::new(o.date, unit.to_celsius(o.tmax)))
            .collect();

        Self {
            station_id: self.station_id,
            unit: TemperatureUnit::Celsius,
            observations,
        }
    }

    /// Observations with `start <= date <= end`, located by binary search
    pub fn window(&self, start: NaiveDate, end: NaiveDate) -> &[DailyObservation] {
        let lo = self.observations.partition_point(|o| o.date < start);
        let hi = self.observations.partition_point(|o| o.date <= end);
        if lo >= hi {
            return &[];
        }
        &self.observations[lo..hi]
    }

    /// Observations falling in calendar years `start_year..=end_year`
    pub fn years_window(&self, start_year: i32, end_year: i32) -> &[DailyObservation] {
        match (
            NaiveDate::from_ymd_opt(start_year, 1, 1),
            NaiveDate::from_ymd_opt(end_year, 12, 31),
        ) {
            (Some(start), Some(end)) => self.window(start, end),
            _ => &[],
        }
    }

    /// Sorted distinct calendar years present in the series
    pub fn distinct_years(&self) -> Vec<i32> {
        distinct_years(&self.observations)
    }

    /// Check the strictly-increasing date invariant
    pub fn validate(&self) -> Result<()> {
        for pair in self.observations.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(ProcessingError::SeriesOrder {
                    station_id: self.station_id.clone(),
                    date: pair[1].date,
                });
            }
        }
        Ok(())
    }
}

pub fn distinct_years(observations: &[DailyObservation]) -> Vec<i32> {
    let mut years: Vec<i32> = observations.iter().map(|o| o.date.year()).collect();
    years.dedup();
    years
}

pub fn mean_tmax(observations: &[DailyObservation]) -> Option<f64> {
    if observations.is_empty() {
        return None;
    }
    let sum: f64 = observations.iter().map(|o| o.tmax).sum();
    Some(sum / observations.len() as f64)
}

/// How a stitched series was assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StitchSource {
    /// Legacy record truncated at the modern start, followed by the modern record
    Combined,
    /// No modern record available; no cross-check between sources
    LegacyOnly,
}

/// Canonical daily series for one station pair, in degrees Celsius.
#[derive(Debug, Clone, PartialEq)]
pub struct StitchedSeries {
    pub series: StationSeries,
    pub source: StitchSource,
}

impl StitchedSeries {
    pub fn observations(&self) -> &[DailyObservation] {
        self.series.observations()
    }

    pub fn year_span(&self) -> Option<(i32, i32)> {
        match (self.series.first_date(), self.series.last_date()) {
            (Some(first), Some(last)) => Some((first.year(), last.year())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_sorts_and_keeps_last_duplicate() {
        let series = StationSeries::new(
            "USC00000001",
            TemperatureUnit::Tenths,
            vec![
                DailyObservation::new(date(2000, 1, 3), 30.0),
                DailyObservation::new(date(2000, 1, 1), 10.0),
                DailyObservation::new(date(2000, 1, 3), 35.0),
            ],
        );

        assert_eq!(series.len(), 2);
        assert_eq!(series.observations()[0].date, date(2000, 1, 1));
        assert_eq!(series.observations()[1].tmax, 35.0);
        assert!(series.validate().is_ok());
    }

    #[test]
    fn test_normalized_divides_tenths() {
        let series = StationSeries::new(
            "X",
            TemperatureUnit::Tenths,
            vec![DailyObservation::new(date(2000, 1, 1), 125.0)],
        )
        .normalized();

        assert_eq!(series.unit, TemperatureUnit::Celsius);
        assert_eq!(series.observations()[0].tmax, 12.5);

        // Already Celsius stays untouched
        let again = series.normalized();
        assert_eq!(again.observations()[0].tmax, 12.5);
    }

    #[test]
    fn test_window_is_inclusive() {
        let observations = (1..=10)
            .map(|d| DailyObservation::new(date(2000, 1, d), d as f64))
            .collect();
        let series = StationSeries::new("X", TemperatureUnit::Celsius, observations);

        let slice = series.window(date(2000, 1, 3), date(2000, 1, 5));
        assert_eq!(slice.len(), 3);
        assert_eq!(slice[0].tmax, 3.0);
        assert_eq!(slice[2].tmax, 5.0);

        assert!(series.window(date(2001, 1, 1), date(2001, 12, 31)).is_empty());
        assert!(series.window(date(2000, 1, 5), date(2000, 1, 3)).is_empty());
    }

    #[test]
    fn test_distinct_years_and_mean() {
        let series = StationSeries::new(
            "X",
            TemperatureUnit::Celsius,
            vec![
                DailyObservation::new(date(1999, 6, 1), 10.0),
                DailyObservation::new(date(2000, 6, 1), 20.0),
                DailyObservation::new(date(2000, 7, 1), 30.0),
            ],
        );

        assert_eq!(series.distinct_years(), vec![1999, 2000]);
        assert_eq!(mean_tmax(series.observations()), Some(20.0));
        assert_eq!(mean_tmax(&[]), None);
    }
}
