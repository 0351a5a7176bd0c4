use crate::error::{ProcessingError, Result};
use crate::models::{DailyObservation, StationSeries, TemperatureUnit};
use crate::utils::constants::{DATE_COLUMN, STATION_FILE_EXTENSION, TMAX_COLUMN};
use chrono::NaiveDate;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reader for cached GHCN-Daily access CSV files (`<STATION_ID>.csv`).
///
/// Only the `DATE` and `TMAX` columns are used. Rows with a blank or
/// non-numeric TMAX are treated as missing and skipped.
pub struct GhcnDailyReader {
    skip_bad_dates: bool,
}

impl GhcnDailyReader {
    pub fn new() -> Self {
        Self {
            skip_bad_dates: false,
        }
    }

    pub fn with_skip_bad_dates(skip_bad_dates: bool) -> Self {
        Self { skip_bad_dates }
    }

    pub fn station_path(&self, data_dir: &Path, station_id: &str) -> PathBuf {
        data_dir.join(format!("{}.{}", station_id, STATION_FILE_EXTENSION))
    }

    /// Read a station's cached file, or `None` if it was never cached
    pub fn read_station(&self, data_dir: &Path, station_id: &str) -> Result<Option<StationSeries>> {
        let path = self.station_path(data_dir, station_id);
        if !path.exists() {
            return Ok(None);
        }
        self.read_file(&path, station_id).map(Some)
    }

    pub fn read_file(&self, path: &Path, station_id: &str) -> Result<StationSeries> {
        let file = File::open(path)?;
        let series = self.read_from(file, station_id)?;
        debug!(
            station_id,
            path = %path.display(),
            observations = series.len(),
            "Read station file"
        );
        Ok(series)
    }

    pub fn read_from<R: Read>(&self, input: R, station_id: &str) -> Result<StationSeries> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(input);

        let headers = reader.headers()?.clone();
        let date_index = Self::column_index(&headers, DATE_COLUMN)?;
        let tmax_index = Self::column_index(&headers, TMAX_COLUMN)?;

        let mut observations = Vec::new();
        for row in reader.records() {
            let row = row?;
            let tmax = match row.get(tmax_index).and_then(|v| v.parse::<f64>().ok()) {
                Some(value) if value.is_finite() => value,
                _ => continue,
            };

            let date_str = row.get(date_index).unwrap_or_default();
            let date = match NaiveDate::parse_from_str(date_str, "%Y-%m-%d") {
                Ok(date) => date,
                Err(_) if self.skip_bad_dates => continue,
                Err(e) => return Err(e.into()),
            };

            observations.push(DailyObservation::new(date, tmax));
        }

        Ok(StationSeries::new(
            station_id,
            TemperatureUnit::Tenths,
            observations,
        ))
    }

    fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize> {
        headers.iter().position(|h| h == name).ok_or_else(|| {
            ProcessingError::InvalidFormat(format!("Missing column '{}' in station file", name))
        })
    }
}

impl Default for GhcnDailyReader {
    fn default() -> Self {
        Self::new()
    }
}
