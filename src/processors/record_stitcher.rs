use crate::error::Result;
use crate::models::{DropReason, StationSeries, StitchSource, StitchedSeries, TemperatureUnit};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Outcome of stitching one pair's records.
#[derive(Debug, Clone, PartialEq)]
pub enum StitchOutcome {
    Stitched(StitchedSeries),
    Dropped(DropReason),
}

pub struct RecordStitcher;

impl RecordStitcher {
    pub fn new() -> Self {
        Self
    }

    /// Merge a legacy and a modern record into one canonical Celsius series.
    ///
    /// The legacy record is truncated to dates strictly before the first
    /// modern date, and any remaining date collision resolves to the modern
    /// observation. Without a legacy record the pair is dropped; without a
    /// modern record the legacy record is used alone.
    pub fn stitch(
        &self,
        legacy: Option<StationSeries>,
        modern: Option<StationSeries>,
    ) -> Result<StitchOutcome> {
        let legacy = match legacy.filter(|s| !s.is_empty()) {
            Some(series) => series,
            None => return Ok(StitchOutcome::Dropped(DropReason::MissingLegacyData)),
        };

        let modern = match modern.filter(|s| !s.is_empty()) {
            Some(series) => series,
            None => {
                warn!(
                    station_id = %legacy.station_id,
                    "No modern data, using legacy record alone"
                );
                let series = legacy.normalized();
                series.validate()?;
                return Ok(StitchOutcome::Stitched(StitchedSeries {
                    series,
                    source: StitchSource::LegacyOnly,
                }));
            }
        };

        let legacy = legacy.normalized();
        let modern = modern.normalized();
        let station_id = legacy.station_id.clone();

        let mut by_date = BTreeMap::new();
        if let Some(cutoff) = modern.first_date() {
            for observation in legacy
                .into_observations()
                .into_iter()
                .take_while(|o| o.date < cutoff)
            {
                by_date.insert(observation.date, observation);
            }
        }
        let legacy_days = by_date.len();

        // Modern inserted last so it wins any collision
        for observation in modern.into_observations() {
            by_date.insert(observation.date, observation);
        }

        debug!(
            station_id = %station_id,
            legacy_days,
            total_days = by_date.len(),
            "Stitched legacy and modern records"
        );

        let series = StationSeries::new(
            station_id,
            TemperatureUnit::Celsius,
            by_date.into_values().collect(),
        );
        series.validate()?;

        Ok(StitchOutcome::Stitched(StitchedSeries {
            series,
            source: StitchSource::Combined,
        }))
    }
}

impl Default for RecordStitcher {
    fn default() -> Self {
        Self::new()
    }
}
