use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

use crate::error::{ProcessingError, Result};
use crate::models::{BaselinePeriod, StationPairDescriptor};
use crate::utils::constants::{
    ALTERNATIVE_WINDOWS, BASELINE_END, BASELINE_START, ENV_PREFIX, FALLBACK_SPAN_YEARS,
    MIN_ALTERNATIVE_OBSERVATIONS, MIN_BASELINE_YEARS, MIN_FALLBACK_YEARS,
};

/// Thresholds and windows used by the baseline selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaselineSettings {
    pub strict_start_year: i32,
    pub strict_end_year: i32,
    pub min_strict_years: usize,
    pub alternative_windows: Vec<BaselinePeriod>,
    pub min_alternative_observations: usize,
    /// Even number of years taken around the midpoint of the record
    pub fallback_span_years: usize,
    pub min_fallback_years: usize,
}

impl Default for BaselineSettings {
    fn default() -> Self {
        Self {
            strict_start_year: BASELINE_START,
            strict_end_year: BASELINE_END,
            min_strict_years: MIN_BASELINE_YEARS,
            alternative_windows: ALTERNATIVE_WINDOWS
                .iter()
                .map(|&(start, end)| BaselinePeriod::new(start, end))
                .collect(),
            min_alternative_observations: MIN_ALTERNATIVE_OBSERVATIONS,
            fallback_span_years: FALLBACK_SPAN_YEARS,
            min_fallback_years: MIN_FALLBACK_YEARS,
        }
    }
}

impl BaselineSettings {
    pub fn strict_period(&self) -> BaselinePeriod {
        BaselinePeriod::new(self.strict_start_year, self.strict_end_year)
    }

    pub fn check(&self) -> Result<()> {
        if self.strict_start_year > self.strict_end_year {
            return Err(ProcessingError::Config(format!(
                "strict baseline window {} is reversed",
                self.strict_period()
            )));
        }
        if let Some(window) = self
            .alternative_windows
            .iter()
            .find(|w| w.start_year > w.end_year)
        {
            return Err(ProcessingError::Config(format!(
                "alternative baseline window {} is reversed",
                window
            )));
        }
        if self.fallback_span_years < 2 || self.min_fallback_years > self.fallback_span_years {
            return Err(ProcessingError::Config(format!(
                "fallback span of {} years must be at least 2 and not below the {}-year minimum",
                self.fallback_span_years, self.min_fallback_years
            )));
        }
        // The span is split evenly around the midpoint year
        if self.fallback_span_years % 2 != 0 {
            return Err(ProcessingError::Config(format!(
                "fallback span of {} years must be even",
                self.fallback_span_years
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub baseline: BaselineSettings,
    pub pairs: Vec<StationPairDescriptor>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            baseline: BaselineSettings::default(),
            pairs: default_pairs(),
        }
    }
}

impl AnalysisConfig {
    /// Built-in defaults, then an optional TOML file, then
    /// `PAIR_ANOMALY__*` environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            if !path.exists() {
                return Err(ProcessingError::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(File::from(path));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config: AnalysisConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.baseline.check()?;
        if self.pairs.is_empty() {
            return Err(ProcessingError::MissingData(
                "no station pairs configured".to_string(),
            ));
        }
        for pair in &self.pairs {
            pair.validate()?;
        }
        Ok(())
    }
}

/// The paired legacy GHCN / USCRN stations analysed by default.
pub fn default_pairs() -> Vec<StationPairDescriptor> {
    vec![
        StationPairDescriptor::new(
            "USC00416137",
            "MULESHOE_NTL_WR",
            "USW00003054",
            "MULESHOE_19_S",
            34.2267,
            -102.7233,
            "TX",
        ),
        StationPairDescriptor::new(
            "USC00516198",
            "MAUNA_LOA_SLOPE_OBS_39",
            "USW00021514",
            "MAUNA_LOA_5_NNE",
            19.5361,
            -155.5783,
            "HI",
        ),
        StationPairDescriptor::new(
            "USR0000CBLA",
            "BLACK_CANYON_COLORADO",
            "USW00003060",
            "MONTROSE_11_ENE",
            38.4583,
            -107.6333,
            "CO",
        ),
        StationPairDescriptor::new(
            "USR0000CCRA",
            "CRANE_FLAT_LOOKOUT_CALIFORNIA",
            "USW00053150",
            "YOSEMITE_VILLAGE_12_W",
            37.7167,
            -119.7833,
            "CA",
        ),
        StationPairDescriptor::new(
            "USR0000NDUK",
            "DUKE_FOREST_NORTH_CAROLINA",
            "USW00003758",
            "DURHAM_11_W",
            35.9783,
            -79.1000,
            "NC",
        ),
        StationPairDescriptor::new(
            "USS0005J42S",
            "NIWOT",
            "USW00094075",
            "BOULDER_14_W",
            40.0333,
            -105.5833,
            "CO",
        ),
        StationPairDescriptor::new(
            "USW00003160",
            "MERCURY_DESERT_ROCK_AP",
            "USW00053136",
            "MERCURY_3_SSW",
            36.6233,
            -116.0167,
            "NV",
        ),
        StationPairDescriptor::new(
            "USW00013850",
            "CRAIG_AFB",
            "USW00063897",
            "SELMA_6_SSE",
            32.3433,
            -87.0067,
            "AL",
        ),
        StationPairDescriptor::new(
            "USW00014623",
            "LIMESTONE_LORING_AFB",
            "USW00094645",
            "LIMESTONE_4_NNW",
            46.9500,
            -67.8833,
            "ME",
        ),
        StationPairDescriptor::new(
            "USC00380764",
            "BLACKVILLE_3_W",
            "USW00063826",
            "BLACKVILLE_3_W",
            33.3583,
            -81.3000,
            "SC",
        ),
        StationPairDescriptor::new(
            "USC00224173",
            "HOLLY_SPRINGS_4_N",
            "USW00023803",
            "HOLLY_SPRINGS_4_N",
            35.6667,
            -78.8333,
            "NC",
        ),
        StationPairDescriptor::new(
            "USC00348501",
            "STILLWATER_2_W",
            "USW00053926",
            "STILLWATER_2_W",
            36.1167,
            -97.0833,
            "OK",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_defaults_are_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pairs.len(), 12);
        assert_eq!(config.baseline.strict_period().label(), "1960-1980");
        assert_eq!(config.baseline.alternative_windows[1].label(), "1981-2010");
    }

    #[test]
    fn test_load_from_toml_file() -> Result<()> {
        let mut file = Builder::new().suffix(".toml").tempfile()?;
        writeln!(
            file,
            r#"
[baseline]
min_strict_years = 10

[[pairs]]
legacy_id = "USC00000001"
legacy_name = "OLD_TOWN"
modern_id = "USW00000002"
modern_name = "NEW_TOWN_3_N"
latitude = 40.0
longitude = -100.0
state = "KS"
"#
        )?;

        let config = AnalysisConfig::load(Some(file.path()))?;
        assert_eq!(config.baseline.min_strict_years, 10);
        assert_eq!(config.baseline.strict_start_year, 1960);
        assert_eq!(config.baseline.alternative_windows.len(), 4);
        assert_eq!(config.pairs.len(), 1);
        assert_eq!(config.pairs[0].display_name(), "OLD_TOWN / NEW_TOWN_3_N");
        Ok(())
    }

    #[test]
    fn test_invalid_pair_rejected() {
        let mut config = AnalysisConfig::default();
        config.pairs[0].longitude = 200.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reversed_window_rejected() {
        let mut config = AnalysisConfig::default();
        config.baseline.alternative_windows[0] = BaselinePeriod::new(1990, 1971);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_odd_fallback_span_rejected() {
        let mut config = AnalysisConfig::default();
        config.baseline.fallback_span_years = 21;
        assert!(matches!(config.validate(), Err(ProcessingError::Config(_))));

        config.baseline.fallback_span_years = 22;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_config_file() {
        let result = AnalysisConfig::load(Some(Path::new("does/not/exist.toml")));
        assert!(matches!(result, Err(ProcessingError::Config(_))));
    }
}
