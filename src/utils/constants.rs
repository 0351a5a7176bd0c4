/// Strict climatological baseline window
pub const BASELINE_START: i32 = 1960;
pub const BASELINE_END: i32 = 1980;
pub const MIN_BASELINE_YEARS: usize = 15;

/// Fallback windows tried in order when the strict window is inadequate:
/// WMO alternative, current WMO normal, GISS, and 1961-1990
pub const ALTERNATIVE_WINDOWS: [(i32, i32); 4] =
    [(1971, 1990), (1981, 2010), (1951, 1980), (1961, 1990)];
pub const MIN_ALTERNATIVE_OBSERVATIONS: usize = 60;

/// Data-driven fallback
pub const FALLBACK_SPAN_YEARS: usize = 20;
pub const MIN_FALLBACK_YEARS: usize = 10;

/// Trend summaries
pub const RECENT_YEARS: usize = 10;
pub const RECENT_MONTHS: usize = 120;
pub const ROLLING_WINDOW: usize = 10;
pub const ROLLING_MIN_PERIODS: usize = 5;

/// Input and output file names
pub const STATION_FILE_EXTENSION: &str = "csv";
pub const DATE_COLUMN: &str = "DATE";
pub const TMAX_COLUMN: &str = "TMAX";
pub const STRICT_MONTHLY_FILE: &str = "strict_monthly.csv";
pub const STRICT_ANNUAL_FILE: &str = "strict_annual.csv";
pub const INCLUSIVE_MONTHLY_FILE: &str = "inclusive_monthly.csv";
pub const INCLUSIVE_ANNUAL_FILE: &str = "inclusive_annual.csv";
pub const REPORT_FILE: &str = "pair_report.json";

/// Environment prefix for configuration overrides
pub const ENV_PREFIX: &str = "PAIR_ANOMALY";
