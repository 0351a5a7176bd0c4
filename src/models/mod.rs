pub mod anomaly;
pub mod baseline;
pub mod observation;
pub mod outcome;
pub mod station;

pub use anomaly::{
    AnnualAnomaly, EnsembleMonth, EnsembleSeries, MonthlyAnomaly, MonthlyAnomalySeries, YearMonth,
};
pub use baseline::{BaselinePeriod, BaselineResult, BaselineSource, DropReason, QualificationTier};
pub use observation::{
    DailyObservation, StationSeries, StitchSource, StitchedSeries, TemperatureUnit,
};
pub use outcome::{AnalysisReport, DroppedPair, PairOutcome, PairSummary, QualifiedPair};
pub use station::StationPairDescriptor;
