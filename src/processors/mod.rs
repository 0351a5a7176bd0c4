pub mod anomaly_computer;
pub mod baseline_selector;
pub mod ensemble_aggregator;
pub mod pair_processor;
pub mod record_stitcher;

pub use anomaly_computer::AnomalyComputer;
pub use baseline_selector::{BaselineSelection, BaselineSelector};
pub use ensemble_aggregator::EnsembleAggregator;
pub use pair_processor::{PairInput, PairProcessor};
pub use record_stitcher::{RecordStitcher, StitchOutcome};
