use serde::{Deserialize, Serialize};

use crate::models::{
    BaselineResult, DropReason, EnsembleSeries, MonthlyAnomalySeries, QualificationTier,
    StationPairDescriptor, StitchSource,
};

/// Baseline and anomalies for a pair that qualified under one policy.
#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedPair {
    pub baseline: BaselineResult,
    pub anomalies: MonthlyAnomalySeries,
}

/// Everything the pipeline decided about one configured pair.
#[derive(Debug, Clone, PartialEq)]
pub struct PairOutcome {
    pub pair: StationPairDescriptor,
    /// `None` when the pair was dropped before stitching
    pub source: Option<StitchSource>,
    pub data_span: Option<(i32, i32)>,
    pub strict: Option<QualifiedPair>,
    pub inclusive: Option<QualifiedPair>,
    pub drop_reasons: Vec<DropReason>,
}

impl PairOutcome {
    pub fn dropped(pair: StationPairDescriptor, reason: DropReason) -> Self {
        Self {
            pair,
            source: None,
            data_span: None,
            strict: None,
            inclusive: None,
            drop_reasons: vec![reason],
        }
    }

    pub fn name(&self) -> String {
        self.pair.display_name()
    }

    pub fn tier(&self) -> QualificationTier {
        if self.strict.is_some() {
            QualificationTier::Strict
        } else if self.inclusive.is_some() {
            QualificationTier::Inclusive
        } else {
            QualificationTier::None
        }
    }

    /// e.g. `1960-1980 (21yr)`
    pub fn strict_label(&self) -> Option<String> {
        self.strict
            .as_ref()
            .map(|q| format!("{} ({}yr)", q.baseline.period_label(), q.baseline.years))
    }

    pub fn inclusive_label(&self) -> Option<String> {
        self.inclusive.as_ref().map(|q| q.baseline.period_label())
    }

    pub fn summary(&self) -> PairSummary {
        PairSummary {
            name: self.name(),
            state: self.pair.state.clone(),
            latitude: self.pair.latitude,
            longitude: self.pair.longitude,
            source: self.source,
            data_start: self.data_span.map(|(start, _)| start),
            data_end: self.data_span.map(|(_, end)| end),
            tier: self.tier(),
            marker_color: self.tier().marker_color().to_string(),
            strict_baseline: self.strict_label(),
            inclusive_baseline: self.inclusive_label(),
            reasons: self.drop_reasons.iter().map(|r| r.to_string()).collect(),
        }
    }
}

/// Fixed-shape per-pair record handed to reporting collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairSummary {
    pub name: String,
    pub state: String,
    pub latitude: f64,
    pub longitude: f64,
    pub source: Option<StitchSource>,
    pub data_start: Option<i32>,
    pub data_end: Option<i32>,
    pub tier: QualificationTier,
    pub marker_color: String,
    pub strict_baseline: Option<String>,
    pub inclusive_baseline: Option<String>,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroppedPair {
    pub name: String,
    pub reason: DropReason,
    /// Missing from the inclusive ensemble as well as the strict one
    pub fully_dropped: bool,
}

impl DroppedPair {
    pub fn new(name: String, reason: DropReason) -> Self {
        let fully_dropped = reason.excludes_inclusive();
        Self {
            name,
            reason,
            fully_dropped,
        }
    }

    /// `<legacy> / <modern> - <reason>`
    pub fn describe(&self) -> String {
        format!("{} - {}", self.name, self.reason)
    }
}

/// Result of a full run over every configured pair.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub outcomes: Vec<PairOutcome>,
    pub strict: Option<EnsembleSeries>,
    pub inclusive: Option<EnsembleSeries>,
    pub dropped: Vec<DroppedPair>,
}

impl AnalysisReport {
    pub fn strict_pairs(&self) -> impl Iterator<Item = &PairOutcome> {
        self.outcomes.iter().filter(|o| o.strict.is_some())
    }

    pub fn inclusive_pairs(&self) -> impl Iterator<Item = &PairOutcome> {
        self.outcomes.iter().filter(|o| o.inclusive.is_some())
    }

    /// Pairs absent from both ensembles, each listed once
    pub fn fully_dropped(&self) -> impl Iterator<Item = &PairOutcome> {
        self.outcomes.iter().filter(|o| o.tier() == QualificationTier::None)
    }

    pub fn summaries(&self) -> Vec<PairSummary> {
        self.outcomes.iter().map(PairOutcome::summary).collect()
    }
}
