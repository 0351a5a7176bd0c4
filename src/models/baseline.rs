use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive calendar-year span, labelled `START-END`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BaselinePeriod {
    pub start_year: i32,
    pub end_year: i32,
}

impl BaselinePeriod {
    pub fn new(start_year: i32, end_year: i32) -> Self {
        Self {
            start_year,
            end_year,
        }
    }

    pub fn label(&self) -> String {
        format!("{}-{}", self.start_year, self.end_year)
    }
}

impl fmt::Display for BaselinePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start_year, self.end_year)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualificationTier {
    Strict,
    Inclusive,
    None,
}

impl QualificationTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualificationTier::Strict => "STRICT",
            QualificationTier::Inclusive => "INCLUSIVE",
            QualificationTier::None => "INSUFFICIENT",
        }
    }

    /// Marker colour used by map collaborators
    pub fn marker_color(&self) -> &'static str {
        match self {
            QualificationTier::Strict => "green",
            QualificationTier::Inclusive => "blue",
            QualificationTier::None => "red",
        }
    }
}

/// Where an established baseline came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineSource {
    /// The fixed strict window
    Standard,
    /// One of the fixed alternative windows
    Alternative,
    /// Middle span of the years actually present
    DataDriven,
    /// Whole series, for records of 10 to 19 years
    FullRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineResult {
    pub mean: f64,
    pub period: BaselinePeriod,
    pub tier: QualificationTier,
    pub source: BaselineSource,
    /// Distinct calendar years contributing to the mean
    pub years: usize,
    pub observations: usize,
}

impl BaselineResult {
    pub fn period_label(&self) -> String {
        self.period.label()
    }
}

/// Why a pair was excluded from one or both ensembles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DropReason {
    MissingLegacyData,
    InsufficientStrictBaseline { years: usize, required: usize },
    NoBaselineEstablishable { years: usize },
    /// The stitched record broke the increasing-date invariant
    InvalidSeries { detail: String },
}

impl DropReason {
    /// Whether the pair is also absent from the inclusive ensemble
    pub fn excludes_inclusive(&self) -> bool {
        !matches!(self, DropReason::InsufficientStrictBaseline { .. })
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::MissingLegacyData => write!(f, "No legacy data"),
            DropReason::InsufficientStrictBaseline { years, .. } => {
                write!(f, "Only {} baseline years", years)
            }
            DropReason::NoBaselineEstablishable { .. } => {
                write!(f, "Cannot establish any baseline")
            }
            DropReason::InvalidSeries { detail } => write!(f, "Invalid record: {}", detail),
        }
    }
}
