use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A calendar month, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month())
    }

    pub fn next(&self) -> Self {
        if self.month >= 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }

    /// Months from `start` to `end`, both included
    pub fn range_inclusive(start: YearMonth, end: YearMonth) -> impl Iterator<Item = YearMonth> {
        std::iter::successors(Some(start), move |m| {
            let next = m.next();
            (next <= end).then_some(next)
        })
        .take_while(move |m| *m <= end)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAnomaly {
    pub month: YearMonth,
    pub anomaly: f64,
}

/// Chronological monthly anomalies for one pair. Months without
/// observations are absent rather than filled.
///
/// Months are strictly increasing. Construction sorts the input and keeps
/// the later value when a month repeats.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MonthlyAnomalySeries {
    values: Vec<MonthlyAnomaly>,
}

impl MonthlyAnomalySeries {
    pub fn new(values: Vec<MonthlyAnomaly>) -> Self {
        let by_month: BTreeMap<YearMonth, MonthlyAnomaly> =
            values.into_iter().map(|v| (v.month, v)).collect();
        Self {
            values: by_month.into_values().collect(),
        }
    }

    pub fn values(&self) -> &[MonthlyAnomaly] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn first_month(&self) -> Option<YearMonth> {
        self.values.first().map(|v| v.month)
    }

    pub fn last_month(&self) -> Option<YearMonth> {
        self.values.last().map(|v| v.month)
    }

    pub fn get(&self, month: YearMonth) -> Option<f64> {
        self.values
            .binary_search_by(|v| v.month.cmp(&month))
            .ok()
            .map(|i| self.values[i].anomaly)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnsembleMonth {
    pub month: YearMonth,
    pub anomaly: f64,
    /// Number of pairs contributing to this month
    pub pairs: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnualAnomaly {
    pub year: i32,
    pub anomaly: f64,
    /// Number of ensemble months averaged into this year
    pub months: usize,
}

/// Cross-pair mean anomaly, monthly and annual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleSeries {
    pub pair_count: usize,
    pub monthly: Vec<EnsembleMonth>,
    pub annual: Vec<AnnualAnomaly>,
}

impl EnsembleSeries {
    pub fn monthly_value(&self, month: YearMonth) -> Option<f64> {
        self.monthly
            .binary_search_by(|m| m.month.cmp(&month))
            .ok()
            .map(|i| self.monthly[i].anomaly)
    }

    pub fn annual_value(&self, year: i32) -> Option<f64> {
        self.annual
            .binary_search_by(|a| a.year.cmp(&year))
            .ok()
            .map(|i| self.annual[i].anomaly)
    }
}
