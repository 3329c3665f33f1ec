//! Conflict diagnostics and assembled builds

use super::{CandidateRef, Category, ComponentCandidate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// How serious an incompatibility is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// Two candidates from different categories that cannot be combined
///
/// The checker records both orientations of every pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConflictPair {
    pub first: CandidateRef,
    pub second: CandidateRef,
    pub reason: String,
    pub severity: Severity,
}

impl ConflictPair {
    pub fn new(
        first: CandidateRef,
        second: CandidateRef,
        reason: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            first,
            second,
            reason: reason.into(),
            severity,
        }
    }

    /// Same conflict seen from the other side
    pub fn reversed(&self) -> Self {
        Self {
            first: self.second.clone(),
            second: self.first.clone(),
            reason: self.reason.clone(),
            severity: self.severity,
        }
    }
}

/// Label attached to an emitted build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildLabel {
    Cheapest,
    BestValue,
}

impl fmt::Display for BuildLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildLabel::Cheapest => write!(f, "cheapest"),
            BuildLabel::BestValue => write!(f, "best value"),
        }
    }
}

/// One complete, priced assignment of a candidate per category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Build {
    pub label: BuildLabel,
    pub components: BTreeMap<Category, ComponentCandidate>,
    pub total_price: f64,
    pub score: f64,
}

impl Build {
    pub fn component(&self, category: Category) -> Option<&ComponentCandidate> {
        self.components.get(&category)
    }

    pub fn references(&self) -> Vec<CandidateRef> {
        self.components.values().map(ComponentCandidate::reference).collect()
    }
}
