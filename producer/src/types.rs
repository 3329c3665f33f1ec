//! Producer-specific data types

use serde::{Deserialize, Serialize};
use shared::{
    CandidateId, Category, ComponentAttributes, ComponentCandidate, PerformanceMetrics, Price,
};

/// Per-category selection settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProducerSettings {
    /// Fraction of the request's budget ceiling a single candidate may cost
    pub budget_share: f64,

    /// Cap on the number of proposed candidates, after ranking
    pub max_candidates: Option<usize>,
}

impl Default for ProducerSettings {
    fn default() -> Self {
        Self {
            budget_share: 1.0,
            max_candidates: None,
        }
    }
}

/// One record as stored in a pool file
///
/// The category is implied by the pool the record lives in.
#[derive(Debug, Clone, Deserialize)]
pub struct PoolRecord {
    #[serde(alias = "url", alias = "URL")]
    pub id: String,

    #[serde(alias = "model_name", alias = "Model_Name")]
    pub name: String,

    #[serde(default, alias = "Price")]
    pub price: Price,

    #[serde(default)]
    pub attributes: ComponentAttributes,

    #[serde(default)]
    pub metrics: PerformanceMetrics,
}

impl PoolRecord {
    pub fn into_candidate(self, category: Category) -> ComponentCandidate {
        ComponentCandidate {
            category,
            id: CandidateId::new(self.id),
            name: self.name,
            price: self.price,
            attributes: self.attributes,
            metrics: self.metrics,
        }
    }
}
