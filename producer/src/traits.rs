//! Producer trait definitions for dependency injection

use async_trait::async_trait;
use shared::{Category, ComponentCandidate};

use crate::error::ProducerResult;

/// Source of raw candidate records for a category
///
/// Implementations normalize records into `ComponentCandidate`s (prices,
/// attribute types) but do not filter or rank them.
#[mockall::automock]
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Load every known candidate for the category
    async fn load(&self, category: Category) -> ProducerResult<Vec<ComponentCandidate>>;

    /// Categories this source can serve
    fn categories(&self) -> Vec<Category>;
}
