//! In-memory candidate source

use std::collections::BTreeMap;

use async_trait::async_trait;
use shared::{Category, ComponentCandidate};

use crate::error::ProducerResult;
use crate::traits::CandidateSource;

/// Serves fixed pools held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    pools: BTreeMap<Category, Vec<ComponentCandidate>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add candidates, grouping them by their own category
    pub fn with_candidates(
        mut self,
        candidates: impl IntoIterator<Item = ComponentCandidate>,
    ) -> Self {
        for candidate in candidates {
            self.pools.entry(candidate.category).or_default().push(candidate);
        }
        self
    }

    pub fn with_pool(mut self, category: Category, candidates: Vec<ComponentCandidate>) -> Self {
        self.pools.insert(category, candidates);
        self
    }
}

#[async_trait]
impl CandidateSource for InMemorySource {
    async fn load(&self, category: Category) -> ProducerResult<Vec<ComponentCandidate>> {
        Ok(self.pools.get(&category).cloned().unwrap_or_default())
    }

    fn categories(&self) -> Vec<Category> {
        self.pools.keys().copied().collect()
    }
}
