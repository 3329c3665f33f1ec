//! Category producer with dependency injection

use std::sync::Arc;

use shared::{agent_debug, agent_info, AgentId, BuildRequest, Category, ComponentCandidate};

use crate::core::selection;
use crate::error::ProducerResult;
use crate::traits::CandidateSource;
use crate::types::ProducerSettings;

/// Produces the candidate proposal for one category
pub struct CategoryProducer<S>
where
    S: CandidateSource,
{
    category: Category,
    source: Arc<S>,
    settings: ProducerSettings,
}

impl<S> CategoryProducer<S>
where
    S: CandidateSource,
{
    pub fn new(category: Category, source: Arc<S>) -> Self {
        Self {
            category,
            source,
            settings: ProducerSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: ProducerSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn agent_id(&self) -> AgentId {
        AgentId::Producer(self.category)
    }

    /// Load the pool and select the candidates worth proposing for the request
    pub async fn propose(&self, request: &BuildRequest) -> ProducerResult<Vec<ComponentCandidate>> {
        let agent = self.agent_id();
        let pool = self.source.load(self.category).await?;
        let pool_size = pool.len();
        agent_debug!(agent, "Loaded {} {} candidates", pool_size, self.category);

        let proposal = selection::select(pool, request, &self.settings);
        agent_info!(
            agent,
            "Proposing {}/{} {} candidates (budget ceiling {:.2})",
            proposal.len(),
            pool_size,
            self.category,
            request.budget.max * self.settings.budget_share
        );
        Ok(proposal)
    }
}
