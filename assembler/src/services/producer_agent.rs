//! Category producer attached to the coordinator

use async_trait::async_trait;
use producer::{CandidateSource, CategoryProducer};
use shared::{agent_debug, AgentId, Domains};

use crate::core::coordinator::Coordinator;
use crate::core::state::{EventKind, Section, SectionValue};
use crate::error::{AssemblerError, AssemblerResult};
use crate::traits::Subscriber;

/// Publishes a category proposal whenever the requirements change
pub struct ProducerAgent<S>
where
    S: CandidateSource,
{
    producer: CategoryProducer<S>,
}

impl<S> ProducerAgent<S>
where
    S: CandidateSource,
{
    pub fn new(producer: CategoryProducer<S>) -> Self {
        Self { producer }
    }
}

#[async_trait]
impl<S> Subscriber for ProducerAgent<S>
where
    S: CandidateSource + 'static,
{
    fn agent_id(&self) -> AgentId {
        self.producer.agent_id()
    }

    async fn on_event(&self, event: EventKind, coordinator: Coordinator) -> AssemblerResult<()> {
        if event != EventKind::RequirementsUpdated {
            return Ok(());
        }

        let cycle = coordinator.cycle().await;
        let request = coordinator
            .requirements()
            .await
            .ok_or_else(|| AssemblerError::missing("user requirements"))?;

        let proposal = self.producer.propose(&request).await?;
        agent_debug!(self.agent_id(), "Publishing {} candidates", proposal.len());

        let mut domains = Domains::new();
        domains.insert(self.producer.category(), proposal);
        // Readiness notification runs detached; the caller polls for builds
        let proposals = SectionValue::Proposals(domains);
        let _ = coordinator
            .update_in_cycle(cycle, Section::ComponentProposals, proposals, self.agent_id())
            .await?;
        Ok(())
    }
}
