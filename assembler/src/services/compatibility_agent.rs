//! Compatibility checker attached to the coordinator

use std::sync::Arc;

use async_trait::async_trait;
use shared::{agent_info, AgentId, Severity};

use crate::core::compatibility::CompatibilityChecker;
use crate::core::coordinator::Coordinator;
use crate::core::state::{EventKind, Section, SectionValue};
use crate::error::{AssemblerError, AssemblerResult};
use crate::traits::Subscriber;

/// Checks the consolidated candidates once every producer has reported
pub struct CompatibilityAgent {
    checker: Arc<CompatibilityChecker>,
}

impl CompatibilityAgent {
    pub fn new(checker: CompatibilityChecker) -> Self {
        Self {
            checker: Arc::new(checker),
        }
    }
}

#[async_trait]
impl Subscriber for CompatibilityAgent {
    fn agent_id(&self) -> AgentId {
        AgentId::Compatibility
    }

    async fn on_event(&self, event: EventKind, coordinator: Coordinator) -> AssemblerResult<()> {
        if event != EventKind::CandidatesReady {
            return Ok(());
        }

        let cycle = coordinator.cycle().await;
        let domains = coordinator.consolidated_candidates().await;
        if domains.is_empty() {
            return Err(AssemblerError::missing("consolidated candidates"));
        }

        let checker = Arc::clone(&self.checker);
        let (conflicts, domains) = tokio::task::spawn_blocking(move || {
            let conflicts = checker.check(&domains);
            (conflicts, domains)
        })
        .await?;
        let critical = conflicts.iter().filter(|c| c.severity == Severity::Critical).count();
        agent_info!(
            self.agent_id(),
            "🔍 Found {} conflicting pairs ({} critical)",
            conflicts.len() / 2,
            critical / 2
        );

        // The snapshot must be in place before the conflicts notify the optimizer
        let agent = self.agent_id();
        let checked = SectionValue::Proposals(domains);
        let _ = coordinator
            .update_in_cycle(cycle, Section::CheckedCandidates, checked, agent)
            .await?;
        let conflicts = SectionValue::Conflicts(conflicts);
        let _ = coordinator
            .update_in_cycle(cycle, Section::CompatibilityIssues, conflicts, agent)
            .await?;
        Ok(())
    }
}
