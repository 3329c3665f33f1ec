//! Optimizer attached to the coordinator

use std::sync::Arc;

use async_trait::async_trait;
use shared::{agent_info, AgentId};

use crate::core::coordinator::Coordinator;
use crate::core::packager::BuildPackager;
use crate::core::state::{EventKind, Section, SectionValue};
use crate::error::{AssemblerError, AssemblerResult};
use crate::optimization::Optimizer;
use crate::traits::Subscriber;

/// Solves the cycle once conflicts are published
///
/// Solves over the candidate snapshot the checker published with the
/// conflicts, not the live proposals. Publishes the response summary before
/// the builds, so a caller that sees the builds can also read the summary.
pub struct OptimizationAgent {
    optimizer: Arc<Optimizer>,
}

impl OptimizationAgent {
    pub fn new(optimizer: Optimizer) -> Self {
        Self {
            optimizer: Arc::new(optimizer),
        }
    }
}

#[async_trait]
impl Subscriber for OptimizationAgent {
    fn agent_id(&self) -> AgentId {
        AgentId::Optimizer
    }

    async fn on_event(&self, event: EventKind, coordinator: Coordinator) -> AssemblerResult<()> {
        if event != EventKind::ConflictsPublished {
            return Ok(());
        }

        let cycle = coordinator.cycle().await;
        let request = coordinator
            .requirements()
            .await
            .ok_or_else(|| AssemblerError::missing("user requirements"))?;
        let domains = coordinator
            .checked_candidates()
            .await
            .ok_or_else(|| AssemblerError::missing("checked candidates"))?;
        let conflicts = coordinator.conflicts().await;

        let optimizer = Arc::clone(&self.optimizer);
        let (report, conflicts) = tokio::task::spawn_blocking(move || {
            let report = optimizer.solve(&domains, &conflicts, &request);
            (report, conflicts)
        })
        .await?;

        agent_info!(
            self.agent_id(),
            "✅ Cycle solved with {} builds (phase {})",
            report.builds.len(),
            report.phase
        );

        let summary = BuildPackager::summarize(&report.builds, &conflicts);
        let agent = self.agent_id();
        let _ = coordinator
            .update_in_cycle(cycle, Section::UserResponse, SectionValue::Text(summary), agent)
            .await?;
        let _ = coordinator
            .update_in_cycle(cycle, Section::Builds, SectionValue::Builds(report.builds), agent)
            .await?;
        Ok(())
    }
}
