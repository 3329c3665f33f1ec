//! Assembler wiring
//!
//! Builds a coordinator, registers one producer agent per category plus the
//! compatibility and optimization agents, and runs requests through it
//! using the polling contract on the `builds` section.

use std::sync::Arc;

use producer::{CandidateSource, CategoryProducer, ProducerSettings};
use serde::Serialize;
use shared::{
    agent_debug, agent_info, agent_warn, logging, AgentId, Build, BuildRequest, ConflictPair,
    CycleId,
};

use crate::config::AssemblerConfig;
use crate::core::compatibility::CompatibilityChecker;
use crate::core::coordinator::Coordinator;
use crate::core::state::{ErrorEntry, EventKind, Section, SectionValue};
use crate::error::{AssemblerError, AssemblerResult};
use crate::optimization::Optimizer;
use crate::services::{CompatibilityAgent, OptimizationAgent, ProducerAgent};

/// What one request produced
#[derive(Debug, Clone, Serialize)]
pub struct AssemblyOutcome {
    pub cycle: CycleId,
    pub builds: Vec<Build>,
    pub conflicts: Vec<ConflictPair>,
    pub response: Option<String>,
    pub errors: Vec<ErrorEntry>,
}

/// Coordinator plus its registered agents
///
/// Requests are meant to run one at a time; each starts a new cycle.
pub struct Assembler {
    coordinator: Coordinator,
    config: AssemblerConfig,
}

impl Assembler {
    /// Wire the agents for every category the source provides
    pub async fn new<S>(
        config: AssemblerConfig,
        source: Arc<S>,
        settings: ProducerSettings,
    ) -> AssemblerResult<Self>
    where
        S: CandidateSource + 'static,
    {
        config.validate()?;
        let categories = source.categories();
        if categories.len() < config.expected_producers {
            return Err(AssemblerError::config(format!(
                "expected {} producers but the source only provides {} categories",
                config.expected_producers,
                categories.len()
            )));
        }

        let coordinator = Coordinator::new(config.expected_producers);
        for category in &categories {
            let producer =
                CategoryProducer::new(*category, Arc::clone(&source)).with_settings(settings);
            coordinator
                .subscribe(EventKind::RequirementsUpdated, Arc::new(ProducerAgent::new(producer)))
                .await;
        }

        let checker = CompatibilityChecker::with_default_rules(config.power_margin)?;
        agent_debug!(
            AgentId::Compatibility,
            "Rules: {}",
            checker.rule_names().join(", ")
        );
        coordinator
            .subscribe(EventKind::CandidatesReady, Arc::new(CompatibilityAgent::new(checker)))
            .await;
        coordinator
            .subscribe(
                EventKind::ConflictsPublished,
                Arc::new(OptimizationAgent::new(Optimizer::new(config.search.clone()))),
            )
            .await;

        logging::log_startup(
            &AgentId::Coordinator,
            &format!(
                "{} producers, {:?} value search",
                categories.len(),
                config.search.value_strategy
            ),
        );
        Ok(Self { coordinator, config })
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    /// Run a request through a fresh cycle and wait for its builds
    pub async fn run_request(&self, request: BuildRequest) -> AssemblerResult<AssemblyOutcome> {
        let cycle = self.coordinator.reset().await;
        agent_info!(
            AgentId::Coordinator,
            "🚀 Cycle {} for budget ${:.2} ({})",
            cycle,
            request.budget.max,
            request.fitness
        );

        if let Some(description) = request.description.clone() {
            self.coordinator
                .update_silently(Section::UserInput, SectionValue::Text(description), AgentId::User)
                .await?;
        }
        // Agents run detached; completion is observed by polling for builds
        let _ = self
            .coordinator
            .update(Section::UserRequirements, SectionValue::Requirements(request), AgentId::User)
            .await?;

        let builds = match self.coordinator.wait_for_builds(self.config.poll).await {
            Ok(builds) => builds,
            Err(e) => {
                agent_warn!(AgentId::Coordinator, "Cycle {} did not complete: {}", cycle, e);
                return Err(e);
            }
        };

        let outcome = AssemblyOutcome {
            cycle,
            builds,
            conflicts: self.coordinator.conflicts().await,
            response: self.coordinator.response().await,
            errors: self.coordinator.errors().await,
        };
        logging::log_success(
            &AgentId::Coordinator,
            &format!("cycle {} produced {} builds", cycle, outcome.builds.len()),
        );
        Ok(outcome)
    }
}
