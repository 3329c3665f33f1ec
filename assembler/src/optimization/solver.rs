//! Solve-cycle driver
//!
//! Runs `Idle → DomainsLoaded → ArcConsistent → CheapestSearched →
//! ValueSearched → Done`, stopping after `ArcConsistent` when a domain
//! wipes out. Every step has its own deadline. Missing builds are normal
//! outcomes recorded in the report, never errors.

use serde::Serialize;
use shared::{
    agent_debug, agent_info, agent_warn, logging, AgentId, Build, BuildLabel, BuildRequest,
    Category, ConflictPair, Domains,
};

use super::arc_consistency::{self, Ac3Outcome, Ac3Status};
use super::strategies::{cheapest, BoundedSearch, CheapestOutcome, GeneticSearch};
use super::traits::ValueSearch;
use super::types::{Deadline, Scorer, SearchProblem, SolvePhase};
use crate::config::{SearchConfig, ValueStrategy};
use crate::core::packager::BuildPackager;

/// Everything one solve cycle produced
#[derive(Debug, Clone, Serialize)]
pub struct SolveReport {
    pub phase: SolvePhase,
    pub transitions: Vec<SolvePhase>,
    pub builds: Vec<Build>,
    /// Domains after AC-3
    pub reduced: Domains,
    pub ac3: Option<Ac3Outcome>,
    /// Category whose domain emptied, when infeasible
    pub infeasible: Option<Category>,
    pub cheapest_timed_out: bool,
    pub value_timed_out: bool,
    pub value_iterations: usize,
}

impl SolveReport {
    fn new() -> Self {
        Self {
            phase: SolvePhase::Idle,
            transitions: vec![SolvePhase::Idle],
            builds: Vec::new(),
            reduced: Domains::new(),
            ac3: None,
            infeasible: None,
            cheapest_timed_out: false,
            value_timed_out: false,
            value_iterations: 0,
        }
    }

    fn advance(&mut self, phase: SolvePhase) {
        let transition = format!("{} -> {}", self.phase, phase);
        logging::log_progress(&AgentId::Optimizer, "phase", &transition);
        self.phase = phase;
        self.transitions.push(phase);
    }

    pub fn build(&self, label: BuildLabel) -> Option<&Build> {
        self.builds.iter().find(|build| build.label == label)
    }
}

/// AC-3 followed by the cheapest and best-value searches
pub struct Optimizer {
    config: SearchConfig,
    value_search: Box<dyn ValueSearch>,
}

impl Optimizer {
    pub fn new(config: SearchConfig) -> Self {
        let value_search: Box<dyn ValueSearch> = match config.value_strategy {
            ValueStrategy::Genetic => Box::new(GeneticSearch::new(config.genetic.clone())),
            ValueStrategy::Bounded => Box::new(BoundedSearch::new()),
        };
        Self { config, value_search }
    }

    /// Replace the configured best-value search
    pub fn with_value_search(mut self, value_search: Box<dyn ValueSearch>) -> Self {
        self.value_search = value_search;
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Run one solve cycle over private copies of the domains and conflicts
    pub fn solve(
        &self,
        domains: &Domains,
        conflicts: &[ConflictPair],
        request: &BuildRequest,
    ) -> SolveReport {
        let agent = AgentId::Optimizer;
        let mut report = SolveReport::new();

        let scorer = Scorer::new(request.fitness, self.config.rank_bonus);
        let mut problem = SearchProblem::new(domains, conflicts, request.budget, scorer);
        report.advance(SolvePhase::DomainsLoaded);
        agent_debug!(
            agent,
            "Loaded {} categories with {} conflicts",
            problem.slot_count(),
            problem.conflict_count()
        );

        let ac3_deadline = Deadline::after(self.config.ac3_deadline);
        let ac3 = arc_consistency::enforce(&mut problem, &ac3_deadline);
        report.ac3 = Some(ac3);
        report.reduced = problem.to_domains();
        report.advance(SolvePhase::ArcConsistent);

        match ac3.status {
            Ac3Status::Wiped(category) => {
                agent_info!(
                    agent,
                    "Infeasible: no {} candidate survives arc consistency",
                    category
                );
                report.infeasible = Some(category);
                report.advance(SolvePhase::Done);
                return report;
            }
            Ac3Status::TimedOut => {
                agent_warn!(
                    agent,
                    "⏱️ AC-3 deadline hit after {} revisions; searching reduced domains",
                    ac3.revisions
                );
            }
            Ac3Status::Consistent => {
                agent_info!(
                    agent,
                    "AC-3 removed {} candidates in {} revisions",
                    ac3.removed,
                    ac3.revisions
                );
            }
        }

        if problem.slot_count() == 0 {
            report.advance(SolvePhase::Done);
            return report;
        }

        match cheapest::search(&problem, &Deadline::after(self.config.cheapest_deadline)) {
            CheapestOutcome::Found(path) => {
                let score = problem.score(&path);
                let components = problem.components(&path);
                let build = BuildPackager::package(BuildLabel::Cheapest, components, score);
                agent_info!(agent, "Cheapest build: ${:.2}", build.total_price);
                report.builds.push(build);
            }
            CheapestOutcome::Exhausted => {
                agent_info!(agent, "No build fits the ${:.2} budget", problem.budget_max());
            }
            CheapestOutcome::TimedOut => {
                agent_warn!(
                    agent,
                    "⏱️ Cheapest search hit its deadline; omitting cheapest build"
                );
                report.cheapest_timed_out = true;
            }
        }
        report.advance(SolvePhase::CheapestSearched);

        let outcome = self
            .value_search
            .search(&problem, Deadline::after(self.config.value_deadline));
        report.value_timed_out = outcome.timed_out;
        report.value_iterations = outcome.iterations;
        match outcome.best {
            Some((path, score)) => {
                let components = problem.components(&path);
                let build = BuildPackager::package(BuildLabel::BestValue, components, score);
                agent_info!(
                    agent,
                    "Best value build ({}): ${:.2}, score {:.4}",
                    self.value_search.name(),
                    build.total_price,
                    score
                );
                report.builds.push(build);
            }
            None => {
                agent_info!(agent, "{} search found no valid build", self.value_search.name());
            }
        }
        report.advance(SolvePhase::ValueSearched);
        report.advance(SolvePhase::Done);
        report
    }
}
