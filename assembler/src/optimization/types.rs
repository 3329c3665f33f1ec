//! Search problem representation shared by every solve step
//!
//! Candidates are addressed by a flat index. Domains are index lists per
//! category slot, and conflicts are index pairs, so partial assignments are
//! plain `Vec<usize>` paths that can be cloned and passed by value.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;
use shared::{BudgetRange, Category, ComponentCandidate, ConflictPair, Domains, FitnessMode};

/// Relative slack for lookahead budget checks
const LOOKAHEAD_TOLERANCE: f64 = 1e-9;

/// Wall-clock limit for one solve step
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    expires: Instant,
}

impl Deadline {
    pub fn after(limit: Duration) -> Self {
        Self {
            expires: Instant::now() + limit,
        }
    }

    pub fn expired(&self) -> bool {
        Instant::now() >= self.expires
    }
}

/// Optimizer state machine over one solve cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SolvePhase {
    Idle,
    DomainsLoaded,
    ArcConsistent,
    CheapestSearched,
    ValueSearched,
    Done,
}

impl fmt::Display for SolvePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SolvePhase::Idle => "idle",
            SolvePhase::DomainsLoaded => "domains_loaded",
            SolvePhase::ArcConsistent => "arc_consistent",
            SolvePhase::CheapestSearched => "cheapest_searched",
            SolvePhase::ValueSearched => "value_searched",
            SolvePhase::Done => "done",
        };
        write!(f, "{name}")
    }
}

/// Per-component performance and build fitness
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scorer {
    pub fitness: FitnessMode,
    pub rank_bonus: bool,
}

impl Scorer {
    pub fn new(fitness: FitnessMode, rank_bonus: bool) -> Self {
        Self { fitness, rank_bonus }
    }

    /// Relative performance contribution of one component
    pub fn performance(&self, candidate: &ComponentCandidate) -> f64 {
        let metrics = &candidate.metrics;
        let base = match candidate.category {
            Category::Cpu => {
                metrics.single_core.unwrap_or(0.0) + 0.5 * metrics.multi_core.unwrap_or(0.0)
            }
            Category::Gpu => 1.5 * metrics.graphics.or(metrics.multi_core).unwrap_or(0.0),
            _ => 1.0,
        };

        match candidate.attributes.best_seller_rank {
            Some(rank) if self.rank_bonus => {
                base * (1.0 + (100.0 - f64::from(rank.min(100))) / 500.0)
            }
            _ => base,
        }
    }

    /// Fitness of a build from its summed performance and total price
    pub fn fitness(&self, performance: f64, total_price: f64) -> f64 {
        match self.fitness {
            FitnessMode::Value if total_price > 0.0 && total_price.is_finite() => {
                performance / total_price
            }
            FitnessMode::Value => 0.0,
            FitnessMode::Performance => performance,
        }
    }
}

/// Private, index-addressed copy of the domains and conflicts
#[derive(Debug, Clone)]
pub struct SearchProblem {
    categories: Vec<Category>,
    candidates: Vec<ComponentCandidate>,
    performance: Vec<f64>,
    domains: Vec<Vec<usize>>,
    conflicts: HashSet<(usize, usize)>,
    budget: BudgetRange,
    scorer: Scorer,
}

impl SearchProblem {
    /// Copy the domains and index the conflicts between their candidates
    ///
    /// Conflicts naming candidates outside the domains are ignored.
    pub fn new(
        domains: &Domains,
        conflicts: &[ConflictPair],
        budget: BudgetRange,
        scorer: Scorer,
    ) -> Self {
        let mut categories = Vec::with_capacity(domains.len());
        let mut candidates = Vec::new();
        let mut slots = Vec::with_capacity(domains.len());
        let mut lookup = HashMap::new();

        for (category, pool) in domains {
            categories.push(*category);
            let mut slot = Vec::with_capacity(pool.len());
            for candidate in pool {
                let index = candidates.len();
                lookup.insert(candidate.reference(), index);
                candidates.push(candidate.clone());
                slot.push(index);
            }
            slots.push(slot);
        }

        let mut conflict_set = HashSet::new();
        for pair in conflicts {
            if let (Some(&a), Some(&b)) = (lookup.get(&pair.first), lookup.get(&pair.second)) {
                conflict_set.insert((a, b));
                conflict_set.insert((b, a));
            }
        }

        let performance = candidates.iter().map(|c| scorer.performance(c)).collect();
        Self {
            categories,
            candidates,
            performance,
            domains: slots,
            conflicts: conflict_set,
            budget,
            scorer,
        }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn slot_count(&self) -> usize {
        self.categories.len()
    }

    pub fn domain(&self, slot: usize) -> &[usize] {
        &self.domains[slot]
    }

    pub(crate) fn domain_mut(&mut self, slot: usize) -> &mut Vec<usize> {
        &mut self.domains[slot]
    }

    pub fn candidate(&self, index: usize) -> &ComponentCandidate {
        &self.candidates[index]
    }

    pub fn price(&self, index: usize) -> f64 {
        self.candidates[index].price.value()
    }

    pub fn performance(&self, index: usize) -> f64 {
        self.performance[index]
    }

    pub fn budget_max(&self) -> f64 {
        self.budget.max
    }

    /// Whether a lookahead total (spend so far plus the cheapest completion)
    /// can still fit the budget
    ///
    /// Lookahead sums add prices in a different order than `total_price`, so
    /// they get a small relative slack. Complete paths are still checked with
    /// `is_valid`.
    pub fn may_fit(&self, lookahead: f64) -> bool {
        let max = self.budget.max;
        lookahead <= max + LOOKAHEAD_TOLERANCE * max.abs().max(1.0)
    }

    pub fn scorer(&self) -> Scorer {
        self.scorer
    }

    pub fn conflicts(&self, a: usize, b: usize) -> bool {
        self.conflicts.contains(&(a, b))
    }

    pub fn conflict_count(&self) -> usize {
        self.conflicts.len() / 2
    }

    /// Whether `candidate` conflicts with anything already on `path`
    pub fn clashes_with(&self, path: &[usize], candidate: usize) -> bool {
        path.iter().any(|&chosen| self.conflicts(chosen, candidate))
    }

    /// First category whose domain is empty
    pub fn empty_category(&self) -> Option<Category> {
        self.domains
            .iter()
            .position(Vec::is_empty)
            .map(|slot| self.categories[slot])
    }

    pub fn total_price(&self, assignment: &[usize]) -> f64 {
        assignment.iter().map(|&i| self.price(i)).sum()
    }

    pub fn score(&self, assignment: &[usize]) -> f64 {
        let performance: f64 = assignment.iter().map(|&i| self.performance(i)).sum();
        self.scorer.fitness(performance, self.total_price(assignment))
    }

    /// Complete, conflict-free and within the budget ceiling
    pub fn is_valid(&self, assignment: &[usize]) -> bool {
        if assignment.len() != self.slot_count() {
            return false;
        }
        for (i, &a) in assignment.iter().enumerate() {
            if assignment[i + 1..].iter().any(|&b| self.conflicts(a, b)) {
                return false;
            }
        }
        self.total_price(assignment) <= self.budget.max
    }

    pub fn components(&self, assignment: &[usize]) -> BTreeMap<Category, ComponentCandidate> {
        self.categories
            .iter()
            .zip(assignment)
            .map(|(category, &i)| (*category, self.candidates[i].clone()))
            .collect()
    }

    /// Current domains as candidate lists
    pub fn to_domains(&self) -> Domains {
        self.categories
            .iter()
            .zip(&self.domains)
            .map(|(category, slot)| {
                let candidates = slot.iter().map(|&i| self.candidates[i].clone()).collect();
                (*category, candidates)
            })
            .collect()
    }
}

/// Result of a best-value search
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueOutcome {
    /// Best assignment found and its fitness
    pub best: Option<(Vec<usize>, f64)>,
    pub timed_out: bool,
    /// Generations or search nodes visited
    pub iterations: usize,
    /// Best fitness after each generation; only the genetic search fills this
    pub history: Vec<f64>,
}
