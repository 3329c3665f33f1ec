//! Best-value search by branch-and-bound
//!
//! Slots are tried by descending performance. A branch is pruned when its
//! optimistic bound (best remaining performance over cheapest remaining
//! price) cannot beat the incumbent.

use shared::FitnessMode;

use super::super::traits::ValueSearch;
use super::super::types::{Deadline, SearchProblem, ValueOutcome};

const DEADLINE_STRIDE: usize = 256;

#[derive(Debug, Default)]
pub struct BoundedSearch;

impl BoundedSearch {
    pub fn new() -> Self {
        Self
    }
}

struct Bounds {
    ordered: Vec<Vec<usize>>,
    /// Best performance obtainable from each slot to the end
    best_rest: Vec<f64>,
    /// Lowest price obtainable from each slot to the end
    cheapest_rest: Vec<f64>,
}

impl Bounds {
    fn new(problem: &SearchProblem) -> Self {
        let slots = problem.slot_count();
        let ordered: Vec<Vec<usize>> = (0..slots)
            .map(|slot| {
                let mut domain = problem.domain(slot).to_vec();
                domain.sort_by(|&a, &b| {
                    problem
                        .performance(b)
                        .total_cmp(&problem.performance(a))
                        .then_with(|| problem.price(a).total_cmp(&problem.price(b)))
                        .then_with(|| problem.candidate(a).id.cmp(&problem.candidate(b).id))
                });
                domain
            })
            .collect();

        let mut best_rest = vec![0.0; slots + 1];
        let mut cheapest_rest = vec![0.0; slots + 1];
        for slot in (0..slots).rev() {
            let domain = problem.domain(slot);
            let best = domain
                .iter()
                .map(|&i| problem.performance(i))
                .fold(f64::NEG_INFINITY, f64::max);
            let cheapest = domain.iter().map(|&i| problem.price(i)).fold(f64::INFINITY, f64::min);
            best_rest[slot] = best_rest[slot + 1] + best;
            cheapest_rest[slot] = cheapest_rest[slot + 1] + cheapest;
        }

        Self {
            ordered,
            best_rest,
            cheapest_rest,
        }
    }
}

struct Branch<'a> {
    problem: &'a SearchProblem,
    bounds: Bounds,
    deadline: Deadline,
    outcome: ValueOutcome,
}

impl Branch<'_> {
    fn optimistic(&self, depth: usize, performance: f64, price: f64) -> f64 {
        let performance = performance + self.bounds.best_rest[depth];
        match self.problem.scorer().fitness {
            FitnessMode::Performance => performance,
            FitnessMode::Value => {
                let price = price + self.bounds.cheapest_rest[depth];
                if price > 0.0 {
                    performance / price
                } else {
                    f64::INFINITY
                }
            }
        }
    }

    fn incumbent(&self) -> f64 {
        self.outcome.best.as_ref().map_or(f64::NEG_INFINITY, |(_, score)| *score)
    }

    /// Returns false once the deadline has expired
    fn explore(&mut self, path: Vec<usize>, performance: f64, price: f64) -> bool {
        let depth = path.len();
        if depth == self.problem.slot_count() {
            if !self.problem.is_valid(&path) {
                return true;
            }
            let score = self.problem.score(&path);
            if score > self.incumbent() {
                self.outcome.best = Some((path, score));
            }
            return true;
        }

        for position in 0..self.bounds.ordered[depth].len() {
            self.outcome.iterations += 1;
            if self.outcome.iterations % DEADLINE_STRIDE == 0 && self.deadline.expired() {
                self.outcome.timed_out = true;
                return false;
            }

            let candidate = self.bounds.ordered[depth][position];
            let running_price = price + self.problem.price(candidate);
            if !self.problem.may_fit(running_price + self.bounds.cheapest_rest[depth + 1]) {
                continue;
            }
            let running_performance = performance + self.problem.performance(candidate);
            if self.optimistic(depth + 1, running_performance, running_price) <= self.incumbent() {
                continue;
            }
            if self.problem.clashes_with(&path, candidate) {
                continue;
            }

            let mut next = path.clone();
            next.push(candidate);
            if !self.explore(next, running_performance, running_price) {
                return false;
            }
        }
        true
    }
}

impl ValueSearch for BoundedSearch {
    fn name(&self) -> &'static str {
        "bounded"
    }

    fn search(&self, problem: &SearchProblem, deadline: Deadline) -> ValueOutcome {
        if problem.slot_count() == 0 || problem.empty_category().is_some() {
            return ValueOutcome::default();
        }

        let mut branch = Branch {
            problem,
            bounds: Bounds::new(problem),
            deadline,
            outcome: ValueOutcome::default(),
        };
        branch.explore(Vec::with_capacity(problem.slot_count()), 0.0, 0.0);
        branch.outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::types::Scorer;
    use shared::{
        BudgetRange, Category, ComponentCandidate, ConflictPair, Domains, PerformanceMetrics,
        Severity,
    };
    use std::time::Duration;

    fn deadline() -> Deadline {
        Deadline::after(Duration::from_secs(5))
    }

    fn with_perf(category: Category, id: &str, price: f64, score: f64) -> ComponentCandidate {
        let metrics = match category {
            Category::Cpu => PerformanceMetrics {
                single_core: Some(score),
                ..Default::default()
            },
            _ => PerformanceMetrics {
                graphics: Some(score),
                ..Default::default()
            },
        };
        ComponentCandidate::new(category, id, id, price).with_metrics(metrics)
    }

    fn domains() -> Domains {
        let mut domains = Domains::new();
        domains.insert(
            Category::Cpu,
            vec![
                with_perf(Category::Cpu, "c1", 100.0, 300.0),
                with_perf(Category::Cpu, "c2", 250.0, 900.0),
                with_perf(Category::Cpu, "c3", 400.0, 1200.0),
            ],
        );
        domains.insert(
            Category::Gpu,
            vec![
                with_perf(Category::Gpu, "g1", 200.0, 400.0),
                with_perf(Category::Gpu, "g2", 500.0, 1400.0),
                with_perf(Category::Gpu, "g3", 900.0, 2000.0),
            ],
        );
        domains
    }

    /// Highest score over every valid assignment
    fn exhaustive_best(problem: &SearchProblem) -> f64 {
        let mut best = f64::NEG_INFINITY;
        for &a in problem.domain(0) {
            for &b in problem.domain(1) {
                let assignment = [a, b];
                if problem.is_valid(&assignment) {
                    best = best.max(problem.score(&assignment));
                }
            }
        }
        best
    }

    #[test]
    fn test_matches_exhaustive_search_in_both_modes() {
        let d = domains();
        let conflicts = vec![ConflictPair::new(
            d[&Category::Cpu][1].reference(),
            d[&Category::Gpu][1].reference(),
            "test",
            Severity::Warning,
        )];

        for fitness in [FitnessMode::Value, FitnessMode::Performance] {
            for budget in [350.0, 800.0, 1100.0, 2000.0] {
                let budget_range = BudgetRange::up_to(budget);
                let scorer = Scorer::new(fitness, false);
                let problem = SearchProblem::new(&d, &conflicts, budget_range, scorer);
                let outcome = BoundedSearch::new().search(&problem, deadline());
                let (best, score) = outcome.best.expect("feasible");
                assert!(problem.is_valid(&best));
                assert!((score - exhaustive_best(&problem)).abs() < 1e-12, "{fitness} at {budget}");
            }
        }
    }

    #[test]
    fn test_infeasible_budget_returns_none() {
        let scorer = Scorer::new(FitnessMode::Value, false);
        let problem = SearchProblem::new(&domains(), &[], BudgetRange::up_to(250.0), scorer);
        let outcome = BoundedSearch::new().search(&problem, deadline());
        assert!(outcome.best.is_none());
    }

    #[test]
    fn test_build_costing_exactly_the_budget_is_found() {
        let mut domains = Domains::new();
        domains.insert(Category::Cpu, vec![with_perf(Category::Cpu, "cpu", 491.19, 900.0)]);
        domains.insert(Category::Gpu, vec![with_perf(Category::Gpu, "gpu", 729.32, 1400.0)]);
        domains.insert(
            Category::Motherboard,
            vec![ComponentCandidate::new(Category::Motherboard, "mb", "mb", 931.48)],
        );
        let scorer = Scorer::new(FitnessMode::Value, false);
        let problem = SearchProblem::new(&domains, &[], BudgetRange::up_to(2151.99), scorer);
        assert!(problem.is_valid(&[0, 1, 2]));

        let outcome = BoundedSearch::new().search(&problem, deadline());
        assert_eq!(outcome.best.map(|(path, _)| path), Some(vec![0, 1, 2]));
    }
}
