//! Cheapest feasible build by ordered depth-first backtracking
//!
//! Categories are visited in their fixed order and each domain is tried by
//! ascending price (ties by id). The first complete valid assignment wins.
//! That is not a global minimum, but it is deterministic for equal inputs.

use super::super::types::{Deadline, SearchProblem};

/// Deadline checks happen every this many visited nodes
const DEADLINE_STRIDE: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub enum CheapestOutcome {
    Found(Vec<usize>),
    /// No assignment satisfies the budget and conflicts
    Exhausted,
    TimedOut,
}

struct Walk<'a> {
    problem: &'a SearchProblem,
    sorted: Vec<Vec<usize>>,
    /// Sum of the cheapest prices from each slot to the end
    cheapest_rest: Vec<f64>,
    deadline: &'a Deadline,
    visited: usize,
}

pub fn search(problem: &SearchProblem, deadline: &Deadline) -> CheapestOutcome {
    let slots = problem.slot_count();
    let sorted: Vec<Vec<usize>> = (0..slots)
        .map(|slot| {
            let mut domain = problem.domain(slot).to_vec();
            domain.sort_by(|&a, &b| {
                problem
                    .price(a)
                    .total_cmp(&problem.price(b))
                    .then_with(|| problem.candidate(a).id.cmp(&problem.candidate(b).id))
            });
            domain
        })
        .collect();

    let mut cheapest_rest = vec![0.0; slots + 1];
    for slot in (0..slots).rev() {
        let cheapest = sorted[slot].first().map(|&i| problem.price(i)).unwrap_or(f64::INFINITY);
        cheapest_rest[slot] = cheapest_rest[slot + 1] + cheapest;
    }

    let mut walk = Walk {
        problem,
        sorted,
        cheapest_rest,
        deadline,
        visited: 0,
    };

    match walk.descend(Vec::with_capacity(slots), 0.0) {
        Ok(Some(path)) => CheapestOutcome::Found(path),
        Ok(None) => CheapestOutcome::Exhausted,
        Err(TimedOut) => CheapestOutcome::TimedOut,
    }
}

struct TimedOut;

impl Walk<'_> {
    fn descend(&mut self, path: Vec<usize>, total: f64) -> Result<Option<Vec<usize>>, TimedOut> {
        let depth = path.len();
        if depth == self.problem.slot_count() {
            return Ok(self.problem.is_valid(&path).then_some(path));
        }

        for position in 0..self.sorted[depth].len() {
            self.visited += 1;
            if self.visited % DEADLINE_STRIDE == 0 && self.deadline.expired() {
                return Err(TimedOut);
            }

            let candidate = self.sorted[depth][position];
            let running = total + self.problem.price(candidate);
            // Prices ascend, so no later candidate in this slot can fit either
            if !self.problem.may_fit(running + self.cheapest_rest[depth + 1]) {
                break;
            }
            if self.problem.clashes_with(&path, candidate) {
                continue;
            }

            let mut next = path.clone();
            next.push(candidate);
            if let Some(found) = self.descend(next, running)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::types::Scorer;
    use shared::{
        BudgetRange, Category, ComponentCandidate, ConflictPair, Domains, FitnessMode, Severity,
    };
    use std::time::Duration;

    fn domains() -> Domains {
        let mut domains = Domains::new();
        domains.insert(
            Category::Cpu,
            vec![
                ComponentCandidate::new(Category::Cpu, "cpu-200", "cpu-200", 200.0),
                ComponentCandidate::new(Category::Cpu, "cpu-100", "cpu-100", 100.0),
            ],
        );
        domains.insert(
            Category::Motherboard,
            vec![
                ComponentCandidate::new(Category::Motherboard, "mb-50", "mb-50", 50.0),
                ComponentCandidate::new(Category::Motherboard, "mb-90", "mb-90", 90.0),
            ],
        );
        domains
    }

    fn ids(problem: &SearchProblem, path: &[usize]) -> Vec<String> {
        path.iter().map(|&i| problem.candidate(i).id.as_str().to_string()).collect()
    }

    fn build_problem(conflicts: &[ConflictPair], budget: f64) -> SearchProblem {
        let scorer = Scorer::new(FitnessMode::Value, false);
        SearchProblem::new(&domains(), conflicts, BudgetRange::up_to(budget), scorer)
    }

    fn deadline() -> Deadline {
        Deadline::after(Duration::from_secs(5))
    }

    #[test]
    fn test_picks_cheapest_per_category_when_compatible() {
        let problem = build_problem(&[], 1000.0);
        let CheapestOutcome::Found(path) = search(&problem, &deadline()) else {
            panic!("expected a build");
        };
        assert_eq!(ids(&problem, &path), vec!["cpu-100", "mb-50"]);
    }

    #[test]
    fn test_backtracks_past_conflicts() {
        let d = domains();
        let conflict = ConflictPair::new(
            d[&Category::Cpu][1].reference(),
            d[&Category::Motherboard][0].reference(),
            "socket",
            Severity::Critical,
        );
        let problem = build_problem(&[conflict], 1000.0);
        let CheapestOutcome::Found(path) = search(&problem, &deadline()) else {
            panic!("expected a build");
        };
        assert_eq!(ids(&problem, &path), vec!["cpu-100", "mb-90"]);
    }

    #[test]
    fn test_budget_too_small_is_exhausted() {
        let problem = build_problem(&[], 140.0);
        assert_eq!(search(&problem, &deadline()), CheapestOutcome::Exhausted);
    }

    #[test]
    fn test_same_input_same_output() {
        let problem = build_problem(&[], 1000.0);
        let first = search(&problem, &deadline());
        for _ in 0..5 {
            assert_eq!(search(&problem, &deadline()), first);
        }
    }

    #[test]
    fn test_build_costing_exactly_the_budget_is_found() {
        let mut domains = Domains::new();
        for (category, price) in [
            (Category::Cpu, 491.19),
            (Category::Gpu, 729.32),
            (Category::Motherboard, 931.48),
        ] {
            let key = category.key();
            let candidate = ComponentCandidate::new(category, key, key, price);
            domains.insert(category, vec![candidate]);
        }
        let scorer = Scorer::new(FitnessMode::Value, false);
        let problem = SearchProblem::new(&domains, &[], BudgetRange::up_to(2151.99), scorer);
        assert!(problem.is_valid(&[0, 1, 2]));

        assert_eq!(search(&problem, &deadline()), CheapestOutcome::Found(vec![0, 1, 2]));
    }
}
