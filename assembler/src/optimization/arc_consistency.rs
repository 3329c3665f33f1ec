//! AC-3 domain reduction
//!
//! Categories are the variables and the conflict relation is the binary
//! constraint between them. Domains only ever shrink.

use std::collections::{HashSet, VecDeque};

use serde::Serialize;
use shared::Category;

use super::types::{Deadline, SearchProblem};

/// How AC-3 finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "category")]
pub enum Ac3Status {
    /// Worklist drained; domains are a fixed point
    Consistent,
    /// A domain emptied; the problem is infeasible
    Wiped(Category),
    /// Deadline hit; domains are reduced but may not be a fixed point
    TimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Ac3Outcome {
    pub status: Ac3Status,
    pub removed: usize,
    pub revisions: usize,
}

/// Enforce arc consistency on the problem's domains in place
pub fn enforce(problem: &mut SearchProblem, deadline: &Deadline) -> Ac3Outcome {
    let slots = problem.slot_count();
    let mut outcome = Ac3Outcome {
        status: Ac3Status::Consistent,
        removed: 0,
        revisions: 0,
    };

    if let Some(category) = problem.empty_category() {
        outcome.status = Ac3Status::Wiped(category);
        return outcome;
    }

    let mut queue: VecDeque<(usize, usize)> = VecDeque::new();
    let mut queued: HashSet<(usize, usize)> = HashSet::new();
    for i in 0..slots {
        for j in 0..slots {
            if i != j {
                queue.push_back((i, j));
                queued.insert((i, j));
            }
        }
    }

    while let Some((i, j)) = queue.pop_front() {
        queued.remove(&(i, j));
        if deadline.expired() {
            outcome.status = Ac3Status::TimedOut;
            return outcome;
        }

        outcome.revisions += 1;
        let removed = revise(problem, i, j);
        if removed == 0 {
            continue;
        }
        outcome.removed += removed;

        if problem.domain(i).is_empty() {
            outcome.status = Ac3Status::Wiped(problem.categories()[i]);
            return outcome;
        }

        for k in 0..slots {
            if k != i && k != j && queued.insert((k, i)) {
                queue.push_back((k, i));
            }
        }
    }

    outcome
}

/// Drop candidates of slot `i` with no conflict-free partner in slot `j`
fn revise(problem: &mut SearchProblem, i: usize, j: usize) -> usize {
    let partners = problem.domain(j).to_vec();
    let supported: Vec<usize> = problem
        .domain(i)
        .iter()
        .copied()
        .filter(|&a| partners.iter().any(|&b| !problem.conflicts(a, b)))
        .collect();

    let removed = problem.domain(i).len() - supported.len();
    if removed > 0 {
        *problem.domain_mut(i) = supported;
    }
    removed
}
