//! Test helpers shared by the assembler suites

use std::time::Duration;

use assembler::optimization::SearchProblem;
use assembler::{AssemblerConfig, PollConfig};
use shared::{Build, CandidateRef, ConflictPair};
use tempfile::TempDir;

pub struct TestHelpers;

impl TestHelpers {
    /// Configuration with fast polling and a short, seeded genetic search
    pub fn fast_config(expected_producers: usize) -> AssemblerConfig {
        let mut config = AssemblerConfig {
            expected_producers,
            poll: PollConfig {
                interval: Duration::from_millis(5),
                deadline: Duration::from_secs(10),
            },
            ..AssemblerConfig::default()
        };
        config.search.genetic.generations = 60;
        config.search.genetic.seed = Some(super::TestFixtures::GA_SEED);
        config
    }

    /// Every complete assignment of the problem's current domains
    pub fn all_assignments(problem: &SearchProblem) -> Vec<Vec<usize>> {
        let mut assignments = vec![Vec::new()];
        for slot in 0..problem.slot_count() {
            assignments = assignments
                .into_iter()
                .flat_map(|prefix| {
                    problem.domain(slot).iter().map(move |&candidate| {
                        let mut next = prefix.clone();
                        next.push(candidate);
                        next
                    })
                })
                .collect();
        }
        assignments
    }

    /// Best score among valid assignments, if any
    pub fn exhaustive_best(problem: &SearchProblem) -> Option<f64> {
        Self::all_assignments(problem)
            .iter()
            .filter(|assignment| problem.is_valid(assignment))
            .map(|assignment| problem.score(assignment))
            .max_by(f64::total_cmp)
    }

    /// Budget and pairwise compatibility hold for a packaged build
    pub fn assert_build_valid(build: &Build, conflicts: &[ConflictPair], budget: f64) {
        assert!(build.total_price <= budget, "{} over budget {}", build.total_price, budget);
        let refs: Vec<CandidateRef> = build.references();
        for (i, a) in refs.iter().enumerate() {
            for b in &refs[i + 1..] {
                assert!(
                    !conflicts.iter().any(|pair| pair.first == *a && pair.second == *b),
                    "{} conflicts with {}",
                    a,
                    b
                );
            }
        }
    }

    /// Write one pool file per (file name, JSON) entry
    pub fn write_pools(pools: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().expect("temp dir");
        for (file, contents) in pools {
            std::fs::write(dir.path().join(file), contents).expect("write pool file");
        }
        dir
    }
}
