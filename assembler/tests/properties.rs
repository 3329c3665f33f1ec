//! Property checks over seeded random instances
//!
//! Each property is checked on a batch of small instances so that the
//! exhaustive reference answers stay cheap to compute.

use std::time::Duration;

use assembler::config::{GeneticConfig, SearchConfig, ValueStrategy};
use assembler::optimization::arc_consistency::{self, Ac3Status};
use assembler::optimization::strategies::{cheapest, BoundedSearch, GeneticSearch};
use assembler::optimization::{Deadline, Scorer, SearchProblem, ValueSearch};
use assembler::{CompatibilityChecker, Optimizer};
use shared::{BudgetRange, BuildRequest, FitnessMode};

mod common;
use common::{TestFixtures, TestHelpers};

const SEEDS: std::ops::Range<u64> = 0..40;

fn deadline() -> Deadline {
    Deadline::after(Duration::from_secs(5))
}

fn problem_for(seed: u64, budget: f64, fitness: FitnessMode) -> SearchProblem {
    let (domains, mut conflicts) = TestFixtures::random_instance(seed);
    let checker = CompatibilityChecker::with_default_rules(1.1).unwrap();
    conflicts.extend(checker.check(&domains));
    let scorer = Scorer::new(fitness, false);
    SearchProblem::new(&domains, &conflicts, BudgetRange::up_to(budget), scorer)
}

#[test]
fn test_arc_consistency_reaches_a_sound_fixed_point() {
    for seed in SEEDS {
        let unreduced = problem_for(seed, f64::MAX, FitnessMode::Value);
        let mut reduced = unreduced.clone();
        let outcome = arc_consistency::enforce(&mut reduced, &deadline());

        // Soundness: no conflict-free assignment loses a member
        let valid: Vec<Vec<usize>> = TestHelpers::all_assignments(&unreduced)
            .into_iter()
            .filter(|assignment| unreduced.is_valid(assignment))
            .collect();
        for assignment in &valid {
            for (slot, candidate) in assignment.iter().enumerate() {
                assert!(
                    reduced.domain(slot).contains(candidate),
                    "seed {seed} removed a supported candidate"
                );
            }
        }

        match outcome.status {
            Ac3Status::Consistent => {
                let mut again = reduced.clone();
                let rerun = arc_consistency::enforce(&mut again, &deadline());
                assert_eq!(rerun.removed, 0, "seed {seed} was not a fixed point");

                // Fixed point: every survivor has support in every other domain
                for i in 0..reduced.slot_count() {
                    for &a in reduced.domain(i) {
                        for j in (0..reduced.slot_count()).filter(|&j| j != i) {
                            assert!(
                                reduced.domain(j).iter().any(|&b| !reduced.conflicts(a, b)),
                                "seed {seed}: candidate {a} unsupported in slot {j}"
                            );
                        }
                    }
                }
            }
            Ac3Status::Wiped(_) => {
                assert!(valid.is_empty(), "seed {seed} wiped a feasible problem")
            }
            Ac3Status::TimedOut => panic!("seed {seed} timed out"),
        }
    }
}

#[test]
fn test_checker_output_is_symmetric() {
    let checker = CompatibilityChecker::with_default_rules(1.1).unwrap();
    for seed in SEEDS {
        let (domains, _) = TestFixtures::random_instance(seed);
        let conflicts = checker.check(&domains);
        assert_eq!(conflicts.len() % 2, 0);
        for pair in &conflicts {
            let mirrored = pair.reversed();
            assert!(
                conflicts.contains(&mirrored),
                "seed {seed}: {} without its mirror",
                pair.first
            );
        }
    }
}

#[test]
fn test_emitted_builds_respect_budget_and_conflicts() {
    let checker = CompatibilityChecker::with_default_rules(1.1).unwrap();
    for strategy in [ValueStrategy::Genetic, ValueStrategy::Bounded] {
        let optimizer = Optimizer::new(SearchConfig {
            value_strategy: strategy,
            genetic: GeneticConfig {
                population_size: 20,
                generations: 30,
                seed: Some(TestFixtures::GA_SEED),
                ..GeneticConfig::default()
            },
            ..SearchConfig::default()
        });

        for seed in SEEDS {
            let (domains, mut conflicts) = TestFixtures::random_instance(seed);
            conflicts.extend(checker.check(&domains));
            let budget = TestFixtures::second_cheapest_total(&domains);

            let request = BuildRequest::new(BudgetRange::up_to(budget));
            let report = optimizer.solve(&domains, &conflicts, &request);
            for build in &report.builds {
                assert_eq!(build.components.len(), domains.len());
                TestHelpers::assert_build_valid(build, &conflicts, budget);
            }
        }
    }
}

#[test]
fn test_cheapest_search_is_deterministic() {
    for seed in SEEDS {
        let problem = problem_for(seed, 1200.0, FitnessMode::Value);
        let first = cheapest::search(&problem, &deadline());
        assert_eq!(cheapest::search(&problem, &deadline()), first, "seed {seed}");
    }
}

#[test]
fn test_seeded_genetic_search_is_repeatable_and_monotonic() {
    let config = GeneticConfig {
        population_size: 16,
        generations: 40,
        seed: Some(TestFixtures::GA_SEED),
        ..GeneticConfig::default()
    };
    for seed in SEEDS {
        let problem = problem_for(seed, 1500.0, FitnessMode::Value);
        let first = GeneticSearch::new(config.clone()).search(&problem, deadline());
        let second = GeneticSearch::new(config.clone()).search(&problem, deadline());

        assert_eq!(first.best, second.best, "seed {seed}");
        assert!(first.history.windows(2).all(|w| w[1] >= w[0]), "seed {seed}");
        if let Some((assignment, _)) = &first.best {
            assert!(problem.is_valid(assignment));
        }
    }
}

#[test]
fn test_bounded_search_matches_exhaustive_search() {
    for fitness in [FitnessMode::Value, FitnessMode::Performance] {
        for seed in SEEDS {
            let problem = problem_for(seed, 1000.0, fitness);
            let outcome = BoundedSearch::new().search(&problem, deadline());

            match (outcome.best, TestHelpers::exhaustive_best(&problem)) {
                (Some((assignment, score)), Some(expected)) => {
                    assert!(problem.is_valid(&assignment));
                    assert!(
                        (score - expected).abs() < 1e-9,
                        "seed {seed} {fitness}: {score} vs {expected}"
                    );
                }
                (None, None) => {}
                (found, expected) => panic!("seed {seed} {fitness}: {found:?} vs {expected:?}"),
            }
        }
    }
}
