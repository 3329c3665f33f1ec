//! Population-based best-value search
//!
//! Individuals are full assignments (one candidate index per slot). Each
//! generation keeps the elites and fills the rest with tournament-selected
//! parents, per-slot crossover and per-slot resampling mutation.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use shared::{agent_debug, AgentId};

use super::super::traits::ValueSearch;
use super::super::types::{Deadline, SearchProblem, ValueOutcome};
use crate::config::GeneticConfig;

pub struct GeneticSearch {
    config: GeneticConfig,
}

impl GeneticSearch {
    pub fn new(config: GeneticConfig) -> Self {
        Self { config }
    }

    fn rng(&self) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    fn random_individual(problem: &SearchProblem, rng: &mut StdRng) -> Option<Vec<usize>> {
        (0..problem.slot_count())
            .map(|slot| problem.domain(slot).choose(rng).copied())
            .collect()
    }

    /// Random valid individuals, giving up after ten attempts per population member
    fn initial_population(&self, problem: &SearchProblem, rng: &mut StdRng) -> Vec<Vec<usize>> {
        let size = self.config.population_size;
        let mut population = Vec::with_capacity(size);
        let mut attempts = 0;
        while population.len() < size && attempts < size * 10 {
            attempts += 1;
            if let Some(individual) = Self::random_individual(problem, rng) {
                if problem.is_valid(&individual) {
                    population.push(individual);
                }
            }
        }
        population
    }

    fn tournament<'a>(&self, scored: &'a [(Vec<usize>, f64)], rng: &mut StdRng) -> &'a [usize] {
        let k = self.config.tournament_size.clamp(1, scored.len());
        scored
            .choose_multiple(rng, k)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(individual, _)| individual.as_slice())
            .unwrap_or(scored[0].0.as_slice())
    }

    fn offspring(
        &self,
        problem: &SearchProblem,
        first: &[usize],
        second: &[usize],
        rng: &mut StdRng,
    ) -> Vec<usize> {
        first
            .iter()
            .zip(second)
            .enumerate()
            .map(|(slot, (&a, &b))| {
                let gene = if rng.gen_bool(0.5) { a } else { b };
                if rng.gen_bool(self.config.mutation_rate) {
                    problem.domain(slot).choose(rng).copied().unwrap_or(gene)
                } else {
                    gene
                }
            })
            .collect()
    }
}

impl ValueSearch for GeneticSearch {
    fn name(&self) -> &'static str {
        "genetic"
    }

    fn search(&self, problem: &SearchProblem, deadline: Deadline) -> ValueOutcome {
        let mut outcome = ValueOutcome::default();
        if problem.slot_count() == 0 {
            return outcome;
        }

        let mut rng = self.rng();
        let mut population = self.initial_population(problem, &mut rng);
        agent_debug!(
            AgentId::Optimizer,
            "Initial population: {}/{} valid individuals",
            population.len(),
            self.config.population_size
        );

        let size = self.config.population_size;
        let elite_count = ((self.config.elite_ratio * size as f64) as usize).max(1);

        for _ in 0..self.config.generations {
            if deadline.expired() {
                outcome.timed_out = true;
                break;
            }

            let mut scored: Vec<(Vec<usize>, f64)> = population
                .into_iter()
                .filter(|individual| problem.is_valid(individual))
                .map(|individual| {
                    let score = problem.score(&individual);
                    (individual, score)
                })
                .collect();
            if scored.is_empty() {
                break;
            }
            scored.sort_by(|a, b| b.1.total_cmp(&a.1));
            outcome.iterations += 1;

            let (leader, leader_score) = &scored[0];
            let improved = outcome.best.as_ref().map_or(true, |(_, best)| leader_score > best);
            if improved {
                outcome.best = Some((leader.clone(), *leader_score));
            }
            if let Some((_, best)) = &outcome.best {
                outcome.history.push(*best);
            }

            let mut next: Vec<Vec<usize>> = scored
                .iter()
                .take(elite_count)
                .map(|(individual, _)| individual.clone())
                .collect();
            while next.len() < size {
                let first = self.tournament(&scored, &mut rng);
                let second = self.tournament(&scored, &mut rng);
                next.push(self.offspring(problem, first, second, &mut rng));
            }
            population = next;
        }

        outcome
    }
}
