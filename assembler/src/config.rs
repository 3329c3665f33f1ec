//! Assembler configuration
//!
//! Defaults mirror the values the system was tuned with. Every field can be
//! overridden through `ASSEMBLER_*` environment variables.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AssemblerError, AssemblerResult};

/// Which algorithm produces the "best value" build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueStrategy {
    /// Population-based stochastic search
    #[default]
    Genetic,
    /// Branch-and-bound with an optimistic score bound
    Bounded,
}

impl FromStr for ValueStrategy {
    type Err = AssemblerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "genetic" | "ga" => Ok(ValueStrategy::Genetic),
            "bounded" | "branch_and_bound" => Ok(ValueStrategy::Bounded),
            other => Err(AssemblerError::config(format!("unknown value strategy '{other}'"))),
        }
    }
}

/// Genetic search parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneticConfig {
    pub population_size: usize,
    pub generations: usize,
    pub mutation_rate: f64,
    pub elite_ratio: f64,
    pub tournament_size: usize,
    /// Fixed seed for reproducible runs; entropy-seeded when absent
    pub seed: Option<u64>,
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            generations: 10_000,
            mutation_rate: 0.1,
            elite_ratio: 0.1,
            tournament_size: 3,
            seed: None,
        }
    }
}

/// Per-step deadlines and search selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub ac3_deadline: Duration,
    pub cheapest_deadline: Duration,
    pub value_deadline: Duration,
    pub value_strategy: ValueStrategy,
    pub genetic: GeneticConfig,
    /// Scale component performance by marketplace best-seller rank
    pub rank_bonus: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            ac3_deadline: Duration::from_secs(2),
            cheapest_deadline: Duration::from_secs(5),
            value_deadline: Duration::from_secs(5),
            value_strategy: ValueStrategy::default(),
            genetic: GeneticConfig::default(),
            rank_bonus: false,
        }
    }
}

/// Polling contract for callers waiting on a published section
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PollConfig {
    pub interval: Duration,
    pub deadline: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(200),
            deadline: Duration::from_secs(30),
        }
    }
}

/// Top-level assembler configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblerConfig {
    /// Distinct category producers that must report before compatibility runs
    pub expected_producers: usize,
    pub poll: PollConfig,
    pub search: SearchConfig,
    /// PSU wattage must reach the GPU's recommendation times this margin
    pub power_margin: f64,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            expected_producers: 7,
            poll: PollConfig::default(),
            search: SearchConfig::default(),
            power_margin: 1.1,
        }
    }
}

impl AssemblerConfig {
    /// Defaults overridden by `ASSEMBLER_*` environment variables
    pub fn from_env() -> AssemblerResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each key
    pub fn from_lookup<F>(lookup: F) -> AssemblerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = parse_var::<usize>(&lookup, "ASSEMBLER_EXPECTED_PRODUCERS")? {
            config.expected_producers = value;
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "ASSEMBLER_POLL_INTERVAL_MS")? {
            config.poll.interval = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "ASSEMBLER_POLL_DEADLINE_MS")? {
            config.poll.deadline = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "ASSEMBLER_AC3_DEADLINE_MS")? {
            config.search.ac3_deadline = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "ASSEMBLER_CHEAPEST_DEADLINE_MS")? {
            config.search.cheapest_deadline = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "ASSEMBLER_VALUE_DEADLINE_MS")? {
            config.search.value_deadline = Duration::from_millis(ms);
        }
        if let Some(strategy) = parse_var::<ValueStrategy>(&lookup, "ASSEMBLER_VALUE_STRATEGY")? {
            config.search.value_strategy = strategy;
        }
        if let Some(flag) = parse_var::<bool>(&lookup, "ASSEMBLER_RANK_BONUS")? {
            config.search.rank_bonus = flag;
        }
        if let Some(value) = parse_var::<usize>(&lookup, "ASSEMBLER_POPULATION")? {
            config.search.genetic.population_size = value;
        }
        if let Some(value) = parse_var::<usize>(&lookup, "ASSEMBLER_GENERATIONS")? {
            config.search.genetic.generations = value;
        }
        if let Some(value) = parse_var::<f64>(&lookup, "ASSEMBLER_MUTATION_RATE")? {
            config.search.genetic.mutation_rate = value;
        }
        if let Some(value) = parse_var::<f64>(&lookup, "ASSEMBLER_ELITE_RATIO")? {
            config.search.genetic.elite_ratio = value;
        }
        if let Some(value) = parse_var::<usize>(&lookup, "ASSEMBLER_TOURNAMENT_SIZE")? {
            config.search.genetic.tournament_size = value;
        }
        if let Some(seed) = parse_var::<u64>(&lookup, "ASSEMBLER_SEED")? {
            config.search.genetic.seed = Some(seed);
        }
        if let Some(value) = parse_var::<f64>(&lookup, "ASSEMBLER_POWER_MARGIN")? {
            config.power_margin = value;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject values the coordinator or searches cannot work with
    pub fn validate(&self) -> AssemblerResult<()> {
        if self.expected_producers == 0 {
            return Err(AssemblerError::config("expected_producers must be at least 1"));
        }
        if self.poll.interval.is_zero() {
            return Err(AssemblerError::config("poll interval must be positive"));
        }
        if self.poll.deadline < self.poll.interval {
            return Err(AssemblerError::config(
                "poll deadline must not be shorter than the interval",
            ));
        }
        let genetic = &self.search.genetic;
        if genetic.population_size < 2 {
            return Err(AssemblerError::config("population_size must be at least 2"));
        }
        if genetic.tournament_size == 0 {
            return Err(AssemblerError::config("tournament_size must be at least 1"));
        }
        if !(0.0..=1.0).contains(&genetic.mutation_rate) {
            return Err(AssemblerError::config("mutation_rate must be within [0, 1]"));
        }
        if !(0.0..1.0).contains(&genetic.elite_ratio) {
            return Err(AssemblerError::config("elite_ratio must be within [0, 1)"));
        }
        if !(1.0..=2.0).contains(&self.power_margin) {
            return Err(AssemblerError::config("power_margin must be within [1.0, 2.0]"));
        }
        Ok(())
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> AssemblerResult<Option<T>>
where
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| AssemblerError::config(format!("{key}={raw}"))),
        None => Ok(None),
    }
}
