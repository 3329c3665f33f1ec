//! Main entry point for the assembler binary
//!
//! Loads candidate pools from a directory, runs one build request through
//! the assembler and prints the outcome as JSON.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;

use assembler::{Assembler, AssemblerConfig, ValueStrategy};
use producer::{CandidateSource, JsonPoolSource, ProducerSettings};
use shared::{agent_debug, logging, AgentId, BudgetRange, BuildRequest, FitnessMode};

/// Assembles compatible PC builds within a budget from per-category candidate pools
#[derive(Parser)]
#[command(name = "assembler")]
#[command(about = "Assembles the cheapest and best-value PC builds from candidate pools")]
pub struct Args {
    /// Directory holding one <category>.json pool per category
    #[arg(long, default_value = "pools")]
    pub pools: PathBuf,

    /// JSON file with the build request (overrides the budget flags)
    #[arg(long)]
    pub request: Option<PathBuf>,

    /// Budget ceiling
    #[arg(long)]
    pub budget_max: Option<f64>,

    /// Budget floor
    #[arg(long, default_value = "0")]
    pub budget_min: f64,

    /// Fitness mode (value, performance)
    #[arg(long)]
    pub fitness: Option<FitnessMode>,

    /// Best-value search (genetic, bounded)
    #[arg(long)]
    pub value_strategy: Option<ValueStrategy>,

    /// Seed for the genetic search
    #[arg(long)]
    pub seed: Option<u64>,

    /// Deadline for each search step in milliseconds
    #[arg(long)]
    pub search_deadline_ms: Option<u64>,

    /// Write the outcome here instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

async fn load_request(args: &Args) -> anyhow::Result<BuildRequest> {
    let mut request = match (&args.request, args.budget_max) {
        (Some(path), _) => {
            let contents = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading request {}", path.display()))?;
            serde_json::from_str::<BuildRequest>(&contents)
                .with_context(|| format!("parsing request {}", path.display()))?
        }
        (None, Some(max)) => BuildRequest::new(BudgetRange::new(args.budget_min, max)?),
        (None, None) => bail!("either --request or --budget-max is required"),
    };
    if let Some(fitness) = args.fitness {
        request.fitness = fitness;
    }
    Ok(request)
}

fn apply_overrides(config: &mut AssemblerConfig, args: &Args) {
    if let Some(strategy) = args.value_strategy {
        config.search.value_strategy = strategy;
    }
    if let Some(seed) = args.seed {
        config.search.genetic.seed = Some(seed);
    }
    if let Some(ms) = args.search_deadline_ms {
        config.search.cheapest_deadline = Duration::from_millis(ms);
        config.search.value_deadline = Duration::from_millis(ms);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    logging::init_tracing_with_level(Some(&args.log_level));

    if let Err(e) = run(&args).await {
        logging::log_error(&AgentId::Coordinator, "assembly", &e);
        return Err(e);
    }
    logging::log_shutdown(&AgentId::Coordinator, "request complete");
    Ok(())
}

async fn run(args: &Args) -> anyhow::Result<()> {
    let mut config = AssemblerConfig::from_env().context("loading configuration")?;
    apply_overrides(&mut config, args);

    let source = JsonPoolSource::discover(&args.pools)
        .await
        .with_context(|| format!("scanning pools in {}", args.pools.display()))?;
    let categories = source.categories();
    if categories.is_empty() {
        bail!("no category pools found in {}", args.pools.display());
    }
    config.expected_producers = categories.len();
    agent_debug!(
        AgentId::Coordinator,
        "Pools found in {} for {:?}",
        source.dir().display(),
        categories
    );

    let request = load_request(args).await?;
    let assembler = Assembler::new(config, Arc::new(source), ProducerSettings::default()).await?;
    let outcome = assembler.run_request(request).await?;

    let json = serde_json::to_string_pretty(&outcome)?;
    match &args.output {
        Some(path) => tokio::fs::write(path, json)
            .await
            .with_context(|| format!("writing {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}
