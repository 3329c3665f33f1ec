//! Agents that attach the producers, the checker and the optimizer to the
//! coordinator's events

pub mod compatibility_agent;
pub mod optimization_agent;
pub mod producer_agent;

#[cfg(test)]
mod tests;

pub use compatibility_agent::CompatibilityAgent;
pub use optimization_agent::OptimizationAgent;
pub use producer_agent::ProducerAgent;
