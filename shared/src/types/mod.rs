//! Core types used throughout the build assembly system

pub mod build;
pub mod component;

pub use build::*;
pub use component::*;

use crate::errors::{SharedError, SharedResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Hardware category a candidate belongs to
///
/// Declaration order is the fixed category order used by the searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "CPU")]
    Cpu,
    #[serde(rename = "GPU")]
    Gpu,
    Motherboard,
    #[serde(rename = "RAM")]
    Ram,
    Storage,
    #[serde(rename = "PSU")]
    Psu,
    Case,
    Cooler,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Cpu,
        Category::Gpu,
        Category::Motherboard,
        Category::Ram,
        Category::Storage,
        Category::Psu,
        Category::Case,
        Category::Cooler,
    ];

    /// Lowercase key used for file names and agent ids
    pub fn key(&self) -> &'static str {
        match self {
            Category::Cpu => "cpu",
            Category::Gpu => "gpu",
            Category::Motherboard => "motherboard",
            Category::Ram => "ram",
            Category::Storage => "storage",
            Category::Psu => "psu",
            Category::Case => "case",
            Category::Cooler => "cooler",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Cpu => write!(f, "CPU"),
            Category::Gpu => write!(f, "GPU"),
            Category::Motherboard => write!(f, "Motherboard"),
            Category::Ram => write!(f, "RAM"),
            Category::Storage => write!(f, "Storage"),
            Category::Psu => write!(f, "PSU"),
            Category::Case => write!(f, "Case"),
            Category::Cooler => write!(f, "Cooler"),
        }
    }
}

impl std::str::FromStr for Category {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cpu" | "processor" => Ok(Category::Cpu),
            "gpu" | "graphics" => Ok(Category::Gpu),
            "motherboard" | "mb" => Ok(Category::Motherboard),
            "ram" | "memory" => Ok(Category::Ram),
            "storage" | "ssd" | "hdd" => Ok(Category::Storage),
            "psu" | "power_supply" => Ok(Category::Psu),
            "case" => Ok(Category::Case),
            "cooler" | "cpu_cooler" => Ok(Category::Cooler),
            _ => Err(SharedError::UnknownCategory { input: s.to_string() }),
        }
    }
}

/// Identifier for any agent that reads or writes coordinator state
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgentId {
    /// Candidate producer responsible for one category
    Producer(Category),
    /// The coordinator itself (resets, dispatch bookkeeping)
    Coordinator,
    /// Compatibility checker agent
    Compatibility,
    /// Optimizer agent
    Optimizer,
    /// Whoever submitted the request (CLI, embedding application)
    User,
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentId::Producer(category) => write!(f, "producer_{}", category.key()),
            AgentId::Coordinator => write!(f, "coordinator"),
            AgentId::Compatibility => write!(f, "compatibility"),
            AgentId::Optimizer => write!(f, "optimizer"),
            AgentId::User => write!(f, "user"),
        }
    }
}

/// Unique identifier for one coordinator cycle (one user request)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CycleId(Uuid);

impl CycleId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CycleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the value search ranks complete builds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessMode {
    /// Performance divided by total price
    #[default]
    Value,
    /// Raw performance sum
    Performance,
}

impl fmt::Display for FitnessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitnessMode::Value => write!(f, "value"),
            FitnessMode::Performance => write!(f, "performance"),
        }
    }
}

impl std::str::FromStr for FitnessMode {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "value" | "quality_price" => Ok(FitnessMode::Value),
            "performance" => Ok(FitnessMode::Performance),
            _ => Err(SharedError::UnknownFitnessMode { input: s.to_string() }),
        }
    }
}

/// Budget ceiling for a build request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetRange {
    #[serde(default)]
    pub min: f64,
    pub max: f64,
}

impl BudgetRange {
    pub fn new(min: f64, max: f64) -> SharedResult<Self> {
        if min > max {
            return Err(SharedError::InvalidBudget { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn up_to(max: f64) -> Self {
        Self { min: 0.0, max }
    }

    pub fn allows(&self, total: f64) -> bool {
        total <= self.max
    }
}

/// Structured requirements for one request, resolved once at the input boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildRequest {
    pub budget: BudgetRange,

    #[serde(default)]
    pub fitness: FitnessMode,

    /// Free-form description of the use case, kept for the response summary
    #[serde(default)]
    pub description: Option<String>,
}

impl BuildRequest {
    pub fn new(budget: BudgetRange) -> Self {
        Self {
            budget,
            fitness: FitnessMode::default(),
            description: None,
        }
    }

    pub fn with_fitness(mut self, fitness: FitnessMode) -> Self {
        self.fitness = fitness;
        self
    }
}
