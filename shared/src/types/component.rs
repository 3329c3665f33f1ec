//! Component candidates and their typed attributes

use super::Category;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Unique identifier of a candidate (typically the listing URL)
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(String);

impl CandidateId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Price in a single currency unit; missing or invalid prices are infinite
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Price(f64);

impl Price {
    pub const UNAVAILABLE: Price = Price(f64::INFINITY);

    /// Build a price from a numeric value, normalizing invalid input
    pub fn new(value: f64) -> Self {
        if value.is_finite() && value >= 0.0 {
            Self(value)
        } else {
            Self::UNAVAILABLE
        }
    }

    /// Parse listing text such as `"$1,299.99"`
    pub fn parse(raw: &str) -> Self {
        let cleaned: String = raw
            .chars()
            .filter(|c| !matches!(c, '$' | ',' | '€' | '£') && !c.is_whitespace())
            .collect();
        match cleaned.parse::<f64>() {
            Ok(value) => Self::new(value),
            Err(_) => Self::UNAVAILABLE,
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn is_available(&self) -> bool {
        self.0.is_finite()
    }
}

impl Default for Price {
    fn default() -> Self {
        Self::UNAVAILABLE
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_available() {
            write!(f, "${:.2}", self.0)
        } else {
            write!(f, "n/a")
        }
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_available() {
            serializer.serialize_some(&self.0)
        } else {
            serializer.serialize_none()
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPrice {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<RawPrice>::deserialize(deserializer)?;
        Ok(match raw {
            Some(RawPrice::Number(value)) => Price::new(value),
            Some(RawPrice::Text(text)) => Price::parse(&text),
            Some(RawPrice::Other(_)) | None => Price::UNAVAILABLE,
        })
    }
}

/// Memory module type and speed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemorySpec {
    /// Memory generation, e.g. `DDR5`
    pub kind: String,
    pub speed_mhz: Option<u32>,
}

/// Category-specific compatibility attributes
///
/// Every field is optional; which ones are meaningful depends on the category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentAttributes {
    pub brand: Option<String>,

    /// CPU and motherboard socket, e.g. `AM5`, `LGA1700`
    pub socket: Option<String>,
    /// CPU generation token, e.g. `14th Gen`, `Ryzen 7000`
    pub generation: Option<String>,
    /// Motherboard supported-CPU description
    pub supported_cpus: Option<String>,

    /// RAM module type and speed
    pub memory: Option<MemorySpec>,
    /// Motherboard supported-memory description, e.g. `DDR5 6000/5600/4800`
    pub supported_memory: Option<String>,

    /// GPU interface generation
    pub pcie_generation: Option<u8>,
    /// Generations of the motherboard's PCIe x16 slots
    pub pcie_x16_slots: Vec<u8>,

    /// GPU card length
    pub length_mm: Option<f64>,
    /// Case maximum supported GPU length
    pub max_gpu_length_mm: Option<f64>,

    /// CPU/GPU thermal design power
    pub tdp_w: Option<f64>,
    /// Cooler maximum supported TDP
    pub max_tdp_w: Option<f64>,

    /// PSU rated wattage
    pub wattage_w: Option<f64>,
    /// GPU vendor-recommended PSU wattage
    pub recommended_psu_w: Option<f64>,

    /// Marketplace best-seller rank, lower is better
    pub best_seller_rank: Option<u32>,
}

/// Benchmark scores used by the fitness function
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceMetrics {
    pub single_core: Option<f64>,
    pub multi_core: Option<f64>,
    pub graphics: Option<f64>,
}

/// One purchasable component proposed for a category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentCandidate {
    pub category: Category,
    pub id: CandidateId,
    pub name: String,
    #[serde(default)]
    pub price: Price,
    #[serde(default)]
    pub attributes: ComponentAttributes,
    #[serde(default)]
    pub metrics: PerformanceMetrics,
}

impl ComponentCandidate {
    pub fn new(
        category: Category,
        id: impl Into<String>,
        name: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            category,
            id: CandidateId::new(id),
            name: name.into(),
            price: Price::new(price),
            attributes: ComponentAttributes::default(),
            metrics: PerformanceMetrics::default(),
        }
    }

    pub fn with_attributes(mut self, attributes: ComponentAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_metrics(mut self, metrics: PerformanceMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Category plus identifier, the identity used by conflict pairs
    pub fn reference(&self) -> CandidateRef {
        CandidateRef {
            category: self.category,
            id: self.id.clone(),
        }
    }

    /// Case-insensitive brand + name key used to collapse duplicate listings
    pub fn model_key(&self) -> String {
        let brand = self.attributes.brand.as_deref().unwrap_or_default();
        format!("{} {}", brand, self.name).trim().to_lowercase()
    }
}

/// (category, candidate identity) tuple
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CandidateRef {
    pub category: Category,
    pub id: CandidateId,
}

impl fmt::Display for CandidateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.category, self.id)
    }
}

/// Currently-eligible candidates per category
pub type Domains = BTreeMap<Category, Vec<ComponentCandidate>>;
