//! Built-in pairwise compatibility rules
//!
//! Only the socket rule fails closed. Every other rule treats missing data as
//! compatible.

use regex::Regex;
use shared::{Category, ComponentCandidate, Severity};

use crate::error::{AssemblerError, AssemblerResult};
use crate::traits::CompatibilityRule;

/// Lowercased socket name without "socket" prefixes and separators
fn normalize_socket(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let stripped = lowered.strip_prefix("socket").unwrap_or(&lowered);
    stripped
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .collect()
}

/// CPU socket must match the motherboard socket
#[derive(Debug, Default)]
pub struct SocketRule;

impl CompatibilityRule for SocketRule {
    fn name(&self) -> &'static str {
        "socket"
    }

    fn categories(&self) -> (Category, Category) {
        (Category::Cpu, Category::Motherboard)
    }

    fn severity(&self) -> Severity {
        Severity::Critical
    }

    fn check(&self, cpu: &ComponentCandidate, board: &ComponentCandidate) -> Option<String> {
        match (&cpu.attributes.socket, &board.attributes.socket) {
            (Some(cpu_socket), Some(board_socket)) => {
                if normalize_socket(cpu_socket) == normalize_socket(board_socket) {
                    None
                } else {
                    Some(format!(
                        "CPU socket {cpu_socket} does not fit motherboard socket {board_socket}"
                    ))
                }
            }
            (None, _) => Some("CPU socket unknown".to_string()),
            (_, None) => Some("motherboard socket unknown".to_string()),
        }
    }
}

/// CPU generation must be named in the motherboard's supported CPU list
#[derive(Debug, Default)]
pub struct ChipsetRule;

impl CompatibilityRule for ChipsetRule {
    fn name(&self) -> &'static str {
        "chipset"
    }

    fn categories(&self) -> (Category, Category) {
        (Category::Cpu, Category::Motherboard)
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, cpu: &ComponentCandidate, board: &ComponentCandidate) -> Option<String> {
        let generation = cpu.attributes.generation.as_deref()?.trim();
        let supported = board.attributes.supported_cpus.as_deref()?;
        if generation.is_empty() || supported.to_lowercase().contains(&generation.to_lowercase()) {
            None
        } else {
            Some(format!("motherboard does not list CPU generation {generation}"))
        }
    }
}

/// RAM type and speed must appear in the motherboard's supported memory
#[derive(Debug)]
pub struct MemoryRule {
    speeds: Regex,
}

impl MemoryRule {
    pub fn new() -> AssemblerResult<Self> {
        let speeds = Regex::new(r"\b(\d{4,5})\b")
            .map_err(|e| AssemblerError::config(format!("memory speed pattern: {e}")))?;
        Ok(Self { speeds })
    }

    fn listed_speeds(&self, description: &str) -> Vec<u32> {
        self.speeds
            .captures_iter(description)
            .filter_map(|caps| caps.get(1))
            .filter_map(|m| m.as_str().parse().ok())
            .collect()
    }
}

impl CompatibilityRule for MemoryRule {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn categories(&self) -> (Category, Category) {
        (Category::Ram, Category::Motherboard)
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, ram: &ComponentCandidate, board: &ComponentCandidate) -> Option<String> {
        let memory = ram.attributes.memory.as_ref()?;
        let supported = board.attributes.supported_memory.as_deref()?;

        let kind = memory.kind.trim();
        if !kind.is_empty() && !supported.to_lowercase().contains(&kind.to_lowercase()) {
            return Some(format!("motherboard does not support {kind} memory"));
        }

        let speed = memory.speed_mhz?;
        let listed = self.listed_speeds(supported);
        if listed.is_empty() || listed.contains(&speed) {
            None
        } else {
            Some(format!("motherboard does not list {kind} speed {speed} MHz"))
        }
    }
}

/// GPU needs an x16 slot of at least its PCIe generation
#[derive(Debug, Default)]
pub struct PcieSlotRule;

impl CompatibilityRule for PcieSlotRule {
    fn name(&self) -> &'static str {
        "pcie_slot"
    }

    fn categories(&self) -> (Category, Category) {
        (Category::Gpu, Category::Motherboard)
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, gpu: &ComponentCandidate, board: &ComponentCandidate) -> Option<String> {
        let generation = gpu.attributes.pcie_generation?;
        let slots = &board.attributes.pcie_x16_slots;
        if slots.is_empty() || slots.iter().any(|slot| *slot >= generation) {
            None
        } else {
            Some(format!("no PCIe {generation}.0 x16 slot for the GPU"))
        }
    }
}

/// GPU must fit inside the case
#[derive(Debug, Default)]
pub struct PhysicalFitRule;

impl CompatibilityRule for PhysicalFitRule {
    fn name(&self) -> &'static str {
        "physical_fit"
    }

    fn categories(&self) -> (Category, Category) {
        (Category::Gpu, Category::Case)
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, gpu: &ComponentCandidate, case: &ComponentCandidate) -> Option<String> {
        let length = gpu.attributes.length_mm?;
        let max_length = case.attributes.max_gpu_length_mm?;
        if length <= max_length {
            None
        } else {
            Some(format!("GPU length {length} mm exceeds case limit {max_length} mm"))
        }
    }
}

/// Cooler must handle the CPU's TDP
#[derive(Debug, Default)]
pub struct ThermalRule;

impl CompatibilityRule for ThermalRule {
    fn name(&self) -> &'static str {
        "thermal"
    }

    fn categories(&self) -> (Category, Category) {
        (Category::Cpu, Category::Cooler)
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, cpu: &ComponentCandidate, cooler: &ComponentCandidate) -> Option<String> {
        let tdp = cpu.attributes.tdp_w?;
        let capacity = cooler.attributes.max_tdp_w?;
        if capacity >= tdp {
            None
        } else {
            Some(format!("cooler rated {capacity} W below CPU TDP {tdp} W"))
        }
    }
}

/// PSU wattage must cover the GPU's recommendation with a safety margin
#[derive(Debug)]
pub struct PowerRule {
    margin: f64,
}

impl PowerRule {
    pub fn new(margin: f64) -> Self {
        Self { margin }
    }
}

impl CompatibilityRule for PowerRule {
    fn name(&self) -> &'static str {
        "power"
    }

    fn categories(&self) -> (Category, Category) {
        (Category::Gpu, Category::Psu)
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, gpu: &ComponentCandidate, psu: &ComponentCandidate) -> Option<String> {
        let recommended = gpu.attributes.recommended_psu_w?;
        let wattage = psu.attributes.wattage_w?;
        let required = recommended * self.margin;
        if wattage >= required {
            None
        } else {
            Some(format!("PSU {wattage} W below required {required:.0} W"))
        }
    }
}
