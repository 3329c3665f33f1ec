//! Turns completed assignments into labeled build records

use std::collections::BTreeMap;
use std::fmt::Write;

use shared::{Build, BuildLabel, Category, ComponentCandidate, ConflictPair, Severity};

pub struct BuildPackager;

impl BuildPackager {
    /// Package an assignment, deriving the total price from its components
    pub fn package(
        label: BuildLabel,
        components: BTreeMap<Category, ComponentCandidate>,
        score: f64,
    ) -> Build {
        let total_price = components.values().map(|c| c.price.value()).sum();
        Build {
            label,
            components,
            total_price,
            score,
        }
    }

    /// Plain-text summary of a cycle's outcome
    pub fn summarize(builds: &[Build], conflicts: &[ConflictPair]) -> String {
        let mut out = String::new();
        if builds.is_empty() {
            out.push_str("No build satisfies the budget and compatibility constraints.\n");
        }

        for build in builds {
            let _ = writeln!(
                out,
                "{} build: ${:.2} (score {:.4})",
                capitalize(&build.label.to_string()),
                build.total_price,
                build.score
            );
            for (category, component) in &build.components {
                let _ = writeln!(
                    out,
                    "  {:<12} {} (${:.2})",
                    category.to_string(),
                    component.name,
                    component.price.value()
                );
            }
        }

        let critical: Vec<&ConflictPair> = conflicts
            .iter()
            .filter(|c| c.severity == Severity::Critical && c.first < c.second)
            .collect();
        if !critical.is_empty() {
            let count = critical.len();
            let _ = writeln!(out, "{count} critical incompatibilities among candidates:");
            for conflict in critical.iter().take(10) {
                let (first, second) = (&conflict.first, &conflict.second);
                let _ = writeln!(out, "  {first} x {second}: {}", conflict.reason);
            }
        }
        out
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
