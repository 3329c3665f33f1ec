//! Pairwise compatibility checking over consolidated domains

pub mod rules;

use std::collections::BTreeMap;

use shared::{agent_debug, AgentId, CandidateRef, ConflictPair, Domains, Severity};

use crate::error::AssemblerResult;
use crate::traits::CompatibilityRule;

pub use rules::{
    ChipsetRule, MemoryRule, PcieSlotRule, PhysicalFitRule, PowerRule, SocketRule, ThermalRule,
};

/// Runs every registered rule over every candidate pair of its categories
pub struct CompatibilityChecker {
    rules: Vec<Box<dyn CompatibilityRule>>,
}

impl CompatibilityChecker {
    pub fn new(rules: Vec<Box<dyn CompatibilityRule>>) -> Self {
        Self { rules }
    }

    /// Checker with the built-in socket, chipset, memory, slot, fit, thermal
    /// and power rules
    pub fn with_default_rules(power_margin: f64) -> AssemblerResult<Self> {
        Ok(Self::new(vec![
            Box::new(SocketRule),
            Box::new(ChipsetRule),
            Box::new(MemoryRule::new()?),
            Box::new(PcieSlotRule),
            Box::new(PhysicalFitRule),
            Box::new(ThermalRule),
            Box::new(PowerRule::new(power_margin)),
        ]))
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Conflicts between candidates of the given domains
    ///
    /// Reasons from several rules on the same pair are merged and the pair
    /// takes the highest severity. Every conflict is emitted in both
    /// orientations, sorted by (first, second).
    pub fn check(&self, domains: &Domains) -> Vec<ConflictPair> {
        let mut found: BTreeMap<(CandidateRef, CandidateRef), (Vec<String>, Severity)> =
            BTreeMap::new();

        for rule in &self.rules {
            let (first_category, second_category) = rule.categories();
            if first_category == second_category {
                continue;
            }
            let (Some(firsts), Some(seconds)) =
                (domains.get(&first_category), domains.get(&second_category))
            else {
                continue;
            };

            let mut hits = 0usize;
            for first in firsts {
                for second in seconds {
                    let Some(reason) = rule.check(first, second) else {
                        continue;
                    };
                    hits += 1;
                    let entry = found
                        .entry((first.reference(), second.reference()))
                        .or_insert_with(|| (Vec::new(), Severity::Warning));
                    entry.0.push(reason);
                    entry.1 = entry.1.max(rule.severity());
                }
            }
            agent_debug!(
                AgentId::Compatibility,
                "Rule {} flagged {} of {} {}/{} pairs",
                rule.name(),
                hits,
                firsts.len() * seconds.len(),
                first_category,
                second_category
            );
        }

        let mut conflicts: Vec<ConflictPair> = found
            .into_iter()
            .flat_map(|((first, second), (reasons, severity))| {
                let pair = ConflictPair::new(first, second, reasons.join("; "), severity);
                let reversed = pair.reversed();
                [pair, reversed]
            })
            .collect();
        conflicts.sort_by(|a, b| (&a.first, &a.second).cmp(&(&b.first, &b.second)));
        conflicts.dedup_by(|a, b| a.first == b.first && a.second == b.second);
        conflicts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MockCompatibilityRule;
    use shared::{Category, ComponentAttributes, ComponentCandidate};
    use std::collections::HashSet;

    fn candidate(
        category: Category,
        id: &str,
        attributes: ComponentAttributes,
    ) -> ComponentCandidate {
        ComponentCandidate::new(category, id, id, 100.0).with_attributes(attributes)
    }

    fn socket(value: &str) -> ComponentAttributes {
        ComponentAttributes {
            socket: Some(value.to_string()),
            ..Default::default()
        }
    }

    fn sample_domains() -> Domains {
        let mut domains = Domains::new();
        domains.insert(
            Category::Cpu,
            vec![
                candidate(Category::Cpu, "am5-cpu", socket("AM5")),
                candidate(Category::Cpu, "intel-cpu", socket("LGA1700")),
            ],
        );
        domains.insert(
            Category::Motherboard,
            vec![
                candidate(Category::Motherboard, "am5-board", socket("AM5")),
                candidate(Category::Motherboard, "mystery-board", ComponentAttributes::default()),
            ],
        );
        domains
    }

    #[test]
    fn test_conflicts_are_symmetric() {
        let checker = CompatibilityChecker::with_default_rules(1.1).unwrap();
        let conflicts = checker.check(&sample_domains());

        let set: HashSet<(CandidateRef, CandidateRef)> =
            conflicts.iter().map(|c| (c.first.clone(), c.second.clone())).collect();
        for conflict in &conflicts {
            assert!(set.contains(&(conflict.second.clone(), conflict.first.clone())));
        }
        // intel-cpu/am5-board, plus both CPUs against the board with no socket data
        assert_eq!(conflicts.len(), 6);
        assert!(conflicts.iter().all(|c| c.severity == Severity::Critical));
    }

    #[test]
    fn test_reasons_merge_and_take_highest_severity() {
        let mut warning = MockCompatibilityRule::new();
        warning.expect_name().return_const("warning");
        warning.expect_categories().return_const((Category::Cpu, Category::Motherboard));
        warning.expect_severity().return_const(Severity::Warning);
        warning.expect_check().returning(|_, _| Some("too warm".to_string()));

        let mut critical = MockCompatibilityRule::new();
        critical.expect_name().return_const("critical");
        critical.expect_categories().return_const((Category::Cpu, Category::Motherboard));
        critical.expect_severity().return_const(Severity::Critical);
        critical.expect_check().returning(|_, _| Some("wrong socket".to_string()));

        let checker = CompatibilityChecker::new(vec![Box::new(warning), Box::new(critical)]);
        let mut domains = Domains::new();
        for (category, id) in [(Category::Cpu, "c"), (Category::Motherboard, "m")] {
            domains.insert(category, vec![candidate(category, id, Default::default())]);
        }

        let conflicts = checker.check(&domains);
        assert_eq!(conflicts.len(), 2);
        assert_eq!(conflicts[0].reason, "too warm; wrong socket");
        assert_eq!(conflicts[0].severity, Severity::Critical);
    }

    #[test]
    fn test_warning_rules_keep_warning_severity() {
        let checker = CompatibilityChecker::with_default_rules(1.1).unwrap();
        let mut domains = Domains::new();
        domains.insert(
            Category::Cpu,
            vec![candidate(
                Category::Cpu,
                "old-cpu",
                ComponentAttributes {
                    socket: Some("AM5".into()),
                    generation: Some("Ryzen 5000".into()),
                    tdp_w: Some(170.0),
                    ..Default::default()
                },
            )],
        );
        domains.insert(
            Category::Motherboard,
            vec![candidate(
                Category::Motherboard,
                "new-board",
                ComponentAttributes {
                    socket: Some("AM5".into()),
                    supported_cpus: Some("Ryzen 7000".into()),
                    ..Default::default()
                },
            )],
        );
        let cooler = |id, capacity| {
            let attributes = ComponentAttributes {
                max_tdp_w: Some(capacity),
                ..Default::default()
            };
            candidate(Category::Cooler, id, attributes)
        };
        domains.insert(
            Category::Cooler,
            vec![cooler("small-cooler", 120.0), cooler("tower-cooler", 170.0)],
        );
        let gpu = ComponentAttributes {
            length_mm: Some(336.0),
            ..Default::default()
        };
        let case = ComponentAttributes {
            max_gpu_length_mm: Some(330.0),
            ..Default::default()
        };
        domains.insert(Category::Gpu, vec![candidate(Category::Gpu, "long-gpu", gpu)]);
        domains.insert(Category::Case, vec![candidate(Category::Case, "small-case", case)]);

        let conflicts = checker.check(&domains);
        assert!(conflicts.iter().all(|c| c.severity == Severity::Warning));

        let mut pairs: Vec<(&str, &str)> = conflicts
            .iter()
            .filter(|c| c.first < c.second)
            .map(|c| (c.first.id.as_str(), c.second.id.as_str()))
            .collect();
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                ("long-gpu", "small-case"),
                ("old-cpu", "new-board"),
                ("old-cpu", "small-cooler"),
            ]
        );
    }

    #[test]
    fn test_missing_domain_skips_rule() {
        let mut rule = MockCompatibilityRule::new();
        rule.expect_categories().return_const((Category::Gpu, Category::Case));
        rule.expect_check().times(0);

        let checker = CompatibilityChecker::new(vec![Box::new(rule)]);
        assert!(checker.check(&sample_domains()).is_empty());
    }
}
