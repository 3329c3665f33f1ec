//! Candidate selection for a single category
//!
//! Turns a raw pool into the proposal a producer publishes: budget filter,
//! duplicate-listing collapse, then ranking.

use std::collections::HashMap;

use shared::{BuildRequest, Category, ComponentCandidate};

use crate::types::ProducerSettings;

/// Drop candidates priced above the limit
pub fn within_budget(candidates: Vec<ComponentCandidate>, limit: f64) -> Vec<ComponentCandidate> {
    candidates
        .into_iter()
        .filter(|candidate| candidate.price.value() <= limit)
        .collect()
}

/// Keep only the cheapest listing of each model, preserving first-seen order
pub fn dedupe_cheapest_per_model(candidates: Vec<ComponentCandidate>) -> Vec<ComponentCandidate> {
    let mut position: HashMap<String, usize> = HashMap::new();
    let mut kept: Vec<ComponentCandidate> = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        let key = candidate.model_key();
        match position.get(&key) {
            Some(&index) => {
                if candidate.price.value() < kept[index].price.value() {
                    kept[index] = candidate;
                }
            }
            None => {
                position.insert(key, kept.len());
                kept.push(candidate);
            }
        }
    }

    kept
}

/// Rough per-category performance used only to order proposals
pub fn performance_hint(candidate: &ComponentCandidate) -> f64 {
    let metrics = &candidate.metrics;
    match candidate.category {
        Category::Cpu => {
            metrics.single_core.unwrap_or(0.0) + 0.5 * metrics.multi_core.unwrap_or(0.0)
        }
        Category::Gpu => metrics.graphics.or(metrics.multi_core).unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Order by performance descending, then price ascending, then id
pub fn rank_candidates(candidates: &mut [ComponentCandidate]) {
    candidates.sort_by(|a, b| {
        performance_hint(b)
            .total_cmp(&performance_hint(a))
            .then_with(|| a.price.value().total_cmp(&b.price.value()))
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Full selection pipeline for one request
pub fn select(
    candidates: Vec<ComponentCandidate>,
    request: &BuildRequest,
    settings: &ProducerSettings,
) -> Vec<ComponentCandidate> {
    let limit = request.budget.max * settings.budget_share;
    let mut selected = dedupe_cheapest_per_model(within_budget(candidates, limit));
    rank_candidates(&mut selected);
    if let Some(max) = settings.max_candidates {
        selected.truncate(max);
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{BudgetRange, PerformanceMetrics, Price};

    fn gpu(id: &str, name: &str, price: f64, graphics: f64) -> ComponentCandidate {
        ComponentCandidate::new(Category::Gpu, id, name, price).with_metrics(PerformanceMetrics {
            graphics: Some(graphics),
            ..Default::default()
        })
    }

    #[test]
    fn test_within_budget_drops_expensive_and_unpriced() {
        let mut unpriced = gpu("c", "RX 7600", 0.0, 10.0);
        unpriced.price = Price::UNAVAILABLE;
        let candidates = vec![
            gpu("a", "RTX 4060", 299.0, 10.0),
            gpu("b", "RTX 4090", 1799.0, 40.0),
            unpriced,
        ];
        let kept = within_budget(candidates, 1000.0);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id.as_str(), "a");
    }

    #[test]
    fn test_dedupe_keeps_cheapest_listing() {
        let kept = dedupe_cheapest_per_model(vec![
            gpu("shop-a", "RTX 4070", 619.0, 20.0),
            gpu("shop-b", "RTX 4070", 579.0, 20.0),
            gpu("shop-c", "RX 7800 XT", 499.0, 21.0),
        ]);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].id.as_str(), "shop-b");
        assert_eq!(kept[1].id.as_str(), "shop-c");
    }

    #[test]
    fn test_rank_prefers_performance_then_price() {
        let mut candidates = vec![
            gpu("slow", "A", 200.0, 5.0),
            gpu("fast-expensive", "B", 900.0, 30.0),
            gpu("fast-cheap", "C", 800.0, 30.0),
        ];
        rank_candidates(&mut candidates);
        let ids: Vec<&str> = candidates.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["fast-cheap", "fast-expensive", "slow"]);
    }

    #[test]
    fn test_select_applies_budget_share_and_cap() {
        let request = BuildRequest::new(BudgetRange::up_to(1000.0));
        let settings = ProducerSettings {
            budget_share: 0.4,
            max_candidates: Some(1),
        };
        let candidates = vec![
            gpu("a", "A", 350.0, 10.0),
            gpu("b", "B", 390.0, 12.0),
            gpu("c", "C", 600.0, 30.0),
        ];
        let selected = select(candidates, &request, &settings);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id.as_str(), "b");
    }
}
