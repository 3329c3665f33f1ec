//! Candidate pools and random instances for assembler tests

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use shared::{
    Category, ComponentAttributes, ComponentCandidate, ConflictPair, Domains, PerformanceMetrics,
    Severity,
};

pub struct TestFixtures;

impl TestFixtures {
    pub const GA_SEED: u64 = 42;
    pub const SOCKETS: [&'static str; 3] = ["AM5", "LGA1700", "AM4"];

    pub fn socketed(category: Category, id: &str, price: f64, socket: &str) -> ComponentCandidate {
        ComponentCandidate::new(category, id, id, price).with_attributes(ComponentAttributes {
            socket: Some(socket.to_string()),
            ..Default::default()
        })
    }

    pub fn cpu(id: &str, price: f64, socket: &str, single: f64, multi: f64) -> ComponentCandidate {
        Self::socketed(Category::Cpu, id, price, socket).with_metrics(PerformanceMetrics {
            single_core: Some(single),
            multi_core: Some(multi),
            graphics: None,
        })
    }

    /// One LGA1700 CPU that is cheaper than the AM5 one but fits neither AM5 board
    pub fn socket_mismatch_domains() -> Domains {
        let mut domains = Domains::new();
        domains.insert(
            Category::Cpu,
            vec![
                Self::cpu("cpu-a", 200.0, "AM5", 2800.0, 18000.0),
                Self::cpu("cpu-b", 150.0, "LGA1700", 2600.0, 15000.0),
            ],
        );
        domains.insert(
            Category::Motherboard,
            vec![
                Self::socketed(Category::Motherboard, "mb-a", 120.0, "AM5"),
                Self::socketed(Category::Motherboard, "mb-b", 160.0, "Socket AM5"),
            ],
        );
        domains.insert(
            Category::Gpu,
            vec![
                ComponentCandidate::new(Category::Gpu, "gpu-a", "RX 7600", 60.0),
                ComponentCandidate::new(Category::Gpu, "gpu-b", "RTX 4060", 80.0),
            ],
        );
        domains
    }

    /// Same shape as the socket fixture but with every CPU on AM5
    pub fn compatible_domains() -> Domains {
        let mut domains = Self::socket_mismatch_domains();
        domains.insert(
            Category::Cpu,
            vec![
                Self::cpu("cpu-a", 200.0, "AM5", 2800.0, 18000.0),
                Self::cpu("cpu-c", 150.0, "AM5", 2600.0, 15000.0),
            ],
        );
        domains
    }

    /// Sum of the second-cheapest price in every category
    pub fn second_cheapest_total(domains: &Domains) -> f64 {
        domains
            .values()
            .map(|pool| {
                let mut prices: Vec<f64> = pool.iter().map(|c| c.price.value()).collect();
                prices.sort_by(f64::total_cmp);
                prices.get(1).or(prices.first()).copied().unwrap_or(0.0)
            })
            .sum()
    }

    pub fn cheapest_total(domains: &Domains) -> f64 {
        domains
            .values()
            .map(|pool| pool.iter().map(|c| c.price.value()).fold(f64::INFINITY, f64::min))
            .sum()
    }

    /// Small random instance: three categories, up to four candidates each,
    /// random socket attributes and a random sprinkle of extra conflicts
    pub fn random_instance(seed: u64) -> (Domains, Vec<ConflictPair>) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut domains = Domains::new();

        for category in [Category::Cpu, Category::Gpu, Category::Motherboard] {
            let count = rng.gen_range(1..=4);
            let pool = (0..count)
                .map(|n| {
                    let id = format!("{}-{}", category.key(), n);
                    let price = f64::from(rng.gen_range(5..60u32)) * 10.0;
                    let socket = Self::SOCKETS.choose(&mut rng).copied().unwrap_or("AM5");
                    Self::socketed(category, &id, price, socket).with_metrics(PerformanceMetrics {
                        single_core: Some(f64::from(rng.gen_range(1000..5000u32))),
                        multi_core: Some(f64::from(rng.gen_range(5000..40000u32))),
                        graphics: Some(f64::from(rng.gen_range(5000..30000u32))),
                    })
                })
                .collect();
            domains.insert(category, pool);
        }

        let mut conflicts = Vec::new();
        let gpus = &domains[&Category::Gpu];
        let boards = &domains[&Category::Motherboard];
        for gpu in gpus {
            for board in boards {
                if rng.gen_bool(0.25) {
                    let (first, second) = (gpu.reference(), board.reference());
                    let pair = ConflictPair::new(first, second, "slot", Severity::Warning);
                    conflicts.push(pair.reversed());
                    conflicts.push(pair);
                }
            }
        }
        (domains, conflicts)
    }
}
