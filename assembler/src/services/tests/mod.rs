//! Agent tests
//!
//! Each agent is driven through a real coordinator; the other agents of a
//! cycle are replaced by seeded sections.

mod producers;

// Common test utilities for agents
pub mod common {
    use std::time::Duration;

    use shared::{
        BudgetRange, BuildRequest, Category, ComponentAttributes, ComponentCandidate, Domains,
    };

    use crate::config::PollConfig;

    pub fn fast_poll() -> PollConfig {
        PollConfig {
            interval: Duration::from_millis(5),
            deadline: Duration::from_secs(5),
        }
    }

    pub fn request(max: f64) -> BuildRequest {
        BuildRequest::new(BudgetRange::up_to(max))
    }

    pub fn socketed(category: Category, id: &str, price: f64, socket: &str) -> ComponentCandidate {
        ComponentCandidate::new(category, id, id, price).with_attributes(ComponentAttributes {
            socket: Some(socket.to_string()),
            ..Default::default()
        })
    }

    /// Two CPUs on different sockets and one AM5 board
    pub fn cpu_board_domains() -> Domains {
        let mut domains = Domains::new();
        domains.insert(
            Category::Cpu,
            vec![
                socketed(Category::Cpu, "ryzen", 200.0, "AM5"),
                socketed(Category::Cpu, "core", 150.0, "LGA1700"),
            ],
        );
        domains.insert(
            Category::Motherboard,
            vec![socketed(Category::Motherboard, "b650", 120.0, "AM5")],
        );
        domains
    }
}
