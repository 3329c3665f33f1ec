//! Tests for ProducerAgent

use std::sync::Arc;

use producer::{CategoryProducer, InMemorySource, MockCandidateSource, ProducerError};
use shared::{AgentId, Category, ComponentCandidate};

use super::common::{fast_poll, request};
use crate::core::coordinator::Coordinator;
use crate::core::state::{EventKind, Section, SectionValue};
use crate::error::AssemblerError;
use crate::services::ProducerAgent;
use crate::traits::Subscriber;

fn requirements() -> SectionValue {
    SectionValue::Requirements(request(1000.0))
}

#[tokio::test]
async fn test_requirements_trigger_proposal() {
    let coordinator = Coordinator::new(1);
    let source = InMemorySource::new().with_candidates(vec![
        ComponentCandidate::new(Category::Gpu, "gpu-1", "RTX 4060", 299.0),
        ComponentCandidate::new(Category::Gpu, "gpu-2", "RTX 4090", 1899.0),
    ]);
    let agent = ProducerAgent::new(CategoryProducer::new(Category::Gpu, Arc::new(source)));
    coordinator.subscribe(EventKind::RequirementsUpdated, Arc::new(agent)).await;

    coordinator
        .update(Section::UserRequirements, requirements(), AgentId::User)
        .await
        .unwrap()
        .join()
        .await;

    let Some(SectionValue::Proposals(domains)) = coordinator
        .get_from(Section::ComponentProposals, AgentId::Producer(Category::Gpu))
        .await
    else {
        panic!("expected a GPU proposal");
    };
    let ids: Vec<&str> = domains[&Category::Gpu].iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["gpu-1"]);
    assert_eq!(coordinator.consolidated_candidates().await.len(), 1);
}

#[tokio::test]
async fn test_ignores_other_events() {
    let mut source = MockCandidateSource::new();
    source.expect_load().times(0);
    let agent = ProducerAgent::new(CategoryProducer::new(Category::Cpu, Arc::new(source)));

    let result = agent.on_event(EventKind::BuildsPublished, Coordinator::new(1)).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_source_failure_lands_in_error_log() {
    let coordinator = Coordinator::new(1);
    let mut source = MockCandidateSource::new();
    source.expect_load().returning(|category| {
        Err(ProducerError::PoolNotFound {
            category,
            path: "pools/psu.json".to_string(),
        })
    });
    let agent = ProducerAgent::new(CategoryProducer::new(Category::Psu, Arc::new(source)));
    coordinator.subscribe(EventKind::RequirementsUpdated, Arc::new(agent)).await;

    let _ = coordinator
        .update(Section::UserRequirements, requirements(), AgentId::User)
        .await
        .unwrap();

    // The polling contract surfaces the failure without joining the dispatch
    let result = coordinator.wait_for_builds(fast_poll()).await;
    assert!(matches!(
        result,
        Err(AssemblerError::CycleFailed {
            agent: AgentId::Producer(Category::Psu),
            ..
        })
    ));
    assert_eq!(coordinator.errors().await[0].kind, "producer");
}
