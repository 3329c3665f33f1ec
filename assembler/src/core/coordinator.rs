//! Shared blackboard connecting producers, the checker and the optimizer
//!
//! Every read and write goes through one lock. Notifications are dispatched
//! after the lock is released, each subscriber on its own task, so there is
//! no ordering between subscribers and no completion signal beyond the
//! returned `Dispatch` handle. Callers that need a result poll the section it
//! is published to.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use shared::{
    agent_debug, agent_error, agent_warn, AgentId, Build, BuildRequest, ConflictPair, CycleId,
    Domains,
};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::config::PollConfig;
use crate::core::state::{
    AuditEntry, CoordinatorState, ErrorEntry, EventKind, Section, SectionValue,
};
use crate::error::{AssemblerError, AssemblerResult};
use crate::traits::Subscriber;

struct Inner {
    state: CoordinatorState,
    subscribers: HashMap<EventKind, Vec<Arc<dyn Subscriber>>>,
}

/// Cloneable handle to the shared coordinator
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<Mutex<Inner>>,
}

/// Tasks spawned for one update's notifications
///
/// Dropping it detaches the tasks; `join` waits for all of them, including
/// any failure recording.
#[derive(Debug, Default)]
#[must_use = "dropping a Dispatch detaches its notification tasks"]
pub struct Dispatch {
    handles: Vec<JoinHandle<()>>,
}

impl Dispatch {
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub async fn join(self) {
        for handle in self.handles {
            // Failures are recorded by the task itself
            let _ = handle.await;
        }
    }
}

impl Coordinator {
    pub fn new(expected_producers: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state: CoordinatorState::new(expected_producers),
                subscribers: HashMap::new(),
            })),
        }
    }

    /// Register a subscriber for an event
    pub async fn subscribe(&self, event: EventKind, subscriber: Arc<dyn Subscriber>) {
        let mut inner = self.inner.lock().await;
        agent_debug!(AgentId::Coordinator, "Subscribing {} to {:?}", subscriber.agent_id(), event);
        inner.subscribers.entry(event).or_default().push(subscriber);
    }

    /// Register a closure as a subscriber
    pub async fn subscribe_fn<F>(&self, event: EventKind, agent: AgentId, callback: F)
    where
        F: Fn(EventKind, Coordinator) -> AssemblerResult<()> + Send + Sync + 'static,
    {
        self.subscribe(event, Arc::new(FnSubscriber { agent, callback })).await;
    }

    pub async fn cycle(&self) -> CycleId {
        self.inner.lock().await.state.cycle()
    }

    /// Write a section and notify the subscribers of every event it raises
    pub async fn update(
        &self,
        section: Section,
        value: SectionValue,
        producer: AgentId,
    ) -> AssemblerResult<Dispatch> {
        let (targets, cycle) = {
            let mut inner = self.inner.lock().await;
            let outcome = inner.state.apply(section, value, producer)?;
            Self::log_progress(&inner.state, section);
            let targets = Self::targets(&inner.subscribers, &outcome.events);
            (targets, inner.state.cycle())
        };
        Ok(self.dispatch(targets, cycle))
    }

    /// Write a section without notifying anyone
    pub async fn update_silently(
        &self,
        section: Section,
        value: SectionValue,
        producer: AgentId,
    ) -> AssemblerResult<()> {
        let mut inner = self.inner.lock().await;
        inner.state.apply(section, value, producer)?;
        Ok(())
    }

    /// Like `update`, but dropped when the coordinator has moved on from `cycle`
    ///
    /// Agents use this to publish results computed for a cycle that may have
    /// been reset while they worked.
    pub async fn update_in_cycle(
        &self,
        cycle: CycleId,
        section: Section,
        value: SectionValue,
        producer: AgentId,
    ) -> AssemblerResult<Dispatch> {
        let targets = {
            let mut inner = self.inner.lock().await;
            if inner.state.cycle() != cycle {
                agent_warn!(producer, "Discarding {} update for stale cycle {}", section, cycle);
                return Ok(Dispatch::default());
            }
            let outcome = inner.state.apply(section, value, producer)?;
            Self::log_progress(&inner.state, section);
            Self::targets(&inner.subscribers, &outcome.events)
        };
        Ok(self.dispatch(targets, cycle))
    }

    fn log_progress(state: &CoordinatorState, section: Section) {
        if section == Section::ComponentProposals {
            agent_debug!(
                AgentId::Coordinator,
                "📥 {}/{} producers reported in cycle {}",
                state.reported_count(),
                state.expected_producers(),
                state.cycle()
            );
        }
    }

    fn targets(
        subscribers: &HashMap<EventKind, Vec<Arc<dyn Subscriber>>>,
        events: &[EventKind],
    ) -> Vec<(EventKind, Arc<dyn Subscriber>)> {
        events
            .iter()
            .flat_map(|event| {
                subscribers
                    .get(event)
                    .into_iter()
                    .flatten()
                    .map(move |subscriber| (*event, Arc::clone(subscriber)))
            })
            .collect()
    }

    fn dispatch(&self, targets: Vec<(EventKind, Arc<dyn Subscriber>)>, cycle: CycleId) -> Dispatch {
        let handles = targets
            .into_iter()
            .map(|(event, subscriber)| {
                let coordinator = self.clone();
                tokio::spawn(async move {
                    let agent = subscriber.agent_id();
                    let worker = {
                        let coordinator = coordinator.clone();
                        tokio::spawn(async move { subscriber.on_event(event, coordinator).await })
                    };

                    let failure = match worker.await {
                        Ok(Ok(())) => None,
                        Ok(Err(e)) => Some((e.kind().to_string(), e.to_string())),
                        Err(e) if e.is_panic() => Some(("panic".to_string(), e.to_string())),
                        Err(e) => Some(("cancelled".to_string(), e.to_string())),
                    };

                    if let Some((kind, message)) = failure {
                        agent_error!(agent, "❌ Handling {:?} failed: {}", event, message);
                        let entry = ErrorEntry {
                            cycle,
                            agent,
                            operation: format!("{event:?}"),
                            kind,
                            message,
                            timestamp: Utc::now(),
                        };
                        coordinator.record_error(entry).await;
                    }
                })
            })
            .collect();
        Dispatch { handles }
    }

    /// Append to the error log; never fails and never notifies
    pub async fn record_error(&self, entry: ErrorEntry) {
        let mut inner = self.inner.lock().await;
        if let Err(e) = inner
            .state
            .apply(Section::Errors, SectionValue::Errors(vec![entry]), AgentId::Coordinator)
        {
            agent_error!(AgentId::Coordinator, "Could not record error entry: {}", e);
        }
    }

    pub async fn get(&self, section: Section) -> Option<SectionValue> {
        self.inner.lock().await.state.get(section)
    }

    /// A single producer's contribution to a per-producer section
    pub async fn get_from(&self, section: Section, producer: AgentId) -> Option<SectionValue> {
        self.inner.lock().await.state.get_from(section, producer)
    }

    pub async fn requirements(&self) -> Option<BuildRequest> {
        match self.get(Section::UserRequirements).await {
            Some(SectionValue::Requirements(request)) => Some(request),
            _ => None,
        }
    }

    pub async fn conflicts(&self) -> Vec<ConflictPair> {
        match self.get(Section::CompatibilityIssues).await {
            Some(SectionValue::Conflicts(conflicts)) => conflicts,
            _ => Vec::new(),
        }
    }

    pub async fn builds(&self) -> Option<Vec<Build>> {
        match self.get(Section::Builds).await {
            Some(SectionValue::Builds(builds)) => Some(builds),
            _ => None,
        }
    }

    pub async fn response(&self) -> Option<String> {
        match self.get(Section::UserResponse).await {
            Some(SectionValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Merged proposals; empty until every expected producer has reported
    pub async fn consolidated_candidates(&self) -> Domains {
        self.inner.lock().await.state.consolidated_candidates()
    }

    /// The candidates the published conflicts were computed on
    ///
    /// Later proposals in the same cycle do not change this snapshot.
    pub async fn checked_candidates(&self) -> Option<Domains> {
        match self.get(Section::CheckedCandidates).await {
            Some(SectionValue::Proposals(domains)) => Some(domains),
            _ => None,
        }
    }

    /// Errors recorded since the last reset
    pub async fn errors(&self) -> Vec<ErrorEntry> {
        self.inner.lock().await.state.errors().to_vec()
    }

    pub async fn audit_log(&self) -> Vec<AuditEntry> {
        self.inner.lock().await.state.audit_log().to_vec()
    }

    /// Start a new cycle, clearing every section but the audit log
    pub async fn reset(&self) -> CycleId {
        let mut inner = self.inner.lock().await;
        inner.state.reset();
        let cycle = inner.state.cycle();
        agent_debug!(AgentId::Coordinator, "🔄 Started cycle {}", cycle);
        cycle
    }

    /// Wait until `section` has a value
    ///
    /// Fails early when an error was recorded in the current cycle, and with
    /// `PollTimeout` once the deadline passes.
    pub async fn poll_section(
        &self,
        section: Section,
        poll: PollConfig,
    ) -> AssemblerResult<SectionValue> {
        let started = Instant::now();
        loop {
            {
                let inner = self.inner.lock().await;
                if let Some(value) = inner.state.get(section) {
                    return Ok(value);
                }
                let cycle = inner.state.cycle();
                let failure = inner.state.errors().iter().find(|entry| entry.cycle == cycle);
                if let Some(entry) = failure {
                    return Err(AssemblerError::CycleFailed {
                        agent: entry.agent,
                        operation: entry.operation.clone(),
                        message: entry.message.clone(),
                    });
                }
            }

            let waited = started.elapsed();
            if waited >= poll.deadline {
                return Err(AssemblerError::PollTimeout { section, waited });
            }
            tokio::time::sleep(poll.interval.min(poll.deadline - waited)).await;
        }
    }

    pub async fn wait_for_builds(&self, poll: PollConfig) -> AssemblerResult<Vec<Build>> {
        match self.poll_section(Section::Builds, poll).await? {
            SectionValue::Builds(builds) => Ok(builds),
            _ => Err(AssemblerError::missing("builds")),
        }
    }
}

struct FnSubscriber<F> {
    agent: AgentId,
    callback: F,
}

#[async_trait::async_trait]
impl<F> Subscriber for FnSubscriber<F>
where
    F: Fn(EventKind, Coordinator) -> AssemblerResult<()> + Send + Sync + 'static,
{
    fn agent_id(&self) -> AgentId {
        self.agent
    }

    async fn on_event(&self, event: EventKind, coordinator: Coordinator) -> AssemblerResult<()> {
        (self.callback)(event, coordinator)
    }
}
