//! Trait definitions with mockall annotations for testing
//!
//! These are the seams the coordinator and the compatibility checker are
//! built around: agents subscribe to coordinator events, and the checker
//! runs a list of pairwise rules.

use shared::{AgentId, Category, ComponentCandidate, Severity};

use crate::core::coordinator::Coordinator;
use crate::core::state::EventKind;
use crate::error::AssemblerResult;

/// Reacts to coordinator events
///
/// Each invocation runs on its own task. A returned error (or a panic) is
/// recorded in the coordinator's error log and goes no further.
#[mockall::automock]
#[async_trait::async_trait]
pub trait Subscriber: Send + Sync {
    /// Identity used in logs and error-log entries
    fn agent_id(&self) -> AgentId;

    /// Handle one event
    ///
    /// # Parameters
    /// - `event`: The event that fired
    /// - `coordinator`: Handle for reading inputs and publishing results
    async fn on_event(&self, event: EventKind, coordinator: Coordinator) -> AssemblerResult<()>;
}

/// Pairwise compatibility rule between two categories
///
/// Rules are stateless. `check` receives the candidates in the order given by
/// `categories`.
#[mockall::automock]
pub trait CompatibilityRule: Send + Sync {
    fn name(&self) -> &'static str;

    /// The category pair this rule applies to
    fn categories(&self) -> (Category, Category);

    fn severity(&self) -> Severity;

    /// Reason the pair is incompatible, or `None` when it is compatible
    fn check(&self, first: &ComponentCandidate, second: &ComponentCandidate) -> Option<String>;
}
