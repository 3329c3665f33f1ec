//! Coordinator state management
//!
//! Plain data behind the coordinator's lock: the named sections, the
//! per-cycle contribution counter and the append-only audit log. Nothing in
//! here blocks or dispatches; `Coordinator` wraps it with locking and
//! notification.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{AgentId, Build, BuildRequest, ConflictPair, CycleId, Domains};

use crate::error::{AssemblerError, AssemblerResult};

/// Named slot of coordinator state
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    UserInput,
    UserRequirements,
    ComponentProposals,
    /// Snapshot of the consolidated candidates the conflicts were computed on
    CheckedCandidates,
    CompatibilityIssues,
    Builds,
    UserResponse,
    Errors,
}

/// How an update combines with the section's current value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    /// New value replaces the old one
    Replace,
    /// Values are kept per producer and replaced under the producer's key
    PerProducer,
    /// Values are appended
    Append,
}

impl Section {
    pub fn kind(&self) -> SectionKind {
        match self {
            Section::ComponentProposals => SectionKind::PerProducer,
            Section::Errors => SectionKind::Append,
            _ => SectionKind::Replace,
        }
    }

    /// Event raised when this section changes, if any
    ///
    /// Proposals raise `CandidatesReady` only through the contribution counter.
    fn event(&self) -> Option<EventKind> {
        match self {
            Section::UserInput => Some(EventKind::InputReceived),
            Section::UserRequirements => Some(EventKind::RequirementsUpdated),
            Section::CompatibilityIssues => Some(EventKind::ConflictsPublished),
            Section::Builds => Some(EventKind::BuildsPublished),
            Section::UserResponse => Some(EventKind::ResponseReady),
            Section::ComponentProposals | Section::CheckedCandidates | Section::Errors => None,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Section::UserInput => "user_input",
            Section::UserRequirements => "user_requirements",
            Section::ComponentProposals => "component_proposals",
            Section::CheckedCandidates => "checked_candidates",
            Section::CompatibilityIssues => "compatibility_issues",
            Section::Builds => "builds",
            Section::UserResponse => "user_response",
            Section::Errors => "errors",
        };
        write!(f, "{name}")
    }
}

/// Logical event subscribers register for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    InputReceived,
    RequirementsUpdated,
    /// All expected producers reported in this cycle; fires once per cycle
    CandidatesReady,
    ConflictsPublished,
    BuildsPublished,
    ResponseReady,
}

/// Failure caught at the dispatch boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub cycle: CycleId,
    pub agent: AgentId,
    pub operation: String,
    pub kind: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Typed value stored in a section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum SectionValue {
    Text(String),
    Requirements(BuildRequest),
    Proposals(Domains),
    Conflicts(Vec<ConflictPair>),
    Builds(Vec<Build>),
    Errors(Vec<ErrorEntry>),
}

impl SectionValue {
    fn type_name(&self) -> &'static str {
        match self {
            SectionValue::Text(_) => "text",
            SectionValue::Requirements(_) => "requirements",
            SectionValue::Proposals(_) => "proposals",
            SectionValue::Conflicts(_) => "conflicts",
            SectionValue::Builds(_) => "builds",
            SectionValue::Errors(_) => "errors",
        }
    }

    fn fits(&self, section: Section) -> bool {
        matches!(
            (section, self),
            (Section::UserInput, SectionValue::Text(_))
                | (Section::UserResponse, SectionValue::Text(_))
                | (Section::UserRequirements, SectionValue::Requirements(_))
                | (Section::ComponentProposals, SectionValue::Proposals(_))
                | (Section::CheckedCandidates, SectionValue::Proposals(_))
                | (Section::CompatibilityIssues, SectionValue::Conflicts(_))
                | (Section::Builds, SectionValue::Builds(_))
                | (Section::Errors, SectionValue::Errors(_))
        )
    }
}

/// One recorded mutation; never used for control flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub sequence: u64,
    pub cycle: CycleId,
    pub section: Section,
    pub producer: AgentId,
    pub timestamp: DateTime<Utc>,
    pub value: serde_json::Value,
}

/// Result of applying an update: which events to dispatch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateOutcome {
    pub events: Vec<EventKind>,
}

/// Coordinator state for one cycle plus the cross-cycle audit log
#[derive(Debug)]
pub struct CoordinatorState {
    cycle: CycleId,
    sections: HashMap<Section, SectionValue>,
    proposals: BTreeMap<AgentId, Domains>,
    errors: Vec<ErrorEntry>,
    reported: BTreeSet<AgentId>,
    expected_producers: usize,
    ready_fired: bool,
    audit_log: Vec<AuditEntry>,
    next_sequence: u64,
}

impl CoordinatorState {
    pub fn new(expected_producers: usize) -> Self {
        Self {
            cycle: CycleId::new(),
            sections: HashMap::new(),
            proposals: BTreeMap::new(),
            errors: Vec::new(),
            reported: BTreeSet::new(),
            expected_producers,
            ready_fired: false,
            audit_log: Vec::new(),
            next_sequence: 0,
        }
    }

    pub fn cycle(&self) -> CycleId {
        self.cycle
    }

    pub fn expected_producers(&self) -> usize {
        self.expected_producers
    }

    /// Producers that reported at least once in this cycle
    pub fn reported_count(&self) -> usize {
        self.reported.len()
    }

    /// Apply an update and work out which events it raises
    ///
    /// The contribution counter is incremented and compared here, so callers
    /// holding the coordinator lock get exactly one `CandidatesReady` per cycle.
    pub fn apply(
        &mut self,
        section: Section,
        value: SectionValue,
        producer: AgentId,
    ) -> AssemblerResult<UpdateOutcome> {
        if !value.fits(section) {
            return Err(AssemblerError::SectionTypeMismatch {
                section,
                found: value.type_name().to_string(),
            });
        }
        if section.kind() == SectionKind::PerProducer && !matches!(producer, AgentId::Producer(_)) {
            return Err(AssemblerError::MissingProducer { section });
        }

        self.record_audit(section, producer, &value);

        let mut outcome = UpdateOutcome::default();
        match (section.kind(), value) {
            (SectionKind::PerProducer, SectionValue::Proposals(domains)) => {
                self.proposals.insert(producer, domains);
                let newly_reported = self.reported.insert(producer);
                let complete = self.reported.len() >= self.expected_producers;
                if newly_reported && !self.ready_fired && complete {
                    self.ready_fired = true;
                    outcome.events.push(EventKind::CandidatesReady);
                }
            }
            (SectionKind::Append, SectionValue::Errors(entries)) => {
                self.errors.extend(entries);
            }
            (_, value) => {
                self.sections.insert(section, value);
            }
        }

        if let Some(event) = section.event() {
            outcome.events.push(event);
        }
        Ok(outcome)
    }

    fn record_audit(&mut self, section: Section, producer: AgentId, value: &SectionValue) {
        let snapshot = serde_json::to_value(value).unwrap_or(serde_json::Value::Null);
        self.audit_log.push(AuditEntry {
            sequence: self.next_sequence,
            cycle: self.cycle,
            section,
            producer,
            timestamp: Utc::now(),
            value: snapshot,
        });
        self.next_sequence += 1;
    }

    /// Current value of a section
    ///
    /// Per-producer sections are reported merged; errors as the full list.
    pub fn get(&self, section: Section) -> Option<SectionValue> {
        match section.kind() {
            SectionKind::PerProducer => {
                if self.proposals.is_empty() {
                    None
                } else {
                    Some(SectionValue::Proposals(self.merged_proposals()))
                }
            }
            SectionKind::Append => {
                if self.errors.is_empty() {
                    None
                } else {
                    Some(SectionValue::Errors(self.errors.clone()))
                }
            }
            SectionKind::Replace => self.sections.get(&section).cloned(),
        }
    }

    /// A single producer's contribution to a per-producer section
    pub fn get_from(&self, section: Section, producer: AgentId) -> Option<SectionValue> {
        match section.kind() {
            SectionKind::PerProducer => {
                self.proposals.get(&producer).cloned().map(SectionValue::Proposals)
            }
            _ => None,
        }
    }

    /// Merged proposals, empty until every expected producer has reported
    pub fn consolidated_candidates(&self) -> Domains {
        if self.reported.len() < self.expected_producers {
            return Domains::new();
        }
        self.merged_proposals()
    }

    fn merged_proposals(&self) -> Domains {
        let mut merged = Domains::new();
        for domains in self.proposals.values() {
            for (category, candidates) in domains {
                let slot = merged.entry(*category).or_default();
                for candidate in candidates {
                    if !slot.iter().any(|existing| existing.id == candidate.id) {
                        slot.push(candidate.clone());
                    }
                }
            }
        }
        merged
    }

    pub fn errors(&self) -> &[ErrorEntry] {
        &self.errors
    }

    pub fn audit_log(&self) -> &[AuditEntry] {
        &self.audit_log
    }

    /// Clear every section and the counter, starting a new cycle
    ///
    /// The audit log survives resets.
    pub fn reset(&mut self) {
        self.cycle = CycleId::new();
        self.sections.clear();
        self.proposals.clear();
        self.errors.clear();
        self.reported.clear();
        self.ready_fired = false;
    }
}
