//! Shared logging utilities for consistent tracing across all agents

use crate::types::AgentId;
use chrono::{DateTime, Utc};
use tracing::{error, info};

/// Build the env filter directive for the workspace crates at a base level
pub fn filter_directive(log_level: Option<&str>) -> String {
    let base_level = log_level.unwrap_or("info");
    format!("assembler={base_level},producer={base_level},shared={base_level}")
}

/// Initialize tracing subscriber with an optional log level
///
/// `RUST_LOG`, when set, takes precedence over the computed directive.
pub fn init_tracing_with_level(log_level: Option<&str>) {
    use tracing_subscriber::{EnvFilter, fmt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(log_level)));

    let _ = fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}

/// Get formatted timestamp for consistent logging
pub fn format_timestamp() -> String {
    let now: DateTime<Utc> = Utc::now();
    now.format("%H:%M:%S%.3f").to_string()
}

/// Macro for agent-aware info logging
#[macro_export]
macro_rules! agent_info {
    ($agent:expr, $($arg:tt)*) => {
        tracing::info!(
            agent = %$agent,
            timestamp = shared::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for agent-aware warning logging
#[macro_export]
macro_rules! agent_warn {
    ($agent:expr, $($arg:tt)*) => {
        tracing::warn!(
            agent = %$agent,
            timestamp = shared::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for agent-aware error logging
#[macro_export]
macro_rules! agent_error {
    ($agent:expr, $($arg:tt)*) => {
        tracing::error!(
            agent = %$agent,
            timestamp = shared::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for agent-aware debug logging
#[macro_export]
macro_rules! agent_debug {
    ($agent:expr, $($arg:tt)*) => {
        tracing::debug!(
            agent = %$agent,
            timestamp = shared::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Contextual logging helper for startup messages
pub fn log_startup(agent: &AgentId, details: &str) {
    info!(
        agent = %agent,
        timestamp = format_timestamp(),
        "🚀 Starting {}",
        details
    );
}

/// Contextual logging helper for shutdown messages
pub fn log_shutdown(agent: &AgentId, reason: &str) {
    info!(
        agent = %agent,
        timestamp = format_timestamp(),
        "🛑 Shutting down: {}",
        reason
    );
}

/// Contextual logging helper for error conditions
pub fn log_error(agent: &AgentId, context: &str, error: &dyn std::fmt::Display) {
    error!(
        agent = %agent,
        timestamp = format_timestamp(),
        error = %error,
        "❌ {} failed: {}",
        context,
        error
    );
}

/// Contextual logging helper for success conditions
pub fn log_success(agent: &AgentId, message: &str) {
    info!(
        agent = %agent,
        timestamp = format_timestamp(),
        "✅ {}",
        message
    );
}

/// Contextual logging helper for progress updates
pub fn log_progress(agent: &AgentId, action: &str, details: &str) {
    info!(
        agent = %agent,
        timestamp = format_timestamp(),
        "📋 {}: {}",
        action,
        details
    );
}
