//! Structured logging for the tracker.
//!
//! Installs a `tracing` subscriber and provides helpers that tag events with
//! the component they came from. Backend failures are classified as
//! expected, unexpected or unknown, which decides the level they log at.

use crate::model::TransportError;
use std::fmt;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warning => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Api,
    Lookup,
    Analysis,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Api => write!(f, "API"),
            Component::Lookup => write!(f, "LOOKUP"),
            Component::Analysis => write!(f, "ANALYSIS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// The backend is reachable but does not offer this endpoint
    Expected,
    /// Server error or unreadable response; worth investigating
    Unexpected,
    /// Network-level failure; may be the client's connection
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Classify a backend failure.
///
/// 404/405 mean the deployed backend lacks the endpoint (the list endpoints
/// are optional). 5xx and parse failures point at the backend. Everything
/// else, including timeouts, is left as unknown.
pub fn classify_transport_failure(err: &TransportError) -> FailureType {
    match err {
        TransportError::Http(404) | TransportError::Http(405) => FailureType::Expected,
        TransportError::Http(code) if *code >= 500 => FailureType::Unexpected,
        TransportError::Parse(_) => FailureType::Unexpected,
        _ => FailureType::Unknown,
    }
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

/// Installs the global subscriber. `RUST_LOG` takes precedence over
/// `min_level`. Returns an error if a subscriber is already installed.
pub fn init_logger(
    min_level: LogLevel,
    json: bool,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("kidney_compass={}", min_level)));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init()
    }
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Log a backend failure with automatic classification.
pub fn log_transport_failure(component: Component, operation: &str, err: &TransportError) {
    let failure_type = classify_transport_failure(err);
    match failure_type {
        FailureType::Expected => {
            debug!(%component, operation, %failure_type, error = %err, "backend call failed")
        }
        FailureType::Unexpected => {
            error!(%component, operation, %failure_type, error = %err, "backend call failed")
        }
        FailureType::Unknown => {
            warn!(%component, operation, %failure_type, error = %err, "backend call failed")
        }
    }
}

/// Log that a degraded fallback result is being shown in place of a real one.
pub fn log_fallback(component: Component, operation: &str, query: &str) {
    info!(%component, operation, query, "serving fallback result");
}
