pub mod audit;
pub mod config;
pub mod drives;
pub mod ui;
pub mod verification;
pub mod wipe_orchestrator;

// Re-export the session entry points for convenience
pub use audit::{AuditSink, PersistOutcome, SanitizationSession, SessionVerdict};
pub use config::AuditConfig;
pub use drives::{parse_identity, DeviceIdentity, EraseOutcome, EraseStep, SecurityFeatures};
pub use verification::{sample_device, IntegritySample};
pub use wipe_orchestrator::{SessionReport, SessionState, WipeOrchestrator, WipeRequest};

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

// Set once the destructive command has been issued; signal handling consults it
static ERASE_COMMITTED: AtomicBool = AtomicBool::new(false);

/// Record that the erase sequence has started (no longer cancellable)
pub fn mark_erase_committed() {
    ERASE_COMMITTED.store(true, Ordering::SeqCst);
}

/// Check whether a destructive command has been issued in this process
pub fn erase_committed() -> bool {
    ERASE_COMMITTED.load(Ordering::SeqCst)
}

/// Fatal conditions that end a run before or instead of producing a session
#[derive(Error, Debug)]
pub enum SanitizeError {
    #[error("Device {0} does not exist")]
    DeviceNotFound(String),

    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("Failed to launch {program}: {source}")]
    CommandFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Aborted by user")]
    Declined,

    #[error("Device inventory failed: {0}")]
    Inventory(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),
}

pub type SanitizeResult<T> = Result<T, SanitizeError>;

/// Sanitization methods supported by the erase driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum WipeMethod {
    /// ATA Security Erase Unit issued through hdparm
    AtaSecureErase,
}

impl WipeMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            WipeMethod::AtaSecureErase => "ata-secure-erase",
        }
    }
}

impl std::fmt::Display for WipeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a best-effort capture (identity query, inventory lookup, sampling).
///
/// A capture never aborts a session: it either produced a value, was not
/// requested, or was attempted and failed with a reason worth auditing.
#[derive(Debug, Clone, PartialEq)]
pub enum Capture<T> {
    Captured(T),
    Skipped,
    Degraded(String),
}

impl<T> Capture<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Capture::Captured(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Capture::Captured(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_captured(&self) -> bool {
        matches!(self, Capture::Captured(_))
    }

    /// Reason recorded when the capture was attempted and failed
    pub fn degraded_reason(&self) -> Option<&str> {
        match self {
            Capture::Degraded(reason) => Some(reason),
            _ => None,
        }
    }
}
