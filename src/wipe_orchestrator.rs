// Wipe Orchestrator - Drives one sanitization session from start to audit
//
// A session moves strictly forward through:
//   Init -> Confirmed -> PreCapture -> Erasing -> PostCapture -> Persisted -> Reported
//
// Only Init (missing device) and Confirmed (operator declined) may end a run
// without an audit record. Once the erase has been attempted the session is
// always persisted, whether the erase succeeded or not.

use crate::audit::{
    audit_now, AuditSink, OperatorLog, PersistOutcome, SanitizationSession, SessionEvidence,
};
use crate::drives::{query_identity, CommandRunner, DeviceInventory, EraseDriver, DEFAULT_ERASE_PASSWORD};
use crate::ui::{failure_banner, render_summary, Confirmer};
use crate::verification::{sample_device, IntegritySample};
use crate::{mark_erase_committed, Capture, SanitizeError, SanitizeResult, WipeMethod};
use std::path::{Path, PathBuf};

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SessionState {
    Init,
    Confirmed,
    PreCapture,
    Erasing,
    PostCapture,
    Persisted,
    Reported,
}

impl SessionState {
    /// The only state reachable from `self`
    pub fn next(self) -> Option<SessionState> {
        match self {
            SessionState::Init => Some(SessionState::Confirmed),
            SessionState::Confirmed => Some(SessionState::PreCapture),
            SessionState::PreCapture => Some(SessionState::Erasing),
            SessionState::Erasing => Some(SessionState::PostCapture),
            SessionState::PostCapture => Some(SessionState::Persisted),
            SessionState::Persisted => Some(SessionState::Reported),
            SessionState::Reported => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Init => "init",
            SessionState::Confirmed => "confirmed",
            SessionState::PreCapture => "pre-capture",
            SessionState::Erasing => "erasing",
            SessionState::PostCapture => "post-capture",
            SessionState::Persisted => "persisted",
            SessionState::Reported => "reported",
        }
    }
}

/// Operator inputs for one session
#[derive(Debug, Clone)]
pub struct WipeRequest {
    pub device: String,
    pub method: WipeMethod,
    pub operator: Option<String>,
    pub session_id: Option<String>,
    /// Bytes hashed before and after the erase; 0 disables sampling
    pub sample_bytes: u64,
    /// Skip the confirmation prompt
    pub assume_yes: bool,
    pub dry_run: bool,
    pub password: String,
}

impl WipeRequest {
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            method: WipeMethod::AtaSecureErase,
            operator: None,
            session_id: None,
            sample_bytes: 0,
            assume_yes: false,
            dry_run: false,
            password: DEFAULT_ERASE_PASSWORD.to_string(),
        }
    }
}

/// Result of a completed session
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub session: SanitizationSession,
    pub persisted: PersistOutcome,
    /// Operator day log the session was appended to, if any
    pub operator_log: Option<PathBuf>,
}

impl SessionReport {
    pub fn passed(&self) -> bool {
        self.session.passed()
    }
}

/// Runs sanitization sessions against one audit sink
pub struct WipeOrchestrator<'a> {
    runner: &'a dyn CommandRunner,
    sink: &'a mut AuditSink,
    confirmer: &'a dyn Confirmer,
    operator_log: Option<&'a OperatorLog>,
    state: SessionState,
}

impl<'a> WipeOrchestrator<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        sink: &'a mut AuditSink,
        confirmer: &'a dyn Confirmer,
    ) -> Self {
        Self {
            runner,
            sink,
            confirmer,
            operator_log: None,
            state: SessionState::Init,
        }
    }

    /// Also append every session to the operator day log
    pub fn with_operator_log(mut self, log: &'a OperatorLog) -> Self {
        self.operator_log = Some(log);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    fn advance(&mut self, to: SessionState, device: &str) {
        debug_assert_eq!(self.state.next(), Some(to), "session states only move forward");
        tracing::debug!(device, from = self.state.as_str(), state = to.as_str(), "Session state change");
        self.state = to;
    }

    /// Run one session end to end
    pub fn run(&mut self, request: &WipeRequest) -> SanitizeResult<SessionReport> {
        self.state = SessionState::Init;
        let device = request.device.as_str();

        if !Path::new(device).exists() {
            return Err(SanitizeError::DeviceNotFound(device.to_string()));
        }

        if !(request.assume_yes || request.dry_run) && !self.confirmer.confirm(device, request.method)? {
            tracing::info!(device, "Operator declined the erase");
            return Err(SanitizeError::Declined);
        }
        self.advance(SessionState::Confirmed, device);

        // Everything captured here is best effort; reasons are kept with the record
        self.advance(SessionState::PreCapture, device);
        let mut warnings = Vec::new();
        let device_info = keep(DeviceInventory::lookup(self.runner, device)?, &mut warnings);
        let identity_before = keep(query_identity(self.runner, device)?, &mut warnings);
        let pre_sample = sample(request, &mut warnings);

        self.advance(SessionState::Erasing, device);
        mark_erase_committed();
        let started_at = audit_now();
        tracing::info!(device, method = %request.method, dry_run = request.dry_run, "Starting erase");
        let erase = EraseDriver::new(self.runner).run(
            request.method,
            device,
            &request.password,
            request.dry_run,
        )?;
        let ended_at = audit_now();

        self.advance(SessionState::PostCapture, device);
        // Past the erase nothing may abort the session before it is persisted
        let identity_after = match query_identity(self.runner, device) {
            Ok(capture) => capture,
            Err(e) => Capture::Degraded(format!("hdparm -I could not run: {}", e)),
        };
        let identity_after = keep(identity_after, &mut warnings);
        let post_sample = sample(request, &mut warnings);

        self.advance(SessionState::Persisted, device);
        let mut session = SanitizationSession::assemble(SessionEvidence {
            device: device.to_string(),
            method: request.method,
            dry_run: request.dry_run,
            operator: request.operator.clone(),
            session_id: request.session_id.clone(),
            started_at,
            ended_at,
            sample_bytes: request.sample_bytes,
            pre_sample,
            post_sample,
            device_info,
            identity_before,
            identity_after,
            erase,
        });
        if !warnings.is_empty() {
            session
                .extensions
                .insert("capture_warnings".to_string(), serde_json::json!(warnings));
        }

        let persisted = self.sink.persist(&mut session);
        let operator_log = self.operator_log.and_then(|log| match log.append(&session) {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!(device, error = %format!("{:#}", e), "Failed to write operator log");
                None
            }
        });

        self.advance(SessionState::Reported, device);
        println!("{}", render_summary(&session, &persisted));
        if !session.passed() {
            eprintln!("{}", failure_banner(&session));
        }

        Ok(SessionReport {
            session,
            persisted,
            operator_log,
        })
    }
}

// The sampler is not touched at all when sampling is disabled
fn sample(request: &WipeRequest, warnings: &mut Vec<String>) -> Option<IntegritySample> {
    if request.sample_bytes == 0 {
        return None;
    }
    keep(sample_device(&request.device, request.sample_bytes), warnings)
}

fn keep<T>(capture: Capture<T>, warnings: &mut Vec<String>) -> Option<T> {
    if let Capture::Degraded(reason) = &capture {
        warnings.push(reason.clone());
    }
    capture.into_option()
}
