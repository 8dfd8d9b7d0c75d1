/// End-to-end sanitization sessions
///
/// Full orchestrator runs against temp-file drives and mocked hdparm/lsblk,
/// with the audit trail written to temp directories.
use drive_wiper::audit::{AuditSink, FallbackLog, OperatorLog, SampleComparison};
use drive_wiper::drives::{CommandOutput, CommandRunner, DeviceInventory};
use drive_wiper::{
    PersistOutcome, SanitizationSession, SanitizeError, SanitizeResult, SessionVerdict,
    WipeOrchestrator, WipeRequest,
};
use std::path::Path;
use tempfile::TempDir;

#[path = "common/mod.rs"]
mod common;

use common::mock_commands::{
    erase_command, identify_command, set_pass_command, FixedAnswer, MockCommandOutput,
    MockCommandRegistry, MockHdparmData, MockLsblkData,
};
use common::mock_drive::MockDrive;

const MODEL: &str = "WDC WD10EZEX-08WN4A0";
const SERIAL: &str = "WD-WCC6Y0123456";

fn file_sink(dir: &TempDir) -> AuditSink {
    AuditSink::new(None, FallbackLog::new(dir.path().join("fallback"), drive_wiper::audit::audit_now()))
}

fn read_sessions(path: &Path) -> Vec<SanitizationSession> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

/// Registry wrapper that zero-fills the drive when the erase command runs
struct ErasingRunner<'a> {
    inner: MockCommandRegistry,
    drive: std::cell::RefCell<&'a mut MockDrive>,
}

impl CommandRunner for ErasingRunner<'_> {
    fn run(&self, program: &str, args: &[&str]) -> SanitizeResult<CommandOutput> {
        let output = self.inner.run(program, args)?;
        if args.contains(&"--security-erase") && output.success() {
            self.drive.borrow_mut().fill(0x00)?;
        }
        Ok(output)
    }
}

#[test]
fn test_dry_run_session_end_to_end() {
    let audit_dir = TempDir::new().unwrap();
    let drive = MockDrive::create(4).unwrap();
    let device = drive.path_str().to_string();

    let registry = MockCommandRegistry::new();
    registry.register(
        &identify_command(&device),
        MockCommandOutput::success(&MockHdparmData::secure_erase_supported(MODEL, SERIAL)),
    );

    let mut sink = file_sink(&audit_dir);
    let operator_log = OperatorLog::new(audit_dir.path().join("wipes"));
    let mut request = WipeRequest::new(device.clone());
    request.dry_run = true;
    request.sample_bytes = 1024 * 1024;
    request.session_id = Some("TICKET-42".to_string());

    let report = WipeOrchestrator::new(&registry, &mut sink, &FixedAnswer(false))
        .with_operator_log(&operator_log)
        .run(&request)
        .unwrap();

    let session = &report.session;
    assert_eq!(session.result, SessionVerdict::Pass);
    assert!(session.dry_run);
    assert_eq!(session.erase.steps.len(), 2);
    assert!(session.erase.steps.iter().all(|s| s.simulated));
    assert_eq!(session.pre_sample.as_ref().unwrap().bytes_read, 1024 * 1024);
    assert_eq!(session.sample_comparison(), Some(SampleComparison::Unchanged));

    let identity = session.identity_before.as_ref().unwrap();
    assert_eq!(identity.model.as_deref(), Some(MODEL));
    assert_eq!(identity.serial.as_deref(), Some(SERIAL));
    assert_eq!(identity.security.supported, Some(true));
    assert_eq!(identity.security.enabled, Some(false));
    assert_eq!(identity.security.enhanced_erase_supported, Some(true));

    assert!(!registry.ran("--security-set-pass"));
    assert!(!registry.ran("--security-erase"));

    // Both the fallback file and the operator log hold the same record
    let PersistOutcome::FallbackFile(fallback) = &report.persisted else {
        panic!("expected file persistence, got {:?}", report.persisted);
    };
    let stored = read_sessions(fallback);
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].record_id, session.record_id);
    assert_eq!(stored[0].session_id.as_deref(), Some("TICKET-42"));

    let day_log = read_sessions(report.operator_log.as_ref().unwrap());
    assert_eq!(day_log[0].record_id, session.record_id);
}

#[test]
fn test_real_erase_changes_sample() {
    let audit_dir = TempDir::new().unwrap();
    let mut drive = MockDrive::create(2).unwrap();
    let device = drive.path_str().to_string();

    let registry = MockCommandRegistry::new();
    registry.register(
        &identify_command(&device),
        MockCommandOutput::success(&MockHdparmData::secure_erase_supported(MODEL, SERIAL)),
    );
    registry.register(&set_pass_command(&device), MockCommandOutput::success(""));
    registry.register(&erase_command(&device), MockCommandOutput::success(""));

    let runner = ErasingRunner {
        inner: registry.clone(),
        drive: std::cell::RefCell::new(&mut drive),
    };

    let mut sink = file_sink(&audit_dir);
    let mut request = WipeRequest::new(device.clone());
    request.sample_bytes = 64 * 1024;
    request.operator = Some("alice".to_string());

    let report = WipeOrchestrator::new(&runner, &mut sink, &FixedAnswer(true))
        .run(&request)
        .unwrap();

    assert!(report.passed());
    assert!(!report.session.dry_run);
    assert_eq!(report.session.sample_comparison(), Some(SampleComparison::Changed));
    assert_eq!(
        registry.history().iter().filter(|c| c.contains("--user-master")).count(),
        2
    );
}

#[test]
fn test_frozen_drive_session_fails_but_is_audited() {
    let audit_dir = TempDir::new().unwrap();
    let drive = MockDrive::create(1).unwrap();
    let device = drive.path_str().to_string();

    let registry = MockCommandRegistry::new();
    registry.register(
        &identify_command(&device),
        MockCommandOutput::success(&MockHdparmData::frozen(MODEL, SERIAL)),
    );
    registry.register(
        &set_pass_command(&device),
        MockCommandOutput::failure(5, "SECURITY_SET_PASS: Input/output error"),
    );

    let mut sink = file_sink(&audit_dir);
    let mut request = WipeRequest::new(device.clone());
    request.assume_yes = true;

    let report = WipeOrchestrator::new(&registry, &mut sink, &FixedAnswer(false))
        .run(&request)
        .unwrap();

    let session = &report.session;
    assert_eq!(session.result, SessionVerdict::Fail);
    assert_eq!(session.erase.steps.len(), 1);
    assert_eq!(session.erase.steps[0].exit_code, Some(5));
    assert_eq!(
        session.identity_before.as_ref().unwrap().security.frozen,
        Some(true)
    );
    assert!(!registry.ran("--security-erase"));

    let stored = read_sessions(sink.fallback_path());
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].result, SessionVerdict::Fail);
    assert_eq!(
        stored[0].erase.error.as_deref(),
        Some("Failed to set security password")
    );
}

#[test]
fn test_declined_session_leaves_no_trace() {
    let audit_dir = TempDir::new().unwrap();
    let drive = MockDrive::create(1).unwrap();
    let registry = MockCommandRegistry::new();
    let mut sink = file_sink(&audit_dir);

    let result = WipeOrchestrator::new(&registry, &mut sink, &FixedAnswer(false))
        .run(&WipeRequest::new(drive.path_str()));

    assert!(matches!(result, Err(SanitizeError::Declined)));
    assert!(registry.history().is_empty());
    assert!(!sink.fallback_path().exists());
}

#[test]
fn test_inventory_listing() {
    let registry = MockCommandRegistry::new();
    registry.register(
        "lsblk -J -o NAME,TYPE,SIZE,MODEL,SERIAL,TRAN",
        MockCommandOutput::success(&MockLsblkData::single_disk("sdb", MODEL, SERIAL)),
    );

    let devices = DeviceInventory::list(&registry).unwrap();
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].path, "/dev/sdb");
    assert_eq!(devices[0].model.as_deref(), Some(MODEL));
    assert_eq!(devices[0].transport.as_deref(), Some("sata"));
}
