use crate::audit::{PersistOutcome, SampleComparison, SanitizationSession, SessionVerdict};
use crate::drives::BlockDevice;
use colored::Colorize;
use std::fmt::Write;

const NOT_SET: &str = "(not set)";

/// Human-readable summary of a finished session
pub fn render_summary(session: &SanitizationSession, persisted: &PersistOutcome) -> String {
    let mut out = String::new();
    let title = if session.dry_run {
        "=== WIPE SUMMARY (DRY RUN) ==="
    } else {
        "=== WIPE SUMMARY ==="
    };
    let _ = writeln!(out, "\n{}", title.bold());

    let _ = writeln!(out, "Device     : {}", session.device);
    if let Some(info) = &session.device_info {
        let _ = writeln!(out, "Model      : {}", info.model.as_deref().unwrap_or(""));
        let _ = writeln!(out, "Serial     : {}", info.serial.as_deref().unwrap_or(""));
        let _ = writeln!(out, "Size       : {}", info.size.as_deref().unwrap_or(""));
        let _ = writeln!(out, "Transport  : {}", info.transport.as_deref().unwrap_or(""));
    } else if let Some(identity) = &session.identity_before {
        // hdparm identity stands in when lsblk had nothing for this device
        let _ = writeln!(out, "Model      : {}", identity.model.as_deref().unwrap_or(""));
        let _ = writeln!(out, "Serial     : {}", identity.serial.as_deref().unwrap_or(""));
        let _ = writeln!(out, "Firmware   : {}", identity.firmware.as_deref().unwrap_or(""));
    }

    let _ = writeln!(out, "Method     : {}", session.method);
    let _ = writeln!(out, "Dry run    : {}", session.dry_run);
    let _ = writeln!(out, "Operator   : {}", session.operator.as_deref().unwrap_or(NOT_SET));
    let _ = writeln!(out, "Session ID : {}", session.session_id.as_deref().unwrap_or(NOT_SET));
    let _ = writeln!(out, "Started    : {}", session.started_at.to_rfc3339());
    let _ = writeln!(out, "Ended      : {}", session.ended_at.to_rfc3339());
    let _ = writeln!(
        out,
        "Duration   : {}",
        humantime::format_duration(session.duration())
    );

    let verdict = match session.result {
        SessionVerdict::Pass => session.result.as_str().green().bold(),
        SessionVerdict::Fail => session.result.as_str().red().bold(),
    };
    let _ = writeln!(out, "Result     : {}", verdict);
    let _ = writeln!(out, "Audit log  : {}", persisted.describe());

    if let (Some(pre), Some(post), Some(comparison)) = (
        &session.pre_sample,
        &session.post_sample,
        session.sample_comparison(),
    ) {
        let _ = writeln!(out, "Pre-hash   : {}", pre.digest);
        let _ = writeln!(out, "Post-hash  : {}", post.digest);
        let matched = match comparison {
            SampleComparison::Unchanged => "YES (unchanged sample!)".yellow(),
            SampleComparison::Changed => "NO (sample changed)".normal(),
        };
        let _ = writeln!(out, "Hash match : {}", matched);
    }

    out
}

/// Banner printed to stderr when the erase did not succeed
pub fn failure_banner(session: &SanitizationSession) -> String {
    let reason = session
        .erase
        .error
        .as_deref()
        .map(|e| format!(" ({})", e))
        .unwrap_or_default();
    format!(
        "\n{}{} See the audit log for details.",
        "[ERROR] Wipe reported failure.".red().bold(),
        reason
    )
}

/// Fixed-width table for `--list`
pub fn render_device_table(devices: &[BlockDevice]) -> String {
    if devices.is_empty() {
        return "No disks found.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<12} {:<10} {:<6} {:<20} MODEL",
        "DEVICE", "SIZE", "TRAN", "SERIAL"
    );
    let _ = writeln!(out, "{}", "-".repeat(80));
    for device in devices {
        let _ = writeln!(
            out,
            "{:<12} {:<10} {:<6} {:<20} {}",
            device.path,
            device.size.as_deref().unwrap_or(""),
            device.transport.as_deref().unwrap_or(""),
            device.serial.as_deref().unwrap_or(""),
            device.model.as_deref().unwrap_or("")
        );
    }
    out
}
