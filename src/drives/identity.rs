// Device identity parsing
//
// Turns `hdparm -I` output into a `DeviceIdentity`. Parsing is line-oriented
// with a two-state machine: the ATA "Security:" section has no terminator and
// ends at the first non-blank line that is not indented beneath it.

use super::command::CommandRunner;
use crate::{Capture, SanitizeResult};
use serde::{Deserialize, Serialize};

const MODEL_LABEL: &str = "Model Number:";
const SERIAL_LABEL: &str = "Serial Number:";
const FIRMWARE_LABEL: &str = "Firmware Revision:";
const SIZE_MARKER: &str = "device size with M = 1000*1000:";
const SECURITY_HEADER: &str = "Security:";

/// Snapshot of what a drive reports about itself. Fields the drive did not
/// report stay `None`; `raw` always holds the unmodified tool output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firmware: Option<String>,
    /// Decimal-unit size line, e.g. "500107 MBytes (500 GB)"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_size: Option<String>,
    #[serde(default)]
    pub security: SecurityFeatures,
    pub raw: String,
}

/// ATA security feature set as reported in the "Security:" section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityFeatures {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supported: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frozen: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enhanced_erase_supported: Option<bool>,
    /// First erase-timing line, verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub erase_time: Option<String>,
}

impl SecurityFeatures {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    Normal,
    Security,
}

/// Line-by-line parser over identity text
struct IdentityParser {
    state: ParseState,
    identity: DeviceIdentity,
}

impl IdentityParser {
    fn new(raw: &str) -> Self {
        Self {
            state: ParseState::Normal,
            identity: DeviceIdentity {
                raw: raw.to_string(),
                ..Default::default()
            },
        }
    }

    fn feed(&mut self, line: &str) {
        let stripped = line.trim();

        self.parse_identity_fields(stripped);

        if stripped.starts_with(SECURITY_HEADER) {
            self.state = ParseState::Security;
            return;
        }

        if self.state == ParseState::Security {
            if !stripped.is_empty() && !line.starts_with(&[' ', '\t'][..]) {
                self.state = ParseState::Normal;
                return;
            }
            self.parse_security_line(stripped);
        }
    }

    fn parse_identity_fields(&mut self, stripped: &str) {
        if let Some(value) = stripped.strip_prefix(MODEL_LABEL) {
            self.identity.model = Some(value.trim().to_string());
        } else if let Some(value) = stripped.strip_prefix(SERIAL_LABEL) {
            self.identity.serial = Some(value.trim().to_string());
        } else if let Some(value) = stripped.strip_prefix(FIRMWARE_LABEL) {
            self.identity.firmware = Some(value.trim().to_string());
        }

        if stripped.contains(SIZE_MARKER) {
            if let Some((_, value)) = stripped.split_once(':') {
                self.identity.reported_size = Some(value.trim().to_string());
            }
        }
    }

    fn parse_security_line(&mut self, stripped: &str) {
        if stripped.is_empty() {
            return;
        }

        let lower = stripped.to_lowercase();
        let negated = contains_negation(&lower);
        let value = !negated;
        let flag_text = strip_negation_prefix(&lower);
        let security = &mut self.identity.security;

        if flag_text.starts_with("enabled") {
            security.enabled = Some(value);
        } else if flag_text.starts_with("locked") {
            security.locked = Some(value);
        } else if flag_text.starts_with("frozen") {
            security.frozen = Some(value);
        } else if lower.contains("enhanced erase") {
            security.enhanced_erase_supported = Some(value);
        } else if lower.contains("supported") {
            security.supported = Some(value);
        }

        if security.erase_time.is_none()
            && (lower.contains("erase time") || lower.contains("security erase unit"))
        {
            security.erase_time = Some(stripped.to_string());
        }
    }

    fn finish(self) -> DeviceIdentity {
        self.identity
    }
}

fn contains_negation(lower: &str) -> bool {
    lower
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| word == "not")
}

/// hdparm prints negated flags as "not\tenabled"; drop the leading token
fn strip_negation_prefix(lower: &str) -> &str {
    match lower.strip_prefix("not") {
        Some(rest) if rest.starts_with(char::is_whitespace) => rest.trim_start(),
        _ => lower,
    }
}

/// Parse raw identity text. Never fails: unparseable input yields a record
/// holding only `raw`.
pub fn parse_identity(text: &str) -> DeviceIdentity {
    let mut parser = IdentityParser::new(text);
    for line in text.lines() {
        parser.feed(line);
    }
    parser.finish()
}

/// Query and parse the identity of `device` with `hdparm -I`.
///
/// Only an hdparm binary that cannot be launched is an error; a failing or
/// silent query degrades to an absent identity.
pub fn query_identity(
    runner: &dyn CommandRunner,
    device: &str,
) -> SanitizeResult<Capture<DeviceIdentity>> {
    let output = runner.run("hdparm", &["-I", device])?;

    if !output.success() || output.stdout.trim().is_empty() {
        let reason = format!(
            "hdparm -I exited with {:?}: {}",
            output.exit_code,
            output.stderr.trim()
        );
        tracing::warn!(device, %reason, "Identity query failed");
        return Ok(Capture::Degraded(reason));
    }

    Ok(Capture::Captured(parse_identity(&output.stdout)))
}
