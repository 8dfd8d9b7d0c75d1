use crate::drives::{BlockDevice, DeviceIdentity, EraseOutcome};
use crate::verification::IntegritySample;
use crate::WipeMethod;
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Overall verdict of a sanitization session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionVerdict {
    Pass,
    Fail,
}

impl SessionVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionVerdict::Pass => "PASS",
            SessionVerdict::Fail => "FAIL",
        }
    }
}

impl std::fmt::Display for SessionVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the sampled region changed across the erase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleComparison {
    Changed,
    /// Suspicious: the erase may not have reached the sampled region
    Unchanged,
}

/// Audit timestamps are whole-second UTC
pub fn audit_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

/// Everything captured about one session, before assembly
#[derive(Debug, Clone)]
pub struct SessionEvidence {
    pub device: String,
    pub method: WipeMethod,
    pub dry_run: bool,
    pub operator: Option<String>,
    pub session_id: Option<String>,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub sample_bytes: u64,
    pub pre_sample: Option<IntegritySample>,
    pub post_sample: Option<IntegritySample>,
    pub device_info: Option<BlockDevice>,
    pub identity_before: Option<DeviceIdentity>,
    pub identity_after: Option<DeviceIdentity>,
    pub erase: EraseOutcome,
}

/// The unit of audit: one complete attempt to erase one device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SanitizationSession {
    pub record_id: Uuid,
    pub device: String,
    pub method: WipeMethod,
    pub dry_run: bool,
    pub operator: Option<String>,
    pub session_id: Option<String>,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    /// Assigned by the audit sink when the record is persisted
    pub logged_at: Option<DateTime<Utc>>,
    pub sample_bytes: u64,
    pub pre_sample: Option<IntegritySample>,
    pub post_sample: Option<IntegritySample>,
    pub device_info: Option<BlockDevice>,
    pub identity_before: Option<DeviceIdentity>,
    pub identity_after: Option<DeviceIdentity>,
    pub erase: EraseOutcome,
    pub result: SessionVerdict,
    /// Forward-compatible extra data, stored opaquely
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub extensions: serde_json::Map<String, serde_json::Value>,
}

impl SanitizationSession {
    /// Assemble a session. The verdict is derived from the erase outcome.
    pub fn assemble(evidence: SessionEvidence) -> Self {
        let result = if evidence.erase.success {
            SessionVerdict::Pass
        } else {
            SessionVerdict::Fail
        };

        Self {
            record_id: Uuid::new_v4(),
            device: evidence.device,
            method: evidence.method,
            dry_run: evidence.dry_run,
            operator: evidence.operator,
            session_id: evidence.session_id,
            started_at: evidence.started_at,
            ended_at: evidence.ended_at,
            logged_at: None,
            sample_bytes: evidence.sample_bytes,
            pre_sample: evidence.pre_sample,
            post_sample: evidence.post_sample,
            device_info: evidence.device_info,
            identity_before: evidence.identity_before,
            identity_after: evidence.identity_after,
            erase: evidence.erase,
            result,
            extensions: serde_json::Map::new(),
        }
    }

    pub fn passed(&self) -> bool {
        self.result == SessionVerdict::Pass
    }

    /// Present only when both samples were captured
    pub fn sample_comparison(&self) -> Option<SampleComparison> {
        match (&self.pre_sample, &self.post_sample) {
            (Some(pre), Some(post)) if pre.matches(post) => Some(SampleComparison::Unchanged),
            (Some(_), Some(_)) => Some(SampleComparison::Changed),
            _ => None,
        }
    }

    pub fn duration(&self) -> std::time::Duration {
        (self.ended_at - self.started_at)
            .to_std()
            .unwrap_or_default()
    }

    /// Serialize as one JSON line (no trailing newline)
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
