use crate::Capture;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// Read granularity, independent of the requested sample size
const CHUNK_SIZE: usize = 1024 * 1024;

/// Suggested sample size for operators (10 MiB)
pub const SUGGESTED_SAMPLE_BYTES: u64 = 10 * 1024 * 1024;

/// SHA-256 digest over the leading bytes of a device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegritySample {
    pub algorithm: String,
    pub bytes_requested: u64,
    /// Fewer than requested when the device ended early
    pub bytes_read: u64,
    pub digest: String,
}

impl IntegritySample {
    /// Two samples cover the same region when they read the same byte count
    pub fn matches(&self, other: &IntegritySample) -> bool {
        self.bytes_read == other.bytes_read && self.digest == other.digest
    }
}

/// Digest the first `count` bytes of `path`.
///
/// `count == 0` skips sampling without touching the device. Read failures
/// are reported as a warning and yield `Capture::Degraded`; they never abort
/// a session.
pub fn sample_device(path: impl AsRef<Path>, count: u64) -> Capture<IntegritySample> {
    let path = path.as_ref();
    if count == 0 {
        return Capture::Skipped;
    }

    match digest_prefix(path, count) {
        Ok(sample) => {
            tracing::debug!(
                device = %path.display(),
                bytes_read = sample.bytes_read,
                digest = %sample.digest,
                "Integrity sample captured"
            );
            Capture::Captured(sample)
        }
        Err(e) => {
            tracing::warn!(device = %path.display(), error = %e, "Could not read integrity sample");
            Capture::Degraded(format!("Could not read sample from {}: {}", path.display(), e))
        }
    }
}

fn digest_prefix(path: &Path, count: u64) -> std::io::Result<IntegritySample> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; CHUNK_SIZE.min(count as usize)];
    let mut remaining = count;

    while remaining > 0 {
        let want = (remaining as usize).min(buffer.len());
        let read = match file.read(&mut buffer[..want]) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..read]);
        remaining -= read as u64;
    }

    Ok(IntegritySample {
        algorithm: "sha256".to_string(),
        bytes_requested: count,
        bytes_read: count - remaining,
        digest: format!("{:x}", hasher.finalize()),
    })
}
