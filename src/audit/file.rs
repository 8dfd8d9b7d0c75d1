// Append-only JSONL audit files
//
// - FallbackLog: the Audit Sink's secondary backend, one file per process run
// - OperatorLog: date-partitioned review log written after every session

use super::record::SanitizationSession;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

fn append_line(path: &Path, session: &SanitizationSession) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }

    let mut line = session
        .to_json_line()
        .context("Failed to serialize session")?;
    line.push('\n');

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    // Single write so concurrent appenders never interleave within a record
    file.write_all(line.as_bytes())
        .with_context(|| format!("Failed to append to {}", path.display()))?;
    file.sync_data()
        .with_context(|| format!("Failed to sync {}", path.display()))?;

    Ok(())
}

/// Fallback audit file. The path is fixed at construction so every session
/// of one process run lands in the same file.
#[derive(Debug, Clone)]
pub struct FallbackLog {
    path: PathBuf,
}

impl FallbackLog {
    /// `<dir>/wipe_session_<YYYYmmdd_HHMMSS>.jsonl`, stamped with `started`
    pub fn new(dir: impl AsRef<Path>, started: DateTime<Utc>) -> Self {
        let name = format!("wipe_session_{}.jsonl", started.format("%Y%m%d_%H%M%S"));
        Self {
            path: dir.as_ref().join(name),
        }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, session: &SanitizationSession) -> Result<()> {
        append_line(&self.path, session)
    }
}

/// Date-partitioned operator review log: `<dir>/wipes-YYYY-MM-DD.jsonl`
#[derive(Debug, Clone)]
pub struct OperatorLog {
    dir: PathBuf,
}

impl OperatorLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, at: DateTime<Utc>) -> PathBuf {
        self.dir
            .join(format!("wipes-{}.jsonl", at.format("%Y-%m-%d")))
    }

    /// Append `session` to the file for its logging date
    pub fn append(&self, session: &SanitizationSession) -> Result<PathBuf> {
        let at = session.logged_at.unwrap_or(session.ended_at);
        let path = self.path_for(at);
        append_line(&path, session)?;
        Ok(path)
    }
}
