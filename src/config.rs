// Audit configuration
//
// Read from the process environment through the `config` crate. Every key is
// optional; unset and empty values fall back to the defaults below.

use crate::SanitizeResult;
use config::{Config, Environment};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

pub const DEFAULT_DB_PATH: &str = "/var/lib/drive-wiper/audit.db";
pub const DEFAULT_FALLBACK_DIR: &str = "/wiper/logs";
pub const DEFAULT_WIPE_LOG_DIR: &str = "/var/wipelog";

/// Where audit records go
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditConfig {
    /// `DB_ENABLED`: only the literal `true` (any case) enables the database
    pub db_enabled: bool,
    /// `DB_PATH`
    pub db_path: PathBuf,
    /// `LOG_FALLBACK_DIR`
    pub log_fallback_dir: PathBuf,
    /// `WIPE_LOG_DIR`
    pub wipe_log_dir: PathBuf,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            db_enabled: false,
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            log_fallback_dir: PathBuf::from(DEFAULT_FALLBACK_DIR),
            wipe_log_dir: PathBuf::from(DEFAULT_WIPE_LOG_DIR),
        }
    }
}

// Values are kept as strings so a malformed DB_ENABLED disables the
// database instead of failing the run
#[derive(Debug, Default, Deserialize)]
struct RawAuditConfig {
    db_enabled: Option<String>,
    db_path: Option<String>,
    log_fallback_dir: Option<String>,
    wipe_log_dir: Option<String>,
}

impl AuditConfig {
    /// Load from the process environment
    pub fn from_env() -> SanitizeResult<Self> {
        Self::load(Environment::default().ignore_empty(true))
    }

    /// Load from an explicit variable map instead of the process environment
    pub fn from_map(vars: HashMap<String, String>) -> SanitizeResult<Self> {
        Self::load(Environment::default().ignore_empty(true).source(Some(vars)))
    }

    fn load(source: Environment) -> SanitizeResult<Self> {
        let raw: RawAuditConfig = Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()?;

        let defaults = Self::default();
        let config = Self {
            db_enabled: raw
                .db_enabled
                .map(|v| v.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(defaults.db_enabled),
            db_path: raw.db_path.map(PathBuf::from).unwrap_or(defaults.db_path),
            log_fallback_dir: raw
                .log_fallback_dir
                .map(PathBuf::from)
                .unwrap_or(defaults.log_fallback_dir),
            wipe_log_dir: raw
                .wipe_log_dir
                .map(PathBuf::from)
                .unwrap_or(defaults.wipe_log_dir),
        };

        tracing::debug!(?config, "Audit configuration loaded");
        Ok(config)
    }
}
