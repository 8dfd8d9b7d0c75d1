use super::database::{AuditDatabase, SqliteAuditStore};
use super::file::FallbackLog;
use super::record::{audit_now, SanitizationSession};
use crate::config::AuditConfig;
use std::path::{Path, PathBuf};

/// Where a session record ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    Database,
    FallbackFile(PathBuf),
    /// Both backends failed; the record was printed to stderr
    Console,
}

impl PersistOutcome {
    pub fn describe(&self) -> String {
        match self {
            PersistOutcome::Database => "database".to_string(),
            PersistOutcome::FallbackFile(path) => format!("file {}", path.display()),
            PersistOutcome::Console => "stderr only (all audit backends failed)".to_string(),
        }
    }
}

/// Audit sink with database-first, file-fallback persistence.
///
/// The first database failure clears `database_eligible` for the rest of the
/// process; later sessions go straight to the fallback file. One sink is
/// built per process and lent to each session by `&mut`.
pub struct AuditSink {
    database: Option<Box<dyn AuditDatabase>>,
    database_eligible: bool,
    fallback: FallbackLog,
}

impl AuditSink {
    pub fn new(database: Option<Box<dyn AuditDatabase>>, fallback: FallbackLog) -> Self {
        let database_eligible = database.is_some();
        Self {
            database,
            database_eligible,
            fallback,
        }
    }

    pub fn from_config(config: &AuditConfig) -> Self {
        let database: Option<Box<dyn AuditDatabase>> = if config.db_enabled {
            Some(Box::new(SqliteAuditStore::new(&config.db_path)))
        } else {
            None
        };
        Self::new(database, FallbackLog::new(&config.log_fallback_dir, audit_now()))
    }

    pub fn database_eligible(&self) -> bool {
        self.database_eligible
    }

    pub fn fallback_path(&self) -> &Path {
        self.fallback.path()
    }

    /// Persist one session. Never fails: the outcome reports where the
    /// record landed.
    pub fn persist(&mut self, session: &mut SanitizationSession) -> PersistOutcome {
        session.logged_at = Some(audit_now());

        if self.database_eligible {
            if let Some(database) = self.database.as_mut() {
                match database.insert(session) {
                    Ok(()) => return PersistOutcome::Database,
                    Err(e) => {
                        self.database_eligible = false;
                        tracing::warn!(
                            db = %database.describe(),
                            error = %format!("{:#}", e),
                            "Audit database failed, switching to file logging for the rest of this run"
                        );
                    }
                }
            }
        }

        match self.fallback.append(session) {
            Ok(()) => {
                tracing::info!(path = %self.fallback.path().display(), record_id = %session.record_id, "Audit record written to file");
                PersistOutcome::FallbackFile(self.fallback.path().to_path_buf())
            }
            Err(e) => {
                tracing::error!(
                    path = %self.fallback.path().display(),
                    error = %format!("{:#}", e),
                    "Failed to write audit record to file"
                );
                match session.to_json_line() {
                    Ok(line) => eprintln!("AUDIT RECORD (unpersisted): {}", line),
                    Err(_) => eprintln!("AUDIT RECORD (unpersisted): {:?}", session),
                }
                PersistOutcome::Console
            }
        }
    }
}
