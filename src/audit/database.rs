/// SQLite audit store
///
/// One wide `wipe_logs` row per persisted session: flattened scalar columns
/// for querying, plus the full erase outcome and the full session as JSON
/// payloads. Rows are append-only; persisting the same session twice yields
/// two rows.
use super::record::SanitizationSession;
use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OpenFlags};
use std::path::{Path, PathBuf};

/// Primary audit backend seam
pub trait AuditDatabase {
    /// Insert one session row; any error disqualifies the backend
    fn insert(&mut self, session: &SanitizationSession) -> Result<()>;

    /// Human-readable location for diagnostics
    fn describe(&self) -> String;
}

/// Audit database backed by a SQLite file.
///
/// The connection is opened lazily on the first insert and reused for the
/// rest of the process. SQLite runs in autocommit mode, so every insert is
/// its own transaction.
pub struct SqliteAuditStore {
    db_path: PathBuf,
    conn: Option<Connection>,
}

impl SqliteAuditStore {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            conn: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Open the connection and ensure the schema exists
    pub fn connect(&mut self) -> Result<&Connection> {
        if self.conn.is_none() {
            self.conn = Some(Self::open(&self.db_path)?);
        }
        self.conn
            .as_ref()
            .context("Audit database connection unavailable")
    }

    fn open(db_path: &Path) -> Result<Connection> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create audit database directory {}", parent.display()))?;
        }

        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open audit database {}", db_path.display()))?;

        conn.pragma_update(None, "journal_mode", "WAL")
            .context("Failed to set WAL mode")?;
        conn.pragma_update(None, "synchronous", "FULL")
            .context("Failed to set synchronous mode")?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS wipe_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                record_id TEXT NOT NULL,
                device TEXT NOT NULL,
                method TEXT NOT NULL,
                dry_run INTEGER NOT NULL,
                operator TEXT,
                session_id TEXT,
                started_at TEXT NOT NULL,
                ended_at TEXT NOT NULL,
                logged_at TEXT,
                result TEXT NOT NULL,
                method_success INTEGER NOT NULL,
                pre_sample_bytes INTEGER NOT NULL,
                pre_sample_hash TEXT,
                post_sample_hash TEXT,
                device_name TEXT,
                device_path TEXT,
                device_size TEXT,
                device_model TEXT,
                device_serial TEXT,
                device_transport TEXT,
                identity_before_raw TEXT,
                identity_after_raw TEXT,
                method_result TEXT NOT NULL,
                raw_log TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_wipe_logs_device ON wipe_logs(device);
            CREATE INDEX IF NOT EXISTS idx_wipe_logs_session ON wipe_logs(session_id);
            "#,
        )
        .context("Failed to create audit schema")?;

        Ok(conn)
    }

    /// Number of rows stored
    pub fn count_records(&mut self) -> Result<u64> {
        let conn = self.connect()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM wipe_logs", [], |row| row.get(0))
            .context("Failed to count audit records")?;
        Ok(count as u64)
    }

    /// Row count of an existing database, opened read-only.
    ///
    /// Nothing is created or migrated on disk; a missing file or table is an
    /// error.
    pub fn count_existing_records(db_path: &Path) -> Result<u64> {
        let conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open audit database {}", db_path.display()))?;

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM wipe_logs", [], |row| row.get(0))
            .context("Failed to count audit records")?;
        Ok(count as u64)
    }

    /// Full session payloads, oldest first
    pub fn load_sessions(&mut self) -> Result<Vec<SanitizationSession>> {
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare("SELECT raw_log FROM wipe_logs ORDER BY id")
            .context("Failed to prepare audit query")?;

        let payloads = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .context("Failed to query audit records")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to collect audit records")?;

        payloads
            .iter()
            .map(|json| serde_json::from_str(json).context("Corrupt audit payload"))
            .collect()
    }
}

// Same `Z` form the session JSON uses, so one row never mixes formats
fn column_time(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl AuditDatabase for SqliteAuditStore {
    fn insert(&mut self, session: &SanitizationSession) -> Result<()> {
        let method_result =
            serde_json::to_string(&session.erase).context("Failed to serialize erase outcome")?;
        let raw_log = session
            .to_json_line()
            .context("Failed to serialize session")?;

        let device_info = session.device_info.as_ref();
        let conn = self.connect()?;

        conn.execute(
            r#"
            INSERT INTO wipe_logs (
                record_id, device, method, dry_run, operator, session_id,
                started_at, ended_at, logged_at,
                result, method_success,
                pre_sample_bytes, pre_sample_hash, post_sample_hash,
                device_name, device_path, device_size, device_model, device_serial, device_transport,
                identity_before_raw, identity_after_raw,
                method_result, raw_log
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6,
                ?7, ?8, ?9,
                ?10, ?11,
                ?12, ?13, ?14,
                ?15, ?16, ?17, ?18, ?19, ?20,
                ?21, ?22,
                ?23, ?24
            )
            "#,
            params![
                session.record_id.to_string(),
                session.device,
                session.method.as_str(),
                session.dry_run,
                session.operator,
                session.session_id,
                column_time(session.started_at),
                column_time(session.ended_at),
                session.logged_at.map(column_time),
                session.result.as_str(),
                session.erase.success,
                session.sample_bytes as i64,
                session.pre_sample.as_ref().map(|s| s.digest.as_str()),
                session.post_sample.as_ref().map(|s| s.digest.as_str()),
                device_info.map(|d| d.name.as_str()),
                device_info.map(|d| d.path.as_str()),
                device_info.and_then(|d| d.size.as_deref()),
                device_info.and_then(|d| d.model.as_deref()),
                device_info.and_then(|d| d.serial.as_deref()),
                device_info.and_then(|d| d.transport.as_deref()),
                session.identity_before.as_ref().map(|i| i.raw.as_str()),
                session.identity_after.as_ref().map(|i| i.raw.as_str()),
                method_result,
                raw_log,
            ],
        )
        .context("Failed to insert audit record")?;

        tracing::debug!(record_id = %session.record_id, db = %self.db_path.display(), "Audit record stored in database");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("sqlite:{}", self.db_path.display())
    }
}
