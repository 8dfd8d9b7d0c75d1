// Audit trail for sanitization sessions
//
// Organized structure:
// - record.rs: SanitizationSession and its verdict
// - database.rs: SQLite primary backend
// - file.rs: JSONL fallback file and operator day log
// - sink.rs: AuditSink with the one-way database failover latch

pub mod database;
pub mod file;
pub mod record;
pub mod sink;

// Re-exports for convenience
pub use database::{AuditDatabase, SqliteAuditStore};
pub use file::{FallbackLog, OperatorLog};
pub use record::{audit_now, SampleComparison, SanitizationSession, SessionEvidence, SessionVerdict};
pub use sink::{AuditSink, PersistOutcome};
