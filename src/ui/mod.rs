// Operator-facing terminal output
//
// - summary.rs: post-session summary and device table
// - prompt.rs: typed confirmation before a destructive erase

pub mod prompt;
pub mod summary;

pub use prompt::{Confirmer, TerminalConfirmer};
pub use summary::{failure_banner, render_device_table, render_summary};
