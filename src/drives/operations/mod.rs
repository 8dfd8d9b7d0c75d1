// Drive operations
//
// Vendor erase command sequences

pub mod secure_erase; // ATA Security Erase via hdparm

// Re-exports for convenience
pub use secure_erase::{
    EraseDriver, EraseOutcome, EraseStep, DEFAULT_ERASE_PASSWORD, STEP_ERASE, STEP_SET_PASSWORD,
};
