// Drive-facing operations
//
// Organized structure:
// - command.rs: External command execution seam
// - identity.rs: hdparm identity parsing
// - inventory.rs: lsblk device inventory
// - operations/: Vendor erase sequences

pub mod command;
pub mod identity;
pub mod inventory;
pub mod operations;


// Re-exports for convenience
pub use command::{CommandOutput, CommandRunner, SystemCommandRunner};
pub use identity::{parse_identity, query_identity, DeviceIdentity, SecurityFeatures};
pub use inventory::{BlockDevice, DeviceInventory};
pub use operations::{EraseDriver, EraseOutcome, EraseStep, DEFAULT_ERASE_PASSWORD};
