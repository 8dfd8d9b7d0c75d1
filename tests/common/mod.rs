/// Common test utilities and mock infrastructure
///
/// This module provides shared functionality for integration tests including:
/// - A scripted command runner with hdparm and lsblk fixtures
/// - Temp-file drives that stand in for block devices
/// - Operator doubles for the confirmation prompt

#[allow(dead_code)]
pub mod mock_commands;
#[allow(dead_code)]
pub mod mock_drive;
