// Block device inventory from `lsblk -J`
//
// Used to list candidate drives and to enrich audit records. The inventory
// never decides which device is erased.

use super::command::CommandRunner;
use crate::{Capture, SanitizeError, SanitizeResult};
use serde::{Deserialize, Serialize};

const LSBLK_COLUMNS: &str = "NAME,TYPE,SIZE,MODEL,SERIAL,TRAN";

/// Physical disk as reported by lsblk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDevice {
    pub name: String,
    pub path: String,
    pub size: Option<String>,
    pub model: Option<String>,
    pub serial: Option<String>,
    pub transport: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LsblkReport {
    #[serde(default)]
    blockdevices: Vec<LsblkNode>,
}

#[derive(Debug, Deserialize)]
struct LsblkNode {
    name: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    size: Option<String>,
    model: Option<String>,
    serial: Option<String>,
    tran: Option<String>,
    #[serde(default)]
    children: Option<Vec<LsblkNode>>,
}

pub struct DeviceInventory;

impl DeviceInventory {
    /// List physical disks, skipping loop and ram devices
    pub fn list(runner: &dyn CommandRunner) -> SanitizeResult<Vec<BlockDevice>> {
        let output = runner.run("lsblk", &["-J", "-o", LSBLK_COLUMNS])?;

        if !output.success() {
            return Err(SanitizeError::Inventory(format!(
                "lsblk exited with {:?}: {}",
                output.exit_code,
                output.stderr.trim()
            )));
        }

        Self::parse(&output.stdout)
    }

    /// Parse lsblk JSON output into disks
    pub fn parse(json: &str) -> SanitizeResult<Vec<BlockDevice>> {
        let report: LsblkReport = serde_json::from_str(json)
            .map_err(|e| SanitizeError::Inventory(format!("invalid lsblk output: {}", e)))?;

        let mut devices = Vec::new();
        for node in &report.blockdevices {
            Self::walk(node, &mut devices);
        }
        Ok(devices)
    }

    fn walk(node: &LsblkNode, devices: &mut Vec<BlockDevice>) {
        if node.kind.as_deref() == Some("disk") {
            if let Some(name) = node.name.as_deref() {
                if !Self::should_skip_device(name) {
                    devices.push(BlockDevice {
                        name: name.to_string(),
                        path: format!("/dev/{}", name),
                        size: node.size.clone(),
                        model: Self::clean(&node.model),
                        serial: Self::clean(&node.serial),
                        transport: Self::clean(&node.tran),
                    });
                }
            }
        }

        for child in node.children.iter().flatten() {
            Self::walk(child, devices);
        }
    }

    pub(crate) fn should_skip_device(name: &str) -> bool {
        name.starts_with("loop") || name.starts_with("ram")
    }

    // lsblk pads model strings with trailing spaces on some versions
    fn clean(value: &Option<String>) -> Option<String> {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// Look up `device` for audit enrichment.
    ///
    /// Only a missing lsblk binary is fatal; any other inventory problem
    /// degrades to an absent entry.
    pub fn lookup(runner: &dyn CommandRunner, device: &str) -> SanitizeResult<Capture<BlockDevice>> {
        match Self::list(runner) {
            Ok(devices) => Ok(devices
                .into_iter()
                .find(|d| d.path == device)
                .map(Capture::Captured)
                .unwrap_or_else(|| {
                    Capture::Degraded(format!("{} not present in lsblk inventory", device))
                })),
            Err(e @ (SanitizeError::CommandNotFound(_) | SanitizeError::CommandFailed { .. })) => {
                Err(e)
            }
            Err(e) => {
                tracing::warn!(device, error = %e, "Device inventory unavailable");
                Ok(Capture::Degraded(e.to_string()))
            }
        }
    }
}
