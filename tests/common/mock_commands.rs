/// Mock command execution infrastructure for testing
///
/// Every external tool (hdparm, lsblk) is reached through `CommandRunner`, so
/// a registry of canned outputs is enough to drive full sessions.
use drive_wiper::drives::{CommandOutput, CommandRunner};
use drive_wiper::ui::Confirmer;
use drive_wiper::{SanitizeError, SanitizeResult, WipeMethod};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Mock command output
#[derive(Clone, Debug)]
pub struct MockCommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl MockCommandOutput {
    pub fn success(stdout: &str) -> Self {
        Self {
            stdout: stdout.to_string(),
            stderr: String::new(),
            exit_code: 0,
        }
    }

    pub fn failure(exit_code: i32, stderr: &str) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.to_string(),
            exit_code,
        }
    }
}

/// Mock command registry keyed by the full command line
#[derive(Clone, Default)]
pub struct MockCommandRegistry {
    commands: Arc<Mutex<HashMap<String, MockCommandOutput>>>,
    history: Arc<Mutex<Vec<String>>>,
}

impl MockCommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mock command response
    pub fn register(&self, command_line: &str, output: MockCommandOutput) {
        self.commands
            .lock()
            .unwrap()
            .insert(command_line.to_string(), output);
    }

    /// Command lines run so far, in order
    pub fn history(&self) -> Vec<String> {
        self.history.lock().unwrap().clone()
    }

    pub fn ran(&self, fragment: &str) -> bool {
        self.history().iter().any(|c| c.contains(fragment))
    }
}

impl CommandRunner for MockCommandRegistry {
    fn run(&self, program: &str, args: &[&str]) -> SanitizeResult<CommandOutput> {
        let line = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        self.history.lock().unwrap().push(line.clone());

        match self.commands.lock().unwrap().get(&line) {
            Some(output) => Ok(CommandOutput {
                exit_code: Some(output.exit_code),
                stdout: output.stdout.clone(),
                stderr: output.stderr.clone(),
            }),
            None if program == "hdparm" || program == "lsblk" => Ok(CommandOutput {
                exit_code: Some(1),
                stdout: String::new(),
                stderr: format!("no mock registered for: {}", line),
            }),
            None => Err(SanitizeError::CommandNotFound(program.to_string())),
        }
    }
}

/// Mock hdparm output
pub struct MockHdparmData;

impl MockHdparmData {
    /// hdparm -I output of a SATA HDD with secure erase available
    pub fn secure_erase_supported(model: &str, serial: &str) -> String {
        format!(
            "
/dev/sda:

ATA device, with non-removable media
\tModel Number:       {}
\tSerial Number:      {}
\tFirmware Revision:  01.01A01
\tTransport:          Serial, SATA 1.0a, SATA II Extensions, SATA Rev 2.5, SATA Rev 2.6, SATA Rev 3.0
Configuration:
\tLBA    user addressable sectors:  1953525168
\tdevice size with M = 1024*1024:      953869 MBytes
\tdevice size with M = 1000*1000:     1000204 MBytes (1000 GB)
Commands/features:
\tEnabled\tSupported:
\t   *\tSMART feature set
\t   *\tSecurity Mode feature set
Security:
\tMaster password revision code = 65534
\t\tsupported
\tnot\tenabled
\tnot\tlocked
\tnot\tfrozen
\tnot\texpired: security count
\t\tsupported: enhanced erase
\t104min for SECURITY ERASE UNIT. 104min for ENHANCED SECURITY ERASE UNIT.
Logical Unit WWN Device Identifier: 50014ee20b123456
Checksum: correct
",
            model, serial
        )
    }

    /// Same drive with the security password set by a completed or
    /// interrupted erase
    pub fn security_enabled(model: &str, serial: &str) -> String {
        Self::secure_erase_supported(model, serial).replace("\tnot\tenabled", "\t\tenabled")
    }

    /// Frozen drive: the erase commands will be rejected
    pub fn frozen(model: &str, serial: &str) -> String {
        Self::secure_erase_supported(model, serial).replace("\tnot\tfrozen", "\t\tfrozen")
    }
}

/// Mock lsblk output
pub struct MockLsblkData;

impl MockLsblkData {
    /// `lsblk -J -o NAME,TYPE,SIZE,MODEL,SERIAL,TRAN` with one partitioned disk
    pub fn single_disk(name: &str, model: &str, serial: &str) -> String {
        serde_json::json!({
            "blockdevices": [
                {"name": "loop0", "type": "loop", "size": "55.4M", "model": null, "serial": null, "tran": null},
                {
                    "name": name, "type": "disk", "size": "931.5G",
                    "model": format!("{}   ", model), "serial": serial, "tran": "sata",
                    "children": [
                        {"name": format!("{}1", name), "type": "part", "size": "931.5G", "model": null, "serial": null, "tran": null}
                    ]
                }
            ]
        })
        .to_string()
    }
}

/// Command lines issued for an ATA secure erase of `device`
pub fn set_pass_command(device: &str) -> String {
    format!("hdparm --user-master u --security-set-pass p {}", device)
}

pub fn erase_command(device: &str) -> String {
    format!("hdparm --user-master u --security-erase p {}", device)
}

pub fn identify_command(device: &str) -> String {
    format!("hdparm -I {}", device)
}

/// Confirmer that always gives the same answer
pub struct FixedAnswer(pub bool);

impl Confirmer for FixedAnswer {
    fn confirm(&self, _device: &str, _method: WipeMethod) -> SanitizeResult<bool> {
        Ok(self.0)
    }
}
