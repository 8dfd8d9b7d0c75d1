// External command execution
//
// Every vendor tool (hdparm, lsblk) is reached through `CommandRunner` so the
// session logic can be exercised without real hardware.

use crate::{SanitizeError, SanitizeResult};
use std::io::ErrorKind;
use std::os::unix::process::CommandExt;
use std::process::Command;

/// Captured result of one external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs an external program to completion.
///
/// Implementations must not treat a non-zero exit as an error; only a
/// program that cannot be launched at all is reported as `Err`.
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> SanitizeResult<CommandOutput>;
}

/// Runs commands with `std::process::Command`, blocking until they exit.
///
/// Each child gets its own process group so a terminal Ctrl-C reaches only
/// this process, which decides whether an in-flight erase may be abandoned.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> SanitizeResult<CommandOutput> {
        tracing::debug!(program, ?args, "Running external command");

        let output = Command::new(program)
            .args(args)
            .process_group(0)
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => SanitizeError::CommandNotFound(program.to_string()),
                _ => SanitizeError::CommandFailed {
                    program: program.to_string(),
                    source: e,
                },
            })?;

        Ok(CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Render a command line the way it is recorded in audit records
pub fn command_line(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}
