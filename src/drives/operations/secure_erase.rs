use crate::drives::command::{command_line, CommandRunner};
use crate::{SanitizeError, SanitizeResult, WipeMethod};
use serde::{Deserialize, Serialize};

/// Password used for the temporary ATA user password unless overridden
pub const DEFAULT_ERASE_PASSWORD: &str = "p";

pub const STEP_SET_PASSWORD: &str = "security-set-pass";
pub const STEP_ERASE: &str = "security-erase";

const SET_PASSWORD_FAILED: &str = "Failed to set security password";
const ERASE_FAILED: &str = "Security erase command failed";

/// One attempted sub-command of an erase sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EraseStep {
    pub step: String,
    /// Exact command line, recorded for audit only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
    #[serde(default)]
    pub simulated: bool,
}

impl EraseStep {
    fn simulated(step: &str) -> Self {
        Self {
            step: step.to_string(),
            command: None,
            exit_code: None,
            stderr: None,
            simulated: true,
        }
    }

    // A step whose hdparm process never started; no exit code exists
    fn not_launched(step: &str, args: &[&str], error: &SanitizeError) -> Self {
        Self {
            step: step.to_string(),
            command: Some(command_line("hdparm", args)),
            exit_code: None,
            stderr: Some(error.to_string()),
            simulated: false,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.simulated || self.exit_code == Some(0)
    }
}

/// Ordered result of an erase sequence. Real and simulated runs share this
/// shape; `dry_run` is the only marker that tells them apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EraseOutcome {
    pub device: String,
    pub method: WipeMethod,
    pub dry_run: bool,
    pub steps: Vec<EraseStep>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EraseOutcome {
    fn new(device: &str, method: WipeMethod, dry_run: bool) -> Self {
        Self {
            device: device.to_string(),
            method,
            dry_run,
            steps: Vec::new(),
            success: false,
            error: None,
        }
    }

    pub fn step(&self, name: &str) -> Option<&EraseStep> {
        self.steps.iter().find(|s| s.step == name)
    }
}

/// Issues vendor erase sequences through a `CommandRunner`
pub struct EraseDriver<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> EraseDriver<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    /// Run `method` against `device`, or simulate it when `dry_run` is set
    pub fn run(
        &self,
        method: WipeMethod,
        device: &str,
        password: &str,
        dry_run: bool,
    ) -> SanitizeResult<EraseOutcome> {
        match (method, dry_run) {
            (WipeMethod::AtaSecureErase, true) => Ok(Self::simulate(device)),
            (WipeMethod::AtaSecureErase, false) => self.secure_erase(device, password),
        }
    }

    /// ATA Security Erase: set a user password, then erase with it.
    ///
    /// The erase is only attempted after the password was accepted. Failing
    /// exit codes and launch failures are recorded in the outcome. Only a
    /// missing hdparm binary on the first step is returned as an error,
    /// since nothing has touched the device at that point.
    pub fn secure_erase(&self, device: &str, password: &str) -> SanitizeResult<EraseOutcome> {
        let mut outcome = EraseOutcome::new(device, WipeMethod::AtaSecureErase, false);

        let set_pass_args = ["--user-master", "u", "--security-set-pass", password, device];
        let set_pass = match self.run_step(STEP_SET_PASSWORD, &set_pass_args) {
            Err(e @ SanitizeError::CommandNotFound(_)) => return Err(e),
            Err(e) => {
                tracing::error!(device, step = STEP_SET_PASSWORD, error = %e, "Erase step could not be launched");
                EraseStep::not_launched(STEP_SET_PASSWORD, &set_pass_args, &e)
            }
            Ok(step) => step,
        };
        let set_pass_ok = set_pass.succeeded();
        outcome.steps.push(set_pass);
        if !set_pass_ok {
            tracing::error!(device, step = STEP_SET_PASSWORD, "Security password rejected");
            outcome.error = Some(SET_PASSWORD_FAILED.to_string());
            return Ok(outcome);
        }

        // The password is now set on the drive; from here every failure is recorded
        let erase_args = ["--user-master", "u", "--security-erase", password, device];
        let erase = self
            .run_step(STEP_ERASE, &erase_args)
            .unwrap_or_else(|e| {
                tracing::error!(device, step = STEP_ERASE, error = %e, "Erase step could not be launched");
                EraseStep::not_launched(STEP_ERASE, &erase_args, &e)
            });
        let erase_ok = erase.succeeded();
        outcome.steps.push(erase);
        if !erase_ok {
            tracing::error!(device, step = STEP_ERASE, "Security erase failed");
            outcome.error = Some(ERASE_FAILED.to_string());
            return Ok(outcome);
        }

        // Exit status 0 only; the caller compares integrity samples afterwards
        outcome.success = true;
        Ok(outcome)
    }

    /// Dry-run variant: no commands are issued and the outcome always succeeds
    pub fn simulate(device: &str) -> EraseOutcome {
        let mut outcome = EraseOutcome::new(device, WipeMethod::AtaSecureErase, true);
        outcome.steps.push(EraseStep::simulated(STEP_SET_PASSWORD));
        outcome.steps.push(EraseStep::simulated(STEP_ERASE));
        outcome.success = true;
        outcome
    }

    fn run_step(&self, step: &str, args: &[&str]) -> SanitizeResult<EraseStep> {
        tracing::info!(step, command = %command_line("hdparm", args), "Issuing erase step");
        let output = self.runner.run("hdparm", args)?;

        Ok(EraseStep {
            step: step.to_string(),
            command: Some(command_line("hdparm", args)),
            exit_code: output.exit_code,
            stderr: Some(output.stderr),
            simulated: false,
        })
    }
}
