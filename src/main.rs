use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use drive_wiper::audit::{AuditSink, OperatorLog, SqliteAuditStore};
use drive_wiper::drives::{DeviceInventory, SystemCommandRunner, DEFAULT_ERASE_PASSWORD};
use drive_wiper::ui::{render_device_table, TerminalConfirmer};
use drive_wiper::verification::SUGGESTED_SAMPLE_BYTES;
use drive_wiper::*;
use tracing_subscriber::EnvFilter;

/// Exit status when a session completed but the erase failed
const EXIT_SESSION_FAILED: i32 = 2;

#[derive(Parser)]
#[command(name = "drive-wiper")]
#[command(about = "Drive wiper engine (ATA Secure Erase + audit logging)")]
#[command(version)]
struct Cli {
    /// List detected drives and exit
    #[arg(long)]
    list: bool,

    /// Device path to wipe (e.g. /dev/sdX)
    #[arg(long, required_unless_present_any = ["list", "check_logging"])]
    device: Option<String>,

    /// Wipe method to use
    #[arg(long, value_enum, default_value_t = WipeMethod::AtaSecureErase)]
    method: WipeMethod,

    /// Name/ID of the operator performing the wipe (for logs)
    #[arg(long)]
    operator: Option<String>,

    /// Optional session ID or ticket number
    #[arg(long)]
    session_id: Option<String>,

    /// Bytes read from the start of the device for pre/post hashing; 0 disables sampling
    #[arg(long, default_value_t = 0, long_help = format!(
        "Number of bytes to read from the start of the device for pre/post hashing. \
         0 disables sampling. Try {} for 10 MiB.",
        SUGGESTED_SAMPLE_BYTES
    ))]
    sample_bytes: u64,

    /// Do not prompt for confirmation (DANGEROUS)
    #[arg(long)]
    yes: bool,

    /// Simulate a wipe without sending destructive commands
    #[arg(long)]
    dry_run: bool,

    /// Temporary ATA user password used for the erase
    #[arg(long, env = "ERASE_PASSWORD", default_value = DEFAULT_ERASE_PASSWORD, hide_env_values = true)]
    erase_password: String,

    /// Report where audit records will be written and exit
    #[arg(long)]
    check_logging: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let code = match run(&cli) {
        Ok(code) => code,
        Err(e) => match e.downcast_ref::<SanitizeError>() {
            Some(SanitizeError::Declined) => {
                println!("Aborted by user.");
                0
            }
            _ => {
                eprintln!("{} {:#}", "[ERROR]".red().bold(), e);
                1
            }
        },
    };

    std::process::exit(code);
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<i32> {
    let config = AuditConfig::from_env()?;

    if cli.check_logging {
        check_logging(&config);
        return Ok(0);
    }

    ensure_root()?;
    let runner = SystemCommandRunner;

    if cli.list {
        let devices = DeviceInventory::list(&runner)?;
        print!("{}", render_device_table(&devices));
        return Ok(0);
    }

    let device = cli
        .device
        .clone()
        .ok_or_else(|| anyhow::anyhow!("--device is required unless using --list"))?;

    setup_signal_handlers()?;

    let request = WipeRequest {
        device,
        method: cli.method,
        operator: cli.operator.clone(),
        session_id: cli.session_id.clone(),
        sample_bytes: cli.sample_bytes,
        assume_yes: cli.yes,
        dry_run: cli.dry_run,
        password: cli.erase_password.clone(),
    };

    let mut sink = AuditSink::from_config(&config);
    let operator_log = OperatorLog::new(&config.wipe_log_dir);
    let confirmer = TerminalConfirmer;

    let report = WipeOrchestrator::new(&runner, &mut sink, &confirmer)
        .with_operator_log(&operator_log)
        .run(&request)?;

    Ok(if report.passed() { 0 } else { EXIT_SESSION_FAILED })
}

fn ensure_root() -> Result<()> {
    if unsafe { libc::geteuid() } != 0 {
        anyhow::bail!("This program must be run as root.");
    }
    Ok(())
}

fn check_logging(config: &AuditConfig) {
    println!("{}", "=== AUDIT LOGGING ===".bold());

    if config.db_enabled {
        match SqliteAuditStore::count_existing_records(&config.db_path) {
            Ok(count) => println!(
                "Database   : {} ({}, {} record(s))",
                "reachable".green(),
                config.db_path.display(),
                count
            ),
            Err(e) => println!(
                "Database   : {} ({}: {:#})",
                "unreachable".red(),
                config.db_path.display(),
                e
            ),
        }
    } else {
        println!("Database   : disabled (set DB_ENABLED=true to enable)");
    }

    let sink = AuditSink::from_config(config);
    println!("Fallback   : {}", sink.fallback_path().display());
    println!(
        "Operator   : {}",
        OperatorLog::new(&config.wipe_log_dir)
            .path_for(drive_wiper::audit::audit_now())
            .display()
    );
}

// SIGINT aborts cleanly until the erase is issued; after that the session
// must run to completion so the audit record is written
fn setup_signal_handlers() -> Result<()> {
    use signal_hook::{consts::SIGINT, iterator::Signals};

    let mut signals = Signals::new([SIGINT])?;

    std::thread::spawn(move || {
        for sig in signals.forever() {
            if sig == SIGINT {
                if drive_wiper::erase_committed() {
                    eprintln!("\nInterrupt received, but the erase is already in progress.");
                    eprintln!("hdparm runs in its own process group and is not interrupted.");
                    eprintln!("Waiting for the drive to finish so the audit record can be written...");
                } else {
                    eprintln!("\nInterrupted before any destructive command was issued.");
                    std::process::exit(130);
                }
            }
        }
    });

    Ok(())
}
