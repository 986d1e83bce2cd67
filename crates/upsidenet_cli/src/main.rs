//! Developer harness that invokes the registrar against a local ledger file.
//!
//! # Responsibility
//! - Resolve registrar and logging configuration from flags or environment.
//! - Run exactly one invocation inside one SQLite transaction.
//! - Print the payload on stdout and the rejection message on stderr.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use upsidenet_core::db::open_db;
use upsidenet_core::{
    default_log_level, init_logging, invoke_in_transaction, AssetRegistrar, Function,
    IdentifierMode, LogTarget, RegistrarConfig, Response, DEFAULT_PRIVATE_COLLECTION,
};

/// Invoke UpsideNet chaincode functions against a local SQLite ledger.
#[derive(Parser, Debug)]
#[command(name = "upsidenet", version, about)]
struct Cli {
    /// Ledger database file; created and migrated on first use.
    #[arg(long, env = "UPSIDENET_LEDGER", default_value = "upsidenet-ledger.sqlite3")]
    ledger: PathBuf,

    /// Private data collection holding dimensional-energy measurements.
    #[arg(long, env = "UPSIDENET_COLLECTION", default_value = DEFAULT_PRIVATE_COLLECTION)]
    collection: String,

    /// Identifier mode: `generated` or `caller-supplied`.
    #[arg(long, env = "UPSIDENET_ID_MODE", default_value = "generated")]
    id_mode: IdentifierMode,

    /// Log level (trace|debug|info|warn|error).
    #[arg(long, env = "UPSIDENET_LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rolling log files; logs go to stderr if unset.
    #[arg(long, env = "UPSIDENET_LOG_DIR")]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the instantiation hook.
    Init,
    /// Invoke a chaincode function with positional string arguments.
    Invoke {
        function: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// List the chaincode function names.
    Functions,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| default_log_level().to_string());
    let target = match cli.log_dir.as_deref() {
        Some(dir) => LogTarget::directory(dir).map_err(anyhow::Error::msg)?,
        None => LogTarget::Stderr,
    };
    init_logging(&level, target).map_err(anyhow::Error::msg)?;

    let config = RegistrarConfig::new(cli.collection.as_str(), cli.id_mode)
        .context("invalid registrar configuration")?;
    let registrar = AssetRegistrar::new(config);

    if let Command::Functions = cli.command {
        for function in Function::ALL {
            println!("{function}");
        }
        return Ok(ExitCode::SUCCESS);
    }

    let mut conn = open_db(&cli.ledger)
        .with_context(|| format!("failed to open ledger `{}`", cli.ledger.display()))?;

    let response: Response = invoke_in_transaction(&mut conn, |ledger| match &cli.command {
        Command::Init => registrar.init(ledger),
        Command::Invoke { function, args } => registrar.invoke(ledger, function, args),
        Command::Functions => Response::success(Vec::new()),
    })
    .context("ledger transaction failed")?;

    report(&response)
}

fn report(response: &Response) -> anyhow::Result<ExitCode> {
    if !response.is_ok() {
        eprintln!("Error: {}", response.message);
        return Ok(ExitCode::FAILURE);
    }

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&response.payload)?;
    if !response.payload.is_empty() {
        writeln!(stdout)?;
    }
    Ok(ExitCode::SUCCESS)
}
