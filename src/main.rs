//! zmqcat CLI - one request/reply exchange between stdin/stdout and a
//! ZeroMQ socket.
//!
//! This is the main binary entry point. See the `zmqcat` library for the
//! bridge loop itself.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use zmqcat::constants::{EX_SOFTWARE, EX_USAGE};
use zmqcat::{BridgeConfig, BridgeError, InputMode, Role, Transport};

// CLI
#[derive(Parser, Debug)]
#[command(name = "zmqcat")]
#[command(version)]
#[command(about = "Send stdin as one ZeroMQ request (or reply) and print what comes back")]
struct Cli {
    /// Socket type: REQ sends first and connects, REP receives first and binds
    #[arg(short = 't', long = "type", value_enum, ignore_case = true, default_value = "REQ")]
    role: Role,

    /// Run CMD with `sh -c` and send its output instead of reading stdin
    #[arg(short = 'e', long = "exec", value_name = "CMD")]
    exec: Option<String>,

    /// Do not read stdin; send an empty message (unless -e is given)
    #[arg(short = 'n', long = "no-input")]
    no_input: bool,

    /// Print diagnostics (phases, byte counts) to stderr
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Readiness wait timeout in milliseconds (default: block indefinitely)
    #[arg(short = 'w', long = "timeout", value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Socket linger on close in milliseconds (default: 1000)
    #[arg(long = "linger", value_name = "MS")]
    linger_ms: Option<u64>,

    /// Transport endpoint, e.g. tcp://127.0.0.1:5555 or ipc:///tmp/zmqcat.sock
    transport: Transport,
}

fn init_logging(verbose: bool) {
    // Diagnostics go to stderr so they never mix with the payload on stdout.
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Stderr)
        .format_timestamp_millis()
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let input = InputMode::resolve(cli.exec, cli.no_input);
    let config = BridgeConfig::new(cli.role, cli.transport, input)
        .with_overrides(cli.timeout_ms, cli.linger_ms)
        .context("Invalid configuration")?;

    log::debug!("Resolved configuration: {:?}", config);

    let summary = zmqcat::run(&config)
        .with_context(|| format!("{} exchange on {} failed", config.role, config.transport))?;

    log::debug!(
        "Done after {} waits: {} bytes out, {} bytes in",
        summary.iterations,
        summary.bytes_sent,
        summary.bytes_received
    );
    Ok(())
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // clap exits with 2 on bad usage; sysexits wants EX_USAGE.
            let code = if err.use_stderr() { EX_USAGE } else { 0 };
            let _ = err.print();
            return ExitCode::from(code);
        }
    };

    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let bridge_err = err.downcast_ref::<BridgeError>();
            if let Some(BridgeError::Usage(_)) = bridge_err {
                eprintln!("{}\n", Cli::command().render_usage());
            }
            eprintln!("zmqcat: {:#}", err);
            let code = bridge_err.map_or(EX_SOFTWARE, BridgeError::exit_code);
            ExitCode::from(code)
        }
    }
}
