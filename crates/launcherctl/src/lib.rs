//! Supervisor command-line runtime for launcher control.
//!
//! `launcherctl` resolves a workload's channel address under the configured
//! base directory, opens a session, issues one lifecycle command, and maps
//! the outcome to an exit status:
//!
//! | Status | Meaning |
//! |---|---|
//! | 0 | success |
//! | 1 | the launcher rejected the command, or another failure |
//! | 2 | bad invocation, configuration, or input file |
//! | 3 | the launcher is unreachable or disconnected mid-command |
//!
//! The runtime takes its I/O streams as parameters so tests can drive it
//! without a process boundary.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

mod cli;
mod commands;
mod config;
mod errors;
mod output;
mod telemetry;

use cli::Cli;
use commands::{Connector, SocketConnector};
use config::{ConfigLoader, OrthoConfigLoader, split_config_arguments};
use errors::AppError;

const RUNTIME_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::runtime");

/// Runs the CLI with the given arguments and output streams.
///
/// Configuration flags (`--config-path`, `--base-dir`, `--log-filter`,
/// `--log-format`) must precede the subcommand.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    run_with(args, stdout, stderr, &OrthoConfigLoader, &SocketConnector)
}

pub(crate) fn run_with<I, W, E, L, C>(
    args: I,
    stdout: &mut W,
    stderr: &mut E,
    loader: &L,
    connector: &C,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader + ?Sized,
    C: Connector + ?Sized,
{
    let arguments: Vec<OsString> = args.into_iter().collect();
    match try_run(&arguments, stdout, loader, connector) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) if error.is_informational() => {
            write!(stdout, "{error}").ok();
            error.exit_code()
        }
        Err(error) => {
            writeln!(stderr, "{error}").ok();
            error.exit_code()
        }
    }
}

fn try_run<W, L, C>(
    arguments: &[OsString],
    stdout: &mut W,
    loader: &L,
    connector: &C,
) -> Result<(), AppError>
where
    W: Write,
    L: ConfigLoader + ?Sized,
    C: Connector + ?Sized,
{
    let split = split_config_arguments(arguments);
    let cli = Cli::try_parse_from(&split.command_arguments).map_err(AppError::CliUsage)?;
    let config = loader.load(&split.config_arguments)?;
    telemetry::initialise(&config)?;
    debug!(target: RUNTIME_TARGET, base_dir = %config.base_dir(), "configuration loaded");
    commands::execute(cli.command, &config, connector, stdout)
}

#[cfg(test)]
mod tests;
