//! Command-line surface of `launcherctl`.

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// Supervisor tool for per-workload launchers.
#[derive(Parser, Debug)]
#[command(name = "launcherctl", disable_help_subcommand = true)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Workload whose launcher a command addresses.
#[derive(Args, Debug, Clone)]
pub(crate) struct Target {
    /// Workload namespace.
    #[arg(value_name = "NAMESPACE")]
    pub(crate) namespace: String,
    /// Workload name.
    #[arg(value_name = "NAME")]
    pub(crate) name: String,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum CliCommand {
    /// Lists the launcher channels published under the base directory.
    List,
    /// Prints the channel address of a workload's launcher.
    Address(Target),
    /// Checks that a launcher answers.
    Ping(Target),
    /// Prints the launcher's domain snapshot as JSON.
    State(Target),
    /// Defines or updates a workload and its secrets.
    Sync {
        #[command(flatten)]
        target: Target,
        /// JSON workload definition.
        #[arg(long, value_name = "FILE")]
        workload: Utf8PathBuf,
        /// JSON map of secret name to `{"data": {...}}`.
        #[arg(long, value_name = "FILE")]
        secrets: Option<Utf8PathBuf>,
    },
    /// Shuts a workload down gracefully.
    Shutdown {
        #[command(flatten)]
        target: Target,
        /// JSON workload definition.
        #[arg(long, value_name = "FILE")]
        workload: Utf8PathBuf,
    },
    /// Stops a workload immediately.
    Kill {
        #[command(flatten)]
        target: Target,
        /// JSON workload definition.
        #[arg(long, value_name = "FILE")]
        workload: Utf8PathBuf,
    },
    /// Pushes one secret value to the launcher.
    SyncSecret {
        #[command(flatten)]
        target: Target,
        /// Kind of object the secret is used by.
        #[arg(long, value_name = "TYPE")]
        usage_type: String,
        /// Identifier of the object the secret is used by.
        #[arg(long, value_name = "ID")]
        usage_id: String,
        /// File holding the secret value; one trailing newline is dropped.
        #[arg(long, value_name = "FILE")]
        value_file: Utf8PathBuf,
    },
}
