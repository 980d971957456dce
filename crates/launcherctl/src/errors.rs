//! Error type for the `launcherctl` runtime and its exit-code mapping.

use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use camino::Utf8PathBuf;
use launcher_client::{AddressError, CommandError, ConnectError, DiscoveryError};
use thiserror::Error;

use crate::telemetry::TelemetryError;

/// Any failure other than a rejected or interrupted command.
pub(crate) const EXIT_FAILURE: u8 = 1;
/// Bad invocation: arguments, configuration or input files.
pub(crate) const EXIT_USAGE: u8 = 2;
/// The launcher could not be reached or went away mid-command.
pub(crate) const EXIT_UNREACHABLE: u8 = 3;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("invalid workload identity: {0}")]
    Identity(#[from] AddressError),
    #[error("failed to list launcher channels: {0}")]
    Discovery(#[from] DiscoveryError),
    #[error(transparent)]
    Connect(#[from] ConnectError),
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("failed to read {path}: {source}")]
    ReadInput { path: Utf8PathBuf, source: io::Error },
    #[error("failed to parse {path}: {source}")]
    ParseInput {
        path: Utf8PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(serde_json::Error),
    #[error("failed to write output: {0}")]
    WriteOutput(#[from] io::Error),
}

impl AppError {
    /// Process exit status reported for this error.
    pub(crate) fn exit_status(&self) -> u8 {
        match self {
            Self::CliUsage(error) => u8::try_from(error.exit_code()).unwrap_or(EXIT_USAGE),
            Self::LoadConfiguration(_)
            | Self::Identity(_)
            | Self::ReadInput { .. }
            | Self::ParseInput { .. } => EXIT_USAGE,
            Self::Connect(_) => EXIT_UNREACHABLE,
            Self::Command(error) if error.is_disconnected() => EXIT_UNREACHABLE,
            Self::Telemetry(_)
            | Self::Discovery(_)
            | Self::Command(_)
            | Self::SerialiseOutput(_)
            | Self::WriteOutput(_) => EXIT_FAILURE,
        }
    }

    /// Whether the message belongs on stdout, as clap's help and version
    /// output does.
    pub(crate) fn is_informational(&self) -> bool {
        matches!(self, Self::CliUsage(error) if !error.use_stderr())
    }

    pub(crate) fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }
}
