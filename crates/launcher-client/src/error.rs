//! Error types for addressing, discovery, connection, and dispatch.

use std::io;

use camino::Utf8PathBuf;
use launcher_protocol::FrameError;
use thiserror::Error;

use crate::address::IdentityField;

/// Errors raised while building or decoding channel addresses.
#[derive(Debug, Error)]
pub enum AddressError {
    /// A workload identity component cannot be encoded unambiguously.
    #[error("invalid workload {field} '{value}': {reason}")]
    InvalidIdentity {
        /// Offending component.
        field: IdentityField,
        /// Value supplied by the caller.
        value: String,
        /// Why the value was refused.
        reason: &'static str,
    },
    /// A path does not follow the `<namespace>_<name>_sock` convention.
    #[error("malformed launcher socket {path}")]
    Malformed {
        /// Path that failed to decode.
        path: Utf8PathBuf,
    },
}

/// Filesystem failures while enumerating channels.
///
/// A missing sockets directory is not an error; see
/// [`list_channels`](crate::list_channels).
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The sockets directory exists but could not be listed.
    #[error("failed to list launcher sockets in {path}: {source}")]
    ReadDirectory {
        /// Sockets directory.
        path: Utf8PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: io::Error,
    },
    /// An entry could not be read while listing.
    #[error("failed to read entry in {path}: {source}")]
    ReadEntry {
        /// Sockets directory.
        path: Utf8PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: io::Error,
    },
}

/// No launcher could be reached at a channel address.
#[derive(Debug, Error)]
#[error("failed to connect to launcher at {address}: {source}")]
pub struct ConnectError {
    /// Address that was dialled.
    pub address: String,
    /// Underlying socket error.
    #[source]
    pub source: io::Error,
}

impl ConnectError {
    /// Reports whether nothing is listening at the address.
    ///
    /// True for refused connections and missing socket files, which mean the
    /// launcher is not running rather than misbehaving.
    #[must_use]
    pub fn is_peer_absent(&self) -> bool {
        matches!(
            self.source.kind(),
            io::ErrorKind::ConnectionRefused
                | io::ErrorKind::NotFound
                | io::ErrorKind::AddrNotAvailable
        )
    }
}

/// Transport-level cause carried by [`CommandError::Transport`].
#[derive(Debug, Error)]
pub enum TransportFault {
    /// Framing, serialisation, protocol version, or stream failure.
    #[error(transparent)]
    Frame(#[from] FrameError),
    /// The launcher could not process the request, for example because it
    /// does not know the command.
    #[error("launcher reported a protocol error: {0}")]
    Remote(String),
}

/// Failures of a command exchange, classified by what the caller should do.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The launcher's end of the session is gone. The session is closed and
    /// must not be reused.
    #[error("launcher disconnected while sending command {command}")]
    Disconnected {
        /// Command that was in flight.
        command: &'static str,
        /// Stream failure that revealed the disconnect, when there was one.
        #[source]
        source: Option<FrameError>,
    },
    /// The exchange failed for a reason other than disconnection.
    #[error("unknown error encountered sending command {command}: {source}")]
    Transport {
        /// Command that was in flight.
        command: &'static str,
        /// Underlying cause.
        #[source]
        source: TransportFault,
    },
    /// The launcher processed the command and refused it.
    #[error("server error. command {command} failed: {message}")]
    Rejected {
        /// Command that was refused.
        command: &'static str,
        /// Launcher-supplied explanation, verbatim.
        message: String,
    },
}

impl CommandError {
    /// Reports whether the launcher's end of the session is gone.
    #[must_use]
    pub const fn is_disconnected(&self) -> bool {
        matches!(self, Self::Disconnected { .. })
    }

    /// Name of the command that failed.
    #[must_use]
    pub const fn command(&self) -> &'static str {
        match self {
            Self::Disconnected { command, .. }
            | Self::Transport { command, .. }
            | Self::Rejected { command, .. } => *command,
        }
    }

    /// The launcher's own explanation when it refused the command.
    #[must_use]
    pub fn rejection_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } => Some(message.as_str()),
            Self::Disconnected { .. } | Self::Transport { .. } => None,
        }
    }
}
