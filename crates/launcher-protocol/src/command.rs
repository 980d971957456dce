//! Request side of the launcher protocol.

use serde::{Deserialize, Serialize};

use crate::PROTOCOL_VERSION;
use crate::workload::{SecretMap, SecretValue, WorkloadDefinition};

/// Wire names for every launcher command.
pub mod command_names {
    /// Defines or updates the workload and its secrets.
    pub const SYNC: &str = "Launcher.Sync";
    /// Requests a graceful shutdown.
    pub const SHUTDOWN: &str = "Launcher.Shutdown";
    /// Forces the workload down.
    pub const KILL: &str = "Launcher.Kill";
    /// Pushes a single secret value.
    pub const SYNC_SECRET: &str = "Launcher.SyncSecret";
    /// Queries the current domain state.
    pub const GET_DOMAIN: &str = "Launcher.GetDomain";
    /// Liveness probe.
    pub const PING: &str = "Launcher.Ping";
}

/// A lifecycle command together with the arguments it needs.
///
/// Serialised adjacently tagged: `{"name": "Launcher.Kill", "args": {...}}`.
/// Commands without arguments omit `args`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", content = "args")]
pub enum LauncherCommand {
    /// Defines or updates the workload.
    #[serde(rename = "Launcher.Sync")]
    Sync {
        /// Workload definition to apply.
        workload: WorkloadDefinition,
        /// Secrets referenced by the workload.
        #[serde(default)]
        secrets: SecretMap,
    },
    /// Gracefully shuts the workload down.
    #[serde(rename = "Launcher.Shutdown")]
    Shutdown {
        /// Workload being shut down.
        workload: WorkloadDefinition,
    },
    /// Forcefully stops the workload.
    #[serde(rename = "Launcher.Kill")]
    Kill {
        /// Workload being killed.
        workload: WorkloadDefinition,
    },
    /// Pushes a secret value for a specific usage.
    #[serde(rename = "Launcher.SyncSecret")]
    SyncSecret {
        /// Secret usage type, for example `volume` or `ceph`.
        usage_type: String,
        /// Identifier within the usage type.
        usage_id: String,
        /// Secret material.
        value: SecretValue,
    },
    /// Asks for the current domain snapshot.
    #[serde(rename = "Launcher.GetDomain")]
    GetDomain,
    /// Liveness probe.
    #[serde(rename = "Launcher.Ping")]
    Ping,
}

impl LauncherCommand {
    /// Returns the wire name of the command.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Sync { .. } => command_names::SYNC,
            Self::Shutdown { .. } => command_names::SHUTDOWN,
            Self::Kill { .. } => command_names::KILL,
            Self::SyncSecret { .. } => command_names::SYNC_SECRET,
            Self::GetDomain => command_names::GET_DOMAIN,
            Self::Ping => command_names::PING,
        }
    }
}

/// Versioned request frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandRequest {
    /// Protocol version of the sender.
    pub version: u16,
    /// Command being issued.
    pub command: LauncherCommand,
}

impl CommandRequest {
    /// Wraps a command in a frame stamped with the current protocol version.
    #[must_use]
    pub const fn new(command: LauncherCommand) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            command,
        }
    }
}
