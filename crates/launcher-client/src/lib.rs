//! Control-plane client for per-workload launcher processes.
//!
//! A supervisor reaches each workload's launcher over a Unix domain socket
//! whose path is derived from the workload identity. The crate covers the
//! whole client side of that arrangement:
//!
//! - [`address`] maps identities to channel addresses and back;
//! - [`discovery`] enumerates the channels that currently exist;
//! - [`transport`] opens a session to one launcher;
//! - [`client`] issues typed lifecycle commands over that session and
//!   classifies failures as disconnects, transport faults, or rejections.
//!
//! ```no_run
//! use camino::Utf8Path;
//! use launcher_client::{LauncherClient, LauncherControl, WorkloadIdentity, derive_address};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let identity = WorkloadIdentity::new("default", "vm1")?;
//! let address = derive_address(Utf8Path::new("/run/launcher"), &identity);
//! let mut client = LauncherClient::connect(&address)?;
//! client.ping()?;
//! client.close();
//! # Ok(())
//! # }
//! ```

pub mod address;
pub mod client;
pub mod discovery;
mod error;
pub mod transport;

pub use address::{
    ChannelAddress, IdentityField, WorkloadIdentity, derive_address, identity_from_address,
    sockets_directory,
};
pub use client::{LauncherClient, LauncherControl, SessionState};
pub use discovery::list_channels;
pub use error::{AddressError, CommandError, ConnectError, DiscoveryError, TransportFault};
pub use launcher_protocol::{
    CommandReply, DomainDescriptor, DomainState, LauncherCommand, Secret, SecretMap, SecretValue,
    WorkloadDefinition,
};
pub use transport::{SessionCloser, connect};

#[cfg(test)]
mod tests;
