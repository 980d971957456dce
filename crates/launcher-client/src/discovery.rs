//! Channel discovery.
//!
//! Lets a supervisor enumerate the launchers that have published a socket
//! without knowing their identities in advance.

use std::fs;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;

use crate::address::{ChannelAddress, sockets_directory};
use crate::error::DiscoveryError;

const DISCOVERY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::discovery");

/// Lists every entry in the sockets directory under `base_dir`.
///
/// A missing sockets directory yields an empty list: a supervisor that starts
/// before any launcher has published a socket has nothing to enumerate yet.
/// Entries whose names are not UTF-8 cannot be channel addresses and are
/// skipped. The order follows the directory listing and is unspecified.
pub fn list_channels(base_dir: &Utf8Path) -> Result<Vec<ChannelAddress>, DiscoveryError> {
    let directory = sockets_directory(base_dir);
    let entries = match fs::read_dir(directory.as_std_path()) {
        Ok(entries) => entries,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            debug!(
                target: DISCOVERY_TARGET,
                path = %directory,
                "sockets directory absent; no launchers published"
            );
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(DiscoveryError::ReadDirectory {
                path: directory,
                source,
            });
        }
    };

    let mut channels = Vec::new();
    for entry in entries {
        let dir_entry = entry.map_err(|source| DiscoveryError::ReadEntry {
            path: directory.clone(),
            source,
        })?;
        match Utf8PathBuf::from_path_buf(dir_entry.path()) {
            Ok(path) => channels.push(ChannelAddress::from_path(path)),
            Err(path) => debug!(
                target: DISCOVERY_TARGET,
                path = %path.display(),
                "skipping non UTF-8 socket entry"
            ),
        }
    }
    Ok(channels)
}
