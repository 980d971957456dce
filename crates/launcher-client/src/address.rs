//! Channel addressing.
//!
//! Every launcher listens on `<base>/sockets/<namespace>_<name>_sock`. The
//! mapping is pure: deriving an address performs no I/O, and decoding one
//! does not check that a launcher is listening.
//!
//! The separator cannot appear inside identity components, so
//! [`WorkloadIdentity::new`] refuses any namespace or name that contains it.
//! That keeps derivation total over valid identities and makes every address
//! decode back to exactly one identity.

use std::fmt;
use std::path::Path;

use camino::{Utf8Path, Utf8PathBuf};
use launcher_protocol::DomainDescriptor;

use crate::error::AddressError;

/// Subdirectory of the base directory holding launcher sockets.
pub const SOCKETS_DIR: &str = "sockets";
/// Separator between the parts of a socket file name.
pub const SEPARATOR: char = '_';
/// Literal final part of every socket file name.
pub const SUFFIX: &str = "sock";

/// Identity component named in validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityField {
    /// The workload namespace.
    Namespace,
    /// The workload name.
    Name,
}

impl fmt::Display for IdentityField {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Namespace => formatter.write_str("namespace"),
            Self::Name => formatter.write_str("name"),
        }
    }
}

/// Namespace and name uniquely naming a managed workload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkloadIdentity {
    namespace: String,
    name: String,
}

impl WorkloadIdentity {
    /// Validates and builds an identity.
    ///
    /// Components must be non-empty and must not contain the `_` separator,
    /// a `/`, or a NUL byte, nor be `.` or `..`.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Result<Self, AddressError> {
        let namespace_value = namespace.into();
        let name_value = name.into();
        validate_component(IdentityField::Namespace, &namespace_value)?;
        validate_component(IdentityField::Name, &name_value)?;
        Ok(Self {
            namespace: namespace_value,
            name: name_value,
        })
    }

    /// Workload namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        self.namespace.as_str()
    }

    /// Workload name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Bare domain reference for this workload.
    #[must_use]
    pub fn domain_reference(&self) -> DomainDescriptor {
        DomainDescriptor::reference(self.namespace.as_str(), self.name.as_str())
    }
}

impl fmt::Display for WorkloadIdentity {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}/{}", self.namespace, self.name)
    }
}

fn validate_component(field: IdentityField, value: &str) -> Result<(), AddressError> {
    let reason = if value.is_empty() {
        Some("must not be empty")
    } else if value.contains(SEPARATOR) {
        Some("must not contain '_'")
    } else if value.contains('/') {
        Some("must not contain '/'")
    } else if value.contains('\0') {
        Some("must not contain NUL")
    } else if value == "." || value == ".." {
        Some("must not be a relative path component")
    } else {
        None
    };

    match reason {
        Some(reason_text) => Err(AddressError::InvalidIdentity {
            field,
            value: value.to_owned(),
            reason: reason_text,
        }),
        None => Ok(()),
    }
}

/// Filesystem path of one launcher's socket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelAddress(Utf8PathBuf);

impl ChannelAddress {
    /// Wraps an arbitrary path, for example one found by discovery.
    #[must_use]
    pub fn from_path(path: impl Into<Utf8PathBuf>) -> Self {
        Self(path.into())
    }

    /// Borrows the socket path.
    #[must_use]
    pub fn as_path(&self) -> &Utf8Path {
        self.0.as_path()
    }

    /// Decodes the workload identity encoded in the file name.
    pub fn identity(&self) -> Result<WorkloadIdentity, AddressError> {
        identity_from_address(self)
    }
}

impl fmt::Display for ChannelAddress {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, formatter)
    }
}

impl AsRef<Utf8Path> for ChannelAddress {
    fn as_ref(&self) -> &Utf8Path {
        self.0.as_path()
    }
}

impl AsRef<Path> for ChannelAddress {
    fn as_ref(&self) -> &Path {
        self.0.as_std_path()
    }
}

/// Directory holding every launcher socket under `base_dir`.
#[must_use]
pub fn sockets_directory(base_dir: &Utf8Path) -> Utf8PathBuf {
    base_dir.join(SOCKETS_DIR)
}

/// Derives the channel address of a workload's launcher.
#[must_use]
pub fn derive_address(base_dir: &Utf8Path, identity: &WorkloadIdentity) -> ChannelAddress {
    let file_name = format!(
        "{}{SEPARATOR}{}{SEPARATOR}{SUFFIX}",
        identity.namespace, identity.name
    );
    ChannelAddress(sockets_directory(base_dir).join(file_name))
}

/// Recovers the workload identity from a channel address.
///
/// Only the final path segment is inspected. It must split on `_` into a
/// namespace, a name, and the literal `sock`; anything else is
/// [`AddressError::Malformed`].
pub fn identity_from_address(
    address: impl AsRef<Utf8Path>,
) -> Result<WorkloadIdentity, AddressError> {
    let path = address.as_ref();
    let malformed = || AddressError::Malformed {
        path: path.to_path_buf(),
    };

    let file_name = path.file_name().ok_or_else(malformed)?;
    let mut parts = file_name.splitn(3, SEPARATOR);
    let (Some(namespace), Some(name), Some(suffix)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(malformed());
    };
    if suffix != SUFFIX {
        return Err(malformed());
    }

    WorkloadIdentity::new(namespace, name).map_err(|_| malformed())
}
