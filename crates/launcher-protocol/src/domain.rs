//! Domain state reported by the launcher.

use serde::{Deserialize, Serialize};

/// Lifecycle state of the workload's domain as seen by its launcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainState {
    /// No state has been reported.
    #[default]
    NoState,
    /// The domain is running.
    Running,
    /// The domain is blocked on a resource.
    Blocked,
    /// The domain has been paused.
    Paused,
    /// The domain is shutting down.
    Shutdown,
    /// The domain is shut off.
    Shutoff,
    /// The domain has crashed.
    Crashed,
    /// The domain is suspended by guest power management.
    PmSuspended,
}

/// Snapshot of a domain returned by the state query.
///
/// `Default` is the zero-value placeholder used when no domain exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainDescriptor {
    /// Namespace of the owning workload.
    #[serde(default)]
    pub namespace: String,
    /// Name of the owning workload.
    #[serde(default)]
    pub name: String,
    /// Current lifecycle state.
    #[serde(default)]
    pub state: DomainState,
    /// Launcher-supplied reason for the current state.
    #[serde(default)]
    pub reason: String,
}

impl DomainDescriptor {
    /// Builds a bare reference to a domain, carrying only its identity.
    #[must_use]
    pub fn reference(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the lifecycle state and reason.
    #[must_use]
    pub fn with_state(mut self, state: DomainState, reason: impl Into<String>) -> Self {
        self.state = state;
        self.reason = reason.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_leaves_state_unset() {
        let domain = DomainDescriptor::reference("default", "vm1");
        assert_eq!(domain.namespace, "default");
        assert_eq!(domain.name, "vm1");
        assert_eq!(domain.state, DomainState::NoState);
        assert!(domain.reason.is_empty());
    }

    #[test]
    fn missing_fields_decode_to_placeholders() {
        let domain: DomainDescriptor =
            serde_json::from_str(r#"{"name":"vm1","state":"pm_suspended"}"#)
                .expect("decode domain");
        assert_eq!(domain.state, DomainState::PmSuspended);
        assert!(domain.namespace.is_empty());
    }
}
