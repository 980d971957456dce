//! Reply side of the launcher protocol.

use serde::{Deserialize, Serialize};

use crate::PROTOCOL_VERSION;
use crate::domain::DomainDescriptor;

/// Outcome of a command the launcher processed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandReply {
    /// Whether the launcher accepted and applied the command.
    pub success: bool,
    /// Human-readable explanation when `success` is false.
    #[serde(default)]
    pub message: String,
    /// Domain snapshot; populated only by the state query.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<DomainDescriptor>,
}

impl CommandReply {
    /// A successful reply without payload.
    #[must_use]
    pub const fn ok() -> Self {
        Self {
            success: true,
            message: String::new(),
            domain: None,
        }
    }

    /// A rejection carrying the launcher's explanation.
    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            domain: None,
        }
    }

    /// A successful reply carrying a domain snapshot.
    #[must_use]
    pub const fn with_domain(domain: DomainDescriptor) -> Self {
        Self {
            success: true,
            message: String::new(),
            domain: Some(domain),
        }
    }
}

/// Body of a response frame.
///
/// `Error` reports protocol-level failures (an undecodable request or an
/// unknown command) as opposed to a command the launcher refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CommandResponse {
    /// The launcher processed the command.
    Reply(CommandReply),
    /// The launcher could not process the request at all.
    Error {
        /// Description of the protocol failure.
        message: String,
    },
}

/// Versioned response frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseFrame {
    /// Protocol version of the sender.
    pub version: u16,
    /// Response body.
    pub response: CommandResponse,
}

impl ResponseFrame {
    /// Wraps a reply in a frame stamped with the current protocol version.
    #[must_use]
    pub const fn reply(reply: CommandReply) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            response: CommandResponse::Reply(reply),
        }
    }

    /// Builds a protocol error frame.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            response: CommandResponse::Error {
                message: message.into(),
            },
        }
    }
}
