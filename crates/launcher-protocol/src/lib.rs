//! Wire vocabulary shared by the launcher control client and its peer.
//!
//! Both ends of a launcher channel are built from this crate so the request
//! and reply envelopes stay symmetric. Messages travel as JSON Lines: each
//! frame is a single JSON object terminated by `\n`, stamped with
//! [`PROTOCOL_VERSION`].
//!
//! ```
//! use launcher_protocol::{CommandRequest, LauncherCommand};
//!
//! let request = CommandRequest::new(LauncherCommand::Ping);
//! assert_eq!(request.command.name(), "Launcher.Ping");
//! ```

mod codec;
mod command;
mod domain;
mod reply;
pub mod server;
mod workload;

pub use codec::{FrameError, MAX_FRAME_BYTES, check_version, read_frame, write_frame};
pub use command::{CommandRequest, LauncherCommand, command_names};
pub use domain::{DomainDescriptor, DomainState};
pub use reply::{CommandReply, CommandResponse, ResponseFrame};
pub use server::{CommandHandler, serve};
pub use workload::{Secret, SecretMap, SecretValue, WorkloadDefinition};

/// Version stamped on every request and response frame.
pub const PROTOCOL_VERSION: u16 = 1;
