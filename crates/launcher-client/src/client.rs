//! Command dispatch over a launcher session.
//!
//! Every lifecycle operation is a thin wrapper over one exchange: encode a
//! [`LauncherCommand`], wait for the reply, classify the outcome. Adding a
//! command therefore means adding a variant and a wrapper, never new
//! transport or error-handling code.
//!
//! Outcomes are classified in priority order:
//!
//! 1. [`CommandError::Disconnected`] when the launcher's end is gone (clean
//!    or unexpected end-of-stream, reset, broken pipe, or a closed session);
//! 2. [`CommandError::Transport`] for any other exchange failure;
//! 3. [`CommandError::Rejected`] when the launcher replied with
//!    `success == false`.

use std::io;
use std::os::unix::net::UnixStream;

use launcher_protocol::{
    CommandReply, CommandRequest, CommandResponse, DomainDescriptor, FrameError, LauncherCommand,
    ResponseFrame, SecretMap, SecretValue, WorkloadDefinition, check_version,
};
use tracing::debug;

use crate::address::ChannelAddress;
use crate::error::{CommandError, ConnectError, TransportFault};
use crate::transport::{self, Connection, SessionCloser, TRANSPORT_TARGET};

/// Lifecycle operations a supervisor issues to one launcher.
pub trait LauncherControl {
    /// Defines or updates the workload together with its secrets.
    fn sync_workload(
        &mut self,
        workload: &WorkloadDefinition,
        secrets: &SecretMap,
    ) -> Result<(), CommandError>;

    /// Asks the launcher to shut the workload down gracefully.
    fn shutdown_workload(&mut self, workload: &WorkloadDefinition) -> Result<(), CommandError>;

    /// Asks the launcher to stop the workload immediately.
    fn kill_workload(&mut self, workload: &WorkloadDefinition) -> Result<(), CommandError>;

    /// Pushes one secret value for the given usage.
    fn sync_secret(
        &mut self,
        usage_type: &str,
        usage_id: &str,
        value: &SecretValue,
    ) -> Result<(), CommandError>;

    /// Fetches the current domain snapshot.
    ///
    /// The flag is `false`, with a default descriptor, when the launcher has
    /// no domain defined yet.
    fn get_state(&mut self) -> Result<(DomainDescriptor, bool), CommandError>;

    /// Liveness probe.
    fn ping(&mut self) -> Result<(), CommandError>;

    /// Closes the session. Closing twice is harmless.
    fn close(&mut self);
}

/// Whether a session can still carry commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Commands may be sent.
    Open,
    /// The session was closed or its launcher disconnected.
    Closed,
}

/// A session with one launcher.
///
/// Every operation takes `&mut self`; sharing a session between threads
/// needs a lock around it.
#[derive(Debug)]
pub struct LauncherClient {
    connection: Connection,
    state: SessionState,
}

impl LauncherClient {
    /// Opens a session to the launcher at `address`.
    pub fn connect(address: &ChannelAddress) -> Result<Self, ConnectError> {
        transport::connect(address)
    }

    /// Wraps an already connected stream, such as one half of a socket pair.
    pub fn from_stream(stream: UnixStream) -> io::Result<Self> {
        Ok(Self {
            connection: Connection::new(stream)?,
            state: SessionState::Open,
        })
    }

    /// Current session state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Returns a handle that can close this session from another thread.
    pub fn closer(&self) -> io::Result<SessionCloser> {
        self.connection.closer()
    }

    /// Sends one command and waits for its reply.
    ///
    /// Blocks until the launcher answers or the stream fails. A
    /// [`CommandError::Disconnected`] outcome closes the session; later calls
    /// fail the same way without touching the socket. An oversized reply is
    /// reported as a transport failure and also closes the session, since
    /// the remainder of that reply is still on the stream.
    pub fn send_command(&mut self, command: LauncherCommand) -> Result<CommandReply, CommandError> {
        let name = command.name();
        if self.state == SessionState::Closed {
            return Err(CommandError::Disconnected {
                command: name,
                source: None,
            });
        }

        debug!(target: TRANSPORT_TARGET, command = name, "sending launcher command");
        let outcome = self.connection.exchange(&CommandRequest::new(command));
        if let Err(error) = &outcome
            && error.leaves_stream_unaligned()
        {
            debug!(target: TRANSPORT_TARGET, command = name, error = %error, "closing unaligned launcher stream");
            self.mark_closed();
        }
        let result = classify(name, outcome);
        if let Err(error) = &result
            && error.is_disconnected()
        {
            debug!(target: TRANSPORT_TARGET, command = name, "launcher disconnected");
            self.mark_closed();
        }
        result
    }

    fn call<T>(
        &mut self,
        command: LauncherCommand,
        decode: impl FnOnce(CommandReply) -> T,
    ) -> Result<T, CommandError> {
        self.send_command(command).map(decode)
    }

    fn mark_closed(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.state = SessionState::Closed;
        if let Err(error) = self.connection.shutdown() {
            debug!(target: TRANSPORT_TARGET, error = %error, "failed to shut down launcher stream");
        }
    }
}

fn classify(
    command: &'static str,
    outcome: Result<Option<ResponseFrame>, FrameError>,
) -> Result<CommandReply, CommandError> {
    let frame = match outcome {
        Ok(Some(frame)) => frame,
        Ok(None) => {
            return Err(CommandError::Disconnected {
                command,
                source: None,
            });
        }
        Err(error) if error.is_disconnect() => {
            return Err(CommandError::Disconnected {
                command,
                source: Some(error),
            });
        }
        Err(error) => return Err(transport_error(command, error)),
    };

    check_version(frame.version).map_err(|error| transport_error(command, error))?;
    match frame.response {
        CommandResponse::Error { message } => Err(CommandError::Transport {
            command,
            source: TransportFault::Remote(message),
        }),
        CommandResponse::Reply(reply) if !reply.success => Err(CommandError::Rejected {
            command,
            message: reply.message,
        }),
        CommandResponse::Reply(reply) => Ok(reply),
    }
}

fn transport_error(command: &'static str, error: FrameError) -> CommandError {
    CommandError::Transport {
        command,
        source: TransportFault::Frame(error),
    }
}

impl LauncherControl for LauncherClient {
    fn sync_workload(
        &mut self,
        workload: &WorkloadDefinition,
        secrets: &SecretMap,
    ) -> Result<(), CommandError> {
        let command = LauncherCommand::Sync {
            workload: workload.clone(),
            secrets: secrets.clone(),
        };
        self.call(command, drop)
    }

    fn shutdown_workload(&mut self, workload: &WorkloadDefinition) -> Result<(), CommandError> {
        let command = LauncherCommand::Shutdown {
            workload: workload.clone(),
        };
        self.call(command, drop)
    }

    fn kill_workload(&mut self, workload: &WorkloadDefinition) -> Result<(), CommandError> {
        let command = LauncherCommand::Kill {
            workload: workload.clone(),
        };
        self.call(command, drop)
    }

    fn sync_secret(
        &mut self,
        usage_type: &str,
        usage_id: &str,
        value: &SecretValue,
    ) -> Result<(), CommandError> {
        let command = LauncherCommand::SyncSecret {
            usage_type: usage_type.to_owned(),
            usage_id: usage_id.to_owned(),
            value: value.clone(),
        };
        self.call(command, drop)
    }

    fn get_state(&mut self) -> Result<(DomainDescriptor, bool), CommandError> {
        self.call(LauncherCommand::GetDomain, |reply| match reply.domain {
            Some(domain) => (domain, true),
            None => (DomainDescriptor::default(), false),
        })
    }

    fn ping(&mut self) -> Result<(), CommandError> {
        self.call(LauncherCommand::Ping, drop)
    }

    fn close(&mut self) {
        self.mark_closed();
    }
}
