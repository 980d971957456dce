//! Peer-side request loop.
//!
//! A launcher accepts a connection on its channel and hands the stream to
//! [`serve`], which decodes request frames, dispatches them to a
//! [`CommandHandler`], and writes one response frame per request.

use std::io::{BufRead, Write};

use tracing::{debug, warn};

use crate::codec::{FrameError, check_version, read_frame, write_frame};
use crate::command::{CommandRequest, LauncherCommand};
use crate::reply::{CommandReply, ResponseFrame};

const SERVER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::server");

/// Applies launcher commands.
pub trait CommandHandler {
    /// Processes one command and produces its reply.
    fn handle(&mut self, command: LauncherCommand) -> CommandReply;
}

impl<F> CommandHandler for F
where
    F: FnMut(LauncherCommand) -> CommandReply,
{
    fn handle(&mut self, command: LauncherCommand) -> CommandReply {
        self(command)
    }
}

/// Serves requests until the client closes its end of the stream.
///
/// Requests that cannot be decoded, including unknown command names, and
/// requests stamped with a foreign protocol version receive an `error`
/// response and the loop keeps going. Stream failures end the loop.
pub fn serve<R, W, H>(mut reader: R, mut writer: W, handler: &mut H) -> Result<(), FrameError>
where
    R: BufRead,
    W: Write,
    H: CommandHandler + ?Sized,
{
    loop {
        let request = match read_frame::<_, CommandRequest>(&mut reader) {
            Ok(Some(request)) => request,
            Ok(None) => {
                debug!(target: SERVER_TARGET, "client closed launcher channel");
                return Ok(());
            }
            Err(FrameError::Decode(error)) => {
                warn!(target: SERVER_TARGET, error = %error, "rejecting undecodable request");
                write_frame(
                    &mut writer,
                    &ResponseFrame::error(format!("cannot decode request: {error}")),
                )?;
                continue;
            }
            Err(error) => return Err(error),
        };

        if let Err(error) = check_version(request.version) {
            warn!(target: SERVER_TARGET, error = %error, "rejecting request");
            write_frame(&mut writer, &ResponseFrame::error(error.to_string()))?;
            continue;
        }

        let command = request.command.name();
        debug!(target: SERVER_TARGET, command, "dispatching launcher command");
        let reply = handler.handle(request.command);
        if !reply.success {
            debug!(target: SERVER_TARGET, command, message = %reply.message, "command rejected");
        }
        write_frame(&mut writer, &ResponseFrame::reply(reply))?;
    }
}
