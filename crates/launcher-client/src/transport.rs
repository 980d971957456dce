//! Socket transport for launcher sessions.
//!
//! Sessions run over a blocking Unix stream socket. There is no timeout and
//! no retry: a connect either reaches a listening launcher immediately or
//! fails. Filesystem permissions on the sockets directory are the only
//! access control.

use std::io::{self, BufReader};
use std::net::Shutdown;
use std::os::fd::OwnedFd;
use std::os::unix::net::UnixStream;

use camino::Utf8Path;
use launcher_protocol::{CommandRequest, FrameError, ResponseFrame, read_frame, write_frame};
use socket2::{Domain, SockAddr, Socket, Type};
use tracing::debug;

use crate::address::ChannelAddress;
use crate::client::LauncherClient;
use crate::error::ConnectError;

pub(crate) const TRANSPORT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");

/// Opens a session to the launcher listening at `address`.
pub fn connect(address: &ChannelAddress) -> Result<LauncherClient, ConnectError> {
    let to_error = |source| ConnectError {
        address: address.to_string(),
        source,
    };
    let stream = connect_unix(address.as_path()).map_err(to_error)?;
    let client = LauncherClient::from_stream(stream).map_err(to_error)?;
    debug!(target: TRANSPORT_TARGET, address = %address, "connected to launcher");
    Ok(client)
}

fn connect_unix(path: &Utf8Path) -> io::Result<UnixStream> {
    let socket = Socket::new(Domain::UNIX, Type::STREAM, None)?;
    let address = SockAddr::unix(path.as_std_path())?;
    socket.connect(&address)?;
    Ok(UnixStream::from(OwnedFd::from(socket)))
}

/// One open stream to a launcher, split into buffered read and write halves.
#[derive(Debug)]
pub(crate) struct Connection {
    reader: BufReader<UnixStream>,
    writer: UnixStream,
}

impl Connection {
    pub(crate) fn new(stream: UnixStream) -> io::Result<Self> {
        let writer = stream.try_clone()?;
        Ok(Self {
            reader: BufReader::new(stream),
            writer,
        })
    }

    /// Sends one request and waits for its response.
    pub(crate) fn exchange(
        &mut self,
        request: &CommandRequest,
    ) -> Result<Option<ResponseFrame>, FrameError> {
        write_frame(&mut self.writer, request)?;
        read_frame(&mut self.reader)
    }

    pub(crate) fn closer(&self) -> io::Result<SessionCloser> {
        self.writer
            .try_clone()
            .map(|stream| SessionCloser { stream })
    }

    pub(crate) fn shutdown(&self) -> io::Result<()> {
        shutdown_stream(&self.writer)
    }
}

/// Closes a session from outside the thread that owns it.
///
/// Closing wakes a caller blocked in a command exchange, which then fails
/// with [`CommandError::Disconnected`](crate::CommandError::Disconnected).
#[derive(Debug)]
pub struct SessionCloser {
    stream: UnixStream,
}

impl SessionCloser {
    /// Shuts down both directions of the session's socket.
    ///
    /// Closing an already closed session succeeds.
    pub fn close(&self) -> io::Result<()> {
        shutdown_stream(&self.stream)
    }
}

fn shutdown_stream(stream: &UnixStream) -> io::Result<()> {
    match stream.shutdown(Shutdown::Both) {
        Err(error) if error.kind() == io::ErrorKind::NotConnected => Ok(()),
        other => other,
    }
}
