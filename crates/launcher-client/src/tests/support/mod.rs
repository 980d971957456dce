//! Fake launcher used by client tests.
//!
//! Binds a real Unix socket at the derived channel address inside a
//! temporary base directory and serves one connection according to a
//! scripted [`PeerScript`].

use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};
use launcher_protocol::{CommandReply, LauncherCommand, serve};
use tempfile::TempDir;

use crate::address::{ChannelAddress, WorkloadIdentity, derive_address, sockets_directory};

const ACCEPT_DEADLINE: Duration = Duration::from_secs(5);

/// Boxed command handler run by the fake launcher.
pub(crate) type ScriptedHandler = Box<dyn FnMut(LauncherCommand) -> CommandReply + Send>;

/// How the fake launcher treats its single connection.
pub(crate) enum PeerScript {
    /// Serves requests through the shared serve loop.
    Serve(ScriptedHandler),
    /// Reads one request line and closes without replying.
    CloseAfterRequest,
    /// Reads one request line and answers with raw bytes.
    RawResponse(Vec<u8>),
    /// Reads one request line and never replies, waiting for the client to
    /// close the session.
    Stall,
}

/// Launcher double listening on a temporary channel address.
pub(crate) struct FakeLauncher {
    _dir: TempDir,
    base_dir: Utf8PathBuf,
    address: ChannelAddress,
    commands: Arc<Mutex<Vec<LauncherCommand>>>,
    handle: Option<thread::JoinHandle<Result<()>>>,
}

impl FakeLauncher {
    /// Serves every command with the given handler.
    pub(crate) fn serving<F>(handler: F) -> Result<Self>
    where
        F: FnMut(LauncherCommand) -> CommandReply + Send + 'static,
    {
        Self::spawn_with(|commands| {
            let mut inner = handler;
            PeerScript::Serve(Box::new(move |command: LauncherCommand| {
                if let Ok(mut guard) = commands.lock() {
                    guard.push(command.clone());
                }
                inner(command)
            }))
        })
    }

    /// Runs a non-serving script.
    pub(crate) fn scripted(script: PeerScript) -> Result<Self> {
        Self::spawn_with(|_| script)
    }

    fn spawn_with(
        build: impl FnOnce(Arc<Mutex<Vec<LauncherCommand>>>) -> PeerScript,
    ) -> Result<Self> {
        let dir = TempDir::new().context("create base dir")?;
        let base_dir = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .map_err(|path| anyhow!("temporary path is not UTF-8: {}", path.display()))?;
        let identity = WorkloadIdentity::new("default", "vm1").context("build identity")?;
        let address = derive_address(&base_dir, &identity);
        fs::create_dir_all(sockets_directory(&base_dir)).context("create sockets dir")?;
        let listener = UnixListener::bind(address.as_path()).context("bind fake launcher")?;
        listener
            .set_nonblocking(true)
            .context("fake launcher nonblocking")?;

        let commands = Arc::new(Mutex::new(Vec::new()));
        let script = build(Arc::clone(&commands));
        let handle = thread::spawn(move || run_script(&listener, script));

        Ok(Self {
            _dir: dir,
            base_dir,
            address,
            commands,
            handle: Some(handle),
        })
    }

    pub(crate) fn base_dir(&self) -> &Utf8Path {
        self.base_dir.as_path()
    }

    pub(crate) fn address(&self) -> &ChannelAddress {
        &self.address
    }

    /// Waits for the launcher thread and returns the commands it served.
    pub(crate) fn finish(&mut self) -> Result<Vec<LauncherCommand>> {
        if let Some(handle) = self.handle.take() {
            handle
                .join()
                .map_err(|_| anyhow!("fake launcher thread panicked"))?
                .context("fake launcher failed")?;
        }
        let commands = self
            .commands
            .lock()
            .map_err(|error| anyhow!("lock commands: {error}"))?;
        Ok(commands.clone())
    }
}

impl Drop for FakeLauncher {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run_script(listener: &UnixListener, script: PeerScript) -> Result<()> {
    let Some(stream) = accept_with_deadline(listener)? else {
        return Ok(());
    };
    stream
        .set_nonblocking(false)
        .context("blocking launcher stream")?;

    match script {
        PeerScript::Serve(mut handler) => {
            let reader = BufReader::new(stream.try_clone().context("clone stream")?);
            serve(reader, &stream, &mut handler).context("serve requests")
        }
        PeerScript::CloseAfterRequest => {
            read_request_line(&stream)?;
            Ok(())
        }
        PeerScript::RawResponse(bytes) => {
            read_request_line(&stream)?;
            let mut writer = &stream;
            writer.write_all(&bytes).context("write raw response")?;
            writer.flush().context("flush raw response")
        }
        PeerScript::Stall => {
            read_request_line(&stream)?;
            let mut rest = Vec::new();
            let mut reader = &stream;
            // Returns once the client shuts the session down.
            let _ = reader.read_to_end(&mut rest);
            Ok(())
        }
    }
}

fn accept_with_deadline(listener: &UnixListener) -> Result<Option<UnixStream>> {
    let deadline = Instant::now() + ACCEPT_DEADLINE;
    loop {
        match listener.accept() {
            Ok((stream, _)) => return Ok(Some(stream)),
            Err(ref error)
                if error.kind() == std::io::ErrorKind::WouldBlock && Instant::now() < deadline =>
            {
                thread::sleep(Duration::from_millis(10));
            }
            // No client arrived; exit so a failing test does not hang on drop.
            Err(ref error) if error.kind() == std::io::ErrorKind::WouldBlock => return Ok(None),
            Err(error) => return Err(error).context("accept connection"),
        }
    }
}

fn read_request_line(stream: &UnixStream) -> Result<String> {
    let mut line = String::new();
    let mut reader = BufReader::new(stream);
    reader.read_line(&mut line).context("read request")?;
    Ok(line)
}
