//! Harness pieces shared by the CLI tests.

use std::cell::RefCell;
use std::ffi::OsString;
use std::fs;
use std::io::BufReader;
use std::os::unix::net::UnixListener;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};
use launcher_client::{
    ChannelAddress, CommandError, ConnectError, DomainDescriptor, LauncherControl, SecretMap,
    SecretValue, WorkloadDefinition, WorkloadIdentity, derive_address, sockets_directory,
};
use launcher_config::{Config, LogFormat};
use launcher_protocol::{CommandReply, LauncherCommand, serve};
use mockall::mock;
use tempfile::TempDir;

use crate::commands::Connector;
use crate::config::ConfigLoader;
use crate::errors::AppError;

mock! {
    pub Launcher {}
    impl LauncherControl for Launcher {
        fn sync_workload(
            &mut self,
            workload: &WorkloadDefinition,
            secrets: &SecretMap,
        ) -> Result<(), CommandError>;
        fn shutdown_workload(&mut self, workload: &WorkloadDefinition) -> Result<(), CommandError>;
        fn kill_workload(&mut self, workload: &WorkloadDefinition) -> Result<(), CommandError>;
        fn sync_secret(
            &mut self,
            usage_type: &str,
            usage_id: &str,
            value: &SecretValue,
        ) -> Result<(), CommandError>;
        fn get_state(&mut self) -> Result<(DomainDescriptor, bool), CommandError>;
        fn ping(&mut self) -> Result<(), CommandError>;
        fn close(&mut self);
    }
}

/// Returns a fixed configuration regardless of arguments.
pub(crate) struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    pub(crate) fn new(base_dir: &Utf8Path) -> Self {
        Self {
            config: Config {
                base_dir: base_dir.to_path_buf(),
                log_filter: String::from("warn"),
                log_format: LogFormat::Compact,
            },
        }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
        Ok(self.config.clone())
    }
}

/// Hands out one prepared mock session, recording the address asked for.
/// Without a session every connect is refused.
#[derive(Default)]
pub(crate) struct MockConnector {
    session: RefCell<Option<MockLauncher>>,
    pub(crate) addresses: RefCell<Vec<ChannelAddress>>,
}

impl MockConnector {
    pub(crate) fn with_session(session: MockLauncher) -> Self {
        Self {
            session: RefCell::new(Some(session)),
            addresses: RefCell::new(Vec::new()),
        }
    }
}

impl Connector for MockConnector {
    fn connect(&self, address: &ChannelAddress) -> Result<Box<dyn LauncherControl>, ConnectError> {
        self.addresses.borrow_mut().push(address.clone());
        match self.session.borrow_mut().take() {
            Some(session) => Ok(Box::new(session)),
            None => Err(ConnectError {
                address: address.to_string(),
                source: std::io::Error::from(std::io::ErrorKind::ConnectionRefused),
            }),
        }
    }
}

/// Temporary base directory with helpers for input files.
pub(crate) struct Workspace {
    _dir: TempDir,
    base_dir: Utf8PathBuf,
}

impl Workspace {
    pub(crate) fn new() -> Result<Self> {
        let dir = TempDir::new().context("create base dir")?;
        let base_dir = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .map_err(|path| anyhow!("temporary path is not UTF-8: {}", path.display()))?;
        Ok(Self {
            _dir: dir,
            base_dir,
        })
    }

    pub(crate) fn base_dir(&self) -> &Utf8Path {
        self.base_dir.as_path()
    }

    pub(crate) fn write_file(&self, name: &str, contents: &str) -> Result<Utf8PathBuf> {
        let path = self.base_dir.join(name);
        fs::write(&path, contents).with_context(|| format!("write {path}"))?;
        Ok(path)
    }
}

/// Captured result of one CLI run.
pub(crate) struct RunOutcome {
    pub(crate) exit: ExitCode,
    pub(crate) stdout: String,
    pub(crate) stderr: String,
}

pub(crate) fn run_cli<C: Connector>(
    workspace: &Workspace,
    connector: &C,
    args: &[&str],
) -> RunOutcome {
    let mut argv = vec![OsString::from("launcherctl")];
    argv.extend(args.iter().map(OsString::from));
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let loader = StaticConfigLoader::new(workspace.base_dir());
    let exit = crate::run_with(argv, &mut stdout, &mut stderr, &loader, connector);
    RunOutcome {
        exit,
        stdout: String::from_utf8(stdout).expect("stdout utf-8"),
        stderr: String::from_utf8(stderr).expect("stderr utf-8"),
    }
}

const ACCEPT_DEADLINE: Duration = Duration::from_secs(5);

/// Launcher served on a real socket inside a [`Workspace`].
pub(crate) struct SocketLauncher {
    commands: Arc<Mutex<Vec<LauncherCommand>>>,
    handle: Option<thread::JoinHandle<Result<()>>>,
}

impl SocketLauncher {
    pub(crate) fn spawn<F>(workspace: &Workspace, reply: F) -> Result<Self>
    where
        F: Fn(&LauncherCommand) -> CommandReply + Send + 'static,
    {
        let identity = WorkloadIdentity::new("default", "vm1").context("identity")?;
        let address = derive_address(workspace.base_dir(), &identity);
        fs::create_dir_all(sockets_directory(workspace.base_dir())).context("sockets dir")?;
        let listener = UnixListener::bind(address.as_path()).context("bind launcher")?;
        listener.set_nonblocking(true).context("nonblocking")?;

        let commands = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&commands);
        let handle = thread::spawn(move || -> Result<()> {
            let deadline = Instant::now() + ACCEPT_DEADLINE;
            let stream = loop {
                match listener.accept() {
                    Ok((stream, _)) => break stream,
                    Err(error) if error.kind() == std::io::ErrorKind::WouldBlock => {
                        if Instant::now() >= deadline {
                            return Ok(());
                        }
                        thread::sleep(Duration::from_millis(10));
                    }
                    Err(error) => return Err(error).context("accept"),
                }
            };
            stream.set_nonblocking(false).context("blocking stream")?;
            let reader = BufReader::new(stream.try_clone().context("clone stream")?);
            let mut handler = |command: LauncherCommand| {
                let answer = reply(&command);
                if let Ok(mut seen) = recorded.lock() {
                    seen.push(command);
                }
                answer
            };
            serve(reader, &stream, &mut handler).context("serve")
        });

        Ok(Self {
            commands,
            handle: Some(handle),
        })
    }

    /// Waits for the session to end and returns the commands served.
    pub(crate) fn finish(&mut self) -> Result<Vec<LauncherCommand>> {
        if let Some(handle) = self.handle.take() {
            handle
                .join()
                .map_err(|_| anyhow!("launcher thread panicked"))??;
        }
        let commands = self
            .commands
            .lock()
            .map_err(|error| anyhow!("lock commands: {error}"))?;
        Ok(commands.clone())
    }
}
