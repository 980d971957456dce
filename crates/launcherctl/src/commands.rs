//! Executes parsed subcommands against launcher sessions.

use std::fs;
use std::io::Write;

use camino::Utf8Path;
use launcher_client::{
    ChannelAddress, CommandError, ConnectError, LauncherClient, LauncherControl, SecretMap,
    SecretValue, WorkloadDefinition, WorkloadIdentity, derive_address, list_channels,
};
use launcher_config::Config;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::cli::{CliCommand, Target};
use crate::errors::AppError;
use crate::output::{ChannelRecord, StateRecord, write_record};

const COMMANDS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::commands");

/// Opens sessions to launchers.
pub(crate) trait Connector {
    fn connect(&self, address: &ChannelAddress) -> Result<Box<dyn LauncherControl>, ConnectError>;
}

/// Connects over the launcher's Unix socket.
pub(crate) struct SocketConnector;

impl Connector for SocketConnector {
    fn connect(&self, address: &ChannelAddress) -> Result<Box<dyn LauncherControl>, ConnectError> {
        let client = LauncherClient::connect(address)?;
        Ok(Box::new(client))
    }
}

pub(crate) fn execute<C, W>(
    command: CliCommand,
    config: &Config,
    connector: &C,
    stdout: &mut W,
) -> Result<(), AppError>
where
    C: Connector + ?Sized,
    W: Write,
{
    match command {
        CliCommand::List => list(config.base_dir(), stdout),
        CliCommand::Address(target) => {
            let address = resolve(config, &target)?;
            writeln!(stdout, "{address}")?;
            Ok(())
        }
        CliCommand::Ping(target) => with_session(config, connector, &target, |session| {
            session.ping()
        }),
        CliCommand::State(target) => {
            let (domain, exists) =
                with_session(config, connector, &target, |session| session.get_state())?;
            write_record(
                stdout,
                &StateRecord {
                    exists,
                    domain: &domain,
                },
            )
        }
        CliCommand::Sync {
            target,
            workload,
            secrets,
        } => {
            let definition = read_workload(&workload)?;
            let secret_map: SecretMap = match secrets {
                Some(path) => read_json(&path)?,
                None => SecretMap::new(),
            };
            with_session(config, connector, &target, |session| {
                session.sync_workload(&definition, &secret_map)
            })
        }
        CliCommand::Shutdown { target, workload } => {
            let definition = read_workload(&workload)?;
            with_session(config, connector, &target, |session| {
                session.shutdown_workload(&definition)
            })
        }
        CliCommand::Kill { target, workload } => {
            let definition = read_workload(&workload)?;
            with_session(config, connector, &target, |session| {
                session.kill_workload(&definition)
            })
        }
        CliCommand::SyncSecret {
            target,
            usage_type,
            usage_id,
            value_file,
        } => {
            let value = read_secret_value(&value_file)?;
            with_session(config, connector, &target, |session| {
                session.sync_secret(&usage_type, &usage_id, &value)
            })
        }
    }
}

fn list<W: Write>(base_dir: &Utf8Path, stdout: &mut W) -> Result<(), AppError> {
    let mut channels = list_channels(base_dir)?;
    channels.sort();
    for address in &channels {
        write_record(stdout, &ChannelRecord::from_address(address))?;
    }
    Ok(())
}

fn resolve(config: &Config, target: &Target) -> Result<ChannelAddress, AppError> {
    let identity = WorkloadIdentity::new(target.namespace.as_str(), target.name.as_str())?;
    Ok(derive_address(config.base_dir(), &identity))
}

/// Runs one operation on a fresh session and closes it whatever the outcome.
fn with_session<C, T>(
    config: &Config,
    connector: &C,
    target: &Target,
    operation: impl FnOnce(&mut dyn LauncherControl) -> Result<T, CommandError>,
) -> Result<T, AppError>
where
    C: Connector + ?Sized,
{
    let address = resolve(config, target)?;
    debug!(target: COMMANDS_TARGET, address = %address, "opening launcher session");
    let mut session = connector.connect(&address)?;
    let outcome = operation(session.as_mut());
    session.close();
    outcome.map_err(AppError::from)
}

fn read_workload(path: &Utf8Path) -> Result<WorkloadDefinition, AppError> {
    read_json(path).map(WorkloadDefinition::new)
}

fn read_json<T: DeserializeOwned>(path: &Utf8Path) -> Result<T, AppError> {
    let contents = read_input(path)?;
    serde_json::from_str(&contents).map_err(|source| AppError::ParseInput {
        path: path.to_path_buf(),
        source,
    })
}

fn read_secret_value(path: &Utf8Path) -> Result<SecretValue, AppError> {
    let contents = read_input(path)?;
    let value = contents
        .strip_suffix('\n')
        .map_or(contents.as_str(), |line| line.strip_suffix('\r').unwrap_or(line));
    Ok(SecretValue::new(value))
}

fn read_input(path: &Utf8Path) -> Result<String, AppError> {
    fs::read_to_string(path).map_err(|source| AppError::ReadInput {
        path: path.to_path_buf(),
        source,
    })
}
