//! Configuration loading for `launcherctl`.
//!
//! Configuration flags lead the argument list and are handed to
//! `ortho_config`; the remaining tokens belong to the subcommand parser.

use std::ffi::{OsStr, OsString};

use launcher_config::Config;
use ortho_config::OrthoConfig;

use crate::errors::AppError;

/// Flags understood by the configuration loader.
///
/// Keep in step with the fields of [`launcher_config::Config`].
pub(crate) const CONFIG_CLI_FLAGS: &[&str] =
    &["--config-path", "--base-dir", "--log-filter", "--log-format"];

pub(crate) trait ConfigLoader {
    /// Loads configuration from the configuration-flag slice of the
    /// arguments, including the program name.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

/// Loads layered configuration through `ortho_config`.
pub(crate) struct OrthoConfigLoader;

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        Config::load_from_iter(args.iter().cloned()).map_err(AppError::LoadConfiguration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagAction {
    Include { needs_value: bool },
    Stop,
}

fn classify_flag(argument: &OsStr) -> FlagAction {
    let text = argument.to_string_lossy();
    let (flag, has_inline_value) = match text.split_once('=') {
        Some((flag, _)) => (flag, true),
        None => (&*text, false),
    };
    if CONFIG_CLI_FLAGS.contains(&flag) {
        FlagAction::Include {
            needs_value: !has_inline_value,
        }
    } else {
        FlagAction::Stop
    }
}

/// Arguments partitioned between the configuration loader and the
/// subcommand parser. Both halves keep the program name first.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ArgumentSplit {
    pub(crate) config_arguments: Vec<OsString>,
    pub(crate) command_arguments: Vec<OsString>,
}

pub(crate) fn split_config_arguments(args: &[OsString]) -> ArgumentSplit {
    let Some((program, rest)) = args.split_first() else {
        return ArgumentSplit {
            config_arguments: Vec::new(),
            command_arguments: Vec::new(),
        };
    };

    let mut config_arguments = vec![program.clone()];
    let mut remaining = rest.iter();
    let mut command_arguments = vec![program.clone()];
    while let Some(argument) = remaining.next() {
        match classify_flag(argument) {
            FlagAction::Include { needs_value } => {
                config_arguments.push(argument.clone());
                if needs_value && let Some(value) = remaining.next() {
                    config_arguments.push(value.clone());
                }
            }
            FlagAction::Stop => {
                command_arguments.push(argument.clone());
                break;
            }
        }
    }
    command_arguments.extend(remaining.cloned());

    ArgumentSplit {
        config_arguments,
        command_arguments,
    }
}
