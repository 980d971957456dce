//! Shared configuration for the launcher control tooling.
//!
//! Values are layered by `ortho_config`: built-in defaults first, then the
//! TOML file named by `--config-path` (or `LAUNCHER_CONFIG_PATH`), then
//! `LAUNCHER_*` environment variables, and finally command-line flags.

mod defaults;
mod logging;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_LOG_FILTER, default_base_dir, default_log_filter, default_log_filter_string,
    default_log_format,
};
pub use logging::LogFormat;

/// Resolved configuration shared by the supervisor tooling.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "LAUNCHER")]
pub struct Config {
    /// Directory whose `sockets` subdirectory holds launcher channels.
    #[ortho_config(default = default_base_dir())]
    pub base_dir: Utf8PathBuf,
    /// Tracing filter expression applied to log output.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format for log records.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Base directory under which launcher channels are published.
    #[must_use]
    pub fn base_dir(&self) -> &Utf8Path {
        self.base_dir.as_path()
    }

    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}
