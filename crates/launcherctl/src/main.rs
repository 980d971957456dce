//! Entry point for `launcherctl`.
//!
//! Delegates to [`launcherctl::run`] with the process arguments and locked
//! standard streams.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    launcherctl::run(std::env::args_os(), &mut stdout, &mut stderr)
}
