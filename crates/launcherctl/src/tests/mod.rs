//! Runtime tests for `launcherctl`.

mod support;
