//! Background detach.
//!
//! The foreground invocation re-executes the binary with the same arguments
//! and a marker variable, reports the child's PID and exits. The child starts a
//! new session, drops its terminal streams and carries on as the daemon.

use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::core::errors::{Result, WatchError};

/// Set in the environment of the detached child.
pub const DETACHED_ENV: &str = "RWATCH_DETACHED";

/// Whether this process is the already-detached child.
#[must_use]
pub fn is_detached_child() -> bool {
    std::env::var_os(DETACHED_ENV).is_some()
}

/// Spawn the detached child and return its PID.
pub fn spawn_detached(exe: &Path, args: impl IntoIterator<Item = OsString>) -> Result<u32> {
    let child = Command::new(exe)
        .args(args)
        .env(DETACHED_ENV, "1")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| WatchError::io(exe, e))?;
    Ok(child.id())
}

/// Re-execute the running binary in the background.
pub fn spawn_self_detached() -> Result<u32> {
    let exe = std::env::current_exe().map_err(|e| WatchError::io("/proc/self/exe", e))?;
    spawn_detached(&exe, std::env::args_os().skip(1))
}

/// Detach from the controlling terminal's session.
pub fn enter_new_session() -> Result<()> {
    nix::unistd::setsid()
        .map(|_| ())
        .map_err(|errno| WatchError::Runtime {
            details: format!("setsid failed: {errno}"),
        })
}
