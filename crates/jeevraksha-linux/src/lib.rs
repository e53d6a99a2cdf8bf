//! Linux-specific host integrations for jeevraksha
//!
//! Hands `tel:` links to the desktop's URL handler through `xdg-open`.

#![cfg(target_os = "linux")]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::process::{Command, Stdio};

/// Program used to open URLs on the host.
const OPENER: &str = "xdg-open";

/// Build the command that opens `uri` with the host's registered handler.
#[must_use]
pub fn open_command(uri: &str) -> Command {
    let mut cmd = Command::new(OPENER);
    cmd.arg(uri)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    cmd
}

/// Hand a `tel:` URI to the host dialer.
///
/// The child process is detached; its exit status is never collected.
///
/// # Errors
///
/// Returns an error if the opener could not be spawned.
pub fn dial(uri: &str) -> std::io::Result<()> {
    let child = open_command(uri).spawn()?;
    tracing::debug!(pid = child.id(), "spawned {OPENER} for {uri}");
    Ok(())
}

/// Get platform name
#[must_use]
pub fn platform_name() -> &'static str {
    "Linux"
}
