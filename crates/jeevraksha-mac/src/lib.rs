//! macOS-specific host integrations for jeevraksha.
//!
//! This crate hands `tel:` links to Launch Services via `open(1)`, which routes
//! them to FaceTime or a paired iPhone.

#![cfg(target_os = "macos")]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::process::{Command, Stdio};

/// Program used to open URLs on the host.
const OPENER: &str = "/usr/bin/open";

/// Build the command that opens `uri` with the registered handler.
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
/// # Errors
///
/// Returns an error if `open` could not be spawned.
pub fn dial(uri: &str) -> std::io::Result<()> {
    let child = open_command(uri).spawn()?;
    tracing::debug!(pid = child.id(), "handed {uri} to Launch Services");
    Ok(())
}

/// Get the platform name.
#[must_use]
pub fn platform_name() -> &'static str {
    "macOS"
}
