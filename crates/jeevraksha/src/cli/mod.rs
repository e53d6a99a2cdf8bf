//! Command-line interface for jeevraksha.
//!
//! This module provides the CLI structure for the `jeevraksha` binary. Each
//! command drives the application through the same screens a user would.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    CallCommand, ConfigCommand, HomeCommand, OpenCommand, ProfileCommand, RegisterCommand,
};

/// jeevraksha - Emergency profiles behind a QR code
///
/// Register the medical details and emergency contacts of someone who may not
/// be able to speak for themselves, and pull them up again from their QR
/// token or a `#profile-<id>` link.
#[derive(Debug, Parser)]
#[command(name = "jeevraksha")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the Home screen with saved profiles
    Home(HomeCommand),

    /// Register a new profile and show its QR card
    Register(RegisterCommand),

    /// Show the QR card of a saved profile
    Qr(ProfileCommand),

    /// Simulate scanning a profile's QR code
    Scan(ProfileCommand),

    /// Start from a deep link such as `#profile-<id>`
    Open(OpenCommand),

    /// Call one of a profile's emergency contacts
    Call(CallCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
