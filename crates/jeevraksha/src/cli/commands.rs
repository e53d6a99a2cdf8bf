//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::dialer::ContactSlot;
use crate::profile::{ProfileField, ProfileForm};

/// Home screen arguments.
#[derive(Debug, Args)]
pub struct HomeCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Registration form.
///
/// Every field is optional here so that the form validator, not the argument
/// parser, reports what is missing.
#[derive(Debug, Default, Args)]
pub struct RegisterCommand {
    /// Full name
    #[arg(long)]
    pub full_name: Option<String>,

    /// Age
    #[arg(long)]
    pub age: Option<String>,

    /// Blood group (e.g. "O+")
    #[arg(long)]
    pub blood_group: Option<String>,

    /// Primary emergency contact name
    #[arg(long)]
    pub contact1_name: Option<String>,

    /// Primary emergency contact phone
    #[arg(long)]
    pub contact1_phone: Option<String>,

    /// Secondary emergency contact name
    #[arg(long)]
    pub contact2_name: Option<String>,

    /// Secondary emergency contact phone
    #[arg(long)]
    pub contact2_phone: Option<String>,

    /// Current medical conditions
    #[arg(long)]
    pub conditions: Option<String>,

    /// Known allergies
    #[arg(long)]
    pub allergies: Option<String>,

    /// Home address
    #[arg(long)]
    pub address: Option<String>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

impl RegisterCommand {
    /// Collect the supplied values into a registration form.
    #[must_use]
    pub fn to_form(&self) -> ProfileForm {
        let values = [
            (ProfileField::FullName, &self.full_name),
            (ProfileField::Age, &self.age),
            (ProfileField::BloodGroup, &self.blood_group),
            (ProfileField::EmergencyContact1Name, &self.contact1_name),
            (ProfileField::EmergencyContact1Phone, &self.contact1_phone),
            (ProfileField::EmergencyContact2Name, &self.contact2_name),
            (ProfileField::EmergencyContact2Phone, &self.contact2_phone),
            (ProfileField::MedicalConditions, &self.conditions),
            (ProfileField::Allergies, &self.allergies),
            (ProfileField::Address, &self.address),
        ];

        let mut form = ProfileForm::default();
        for (field, value) in values {
            if let Some(value) = value {
                form.set(field, value.as_str());
            }
        }
        form
    }
}

/// Arguments naming one saved profile.
#[derive(Debug, Args)]
pub struct ProfileCommand {
    /// Profile id or QR token (`JE-<id>`)
    pub profile: String,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Deep-link arguments.
#[derive(Debug, Args)]
pub struct OpenCommand {
    /// Location fragment, e.g. `#profile-abc123xyz`
    pub fragment: String,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Call command arguments.
#[derive(Debug, Args)]
pub struct CallCommand {
    /// Profile id or QR token (`JE-<id>`)
    pub profile: String,

    /// Call the secondary contact instead of the primary
    #[arg(short, long)]
    pub secondary: bool,

    /// Print the `tel:` link without launching the dialer
    #[arg(long)]
    pub dry_run: bool,
}

impl CallCommand {
    /// Which contact to call.
    #[must_use]
    pub fn slot(&self) -> ContactSlot {
        if self.secondary {
            ContactSlot::Secondary
        } else {
            ContactSlot::Primary
        }
    }
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
