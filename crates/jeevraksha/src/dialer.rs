//! Handing emergency contact numbers to the host dialer.
//!
//! Calls are fire-and-forget: the number is passed to the platform's `tel:`
//! handler and nothing is reported back.

use std::sync::OnceLock;

use regex::Regex;
use tracing::info;

use crate::error::{Error, Result};
use crate::profile::Profile;

fn separator_regex() -> &'static Regex {
    static SEPARATORS: OnceLock<Regex> = OnceLock::new();
    SEPARATORS.get_or_init(|| Regex::new(r"[\s\-().]").expect("Invalid separator regex"))
}

fn number_regex() -> &'static Regex {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    NUMBER.get_or_init(|| Regex::new(r"^\+?[0-9]+$").expect("Invalid phone number regex"))
}

/// A `tel:` URI for a normalized phone number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TelUri {
    number: String,
}

impl TelUri {
    /// Normalize `phone` into a dialable number.
    ///
    /// Spaces, dashes, dots and parentheses are stripped. What remains must be
    /// digits with an optional leading `+`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPhoneNumber`] if nothing dialable is left.
    pub fn parse(phone: &str) -> Result<Self> {
        let number = separator_regex().replace_all(phone, "");
        if !number_regex().is_match(&number) {
            return Err(Error::InvalidPhoneNumber(phone.to_string()));
        }
        Ok(Self {
            number: number.into_owned(),
        })
    }

    /// The normalized number.
    #[must_use]
    pub fn number(&self) -> &str {
        &self.number
    }
}

impl std::fmt::Display for TelUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tel:{}", self.number)
    }
}

/// Which contact of a profile to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContactSlot {
    /// The required first contact.
    #[default]
    Primary,
    /// The optional second contact.
    Secondary,
}

/// Build the `tel:` URI for one of `profile`'s contacts.
///
/// # Errors
///
/// Returns [`Error::NoSecondaryContact`] if the secondary contact is requested
/// but absent, or [`Error::InvalidPhoneNumber`] if the number is not dialable.
pub fn contact_uri(profile: &Profile, slot: ContactSlot) -> Result<TelUri> {
    let contact = match slot {
        ContactSlot::Primary => profile.primary_contact(),
        ContactSlot::Secondary => profile
            .secondary_contact()
            .ok_or_else(|| Error::NoSecondaryContact(profile.id().to_string()))?,
    };
    TelUri::parse(contact.phone)
}

/// Hands `tel:` URIs to whatever places calls.
pub trait Dialer {
    /// Start a call to `uri`. Must not wait for the call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Dialer`] if the handler could not be launched.
    fn dial(&self, uri: &TelUri) -> Result<()>;
}

/// Dialer that uses the host platform's URL handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostDialer;

impl Dialer for HostDialer {
    #[cfg(target_os = "linux")]
    fn dial(&self, uri: &TelUri) -> Result<()> {
        info!("dialing {} via {}", uri.number(), jeevraksha_linux::platform_name());
        jeevraksha_linux::dial(&uri.to_string()).map_err(|e| Error::dialer(e.to_string()))
    }

    #[cfg(target_os = "macos")]
    fn dial(&self, uri: &TelUri) -> Result<()> {
        info!("dialing {} via {}", uri.number(), jeevraksha_mac::platform_name());
        jeevraksha_mac::dial(&uri.to_string()).map_err(|e| Error::dialer(e.to_string()))
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    fn dial(&self, uri: &TelUri) -> Result<()> {
        info!("no dialer available for {}", uri.number());
        Err(Error::dialer("no tel: handler on this platform"))
    }
}
