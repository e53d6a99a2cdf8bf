//! Startup deep links of the form `#profile-<id>`.
//!
//! Resolution runs once, when the application starts. A link naming an
//! unknown id is ignored and the application stays on the Home screen.

use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info};

use crate::profile::Profile;

/// Prefix of a profile fragment, after the optional `#`.
pub const FRAGMENT_PREFIX: &str = "profile-";

fn fragment_regex() -> &'static Regex {
    static FRAGMENT: OnceLock<Regex> = OnceLock::new();
    FRAGMENT.get_or_init(|| {
        Regex::new(r"^#?profile-([A-Za-z0-9]+)$").expect("Invalid deep link regex")
    })
}

/// Extract the profile id from a location fragment.
///
/// Accepts the fragment with or without the leading `#`. Returns `None` for
/// anything that is not a profile link.
#[must_use]
pub fn parse_fragment(fragment: &str) -> Option<&str> {
    fragment_regex()
        .captures(fragment.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Build the fragment that links to the profile with `id`.
#[must_use]
pub fn fragment_for(id: &str) -> String {
    format!("#{FRAGMENT_PREFIX}{id}")
}

/// Resolve a fragment against the stored profiles.
#[must_use]
pub fn resolve<'a>(profiles: &'a [Profile], fragment: &str) -> Option<&'a Profile> {
    let Some(id) = parse_fragment(fragment) else {
        debug!("ignoring non-profile fragment {fragment:?}");
        return None;
    };

    let found = profiles.iter().find(|p| p.id() == id);
    match found {
        Some(_) => info!("deep link resolved to profile {id}"),
        None => info!("deep link names unknown profile {id}"),
    }
    found
}
