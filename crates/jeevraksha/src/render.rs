//! Plain-text and JSON rendering of the screens.

use std::fmt::Write as _;

use serde_json::{json, Value};

use crate::navigation::{SummaryState, View};
use crate::profile::Profile;
use crate::qr::QrToken;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Render `view` as text. `profiles` is the saved list shown on Home.
#[must_use]
pub fn render_view(view: &View, profiles: &[Profile]) -> String {
    match view {
        View::Home => render_home(profiles),
        View::Register => "Register a new emergency profile.\n".to_string(),
        View::Scan => render_scan(profiles),
        View::QrView { profile } => render_qr(profile),
        View::ProfileDetail { profile, summary } => render_detail(profile, summary),
    }
}

/// The Home screen with the saved-profile list.
#[must_use]
pub fn render_home(profiles: &[Profile]) -> String {
    let mut out = String::from("JeevRaksha\n");
    if profiles.is_empty() {
        out.push_str("\nNo saved profiles.\n");
        return out;
    }

    out.push_str("\nYour Saved Profiles\n");
    for profile in profiles {
        let _ = writeln!(
            out,
            "  [{}] {}  {}\n      Registered on {}",
            profile.initial().unwrap_or('?'),
            profile.full_name(),
            profile.id(),
            profile.created_at().format(DATE_FORMAT)
        );
    }
    out
}

fn render_scan(profiles: &[Profile]) -> String {
    let mut out = String::from("Point at JeevRaksha QR\n");
    for profile in profiles {
        let _ = writeln!(out, "  Simulate Scan: {}", profile.full_name());
    }
    out
}

/// The QR card for `profile`.
#[must_use]
pub fn render_qr(profile: &Profile) -> String {
    format!(
        "Your JeevRaksha QR\n\n  Name:  {}\n  Token: {}\n\nStatus: Active\n",
        profile.full_name(),
        QrToken::for_profile(profile)
    )
}

/// The emergency detail card for `profile`.
#[must_use]
pub fn render_detail(profile: &Profile, summary: &SummaryState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", profile.full_name());
    let _ = writeln!(
        out,
        "Blood: {}  Age: {}",
        profile.blood_group(),
        profile.age()
    );

    out.push_str("\nEmergency AI Summary\n");
    match summary.text() {
        Some(text) => {
            let _ = writeln!(out, "  \"{}\"", text.trim());
        }
        None => out.push_str("  Loading...\n"),
    }

    out.push_str("\nCall Contacts\n");
    let primary = profile.primary_contact();
    let _ = writeln!(out, "  Primary:   {} ({})", primary.name, primary.phone);
    if let Some(secondary) = profile.secondary_contact() {
        let _ = writeln!(out, "  Secondary: {} ({})", secondary.name, secondary.phone);
    }

    let _ = writeln!(out, "\nHome Address\n  {}", profile.address());

    let conditions = profile.medical_conditions();
    let allergies = profile.allergies();
    if conditions.is_some() || allergies.is_some() {
        out.push_str("\nMedical Info\n");
        if let Some(conditions) = conditions {
            let _ = writeln!(out, "  Conditions: {conditions}");
        }
        if let Some(allergies) = allergies {
            let _ = writeln!(out, "  Allergies:  {allergies}");
        }
    }
    out
}

/// Render `view` as a JSON document.
#[must_use]
pub fn view_json(view: &View, profiles: &[Profile]) -> Value {
    let screen = view.screen();
    match view {
        View::Home | View::Scan => json!({ "screen": screen, "profiles": profiles }),
        View::Register => json!({ "screen": screen }),
        View::QrView { profile } => json!({
            "screen": screen,
            "profile": profile,
            "token": QrToken::for_profile(profile),
        }),
        View::ProfileDetail { profile, summary } => json!({
            "screen": screen,
            "profile": profile,
            "summary": summary.text(),
            "loading": summary.text().is_none(),
        }),
    }
}
