//! `jeevraksha` - Emergency profiles behind a QR code
//!
//! This library registers emergency profiles (medical details and contacts),
//! stores them locally, and shows them again to a responder who scans the
//! profile's QR token or follows a `#profile-<id>` link, together with a
//! generated emergency summary.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod app;
pub mod cli;
pub mod config;
pub mod deeplink;
pub mod dialer;
pub mod error;
pub mod logging;
pub mod navigation;
pub mod profile;
pub mod qr;
pub mod render;
pub mod storage;
pub mod summary;

pub use app::App;
pub use config::Config;
pub use dialer::{ContactSlot, Dialer, HostDialer, TelUri};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use navigation::{Action, Effect, NavigationState, Screen, SummaryState, View};
pub use profile::{Profile, ProfileField, ProfileForm, ValidationError};
pub use qr::QrToken;
pub use storage::ProfileStore;
pub use summary::{gemini::GeminiGenerator, Summarizer, TextGenerator};
