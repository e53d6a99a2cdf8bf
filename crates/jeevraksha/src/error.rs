//! Error types for jeevraksha.
//!
//! This module defines the crate-wide error type. Summary generation failures
//! have their own type in [`crate::summary`] and never reach this enum.

use std::path::PathBuf;
use thiserror::Error;

use crate::navigation::Screen;
use crate::profile::ValidationError;

/// The main error type for jeevraksha operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Validation Errors ===
    /// A submitted registration form failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    // === Storage Errors ===
    /// The persisted profile list could not be parsed.
    ///
    /// Recovered inside the store by treating the list as empty.
    #[error("failed to parse stored profiles at {path}: {source}")]
    StorageParse {
        /// Path to the storage blob.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// The profile list could not be written back to storage.
    #[error("failed to write profiles to {path}: {source}")]
    StorageWrite {
        /// Path to the storage blob.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A profile with the same id is already stored.
    #[error("a profile with id '{id}' already exists")]
    DuplicateProfileId {
        /// The conflicting id.
        id: String,
    },

    /// No stored profile matches the given id or token.
    #[error("no profile found for '{0}'")]
    ProfileNotFound(String),

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Navigation Errors ===
    /// The requested action is not defined for the current screen.
    #[error("cannot {action} from the {screen} screen")]
    InvalidTransition {
        /// Screen that was active when the action was dispatched.
        screen: Screen,
        /// Name of the rejected action.
        action: &'static str,
    },

    // === Host Integration Errors ===
    /// A phone number could not be turned into a `tel:` link.
    #[error("invalid phone number: '{0}'")]
    InvalidPhoneNumber(String),

    /// The profile has no secondary contact to call.
    #[error("profile '{0}' has no secondary contact")]
    NoSecondaryContact(String),

    /// Handing a number to the host dialer failed.
    #[error("failed to launch dialer: {0}")]
    Dialer(String),

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for jeevraksha operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a new dialer error.
    #[must_use]
    pub fn dialer(message: impl Into<String>) -> Self {
        Self::Dialer(message.into())
    }

    /// Create an invalid transition error.
    #[must_use]
    pub fn invalid_transition(screen: Screen, action: &'static str) -> Self {
        Self::InvalidTransition { screen, action }
    }

    /// Check if this error came from form validation.
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this error is a rejected navigation.
    #[must_use]
    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, Self::InvalidTransition { .. })
    }
}
