//! Storage layer for jeevraksha.
//!
//! This module provides the append-only profile store. The whole list lives
//! under one namespaced key as a single JSON blob and is rewritten on every
//! append.

pub mod blob;

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::profile::Profile;

/// Append-only store of profiles for this client.
///
/// The in-memory list always mirrors what was last written to disk.
#[derive(Debug)]
pub struct ProfileStore {
    /// Path to the blob holding the list.
    path: PathBuf,
    /// Profiles loaded at open plus everything appended since.
    profiles: Vec<Profile>,
}

impl ProfileStore {
    /// Open the store whose blob lives at `path`, loading any saved profiles.
    ///
    /// A missing or unreadable blob yields an empty store.
    #[must_use]
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let profiles = Self::read_list(&path);
        info!("Loaded {} profiles from {}", profiles.len(), path.display());
        Self { path, profiles }
    }

    /// Get the path to the storage blob.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the full profile list from durable storage.
    ///
    /// Returns an empty list if nothing was stored or the stored data cannot
    /// be parsed. Failures are logged, never returned.
    #[must_use]
    pub fn load_all(&self) -> Vec<Profile> {
        Self::read_list(&self.path)
    }

    fn read_list(path: &Path) -> Vec<Profile> {
        match blob::read(path) {
            Ok(Some(profiles)) => profiles,
            Ok(None) => {
                debug!("No saved profiles at {}", path.display());
                Vec::new()
            }
            Err(e) => {
                warn!("Ignoring unreadable profile store: {e}");
                Vec::new()
            }
        }
    }

    /// Profiles currently held by the store, in insertion order.
    #[must_use]
    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    /// Number of stored profiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Whether no profiles are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Find a stored profile by id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.id() == id)
    }

    /// Append a profile and persist the full updated list.
    ///
    /// The in-memory list only changes once the write has succeeded. Returns
    /// the new full list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateProfileId`] if the id is already stored, or a
    /// storage error if the list cannot be written.
    pub fn append(&mut self, profile: Profile) -> Result<&[Profile]> {
        if self.find(profile.id()).is_some() {
            return Err(Error::DuplicateProfileId {
                id: profile.id().to_string(),
            });
        }

        let mut updated = Vec::with_capacity(self.profiles.len() + 1);
        updated.extend_from_slice(&self.profiles);
        updated.push(profile);
        blob::write(&self.path, &updated)?;

        debug!("Appended profile, {} now stored", updated.len());
        self.profiles = updated;
        Ok(&self.profiles)
    }
}
