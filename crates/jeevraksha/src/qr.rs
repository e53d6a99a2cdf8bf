//! QR identifier tokens.
//!
//! The token encoded into a profile's QR code is `JE-<id>`. Drawing the code
//! itself is left to whatever renders the token.

use serde::Serialize;

use crate::profile::Profile;

/// Prefix of every token.
pub const TOKEN_PREFIX: &str = "JE-";

/// The opaque string encoded into a profile's QR code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct QrToken(String);

impl QrToken {
    /// Token for `profile`.
    #[must_use]
    pub fn for_profile(profile: &Profile) -> Self {
        Self::for_id(profile.id())
    }

    /// Token for the profile with `id`.
    #[must_use]
    pub fn for_id(id: &str) -> Self {
        Self(format!("{TOKEN_PREFIX}{id}"))
    }

    /// The token text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The profile id embedded in the token.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.0[TOKEN_PREFIX.len()..]
    }

    /// Parse scanned text back into a token.
    ///
    /// Returns `None` if the text lacks the prefix or the id is empty or not
    /// alphanumeric.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let id = text.trim().strip_prefix(TOKEN_PREFIX)?;
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }
        Some(Self::for_id(id))
    }
}

impl std::fmt::Display for QrToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Accept either a bare profile id or a scanned token and return the id.
#[must_use]
pub fn id_from_input(input: &str) -> &str {
    let trimmed = input.trim();
    match trimmed.strip_prefix(TOKEN_PREFIX) {
        Some(id) if !id.is_empty() => id,
        _ => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::tests::profile_with_id;

    #[test]
    fn test_token_for_profile() {
        let token = QrToken::for_profile(&profile_with_id("abc123xyz"));
        assert_eq!(token.as_str(), "JE-abc123xyz");
        assert_eq!(token.to_string(), "JE-abc123xyz");
        assert_eq!(token.id(), "abc123xyz");
    }

    #[test]
    fn test_parse_token() {
        let token = QrToken::parse(" JE-abc123xyz\n").unwrap();
        assert_eq!(token.id(), "abc123xyz");
    }

    #[test]
    fn test_parse_rejects_foreign_text() {
        assert!(QrToken::parse("abc123xyz").is_none());
        assert!(QrToken::parse("JE-").is_none());
        assert!(QrToken::parse("JE-abc 123").is_none());
        assert!(QrToken::parse("https://example.com").is_none());
    }

    #[test]
    fn test_id_from_input() {
        assert_eq!(id_from_input("JE-abc123xyz"), "abc123xyz");
        assert_eq!(id_from_input("abc123xyz"), "abc123xyz");
        assert_eq!(id_from_input("  abc123xyz "), "abc123xyz");
        assert_eq!(id_from_input("JE-"), "JE-");
    }

    #[test]
    fn test_token_serializes_as_string() {
        let json = serde_json::to_string(&QrToken::for_id("abc123xyz")).unwrap();
        assert_eq!(json, "\"JE-abc123xyz\"");
    }
}
