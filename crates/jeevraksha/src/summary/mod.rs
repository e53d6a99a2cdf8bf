//! Emergency summary generation.
//!
//! A [`Summarizer`] turns a profile into a prompt, hands it to a
//! [`TextGenerator`] and always comes back with displayable text: any failure
//! of the generator is logged and replaced by [`FALLBACK_SUMMARY`].

pub mod gemini;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, error};

use crate::profile::Profile;

/// Text shown when a summary could not be generated.
pub const FALLBACK_SUMMARY: &str = "Unable to generate emergency summary at this time.";

/// Placeholder used in the prompt for absent medical details.
const NONE_REPORTED: &str = "None reported";

/// Errors raised by a text-generation backend.
///
/// These never leave the summary module; [`Summarizer::summarize`] recovers
/// from all of them.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// No API key is configured.
    #[error("no API key configured for the text-generation service")]
    MissingApiKey,

    /// The request could not be sent or the connection failed.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("service returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// The response could not be understood.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The service refused to produce text.
    #[error("provider declined the request: {0}")]
    Provider(String),
}

/// Sampling configuration sent with every request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    /// Model identifier.
    pub model: &'static str,
    /// Sampling temperature.
    pub temperature: f64,
    /// Nucleus-sampling probability mass.
    pub top_p: f64,
}

impl SamplingParams {
    /// The fixed parameters used for emergency summaries.
    pub const EMERGENCY: Self = Self {
        model: "gemini-3-flash-preview",
        temperature: 0.7,
        top_p: 0.95,
    };
}

/// Backend that turns a prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Name of this backend (for logging).
    fn name(&self) -> &'static str;

    /// Generate text for `prompt`.
    ///
    /// # Errors
    ///
    /// Returns a [`GenerationError`] if the backend fails in any way.
    async fn generate(
        &self,
        prompt: &str,
        params: &SamplingParams,
    ) -> Result<String, GenerationError>;
}

#[async_trait]
impl<T: TextGenerator + ?Sized> TextGenerator for Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn generate(
        &self,
        prompt: &str,
        params: &SamplingParams,
    ) -> Result<String, GenerationError> {
        (**self).generate(prompt, params).await
    }
}

/// Build the prompt describing `profile` to the text generator.
#[must_use]
pub fn build_prompt(profile: &Profile) -> String {
    let contact = profile.primary_contact();
    format!(
        "Based on the following emergency contact information, provide a concise, \
         high-priority emergency summary that medical responders or police would need.\n\
         Focus on life-saving details and quick actions.\n\
         \n\
         Data:\n\
         Name: {name}\n\
         Age: {age}\n\
         Blood Group: {blood}\n\
         Medical Conditions: {conditions}\n\
         Allergies: {allergies}\n\
         Emergency Contacts: {contact_name} ({contact_phone})\n",
        name = profile.full_name(),
        age = profile.age(),
        blood = profile.blood_group(),
        conditions = profile.medical_conditions().unwrap_or(NONE_REPORTED),
        allergies = profile.allergies().unwrap_or(NONE_REPORTED),
        contact_name = contact.name,
        contact_phone = contact.phone,
    )
}

/// Produces emergency summaries, falling back to fixed text on failure.
///
/// Cloning is cheap; clones share the same backend.
#[derive(Clone)]
pub struct Summarizer {
    generator: Arc<dyn TextGenerator>,
}

impl std::fmt::Debug for Summarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Summarizer")
            .field("generator", &self.generator.name())
            .finish()
    }
}

impl Summarizer {
    /// Create a summarizer backed by `generator`.
    pub fn new(generator: impl TextGenerator + 'static) -> Self {
        Self {
            generator: Arc::new(generator),
        }
    }

    /// Generate a summary for `profile`.
    ///
    /// Makes exactly one request. Never fails: errors are logged and
    /// [`FALLBACK_SUMMARY`] is returned instead.
    pub async fn summarize(&self, profile: &Profile) -> String {
        let prompt = build_prompt(profile);
        debug!(
            generator = self.generator.name(),
            profile = profile.id(),
            "requesting emergency summary"
        );

        match self
            .generator
            .generate(&prompt, &SamplingParams::EMERGENCY)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                error!(
                    generator = self.generator.name(),
                    profile = profile.id(),
                    "summary generation failed: {e}"
                );
                FALLBACK_SUMMARY.to_string()
            }
        }
    }
}
