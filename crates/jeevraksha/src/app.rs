//! Application controller.
//!
//! [`App`] owns the profile store, the navigation state and the summarizer.
//! It turns user intents into [`Action`]s, performs the store writes that go
//! with them, and runs the [`Effect`]s the state machine asks for.

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::deeplink;
use crate::error::{Error, Result};
use crate::navigation::{Action, Effect, NavigationState, Screen};
use crate::profile::{Profile, ProfileForm};
use crate::qr;
use crate::storage::ProfileStore;
use crate::summary::Summarizer;

/// The running application.
#[derive(Debug)]
pub struct App {
    store: ProfileStore,
    state: NavigationState,
    summarizer: Summarizer,
}

impl App {
    /// Create an application on the Home screen.
    #[must_use]
    pub fn new(store: ProfileStore, summarizer: Summarizer) -> Self {
        Self {
            store,
            state: NavigationState::new(),
            summarizer,
        }
    }

    /// Start the application, resolving an optional deep-link fragment.
    ///
    /// A fragment naming a stored profile opens its detail screen; anything
    /// else leaves the application on Home. Returns the effects to run.
    pub fn start(
        store: ProfileStore,
        summarizer: Summarizer,
        fragment: Option<&str>,
    ) -> (Self, Vec<Effect>) {
        let mut app = Self::new(store, summarizer);
        let linked = fragment.and_then(|f| deeplink::resolve(app.store.profiles(), f).cloned());

        let effects = match linked.map(|profile| app.state.apply(Action::DeepLinked(profile))) {
            Some(Ok(effects)) => effects,
            Some(Err(e)) => {
                warn!("ignoring deep link: {e}");
                Vec::new()
            }
            None => Vec::new(),
        };
        info!("started on the {} screen", app.state.screen());
        (app, effects)
    }

    /// Current navigation state.
    #[must_use]
    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    /// The profile store.
    #[must_use]
    pub fn store(&self) -> &ProfileStore {
        &self.store
    }

    /// Saved profiles, in registration order.
    #[must_use]
    pub fn saved_profiles(&self) -> &[Profile] {
        self.store.profiles()
    }

    /// Apply a navigation action.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] if the action is not defined for
    /// the current screen.
    pub fn dispatch(&mut self, action: Action) -> Result<Vec<Effect>> {
        debug!(screen = %self.state.screen(), "dispatching {}", action.describe());
        self.state.apply(action)
    }

    /// Submit the registration form.
    ///
    /// On success the profile is stored and becomes active on the QR screen.
    /// On any failure nothing is stored and the Register screen stays up.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] when not on the Register screen,
    /// [`Error::Validation`] naming the first blank required field, or a
    /// storage error if the profile could not be written.
    pub fn submit_registration(&mut self, form: ProfileForm) -> Result<Profile> {
        if self.state.screen() != Screen::Register {
            return Err(Error::invalid_transition(
                self.state.screen(),
                "complete registration",
            ));
        }

        let profile = form.into_profile()?;
        let transition = self.state.next(Action::Registered(profile.clone()))?;
        self.store.append(profile.clone())?;
        self.state = transition.state;

        info!("registered profile {}", profile.id());
        Ok(profile)
    }

    /// Look up a stored profile by id or QR token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProfileNotFound`] if nothing matches.
    pub fn resolve_profile(&self, id_or_token: &str) -> Result<Profile> {
        let id = qr::id_from_input(id_or_token);
        self.store
            .find(id)
            .cloned()
            .ok_or_else(|| Error::ProfileNotFound(id_or_token.to_string()))
    }

    /// Pick a saved profile on the Home screen.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProfileNotFound`] or [`Error::InvalidTransition`].
    pub fn select_saved(&mut self, id_or_token: &str) -> Result<Vec<Effect>> {
        let profile = self.resolve_profile(id_or_token)?;
        self.dispatch(Action::SelectSaved(profile))
    }

    /// Simulate scanning a profile's code on the Scan screen.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProfileNotFound`] or [`Error::InvalidTransition`].
    pub fn scan(&mut self, id_or_token: &str) -> Result<Vec<Effect>> {
        let profile = self.resolve_profile(id_or_token)?;
        self.dispatch(Action::Scanned(profile))
    }

    /// Start running `effect` in the background.
    ///
    /// The returned task yields the action to dispatch once it completes.
    #[must_use]
    pub fn spawn_effect(&self, effect: Effect) -> JoinHandle<Action> {
        let summarizer = self.summarizer.clone();
        tokio::spawn(async move {
            match effect {
                Effect::Summarize(request) => {
                    let text = summarizer.summarize(&request.profile).await;
                    Action::SummaryReady {
                        ticket: request.ticket,
                        text,
                    }
                }
            }
        })
    }

    /// Run `effects` to completion and dispatch their results.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Internal`] if an effect task panicked.
    pub async fn run_effects(&mut self, effects: Vec<Effect>) -> Result<()> {
        let handles: Vec<_> = effects.into_iter().map(|e| self.spawn_effect(e)).collect();
        for handle in handles {
            let action = handle
                .await
                .map_err(|e| Error::internal(format!("effect task failed: {e}")))?;
            let follow_up = self.dispatch(action)?;
            debug_assert!(follow_up.is_empty());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::SummaryState;
    use crate::profile::tests::{asha_form, profile_with_id};
    use crate::profile::{ProfileField, ValidationError};
    use crate::summary::tests::FakeGenerator;
    use crate::summary::FALLBACK_SUMMARY;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    fn store_in(dir: &tempfile::TempDir) -> ProfileStore {
        ProfileStore::open(dir.path().join("jeevraksha_profiles.json"))
    }

    fn app_in(dir: &tempfile::TempDir, generator: FakeGenerator) -> App {
        App::new(store_in(dir), Summarizer::new(generator))
    }

    #[test]
    fn test_submit_registration_stores_and_shows_qr() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir, FakeGenerator::failing());
        app.dispatch(Action::StartRegistration).unwrap();

        let profile = app.submit_registration(asha_form()).unwrap();
        assert_eq!(app.state().screen(), Screen::QrView);
        assert_eq!(app.state().active_profile(), Some(&profile));
        assert_eq!(app.saved_profiles(), &[profile.clone()]);
        assert_eq!(store_in(&dir).profiles(), &[profile]);
    }

    #[test]
    fn test_submit_invalid_form_stays_on_register() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir, FakeGenerator::failing());
        app.dispatch(Action::StartRegistration).unwrap();

        let mut form = asha_form();
        form.blood_group = String::new();
        let err = app.submit_registration(form).unwrap_err();

        assert!(matches!(
            err,
            Error::Validation(ValidationError::MissingField(ProfileField::BloodGroup))
        ));
        assert_eq!(app.state().screen(), Screen::Register);
        assert!(app.saved_profiles().is_empty());
        assert!(store_in(&dir).is_empty());
    }

    #[test]
    fn test_submit_outside_register_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir, FakeGenerator::failing());

        let err = app.submit_registration(asha_form()).unwrap_err();
        assert!(err.is_invalid_transition());
        assert!(app.saved_profiles().is_empty());
    }

    #[test]
    fn test_failed_store_write_stays_on_register() {
        let dir = tempfile::tempdir().unwrap();
        let blob = dir.path().join("blocked.json");
        std::fs::create_dir(&blob).unwrap();
        std::fs::write(blob.join("keep"), "x").unwrap();

        let mut app = App::new(
            ProfileStore::open(&blob),
            Summarizer::new(FakeGenerator::failing()),
        );
        app.dispatch(Action::StartRegistration).unwrap();

        assert!(app.submit_registration(asha_form()).is_err());
        assert_eq!(app.state().screen(), Screen::Register);
        assert!(app.saved_profiles().is_empty());
    }

    #[test]
    fn test_resolve_profile_by_id_or_token() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        store.append(profile_with_id("abc123xyz")).unwrap();
        let app = App::new(store, Summarizer::new(FakeGenerator::failing()));

        assert_eq!(app.resolve_profile("abc123xyz").unwrap().id(), "abc123xyz");
        assert_eq!(app.resolve_profile("JE-abc123xyz").unwrap().id(), "abc123xyz");
        assert!(matches!(
            app.resolve_profile("doesnotexist"),
            Err(Error::ProfileNotFound(_))
        ));
    }

    #[test]
    fn test_select_saved_from_home() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        store.append(profile_with_id("abc123xyz")).unwrap();
        let mut app = App::new(store, Summarizer::new(FakeGenerator::failing()));

        assert!(app.select_saved("abc123xyz").unwrap().is_empty());
        assert_eq!(app.state().screen(), Screen::QrView);
    }

    #[test]
    fn test_start_with_unknown_fragment_stays_home() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        store.append(profile_with_id("abc123xyz")).unwrap();

        let (app, effects) = App::start(
            store,
            Summarizer::new(FakeGenerator::failing()),
            Some("#profile-doesnotexist"),
        );
        assert!(effects.is_empty());
        assert_eq!(app.state().screen(), Screen::Home);
        assert!(app.state().active_profile().is_none());
    }

    #[tokio::test]
    async fn test_start_with_deep_link_loads_summary() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        store.append(profile_with_id("abc123xyz")).unwrap();

        let (mut app, effects) = App::start(
            store,
            Summarizer::new(FakeGenerator::replying("O+, call Raj.")),
            Some("#profile-abc123xyz"),
        );
        assert_eq!(app.state().screen(), Screen::ProfileDetail);
        assert!(app.state().is_summary_loading());
        assert_eq!(effects.len(), 1);

        app.run_effects(effects).await.unwrap();
        assert_eq!(
            app.state().summary().and_then(SummaryState::text),
            Some("O+, call Raj.")
        );
    }

    #[tokio::test]
    async fn test_scan_shows_fallback_when_generation_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        store.append(profile_with_id("abc123xyz")).unwrap();
        let generator = Arc::new(FakeGenerator::failing());
        let mut app = App::new(store, Summarizer::new(Arc::clone(&generator)));

        app.dispatch(Action::StartScan).unwrap();
        let effects = app.scan("JE-abc123xyz").unwrap();
        app.run_effects(effects).await.unwrap();

        assert_eq!(
            app.state().summary().and_then(SummaryState::text),
            Some(FALLBACK_SUMMARY)
        );
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_summary_arriving_after_back_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        store.append(profile_with_id("abc123xyz")).unwrap();
        let mut app = App::new(store, Summarizer::new(FakeGenerator::replying("late")));

        app.dispatch(Action::StartScan).unwrap();
        let mut effects = app.scan("abc123xyz").unwrap();
        let pending = app.spawn_effect(effects.remove(0));

        app.dispatch(Action::Back).unwrap();
        let action = pending.await.unwrap();
        app.dispatch(action).unwrap();

        assert_eq!(app.state().screen(), Screen::Home);
        assert!(app.state().summary().is_none());
    }

    #[tokio::test]
    async fn test_each_detail_entry_requests_one_summary() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        store.append(profile_with_id("abc123xyz")).unwrap();
        let generator = Arc::new(FakeGenerator::replying("ok"));
        let mut app = App::new(store, Summarizer::new(Arc::clone(&generator)));

        for _ in 0..2 {
            app.dispatch(Action::StartScan).unwrap();
            let effects = app.scan("abc123xyz").unwrap();
            app.run_effects(effects).await.unwrap();
            app.dispatch(Action::Back).unwrap();
        }
        assert_eq!(generator.calls.load(Ordering::SeqCst), 2);
    }
}
