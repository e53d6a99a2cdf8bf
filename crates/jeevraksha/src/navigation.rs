//! Screen navigation for jeevraksha.
//!
//! Navigation is a small state machine. [`NavigationState::next`] is a pure
//! function from the current state and an [`Action`] to the next state plus any
//! [`Effect`]s the caller must run. The screens that show a profile carry it
//! inside their [`View`] variant, so they cannot be reached without one.

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::profile::Profile;

/// The screens of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Screen {
    /// Landing screen with the saved-profile list.
    Home,
    /// Registration form.
    Register,
    /// QR identifier of the active profile.
    QrView,
    /// Scanner (simulated by picking a saved profile).
    Scan,
    /// Emergency details of the active profile.
    ProfileDetail,
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Home => "Home",
            Self::Register => "Register",
            Self::QrView => "QrView",
            Self::Scan => "Scan",
            Self::ProfileDetail => "ProfileDetail",
        };
        f.write_str(name)
    }
}

/// Identifies one entry into the detail screen.
///
/// A summary result is only applied to the entry that requested it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SummaryTicket(u64);

/// Summary shown on the detail screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryState {
    /// A request is in flight.
    Loading {
        /// Ticket of the outstanding request.
        ticket: SummaryTicket,
    },
    /// The summary (or the fallback text) has arrived.
    Ready {
        /// Ticket of the request that produced this text.
        ticket: SummaryTicket,
        /// Text to show.
        text: String,
    },
}

impl SummaryState {
    /// Ticket this summary belongs to.
    #[must_use]
    pub fn ticket(&self) -> SummaryTicket {
        match self {
            Self::Loading { ticket } | Self::Ready { ticket, .. } => *ticket,
        }
    }

    /// The summary text, once available.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Loading { .. } => None,
            Self::Ready { text, .. } => Some(text),
        }
    }
}

/// What is currently on screen, with the data each screen needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum View {
    /// Home screen.
    #[default]
    Home,
    /// Registration form.
    Register,
    /// Scanner.
    Scan,
    /// QR identifier for `profile`.
    QrView {
        /// The active profile.
        profile: Profile,
    },
    /// Emergency details for `profile`.
    ProfileDetail {
        /// The active profile.
        profile: Profile,
        /// Generated summary for this entry.
        summary: SummaryState,
    },
}

impl View {
    /// The screen this view shows.
    #[must_use]
    pub fn screen(&self) -> Screen {
        match self {
            Self::Home => Screen::Home,
            Self::Register => Screen::Register,
            Self::Scan => Screen::Scan,
            Self::QrView { .. } => Screen::QrView,
            Self::ProfileDetail { .. } => Screen::ProfileDetail,
        }
    }

    /// The active profile, on screens that have one.
    #[must_use]
    pub fn active_profile(&self) -> Option<&Profile> {
        match self {
            Self::QrView { profile } | Self::ProfileDetail { profile, .. } => Some(profile),
            Self::Home | Self::Register | Self::Scan => None,
        }
    }
}

/// A request to summarize the profile of one detail-screen entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRequest {
    /// Entry the result must be delivered to.
    pub ticket: SummaryTicket,
    /// Profile to summarize.
    pub profile: Profile,
}

/// Side effects requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Generate a summary and deliver it with [`Action::SummaryReady`].
    Summarize(SummaryRequest),
}

/// Inputs to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Open the registration form.
    StartRegistration,
    /// Open the scanner.
    StartScan,
    /// A validated profile was stored; show its QR identifier.
    Registered(Profile),
    /// A saved profile was picked on the Home screen.
    SelectSaved(Profile),
    /// A profile was picked on the scanner.
    Scanned(Profile),
    /// A startup deep link resolved to a profile.
    DeepLinked(Profile),
    /// Return to the Home screen.
    Back,
    /// A summary request finished.
    SummaryReady {
        /// Ticket of the finished request.
        ticket: SummaryTicket,
        /// Generated or fallback text.
        text: String,
    },
}

impl Action {
    /// Short description used in error messages.
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            Self::StartRegistration => "start registration",
            Self::StartScan => "start scanning",
            Self::Registered(_) => "complete registration",
            Self::SelectSaved(_) => "select a saved profile",
            Self::Scanned(_) => "scan a profile",
            Self::DeepLinked(_) => "open a deep link",
            Self::Back => "go back",
            Self::SummaryReady { .. } => "deliver a summary",
        }
    }
}

/// Result of a transition: the next state and the effects to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// State after the action.
    pub state: NavigationState,
    /// Effects the caller must run.
    pub effects: Vec<Effect>,
}

/// Navigation state: the current view and the summary ticket counter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    view: View,
    next_ticket: u64,
}

impl NavigationState {
    /// The initial state: Home, no active profile.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current view.
    #[must_use]
    pub fn view(&self) -> &View {
        &self.view
    }

    /// Current screen.
    #[must_use]
    pub fn screen(&self) -> Screen {
        self.view.screen()
    }

    /// Active profile, if the current screen has one.
    #[must_use]
    pub fn active_profile(&self) -> Option<&Profile> {
        self.view.active_profile()
    }

    /// Summary state, when on the detail screen.
    #[must_use]
    pub fn summary(&self) -> Option<&SummaryState> {
        match &self.view {
            View::ProfileDetail { summary, .. } => Some(summary),
            _ => None,
        }
    }

    /// Whether the detail screen is waiting for its summary.
    #[must_use]
    pub fn is_summary_loading(&self) -> bool {
        matches!(self.summary(), Some(SummaryState::Loading { .. }))
    }

    /// Compute the transition for `action` without changing `self`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] if `action` is not defined for the
    /// current screen.
    pub fn next(&self, action: Action) -> Result<Transition> {
        let screen = self.screen();
        let mut next = self.clone();
        let mut effects = Vec::new();

        match action {
            Action::StartRegistration => next.view = View::Register,
            Action::StartScan => next.view = View::Scan,
            Action::Registered(profile) if screen == Screen::Register => {
                next.view = View::QrView { profile };
            }
            Action::SelectSaved(profile) if screen == Screen::Home => {
                next.view = View::QrView { profile };
            }
            Action::Scanned(profile) if screen == Screen::Scan => {
                effects.push(next.enter_detail(profile));
            }
            Action::DeepLinked(profile) => {
                effects.push(next.enter_detail(profile));
            }
            Action::Back if screen != Screen::Home => next.view = View::Home,
            Action::SummaryReady { ticket, text } => next.deliver_summary(ticket, text),
            other => return Err(Error::invalid_transition(screen, other.describe())),
        }

        Ok(Transition {
            state: next,
            effects,
        })
    }

    /// Apply `action` in place and return the effects to run.
    ///
    /// On error the state is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] if `action` is not defined for the
    /// current screen.
    pub fn apply(&mut self, action: Action) -> Result<Vec<Effect>> {
        let Transition { state, effects } = self.next(action)?;
        *self = state;
        Ok(effects)
    }

    fn enter_detail(&mut self, profile: Profile) -> Effect {
        let ticket = SummaryTicket(self.next_ticket);
        self.next_ticket += 1;
        self.view = View::ProfileDetail {
            profile: profile.clone(),
            summary: SummaryState::Loading { ticket },
        };
        Effect::Summarize(SummaryRequest { ticket, profile })
    }

    fn deliver_summary(&mut self, ticket: SummaryTicket, text: String) {
        match &mut self.view {
            View::ProfileDetail { summary, .. }
                if *summary == (SummaryState::Loading { ticket }) =>
            {
                *summary = SummaryState::Ready { ticket, text };
            }
            _ => debug!(?ticket, "discarding stale summary"),
        }
    }
}
