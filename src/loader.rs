use std::sync::{Mutex, MutexGuard};

use log::{debug, trace, warn};

use crate::errors::FetchError;
use crate::github::ProfileSource;
use crate::profile::{is_missing, ProfileRecord};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Success,
    Error(String),
}

/// Identifier, status and record of the loader, always updated together.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProfileState {
    pub identifier: String,
    pub load_state: LoadState,
    pub record: Option<ProfileRecord>,
    /// Bumped on every new request; completions carrying an older value
    /// are stale.
    generation: u64,
}

/// Ties a completion back to the request that started it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Identifier unchanged, nothing was requested.
    Skipped,
    /// The result (or input error) is now the visible state.
    Applied,
    /// A newer request superseded this one before it finished.
    Discarded,
}

impl ProfileState {
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.generation == ticket.0
    }

    /// A new identifier arrived: forget the previous result and wait.
    pub fn load_start(&mut self, identifier: &str) -> Ticket {
        self.generation += 1;
        self.identifier = identifier.to_owned();
        self.load_state = LoadState::Loading;
        self.record = None;
        Ticket(self.generation)
    }

    pub fn load_success(
        &mut self,
        ticket: Ticket,
        record: ProfileRecord,
    ) -> LoadOutcome {
        if !self.is_current(ticket) {
            return LoadOutcome::Discarded;
        }
        self.load_state = LoadState::Success;
        self.record = Some(record);
        LoadOutcome::Applied
    }

    pub fn load_error(
        &mut self,
        ticket: Ticket,
        error: &FetchError,
    ) -> LoadOutcome {
        if !self.is_current(ticket) {
            return LoadOutcome::Discarded;
        }
        self.load_state = LoadState::Error(error.to_string());
        self.record = None;
        LoadOutcome::Applied
    }

    /// Nothing to look up. Also invalidates any request still in flight.
    pub fn missing_identifier(&mut self, identifier: &str) {
        let ticket = self.load_start(identifier);
        self.load_error(ticket, &FetchError::MissingUsername);
    }

    fn is_settled_on(&self, identifier: &str) -> bool {
        self.load_state != LoadState::Idle && self.identifier == identifier
    }
}

/// Looks profiles up and keeps the latest answer for rendering.
///
/// Only the answer for the most recently requested identifier is ever
/// visible; answers overtaken by a newer request are dropped.
pub struct ProfileLoader<S> {
    source: S,
    state: Mutex<ProfileState>,
}

impl<S: ProfileSource> ProfileLoader<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: Mutex::new(ProfileState::default()),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn snapshot(&self) -> ProfileState {
        self.lock().clone()
    }

    /// Request the profile for `identifier`.
    ///
    /// Asking again for the identifier already shown is a no-op, failed
    /// lookups included.
    pub async fn load(&self, identifier: &str) -> LoadOutcome {
        let ticket = {
            let mut state = self.lock();
            if state.is_settled_on(identifier) {
                trace!("Profile {:?} already requested", identifier);
                return LoadOutcome::Skipped;
            }
            if is_missing(identifier) {
                debug!("No username given, skipping lookup");
                state.missing_identifier(identifier);
                return LoadOutcome::Applied;
            }
            state.load_start(identifier)
        };

        debug!("Fetching profile {}", identifier);
        let result = self.source.fetch_profile(identifier).await;

        let mut state = self.lock();
        let outcome = match &result {
            Ok(record) => state.load_success(ticket, record.clone()),
            Err(e) => {
                debug!("Profile {} failed: {}", identifier, e);
                state.load_error(ticket, e)
            }
        };
        if outcome == LoadOutcome::Discarded {
            debug!(
                "Dropping answer for {}, {:?} was requested since",
                identifier, state.identifier
            );
        }
        outcome
    }

    fn lock(&self) -> MutexGuard<'_, ProfileState> {
        // The state is plain data and every transition leaves it
        // consistent, so a poisoned lock is still usable.
        self.state.lock().unwrap_or_else(|poisoned| {
            warn!("Profile state lock was poisoned");
            poisoned.into_inner()
        })
    }
}
