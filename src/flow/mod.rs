//! Registration and lookup conversation flow
//!
//! The flow has no teloxide dependency: the Telegram layer turns a message
//! into a [`Trigger`], hands it over together with the stored
//! [`SessionState`], and sends back the single [`Reply`] of the returned
//! [`Outcome`].
//!
//! Failures are caught at the step boundary. Validation errors keep the
//! session where it was so the user can retry; storage and lookup errors reset
//! it to [`SessionState::Unset`].

pub mod reply;
pub mod state;
pub mod steps;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::validation::{Imei, ImeiError};
use crate::lookup::{LookupClient, LookupError};
use crate::storage::{get_connection, DbPool, StoreError, UserStore};

pub use reply::{Menu, Outcome, Reply};
pub use state::{Caller, SessionState, Trigger};

/// Interval between "typing…" indications while a lookup runs
pub const TYPING_REFRESH: Duration = Duration::from_secs(4);

/// Closed set of step failures, each with its own user-facing message
#[derive(Debug, Error)]
pub enum FlowError {
    /// Malformed user input
    #[error("invalid input: {0}")]
    Validation(#[from] ImeiError),

    /// User store unavailable or inconsistent
    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),

    /// imeicheck.net failed
    #[error("lookup failure: {0}")]
    Upstream(#[from] LookupError),
}

impl FlowError {
    pub fn user_message(&self) -> &'static str {
        match self {
            FlowError::Validation(_) => reply::INVALID_IMEI,
            FlowError::Persistence(_) => reply::STORAGE_FAILURE,
            FlowError::Upstream(_) => reply::LOOKUP_FAILURE,
        }
    }

    /// Whether the session should go back to [`SessionState::Unset`]
    pub fn resets_session(&self) -> bool {
        !matches!(self, FlowError::Validation(_))
    }
}

/// Chat-side "working" indicator shown while a lookup runs.
#[async_trait]
pub trait ChatActivity: Send + Sync {
    async fn typing(&self);
}

pub struct FlowController {
    pool: Arc<DbPool>,
    lookup: Arc<dyn LookupClient>,
    typing_delay: Duration,
}

impl FlowController {
    pub fn new(pool: Arc<DbPool>, lookup: Arc<dyn LookupClient>, typing_delay: Duration) -> Self {
        Self {
            pool,
            lookup,
            typing_delay,
        }
    }

    /// Processes one inbound message to completion.
    ///
    /// Always produces exactly one reply; errors are already mapped to a
    /// user-facing message and the matching next state.
    pub async fn handle(
        &self,
        caller: &Caller,
        state: SessionState,
        trigger: Trigger,
        activity: &dyn ChatActivity,
    ) -> Outcome {
        let trigger = trigger.promote(state);
        log::debug!("User {} in {:?} sent {:?}", caller.id, state, trigger);

        match self.step(caller, state, trigger, activity).await {
            Ok(outcome) => outcome,
            Err(err) => recover(caller, state, err),
        }
    }

    async fn step(
        &self,
        caller: &Caller,
        state: SessionState,
        trigger: Trigger,
        activity: &dyn ChatActivity,
    ) -> Result<Outcome, FlowError> {
        match trigger {
            Trigger::Start { argument } => self.with_store(|store| steps::start(store, caller, &argument)),
            Trigger::Register => self.with_store(|store| steps::register(store, caller)),
            Trigger::RequestImei => self.with_store(|store| steps::request_imei(store, caller)),
            Trigger::Text(text) if state == SessionState::AwaitingLookupResult => {
                self.lookup(caller, &text, activity).await
            }
            Trigger::Text(_) => Ok(Outcome::new(Reply::quoted(reply::CHOOSE_COMMAND), state)),
        }
    }

    /// Runs a store step on one pooled connection, released before returning.
    fn with_store<T, F>(&self, step: F) -> Result<T, FlowError>
    where
        F: FnOnce(&dyn UserStore) -> Result<T, FlowError>,
    {
        let conn = get_connection(&self.pool)?;
        step(&*conn)
    }

    async fn lookup(&self, caller: &Caller, text: &str, activity: &dyn ChatActivity) -> Result<Outcome, FlowError> {
        // A stored session is not proof of registration
        if !self.with_store(|store| steps::is_registered(store, caller))? {
            log::warn!("User {} reached the lookup step without a token", caller.id);
            return Ok(steps::registration_required());
        }

        let imei = Imei::parse(text)?;

        let check = async {
            if !self.typing_delay.is_zero() {
                tokio::time::sleep(self.typing_delay).await;
            }
            log::info!("Running IMEI check for user {}", caller.id);
            self.lookup.check(&imei).await
        };
        tokio::pin!(check);

        // Telegram drops a chat action after ~5 seconds, so it is resent until the check is done
        let mut refresh = tokio::time::interval(TYPING_REFRESH);
        let result = loop {
            tokio::select! {
                biased;
                _ = refresh.tick() => activity.typing().await,
                result = &mut check => break result?,
            }
        };

        Ok(Outcome::new(Reply::text(result), SessionState::Unset))
    }
}

fn recover(caller: &Caller, state: SessionState, err: FlowError) -> Outcome {
    let next = if err.resets_session() {
        log::error!(
            "Flow step failed for user {} (username: {:?}) in {:?}: {}",
            caller.id,
            caller.username,
            state,
            err
        );
        SessionState::Unset
    } else {
        log::info!("Rejected input from user {} in {:?}: {}", caller.id, state, err);
        state
    };

    let reply = match err {
        FlowError::Validation(_) => Reply::quoted(err.user_message()),
        _ => Reply::text(err.user_message()),
    };
    Outcome::new(reply, next)
}
