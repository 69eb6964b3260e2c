//! Session state, triggers and caller identity

use serde::{Deserialize, Serialize};

use crate::storage::NewUser;

/// Text of the registration button; also matched as a keyword.
pub const REGISTRATION_KEYWORD: &str = "регистрация";

/// Text of the lookup button; also matched as a keyword.
pub const LOOKUP_KEYWORD: &str = "информация по imei";

/// Per-conversation state. Lives in dialogue storage, never in the user store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    Unset,
    AwaitingRegistrationConfirmation,
    AwaitingImei,
    AwaitingLookupResult,
}

/// What an inbound message asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// `/start` with its (possibly empty) argument
    Start { argument: String },
    /// `/registration`
    Register,
    /// `/send_imei`
    RequestImei,
    /// Anything that is not one of the commands above
    Text(String),
}

impl Trigger {
    /// Promotes keyword text to the command it stands for.
    ///
    /// Keywords only count in the state where their button is shown;
    /// commands are accepted in any state.
    pub fn promote(self, state: SessionState) -> Self {
        let Trigger::Text(text) = self else {
            return self;
        };

        let lowered = text.to_lowercase();
        match state {
            SessionState::AwaitingRegistrationConfirmation if lowered.contains(REGISTRATION_KEYWORD) => {
                Trigger::Register
            }
            SessionState::AwaitingImei if lowered.contains(LOOKUP_KEYWORD) => Trigger::RequestImei,
            _ => Trigger::Text(text),
        }
    }
}

/// The user behind a message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Caller {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl Caller {
    /// "First Last", falling back to the username and then the id.
    pub fn full_name(&self) -> String {
        let name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if !name.is_empty() {
            name
        } else if let Some(username) = self.username.as_deref() {
            username.to_string()
        } else {
            self.id.to_string()
        }
    }

    pub(crate) fn new_user(&self, referrer_id: Option<i64>) -> NewUser {
        NewUser {
            telegram_id: self.id,
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            referrer_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_keyword_only_while_pending() {
        let text = Trigger::Text("Регистрация".to_string());
        assert_eq!(
            text.clone().promote(SessionState::AwaitingRegistrationConfirmation),
            Trigger::Register
        );
        assert_eq!(text.clone().promote(SessionState::Unset), text);
        assert_eq!(text.clone().promote(SessionState::AwaitingLookupResult), text);
    }

    #[test]
    fn test_lookup_keyword_only_while_awaiting_imei() {
        let text = Trigger::Text("👉 Информация по IMEI".to_string());
        assert_eq!(text.clone().promote(SessionState::AwaitingImei), Trigger::RequestImei);
        assert_eq!(text.clone().promote(SessionState::AwaitingRegistrationConfirmation), text);
    }

    #[test]
    fn test_commands_are_not_touched() {
        assert_eq!(Trigger::Register.promote(SessionState::Unset), Trigger::Register);
        assert_eq!(
            Trigger::RequestImei.promote(SessionState::AwaitingLookupResult),
            Trigger::RequestImei
        );
    }

    #[test]
    fn test_full_name() {
        let mut caller = Caller {
            id: 42,
            username: Some("ivan42".to_string()),
            first_name: Some("Ivan".to_string()),
            last_name: Some("Petrov".to_string()),
        };
        assert_eq!(caller.full_name(), "Ivan Petrov");

        caller.last_name = None;
        assert_eq!(caller.full_name(), "Ivan");

        caller.first_name = None;
        assert_eq!(caller.full_name(), "ivan42");

        caller.username = None;
        assert_eq!(caller.full_name(), "42");
    }
}
