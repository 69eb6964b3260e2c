//! Store-backed flow steps
//!
//! Each step runs against one store session and performs at most one read
//! and one write (the referral check on first contact adds a second read).

use super::reply::{self, Menu, Outcome, Reply};
use super::state::{Caller, SessionState};
use super::FlowError;
use crate::core::token::generate_token;
use crate::storage::{TokenUpdate, UserStore};

/// `/start`: greet the caller and route them to registration or lookup.
pub fn start(store: &dyn UserStore, caller: &Caller, argument: &str) -> Result<Outcome, FlowError> {
    let name = caller.full_name();

    match store.find_user(caller.id)? {
        Some(record) if record.has_token() => Ok(Outcome::new(
            Reply::text(reply::greeting_registered(&name)).with_menu(Menu::Registered),
            SessionState::AwaitingImei,
        )),
        Some(_) => Ok(pending_registration(&name)),
        None => {
            let referrer_id = resolve_referrer(store, argument, caller.id)?;
            store.create_user(&caller.new_user(referrer_id))?;
            Ok(pending_registration(&name))
        }
    }
}

fn pending_registration(name: &str) -> Outcome {
    Outcome::new(
        Reply::text(reply::greeting_unregistered(name)).with_menu(Menu::Unregistered),
        SessionState::AwaitingRegistrationConfirmation,
    )
}

/// `/registration`: issue a token unless one is already stored.
pub fn register(store: &dyn UserStore, caller: &Caller) -> Result<Outcome, FlowError> {
    let name = caller.full_name();

    let record = match store.find_user(caller.id)? {
        Some(record) => record,
        None => store.create_user(&caller.new_user(None))?,
    };

    let update = if record.has_token() {
        TokenUpdate::AlreadyPresent(record)
    } else {
        store.update_token(caller.id, &generate_token())?
    };

    let text = match update {
        TokenUpdate::Issued(_) => {
            log::info!("User {} registered", caller.id);
            reply::registered(&name)
        }
        TokenUpdate::AlreadyPresent(_) => reply::already_registered(&name),
    };

    Ok(Outcome::new(
        Reply::text(text).with_menu(Menu::Registered),
        SessionState::AwaitingImei,
    ))
}

/// `/send_imei`: ask for the IMEI, but only from registered users.
pub fn request_imei(store: &dyn UserStore, caller: &Caller) -> Result<Outcome, FlowError> {
    if is_registered(store, caller)? {
        Ok(Outcome::new(Reply::text(reply::ENTER_IMEI), SessionState::AwaitingLookupResult))
    } else {
        Ok(registration_required())
    }
}

/// Whether the caller holds a token.
pub fn is_registered(store: &dyn UserStore, caller: &Caller) -> Result<bool, FlowError> {
    Ok(store.find_user(caller.id)?.is_some_and(|record| record.has_token()))
}

pub fn registration_required() -> Outcome {
    Outcome::new(
        Reply::text(reply::REGISTRATION_REQUIRED).with_menu(Menu::Unregistered),
        SessionState::AwaitingRegistrationConfirmation,
    )
}

/// Resolves a `/start` argument to the identity of an existing user.
///
/// The argument must be a positive decimal id, differ from the caller, and
/// belong to a stored user; anything else means "no referrer".
pub fn resolve_referrer(store: &dyn UserStore, argument: &str, caller_id: i64) -> Result<Option<i64>, FlowError> {
    let argument = argument.trim();
    if argument.is_empty() || !argument.chars().all(|c| c.is_ascii_digit()) {
        return Ok(None);
    }

    let Ok(referrer_id) = argument.parse::<i64>() else {
        return Ok(None);
    };
    if referrer_id <= 0 || referrer_id == caller_id {
        return Ok(None);
    }

    Ok(store.find_user(referrer_id)?.map(|record| record.telegram_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{create_pool, get_connection, DbPool, NewUser};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn test_pool() -> (TempDir, DbPool) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("flow.sqlite");
        let pool = create_pool(path.to_str().unwrap()).unwrap();
        (dir, pool)
    }

    fn caller(id: i64) -> Caller {
        Caller {
            id,
            username: None,
            first_name: Some("Ivan".to_string()),
            last_name: None,
        }
    }

    #[test]
    fn test_start_creates_unregistered_record() {
        let (_dir, pool) = test_pool();
        let conn = get_connection(&pool).unwrap();

        let outcome = start(&*conn, &caller(42), "").unwrap();
        assert_eq!(outcome.next, SessionState::AwaitingRegistrationConfirmation);
        assert_eq!(outcome.reply.menu, Some(Menu::Unregistered));

        let record = conn.find_user(42).unwrap().unwrap();
        assert!(!record.has_token());
        assert_eq!(record.referrer_id, None);
    }

    #[test]
    fn test_start_for_registered_user() {
        let (_dir, pool) = test_pool();
        let conn = get_connection(&pool).unwrap();
        register(&*conn, &caller(42)).unwrap();

        let outcome = start(&*conn, &caller(42), "").unwrap();
        assert_eq!(outcome.next, SessionState::AwaitingImei);
        assert_eq!(outcome.reply.text, reply::greeting_registered("Ivan"));
        assert_eq!(outcome.reply.menu, Some(Menu::Registered));
    }

    #[test]
    fn test_register_twice_issues_one_token() {
        let (_dir, pool) = test_pool();
        let conn = get_connection(&pool).unwrap();

        let first = register(&*conn, &caller(42)).unwrap();
        let token = conn.find_user(42).unwrap().unwrap().token;
        let second = register(&*conn, &caller(42)).unwrap();

        assert_eq!(first.reply.text, reply::registered("Ivan"));
        assert_eq!(second.reply.text, reply::already_registered("Ivan"));
        assert_eq!(second.next, SessionState::AwaitingImei);
        assert!(token.is_some());
        assert_eq!(conn.find_user(42).unwrap().unwrap().token, token);
    }

    #[test]
    fn test_register_without_start_creates_record() {
        let (_dir, pool) = test_pool();
        let conn = get_connection(&pool).unwrap();

        register(&*conn, &caller(7)).unwrap();
        assert!(conn.find_user(7).unwrap().unwrap().has_token());
    }

    #[test]
    fn test_request_imei_requires_token() {
        let (_dir, pool) = test_pool();
        let conn = get_connection(&pool).unwrap();
        start(&*conn, &caller(42), "").unwrap();

        let outcome = request_imei(&*conn, &caller(42)).unwrap();
        assert_eq!(outcome.reply.text, reply::REGISTRATION_REQUIRED);
        assert_eq!(outcome.next, SessionState::AwaitingRegistrationConfirmation);

        register(&*conn, &caller(42)).unwrap();
        let outcome = request_imei(&*conn, &caller(42)).unwrap();
        assert_eq!(outcome.reply.text, reply::ENTER_IMEI);
        assert_eq!(outcome.next, SessionState::AwaitingLookupResult);
    }

    #[test]
    fn test_referrer_resolution() {
        let (_dir, pool) = test_pool();
        let conn = get_connection(&pool).unwrap();
        conn.create_user(&NewUser {
            telegram_id: 100,
            ..NewUser::default()
        })
        .unwrap();

        assert_eq!(resolve_referrer(&*conn, "100", 42).unwrap(), Some(100));
        assert_eq!(resolve_referrer(&*conn, " 100 ", 42).unwrap(), Some(100));
        // self-referral
        assert_eq!(resolve_referrer(&*conn, "42", 42).unwrap(), None);
        // unknown user
        assert_eq!(resolve_referrer(&*conn, "101", 42).unwrap(), None);
        assert_eq!(resolve_referrer(&*conn, "", 42).unwrap(), None);
        assert_eq!(resolve_referrer(&*conn, "0", 42).unwrap(), None);
        assert_eq!(resolve_referrer(&*conn, "-100", 42).unwrap(), None);
        assert_eq!(resolve_referrer(&*conn, "abc", 42).unwrap(), None);
        assert_eq!(resolve_referrer(&*conn, "99999999999999999999", 42).unwrap(), None);
    }

    #[test]
    fn test_start_records_referrer_once() {
        let (_dir, pool) = test_pool();
        let conn = get_connection(&pool).unwrap();
        start(&*conn, &caller(100), "").unwrap();
        start(&*conn, &caller(200), "").unwrap();

        start(&*conn, &caller(42), "100").unwrap();
        start(&*conn, &caller(42), "200").unwrap();

        assert_eq!(conn.find_user(42).unwrap().unwrap().referrer_id, Some(100));
    }
}
