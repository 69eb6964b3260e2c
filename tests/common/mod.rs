//! Common test utilities
//!
//! This module is shared across all integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use imeibot::core::Imei;
use imeibot::flow::{Caller, ChatActivity, FlowController};
use imeibot::lookup::{LookupClient, LookupError};
use imeibot::storage::{create_pool, DbPool};

/// A file-backed pool in a fresh temporary directory.
///
/// The directory must outlive the pool, so both are returned.
pub fn test_pool() -> (TempDir, Arc<DbPool>) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("users.sqlite");
    let pool = create_pool(path.to_str().expect("temp path is not UTF-8")).expect("Failed to create pool");
    (dir, Arc::new(pool))
}

/// Lookup client that records every IMEI it was asked about.
#[derive(Default)]
pub struct FakeLookup {
    calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
    fail: bool,
    latency: Duration,
}

impl FakeLookup {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Answers only after `latency` has passed.
    pub fn slow(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().expect("poisoned").clone()
    }
}

#[async_trait]
impl LookupClient for FakeLookup {
    async fn check(&self, imei: &Imei) -> Result<String, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().expect("poisoned").push(imei.as_str().to_string());
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.fail {
            return Err(LookupError::Status {
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                body: "upstream down".to_string(),
            });
        }
        Ok(format!("\"deviceId\":\"{}\"\n\"status\":\"successful\"", imei))
    }
}

/// Counts typing indications instead of talking to a chat.
#[derive(Default)]
pub struct CountingActivity {
    pub typing: AtomicUsize,
}

#[async_trait]
impl ChatActivity for CountingActivity {
    async fn typing(&self) {
        self.typing.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn flow(pool: Arc<DbPool>, lookup: Arc<FakeLookup>) -> FlowController {
    FlowController::new(pool, lookup, Duration::ZERO)
}

pub fn caller(id: i64) -> Caller {
    Caller {
        id,
        username: Some("ivan".to_string()),
        first_name: Some("Ivan".to_string()),
        last_name: Some("Petrov".to_string()),
    }
}

/// Create a Telegram message JSON payload from a private chat
pub fn create_message_json(user_id: i64, text: &str) -> serde_json::Value {
    create_chat_message_json(
        user_id,
        serde_json::json!({ "id": user_id, "type": "private", "first_name": "Ivan" }),
        text,
    )
}

/// Create a Telegram message JSON payload from a group chat
pub fn create_group_message_json(user_id: i64, chat_id: i64, text: &str) -> serde_json::Value {
    create_chat_message_json(
        user_id,
        serde_json::json!({ "id": chat_id, "type": "group", "title": "Test group" }),
        text,
    )
}

fn create_chat_message_json(user_id: i64, chat: serde_json::Value, text: &str) -> serde_json::Value {
    serde_json::json!({
        "message_id": 1,
        "date": 1735992000,
        "chat": chat,
        "from": {
            "id": user_id,
            "is_bot": false,
            "first_name": "Ivan",
            "last_name": "Petrov",
            "username": "ivan"
        },
        "text": text
    })
}
