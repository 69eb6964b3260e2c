//! User store: SQLite via an r2d2 pool, schema managed by refinery

pub mod db;
pub mod migrations;

use thiserror::Error;

// Re-exports for convenience
pub use db::{
    create_pool, get_connection, DbConnection, DbPool, NewUser, TokenUpdate, UserRecord, UserStore,
};

/// Persistence errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] refinery::Error),

    #[error("User {0} not found")]
    NotFound(i64),
}
