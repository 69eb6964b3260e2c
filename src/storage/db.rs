use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::time::Duration;

use super::migrations::run_migrations;
use super::StoreError;

/// A chat participant as stored in the `users` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Telegram ID пользователя
    pub telegram_id: i64,
    /// Имя пользователя (username) в Telegram, если доступно
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Кто пригласил пользователя; пишется только при создании записи
    pub referrer_id: Option<i64>,
    /// Токен регистрации; None пока пользователь не зарегистрирован
    pub token: Option<String>,
}

impl UserRecord {
    /// Registration is complete once a non-empty token is stored.
    pub fn has_token(&self) -> bool {
        self.token.as_deref().is_some_and(|token| !token.is_empty())
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            telegram_id: row.get(0)?,
            username: row.get(1)?,
            first_name: row.get(2)?,
            last_name: row.get(3)?,
            referrer_id: row.get(4)?,
            token: row.get(5)?,
        })
    }
}

/// Fields for a record that may not exist yet.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub referrer_id: Option<i64>,
}

/// Outcome of a token write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenUpdate {
    /// The token was absent and has just been stored
    Issued(UserRecord),
    /// A token was already present; nothing was written
    AlreadyPresent(UserRecord),
}

impl TokenUpdate {
    pub fn record(&self) -> &UserRecord {
        match self {
            TokenUpdate::Issued(record) | TokenUpdate::AlreadyPresent(record) => record,
        }
    }
}

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

const USER_COLUMNS: &str = "telegram_id, username, first_name, last_name, referrer_id, token_id";

/// Create a new database connection pool
///
/// Initializes a connection pool with up to 10 connections and applies the
/// embedded migrations on the first connection.
///
/// # Arguments
///
/// * `database_path` - Path to SQLite database file
///
/// # Example
///
/// ```no_run
/// use imeibot::storage::create_pool;
///
/// let pool = create_pool("database.sqlite")?;
/// # Ok::<(), imeibot::storage::StoreError>(())
/// ```
pub fn create_pool(database_path: &str) -> Result<DbPool, StoreError> {
    let manager = SqliteConnectionManager::file(database_path)
        .with_init(|conn| conn.busy_timeout(Duration::from_secs(5)));
    let pool = Pool::builder()
        .max_size(10) // Maximum 10 connections in the pool
        .build(manager)?;

    let mut conn = pool.get()?;
    run_migrations(&mut conn)?;

    Ok(pool)
}

/// Get a connection from the pool
///
/// The connection goes back to the pool when dropped.
pub fn get_connection(pool: &DbPool) -> Result<DbConnection, StoreError> {
    Ok(pool.get()?)
}

/// Получает пользователя из базы данных по Telegram ID.
///
/// Возвращает `Ok(None)` если пользователь не найден.
pub fn find_user(conn: &Connection, telegram_id: i64) -> Result<Option<UserRecord>, StoreError> {
    let sql = format!("SELECT {} FROM users WHERE telegram_id = ?1", USER_COLUMNS);
    let user = conn
        .query_row(&sql, params![telegram_id], UserRecord::from_row)
        .optional()?;
    Ok(user)
}

/// Создаёт пользователя, если его ещё нет, и возвращает сохранённую запись.
///
/// Insertion and the uniqueness check are one statement, so two first
/// contacts for the same identity cannot both insert. An existing row is
/// returned untouched, referral included.
pub fn create_user(conn: &Connection, user: &NewUser) -> Result<UserRecord, StoreError> {
    let inserted = conn.execute(
        "INSERT INTO users (telegram_id, username, first_name, last_name, referrer_id)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(telegram_id) DO NOTHING",
        params![
            user.telegram_id,
            user.username,
            user.first_name,
            user.last_name,
            user.referrer_id
        ],
    )?;

    if inserted > 0 {
        log::info!(
            "Created user {} (username: {:?}, referrer: {:?})",
            user.telegram_id,
            user.username,
            user.referrer_id
        );
    }

    find_user(conn, user.telegram_id)?.ok_or(StoreError::NotFound(user.telegram_id))
}

/// Сохраняет токен, если у пользователя его ещё нет.
///
/// The write is conditional on the token being absent, so a token is issued
/// at most once per identity. Fails with [`StoreError::NotFound`] when the
/// identity has no record.
pub fn update_token(conn: &Connection, telegram_id: i64, token: &str) -> Result<TokenUpdate, StoreError> {
    let updated = conn.execute(
        "UPDATE users SET token_id = ?1, updated_at = CURRENT_TIMESTAMP
         WHERE telegram_id = ?2 AND (token_id IS NULL OR token_id = '')",
        params![token, telegram_id],
    )?;

    let record = find_user(conn, telegram_id)?.ok_or(StoreError::NotFound(telegram_id))?;
    if updated > 0 {
        Ok(TokenUpdate::Issued(record))
    } else {
        Ok(TokenUpdate::AlreadyPresent(record))
    }
}

/// Number of stored users; used by the startup banner.
pub fn count_users(conn: &Connection) -> Result<i64, StoreError> {
    Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?)
}

/// Persistence operations the conversation flow depends on.
pub trait UserStore {
    fn find_user(&self, telegram_id: i64) -> Result<Option<UserRecord>, StoreError>;
    fn create_user(&self, user: &NewUser) -> Result<UserRecord, StoreError>;
    fn update_token(&self, telegram_id: i64, token: &str) -> Result<TokenUpdate, StoreError>;
}

impl UserStore for Connection {
    fn find_user(&self, telegram_id: i64) -> Result<Option<UserRecord>, StoreError> {
        find_user(self, telegram_id)
    }

    fn create_user(&self, user: &NewUser) -> Result<UserRecord, StoreError> {
        create_user(self, user)
    }

    fn update_token(&self, telegram_id: i64, token: &str) -> Result<TokenUpdate, StoreError> {
        update_token(self, telegram_id, token)
    }
}
