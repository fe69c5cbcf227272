//! SQLite-backed storage for users and tasks.
//!
//! Schema creation is idempotent and runs inside the constructors, so a
//! `Store` is ready to use as soon as it is built. Every statement is
//! parameterized; user input is never interpolated into SQL text.

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::Instrument;

/// Outcome when attempting to create a new user.
#[derive(Debug)]
pub enum SignupOutcome {
    Created(i64),
    Conflict,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TaskRow {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub done: bool,
}

#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open the database file, creating it and the schema when missing.
    pub async fn open(path: &str) -> Result<Self> {
        let opts = SqliteConnectOptions::from_str(&format!("sqlite://{path}"))
            .with_context(|| format!("invalid database path: {path}"))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true);

        let pool = SqlitePool::connect_with(opts)
            .await
            .context("Failed to open database")?;

        Self::init(&pool).await?;

        Ok(Self { pool })
    }

    /// In-memory database for tests.
    ///
    /// The pool is pinned to a single connection; an in-memory SQLite
    /// database is private to the connection that created it.
    pub async fn open_in_memory() -> Result<Self> {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .connect_with(opts)
            .await
            .context("Failed to open in-memory database")?;

        Self::init(&pool).await?;

        Ok(Self { pool })
    }

    async fn init(pool: &SqlitePool) -> Result<()> {
        // No versioned migrations, the schema is created in place.
        let statements = [
            r"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL
        )",
            r"
        CREATE TABLE IF NOT EXISTS tasks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id INTEGER NOT NULL REFERENCES users(id),
            title TEXT NOT NULL,
            done INTEGER NOT NULL DEFAULT 0
        )",
        ];

        for statement in statements {
            sqlx::query(statement)
                .execute(pool)
                .await
                .context("Failed to create schema")?;
        }

        Ok(())
    }

    /// Insert a new user, reporting a duplicate username as a conflict
    /// outcome instead of an error.
    pub async fn create_user(&self, username: &str, password_hash: &str) -> Result<SignupOutcome> {
        let query = "INSERT INTO users (username, password_hash) VALUES (?1, ?2)";
        let span = tracing::info_span!(
            "db.query",
            db.system = "sqlite",
            db.operation = "INSERT",
            db.statement = query
        );
        let result = sqlx::query(query)
            .bind(username)
            .bind(password_hash)
            .execute(&self.pool)
            .instrument(span)
            .await;

        match result {
            Ok(done) => Ok(SignupOutcome::Created(done.last_insert_rowid())),
            Err(err) if is_unique_violation(&err) => Ok(SignupOutcome::Conflict),
            Err(err) => Err(err).context("failed to insert user"),
        }
    }

    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        let query = "SELECT id, username, password_hash FROM users WHERE username = ?1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "sqlite",
            db.operation = "SELECT",
            db.statement = query
        );
        sqlx::query_as(query)
            .bind(username)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup user")
    }

    pub async fn insert_task(&self, owner_id: i64, title: &str) -> Result<i64> {
        let query = "INSERT INTO tasks (owner_id, title) VALUES (?1, ?2)";
        let span = tracing::info_span!(
            "db.query",
            db.system = "sqlite",
            db.operation = "INSERT",
            db.statement = query
        );
        let done = sqlx::query(query)
            .bind(owner_id)
            .bind(title)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to insert task")?;

        Ok(done.last_insert_rowid())
    }

    /// All tasks owned by `owner_id`, in insertion order.
    pub async fn list_tasks(&self, owner_id: i64) -> Result<Vec<TaskRow>> {
        let query = "SELECT id, owner_id, title, done FROM tasks WHERE owner_id = ?1 ORDER BY id";
        let span = tracing::info_span!(
            "db.query",
            db.system = "sqlite",
            db.operation = "SELECT",
            db.statement = query
        );
        sqlx::query_as(query)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .instrument(span)
            .await
            .context("failed to list tasks")
    }

    /// Flip `done` for a task owned by `owner_id`.
    ///
    /// Returns false without touching anything when the task does not
    /// exist or belongs to another user, so callers cannot probe for
    /// foreign task ids.
    pub async fn toggle_task_done(&self, task_id: i64, owner_id: i64) -> Result<bool> {
        let query = "UPDATE tasks SET done = NOT done WHERE id = ?1 AND owner_id = ?2";
        let span = tracing::info_span!(
            "db.query",
            db.system = "sqlite",
            db.operation = "UPDATE",
            db.statement = query
        );
        let done = sqlx::query(query)
            .bind(task_id)
            .bind(owner_id)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to toggle task")?;

        Ok(done.rows_affected() > 0)
    }

    /// Delete a task owned by `owner_id`, with the same no-op contract as
    /// [`Store::toggle_task_done`].
    pub async fn delete_task(&self, task_id: i64, owner_id: i64) -> Result<bool> {
        let query = "DELETE FROM tasks WHERE id = ?1 AND owner_id = ?2";
        let span = tracing::info_span!(
            "db.query",
            db.system = "sqlite",
            db.operation = "DELETE",
            db.statement = query
        );
        let done = sqlx::query(query)
            .bind(task_id)
            .bind(owner_id)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to delete task")?;

        Ok(done.rows_affected() > 0)
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::{borrow::Cow, error::Error as StdError, fmt};

    async fn store_with_user(username: &str) -> (Store, i64) {
        let store = Store::open_in_memory().await.unwrap();
        let outcome = store.create_user(username, "digest").await.unwrap();
        let SignupOutcome::Created(user_id) = outcome else {
            panic!("expected user to be created");
        };
        (store, user_id)
    }

    #[tokio::test]
    async fn create_user_then_find() {
        let (store, user_id) = store_with_user("alice").await;

        let user = store.find_user_by_username("alice").await.unwrap().unwrap();
        assert_eq!(user.id, user_id);
        assert_eq!(user.username, "alice");
        assert_eq!(user.password_hash, "digest");

        assert!(store.find_user_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_username_is_conflict() {
        let (store, _) = store_with_user("alice").await;

        let outcome = store.create_user("alice", "other-digest").await.unwrap();
        assert!(matches!(outcome, SignupOutcome::Conflict));

        // The first row is unaffected by the failed insert.
        let user = store.find_user_by_username("alice").await.unwrap().unwrap();
        assert_eq!(user.password_hash, "digest");
    }

    #[tokio::test]
    async fn list_tasks_in_insertion_order() {
        let (store, user_id) = store_with_user("alice").await;

        store.insert_task(user_id, "first").await.unwrap();
        store.insert_task(user_id, "second").await.unwrap();
        store.insert_task(user_id, "third").await.unwrap();

        let titles: Vec<String> = store
            .list_tasks(user_id)
            .await
            .unwrap()
            .into_iter()
            .map(|task| task.title)
            .collect();
        assert_eq!(titles, ["first", "second", "third"]);
    }

    #[tokio::test]
    async fn toggle_twice_restores_original_state() {
        let (store, user_id) = store_with_user("alice").await;
        let task_id = store.insert_task(user_id, "laundry").await.unwrap();

        assert!(store.toggle_task_done(task_id, user_id).await.unwrap());
        assert!(store.list_tasks(user_id).await.unwrap()[0].done);

        assert!(store.toggle_task_done(task_id, user_id).await.unwrap());
        assert!(!store.list_tasks(user_id).await.unwrap()[0].done);
    }

    #[tokio::test]
    async fn foreign_tasks_are_invisible() {
        let (store, alice) = store_with_user("alice").await;
        let outcome = store.create_user("bob", "digest").await.unwrap();
        let SignupOutcome::Created(bob) = outcome else {
            panic!("expected user to be created");
        };

        let task_id = store.insert_task(alice, "secret").await.unwrap();

        // Not listed, not togglable, not deletable under the other owner.
        assert!(store.list_tasks(bob).await.unwrap().is_empty());
        assert!(!store.toggle_task_done(task_id, bob).await.unwrap());
        assert!(!store.delete_task(task_id, bob).await.unwrap());

        let tasks = store.list_tasks(alice).await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert!(!tasks[0].done);
    }

    #[tokio::test]
    async fn delete_missing_task_is_noop() {
        let (store, user_id) = store_with_user("alice").await;
        store.insert_task(user_id, "keep me").await.unwrap();

        assert!(!store.delete_task(42, user_id).await.unwrap());
        assert_eq!(store.list_tasks(user_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_owned_task() {
        let (store, user_id) = store_with_user("alice").await;
        let task_id = store.insert_task(user_id, "done with this").await.unwrap();

        assert!(store.delete_task(task_id, user_id).await.unwrap());
        assert!(store.list_tasks(user_id).await.unwrap().is_empty());
    }

    #[derive(Debug)]
    struct TestDbError {
        unique: bool,
    }

    impl fmt::Display for TestDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "test database error")
        }
    }

    impl StdError for TestDbError {}

    impl DatabaseError for TestDbError {
        fn message(&self) -> &str {
            "test database error"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            None
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            if self.unique {
                ErrorKind::UniqueViolation
            } else {
                ErrorKind::Other
            }
        }
    }

    #[test]
    fn is_unique_violation_matches_kind() {
        let err = sqlx::Error::Database(Box::new(TestDbError { unique: true }));
        assert!(is_unique_violation(&err));

        let err = sqlx::Error::Database(Box::new(TestDbError { unique: false }));
        assert!(!is_unique_violation(&err));

        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }
}
