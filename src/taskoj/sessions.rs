//! Session manager built on `tower-sessions`.
//!
//! The session layer itself (signed cookie over an in-memory store) is
//! wired up in [`crate::taskoj::router`]; this module owns the keys
//! stored inside a session and the handler-facing helpers around them.
//! Flash notices ride in the same session as the identity, so they work
//! for anonymous visitors on the register/login forms too.

use anyhow::{Context, Result};
use tower_sessions::Session;
use tracing::error;

/// Key for storing the authenticated user's id in the session.
pub const USER_ID_KEY: &str = "user_id";

/// Key for the one-shot notice shown on the next rendered page.
const FLASH_KEY: &str = "flash";

/// Bind the session to a user id after a successful login.
pub async fn start(session: &Session, user_id: i64) -> Result<()> {
    session
        .insert(USER_ID_KEY, user_id)
        .await
        .context("failed to start session")
}

/// Resolve the current request to a user id, if the session carries one.
///
/// Session-store failures are logged and treated as "no session"; the
/// caller redirects to the login form either way.
pub async fn current_user(session: &Session) -> Option<i64> {
    match session.get::<i64>(USER_ID_KEY).await {
        Ok(user_id) => user_id,
        Err(err) => {
            error!("Failed to load session: {err}");
            None
        }
    }
}

/// Destroy the session record and clear the cookie.
pub async fn end(session: &Session) -> Result<()> {
    session.flush().await.context("failed to end session")
}

/// Stash a one-shot notice for the next rendered page.
pub async fn flash(session: &Session, message: &str) {
    if let Err(err) = session.insert(FLASH_KEY, message).await {
        error!("Failed to store flash notice: {err}");
    }
}

/// Pop the pending notice, if any.
pub async fn take_flash(session: &Session) -> Option<String> {
    match session.remove::<String>(FLASH_KEY).await {
        Ok(message) => message,
        Err(err) => {
            error!("Failed to load flash notice: {err}");
            None
        }
    }
}
