pub mod health;
pub use self::health::health;

pub mod root;
pub use self::root::root;

pub mod auth;
pub mod tasks;

// common functions for the handlers
use crate::taskoj::sessions;
use axum::response::Redirect;
use tower_sessions::Session;

/// Resolve the session to a user id, or bounce to the login form.
///
/// Every task-scoped route goes through this; unauthenticated access
/// redirects rather than erroring.
pub async fn require_user(session: &Session) -> Result<i64, Redirect> {
    match sessions::current_user(session).await {
        Some(user_id) => Ok(user_id),
        None => Err(Redirect::to("/login")),
    }
}
