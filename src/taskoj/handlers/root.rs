use crate::taskoj::sessions;
use axum::response::Redirect;
use tower_sessions::Session;

// axum handler for the index route
pub async fn root(session: Session) -> Redirect {
    if sessions::current_user(&session).await.is_some() {
        Redirect::to("/tasks")
    } else {
        Redirect::to("/login")
    }
}
