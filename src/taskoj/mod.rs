pub mod handlers;
pub mod pages;
pub mod password;
pub mod sessions;
pub mod store;

use anyhow::Result;
use axum::{extract::Extension, routing::get, Router};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tower_sessions::{
    cookie::{time::Duration, Key},
    Expiry, MemoryStore, SessionManagerLayer,
};

use self::store::Store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

/// Session inactivity expiry, in hours.
const SESSION_TTL_HOURS: i64 = 12;

/// Build the application router over an injected store and signing key.
///
/// Sessions live in a server-side in-memory store behind a signed
/// cookie; the relational file never holds session state.
#[must_use]
pub fn router(store: Store, key: Key) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(false)
        .with_expiry(Expiry::OnInactivity(Duration::hours(SESSION_TTL_HOURS)))
        .with_signed(key);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route(
            "/register",
            get(handlers::auth::register_form).post(handlers::auth::register),
        )
        .route(
            "/login",
            get(handlers::auth::login_form).post(handlers::auth::login),
        )
        .route(
            "/tasks",
            get(handlers::tasks::list).post(handlers::tasks::create),
        )
        .route("/done/:task_id", get(handlers::tasks::toggle))
        .route("/delete/:task_id", get(handlers::tasks::delete))
        .route("/logout", get(handlers::auth::logout))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(session_layer)
                .layer(Extension(store)),
        )
}

/// Start the server
pub async fn new(port: u16, store: Store, key: Key) -> Result<()> {
    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    let app = router(store, key);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
