//! Register, login, and logout handlers.
//!
//! Failures that come from caller input are flashed and redirected back
//! to the originating form; login failures answer with one generic
//! notice so the caller cannot tell which half of the pair was wrong.

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{debug, error};

use crate::taskoj::{
    pages, password, sessions,
    store::{SignupOutcome, Store},
};

const PASSWORD_POLICY_NOTICE: &str =
    "Password must be at least 8 characters, contain a number and an uppercase letter.";

#[derive(Deserialize)]
pub struct Credentials {
    username: String,
    password: String,
}

pub async fn register_form(session: Session) -> Html<String> {
    let flash = sessions::take_flash(&session).await;

    Html(pages::register(flash.as_deref()))
}

pub async fn register(
    session: Session,
    store: Extension<Store>,
    Form(credentials): Form<Credentials>,
) -> Response {
    let username = credentials.username.trim();

    if username.is_empty() {
        sessions::flash(&session, "Username is required.").await;

        return Redirect::to("/register").into_response();
    }

    if !password::acceptable(&credentials.password) {
        sessions::flash(&session, PASSWORD_POLICY_NOTICE).await;

        return Redirect::to("/register").into_response();
    }

    let digest = match password::hash(&credentials.password) {
        Ok(digest) => digest,
        Err(err) => {
            error!("Failed to hash password: {err}");

            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    match store.create_user(username, &digest).await {
        Ok(SignupOutcome::Created(user_id)) => {
            debug!("Created user {user_id}");

            sessions::flash(&session, "Account created successfully. Please log in.").await;

            Redirect::to("/login").into_response()
        }
        Ok(SignupOutcome::Conflict) => {
            sessions::flash(&session, "Username already taken.").await;

            Redirect::to("/register").into_response()
        }
        Err(err) => {
            error!("Failed to create user: {err}");

            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn login_form(session: Session) -> Html<String> {
    let flash = sessions::take_flash(&session).await;

    Html(pages::login(flash.as_deref()))
}

pub async fn login(
    session: Session,
    store: Extension<Store>,
    Form(credentials): Form<Credentials>,
) -> Response {
    let user = match store.find_user_by_username(credentials.username.trim()).await {
        Ok(user) => user,
        Err(err) => {
            error!("Failed to lookup user: {err}");

            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    match user {
        Some(user) if password::verify(&credentials.password, &user.password_hash) => {
            if let Err(err) = sessions::start(&session, user.id).await {
                error!("Failed to start session: {err}");

                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }

            Redirect::to("/tasks").into_response()
        }
        // Unknown username and wrong password answer identically.
        _ => {
            sessions::flash(&session, "Invalid username or password.").await;

            Redirect::to("/login").into_response()
        }
    }
}

pub async fn logout(session: Session) -> Redirect {
    if let Err(err) = sessions::end(&session).await {
        error!("Failed to end session: {err}");
    }

    Redirect::to("/login")
}
