//! Task list handlers. Every read and mutation is scoped to the
//! session user; foreign or missing task ids no-op so redirects reveal
//! nothing about other users' rows.

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::error;

use crate::taskoj::{handlers::require_user, pages, store::Store};

#[derive(Deserialize)]
pub struct NewTask {
    title: String,
}

pub async fn list(session: Session, store: Extension<Store>) -> Response {
    let user_id = match require_user(&session).await {
        Ok(user_id) => user_id,
        Err(redirect) => return redirect.into_response(),
    };

    render(&store, user_id).await
}

pub async fn create(
    session: Session,
    store: Extension<Store>,
    Form(new_task): Form<NewTask>,
) -> Response {
    let user_id = match require_user(&session).await {
        Ok(user_id) => user_id,
        Err(redirect) => return redirect.into_response(),
    };

    // An empty title is dropped silently and the list re-rendered as-is.
    let title = new_task.title.trim();
    if !title.is_empty() {
        if let Err(err) = store.insert_task(user_id, title).await {
            error!("Failed to insert task: {err}");

            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    }

    render(&store, user_id).await
}

pub async fn toggle(
    session: Session,
    store: Extension<Store>,
    Path(task_id): Path<i64>,
) -> Response {
    let user_id = match require_user(&session).await {
        Ok(user_id) => user_id,
        Err(redirect) => return redirect.into_response(),
    };

    if let Err(err) = store.toggle_task_done(task_id, user_id).await {
        error!("Failed to toggle task: {err}");

        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    Redirect::to("/tasks").into_response()
}

pub async fn delete(
    session: Session,
    store: Extension<Store>,
    Path(task_id): Path<i64>,
) -> Response {
    let user_id = match require_user(&session).await {
        Ok(user_id) => user_id,
        Err(redirect) => return redirect.into_response(),
    };

    if let Err(err) = store.delete_task(task_id, user_id).await {
        error!("Failed to delete task: {err}");

        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    Redirect::to("/tasks").into_response()
}

async fn render(store: &Store, user_id: i64) -> Response {
    match store.list_tasks(user_id).await {
        Ok(tasks) => Html(pages::tasks(&tasks)).into_response(),
        Err(err) => {
            error!("Failed to list tasks: {err}");

            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
