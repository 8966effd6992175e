use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{error, info};

use chatter_auth::policy::Action;
use chatter_auth::session::Session;
use chatter_types::api::CreatePostRequest;

use crate::auth::AppState;
use crate::authorize;
use crate::error::ApiError;

pub async fn create_post(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(req): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(Some(&session), Action::CreatePost)?;

    let text = req.text.trim().to_string();
    if text.is_empty() {
        return Err(ApiError::BadRequest("post text must not be empty"));
    }

    // Run the blocking DB insert off the async runtime
    let db = state.clone();
    let author_id = session.user_id;
    let post_id = tokio::task::spawn_blocking(move || db.db.insert_post(author_id, &text))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {e}");
            ApiError::Internal(e.into())
        })??;

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": post_id }))))
}

/// Posts are immutable; the only mutation after creation is removal, by the
/// author or by an administrator.
pub async fn delete_post(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(post_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state.db.get_post(post_id)?.ok_or(ApiError::NotFound)?;

    authorize(
        Some(&session),
        Action::DeletePost {
            author_id: post.author_id,
        },
    )?;

    state.db.delete_post(post_id)?;
    info!(post_id, user_id = session.user_id, "post deleted");

    Ok(StatusCode::NO_CONTENT)
}
