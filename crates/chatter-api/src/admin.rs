use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::info;

use chatter_auth::policy::Action;
use chatter_auth::session::Session;
use chatter_db::models::UserRow;
use chatter_types::api::UserView;

use crate::auth::AppState;
use crate::authorize;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct UserSearchQuery {
    /// Case-sensitive substring; empty (the default) matches everyone.
    #[serde(default)]
    pub q: String,
}

pub async fn search_users(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<UserSearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(Some(&session), Action::ViewAdminPanel)?;

    let users = state.db.list_users(&query.q)?;
    let users: Vec<UserView> = users.into_iter().map(user_view).collect();

    Ok(Json(users))
}

pub async fn ban_user(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(Some(&session), Action::BanUser { target_id: user_id })?;

    if state.db.get_user_by_id(user_id)?.is_none() {
        return Err(ApiError::NotFound);
    }

    // Wipes the target's posts first; unban will not bring them back.
    state.db.ban_user(user_id)?;
    info!(target = user_id, admin = session.user_id, "user banned");

    Ok(StatusCode::NO_CONTENT)
}

pub async fn unban_user(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(Some(&session), Action::UnbanUser { target_id: user_id })?;

    if state.db.get_user_by_id(user_id)?.is_none() {
        return Err(ApiError::NotFound);
    }

    state.db.set_banned(user_id, false)?;
    info!(target = user_id, admin = session.user_id, "user unbanned");

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(Some(&session), Action::DeleteUser { target_id: user_id })?;

    if state.db.get_user_by_id(user_id)?.is_none() {
        return Err(ApiError::NotFound);
    }

    state.db.delete_user(user_id)?;
    info!(target = user_id, admin = session.user_id, "user deleted");

    Ok(StatusCode::NO_CONTENT)
}

pub(crate) fn user_view(row: UserRow) -> UserView {
    UserView {
        id: row.id,
        username: row.username,
        is_admin: row.is_admin,
        banned: row.banned,
    }
}
