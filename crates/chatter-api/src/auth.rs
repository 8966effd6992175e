use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::{debug, info};

use chatter_auth::password;
use chatter_db::Database;
use chatter_types::api::{
    Claims, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse,
};

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
}

/// Tokens live 30 days. The role/status snapshot inside is refreshed only
/// by logging in again.
const TOKEN_TTL_DAYS: i64 = 30;

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.username.len() < 3 || req.username.len() > 32 {
        return Err(ApiError::BadRequest("username must be 3-32 characters"));
    }
    if req.password.len() < 8 {
        return Err(ApiError::BadRequest("password must be at least 8 characters"));
    }

    let password_hash = password::hash_password(&req.password)?;

    // No existence pre-check: the UNIQUE constraint on username is the
    // arbiter, so two concurrent registrations resolve in the store.
    let user_id = state.db.create_user(&req.username, &password_hash)?;

    let token = create_token(&state.jwt_secret, user_id, &req.username, false, false)?;

    info!(user_id, username = %req.username, "registered new user");

    Ok((StatusCode::CREATED, Json(RegisterResponse { user_id, token })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(user) = state.db.get_user_by_username(&req.username)? else {
        // Burn the same hashing work as a real verification so unknown
        // usernames are not distinguishable by response time.
        password::equalize_verify_work(&req.password);
        return Err(ApiError::AuthenticationFailed);
    };

    if !password::verify_password(&req.password, &user.password_hash) {
        return Err(ApiError::AuthenticationFailed);
    }

    // The role/status snapshot is taken here and rides in the token until
    // the next login. Banned users may still log in and read the feed.
    let token = create_token(
        &state.jwt_secret,
        user.id,
        &user.username,
        user.is_admin,
        user.banned,
    )?;

    Ok(Json(LoginResponse {
        user_id: user.id,
        username: user.username,
        is_admin: user.is_admin,
        banned: user.banned,
        token,
    }))
}

/// Stateless tokens leave nothing to tear down server-side; the client
/// drops its token and is anonymous again. Unconditional: logging out an
/// already-anonymous caller is a success too.
pub async fn logout() -> StatusCode {
    debug!("logout");
    StatusCode::NO_CONTENT
}

fn create_token(
    secret: &str,
    user_id: i64,
    username: &str,
    is_admin: bool,
    banned: bool,
) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        is_admin,
        banned,
        exp: (chrono::Utc::now() + chrono::Duration::days(TOKEN_TTL_DAYS)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatter_auth::session::Session;
    use jsonwebtoken::{DecodingKey, Validation, decode};

    #[test]
    fn token_roundtrip_preserves_snapshot() {
        let token = create_token("test-secret", 2, "alice", true, false).unwrap();

        let claims = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"test-secret"),
            &Validation::default(),
        )
        .unwrap()
        .claims;

        assert_eq!(claims.sub, 2);
        assert_eq!(claims.username, "alice");
        assert!(claims.is_admin);
        assert!(!claims.banned);

        let session = Session::from(claims);
        assert_eq!(session.user_id, 2);
    }

    #[test]
    fn wrong_secret_rejects_token() {
        let token = create_token("secret-a", 2, "alice", false, false).unwrap();

        let result = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"secret-b"),
            &Validation::default(),
        );
        assert!(result.is_err());
    }
}
