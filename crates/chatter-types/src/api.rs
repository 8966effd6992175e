use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// -- JWT Claims --

/// JWT claims shared between chatter-api (login mints them) and the auth
/// middleware (decodes them). Canonical definition lives here in
/// chatter-types to eliminate duplication.
///
/// `is_admin` and `banned` are snapshots taken when the token was minted;
/// they are not refreshed until the user logs in again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    pub is_admin: bool,
    pub banned: bool,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: i64,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: i64,
    pub username: String,
    pub is_admin: bool,
    pub banned: bool,
    pub token: String,
}

// -- Posts --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePostRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: i64,
    pub author_id: i64,
    pub author_username: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

// -- Admin --

#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: i64,
    pub username: String,
    pub is_admin: bool,
    pub banned: bool,
}

// -- Feed --

#[derive(Debug, Serialize)]
pub struct ViewerView {
    pub user_id: i64,
    pub username: String,
    pub is_admin: bool,
}

/// Everything the rendering side needs for the feed page in one value.
/// `admin_users` is absent (not just empty) for non-admin viewers.
#[derive(Debug, Serialize)]
pub struct FeedView {
    pub viewer: ViewerView,
    pub own_posts: Vec<PostView>,
    pub all_posts: Vec<PostView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_users: Option<Vec<UserView>>,
}
