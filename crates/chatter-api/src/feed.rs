use axum::{Extension, Json, extract::State, response::IntoResponse};
use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::{error, warn};

use chatter_auth::policy::{self, Action, Decision};
use chatter_auth::session::Session;
use chatter_db::models::{PostRow, UserRow};
use chatter_types::api::{FeedView, PostView, ViewerView};

use crate::auth::AppState;
use crate::error::ApiError;

/// GET /feed — the whole page in one view model: the viewer, their own
/// posts, the shared feed newest-first, and the user directory for
/// administrators. Non-admins get no `admin_users` field at all.
pub async fn get_feed(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse, ApiError> {
    crate::authorize(Some(&session), Action::ViewFeed)?;

    let include_admin = matches!(
        policy::decide(Some(&session), Action::ViewAdminPanel),
        Decision::Allow
    );

    // Run all blocking DB reads off the async runtime
    let db = state.clone();
    let viewer_id = session.user_id;
    let (all_posts, own_posts, admin_users) = tokio::task::spawn_blocking(move || {
        let all = db.db.list_posts()?;
        let own = db.db.list_posts_by_author(viewer_id)?;
        let users = if include_admin {
            Some(db.db.list_users("")?)
        } else {
            None
        };
        Ok::<_, chatter_db::StoreError>((all, own, users))
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {e}");
        ApiError::Internal(e.into())
    })??;

    Ok(Json(assemble(&session, own_posts, all_posts, admin_users)))
}

/// Pure composition of rows into the view model; no queries, no markup.
fn assemble(
    session: &Session,
    own_posts: Vec<PostRow>,
    all_posts: Vec<PostRow>,
    admin_users: Option<Vec<UserRow>>,
) -> FeedView {
    FeedView {
        viewer: ViewerView {
            user_id: session.user_id,
            username: session.username.clone(),
            is_admin: session.is_admin,
        },
        own_posts: own_posts.into_iter().map(post_view).collect(),
        all_posts: all_posts.into_iter().map(post_view).collect(),
        admin_users: admin_users
            .map(|users| users.into_iter().map(crate::admin::user_view).collect()),
    }
}

fn post_view(row: PostRow) -> PostView {
    let created_at = parse_sqlite_timestamp(&row.created_at, row.id);
    PostView {
        id: row.id,
        author_id: row.author_id,
        author_username: row.author_username,
        text: row.text,
        created_at,
    }
}

/// SQLite's datetime('now') yields "YYYY-MM-DD HH:MM:SS" with no timezone;
/// treat it as UTC.
fn parse_sqlite_timestamp(raw: &str, post_id: i64) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt created_at '{}' on post {}: {}", raw, post_id, e);
            DateTime::default()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(id: i64, author_id: i64, author: &str, text: &str) -> PostRow {
        PostRow {
            id,
            author_id,
            author_username: author.into(),
            text: text.into(),
            created_at: "2024-05-01 12:00:00".into(),
        }
    }

    fn user(id: i64, username: &str) -> UserRow {
        UserRow {
            id,
            username: username.into(),
            password_hash: "hash".into(),
            is_admin: false,
            banned: false,
            created_at: "2024-05-01 12:00:00".into(),
        }
    }

    #[test]
    fn member_view_omits_admin_users() {
        let session = Session {
            user_id: 2,
            username: "alice".into(),
            is_admin: false,
            banned: false,
        };

        let view = assemble(
            &session,
            vec![post(3, 2, "alice", "mine")],
            vec![post(4, 5, "bob", "theirs"), post(3, 2, "alice", "mine")],
            None,
        );

        assert_eq!(view.viewer.username, "alice");
        assert_eq!(view.own_posts.len(), 1);
        assert_eq!(view.all_posts.len(), 2);
        assert!(view.admin_users.is_none());
    }

    #[test]
    fn admin_view_carries_user_directory() {
        let session = Session {
            user_id: 1,
            username: "root".into(),
            is_admin: true,
            banned: false,
        };

        let view = assemble(
            &session,
            vec![],
            vec![],
            Some(vec![user(1, "root"), user(2, "alice")]),
        );

        let users = view.admin_users.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[1].username, "alice");
    }

    #[test]
    fn sqlite_timestamps_parse_as_utc() {
        let parsed = parse_sqlite_timestamp("2024-05-01 12:00:00", 1);
        assert_eq!(parsed.to_rfc3339(), "2024-05-01T12:00:00+00:00");

        // Garbage falls back to the epoch default rather than failing the
        // whole feed.
        let fallback = parse_sqlite_timestamp("not a date", 1);
        assert_eq!(fallback, DateTime::<Utc>::default());
    }
}
