pub mod admin;
pub mod auth;
pub mod error;
pub mod feed;
pub mod middleware;
pub mod posts;

use chatter_auth::policy::{self, Action, Decision};
use chatter_auth::session::Session;

use crate::error::ApiError;

/// Run an action through the authorization policy, translating a denial
/// into its API error. Handlers call this before touching storage.
pub fn authorize(session: Option<&Session>, action: Action) -> Result<(), ApiError> {
    match policy::decide(session, action) {
        Decision::Allow => Ok(()),
        Decision::Deny(reason) => Err(reason.into()),
    }
}
