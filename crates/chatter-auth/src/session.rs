use chatter_types::api::Claims;

/// Immutable per-request identity established by the auth middleware.
///
/// The `is_admin`/`banned` flags were captured when the token was minted at
/// login and ride along unchanged until the next login. A request with no
/// valid token carries no `Session` at all; the policy layer treats
/// `None` as the anonymous state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: i64,
    pub username: String,
    pub is_admin: bool,
    pub banned: bool,
}

impl From<Claims> for Session {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username,
            is_admin: claims.is_admin,
            banned: claims.banned,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_mirrors_claims() {
        let claims = Claims {
            sub: 7,
            username: "alice".into(),
            is_admin: true,
            banned: false,
            exp: 0,
        };
        let session = Session::from(claims);
        assert_eq!(session.user_id, 7);
        assert_eq!(session.username, "alice");
        assert!(session.is_admin);
        assert!(!session.banned);
    }
}
