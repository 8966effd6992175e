use crate::session::Session;

pub use chatter_types::ROOT_USER_ID;

/// An action a session is asking to perform. Targets are carried by id;
/// callers resolve rows before and after the decision, never inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ViewFeed,
    CreatePost,
    DeletePost { author_id: i64 },
    BanUser { target_id: i64 },
    UnbanUser { target_id: i64 },
    DeleteUser { target_id: i64 },
    ViewAdminPanel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    NotAuthenticated,
    Banned,
    Forbidden,
    ProtectedAccount,
}

/// The single authorization gate. Every mutating or privileged handler runs
/// its action through here, with `None` standing for an anonymous request,
/// before touching storage.
///
/// Decisions are made against the session's login-time flag snapshot, not
/// the current user row. A ban or a revoked admin flag therefore takes
/// effect for a live session only once it logs in again.
pub fn decide(session: Option<&Session>, action: Action) -> Decision {
    use Decision::{Allow, Deny};

    let Some(session) = session else {
        return Deny(DenyReason::NotAuthenticated);
    };

    match action {
        Action::ViewFeed => Allow,

        Action::CreatePost => {
            if session.banned {
                Deny(DenyReason::Banned)
            } else {
                Allow
            }
        }

        // Authors may remove their own posts; admins may remove any.
        Action::DeletePost { author_id } => {
            if author_id == session.user_id || session.is_admin {
                Allow
            } else {
                Deny(DenyReason::Forbidden)
            }
        }

        Action::BanUser { target_id }
        | Action::UnbanUser { target_id }
        | Action::DeleteUser { target_id } => {
            if !session.is_admin {
                Deny(DenyReason::Forbidden)
            } else if target_id == ROOT_USER_ID {
                Deny(DenyReason::ProtectedAccount)
            } else {
                Allow
            }
        }

        Action::ViewAdminPanel => {
            if session.is_admin {
                Allow
            } else {
                Deny(DenyReason::Forbidden)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(user_id: i64) -> Session {
        Session {
            user_id,
            username: format!("user{user_id}"),
            is_admin: false,
            banned: false,
        }
    }

    fn admin(user_id: i64) -> Session {
        Session {
            is_admin: true,
            ..member(user_id)
        }
    }

    #[test]
    fn anonymous_is_denied_everything() {
        for action in [
            Action::ViewFeed,
            Action::CreatePost,
            Action::DeletePost { author_id: 2 },
            Action::BanUser { target_id: 2 },
            Action::UnbanUser { target_id: 2 },
            Action::DeleteUser { target_id: 2 },
            Action::ViewAdminPanel,
        ] {
            assert_eq!(
                decide(None, action),
                Decision::Deny(DenyReason::NotAuthenticated),
                "{action:?}"
            );
        }
    }

    #[test]
    fn members_can_view_and_post() {
        let s = member(2);
        assert_eq!(decide(Some(&s), Action::ViewFeed), Decision::Allow);
        assert_eq!(decide(Some(&s), Action::CreatePost), Decision::Allow);
    }

    #[test]
    fn banned_snapshot_blocks_posting_but_not_viewing() {
        let s = Session {
            banned: true,
            ..member(2)
        };
        assert_eq!(
            decide(Some(&s), Action::CreatePost),
            Decision::Deny(DenyReason::Banned)
        );
        assert_eq!(decide(Some(&s), Action::ViewFeed), Decision::Allow);
    }

    #[test]
    fn snapshot_rules_even_when_stale() {
        // A session minted before a ban still carries banned=false and is
        // allowed to post until it re-authenticates. Intentional: flags are
        // never re-derived mid-session.
        let stale = member(2);
        assert_eq!(decide(Some(&stale), Action::CreatePost), Decision::Allow);

        let refreshed = Session {
            banned: true,
            ..member(2)
        };
        assert_eq!(
            decide(Some(&refreshed), Action::CreatePost),
            Decision::Deny(DenyReason::Banned)
        );
    }

    #[test]
    fn post_deletion_needs_ownership_or_admin() {
        let owner = member(2);
        let other = member(3);
        let moderator = admin(4);
        let action = Action::DeletePost { author_id: 2 };

        assert_eq!(decide(Some(&owner), action), Decision::Allow);
        assert_eq!(
            decide(Some(&other), action),
            Decision::Deny(DenyReason::Forbidden)
        );
        assert_eq!(decide(Some(&moderator), action), Decision::Allow);
    }

    #[test]
    fn moderation_is_admin_only() {
        let s = member(2);
        for action in [
            Action::BanUser { target_id: 3 },
            Action::UnbanUser { target_id: 3 },
            Action::DeleteUser { target_id: 3 },
        ] {
            assert_eq!(
                decide(Some(&s), action),
                Decision::Deny(DenyReason::Forbidden),
                "{action:?}"
            );
        }

        let a = admin(2);
        for action in [
            Action::BanUser { target_id: 3 },
            Action::UnbanUser { target_id: 3 },
            Action::DeleteUser { target_id: 3 },
        ] {
            assert_eq!(decide(Some(&a), action), Decision::Allow, "{action:?}");
        }
    }

    #[test]
    fn root_account_is_untouchable_even_by_admins() {
        let a = admin(2);
        for action in [
            Action::BanUser { target_id: ROOT_USER_ID },
            Action::UnbanUser { target_id: ROOT_USER_ID },
            Action::DeleteUser { target_id: ROOT_USER_ID },
        ] {
            assert_eq!(
                decide(Some(&a), action),
                Decision::Deny(DenyReason::ProtectedAccount),
                "{action:?}"
            );
        }
    }

    #[test]
    fn admin_panel_is_silently_gated() {
        assert_eq!(
            decide(Some(&member(2)), Action::ViewAdminPanel),
            Decision::Deny(DenyReason::Forbidden)
        );
        assert_eq!(decide(Some(&admin(2)), Action::ViewAdminPanel), Decision::Allow);
    }
}
