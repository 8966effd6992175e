use rusqlite::{Connection, OptionalExtension, params};
use tracing::info;

use chatter_types::ROOT_USER_ID;

use crate::models::{PostRow, UserRow};
use crate::{Database, Result, StoreError};

impl Database {
    // -- Users --

    /// Insert a new user with default flags. The UNIQUE constraint on
    /// `username` decides the winner when two registrations race.
    pub fn create_user(&self, username: &str, password_hash: &str) -> Result<i64> {
        self.with_conn(|conn| {
            match conn.execute(
                "INSERT INTO users (username, password_hash) VALUES (?1, ?2)",
                params![username, password_hash],
            ) {
                Ok(_) => Ok(conn.last_insert_rowid()),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    Err(StoreError::DuplicateUsername)
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_username(conn, username))
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_id(conn, id))
    }

    /// Users whose name contains `search`, ascending id. Empty matches all.
    /// instr() keeps the match case-sensitive; LIKE would fold ASCII case.
    pub fn list_users(&self, search: &str) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, username, password_hash, is_admin, banned, created_at
                 FROM users
                 WHERE ?1 = '' OR instr(username, ?1) > 0
                 ORDER BY id ASC",
            )?;

            let rows = stmt
                .query_map([search], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn set_banned(&self, user_id: i64, banned: bool) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE users SET banned = ?2 WHERE id = ?1",
                params![user_id, banned],
            )?;
            Ok(())
        })
    }

    /// Ban: delete the target's posts, then set the flag, atomically.
    /// Unban does not bring the posts back.
    pub fn ban_user(&self, user_id: i64) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            delete_posts_by_author(&tx, user_id)?;
            tx.execute("UPDATE users SET banned = 1 WHERE id = ?1", [user_id])?;
            tx.commit()?;
            Ok(())
        })
    }

    /// Delete the account and everything it wrote, atomically.
    pub fn delete_user(&self, user_id: i64) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            delete_posts_by_author(&tx, user_id)?;
            tx.execute("DELETE FROM users WHERE id = ?1", [user_id])?;
            tx.commit()?;
            Ok(())
        })
    }

    // -- Posts --

    pub fn insert_post(&self, author_id: i64, text: &str) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO posts (author_id, text) VALUES (?1, ?2)",
                params![author_id, text],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_post(&self, post_id: i64) -> Result<Option<PostRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT p.id, p.author_id, u.username, p.text, p.created_at
                 FROM posts p
                 JOIN users u ON p.author_id = u.id
                 WHERE p.id = ?1",
            )?;

            let row = stmt.query_row([post_id], post_from_row).optional()?;
            Ok(row)
        })
    }

    pub fn delete_post(&self, post_id: i64) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM posts WHERE id = ?1", [post_id])?;
            Ok(())
        })
    }

    /// The shared feed, newest first. Post ids are the ordering key.
    pub fn list_posts(&self) -> Result<Vec<PostRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT p.id, p.author_id, u.username, p.text, p.created_at
                 FROM posts p
                 JOIN users u ON p.author_id = u.id
                 ORDER BY p.id DESC",
            )?;

            let rows = stmt
                .query_map([], post_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn list_posts_by_author(&self, author_id: i64) -> Result<Vec<PostRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT p.id, p.author_id, u.username, p.text, p.created_at
                 FROM posts p
                 JOIN users u ON p.author_id = u.id
                 WHERE p.author_id = ?1
                 ORDER BY p.id DESC",
            )?;

            let rows = stmt
                .query_map([author_id], post_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

/// Re-assert the root account's admin flag. Runs on every startup, after
/// migrations, so the first registered account holds admin rights no matter
/// what the rows said before.
pub fn bootstrap_root_admin(conn: &Connection) -> Result<()> {
    let changed = conn.execute(
        "UPDATE users SET is_admin = 1 WHERE id = ?1 AND is_admin = 0",
        [ROOT_USER_ID],
    )?;
    if changed > 0 {
        info!("Granted admin to root user");
    }
    Ok(())
}

/// Cascade shared by ban and account deletion.
fn delete_posts_by_author(conn: &Connection, author_id: i64) -> Result<()> {
    conn.execute("DELETE FROM posts WHERE author_id = ?1", [author_id])?;
    Ok(())
}

fn user_from_row(row: &rusqlite::Row) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        is_admin: row.get(3)?,
        banned: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn post_from_row(row: &rusqlite::Row) -> rusqlite::Result<PostRow> {
    Ok(PostRow {
        id: row.get(0)?,
        author_id: row.get(1)?,
        author_username: row.get(2)?,
        text: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn query_user_by_username(conn: &Connection, username: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, username, password_hash, is_admin, banned, created_at
         FROM users WHERE username = ?1",
    )?;

    let row = stmt.query_row([username], user_from_row).optional()?;
    Ok(row)
}

fn query_user_by_id(conn: &Connection, id: i64) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, username, password_hash, is_admin, banned, created_at
         FROM users WHERE id = ?1",
    )?;

    let row = stmt.query_row([id], user_from_row).optional()?;
    Ok(row)
}
