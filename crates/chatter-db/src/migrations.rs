use rusqlite::Connection;
use tracing::info;

use crate::Result;

/// Ordered schema migrations. `PRAGMA user_version` records how many have
/// been applied. Append-only: never edit or reorder a shipped entry.
const MIGRATIONS: &[(&str, &str)] = &[
    (
        "create users and posts",
        "
        CREATE TABLE users (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            username      TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            created_at    TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE posts (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            author_id   INTEGER NOT NULL REFERENCES users(id),
            text        TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_posts_author ON posts(author_id);
        ",
    ),
    (
        "add moderation flags",
        "
        ALTER TABLE users ADD COLUMN is_admin INTEGER NOT NULL DEFAULT 0;
        ALTER TABLE users ADD COLUMN banned   INTEGER NOT NULL DEFAULT 0;
        ",
    ),
];

/// Apply every migration past the database's recorded version. Each step
/// runs in its own transaction together with the version bump, so a crash
/// mid-migration cannot leave a half-applied step behind.
pub fn run(conn: &Connection) -> Result<()> {
    let applied = conn.query_row("PRAGMA user_version", [], |row| row.get::<_, i64>(0))? as usize;

    for (version, (name, sql)) in MIGRATIONS.iter().enumerate().skip(applied) {
        conn.execute_batch(&format!(
            "BEGIN;\n{sql}\nPRAGMA user_version = {};\nCOMMIT;",
            version + 1
        ))?;
        info!("Applied migration {}: {}", version + 1, name);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reruns_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        run(&conn).unwrap();

        let version: i64 = conn
            .query_row("PRAGMA user_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(version as usize, MIGRATIONS.len());
    }

    #[test]
    fn schema_has_moderation_flags() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();

        // Columns from both migration steps must be queryable together.
        conn.prepare("SELECT id, username, password_hash, is_admin, banned FROM users")
            .unwrap();
    }
}
