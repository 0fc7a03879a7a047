use rusqlite::Connection;

const UP_SQL: &str = r#"
-- Registry of articles and projects that accept comments
CREATE TABLE IF NOT EXISTS posts (
    slug       TEXT PRIMARY KEY NOT NULL,
    kind       TEXT NOT NULL CHECK (kind IN ('article', 'project')),
    title      TEXT NOT NULL,
    published  INTEGER NOT NULL DEFAULT 0,    -- boolean 0/1
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_posts_kind ON posts(kind, created_at DESC);
"#;

pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
