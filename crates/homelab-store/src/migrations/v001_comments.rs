//! v001 -- Comments and comment likes.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Comments
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS comments (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    post_slug  TEXT NOT NULL,
    author_id  TEXT NOT NULL,                 -- opaque id from the auth provider
    username   TEXT NOT NULL,                 -- frozen at creation time
    content    TEXT NOT NULL,
    parent_id  INTEGER,                       -- nullable FK -> comments(id)
    created_at TEXT NOT NULL,                 -- RFC-3339, microsecond precision
    updated_at TEXT NOT NULL,

    FOREIGN KEY (parent_id) REFERENCES comments(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_comments_post_created
    ON comments(post_slug, created_at ASC);
CREATE INDEX IF NOT EXISTS idx_comments_parent ON comments(parent_id);

-- ----------------------------------------------------------------
-- Comment likes: at most one per (comment, viewer)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS comment_likes (
    comment_id INTEGER NOT NULL,              -- FK -> comments(id)
    viewer_id  TEXT NOT NULL,
    created_at TEXT NOT NULL,

    PRIMARY KEY (comment_id, viewer_id),
    FOREIGN KEY (comment_id) REFERENCES comments(id) ON DELETE CASCADE
);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
