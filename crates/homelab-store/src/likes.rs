use chrono::Utc;
use rusqlite::{params, Connection};

use homelab_shared::{CommentId, ViewerId};

use crate::database::Database;
use crate::error::{is_unique_violation, Result, StoreError};
use crate::timestamp;

impl Database {
    /// Flip `viewer`'s like on a comment and return the resulting state.
    ///
    /// A present like is removed (`false`), an absent one inserted (`true`).
    /// If the insert collides with a like written concurrently for the same
    /// pair, the existing row wins and the call reports `true`.
    pub fn toggle_like(&self, comment_id: CommentId, viewer: &ViewerId) -> Result<bool> {
        let tx = self.conn().unchecked_transaction()?;

        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM comments WHERE id = ?1)",
            params![comment_id.0],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(StoreError::NotFound);
        }

        let removed = tx.execute(
            "DELETE FROM comment_likes WHERE comment_id = ?1 AND viewer_id = ?2",
            params![comment_id.0, viewer.as_str()],
        )?;

        let liked = removed == 0 && insert_like(&tx, comment_id, viewer)?;

        tx.commit()?;

        tracing::debug!(comment_id = %comment_id, viewer = %viewer, liked, "like toggled");
        Ok(liked)
    }

    /// Number of likes on one comment.
    pub fn like_count(&self, comment_id: CommentId) -> Result<u64> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM comment_likes WHERE comment_id = ?1",
            params![comment_id.0],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }

    pub fn has_liked(&self, comment_id: CommentId, viewer: &ViewerId) -> Result<bool> {
        let liked: bool = self.conn().query_row(
            "SELECT EXISTS(SELECT 1 FROM comment_likes WHERE comment_id = ?1 AND viewer_id = ?2)",
            params![comment_id.0, viewer.as_str()],
            |row| row.get(0),
        )?;
        Ok(liked)
    }
}

/// Insert the like for a pair. A row already present for the pair, written
/// by a concurrent toggle, counts as success.
fn insert_like(conn: &Connection, comment_id: CommentId, viewer: &ViewerId) -> Result<bool> {
    match conn.execute(
        "INSERT INTO comment_likes (comment_id, viewer_id, created_at) VALUES (?1, ?2, ?3)",
        params![comment_id.0, viewer.as_str(), timestamp::to_sql(&Utc::now())],
    ) {
        Ok(_) => Ok(true),
        Err(e) if is_unique_violation(&e) => {
            tracing::debug!(
                comment_id = %comment_id,
                viewer = %viewer,
                "like already present, keeping existing row"
            );
            Ok(true)
        }
        Err(e) => Err(e.into()),
    }
}
