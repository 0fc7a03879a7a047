//! Comment rows and the aggregated per-post read.

use chrono::{SubsecRound, Utc};
use rusqlite::params;

use homelab_shared::comment::{resolve_username, validate_body};
use homelab_shared::{CommentId, PostSlug, ViewerId};

use crate::database::Database;
use crate::error::{not_found, Result, StoreError};
use crate::models::{Comment, CommentRecord, NewComment};
use crate::timestamp;

const COMMENT_COLUMNS: &str =
    "c.id, c.post_slug, c.author_id, c.username, c.content, c.parent_id, c.created_at, c.updated_at";

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a comment and return the stored row.
    ///
    /// A reply's parent must already exist on the same post.
    pub fn insert_comment(&self, new: &NewComment) -> Result<Comment> {
        let content = validate_body(&new.content)?;
        let username = resolve_username(Some(&new.username));

        if let Some(parent) = new.parent_id {
            let same_post: bool = self.conn().query_row(
                "SELECT EXISTS(SELECT 1 FROM comments WHERE id = ?1 AND post_slug = ?2)",
                params![parent.0, new.post_slug.as_str()],
                |row| row.get(0),
            )?;
            if !same_post {
                return Err(StoreError::InvalidParent(parent));
            }
        }

        // Stored at microsecond precision; truncate so the returned value
        // equals what a later read yields.
        let now = Utc::now().trunc_subsecs(6);
        let ts = timestamp::to_sql(&now);

        self.conn().execute(
            "INSERT INTO comments (post_slug, author_id, username, content, parent_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                new.post_slug.as_str(),
                new.author_id.as_str(),
                username,
                content,
                new.parent_id.map(|p| p.0),
                ts,
                ts,
            ],
        )?;
        let id = CommentId(self.conn().last_insert_rowid());

        tracing::debug!(
            comment_id = %id,
            post_slug = %new.post_slug,
            parent_id = ?new.parent_id,
            "comment inserted"
        );

        Ok(Comment {
            id,
            post_slug: new.post_slug.clone(),
            author_id: new.author_id.clone(),
            username,
            content,
            parent_id: new.parent_id,
            created_at: now,
            updated_at: now,
        })
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    pub fn get_comment(&self, id: CommentId) -> Result<Comment> {
        self.conn()
            .query_row(
                &format!("SELECT {COMMENT_COLUMNS} FROM comments c WHERE c.id = ?1"),
                params![id.0],
                row_to_comment,
            )
            .map_err(not_found)
    }

    /// All comments of a post in creation order, each with its like count
    /// and whether `viewer` liked it.
    ///
    /// Likes are aggregated by the same query; without a viewer every
    /// `viewer_has_liked` is `false`.
    pub fn comments_for_post(
        &self,
        post_slug: &PostSlug,
        viewer: Option<&ViewerId>,
    ) -> Result<Vec<CommentRecord>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {COMMENT_COLUMNS},
                    COUNT(l.viewer_id) AS like_count,
                    COALESCE(MAX(l.viewer_id = ?2), 0) AS viewer_has_liked
             FROM comments c
             LEFT JOIN comment_likes l ON l.comment_id = c.id
             WHERE c.post_slug = ?1
             GROUP BY c.id
             ORDER BY c.created_at ASC, c.id ASC"
        ))?;

        let rows = stmt.query_map(
            params![post_slug.as_str(), viewer.map(ViewerId::as_str)],
            row_to_record,
        )?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// Number of comments on a post, replies included.
    pub fn comment_count(&self, post_slug: &PostSlug) -> Result<u64> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM comments WHERE post_slug = ?1",
            params![post_slug.as_str()],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn conversion_error(
    idx: usize,
    e: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
}

/// Map the leading [`COMMENT_COLUMNS`] of a row to a [`Comment`].
fn row_to_comment(row: &rusqlite::Row<'_>) -> rusqlite::Result<Comment> {
    let id: i64 = row.get(0)?;
    let slug_str: String = row.get(1)?;
    let author_str: String = row.get(2)?;
    let username: String = row.get(3)?;
    let content: String = row.get(4)?;
    let parent_id: Option<i64> = row.get(5)?;

    let post_slug = PostSlug::parse(&slug_str).map_err(|e| conversion_error(1, e))?;
    let author_id = ViewerId::new(author_str).map_err(|e| conversion_error(2, e))?;

    Ok(Comment {
        id: CommentId(id),
        post_slug,
        author_id,
        username,
        content,
        parent_id: parent_id.map(CommentId),
        created_at: timestamp::column(row, 6)?,
        updated_at: timestamp::column(row, 7)?,
    })
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<CommentRecord> {
    let comment = row_to_comment(row)?;
    let like_count: i64 = row.get(8)?;
    let viewer_has_liked: bool = row.get(9)?;

    Ok(CommentRecord {
        comment,
        like_count: like_count.max(0) as u64,
        viewer_has_liked,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn slug(s: &str) -> PostSlug {
        PostSlug::parse(s).unwrap()
    }

    pub(crate) fn viewer(s: &str) -> ViewerId {
        ViewerId::new(s).unwrap()
    }

    pub(crate) fn post_comment(
        db: &Database,
        post: &str,
        author: &str,
        parent: Option<CommentId>,
    ) -> Comment {
        db.insert_comment(&NewComment {
            post_slug: slug(post),
            author_id: viewer(author),
            username: author.to_string(),
            content: format!("hello from {author}"),
            parent_id: parent,
        })
        .unwrap()
    }

    #[test]
    fn test_insert_and_get() {
        let db = Database::open_in_memory().unwrap();
        let created = db
            .insert_comment(&NewComment {
                post_slug: slug("truenas-upgrade"),
                author_id: viewer("user_1"),
                username: "  ".to_string(),
                content: "  first!  ".to_string(),
                parent_id: None,
            })
            .unwrap();

        assert_eq!(created.content, "first!");
        assert_eq!(created.username, "Anonymous");
        assert_eq!(created.created_at, created.updated_at);

        let fetched = db.get_comment(created.id).unwrap();
        assert_eq!(fetched, created);
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(
            db.get_comment(CommentId(404)),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn test_empty_content_rejected() {
        let db = Database::open_in_memory().unwrap();
        let result = db.insert_comment(&NewComment {
            post_slug: slug("post"),
            author_id: viewer("user_1"),
            username: "Ada".to_string(),
            content: " \n ".to_string(),
            parent_id: None,
        });
        assert!(matches!(result, Err(StoreError::Invalid(_))));
        assert_eq!(db.comment_count(&slug("post")).unwrap(), 0);
    }

    #[test]
    fn test_parent_must_exist_on_same_post() {
        let db = Database::open_in_memory().unwrap();
        let other = post_comment(&db, "other-post", "user_1", None);

        let missing = db.insert_comment(&NewComment {
            post_slug: slug("post"),
            author_id: viewer("user_2"),
            username: "Bob".to_string(),
            content: "reply".to_string(),
            parent_id: Some(CommentId(999)),
        });
        assert!(matches!(missing, Err(StoreError::InvalidParent(CommentId(999)))));

        let cross_post = db.insert_comment(&NewComment {
            post_slug: slug("post"),
            author_id: viewer("user_2"),
            username: "Bob".to_string(),
            content: "reply".to_string(),
            parent_id: Some(other.id),
        });
        assert!(matches!(cross_post, Err(StoreError::InvalidParent(id)) if id == other.id));
    }

    #[test]
    fn test_comments_for_post_in_creation_order() {
        let db = Database::open_in_memory().unwrap();
        let first = post_comment(&db, "post", "user_1", None);
        let reply = post_comment(&db, "post", "user_2", Some(first.id));
        post_comment(&db, "unrelated", "user_3", None);
        let second = post_comment(&db, "post", "user_3", None);

        let records = db.comments_for_post(&slug("post"), None).unwrap();
        let ids: Vec<CommentId> = records.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec![first.id, reply.id, second.id]);
        assert_eq!(records[1].parent_id(), Some(first.id));
        assert_eq!(db.comment_count(&slug("post")).unwrap(), 3);
    }

    #[test]
    fn test_like_aggregates_per_viewer() {
        let db = Database::open_in_memory().unwrap();
        let a = post_comment(&db, "post", "user_1", None);
        let b = post_comment(&db, "post", "user_2", None);

        assert!(db.toggle_like(a.id, &viewer("alice")).unwrap());
        assert!(db.toggle_like(a.id, &viewer("bob")).unwrap());
        assert!(db.toggle_like(b.id, &viewer("bob")).unwrap());

        let as_alice = db.comments_for_post(&slug("post"), Some(&viewer("alice"))).unwrap();
        assert_eq!((as_alice[0].like_count, as_alice[0].viewer_has_liked), (2, true));
        assert_eq!((as_alice[1].like_count, as_alice[1].viewer_has_liked), (1, false));

        let as_carol = db.comments_for_post(&slug("post"), Some(&viewer("carol"))).unwrap();
        assert!(as_carol.iter().all(|r| !r.viewer_has_liked));

        let anonymous = db.comments_for_post(&slug("post"), None).unwrap();
        assert_eq!(anonymous[0].like_count, 2);
        assert!(anonymous.iter().all(|r| !r.viewer_has_liked));
    }

    #[test]
    fn test_unliked_comment_reports_zero() {
        let db = Database::open_in_memory().unwrap();
        post_comment(&db, "post", "user_1", None);

        let records = db.comments_for_post(&slug("post"), Some(&viewer("alice"))).unwrap();
        assert_eq!(records[0].like_count, 0);
        assert!(!records[0].viewer_has_liked);
    }
}
