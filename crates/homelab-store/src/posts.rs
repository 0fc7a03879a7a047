//! CRUD operations for [`Post`] records.

use chrono::{SubsecRound, Utc};
use rusqlite::params;

use homelab_shared::PostSlug;

use crate::database::Database;
use crate::error::{not_found, Result};
use crate::models::{Post, PostDraft, PostKind};
use crate::timestamp;

impl Database {
    // ------------------------------------------------------------------
    // Create / update
    // ------------------------------------------------------------------

    /// Insert a post, or update kind, title and visibility of an existing one.
    /// `created_at` is kept on update.
    pub fn upsert_post(&self, draft: &PostDraft) -> Result<Post> {
        let now = timestamp::to_sql(&Utc::now().trunc_subsecs(6));

        self.conn().execute(
            "INSERT INTO posts (slug, kind, title, published, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)
             ON CONFLICT(slug) DO UPDATE SET
                 kind = excluded.kind,
                 title = excluded.title,
                 published = excluded.published,
                 updated_at = excluded.updated_at",
            params![
                draft.slug.as_str(),
                draft.kind.as_str(),
                draft.title.trim(),
                draft.published,
                now,
            ],
        )?;

        self.get_post(&draft.slug)
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Fetch a single post by slug.
    pub fn get_post(&self, slug: &PostSlug) -> Result<Post> {
        self.conn()
            .query_row(
                "SELECT slug, kind, title, published, created_at, updated_at
                 FROM posts
                 WHERE slug = ?1",
                params![slug.as_str()],
                row_to_post,
            )
            .map_err(not_found)
    }

    /// List posts, newest first, optionally restricted to one kind.
    pub fn list_posts(&self, kind: Option<PostKind>, include_unpublished: bool) -> Result<Vec<Post>> {
        let mut stmt = self.conn().prepare(
            "SELECT slug, kind, title, published, created_at, updated_at
             FROM posts
             WHERE (?1 IS NULL OR kind = ?1)
               AND (?2 OR published = 1)
             ORDER BY created_at DESC",
        )?;

        let rows = stmt.query_map(
            params![kind.map(PostKind::as_str), include_unpublished],
            row_to_post,
        )?;

        let mut posts = Vec::new();
        for row in rows {
            posts.push(row?);
        }
        Ok(posts)
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Delete a post and every comment on it.  Returns `true` if the post
    /// existed; an unregistered slug is left untouched, comments included.
    ///
    /// This is the only path that removes comments; likes go with them via
    /// ON DELETE CASCADE.
    pub fn delete_post(&self, slug: &PostSlug) -> Result<bool> {
        let tx = self.conn().unchecked_transaction()?;

        let affected = tx.execute("DELETE FROM posts WHERE slug = ?1", params![slug.as_str()])?;
        if affected == 0 {
            return Ok(false);
        }

        let comments = tx.execute(
            "DELETE FROM comments WHERE post_slug = ?1",
            params![slug.as_str()],
        )?;
        tx.commit()?;

        tracing::info!(post_slug = %slug, comments, "post deleted");
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Map a `rusqlite::Row` to a [`Post`].
fn row_to_post(row: &rusqlite::Row<'_>) -> rusqlite::Result<Post> {
    let slug_str: String = row.get(0)?;
    let kind_str: String = row.get(1)?;
    let title: String = row.get(2)?;
    let published: bool = row.get(3)?;

    let slug = PostSlug::parse(&slug_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let kind = PostKind::parse(&kind_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            rusqlite::types::Type::Text,
            format!("unknown post kind: {kind_str}").into(),
        )
    })?;

    Ok(Post {
        slug,
        kind,
        title,
        published,
        created_at: timestamp::column(row, 4)?,
        updated_at: timestamp::column(row, 5)?,
    })
}
