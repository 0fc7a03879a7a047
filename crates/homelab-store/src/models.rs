//! Domain model structs persisted in the SQLite database.
//!
//! Comment shapes live in `homelab-shared` because the client assembles and
//! patches them too; they are re-exported here for convenience.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use homelab_shared::{CommentId, PostSlug, ViewerId};

pub use homelab_shared::{Comment, CommentRecord};

// ---------------------------------------------------------------------------
// Comment
// ---------------------------------------------------------------------------

/// A comment about to be inserted. Content is validated on insert.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_slug: PostSlug,
    pub author_id: ViewerId,
    /// Display name, already resolved from the identity provider.
    pub username: String,
    pub content: String,
    pub parent_id: Option<CommentId>,
}

// ---------------------------------------------------------------------------
// Post
// ---------------------------------------------------------------------------

/// Which of the two sites a post belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    /// Blog article.
    Article,
    /// Portfolio project.
    Project,
}

impl PostKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PostKind::Article => "article",
            PostKind::Project => "project",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "article" => Some(PostKind::Article),
            "project" => Some(PostKind::Project),
            _ => None,
        }
    }
}

/// An article or project that comments can attach to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    pub slug: PostSlug,
    pub kind: PostKind,
    pub title: String,
    /// Unpublished posts are only visible through the admin API.
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Admin-supplied fields for creating or updating a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDraft {
    pub slug: PostSlug,
    pub kind: PostKind,
    pub title: String,
    #[serde(default)]
    pub published: bool,
}
