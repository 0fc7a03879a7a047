//! Comment records as they move between storage, the HTTP API and the UI.
//!
//! Three shapes exist, each a strict superset of the previous one:
//!
//! - [`Comment`]: the persisted row, exactly what the create endpoint returns.
//! - [`CommentRecord`]: a row plus its like aggregate for one viewer, what the
//!   read query yields.
//! - [`CommentNode`]: a record plus its nested replies, what the tree
//!   assembler produces and the client patches.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{ANONYMOUS_USERNAME, MAX_COMMENT_LEN, MAX_USERNAME_LEN};
use crate::error::ValidationError;
use crate::types::{CommentId, PostSlug, ViewerId};

/// A persisted comment row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    pub post_slug: PostSlug,
    /// Identity of the author as issued by the authentication provider.
    pub author_id: ViewerId,
    /// Display name resolved once at creation time.
    pub username: String,
    pub content: String,
    /// `None` for top-level comments.
    pub parent_id: Option<CommentId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A comment together with its like aggregate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommentRecord {
    #[serde(flatten)]
    pub comment: Comment,
    pub like_count: u64,
    /// Always `false` when the read was made without a viewer.
    pub viewer_has_liked: bool,
}

impl CommentRecord {
    /// A record for a comment nobody has liked yet.
    pub fn unliked(comment: Comment) -> Self {
        Self {
            comment,
            like_count: 0,
            viewer_has_liked: false,
        }
    }

    pub fn id(&self) -> CommentId {
        self.comment.id
    }

    pub fn parent_id(&self) -> Option<CommentId> {
        self.comment.parent_id
    }
}

/// One node of an assembled comment tree.
///
/// Replies are held behind [`Arc`] so that a patched tree can share every
/// untouched subtree with the tree it was derived from.
///
/// Nodes are not `Serialize`: a derived impl recurses once per level. Use
/// [`crate::wire::forest_to_json`] to write a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentNode {
    pub record: CommentRecord,
    pub replies: Vec<Arc<CommentNode>>,
}

impl CommentNode {
    pub fn leaf(record: CommentRecord) -> Self {
        Self {
            record,
            replies: Vec::new(),
        }
    }

    pub fn id(&self) -> CommentId {
        self.record.id()
    }
}

// Reply chains have no depth limit, so releasing one must not recurse.
impl Drop for CommentNode {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.replies);
        while let Some(child) = stack.pop() {
            if let Ok(mut node) = Arc::try_unwrap(child) {
                stack.append(&mut node.replies);
            }
        }
    }
}

/// Ordered top-level comments of one post.
pub type Forest = Vec<Arc<CommentNode>>;

/// Trim and bound a submitted comment body.
pub fn validate_body(raw: &str) -> Result<String, ValidationError> {
    let body = raw.trim();
    if body.is_empty() {
        return Err(ValidationError::EmptyBody);
    }
    let len = body.chars().count();
    if len > MAX_COMMENT_LEN {
        return Err(ValidationError::BodyTooLong {
            len,
            max: MAX_COMMENT_LEN,
        });
    }
    Ok(body.to_string())
}

/// Resolve the display name frozen into a new comment.
pub fn resolve_username(name: Option<&str>) -> String {
    match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => name.chars().take(MAX_USERNAME_LEN).collect(),
        None => ANONYMOUS_USERNAME.to_string(),
    }
}
