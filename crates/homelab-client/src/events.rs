use serde::{Deserialize, Serialize};

use homelab_shared::{Comment, CommentId};

pub const EVENT_COMMENT_ADDED: &str = "comment-added";
pub const EVENT_LIKE_TOGGLED: &str = "like-toggled";

/// A server-confirmed change to apply to a local comment tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum CommentEvent {
    /// The create endpoint returned a new comment.
    #[serde(rename = "comment-added")]
    Added { comment: Comment },

    /// The like endpoint returned the resulting state for the viewer.
    LikeToggled { comment_id: CommentId, liked: bool },
}

impl CommentEvent {
    pub fn name(&self) -> &'static str {
        match self {
            CommentEvent::Added { .. } => EVENT_COMMENT_ADDED,
            CommentEvent::LikeToggled { .. } => EVENT_LIKE_TOGGLED,
        }
    }

    /// The comment the event is about.
    pub fn comment_id(&self) -> CommentId {
        match self {
            CommentEvent::Added { comment } => comment.id,
            CommentEvent::LikeToggled { comment_id, .. } => *comment_id,
        }
    }
}
