//! Comment section state for one post.
//!
//! [`CommentSection`] owns the current tree and swaps it for the value
//! returned by the pure functions in [`crate::patch`]; the rendering layer
//! reads [`CommentSection::forest`] whenever it redraws.

use homelab_shared::tree;
use homelab_shared::{CommentId, CommentNode, Forest, PostSlug};
use std::sync::Arc;

use crate::api::CommentsApi;
use crate::error::ClientError;
use crate::events::CommentEvent;
use crate::patch;

pub struct CommentSection {
    /// The post whose comments this section shows.
    post_slug: PostSlug,

    /// Top-level comments with nested replies, oldest first.
    forest: Forest,
}

impl CommentSection {
    /// Create an empty section; call [`CommentSection::refresh`] or
    /// [`CommentSection::replace`] to populate it.
    pub fn new(post_slug: PostSlug) -> Self {
        Self {
            post_slug,
            forest: Vec::new(),
        }
    }

    pub fn post_slug(&self) -> &PostSlug {
        &self.post_slug
    }

    pub fn forest(&self) -> &[Arc<CommentNode>] {
        &self.forest
    }

    /// Install a fully fetched tree.
    pub fn replace(&mut self, forest: Forest) {
        self.forest = forest;
    }

    /// Apply one event. Comments for another post are ignored.
    pub fn apply(&mut self, event: &CommentEvent) {
        if let CommentEvent::Added { comment } = event {
            if comment.post_slug != self.post_slug {
                tracing::debug!(
                    section = %self.post_slug,
                    post_slug = %comment.post_slug,
                    "ignoring comment for another post"
                );
                return;
            }
        }
        self.forest = patch::apply(&self.forest, event);
    }

    /// Number of comments across all depths.
    pub fn total(&self) -> usize {
        tree::count(&self.forest)
    }

    // ------------------------------------------------------------------
    // Server round-trips
    // ------------------------------------------------------------------

    /// Refetch the whole tree.
    pub async fn refresh(&mut self, api: &CommentsApi) -> Result<(), ClientError> {
        let forest = api.fetch_tree(&self.post_slug).await?;
        self.replace(forest);
        Ok(())
    }

    /// Post a comment or reply and insert the server's copy.
    pub async fn submit(
        &mut self,
        api: &CommentsApi,
        content: &str,
        parent_id: Option<CommentId>,
    ) -> Result<CommentId, ClientError> {
        let comment = api.post_comment(&self.post_slug, content, parent_id).await?;
        let id = comment.id;
        self.apply(&CommentEvent::Added { comment });
        Ok(id)
    }

    /// Toggle the viewer's like and record the confirmed state.
    pub async fn toggle_like(
        &mut self,
        api: &CommentsApi,
        comment_id: CommentId,
    ) -> Result<bool, ClientError> {
        let liked = api.toggle_like(comment_id).await?;
        self.apply(&CommentEvent::LikeToggled { comment_id, liked });
        Ok(liked)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use homelab_shared::{Comment, ViewerId};

    use super::*;

    fn comment(post: &str, id: i64, parent: Option<i64>) -> Comment {
        let ts = Utc.with_ymd_and_hms(2025, 4, 2, 18, 30, 0).unwrap();
        Comment {
            id: CommentId(id),
            post_slug: PostSlug::parse(post).unwrap(),
            author_id: ViewerId::new("user_x").unwrap(),
            username: "X".to_string(),
            content: "text".to_string(),
            parent_id: parent.map(CommentId),
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn test_events_build_up_the_section() {
        let mut section = CommentSection::new(PostSlug::parse("media-server").unwrap());
        section.apply(&CommentEvent::Added { comment: comment("media-server", 1, None) });
        section.apply(&CommentEvent::Added { comment: comment("media-server", 2, Some(1)) });
        section.apply(&CommentEvent::LikeToggled {
            comment_id: CommentId(2),
            liked: true,
        });

        assert_eq!(section.total(), 2);
        assert_eq!(section.forest().len(), 1);
        assert_eq!(section.forest()[0].replies[0].record.like_count, 1);
    }

    #[test]
    fn test_comment_for_other_post_ignored() {
        let mut section = CommentSection::new(PostSlug::parse("media-server").unwrap());
        section.apply(&CommentEvent::Added { comment: comment("elsewhere", 1, None) });
        assert_eq!(section.total(), 0);
    }

    #[test]
    fn test_replace_swaps_tree() {
        let mut section = CommentSection::new(PostSlug::parse("media-server").unwrap());
        section.apply(&CommentEvent::Added { comment: comment("media-server", 1, None) });
        section.replace(Vec::new());
        assert_eq!(section.total(), 0);
    }
}
