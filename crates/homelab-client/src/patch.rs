//! Incremental updates to an assembled comment tree.
//!
//! Every function here is pure: it takes the current forest and returns the
//! next one. Only the nodes on the path from a root to the changed node are
//! rebuilt; every other subtree is the same `Arc` as in the input, so a UI
//! can skip re-rendering anything that is pointer-equal. An event naming a
//! comment that is not in the forest returns an unchanged copy.

use std::sync::Arc;

use homelab_shared::{Comment, CommentId, CommentNode, CommentRecord, Forest};

use crate::events::CommentEvent;

/// Apply one event to `forest`.
pub fn apply(forest: &[Arc<CommentNode>], event: &CommentEvent) -> Forest {
    match event {
        CommentEvent::Added { comment } => comment_added(forest, comment.clone()),
        CommentEvent::LikeToggled { comment_id, liked } => {
            like_toggled(forest, *comment_id, *liked)
        }
    }
}

/// Insert a freshly created comment.
///
/// Top-level comments go to the end of the forest; replies go to the end of
/// their parent's `replies`, at any depth. A reply to an unknown parent is
/// ignored.
pub fn comment_added(forest: &[Arc<CommentNode>], comment: Comment) -> Forest {
    let parent_id = comment.parent_id;
    let node = Arc::new(CommentNode::leaf(CommentRecord::unliked(comment)));

    match parent_id {
        None => {
            let mut next = forest.to_vec();
            next.push(node);
            next
        }
        Some(parent) => rebuild_path(forest, parent, |target| {
            let mut updated = target.clone();
            updated.replies.push(node);
            updated
        })
        .unwrap_or_else(|| {
            tracing::debug!(parent_id = %parent, "reply target not in tree, ignoring");
            forest.to_vec()
        }),
    }
}

/// Record the server-confirmed like state of one comment.
///
/// The count moves by one in the direction of `liked` and never drops below
/// zero.
pub fn like_toggled(forest: &[Arc<CommentNode>], comment_id: CommentId, liked: bool) -> Forest {
    rebuild_path(forest, comment_id, |target| {
        let mut updated = target.clone();
        updated.record.viewer_has_liked = liked;
        updated.record.like_count = if liked {
            updated.record.like_count.saturating_add(1)
        } else {
            updated.record.like_count.saturating_sub(1)
        };
        updated
    })
    .unwrap_or_else(|| {
        tracing::debug!(comment_id = %comment_id, "liked comment not in tree, ignoring");
        forest.to_vec()
    })
}

/// Replace the node `id` with `edit(node)` and re-create its ancestors.
///
/// Returns `None` when `id` is not in the forest.
fn rebuild_path(
    forest: &[Arc<CommentNode>],
    id: CommentId,
    edit: impl FnOnce(&CommentNode) -> CommentNode,
) -> Option<Forest> {
    let path = path_to(forest, id)?;

    // Walk down to collect the ancestors, then rebuild bottom-up.
    let mut chain: Vec<&Arc<CommentNode>> = Vec::with_capacity(path.len());
    let mut level = forest;
    for &i in &path {
        let node = level.get(i)?;
        chain.push(node);
        level = &node.replies;
    }

    let (target, ancestors) = chain.split_last()?;
    let mut replacement = Arc::new(edit(target));
    for (depth, ancestor) in ancestors.iter().enumerate().rev() {
        let mut copy = CommentNode::clone(ancestor);
        copy.replies[path[depth + 1]] = replacement;
        replacement = Arc::new(copy);
    }

    let mut next = forest.to_vec();
    next[path[0]] = replacement;
    Some(next)
}

/// Child indices leading from the forest to `id`, found depth-first.
fn path_to(forest: &[Arc<CommentNode>], id: CommentId) -> Option<Vec<usize>> {
    // (trail slot of the parent, index within the parent's list)
    let mut trail: Vec<(Option<usize>, usize)> = Vec::new();
    let mut stack: Vec<(Option<usize>, usize, &Arc<CommentNode>)> = forest
        .iter()
        .enumerate()
        .rev()
        .map(|(i, node)| (None, i, node))
        .collect();

    while let Some((parent, index, node)) = stack.pop() {
        let slot = trail.len();
        trail.push((parent, index));

        if node.id() == id {
            let mut path = Vec::new();
            let mut cursor = Some(slot);
            while let Some(s) = cursor {
                let (up, i) = trail[s];
                path.push(i);
                cursor = up;
            }
            path.reverse();
            return Some(path);
        }

        stack.extend(
            node.replies
                .iter()
                .enumerate()
                .rev()
                .map(|(i, child)| (Some(slot), i, child)),
        );
    }
    None
}
