//! Assembly of flat comment rows into nested reply trees.

use std::collections::HashMap;
use std::sync::Arc;

use crate::comment::{CommentNode, CommentRecord, Forest};
use crate::types::CommentId;

/// Nest a post's comments under their parents.
///
/// `records` must already be in ascending creation order; that order is kept
/// for the roots and for every `replies` list. A reply whose parent is not in
/// `records` is dropped together with its own replies rather than promoted to
/// the top level. Runs in O(n) and never recurses, so reply chains of any
/// depth are safe.
pub fn assemble(records: Vec<CommentRecord>) -> Forest {
    let total = records.len();
    let index: HashMap<CommentId, usize> = records
        .iter()
        .enumerate()
        .map(|(i, record)| (record.id(), i))
        .collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); total];
    let mut roots = Vec::new();
    for (i, record) in records.iter().enumerate() {
        match record.parent_id() {
            None => roots.push(i),
            Some(parent) => {
                if let Some(&p) = index.get(&parent) {
                    children[p].push(i);
                }
            }
        }
    }

    // Children are frozen into their parent's Arc before the parent itself,
    // so nodes are built in post-order with an explicit stack.
    let mut pending: Vec<Option<CommentRecord>> = records.into_iter().map(Some).collect();
    let mut built: Vec<Option<Arc<CommentNode>>> = vec![None; total];
    let mut attached = 0usize;
    let mut forest = Vec::with_capacity(roots.len());

    for root in roots {
        let mut stack = vec![(root, false)];
        while let Some((i, expanded)) = stack.pop() {
            if !expanded {
                stack.push((i, true));
                stack.extend(children[i].iter().rev().map(|&c| (c, false)));
                continue;
            }
            let Some(record) = pending[i].take() else {
                continue;
            };
            let replies = children[i]
                .iter()
                .filter_map(|&c| built[c].take())
                .collect();
            built[i] = Some(Arc::new(CommentNode { record, replies }));
            attached += 1;
        }
        if let Some(node) = built[root].take() {
            forest.push(node);
        }
    }

    if attached < total {
        tracing::debug!(
            total,
            dropped = total - attached,
            "dropped comments whose parent chain does not reach a top-level comment"
        );
    }

    forest
}

/// Ids of every node, visiting a node before its replies, in order.
pub fn preorder_ids(forest: &[Arc<CommentNode>]) -> Vec<CommentId> {
    let mut ids = Vec::new();
    let mut stack: Vec<&Arc<CommentNode>> = forest.iter().rev().collect();
    while let Some(node) = stack.pop() {
        ids.push(node.id());
        stack.extend(node.replies.iter().rev());
    }
    ids
}

/// Number of comments across all depths.
pub fn count(forest: &[Arc<CommentNode>]) -> usize {
    let mut total = 0;
    let mut stack: Vec<&Arc<CommentNode>> = forest.iter().collect();
    while let Some(node) = stack.pop() {
        total += 1;
        stack.extend(node.replies.iter());
    }
    total
}

/// Locate a node anywhere in the forest.
pub fn find(forest: &[Arc<CommentNode>], id: CommentId) -> Option<&Arc<CommentNode>> {
    let mut stack: Vec<&Arc<CommentNode>> = forest.iter().collect();
    while let Some(node) = stack.pop() {
        if node.id() == id {
            return Some(node);
        }
        stack.extend(node.replies.iter());
    }
    None
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use super::*;
    use crate::comment::Comment;
    use crate::types::{PostSlug, ViewerId};

    fn at(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    fn record(id: i64, parent: Option<i64>, minutes: i64) -> CommentRecord {
        CommentRecord::unliked(Comment {
            id: CommentId(id),
            post_slug: PostSlug::parse("homelab-tour").unwrap(),
            author_id: ViewerId::new(format!("user_{id}")).unwrap(),
            username: format!("user {id}"),
            content: format!("comment {id}"),
            parent_id: parent.map(CommentId),
            created_at: at(minutes),
            updated_at: at(minutes),
        })
    }

    fn ids(nodes: &[Arc<CommentNode>]) -> Vec<i64> {
        nodes.iter().map(|n| n.id().0).collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(assemble(Vec::new()).is_empty());
    }

    #[test]
    fn test_nested_scenario() {
        let forest = assemble(vec![
            record(1, None, 1),
            record(2, Some(1), 2),
            record(3, None, 3),
            record(4, Some(2), 4),
        ]);

        assert_eq!(ids(&forest), vec![1, 3]);
        assert_eq!(ids(&forest[0].replies), vec![2]);
        assert_eq!(ids(&forest[0].replies[0].replies), vec![4]);
        assert!(forest[0].replies[0].replies[0].replies.is_empty());
        assert!(forest[1].replies.is_empty());
    }

    #[test]
    fn test_order_preserved_at_every_level() {
        let forest = assemble(vec![
            record(10, None, 1),
            record(11, Some(10), 2),
            record(12, None, 3),
            record(13, Some(10), 4),
            record(14, Some(11), 5),
            record(15, Some(11), 6),
        ]);

        assert_eq!(ids(&forest), vec![10, 12]);
        assert_eq!(ids(&forest[0].replies), vec![11, 13]);
        assert_eq!(ids(&forest[0].replies[0].replies), vec![14, 15]);
    }

    #[test]
    fn test_preorder_covers_every_input_exactly_once() {
        let input = vec![
            record(1, None, 1),
            record(2, Some(1), 2),
            record(3, Some(1), 3),
            record(4, None, 4),
            record(5, Some(3), 5),
            record(6, Some(4), 6),
            record(7, Some(5), 7),
        ];
        let mut expected: Vec<CommentId> = input.iter().map(|r| r.id()).collect();

        let forest = assemble(input);
        let mut seen = preorder_ids(&forest);
        assert_eq!(seen.len(), expected.len());

        seen.sort();
        expected.sort();
        assert_eq!(seen, expected);
        assert_eq!(count(&forest), 7);
    }

    #[test]
    fn test_preorder_visits_parent_before_replies() {
        let forest = assemble(vec![
            record(1, None, 1),
            record(2, Some(1), 2),
            record(3, None, 3),
            record(4, Some(2), 4),
        ]);
        let order: Vec<i64> = preorder_ids(&forest).into_iter().map(|id| id.0).collect();
        assert_eq!(order, vec![1, 2, 4, 3]);
    }

    #[test]
    fn test_dangling_parent_is_dropped() {
        let forest = assemble(vec![
            record(1, None, 1),
            record(2, Some(99), 2),
            record(3, Some(1), 3),
        ]);

        assert_eq!(ids(&forest), vec![1]);
        assert_eq!(ids(&forest[0].replies), vec![3]);
        assert_eq!(count(&forest), 2);
        assert!(find(&forest, CommentId(2)).is_none());
    }

    #[test]
    fn test_replies_under_a_dropped_comment_are_dropped_too() {
        let forest = assemble(vec![
            record(1, Some(99), 1),
            record(2, Some(1), 2),
            record(3, None, 3),
        ]);
        assert_eq!(preorder_ids(&forest), vec![CommentId(3)]);
    }

    #[test]
    fn test_parent_cycle_does_not_hang() {
        let forest = assemble(vec![
            record(1, Some(2), 1),
            record(2, Some(1), 2),
            record(3, Some(3), 3),
            record(4, None, 4),
        ]);
        assert_eq!(preorder_ids(&forest), vec![CommentId(4)]);
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let depth = 100_000;
        let mut input = vec![record(0, None, 0)];
        input.extend((1..depth).map(|i| record(i, Some(i - 1), i)));

        let forest = assemble(input);
        assert_eq!(forest.len(), 1);
        assert_eq!(count(&forest), depth as usize);
        assert!(find(&forest, CommentId(depth - 1)).is_some());
        drop(forest);
    }

    #[test]
    fn test_like_aggregates_survive_assembly() {
        let mut liked = record(2, Some(1), 2);
        liked.like_count = 3;
        liked.viewer_has_liked = true;

        let forest = assemble(vec![record(1, None, 1), liked]);
        let reply = &forest[0].replies[0].record;
        assert_eq!(reply.like_count, 3);
        assert!(reply.viewer_has_liked);
    }
}
