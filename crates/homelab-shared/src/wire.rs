//! JSON encoding of assembled comment trees.
//!
//! Each node is written as its flat record with a `replies` array appended,
//! the same shape a derived impl would give, but the walk uses an explicit
//! stack so a reply chain of any depth is written in constant stack space.

use std::slice::Iter;
use std::sync::Arc;

use crate::comment::{CommentNode, CommentRecord};

/// Encode a forest as a JSON array of nested nodes.
pub fn forest_to_json(forest: &[Arc<CommentNode>]) -> serde_json::Result<Vec<u8>> {
    let mut out = Vec::with_capacity(256 * forest.len().max(1));
    out.push(b'[');

    let mut stack: Vec<Iter<'_, Arc<CommentNode>>> = vec![forest.iter()];
    let mut first = true;
    while let Some(level) = stack.last_mut() {
        match level.next() {
            Some(node) => {
                if !first {
                    out.push(b',');
                }
                open_node(&mut out, &node.record)?;
                stack.push(node.replies.iter());
                first = true;
            }
            None => {
                stack.pop();
                // Closes a `replies` array, plus its node unless this was the forest.
                out.extend_from_slice(if stack.is_empty() { b"]" } else { b"]}" });
                first = false;
            }
        }
    }

    Ok(out)
}

/// Write `record` as an object left open at `"replies":[`.
fn open_node(out: &mut Vec<u8>, record: &CommentRecord) -> serde_json::Result<()> {
    serde_json::to_writer(&mut *out, record)?;
    // A record always serializes to a non-empty object.
    if out.last() == Some(&b'}') {
        out.pop();
    }
    out.extend_from_slice(b",\"replies\":[");
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};

    use super::*;
    use crate::comment::Comment;
    use crate::tree;
    use crate::types::{CommentId, PostSlug, ViewerId};

    fn record(id: i64, parent: Option<i64>) -> CommentRecord {
        let ts = Utc.with_ymd_and_hms(2025, 5, 10, 9, 0, 0).unwrap();
        CommentRecord::unliked(Comment {
            id: CommentId(id),
            post_slug: PostSlug::parse("rack-build").unwrap(),
            author_id: ViewerId::new("user_9").unwrap(),
            username: "Kim".to_string(),
            content: format!("comment {id}"),
            parent_id: parent.map(CommentId),
            created_at: ts,
            updated_at: ts,
        })
    }

    #[test]
    fn test_empty_forest() {
        assert_eq!(forest_to_json(&[]).unwrap(), b"[]");
    }

    #[test]
    fn test_nested_shape() {
        let forest = tree::assemble(vec![
            record(1, None),
            record(2, Some(1)),
            record(3, None),
            record(4, Some(2)),
        ]);
        let value: Value = serde_json::from_slice(&forest_to_json(&forest).unwrap()).unwrap();

        assert_eq!(value.as_array().unwrap().len(), 2);
        assert_eq!(value[0]["id"], 1);
        assert_eq!(value[0]["username"], "Kim");
        assert_eq!(value[0]["like_count"], 0);
        assert_eq!(value[0]["replies"][0]["id"], 2);
        assert_eq!(value[0]["replies"][0]["replies"][0]["id"], 4);
        assert_eq!(value[0]["replies"][0]["replies"][0]["replies"], json!([]));
        assert_eq!(value[1]["id"], 3);
        assert_eq!(value[1]["replies"], json!([]));
    }

    #[test]
    fn test_deep_chain_is_written() {
        let depth = 50_000;
        let mut input = vec![record(0, None)];
        input.extend((1..depth).map(|i| record(i, Some(i - 1))));
        let forest = tree::assemble(input);

        let bytes = forest_to_json(&forest).unwrap();
        let text = std::str::from_utf8(&bytes).unwrap();
        assert_eq!(text.matches("\"replies\":[").count(), depth as usize);
        assert!(text.starts_with("[{\"id\":0,"));
        assert!(text.ends_with(&format!("[{}]", "]}".repeat(depth as usize))));
    }
}
