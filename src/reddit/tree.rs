use std::collections::{HashSet, VecDeque};

use crate::models::Comment;

use super::types::{RawMore, Thing};

/// Accumulates a comment tree into a flat list while queueing the
/// placeholders that still need to be expanded.
#[derive(Debug, Default)]
pub struct CommentTree {
    comments: Vec<Comment>,
    pending: VecDeque<RawMore>,
    seen_comments: HashSet<String>,
    seen_more: HashSet<String>,
}

impl CommentTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walks `things` depth-first, keeping every comment not already collected.
    pub fn absorb(&mut self, things: Vec<Thing>) {
        let mut stack: Vec<Thing> = things.into_iter().rev().collect();

        while let Some(thing) = stack.pop() {
            match thing {
                Thing::Comment(raw) => {
                    let (comment, replies) = raw.split();
                    if let Some(listing) = replies {
                        stack.extend(listing.data.children.into_iter().rev());
                    }
                    if self.seen_comments.insert(comment.fullname.clone()) {
                        self.comments.push(comment);
                    }
                }
                Thing::More(more) => {
                    if self.seen_more.insert(more_key(&more)) {
                        self.pending.push_back(more);
                    }
                }
                Thing::Link(_) => {}
            }
        }
    }

    pub fn next_pending(&mut self) -> Option<RawMore> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn into_comments(self) -> Vec<Comment> {
        self.comments
    }
}

fn more_key(more: &RawMore) -> String {
    format!("{}:{}", more.parent_id, more.children.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reddit::types::Listing;

    fn listing(json: &str) -> Vec<Thing> {
        serde_json::from_str::<Listing>(json).unwrap().data.children
    }

    fn leaf(id: &str, parent: &str) -> String {
        format!(
            r#"{{"kind": "t1", "data": {{"name": "t1_{id}", "id": "{id}", "link_id": "t3_p",
                "parent_id": "{parent}", "author": "u_{id}", "score": 1,
                "created_utc": 1700000000.0, "edited": false,
                "permalink": "/r/x/comments/p/_/{id}/", "body": "text {id}", "replies": ""}}}}"#
        )
    }

    #[test]
    fn flattens_nested_replies_and_queues_placeholders() {
        let json = format!(
            r#"{{"kind": "Listing", "data": {{"after": null, "children": [
                {{"kind": "t1", "data": {{"name": "t1_a", "id": "a", "link_id": "t3_p",
                    "parent_id": "t3_p", "author": "alice", "score": 5,
                    "created_utc": 1700000000.0, "edited": false,
                    "permalink": "/r/x/comments/p/_/a/", "body": "root",
                    "replies": {{"kind": "Listing", "data": {{"after": null, "children": [
                        {},
                        {{"kind": "more", "data": {{"count": 2, "name": "t1_m1", "id": "m1",
                            "parent_id": "t1_a", "depth": 1, "children": ["c", "d"]}}}}
                    ]}}}}
                }}}},
                {}
            ]}}}}"#,
            leaf("b", "t1_a"),
            leaf("e", "t3_p"),
        );

        let mut tree = CommentTree::new();
        tree.absorb(listing(&json));

        let names: Vec<_> = tree.comments.iter().map(|c| c.fullname.as_str()).collect();
        assert_eq!(names, ["t1_a", "t1_b", "t1_e"]);

        let more = tree.next_pending().unwrap();
        assert_eq!(more.parent_id, "t1_a");
        assert_eq!(more.children, ["c", "d"]);
        assert!(tree.next_pending().is_none());
    }

    #[test]
    fn duplicates_are_dropped() {
        let json = format!(
            r#"{{"kind": "Listing", "data": {{"after": null, "children": [{}, {}]}}}}"#,
            leaf("a", "t3_p"),
            leaf("a", "t3_p"),
        );
        let mut tree = CommentTree::new();
        tree.absorb(listing(&json));
        tree.absorb(listing(&json));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn identical_placeholders_are_queued_once() {
        let json = r#"{"kind": "Listing", "data": {"after": null, "children": [
            {"kind": "more", "data": {"count": 0, "name": "t1__", "id": "_",
                "parent_id": "t1_deep", "depth": 10, "children": []}}
        ]}}"#;
        let mut tree = CommentTree::new();
        tree.absorb(listing(json));
        tree.absorb(listing(json));
        assert!(tree.next_pending().is_some());
        assert!(tree.next_pending().is_none());
    }

    #[test]
    fn empty_listing_yields_no_comments() {
        let mut tree = CommentTree::new();
        tree.absorb(listing(r#"{"kind": "Listing", "data": {"after": null, "children": []}}"#));
        assert!(tree.into_comments().is_empty());
    }
}
