//! Tree flattening
//!
//! Walks a parse tree depth first and yields every node that can carry a
//! symbol, in source order. Wrapper nodes (`group`, `root`, `block`) are
//! replaced by their contents unless they are empty, and `keyframes` bodies
//! are never entered.
//!
//! A rule body is reachable both from its `group` and from each selector of
//! the group. Bodies already walked are tracked by pointer so each one is
//! flattened once; the tree itself is never modified.

use crate::ast::Node;
use crate::classify::AT_RULE_TAGS;
use std::collections::HashSet;
use std::rc::Rc;

#[derive(Default)]
struct Flattener<'a> {
    visited: HashSet<*const Node>,
    out: Vec<&'a Node>,
}

impl<'a> Flattener<'a> {
    fn walk(&mut self, node: &'a Node) {
        if let Node::Keyframes(_) = node {
            self.out.push(node);
            return;
        }

        let mark = self.out.len();
        if !node.is_wrapper() {
            self.out.push(node);
        }

        for child in node.children() {
            self.walk(child);
        }
        if let Some(block) = node.block() {
            if self.visited.insert(Rc::as_ptr(block)) {
                self.walk(block);
            }
        }

        // Wrapper without semantic content stands for itself
        if node.is_wrapper() && self.out.len() == mark {
            self.out.push(node);
        }
    }
}

/// Flatten a tree into its candidate symbol nodes.
pub fn flatten(root: &Node) -> Vec<&Node> {
    let mut flattener = Flattener::default();
    flattener.walk(root);
    flattener.out
}

/// Flatten a list of top-level nodes, preserving order.
pub fn flatten_all(nodes: &[Node]) -> Vec<&Node> {
    let mut flattener = Flattener::default();
    for node in nodes {
        flattener.walk(node);
    }
    flattener.out
}

/// Flattened nodes offered as completion symbols: property and at-rule
/// nodes are left out.
pub fn completion_candidates(root: &Node) -> Vec<&Node> {
    flatten(root)
        .into_iter()
        .filter(|node| {
            let name = node.node_name();
            name != "property" && !AT_RULE_TAGS.contains(&name)
        })
        .collect()
}
