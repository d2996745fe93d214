//! Position queries over a token tree.
//!
//! Editors and other tooling ask "what is under the cursor?"; these answer
//! it against an immutable [`Tree`] without any cached state.

use std::ops::Range;

use crate::ast::{NodeId, Tree};

impl Tree {
    /// The deepest node whose span contains `pos`.
    pub fn node_at_offset(&self, pos: usize) -> Option<NodeId> {
        self.path_at_offset(pos).first().copied()
    }

    /// Every node containing `pos`, deepest first, ending with the root.
    pub fn path_at_offset(&self, pos: usize) -> Vec<NodeId> {
        let mut path = Vec::new();
        if !self.get(self.root()).contains(pos) {
            return path;
        }

        let mut current = self.root();
        path.push(current);
        loop {
            let children = self.children(current);
            // children are sorted and disjoint
            let idx = children.partition_point(|c| self.get(*c).end <= pos);
            match children.get(idx) {
                Some(&child) if self.get(child).contains(pos) => {
                    path.push(child);
                    current = child;
                }
                _ => break,
            }
        }

        path.reverse();
        path
    }

    /// The byte ranges owned directly by each node, in document order.
    ///
    /// A leaf owns its whole span; a composite owns the parts of its span
    /// its children do not cover (its delimiters). Concatenating the ranges
    /// reproduces the source exactly.
    pub fn fragments(&self) -> Vec<(NodeId, Range<usize>)> {
        let mut out = Vec::new();
        self.collect_fragments(self.root(), &mut out);
        out
    }

    fn collect_fragments(&self, id: NodeId, out: &mut Vec<(NodeId, Range<usize>)>) {
        let node = self.get(id);
        let mut cursor = node.start;
        for &child in &node.children {
            let child_node = self.get(child);
            if child_node.start > cursor {
                out.push((id, cursor..child_node.start));
            }
            self.collect_fragments(child, out);
            cursor = child_node.end;
        }
        if cursor < node.end {
            out.push((id, cursor..node.end));
        }
    }

    /// Reassemble the source from [`Tree::fragments`].
    pub fn reassemble(&self) -> String {
        self.fragments()
            .into_iter()
            .map(|(_, range)| &self.source()[range])
            .collect()
    }
}
