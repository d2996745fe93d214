use std::ops::{Index, Range};

use crate::ast::{Operator, TokenType};

/// Handle of a node inside a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Rule-specific data carried by a node.
///
/// Which fields are set depends on the kind: a variable has a `name`, a
/// link has a `value` (the passage), an operator token has an `operator`,
/// a heading has a `depth`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields {
    pub name: Option<String>,
    pub value: Option<String>,
    pub operator: Option<Operator>,
    pub depth: Option<usize>,
}

impl Fields {
    pub fn named(name: impl Into<String>) -> Self {
        Fields {
            name: Some(name.into()),
            ..Fields::default()
        }
    }

    pub fn operator(operator: Operator) -> Self {
        Fields {
            operator: Some(operator),
            ..Fields::default()
        }
    }

    /// Fill every field this one lacks from `other`.
    pub(crate) fn inherit(&mut self, other: Fields) {
        if self.name.is_none() {
            self.name = other.name;
        }
        if self.value.is_none() {
            self.value = other.value;
        }
        if self.operator.is_none() {
            self.operator = other.operator;
        }
        if self.depth.is_none() {
            self.depth = other.depth;
        }
    }
}

/// A typed span of the token tree.
///
/// `start` and `end` are byte offsets into the tree's source, and `text` is
/// exactly `source[start..end]`. Children are contiguous and in order; the
/// bytes of a node not covered by any child are its own delimiters.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: TokenType,
    pub start: usize,
    pub end: usize,
    pub text: String,
    /// Byte range of the content between a node's delimiters, if it has any
    pub inner: Option<Range<usize>>,
    pub children: Vec<NodeId>,
    /// Tentative opener waiting for a matching closer
    pub is_front: bool,
    /// Front kinds this node closes, with the kind each fold produces
    pub matches: &'static [(TokenType, TokenType)],
    /// Open front kinds this node may not close across
    pub cannot_cross: &'static [TokenType],
    pub fields: Fields,
}

impl Node {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, pos: usize) -> bool {
        self.start <= pos && pos < self.end
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// The composite kind this node produces when it closes `front`.
    pub fn folds(&self, front: TokenType) -> Option<TokenType> {
        self.matches
            .iter()
            .find(|(opener, _)| *opener == front)
            .map(|(_, folded)| *folded)
    }

    pub fn name(&self) -> Option<&str> {
        self.fields.name.as_deref()
    }

    pub fn value(&self) -> Option<&str> {
        self.fields.value.as_deref()
    }

    pub fn operator(&self) -> Option<Operator> {
        self.fields.operator
    }

    /// The text between the node's delimiters.
    pub fn inner_text(&self) -> Option<&str> {
        let inner = self.inner.as_ref()?;
        self.text
            .get(inner.start - self.start..inner.end - self.start)
    }
}

/// An immutable, arena-backed token tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    source: String,
    nodes: Vec<Node>,
    root: NodeId,
}

impl Tree {
    pub(crate) fn from_parts(source: String, nodes: Vec<Node>, root: NodeId) -> Self {
        Tree {
            source,
            nodes,
            root,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Every node below `id` (inclusive) in document order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            order.push(next);
            pending.extend(self.children(next).iter().rev().copied());
        }
        order
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }
}

impl Index<NodeId> for Tree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        self.get(id)
    }
}
