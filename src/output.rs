//! Token tree serialization.
//!
//! # Features
//!
//! - **Compact JSON** via [`to_json()`]
//! - **Pretty JSON** via [`to_json_pretty()`] with 2-space indentation
//! - **Outline** via [`outline()`], an offset-free indented listing used to
//!   compare subtrees that came from different positions
//!
//! # Examples
//!
//! ```
//! use quill_lang::lexer::lex;
//! use quill_lang::output::outline;
//!
//! let tree = lex("a [b]").unwrap();
//! assert_eq!(
//!     outline(&tree, tree.root()),
//!     "root\n  text \"a \"\n  hook\n    text \"b\"\n"
//! );
//! ```

use serde::Serialize;

use crate::ast::{NodeId, Tree};

/// Serializable view of one node and its subtree.
#[derive(Debug, Serialize)]
struct NodeView<'t> {
    kind: &'static str,
    start: usize,
    end: usize,
    text: &'t str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'t str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<&'t str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    operator: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    depth: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<NodeView<'t>>,
}

impl<'t> NodeView<'t> {
    fn new(tree: &'t Tree, id: NodeId) -> Self {
        let node = &tree[id];
        NodeView {
            kind: node.kind.name(),
            start: node.start,
            end: node.end,
            text: &node.text,
            name: node.name(),
            value: node.value(),
            operator: node.operator().map(|op| op.tag()),
            depth: node.fields.depth,
            children: node
                .children
                .iter()
                .map(|&child| NodeView::new(tree, child))
                .collect(),
        }
    }
}

pub struct JsonPrinter {
    pretty: bool,
}

impl JsonPrinter {
    pub fn new(pretty: bool) -> Self {
        JsonPrinter { pretty }
    }

    pub fn print(&self, tree: &Tree, id: NodeId) -> Result<String, serde_json::Error> {
        let view = NodeView::new(tree, id);
        if self.pretty {
            serde_json::to_string_pretty(&view)
        } else {
            serde_json::to_string(&view)
        }
    }
}

/// The whole tree as compact JSON.
pub fn to_json(tree: &Tree) -> Result<String, serde_json::Error> {
    JsonPrinter::new(false).print(tree, tree.root())
}

/// The whole tree as indented JSON.
pub fn to_json_pretty(tree: &Tree) -> Result<String, serde_json::Error> {
    JsonPrinter::new(true).print(tree, tree.root())
}

/// Indented listing of the subtree at `id`: one line per node with its
/// kind, any name, and the text of leaves. Offsets are left out.
pub fn outline(tree: &Tree, id: NodeId) -> String {
    let mut out = String::new();
    write_outline(tree, id, 0, &mut out);
    out
}

fn write_outline(tree: &Tree, id: NodeId, level: usize, out: &mut String) {
    let node = &tree[id];
    out.push_str(&"  ".repeat(level));
    out.push_str(node.kind.name());
    if let Some(name) = node.name() {
        out.push_str(&format!(" name={name}"));
    }
    if node.is_leaf() && !node.text.is_empty() {
        out.push_str(&format!(" {:?}", node.text));
    }
    out.push('\n');
    for &child in &node.children {
        write_outline(tree, child, level + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    #[test]
    fn test_json_skips_empty_fields() {
        let tree = lex("$gold").unwrap();
        let json = to_json(&tree).unwrap();
        assert!(json.contains(r#""kind":"variable""#));
        assert!(json.contains(r#""name":"gold""#));
        assert!(!json.contains("operator"));
    }

    #[test]
    fn test_pretty_json_is_indented() {
        let tree = lex("x").unwrap();
        assert!(to_json_pretty(&tree).unwrap().contains("\n  "));
    }

    #[test]
    fn test_outline_ignores_offsets() {
        let a = lex("[b]").unwrap();
        let b = lex("zz[b]").unwrap();
        let hook_a = a.children(a.root())[0];
        let hook_b = b.children(b.root())[1];
        assert_eq!(outline(&a, hook_a), outline(&b, hook_b));
    }
}
