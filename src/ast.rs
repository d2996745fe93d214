//! # Quill Token Tree
//!
//! This module defines the tree the lexer produces from document text: a
//! mixture of prose markup and an embedded expression language.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - The closed set of node kinds and operator-library tags
//! - **[node]** - Nodes, the arena-backed [`Tree`], and rule-specific fields
//! - **[lookup]** - Position queries (`node_at_offset`, `path_at_offset`)
//!   and the lossless fragment walk
//!
//! ## Quick Start
//!
//! ```text
//! You have (print: $gold) coins. |shop>[''Buy'' something?]
//! ```
//!
//! This tokenizes into prose text, a `macro` node whose children are the
//! expression tokens `$gold`, more text, and a named `hook` whose children
//! contain a `bold` node.
//!
//! ## Core Concepts
//!
//! ### Fronts and Backs
//!
//! Paired delimiters are found independently. An opener (`[`, `(name:`,
//! `''`) becomes a tentative *front* node; when a closer that matches it
//! turns up, the closer *folds* every sibling since the front into itself
//! and becomes one composite node spanning both delimiters. Openers that
//! are never closed end up as plain text.
//!
//! ### Offsets
//!
//! All offsets are byte offsets into the tree's source. A node's `text` is
//! always `source[start..end]`.
pub mod lookup;
pub mod node;
pub mod tokens;

pub use node::{Fields, Node, NodeId, Tree};
pub use tokens::{Operator, TokenType};
