use std::ops::Range;

use log::{debug, trace};

use crate::ast::{Fields, Node, NodeId, TokenType, Tree};
use crate::config::{CompilerConfig, DEFAULT_MAX_NESTING_DEPTH};
use crate::rules::{Follow, Mode, Partial, RuleTable};

/// Errors that stop tokenization.
///
/// Unmatched text and unbalanced delimiters are never errors; they become
/// plain text nodes, as do openers beyond the nesting limit. Only inner
/// text nested past the limit aborts a scan.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    #[error("Too deeply nested: more than {limit} levels open at byte {position}")]
    NestingTooDeep { limit: usize, position: usize },
}

/// Turns document text into a [`Tree`] by running a [`RuleTable`] over it.
pub struct Lexer<'r> {
    rules: &'r RuleTable,
    max_depth: usize,
}

impl Default for Lexer<'static> {
    fn default() -> Self {
        Lexer::new(RuleTable::standard())
    }
}

impl<'r> Lexer<'r> {
    pub fn new(rules: &'r RuleTable) -> Self {
        Lexer {
            rules,
            max_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }

    pub fn with_config(rules: &'r RuleTable, config: &CompilerConfig) -> Self {
        Lexer {
            rules,
            max_depth: config.max_nesting_depth,
        }
    }

    /// Tokenize `source`, starting in `mode`.
    pub fn lex(&self, source: &str, mode: Mode) -> Result<Tree, LexError> {
        let mut builder = Builder {
            rules: self.rules,
            max_depth: self.max_depth,
            source,
            nodes: Vec::new(),
        };
        let children = builder.scan(0..source.len(), mode, 0)?;
        let root = builder.alloc(Node {
            kind: TokenType::Root,
            start: 0,
            end: source.len(),
            text: source.to_string(),
            inner: None,
            children,
            is_front: false,
            matches: &[],
            cannot_cross: &[],
            fields: Fields::default(),
        });
        Ok(builder.finish(root))
    }
}

/// Tokenize prose with the standard grammar.
pub fn lex(source: &str) -> Result<Tree, LexError> {
    Lexer::default().lex(source, Mode::Markup)
}

/// Tokenize a bare expression with the standard grammar.
pub fn lex_code(source: &str) -> Result<Tree, LexError> {
    Lexer::default().lex(source, Mode::Code)
}

/// An opener still waiting for its closer.
#[derive(Debug, Clone, Copy)]
struct Open {
    id: NodeId,
    /// Position of the opener in the sibling list
    slot: usize,
    /// Mode active until the opener is closed
    mode: Mode,
}

/// A rule that fired at the cursor.
struct Hit {
    len: usize,
    partial: Partial,
    /// Stack position of the front this node closes
    closes: Option<usize>,
}

struct Builder<'r, 's> {
    rules: &'r RuleTable,
    max_depth: usize,
    source: &'s str,
    nodes: Vec<Node>,
}

impl Builder<'_, '_> {
    fn alloc(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    fn scan(&mut self, range: Range<usize>, mode: Mode, depth: usize) -> Result<Vec<NodeId>, LexError> {
        let mut siblings: Vec<NodeId> = Vec::new();
        let mut stack: Vec<Open> = Vec::new();
        let mut cursor = range.start;
        let mut pending = range.start;

        while cursor < range.end {
            let active = stack.last().map_or(mode, |open| open.mode);
            let rest = &self.source[cursor..range.end];
            let previous = if pending < cursor {
                Follow::Kind(TokenType::Text)
            } else {
                siblings
                    .last()
                    .map_or(Follow::Start, |id| Follow::Kind(self.nodes[id.0].kind))
            };

            let Some(hit) = self.find_rule(active, rest, previous, &stack) else {
                cursor += rest.chars().next().map_or(1, char::len_utf8);
                continue;
            };

            self.flush_text(&mut siblings, pending..cursor);
            let end = cursor + hit.len;
            let is_front = hit.partial.is_front;
            let front_mode = hit.partial.mode.unwrap_or(active);
            let id = self.make_node(hit.partial, cursor..end, depth)?;
            siblings.push(id);

            match hit.closes {
                Some(pos) => self.fold(&mut siblings, &mut stack, pos, id),
                // openers past the limit stay text
                None if is_front && stack.len() >= self.max_depth => self.demote(id),
                None if is_front => stack.push(Open {
                    id,
                    slot: siblings.len() - 1,
                    mode: front_mode,
                }),
                None => {}
            }

            cursor = end;
            pending = end;
        }

        self.flush_text(&mut siblings, pending..range.end);
        for open in stack {
            self.demote(open.id);
        }
        Ok(siblings)
    }

    fn find_rule(&self, mode: Mode, rest: &str, previous: Follow, stack: &[Open]) -> Option<Hit> {
        for rule in self.rules.rules_for(mode) {
            let Some(captures) = rule.try_match(rest, previous) else {
                continue;
            };
            let partial = rule.build(&captures);
            let len = captures.get(0).map_or(0, |m| m.end());

            let closes = if partial.is_back() {
                self.find_partner(&partial, stack)
            } else {
                None
            };
            if partial.is_back() && closes.is_none() && !partial.is_front {
                trace!("rule '{}' has no open partner, skipping", rule.name);
                continue;
            }

            trace!("rule '{}' matched {:?}", rule.name, &rest[..len]);
            return Some(Hit {
                len,
                partial,
                closes,
            });
        }
        None
    }

    /// Nearest open front this back token may close.
    fn find_partner(&self, partial: &Partial, stack: &[Open]) -> Option<usize> {
        for (pos, open) in stack.iter().enumerate().rev() {
            let kind = self.nodes[open.id.0].kind;
            if partial.matches.iter().any(|(front, _)| *front == kind) {
                return Some(pos);
            }
            if partial.cannot_cross.contains(&kind) {
                trace!("{} cannot close across open {}", partial.kind, kind);
                return None;
            }
        }
        None
    }

    fn flush_text(&mut self, siblings: &mut Vec<NodeId>, range: Range<usize>) {
        if range.is_empty() {
            return;
        }
        let id = self.alloc(Node {
            kind: TokenType::Text,
            text: self.source[range.clone()].to_string(),
            start: range.start,
            end: range.end,
            inner: None,
            children: Vec::new(),
            is_front: false,
            matches: &[],
            cannot_cross: &[],
            fields: Fields::default(),
        });
        siblings.push(id);
    }

    fn make_node(&mut self, partial: Partial, span: Range<usize>, depth: usize) -> Result<NodeId, LexError> {
        let inner = partial
            .inner
            .as_ref()
            .map(|r| span.start + r.start..span.start + r.end);

        let mut children = Vec::new();
        if !partial.is_front
            && let (Some(inner), Some(mode)) = (&inner, partial.mode)
            && !inner.is_empty()
        {
            if depth + 1 > self.max_depth {
                return Err(LexError::NestingTooDeep {
                    limit: self.max_depth,
                    position: inner.start,
                });
            }
            children = self.scan(inner.clone(), mode, depth + 1)?;
        }

        Ok(self.alloc(Node {
            kind: partial.kind,
            text: self.source[span.clone()].to_string(),
            start: span.start,
            end: span.end,
            inner,
            children,
            is_front: partial.is_front,
            matches: partial.matches,
            cannot_cross: partial.cannot_cross,
            fields: partial.fields,
        }))
    }

    /// Fold the back node `back` (last sibling) against the front at
    /// `stack[pos]`: the back absorbs everything between them and takes
    /// over the front's span and fields.
    fn fold(&mut self, siblings: &mut Vec<NodeId>, stack: &mut Vec<Open>, pos: usize, back: NodeId) {
        let open = stack[pos];
        for stranded in stack.drain(pos + 1..) {
            self.demote(stranded.id);
        }
        stack.pop();

        siblings.pop();
        let children: Vec<NodeId> = siblings.drain(open.slot + 1..).collect();
        siblings.pop();

        let front = &mut self.nodes[open.id.0];
        let front_kind = front.kind;
        let front_span = front.start..front.end;
        let front_fields = std::mem::take(&mut front.fields);

        let node = &mut self.nodes[back.0];
        let folded = node.folds(front_kind).unwrap_or(node.kind);
        debug!(
            "folded {} + {} into {} at {}..{}",
            front_kind, node.kind, folded, front_span.start, node.end
        );
        node.inner = Some(front_span.end..node.start);
        node.kind = folded;
        node.start = front_span.start;
        node.text = self.source[front_span.start..node.end].to_string();
        node.children = children;
        node.is_front = false;
        node.matches = &[];
        node.cannot_cross = &[];
        node.fields.inherit(front_fields);

        siblings.push(back);
    }

    /// An opener that was never closed is just text.
    fn demote(&mut self, id: NodeId) {
        let node = &mut self.nodes[id.0];
        debug!("demoting unclosed {} at {}", node.kind, node.start);
        node.kind = TokenType::Text;
        node.is_front = false;
        node.matches = &[];
        node.cannot_cross = &[];
        node.fields = Fields::default();
    }

    /// Drop folded-away nodes and renumber what the root reaches, in
    /// document order.
    fn finish(self, root: NodeId) -> Tree {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut pending = vec![root];
        while let Some(id) = pending.pop() {
            order.push(id);
            pending.extend(self.nodes[id.0].children.iter().rev().copied());
        }

        let mut remap = vec![0; self.nodes.len()];
        for (new, old) in order.iter().enumerate() {
            remap[old.0] = new;
        }

        let mut slots: Vec<Option<Node>> = self.nodes.into_iter().map(Some).collect();
        let nodes = order
            .iter()
            .filter_map(|old| slots[old.0].take())
            .map(|mut node| {
                for child in &mut node.children {
                    *child = NodeId(remap[child.0]);
                }
                node
            })
            .collect();

        Tree::from_parts(self.source.to_string(), nodes, NodeId(0))
    }
}
