//! # Expression Compiler
//!
//! Compiles expression regions of a token [`Tree`] into code text. The
//! generated code calls into a handful of runtime collaborators by fixed
//! names (see [`target`]); the compiler never evaluates anything itself.
//!
//! Compilation is total. Malformed input never panics and never returns an
//! `Err`: the smallest erroring subexpression is replaced by an
//! `Errors.create(...)` fragment that reports the problem when run.
//!
//! ```text
//! (set: $gold to $gold + 5)
//! ```
//!
//! compiles to
//!
//! ```text
//! Macros.run("set",[section,AssignmentRequest.create(
//!     VarRef.create(State.variables,"gold"),
//!     Operations["+"](VarRef.create(State.variables,"gold").get(),5),"to")])
//! ```

mod connectives;
mod lambda;
pub mod precedence;
pub mod target;

use std::str::FromStr;

use log::{debug, trace};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::ast::{Node, NodeId, Operator, TokenType, Tree};
use crate::config::{CompilerConfig, DEFAULT_MAX_NESTING_DEPTH};
use crate::lexer::{LexError, Lexer};
use crate::rules::{Mode, RuleTable};
use target::ErrorKind;

/// What the surrounding code needs from a compiled expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    /// A value to compute with
    Value,
    /// A writable location (assignment targets)
    Reference,
}

/// One expression region of a document and its generated code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledExpression {
    #[serde(skip)]
    pub node: NodeId,
    pub start: usize,
    pub end: usize,
    pub source: String,
    pub code: String,
}

/// Left operand of a binary operator: raw nodes, or code already
/// compiled by the previous step of the same chain.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Operand<'a> {
    Nodes(&'a [NodeId]),
    Compiled(&'a str),
}

impl Operand<'_> {
    pub fn is_empty(&self) -> bool {
        matches!(self, Operand::Nodes(nodes) if nodes.is_empty())
    }
}

/// Per-call compile state.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Scope {
    pub expect: Expect,
    pub depth: usize,
    /// Swap comparison operands and mirror the comparator
    pub mirror: bool,
}

impl Scope {
    fn root(expect: Expect) -> Self {
        Scope {
            expect,
            depth: 0,
            mirror: false,
        }
    }

    /// Scope for an operand of the current expression.
    pub fn operand(self, expect: Expect) -> Self {
        Scope {
            expect,
            depth: self.depth + 1,
            mirror: false,
        }
    }
}

pub struct Compiler<'t> {
    tree: &'t Tree,
    max_depth: usize,
}

impl<'t> Compiler<'t> {
    pub fn new(tree: &'t Tree) -> Self {
        Compiler {
            tree,
            max_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }

    pub fn with_config(tree: &'t Tree, config: &CompilerConfig) -> Self {
        Compiler {
            tree,
            max_depth: config.max_nesting_depth,
        }
    }

    pub fn tree(&self) -> &'t Tree {
        self.tree
    }

    /// Compile a run of sibling nodes.
    pub fn compile(&self, nodes: &[NodeId], expect: Expect) -> String {
        self.expr(nodes, Scope::root(expect))
    }

    /// Compile a single expression node (a macro call, a variable).
    pub fn compile_node(&self, id: NodeId) -> String {
        self.expr(&[id], Scope::root(Expect::Value))
    }

    /// Every expression region of the document: macro calls and variables
    /// appearing in prose, in document order.
    pub fn expressions(&self) -> Vec<CompiledExpression> {
        let mut found = Vec::new();
        self.collect(self.tree.root(), &mut found);
        found
            .into_iter()
            .map(|id| {
                let node = &self.tree[id];
                CompiledExpression {
                    node: id,
                    start: node.start,
                    end: node.end,
                    source: node.text.clone(),
                    code: self.compile_node(id),
                }
            })
            .collect()
    }

    fn collect(&self, id: NodeId, found: &mut Vec<NodeId>) {
        for &child in self.tree.children(id) {
            match self.tree[child].kind {
                TokenType::Macro | TokenType::Variable | TokenType::TempVariable => found.push(child),
                _ => self.collect(child, found),
            }
        }
    }

    pub(crate) fn node(&self, id: NodeId) -> &'t Node {
        &self.tree[id]
    }

    pub(crate) fn kind(&self, id: NodeId) -> TokenType {
        self.tree[id].kind
    }

    pub(crate) fn expr(&self, nodes: &[NodeId], scope: Scope) -> String {
        if scope.depth > self.max_depth {
            return target::error(ErrorKind::Syntax, "This expression is nested too deeply.");
        }

        let nodes = self.significant(nodes);
        if nodes.is_empty() {
            return match scope.expect {
                Expect::Value => String::new(),
                Expect::Reference => target::error(
                    ErrorKind::Operation,
                    "I need a variable or property here, but there was nothing.",
                ),
            };
        }

        let Some(splits) = precedence::find_splits(self.tree, &nodes) else {
            return match nodes.as_slice() {
                [single] => self.atom(*single, scope),
                _ => match nodes.iter().find(|&&id| self.kind(id) == TokenType::Text) {
                    Some(&text) => self.atom(text, scope),
                    None => self.missing_operator(),
                },
            };
        };

        if splits.group.is_list() {
            self.list(&nodes, &splits.points, scope)
        } else if splits.group.chains() {
            self.chain(&nodes, &splits.points, scope)
        } else {
            match splits.last_applied() {
                Some(at) => self.split(&nodes, at, scope),
                None => self.missing_operator(),
            }
        }
    }

    pub(crate) fn significant(&self, nodes: &[NodeId]) -> Vec<NodeId> {
        nodes
            .iter()
            .copied()
            .filter(|&id| self.kind(id) != TokenType::Whitespace)
            .collect()
    }

    pub(crate) fn operand(&self, part: Operand<'_>, scope: Scope) -> String {
        match part {
            Operand::Nodes(nodes) => self.expr(nodes, scope),
            Operand::Compiled(code) => code.to_string(),
        }
    }

    /// Error for an operand that is syntactically absent.
    pub(crate) fn missing(&self, side: &str, op: NodeId) -> String {
        target::error(
            ErrorKind::Operation,
            &format!(
                "I need usable code to the {side} of '{}'.",
                self.node(op).text.trim()
            ),
        )
    }

    /// Comma-separated items, compiled one by one.
    fn list(&self, nodes: &[NodeId], commas: &[usize], scope: Scope) -> String {
        debug!("list of {} items", commas.len() + 1);
        let items = precedence::operands(nodes, commas);
        let mut code = Vec::with_capacity(items.len());
        for (k, item) in items.iter().enumerate() {
            if item.is_empty() {
                // a trailing comma adds nothing
                if let Some(&comma) = commas.get(k) {
                    code.push(self.missing("left", nodes[comma]));
                }
                break;
            }
            code.push(self.expr(item, scope.operand(Expect::Value)));
        }
        code.join(",")
    }

    /// A run of one left-associative family, folded left to right so a
    /// long flat chain costs no extra depth.
    fn chain(&self, nodes: &[NodeId], points: &[usize], scope: Scope) -> String {
        let Some(&first) = points.first() else {
            return self.missing_operator();
        };
        if matches!(self.kind(nodes[first]), TokenType::And | TokenType::Or) {
            return self.connectives(nodes, points, scope);
        }
        debug!(
            "chain of {} '{}' over {} nodes",
            points.len(),
            self.node(nodes[first]).text.trim(),
            nodes.len()
        );

        let parts = precedence::operands(nodes, points);
        let mut code = String::new();
        for (k, &at) in points.iter().enumerate() {
            let left = match k {
                0 => Operand::Nodes(parts[0]),
                _ => Operand::Compiled(&code),
            };
            // inner steps produce what the next operator wants on its left
            let step = match points.get(k + 1) {
                Some(&next) => Scope {
                    expect: self.left_expect(nodes[next]),
                    depth: scope.depth,
                    mirror: false,
                },
                None => scope,
            };
            code = self.binary(left, nodes[at], parts[k + 1], step);
        }
        code
    }

    fn left_expect(&self, op: NodeId) -> Expect {
        match self.kind(op) {
            TokenType::Property | TokenType::PossessiveOperator => Expect::Reference,
            _ => Expect::Value,
        }
    }

    /// One step of a left-associative chain.
    fn binary(&self, left: Operand<'_>, op: NodeId, right: &[NodeId], scope: Scope) -> String {
        let node = self.node(op);
        let value = |part: &[NodeId]| self.expr(part, scope.operand(Expect::Value));

        match node.kind {
            kind if kind.is_comparison() => self.comparison(left, op, right, scope),

            TokenType::Addition | TokenType::Subtraction => {
                if right.is_empty() {
                    return self.missing("right", op);
                }
                let lhs = if left.is_empty() {
                    "0".to_string()
                } else {
                    self.operand(left, scope.operand(Expect::Value))
                };
                self.arithmetic(op, &lhs, &value(right))
            }

            TokenType::Multiplication | TokenType::Division | TokenType::Modulo => {
                if left.is_empty() {
                    return self.missing("left", op);
                }
                if right.is_empty() {
                    return self.missing("right", op);
                }
                let lhs = self.operand(left, scope.operand(Expect::Value));
                self.arithmetic(op, &lhs, &value(right))
            }

            TokenType::Property => {
                if left.is_empty() {
                    return self.missing("left", op);
                }
                if !right.is_empty() {
                    return self.missing_operator();
                }
                let name = node.name().unwrap_or_default();
                let subject = self.operand(left, scope.operand(Expect::Reference));
                target::read(target::named_ref(&subject, name), scope.expect)
            }

            TokenType::PossessiveOperator => {
                if left.is_empty() {
                    return self.missing("left", op);
                }
                if right.is_empty() {
                    return self.missing("right", op);
                }
                let subject = self.operand(left, scope.operand(Expect::Reference));
                target::read(target::computed_ref(&subject, &value(right)), scope.expect)
            }

            TokenType::ItsOperator => {
                if !left.is_empty() {
                    return self.missing_operator();
                }
                if right.is_empty() {
                    return self.missing("right", op);
                }
                target::read(target::computed_ref(&target::it(), &value(right)), scope.expect)
            }

            _ => self.missing_operator(),
        }
    }

    /// Prefix and right-grouping operators, split at the one applied last.
    fn split(&self, nodes: &[NodeId], split: usize, scope: Scope) -> String {
        let op = nodes[split];
        let node = self.node(op);
        let left = &nodes[..split];
        let right = &nodes[split + 1..];
        debug!(
            "split {} nodes at {} '{}'",
            nodes.len(),
            node.kind,
            node.text.trim()
        );

        let value = |part: &[NodeId]| self.expr(part, scope.operand(Expect::Value));
        let reference = |part: &[NodeId]| self.expr(part, scope.operand(Expect::Reference));

        match node.kind {
            TokenType::Spread => {
                if !left.is_empty() {
                    return self.missing_operator();
                }
                if right.is_empty() {
                    return self.missing("right", op);
                }
                target::spread(&value(right))
            }

            TokenType::To | TokenType::Into => {
                if left.is_empty() {
                    return self.missing("left", op);
                }
                if right.is_empty() {
                    return self.missing("right", op);
                }
                let (dest, src, keyword) = match node.kind {
                    TokenType::To => (reference(left), value(right), "to"),
                    _ => (reference(right), value(left), "into"),
                };
                target::assignment(&dest, &src, keyword)
            }

            kind if kind.is_lambda_clause() => self.lambda(left, op, right, scope),

            TokenType::Not => {
                if !left.is_empty() {
                    return self.missing_operator();
                }
                if right.is_empty() {
                    return self.missing("right", op);
                }
                let operand = value(right);
                target::operation(Operator::Not, &[&operand])
            }

            TokenType::BelongingProperty => {
                if !left.is_empty() {
                    return self.missing_operator();
                }
                if right.is_empty() {
                    return self.missing("right", op);
                }
                let name = node.name().unwrap_or_default();
                target::read(target::named_ref(&reference(right), name), scope.expect)
            }

            TokenType::BelongingOperator => {
                if left.is_empty() {
                    return self.missing("left", op);
                }
                if right.is_empty() {
                    return self.missing("right", op);
                }
                target::read(
                    target::computed_ref(&reference(right), &value(left)),
                    scope.expect,
                )
            }

            _ => self.missing_operator(),
        }
    }

    fn missing_operator(&self) -> String {
        target::error(
            ErrorKind::Syntax,
            "I need an operator or a comma between these values.",
        )
    }

    fn arithmetic(&self, op: NodeId, left: &str, right: &str) -> String {
        match self.node(op).operator() {
            Some(operator) => target::operation(operator, &[left, right]),
            None => self.missing_operator(),
        }
    }

    /// A comparison; a missing left side is the implicit subject `it`.
    fn comparison(&self, left: Operand<'_>, op: NodeId, right: &[NodeId], scope: Scope) -> String {
        let Some(operator) = self.node(op).operator() else {
            return self.missing_operator();
        };
        if right.is_empty() {
            return self.missing("right", op);
        }
        let lhs = if left.is_empty() {
            trace!("'{}' has no left side, comparing against it", operator.tag());
            target::it()
        } else {
            self.operand(left, scope.operand(Expect::Value))
        };
        let rhs = self.expr(right, scope.operand(Expect::Value));

        if !scope.mirror {
            return target::operation(operator, &[&lhs, &rhs]);
        }
        match operator.mirrored() {
            Some(mirrored) => target::operation(mirrored, &[&rhs, &lhs]),
            None => target::error(
                ErrorKind::Operation,
                &format!(
                    "I can't infer the missing side of '{}' here; write the comparison out in full.",
                    self.node(op).text.trim()
                ),
            ),
        }
    }

    fn atom(&self, id: NodeId, scope: Scope) -> String {
        let node = self.node(id);
        trace!("atom {} {:?}", node.kind, node.text);
        match node.kind {
            TokenType::Variable => target::read(
                target::named_ref(target::STATE_VARIABLES, node.name().unwrap_or_default()),
                scope.expect,
            ),
            TokenType::TempVariable => target::read(
                target::named_ref(target::TEMP_VARIABLES, node.name().unwrap_or_default()),
                scope.expect,
            ),
            TokenType::ItsProperty => target::read(
                target::named_ref(&target::it(), node.name().unwrap_or_default()),
                scope.expect,
            ),
            TokenType::Identifier => target::identifier(node.name().unwrap_or("it")),
            TokenType::String => target::quote(node.value().unwrap_or_default()),
            TokenType::Number => number(node.value().unwrap_or(&node.text)),
            TokenType::Boolean => node.text.clone(),
            TokenType::Colour => target::colour(node.value().unwrap_or(&node.text)),
            TokenType::Hook => target::hook(node.inner_text().unwrap_or_default()),
            TokenType::Grouping => {
                let inner = self.expr(&node.children, scope.operand(scope.expect));
                if inner.is_empty() {
                    return target::error(
                        ErrorKind::Syntax,
                        "I need something inside these parentheses.",
                    );
                }
                format!("({inner})")
            }
            TokenType::Macro => self.macro_call(node, scope),
            TokenType::Text => {
                let text = node.text.trim();
                if text.starts_with('"') || text.starts_with('\'') {
                    target::error(
                        ErrorKind::Syntax,
                        "This string doesn't have a closing quote, so I can't tell where it ends.",
                    )
                } else {
                    target::error(
                        ErrorKind::Syntax,
                        &format!("I don't understand '{text}' inside an expression."),
                    )
                }
            }
            kind if kind.is_operator() => self.missing("left", id),
            _ => target::error(
                ErrorKind::Syntax,
                &format!("'{}' can't be used inside an expression.", node.text.trim()),
            ),
        }
    }

    fn macro_call(&self, node: &Node, scope: Scope) -> String {
        let name = node.name().unwrap_or_default();
        let callee = match name.chars().next() {
            Some('$') => target::read(
                target::named_ref(target::STATE_VARIABLES, &name[1..]),
                Expect::Value,
            ),
            Some('_') => target::read(
                target::named_ref(target::TEMP_VARIABLES, &name[1..]),
                Expect::Value,
            ),
            _ => target::quote(&macro_name(name)),
        };
        let args = self.expr(&node.children, scope.operand(Expect::Value));
        target::macro_call(&callee, &args)
    }
}

/// Tokenize `source` as an expression and compile it to a value.
pub fn compile_expression(source: &str, config: &CompilerConfig) -> Result<String, LexError> {
    let tree = Lexer::with_config(RuleTable::standard(), config).lex(source, Mode::Code)?;
    let compiler = Compiler::with_config(&tree, config);
    Ok(compiler.compile(tree.children(tree.root()), Expect::Value))
}

/// Macro names ignore case, dashes and underscores.
pub fn macro_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Canonical numeric literal: `3.50` becomes `3.5`.
fn number(text: &str) -> String {
    match Decimal::from_str(text) {
        Ok(value) => value.normalize().to_string(),
        Err(_) => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macro_name_is_insensitive() {
        assert_eq!(macro_name("Go-To"), "goto");
        assert_eq!(macro_name("link_goto"), "linkgoto");
    }

    #[test]
    fn test_number_normalization() {
        assert_eq!(number("3.50"), "3.5");
        assert_eq!(number("10"), "10");
        assert_eq!(number("007"), "7");
    }
}
