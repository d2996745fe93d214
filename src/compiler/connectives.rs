//! `and` / `or`, including elided comparisons.
//!
//! In `$a > 2 and 5` the right side has no comparison of its own; it
//! borrows `>` and compares against `it`, the left operand of the most
//! recent comparison. When only the right side has a comparison, that side
//! is compiled first with its operands swapped so `it` still ends up
//! holding the operand nearest the elided side.

use log::debug;

use crate::ast::{NodeId, Operator, TokenType};
use crate::compiler::target::{self, ErrorKind};
use crate::compiler::{Compiler, Expect, Operand, Scope, precedence};

/// Comparators found on the left and right of one connective.
type Sides = (Option<Operator>, Option<Operator>);

impl Compiler<'_> {
    /// A run of `and` or of `or`, folded left to right.
    pub(super) fn connectives(&self, nodes: &[NodeId], points: &[usize], scope: Scope) -> String {
        let parts = precedence::operands(nodes, points);
        let found: Vec<Option<Operator>> = parts.iter().map(|part| self.comparison_in(part)).collect();
        debug!("chain of {} connectives over {} nodes", points.len(), nodes.len());

        // the left side of each step is everything before it, so its
        // comparator is the first one found so far
        let mut sides: Vec<Sides> = Vec::with_capacity(points.len());
        let mut seen = None;
        for pair in found.windows(2) {
            seen = seen.or(pair[0]);
            sides.push((seen, pair[1]));
        }

        // a step that borrows from its right compiles its left unmirrored
        let mut mirrors = vec![scope.mirror; points.len()];
        for k in (1..points.len()).rev() {
            mirrors[k - 1] = !matches!(sides[k], (None, Some(_))) && mirrors[k];
        }

        let mut code = String::new();
        for (k, &at) in points.iter().enumerate() {
            let left = match k {
                0 => Operand::Nodes(parts[0]),
                _ => Operand::Compiled(&code),
            };
            let step = Scope {
                mirror: mirrors[k],
                ..scope
            };
            code = self.connective(left, nodes[at], parts[k + 1], sides[k], step);
        }
        code
    }

    fn connective(&self, left: Operand<'_>, op: NodeId, right: &[NodeId], sides: Sides, scope: Scope) -> String {
        let Some(operator) = self.node(op).operator() else {
            return self.missing("left", op);
        };
        if left.is_empty() {
            return self.missing("left", op);
        }
        if right.is_empty() {
            return self.missing("right", op);
        }

        let plain = Scope {
            mirror: scope.mirror,
            ..scope.operand(Expect::Value)
        };

        match sides {
            (None, None) | (Some(_), Some(_)) => target::operation(
                operator,
                &[&self.operand(left, plain), &self.expr(right, plain)],
            ),

            (Some(comparator), None) => {
                if comparator == Operator::IsNot {
                    return ambiguous(self, op);
                }
                let Some(elided) = effective(comparator, scope.mirror) else {
                    return no_mirror(comparator);
                };
                debug!("'{}' extends {} to its right side", operator.tag(), elided.tag());
                let rhs = self.expr(right, scope.operand(Expect::Value));
                let inferred = target::operation(elided, &[&target::it(), &rhs]);
                target::operation(operator, &[&self.operand(left, plain), &inferred])
            }

            (None, Some(comparator)) => {
                if comparator == Operator::IsNot {
                    return ambiguous(self, op);
                }
                let mirror = !scope.mirror;
                let Some(elided) = effective(comparator, mirror) else {
                    return no_mirror(comparator);
                };
                debug!("'{}' extends {} to its left side", operator.tag(), elided.tag());
                let swapped = self.expr(
                    right,
                    Scope {
                        mirror,
                        ..scope.operand(Expect::Value)
                    },
                );
                let lhs = self.operand(left, scope.operand(Expect::Value));
                let inferred = target::operation(elided, &[&target::it(), &lhs]);
                target::operation(operator, &[&swapped, &inferred])
            }
        }
    }

    /// The comparator a run of nodes is built from, looking through
    /// `and`/`or` and preferring the left-hand side.
    ///
    /// Each level descends to a strictly tighter family, so recursion is
    /// bounded by the precedence table rather than by the input.
    pub(super) fn comparison_in(&self, nodes: &[NodeId]) -> Option<Operator> {
        let nodes = self.significant(nodes);
        let splits = precedence::find_splits(self.tree(), &nodes)?;
        let node = self.node(nodes[splits.last_applied()?]);
        match node.kind {
            TokenType::And | TokenType::Or => precedence::operands(&nodes, &splits.points)
                .into_iter()
                .find_map(|part| self.comparison_in(part)),
            kind if kind.is_comparison() => node.operator(),
            _ => None,
        }
    }
}

/// The comparator as seen after an operand swap, if one is in effect.
fn effective(comparator: Operator, mirror: bool) -> Option<Operator> {
    if mirror {
        comparator.mirrored()
    } else {
        Some(comparator)
    }
}

fn ambiguous(compiler: &Compiler<'_>, op: NodeId) -> String {
    target::error(
        ErrorKind::Operation,
        &format!(
            "This use of 'is not' and '{}' is ambiguous; write the comparison out in full on both sides.",
            compiler.node(op).text.trim()
        ),
    )
}

fn no_mirror(comparator: Operator) -> String {
    target::error(
        ErrorKind::Operation,
        &format!(
            "I can't infer the missing side of '{}' here; write the comparison out in full.",
            comparator.tag()
        ),
    )
}
