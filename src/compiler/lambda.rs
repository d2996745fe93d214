//! Lambda clauses: `_x where ...`, `when ...`, `_a making _b via ...`,
//! `each _x`.
//!
//! Bodies are compiled now but run later, once per element, so the body
//! code is emitted as a string literal for the runtime to evaluate.

use crate::ast::{NodeId, TokenType};
use crate::compiler::target::{self, ErrorKind};
use crate::compiler::{Compiler, Expect, Scope};

impl Compiler<'_> {
    pub(super) fn lambda(&self, left: &[NodeId], op: NodeId, right: &[NodeId], scope: Scope) -> String {
        let node = self.node(op);
        let clause = node.text.trim().to_lowercase();
        let left = self.significant(left);
        let right = self.significant(right);

        if node.kind == TokenType::Each {
            if !left.is_empty() {
                return self.clause_error(&clause, "can't have anything before it");
            }
            return match self.temp_name(&right) {
                Some(name) => target::lambda(&target::quote(name), &clause, "null"),
                None => self.clause_error(&clause, "must be followed by a temp variable, like '_item'"),
            };
        }

        let subject = match left.as_slice() {
            [] => "undefined".to_string(),
            [single] if self.kind(*single) == TokenType::TempVariable => {
                target::quote(self.node(*single).name().unwrap_or_default())
            }
            nodes if nodes.iter().any(|&id| self.kind(id).is_lambda_clause()) => {
                self.expr(nodes, scope.operand(Expect::Value))
            }
            _ => return self.clause_error(&clause, "must come after a temp variable, like '_item'"),
        };

        let body = match node.kind {
            TokenType::Making | TokenType::With => match self.temp_name(&right) {
                Some(name) => target::quote(name),
                None => {
                    return self.clause_error(&clause, "must be followed by a temp variable, like '_total'");
                }
            },
            _ => {
                if right.is_empty() {
                    return self.missing("right", op);
                }
                target::quote(&self.expr(&right, scope.operand(Expect::Value)))
            }
        };

        target::lambda(&subject, &clause, &body)
    }

    /// Name of the lone temp variable in `nodes`.
    fn temp_name(&self, nodes: &[NodeId]) -> Option<&str> {
        match nodes {
            [single] if self.kind(*single) == TokenType::TempVariable => self.node(*single).name(),
            _ => None,
        }
    }

    fn clause_error(&self, clause: &str, problem: &str) -> String {
        target::error(ErrorKind::Syntax, &format!("The '{clause}' clause {problem}."))
    }
}
