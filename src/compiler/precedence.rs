//! Operator precedence and split selection.
//!
//! Groups run from loosest to tightest binding. The chosen split node is
//! the operator applied last: left-associative families split at their
//! right-most member, prefix and right-grouping families at their
//! left-most.

use crate::ast::{NodeId, TokenType, Tree};

use TokenType as T;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    Leftmost,
    Rightmost,
}

#[derive(Debug)]
pub struct Group {
    pub types: &'static [TokenType],
    pub split: Split,
}

pub const GROUPS: &[Group] = &[
    Group { types: &[T::Comma], split: Split::Leftmost },
    Group { types: &[T::Spread], split: Split::Leftmost },
    Group { types: &[T::To, T::Into], split: Split::Leftmost },
    Group { types: &[T::Where, T::When, T::Via, T::Making, T::With, T::Each], split: Split::Rightmost },
    Group { types: &[T::Or], split: Split::Rightmost },
    Group { types: &[T::And], split: Split::Rightmost },
    Group { types: &[T::Not], split: Split::Leftmost },
    Group { types: &[T::Is, T::IsNot], split: Split::Rightmost },
    Group { types: &[T::Contains, T::IsIn, T::IsNotIn], split: Split::Rightmost },
    Group { types: &[T::Inequality], split: Split::Rightmost },
    Group { types: &[T::Addition, T::Subtraction], split: Split::Rightmost },
    Group { types: &[T::Multiplication, T::Division, T::Modulo], split: Split::Rightmost },
    Group { types: &[T::BelongingProperty, T::BelongingOperator], split: Split::Leftmost },
    Group { types: &[T::Property, T::PossessiveOperator, T::ItsOperator], split: Split::Rightmost },
];

impl Group {
    /// Left-associative binary families, compiled as one flat chain.
    pub fn chains(&self) -> bool {
        self.split == Split::Rightmost && !self.types.iter().any(|t| t.is_lambda_clause())
    }

    pub fn is_list(&self) -> bool {
        self.types.contains(&T::Comma)
    }
}

/// Every split point of the loosest operator family present.
#[derive(Debug)]
pub struct Splits {
    pub group: &'static Group,
    /// Ascending indexes into the node run; never empty
    pub points: Vec<usize>,
}

impl Splits {
    /// The operator applied last.
    pub fn last_applied(&self) -> Option<usize> {
        match self.group.split {
            Split::Leftmost => self.points.first().copied(),
            Split::Rightmost => self.points.last().copied(),
        }
    }
}

/// Split points of the loosest family in `nodes`, if any operator is present.
///
/// `nodes` must already be free of whitespace.
pub fn find_splits(tree: &Tree, nodes: &[NodeId]) -> Option<Splits> {
    for group in GROUPS {
        let candidates: Vec<usize> = nodes
            .iter()
            .enumerate()
            .filter(|(_, id)| group.types.contains(&tree[**id].kind))
            .map(|(idx, _)| idx)
            .collect();
        if candidates.is_empty() {
            continue;
        }

        let points = if group.types.contains(&T::Addition) {
            // a sign after another operator is not a split point
            let binary: Vec<usize> = candidates
                .iter()
                .copied()
                .filter(|&idx| idx > 0 && !tree[nodes[idx - 1]].kind.is_operator())
                .collect();
            if !binary.is_empty() {
                binary
            } else if candidates.first() == Some(&0) {
                vec![0]
            } else {
                continue;
            }
        } else {
            candidates
        };
        return Some(Splits { group, points });
    }
    None
}

/// Index of the node to split `nodes` at, if any operator is present.
pub fn find_split(tree: &Tree, nodes: &[NodeId]) -> Option<usize> {
    find_splits(tree, nodes)?.last_applied()
}

/// The operands either side of each split point, in order.
pub fn operands<'n>(nodes: &'n [NodeId], points: &[usize]) -> Vec<&'n [NodeId]> {
    let mut parts = Vec::with_capacity(points.len() + 1);
    let mut start = 0;
    for &at in points {
        parts.push(&nodes[start..at]);
        start = at + 1;
    }
    parts.push(&nodes[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex_code;

    fn split_text(source: &str) -> Option<String> {
        let tree = lex_code(source).unwrap();
        let nodes: Vec<NodeId> = tree
            .children(tree.root())
            .iter()
            .copied()
            .filter(|id| tree[*id].kind != T::Whitespace)
            .collect();
        find_split(&tree, &nodes).map(|idx| tree[nodes[idx]].text.clone())
    }

    #[test]
    fn test_loosest_operator_wins() {
        assert_eq!(split_text("3 + 5 * 2").as_deref(), Some("+"));
        assert_eq!(split_text("3 * 5 + 2").as_deref(), Some("+"));
    }

    #[test]
    fn test_sign_is_not_a_split() {
        assert_eq!(split_text("3 * -2").as_deref(), Some("*"));
        assert_eq!(split_text("-2").as_deref(), Some("-"));
    }

    #[test]
    fn test_chain_collects_every_member() {
        let tree = lex_code("1 - 2 + -3 * 4").unwrap();
        let nodes: Vec<NodeId> = tree
            .children(tree.root())
            .iter()
            .copied()
            .filter(|id| tree[*id].kind != T::Whitespace)
            .collect();
        let splits = find_splits(&tree, &nodes).unwrap();
        assert!(splits.group.chains());
        assert_eq!(splits.points, vec![1, 3]);
        let lengths: Vec<usize> = operands(&nodes, &splits.points)
            .iter()
            .map(|part| part.len())
            .collect();
        assert_eq!(lengths, vec![1, 1, 4]);
    }

    #[test]
    fn test_no_operator() {
        assert_eq!(split_text("$a"), None);
    }
}
