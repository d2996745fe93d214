//! Token tree dumps and position queries

use serde::Serialize;

use crate::ast::Tree;
use crate::config::CompilerConfig;
use crate::lexer::Lexer;
use crate::output::{JsonPrinter, outline};
use crate::rules::RuleTable;

use super::CliError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeFormat {
    #[default]
    Json,
    Outline,
}

/// One node on the path to an offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathEntry {
    pub kind: &'static str,
    pub start: usize,
    pub end: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

fn tokenize(source: &str, config: &CompilerConfig) -> Result<Tree, CliError> {
    Ok(Lexer::with_config(RuleTable::standard(), config).lex(source, config.start_mode)?)
}

/// Render the token tree of `source`.
pub fn execute_tree(source: &str, config: &CompilerConfig, format: TreeFormat) -> Result<String, CliError> {
    let tree = tokenize(source, config)?;
    match format {
        TreeFormat::Json => Ok(JsonPrinter::new(config.pretty).print(&tree, tree.root())?),
        TreeFormat::Outline => Ok(outline(&tree, tree.root())),
    }
}

/// The nodes containing byte `offset`, deepest first.
pub fn execute_at(source: &str, config: &CompilerConfig, offset: usize) -> Result<Vec<PathEntry>, CliError> {
    if offset >= source.len() {
        return Err(CliError::OffsetOutOfRange {
            offset,
            len: source.len(),
        });
    }
    let tree = tokenize(source, config)?;
    Ok(tree
        .path_at_offset(offset)
        .into_iter()
        .map(|id| {
            let node = &tree[id];
            PathEntry {
                kind: node.kind.name(),
                start: node.start,
                end: node.end,
                name: node.name().map(str::to_string),
            }
        })
        .collect())
}
