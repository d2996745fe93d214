//! CLI support for quill-lang
//!
//! Programmatic access to the `quill` subcommands, for embedding in other
//! tools (editors, build steps).

mod check;
mod inspect;

pub use check::{CheckOptions, CheckResult, execute_check, execute_eval};
pub use inspect::{PathEntry, TreeFormat, execute_at, execute_tree};

use std::io;

use crate::config::ConfigError;
use crate::lexer::LexError;
use crate::sandbox::EvalError;

/// Errors that can occur during CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Tokenizer error: {0}")]
    Lex(#[from] LexError),

    #[error("Evaluation error: {0}")]
    Eval(#[from] EvalError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No input provided. Pass a file, use --expr, or pipe text to stdin.")]
    NoInput,

    #[error("Offset {offset} is past the end of the {len}-byte input")]
    OffsetOutOfRange { offset: usize, len: usize },
}
