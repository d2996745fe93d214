pub mod ast;
pub mod cli;
pub mod compiler;
pub mod config;
pub mod lexer;
pub mod output;
pub mod rules;
pub mod sandbox;

pub use ast::{Fields, Node, NodeId, Operator, TokenType, Tree};
pub use compiler::{CompiledExpression, Compiler, Expect, compile_expression};
pub use config::{CompilerConfig, ConfigError};
pub use lexer::{LexError, Lexer, lex, lex_code};
pub use output::{outline, to_json, to_json_pretty};
pub use rules::{Follow, Mode, Partial, Rule, RuleError, RuleTable};
pub use sandbox::{EvalError, Evaluator, Value, eval_source};
