//! Constant evaluation of compiled expressions.
//!
//! Runs the operator calls, `it` references and error fragments the
//! compiler emits, over literal operands. Anything that needs a running
//! story (variables, macros, lambdas) fails with
//! [`EvalError::Unsupported`].
//!
//! ```
//! use quill_lang::config::CompilerConfig;
//! use quill_lang::sandbox::{eval_source, Value};
//!
//! let value = eval_source("3 < 4 and 5", &CompilerConfig::default()).unwrap();
//! assert_eq!(value, Value::Boolean(true));
//! ```

pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod value;

pub use evaluator::{EvalError, Evaluator};
pub use parser::{Expr, ParseError, Parser, parse};
pub use value::Value;

use crate::compiler::compile_expression;
use crate::config::CompilerConfig;

/// Compile `source` as an expression and evaluate the result.
pub fn eval_source(source: &str, config: &CompilerConfig) -> Result<Value, EvalError> {
    let code = compile_expression(source, config)?;
    log::debug!("evaluating {code}");
    Evaluator::new().eval_code(&code)
}
