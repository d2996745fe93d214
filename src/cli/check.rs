//! Compile documents and expressions, and evaluate expressions

use crate::compiler::{CompiledExpression, Compiler, compile_expression};
use crate::config::CompilerConfig;
use crate::lexer::Lexer;
use crate::rules::RuleTable;
use crate::sandbox::{Evaluator, Value};

use super::CliError;

/// Options for the compile command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Document text, or a bare expression when `expression` is set
    pub source: String,
    /// Treat `source` as one expression rather than a document
    pub expression: bool,
    pub config: CompilerConfig,
}

/// Result of a compile operation
#[derive(Debug)]
pub enum CheckResult {
    /// Code for a bare expression
    Expression(String),
    /// Every expression region of a document
    Document(Vec<CompiledExpression>),
}

/// Compile a document or expression.
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    if options.expression {
        let code = compile_expression(&options.source, &options.config)?;
        return Ok(CheckResult::Expression(code));
    }

    let tree = Lexer::with_config(RuleTable::standard(), &options.config)
        .lex(&options.source, options.config.start_mode)?;
    let compiler = Compiler::with_config(&tree, &options.config);
    Ok(CheckResult::Document(compiler.expressions()))
}

/// Compile an expression and run it in the sandbox.
pub fn execute_eval(source: &str, config: &CompilerConfig) -> Result<(String, Value), CliError> {
    let code = compile_expression(source, config)?;
    let value = Evaluator::new().eval_code(&code)?;
    Ok((code, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_each_region() {
        let options = CheckOptions {
            source: "Hi $name. (print: 1 + 2)".to_string(),
            ..CheckOptions::default()
        };
        let CheckResult::Document(found) = execute_check(&options).unwrap() else {
            panic!("expected a document result");
        };
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].source, "$name");
        assert_eq!(found[1].source, "(print: 1 + 2)");
    }

    #[test]
    fn test_eval_returns_code_and_value() {
        let (code, value) = execute_eval("2 * 3", &CompilerConfig::default()).unwrap();
        assert_eq!(code, r#"Operations["*"](2,3)"#);
        assert_eq!(value.to_string(), "6");
    }
}
