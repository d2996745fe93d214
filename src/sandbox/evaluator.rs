use log::trace;
use rust_decimal::Decimal;

use super::parser::{Expr, ParseError, parse};
use super::value::Value;
use crate::ast::Operator;
use crate::lexer::LexError;

/// Errors that can occur while running compiled code.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("Malformed generated code: {0}")]
    Parse(#[from] ParseError),

    /// An error fragment was reached
    #[error("{category} error: {message}")]
    Raised { category: String, message: String },

    /// Type mismatch or invalid operation for the given type
    #[error("Type error: {0}")]
    TypeError(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Number overflow")]
    Overflow,

    /// Code that needs story state, macros or lambdas
    #[error("'{0}' needs a running story and can't be evaluated here")]
    Unsupported(String),
}

/// Evaluates compiled code over constants.
///
/// Tracks `it`, which every comparison sets to its left operand; elided
/// comparisons read it back.
#[derive(Debug, Default)]
pub struct Evaluator {
    it: Value,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current value of `it`.
    pub fn it(&self) -> &Value {
        &self.it
    }

    /// Evaluate generated code. A comma sequence at the top level becomes
    /// an array.
    pub fn eval_code(&mut self, code: &str) -> Result<Value, EvalError> {
        let mut program = parse(code)?;
        match program.len() {
            0 => Ok(Value::Undefined),
            1 => {
                let expr = program.remove(0);
                self.eval_expr(&expr)
            }
            _ => program
                .iter()
                .map(|expr| self.eval_expr(expr))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
        }
    }

    pub fn eval_expr(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        match expr {
            Expr::Undefined => Ok(Value::Undefined),
            Expr::Null => Ok(Value::Null),
            Expr::Boolean(b) => Ok(Value::Boolean(*b)),
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::String(s) => Ok(Value::String(s.clone())),
            Expr::Array(items) => items
                .iter()
                .map(|item| self.eval_expr(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Expr::Sequence(items) => {
                let mut last = Value::Undefined;
                for item in items {
                    last = self.eval_expr(item)?;
                }
                Ok(last)
            }
            Expr::Member { .. } => match expr.dotted().as_deref() {
                Some("Operations.Identifiers.it") => Ok(self.it.clone()),
                Some(path) => Err(EvalError::Unsupported(path.to_string())),
                None => Err(unsupported(expr)),
            },
            Expr::Call { callee, args } => self.eval_call(callee, args),
            Expr::Identifier(_) | Expr::Index { .. } => Err(unsupported(expr)),
        }
    }

    fn eval_call(&mut self, callee: &Expr, args: &[Expr]) -> Result<Value, EvalError> {
        if let Expr::Index { object, key } = callee
            && object.dotted().as_deref() == Some("Operations")
        {
            let Expr::String(tag) = key.as_ref() else {
                return Err(EvalError::TypeError("operation names must be strings".into()));
            };
            let operator = Operator::from_tag(tag)
                .ok_or_else(|| EvalError::TypeError(format!("unknown operation '{tag}'")))?;
            let values = args
                .iter()
                .map(|arg| self.eval_expr(arg))
                .collect::<Result<Vec<_>, _>>()?;
            return self.apply_operation(operator, values);
        }

        match callee.dotted().as_deref() {
            Some("Errors.create") => {
                let category = self.string_arg(args, 0)?;
                let message = self.string_arg(args, 1)?;
                Err(EvalError::Raised { category, message })
            }
            Some("Operations.spread") => {
                let value = self.single_arg(args)?;
                Ok(Value::Spread(Box::new(value)))
            }
            Some("Operations.colour") => Ok(Value::Colour(self.string_arg(args, 0)?)),
            Some("Operations.hook") => Ok(Value::Hook(self.string_arg(args, 0)?)),
            _ => Err(unsupported(callee)),
        }
    }

    fn single_arg(&mut self, args: &[Expr]) -> Result<Value, EvalError> {
        match args {
            [arg] => self.eval_expr(arg),
            _ => Err(EvalError::TypeError(format!("expected 1 argument, got {}", args.len()))),
        }
    }

    fn string_arg(&mut self, args: &[Expr], idx: usize) -> Result<String, EvalError> {
        let arg = args
            .get(idx)
            .ok_or_else(|| EvalError::TypeError(format!("missing argument {}", idx + 1)))?;
        match self.eval_expr(arg)? {
            Value::String(s) => Ok(s),
            other => Err(EvalError::TypeError(format!(
                "expected a string, got {}",
                other.type_name()
            ))),
        }
    }

    fn apply_operation(&mut self, operator: Operator, mut values: Vec<Value>) -> Result<Value, EvalError> {
        if operator == Operator::Not {
            let [value] = values.as_slice() else {
                return Err(EvalError::TypeError("'not' takes one operand".into()));
            };
            return value
                .as_bool()
                .map(|b| Value::Boolean(!b))
                .ok_or_else(|| type_error("use 'not' on", value));
        }

        if values.len() != 2 {
            return Err(EvalError::TypeError(format!(
                "'{}' takes two operands, got {}",
                operator.tag(),
                values.len()
            )));
        }
        let right = values.pop().unwrap_or_default();
        let left = values.pop().unwrap_or_default();
        trace!("{} {} {}", left, operator.tag(), right);

        let result = self.apply_binop(operator, &left, &right)?;
        if operator.is_comparison() {
            self.it = left;
        }
        Ok(result)
    }

    fn apply_binop(&self, operator: Operator, left: &Value, right: &Value) -> Result<Value, EvalError> {
        match operator {
            Operator::Add => match (left, right) {
                (Value::Number(a), Value::Number(b)) => checked(a.checked_add(*b)),
                (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{a}{b}"))),
                (Value::Array(a), Value::Array(b)) => {
                    Ok(Value::Array(a.iter().chain(b).cloned().collect()))
                }
                (a, b) => Err(mismatch("add", a, b)),
            },
            Operator::Subtract => numbers(left, right, "subtract", |a, b| checked(a.checked_sub(b))),
            Operator::Multiply => numbers(left, right, "multiply", |a, b| checked(a.checked_mul(b))),
            Operator::Divide => numbers(left, right, "divide", |a, b| {
                if b.is_zero() {
                    return Err(EvalError::DivisionByZero);
                }
                checked(a.checked_div(b))
            }),
            Operator::Modulo => numbers(left, right, "take the modulo of", |a, b| {
                if b.is_zero() {
                    return Err(EvalError::DivisionByZero);
                }
                checked(a.checked_rem(b))
            }),
            Operator::LessThan => numbers(left, right, "compare", |a, b| Ok((a < b).into())),
            Operator::LessEqual => numbers(left, right, "compare", |a, b| Ok((a <= b).into())),
            Operator::GreaterThan => numbers(left, right, "compare", |a, b| Ok((a > b).into())),
            Operator::GreaterEqual => numbers(left, right, "compare", |a, b| Ok((a >= b).into())),
            Operator::And | Operator::Or => match (left.as_bool(), right.as_bool()) {
                (Some(a), Some(b)) => Ok(Value::Boolean(if operator == Operator::And {
                    a && b
                } else {
                    a || b
                })),
                _ => Err(mismatch(operator.tag(), left, right)),
            },
            Operator::Is => Ok(Value::Boolean(left == right)),
            Operator::IsNot => Ok(Value::Boolean(left != right)),
            Operator::Contains => contains(left, right).map(Value::Boolean),
            Operator::IsIn => contains(right, left).map(Value::Boolean),
            Operator::IsNotIn => contains(right, left).map(|found| Value::Boolean(!found)),
            Operator::Not => Err(EvalError::TypeError("'not' takes one operand".into())),
        }
    }
}

fn contains(container: &Value, item: &Value) -> Result<bool, EvalError> {
    match (container, item) {
        (Value::String(haystack), Value::String(needle)) => Ok(haystack.contains(needle.as_str())),
        (Value::Array(items), item) => Ok(items.contains(item)),
        (a, b) => Err(mismatch("check containment between", a, b)),
    }
}

fn numbers(
    left: &Value,
    right: &Value,
    verb: &str,
    op: impl FnOnce(Decimal, Decimal) -> Result<Value, EvalError>,
) -> Result<Value, EvalError> {
    match (left.as_number(), right.as_number()) {
        (Some(a), Some(b)) => op(a, b),
        _ => Err(mismatch(verb, left, right)),
    }
}

fn checked(result: Option<Decimal>) -> Result<Value, EvalError> {
    result.map(Value::Number).ok_or(EvalError::Overflow)
}

fn mismatch(verb: &str, left: &Value, right: &Value) -> EvalError {
    EvalError::TypeError(format!(
        "I can't {verb} a {} and a {}",
        left.type_name(),
        right.type_name()
    ))
}

fn type_error(verb: &str, value: &Value) -> EvalError {
    EvalError::TypeError(format!("I can't {verb} a {}", value.type_name()))
}

fn unsupported(expr: &Expr) -> EvalError {
    let name = expr
        .dotted()
        .or_else(|| expr.root_name().map(str::to_string))
        .unwrap_or_else(|| "this expression".to_string());
    EvalError::Unsupported(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(code: &str) -> Result<Value, EvalError> {
        Evaluator::new().eval_code(code)
    }

    #[test]
    fn test_decimal_arithmetic() {
        assert_eq!(
            eval(r#"Operations["+"](0.1,0.2)"#).unwrap(),
            Value::Number(Decimal::new(3, 1))
        );
    }

    #[test]
    fn test_comparison_sets_it() {
        let mut evaluator = Evaluator::new();
        evaluator.eval_code(r#"Operations["<"](3,4)"#).unwrap();
        assert_eq!(evaluator.it(), &Value::Number(Decimal::new(3, 0)));
    }

    #[test]
    fn test_error_fragment_is_raised() {
        assert_eq!(
            eval(r#"Errors.create("syntax","bad")"#).unwrap_err(),
            EvalError::Raised {
                category: "syntax".into(),
                message: "bad".into()
            }
        );
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(eval(r#"Operations["/"](1,0)"#).unwrap_err(), EvalError::DivisionByZero);
    }

    #[test]
    fn test_story_state_is_unsupported() {
        let err = eval(r#"VarRef.create(State.variables,"a").get()"#).unwrap_err();
        assert!(matches!(err, EvalError::Unsupported(_)));
    }

    #[test]
    fn test_and_needs_booleans() {
        assert!(matches!(
            eval(r#"Operations["and"](true,1)"#),
            Err(EvalError::TypeError(_))
        ));
    }
}
