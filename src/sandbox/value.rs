use std::fmt;

use rust_decimal::Decimal;

/// A runtime value produced by evaluating compiled code.
///
/// Numbers are decimals, so `0.1 + 0.2` is exactly `0.3`.
///
/// # Examples
///
/// ```
/// use quill_lang::sandbox::Value;
/// use rust_decimal::Decimal;
///
/// let n = Value::Number(Decimal::new(-7, 0));
/// assert_eq!(n.to_string(), "-7");
/// assert_eq!(Value::String("hi".into()).type_name(), "string");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// Result of an empty expression
    #[default]
    Undefined,

    Null,

    Boolean(bool),

    Number(Decimal),

    String(String),

    Array(Vec<Value>),

    /// A colour literal, lowercased (`#ff0000`, `red`)
    Colour(String),

    /// Hook source used as data
    Hook(String),

    /// A value marked for spreading into a surrounding argument list
    Spread(Box<Value>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "nothing",
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Colour(_) => "colour",
            Value::Hook(_) => "hook",
            Value::Spread(_) => "spread",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => Ok(()),
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{}", n.normalize()),
            Value::String(s) => f.write_str(s),
            Value::Array(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "(a: {})", parts.join(", "))
            }
            Value::Colour(c) => f.write_str(c),
            Value::Hook(source) => write!(f, "[{source}]"),
            Value::Spread(inner) => write!(f, "...{inner}"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<Decimal> for Value {
    fn from(n: Decimal) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}
