//! The runtime names generated code refers to, and the emitters that
//! build code text around them.

use crate::ast::Operator;
use crate::compiler::Expect;

pub const STATE_VARIABLES: &str = "State.variables";
pub const TEMP_VARIABLES: &str = "section.tempVariables";
pub const SECTION: &str = "section";

/// Category tag of an error fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The source could not be understood
    Syntax,
    /// The source was understood but an operation lacks what it needs
    Operation,
}

impl ErrorKind {
    pub fn tag(self) -> &'static str {
        match self {
            ErrorKind::Syntax => "syntax",
            ErrorKind::Operation => "operation",
        }
    }
}

/// A JSON string literal, which is also a valid literal in generated code.
pub fn quote(text: &str) -> String {
    serde_json::Value::String(text.to_owned()).to_string()
}

pub fn error(kind: ErrorKind, message: &str) -> String {
    format!("Errors.create({},{})", quote(kind.tag()), quote(message))
}

/// Reference to `object[property]`; `property` is already code.
pub fn var_ref(object: &str, property: &str) -> String {
    format!("VarRef.create({object},{property})")
}

pub fn named_ref(object: &str, name: &str) -> String {
    var_ref(object, &quote(name))
}

pub fn computed_ref(object: &str, property: &str) -> String {
    var_ref(object, &format!("VarRef.computed({property})"))
}

/// Read a reference when a value is wanted.
pub fn read(reference: String, expect: Expect) -> String {
    match expect {
        Expect::Value => format!("{reference}.get()"),
        Expect::Reference => reference,
    }
}

pub fn identifier(name: &str) -> String {
    format!("Operations.Identifiers.{name}")
}

pub fn it() -> String {
    identifier("it")
}

pub fn operation(op: Operator, operands: &[&str]) -> String {
    format!("Operations[{}]({})", quote(op.tag()), operands.join(","))
}

pub fn spread(operand: &str) -> String {
    format!("Operations.spread({operand})")
}

pub fn colour(value: &str) -> String {
    format!("Operations.colour({})", quote(value))
}

pub fn hook(source: &str) -> String {
    format!("Operations.hook({})", quote(source))
}

/// `callee` is a quoted macro name or code producing a custom macro.
pub fn macro_call(callee: &str, args: &str) -> String {
    if args.is_empty() {
        format!("Macros.run({callee},[{SECTION}])")
    } else {
        format!("Macros.run({callee},[{SECTION},{args}])")
    }
}

pub fn assignment(dest: &str, src: &str, keyword: &str) -> String {
    format!("AssignmentRequest.create({dest},{src},{})", quote(keyword))
}

pub fn lambda(subject: &str, clause: &str, body: &str) -> String {
    format!("Lambda.create({subject},{},{body})", quote(clause))
}
