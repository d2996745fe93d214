use std::mem;

use rust_decimal::Decimal;

use super::lexer::{Lexer, Token};

/// Generated code, parsed.
///
/// Only the shapes the compiler emits are covered: literals, names,
/// member and index access, calls, array literals and parenthesised
/// comma sequences.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Undefined,
    Null,
    Boolean(bool),
    Number(Decimal),
    String(String),
    Identifier(String),
    Array(Vec<Expr>),
    /// `(a, b)`: every item is evaluated, the last one is the result
    Sequence(Vec<Expr>),
    Member {
        object: Box<Expr>,
        name: String,
    },
    Index {
        object: Box<Expr>,
        key: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
}

impl Expr {
    /// `Operations.Identifiers.it` style dotted path, if this is one.
    pub fn dotted(&self) -> Option<String> {
        match self {
            Expr::Identifier(name) => Some(name.clone()),
            Expr::Member { object, name } => object.dotted().map(|base| format!("{base}.{name}")),
            _ => None,
        }
    }

    /// The name at the bottom of an access or call chain.
    pub fn root_name(&self) -> Option<&str> {
        match self {
            Expr::Identifier(name) => Some(name),
            Expr::Member { object, .. } | Expr::Index { object, .. } => object.root_name(),
            Expr::Call { callee, .. } => callee.root_name(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("Unexpected character '{ch}' at {position}")]
    UnexpectedChar { ch: char, position: usize },

    #[error("Unterminated string starting at {position}")]
    UnterminatedString { position: usize },

    #[error("Invalid string at {position}: {message}")]
    InvalidString { position: usize, message: String },

    #[error("Invalid number '{text}' at {position}")]
    InvalidNumber { position: usize, text: String },

    #[error("Expected {expected}, found {found} at {position}")]
    UnexpectedToken {
        expected: String,
        found: String,
        position: usize,
    },
}

pub struct Parser {
    lexer: Lexer,
    current_token: Token,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Result<Self, ParseError> {
        let current_token = lexer.next_token()?;
        Ok(Parser {
            lexer,
            current_token,
        })
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.current_token = self.lexer.next_token()?;
        Ok(())
    }

    fn check(&self, token: &Token) -> bool {
        mem::discriminant(&self.current_token) == mem::discriminant(token)
    }

    fn expect(&mut self, expected: Token, what: &str) -> Result<(), ParseError> {
        if !self.check(&expected) {
            return Err(self.unexpected(what));
        }
        self.advance()
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::UnexpectedToken {
            expected: expected.to_string(),
            found: format!("{:?}", self.current_token),
            position: self.lexer.position(),
        }
    }

    /// Parse a whole program: a possibly empty comma sequence.
    pub fn parse_program(&mut self) -> Result<Vec<Expr>, ParseError> {
        if self.check(&Token::Eof) {
            return Ok(Vec::new());
        }
        let items = self.parse_list(&Token::Eof)?;
        if !self.check(&Token::Eof) {
            return Err(self.unexpected("end of input"));
        }
        Ok(items)
    }

    /// Comma separated expressions up to (not including) `end`.
    fn parse_list(&mut self, end: &Token) -> Result<Vec<Expr>, ParseError> {
        let mut items = Vec::new();
        while !self.check(end) {
            items.push(self.parse_access()?);
            if !self.check(end) {
                self.expect(Token::Comma, "','")?;
            }
        }
        Ok(items)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let expr = match mem::replace(&mut self.current_token, Token::Eof) {
            Token::Number(n) => Expr::Number(n),
            Token::String(s) => Expr::String(s),
            Token::Identifier(name) => match name.as_str() {
                "true" => Expr::Boolean(true),
                "false" => Expr::Boolean(false),
                "null" => Expr::Null,
                "undefined" => Expr::Undefined,
                _ => Expr::Identifier(name),
            },
            Token::LParen => {
                self.advance()?;
                let items = self.parse_list(&Token::RParen)?;
                self.expect(Token::RParen, "')'")?;
                return Ok(Expr::Sequence(items));
            }
            Token::LBracket => {
                self.advance()?;
                let items = self.parse_list(&Token::RBracket)?;
                self.expect(Token::RBracket, "']'")?;
                return Ok(Expr::Array(items));
            }
            token => {
                self.current_token = token;
                return Err(self.unexpected("a value"));
            }
        };
        self.advance()?;
        Ok(expr)
    }

    /// Member access, indexing and calls, applied left to right.
    fn parse_access(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            if self.check(&Token::Dot) {
                self.advance()?;
                let Token::Identifier(name) = mem::replace(&mut self.current_token, Token::Eof) else {
                    return Err(self.unexpected("a property name"));
                };
                self.advance()?;
                expr = Expr::Member {
                    object: Box::new(expr),
                    name,
                };
            } else if self.check(&Token::LBracket) {
                self.advance()?;
                let key = self.parse_access()?;
                self.expect(Token::RBracket, "']'")?;
                expr = Expr::Index {
                    object: Box::new(expr),
                    key: Box::new(key),
                };
            } else if self.check(&Token::LParen) {
                self.advance()?;
                let args = self.parse_list(&Token::RParen)?;
                self.expect(Token::RParen, "')'")?;
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }
}

/// Parse generated code.
pub fn parse(code: &str) -> Result<Vec<Expr>, ParseError> {
    Parser::new(Lexer::new(code))?.parse_program()
}
