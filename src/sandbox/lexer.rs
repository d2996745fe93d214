//! Tokens of generated code.

use std::str::FromStr;

use rust_decimal::Decimal;

use super::parser::ParseError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Identifier(String),
    Number(Decimal),
    String(String),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Eof,
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while self.current_char().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' || ch == '$' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    /// Read a JSON string literal, escapes included, and decode it.
    fn read_string(&mut self) -> Result<String, ParseError> {
        let start = self.position;
        let mut raw = String::from('"');
        self.advance();

        while let Some(ch) = self.current_char() {
            raw.push(ch);
            self.advance();
            match ch {
                '"' => {
                    return serde_json::from_str(&raw).map_err(|e| ParseError::InvalidString {
                        position: start,
                        message: e.to_string(),
                    });
                }
                '\\' => {
                    if let Some(escaped) = self.current_char() {
                        raw.push(escaped);
                        self.advance();
                    }
                }
                _ => {}
            }
        }

        Err(ParseError::UnterminatedString { position: start })
    }

    fn read_number(&mut self) -> Result<Decimal, ParseError> {
        let start = self.position;
        let mut number = String::new();
        let mut seen_dot = false;

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else if ch == '.' && !seen_dot && self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) {
                seen_dot = true;
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        Decimal::from_str(&number).map_err(|_| ParseError::InvalidNumber {
            position: start,
            text: number,
        })
    }

    pub fn next_token(&mut self) -> Result<Token, ParseError> {
        self.skip_whitespace();

        let token = match self.current_char() {
            None => Token::Eof,
            Some('"') => return self.read_string().map(Token::String),
            Some(ch) if ch.is_ascii_digit() => return self.read_number().map(Token::Number),
            Some(ch) if ch.is_alphabetic() || ch == '_' || ch == '$' => {
                return Ok(Token::Identifier(self.read_identifier()));
            }
            Some(ch) => {
                let token = match ch {
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    '[' => Token::LBracket,
                    ']' => Token::RBracket,
                    ',' => Token::Comma,
                    '.' => Token::Dot,
                    other => {
                        return Err(ParseError::UnexpectedChar {
                            ch: other,
                            position: self.position,
                        });
                    }
                };
                self.advance();
                token
            }
        };
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(input);
        let mut out = Vec::new();
        loop {
            let token = lexer.next_token().unwrap();
            if token == Token::Eof {
                break;
            }
            out.push(token);
        }
        out
    }

    #[test]
    fn test_operation_call() {
        assert_eq!(
            tokens(r#"Operations["+"](1,2.5)"#),
            vec![
                Token::Identifier("Operations".into()),
                Token::LBracket,
                Token::String("+".into()),
                Token::RBracket,
                Token::LParen,
                Token::Number(Decimal::new(1, 0)),
                Token::Comma,
                Token::Number(Decimal::new(25, 1)),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn test_string_escapes_decoded() {
        assert_eq!(tokens(r#""a\"b\n""#), vec![Token::String("a\"b\n".into())]);
    }

    #[test]
    fn test_unterminated_string() {
        let mut lexer = Lexer::new(r#""abc"#);
        assert!(matches!(
            lexer.next_token(),
            Err(ParseError::UnterminatedString { position: 0 })
        ));
    }
}
