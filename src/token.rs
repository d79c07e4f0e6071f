use std::fmt;

use crate::token_type::TokenType;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub typ: TokenType,
    pub lexeme: String,
    /// Parsed value for string and number tokens, `Nil` for everything else.
    pub literal: Value,
    pub line: usize,
}

impl Token {
    pub fn new(typ: TokenType, lexeme: impl Into<String>, literal: Value, line: usize) -> Self {
        Token {
            typ,
            lexeme: lexeme.into(),
            literal,
            line,
        }
    }

    pub fn eof(line: usize) -> Self {
        Token::new(TokenType::Eof, "", Value::Nil, line)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lexeme)
    }
}
