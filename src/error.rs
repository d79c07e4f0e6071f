use thiserror::Error;

use crate::token::Token;
use crate::token_type::TokenType;

/// A failure raised while evaluating a program.
///
/// Both kinds carry the token they originate from so the reporter can point
/// at a source line.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// An operator received an operand of the wrong kind.
    #[error("{message}")]
    Type { token: Token, message: &'static str },
    /// A lookup or assignment named a variable no scope in the chain declares.
    #[error("Undefined variable '{}'.", .token.lexeme)]
    UndefinedVariable { token: Token },
}

impl RuntimeError {
    pub fn type_error(token: &Token, message: &'static str) -> Self {
        RuntimeError::Type {
            token: token.clone(),
            message,
        }
    }

    pub fn undefined_variable(token: &Token) -> Self {
        RuntimeError::UndefinedVariable {
            token: token.clone(),
        }
    }

    pub fn token(&self) -> &Token {
        match self {
            RuntimeError::Type { token, .. } | RuntimeError::UndefinedVariable { token } => token,
        }
    }

    pub fn line(&self) -> usize {
        self.token().line
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[line {line}] Error: {message}")]
pub struct ScanError {
    pub line: usize,
    pub message: &'static str,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("[line {}] Error{}: {message}", .token.line, location(.token))]
pub struct ParseError {
    pub token: Token,
    pub message: &'static str,
}

impl ParseError {
    pub fn new(token: &Token, message: &'static str) -> Self {
        ParseError {
            token: token.clone(),
            message,
        }
    }

    /// Where the error happened, as it appears after "Error" in a report.
    pub fn location(&self) -> String {
        location(&self.token)
    }
}

fn location(token: &Token) -> String {
    match token.typ {
        TokenType::Eof => " at end".to_owned(),
        _ => format!(" at '{}'", token.lexeme),
    }
}
