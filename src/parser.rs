use std::iter::Peekable;
use std::vec::IntoIter;

use crate::error::ParseError;
use crate::expr::Expr;
use crate::stmt::Stmt;
use crate::token::Token;
use crate::token_type::TokenType::{self, *};
use crate::value::Value;

// parameters: parser, and a series of TokenType variants separated by |
// return option of the consumed token
macro_rules! match_types {
    ($parser:expr, $( $variant:pat_param )|* ) => {
        $parser.tokens.next_if(|token| matches!(token.typ, $( $variant )|*))
    };
}

type ParseResult<T> = Result<T, ParseError>;

/// Parses a scanned token stream (ending in `Eof`) into statements.
///
/// Every syntax error in the stream is returned, not just the first one.
pub fn parse(tokens: Vec<Token>) -> Result<Vec<Stmt>, Vec<ParseError>> {
    let mut parser = Parser::new(tokens);

    let mut statements = Vec::new();
    while !parser.is_at_end() {
        if let Some(stmt) = parser.declaration() {
            statements.push(stmt);
        }
    }

    if parser.errors.is_empty() {
        Ok(statements)
    } else {
        tracing::debug!(count = parser.errors.len(), "parse failed");
        Err(parser.errors)
    }
}

struct Parser {
    tokens: Peekable<IntoIter<Token>>,
    /// Line of the last token, used for a synthesized `Eof`.
    line_count: usize,
    errors: Vec<ParseError>,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        let line_count = tokens.last().map_or(1, |token| token.line);
        Parser {
            tokens: tokens.into_iter().peekable(),
            line_count,
            errors: Vec::new(),
        }
    }

    fn is_at_end(&mut self) -> bool {
        self.tokens.peek().map_or(true, |token| token.typ == Eof)
    }

    fn check(&mut self, typ: TokenType) -> bool {
        self.tokens.peek().is_some_and(|token| token.typ == typ)
    }

    fn declaration(&mut self) -> Option<Stmt> {
        let result = if match_types!(self, Var).is_some() {
            self.var_declaration()
        } else {
            self.statement()
        };

        match result {
            Ok(stmt) => Some(stmt),
            Err(error) => {
                self.errors.push(error);
                self.synchronize();
                None
            }
        }
    }

    fn var_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(Identifier, "Expected variable name.")?;

        let initializer = match match_types!(self, Equal) {
            Some(_) => Some(Box::new(self.expression()?)),
            None => None,
        };

        self.consume(Semicolon, "Expected ';' after variable declaration.")?;
        Ok(Stmt::Var { name, initializer })
    }

    fn statement(&mut self) -> ParseResult<Stmt> {
        if match_types!(self, Print).is_some() {
            return self.print_statement();
        }
        if match_types!(self, LeftBrace).is_some() {
            return Ok(Stmt::Block {
                statements: self.block()?,
            });
        }
        self.expression_statement()
    }

    fn block(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut statements = Vec::new();

        while !self.check(RightBrace) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        self.consume(RightBrace, "Expected '}' after block.")?;
        Ok(statements)
    }

    fn print_statement(&mut self) -> ParseResult<Stmt> {
        let value = self.expression()?;
        self.consume(Semicolon, "Expected ';' after value.")?;
        Ok(Stmt::Print {
            expression: Box::new(value),
        })
    }

    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let expression = self.expression()?;
        self.consume(Semicolon, "Expected ';' after expression.")?;
        Ok(Stmt::Expression {
            expression: Box::new(expression),
        })
    }

    fn expression(&mut self) -> ParseResult<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.equality()?;

        match match_types!(self, Equal) {
            Some(equals) => {
                let value = self.assignment()?;

                match expr {
                    Expr::Variable { name } => Ok(Expr::Assign {
                        name,
                        value: Box::new(value),
                    }),
                    _ => {
                        // reported, but the parser is not confused, so keep going
                        self.errors
                            .push(ParseError::new(&equals, "Invalid assignment target."));
                        Ok(expr)
                    }
                }
            }
            None => Ok(expr),
        }
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        let mut expr = self.comparison()?;

        while let Some(operator) = match_types!(self, BangEqual | EqualEqual) {
            let right = self.comparison()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        let mut expr = self.term()?;

        while let Some(operator) = match_types!(self, Greater | GreaterEqual | Less | LessEqual) {
            let right = self.term()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn term(&mut self) -> ParseResult<Expr> {
        let mut expr = self.factor()?;

        while let Some(operator) = match_types!(self, Minus | Plus) {
            let right = self.factor()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn factor(&mut self) -> ParseResult<Expr> {
        let mut expr = self.unary()?;

        while let Some(operator) = match_types!(self, Slash | Star) {
            let right = self.unary()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        if let Some(operator) = match_types!(self, Bang | Minus) {
            let right = self.unary()?;
            return Ok(Expr::Unary {
                operator,
                right: Box::new(right),
            });
        }

        self.primary()
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        if let Some(token) = match_types!(self, False | True | Nil | Number | StringToken) {
            let value = match token.typ {
                False => Value::Bool(false),
                True => Value::Bool(true),
                Nil => Value::Nil,
                _ => token.literal,
            };
            return Ok(Expr::LiteralExpr { value });
        }

        if let Some(name) = match_types!(self, Identifier) {
            return Ok(Expr::Variable { name });
        }

        if match_types!(self, LeftParen).is_some() {
            let expression = self.expression()?;
            self.consume(RightParen, "Expected ')' after expression.")?;
            return Ok(Expr::Grouping {
                expression: Box::new(expression),
            });
        }

        Err(self.error("Expected expression."))
    }

    fn consume(&mut self, typ: TokenType, message: &'static str) -> ParseResult<Token> {
        match self.tokens.next_if(|token| token.typ == typ) {
            Some(token) => Ok(token),
            None => Err(self.error(message)),
        }
    }

    /// Error at the next token, without consuming it.
    fn error(&mut self, message: &'static str) -> ParseError {
        match self.tokens.peek() {
            Some(token) => ParseError::new(token, message),
            None => ParseError::new(&Token::eof(self.line_count), message),
        }
    }

    /// Discards tokens until the likely start of the next statement.
    fn synchronize(&mut self) {
        while let Some(token) = self.tokens.next_if(|token| token.typ != Eof) {
            if token.typ == Semicolon {
                return;
            }
            if let Some(next) = self.tokens.peek() {
                match next.typ {
                    Class | Fun | Var | For | If | While | Print | Return => return,
                    _ => {}
                }
            }
        }
    }
}
