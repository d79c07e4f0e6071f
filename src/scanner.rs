use lazy_static::lazy_static;
use std::collections::HashMap;
use std::iter::Peekable;
use std::mem;
use std::str::Chars;

use crate::error::ScanError;
use crate::token::Token;
use crate::token_type::TokenType::{self, *};
use crate::value::Value;

lazy_static! {
    static ref KEYWORDS: HashMap<&'static str, TokenType> = HashMap::from([
        ("and", And),
        ("class", Class),
        ("else", Else),
        ("false", False),
        ("for", For),
        ("fun", Fun),
        ("if", If),
        ("nil", Nil),
        ("or", Or),
        ("print", Print),
        ("return", Return),
        ("super", Super),
        ("this", This),
        ("true", True),
        ("var", Var),
        ("while", While),
    ]);
}

pub struct Scanner<'a> {
    source: Peekable<Chars<'a>>,
    tokens: Vec<Token>,
    errors: Vec<ScanError>,
    /// Lexeme of the token being scanned.
    text: String,
    line: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Scanner {
            source: source.chars().peekable(),
            tokens: Vec::new(),
            errors: Vec::new(),
            text: String::new(),
            line: 1,
        }
    }

    /// Scans the whole source. The token list always ends with `Eof`, even
    /// when errors were found.
    pub fn scan_tokens(mut self) -> (Vec<Token>, Vec<ScanError>) {
        while let Some(c) = self.source.next() {
            self.text.push(c);
            self.scan_token(c);
        }

        self.tokens.push(Token::eof(self.line));
        (self.tokens, self.errors)
    }

    fn scan_token(&mut self, c: char) {
        match c {
            '(' => self.add_token(LeftParen),
            ')' => self.add_token(RightParen),
            '{' => self.add_token(LeftBrace),
            '}' => self.add_token(RightBrace),
            ',' => self.add_token(Comma),
            '.' => self.add_token(Dot),
            '-' => self.add_token(Minus),
            '+' => self.add_token(Plus),
            ';' => self.add_token(Semicolon),
            '*' => self.add_token(Star),
            '!' => {
                let typ = if self.match_next('=') { BangEqual } else { Bang };
                self.add_token(typ)
            }
            '=' => {
                let typ = if self.match_next('=') { EqualEqual } else { Equal };
                self.add_token(typ)
            }
            '<' => {
                let typ = if self.match_next('=') { LessEqual } else { Less };
                self.add_token(typ)
            }
            '>' => {
                let typ = if self.match_next('=') { GreaterEqual } else { Greater };
                self.add_token(typ)
            }
            '/' => {
                if self.match_next('/') {
                    while self.source.next_if(|&c| c != '\n').is_some() {}
                    self.text.clear();
                } else {
                    self.add_token(Slash);
                }
            }
            ' ' | '\r' | '\t' => self.text.clear(),
            '\n' => {
                self.line += 1;
                self.text.clear();
            }
            '"' => self.scan_string(),
            c if c.is_ascii_digit() => self.scan_number(),
            c if is_alpha(c) => self.scan_identifier(),
            _ => self.error("Unexpected character."),
        }
    }

    fn scan_string(&mut self) {
        while let Some(c) = self.source.next_if(|&c| c != '"') {
            if c == '\n' {
                self.line += 1;
            }
            self.text.push(c);
        }

        // closing "
        if self.source.next().is_none() {
            self.error("Unterminated string.");
            return;
        }

        let value = self.text[1..].to_owned();
        self.text.push('"');
        self.add_literal(StringToken, Value::Str(value));
    }

    fn scan_number(&mut self) {
        self.advance_digits();

        // a fraction needs a digit after the dot, so peek two characters ahead
        if self.source.peek() == Some(&'.') {
            let mut lookahead = self.source.clone();
            lookahead.next();
            if lookahead.peek().is_some_and(char::is_ascii_digit) {
                self.text.push('.');
                self.source.next();
                self.advance_digits();
            }
        }

        match self.text.parse::<f64>() {
            Ok(number) => self.add_literal(Number, Value::Number(number)),
            Err(_) => self.error("Invalid number."),
        }
    }

    fn advance_digits(&mut self) {
        while let Some(c) = self.source.next_if(char::is_ascii_digit) {
            self.text.push(c);
        }
    }

    fn scan_identifier(&mut self) {
        while let Some(c) = self.source.next_if(|&c| is_alpha(c) || c.is_ascii_digit()) {
            self.text.push(c);
        }

        let typ = *KEYWORDS.get(self.text.as_str()).unwrap_or(&Identifier);
        self.add_token(typ);
    }

    fn match_next(&mut self, expected: char) -> bool {
        match self.source.next_if_eq(&expected) {
            Some(c) => {
                self.text.push(c);
                true
            }
            None => false,
        }
    }

    fn add_token(&mut self, typ: TokenType) {
        self.add_literal(typ, Value::Nil);
    }

    fn add_literal(&mut self, typ: TokenType, literal: Value) {
        let lexeme = mem::take(&mut self.text);
        self.tokens.push(Token {
            typ,
            lexeme,
            literal,
            line: self.line,
        });
    }

    fn error(&mut self, message: &'static str) {
        self.errors.push(ScanError {
            line: self.line,
            message,
        });
        self.text.clear();
    }
}

fn is_alpha(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}
