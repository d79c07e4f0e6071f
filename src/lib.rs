//! Tree-walking interpreter for a small dynamically typed scripting language.
//!
//! Source is scanned into tokens, parsed into statements and evaluated
//! directly by walking the tree; see [`run`].

pub mod ast_printer;
pub mod environment;
pub mod error;
pub mod expr;
pub mod interpreter;
pub mod parser;
pub mod print_handler;
pub mod reporter;
pub mod scanner;
pub mod stmt;
pub mod token;
pub mod token_type;
pub mod value;

pub use error::{ParseError, RuntimeError, ScanError};
pub use interpreter::Interpreter;
pub use print_handler::PrintHandler;
pub use reporter::{ConsoleReporter, Reporter};
pub use value::Value;

use scanner::Scanner;

/// Scans, parses and interprets `source`.
///
/// Static errors are all reported and nothing runs when any occurred; a runtime
/// error stops the batch. Bindings made by `source` stay in `interpreter`.
pub fn run(source: &str, interpreter: &mut Interpreter, reporter: &mut dyn Reporter) {
    let (tokens, scan_errors) = Scanner::new(source).scan_tokens();
    for error in &scan_errors {
        reporter.error(error.line, "", error.message);
    }

    let statements = match parser::parse(tokens) {
        Ok(statements) => statements,
        Err(errors) => {
            for error in &errors {
                reporter.error(error.token.line, &error.location(), error.message);
            }
            return;
        }
    };

    if scan_errors.is_empty() {
        interpreter.interpret(&statements, reporter);
    }
}
