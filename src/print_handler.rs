//! Destination for the output of `print` statements.

use std::io::{self, Write};

/// Line-oriented text sink owned by the interpreter.
#[derive(Debug, Default)]
pub enum PrintHandler {
    /// Writes to stdout (default).
    #[default]
    Stdout,
    /// Captures into a buffer, for tests and embedders.
    Buffer(String),
}

impl PrintHandler {
    pub fn buffer() -> Self {
        PrintHandler::Buffer(String::new())
    }

    /// Print a line (with newline).
    pub fn println(&mut self, msg: &str) {
        match self {
            PrintHandler::Stdout => {
                // a closed stdout (broken pipe) must not bring the interpreter down
                if let Err(error) = writeln!(io::stdout().lock(), "{msg}") {
                    tracing::debug!(%error, "stdout write failed");
                }
            }
            PrintHandler::Buffer(buf) => {
                buf.push_str(msg);
                buf.push('\n');
            }
        }
    }

    /// Captured output. Always empty for stdout.
    pub fn output(&self) -> &str {
        match self {
            PrintHandler::Stdout => "",
            PrintHandler::Buffer(buf) => buf,
        }
    }

    pub fn clear(&mut self) {
        if let PrintHandler::Buffer(buf) = self {
            buf.clear();
        }
    }
}
