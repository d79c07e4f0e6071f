use crate::error::RuntimeError;

/// Receives the errors a run produces. The core never writes diagnostics itself.
pub trait Reporter {
    /// A static error found while scanning or parsing.
    fn error(&mut self, line: usize, location: &str, message: &str);

    /// The runtime error that aborted a batch of statements.
    fn runtime_error(&mut self, error: &RuntimeError);
}

/// Reports to stderr and remembers what kind of errors it saw.
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    pub had_error: bool,
    pub had_runtime_error: bool,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget previous errors, used between REPL lines.
    pub fn reset(&mut self) {
        self.had_error = false;
        self.had_runtime_error = false;
    }
}

impl Reporter for ConsoleReporter {
    fn error(&mut self, line: usize, location: &str, message: &str) {
        eprintln!("[line {line}] Error{location}: {message}");
        self.had_error = true;
    }

    fn runtime_error(&mut self, error: &RuntimeError) {
        eprintln!("{error}\n[line {}]", error.line());
        self.had_runtime_error = true;
    }
}
