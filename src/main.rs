use std::env;
use std::fs;
use std::io::{self, BufRead, Write};
use std::process;
use std::sync::Once;

use vlix::{ConsoleReporter, Interpreter};

static TRACING_INIT: Once = Once::new();

/// Enable with `RUST_LOG=vlix=debug` or `RUST_LOG=vlix=trace`.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr).with_target(true))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}

fn main() {
    init_tracing();
    let args: Vec<String> = env::args().collect();

    if args.len() > 2 {
        println!("Usage: vlix [script]");
        process::exit(64);
    } else if args.len() == 2 {
        run_file(&args[1]);
    } else if let Err(error) = run_prompt() {
        eprintln!("Error reading input: {error}");
        process::exit(74);
    }
}

fn run_file(path: &str) {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(error) => {
            eprintln!("Error reading '{path}': {error}");
            process::exit(66);
        }
    };

    let mut interpreter = Interpreter::new();
    let mut reporter = ConsoleReporter::new();
    vlix::run(&text, &mut interpreter, &mut reporter);

    if reporter.had_error {
        process::exit(65);
    }
    if reporter.had_runtime_error {
        process::exit(70);
    }
}

fn run_prompt() -> io::Result<()> {
    let mut interpreter = Interpreter::new();
    let mut reporter = ConsoleReporter::new();
    let stdin = io::stdin();
    let mut input = String::new();

    loop {
        print!("> ");
        io::stdout().flush()?;

        input.clear();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }
        vlix::run(&input, &mut interpreter, &mut reporter);
        reporter.reset();
    }
    Ok(())
}
