//! Pipeline driver: wires scanner, parser, resolver, and interpreter
//! together and owns the error flags that decide process exit codes.
//!
//! Static errors (scan/parse/resolve) and runtime errors are tracked
//! separately: the REPL clears the runtime flag between lines without
//! touching the static gate, and the file runner maps them to the
//! conventional exit codes (65 static, 70 runtime).

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

use log::info;

use crate::error::{LoxError, Result};
use crate::expr::ExprId;
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::Scanner;
use crate::token::Token;

/// Exit code for static (scan/parse/resolve) errors.
pub const EXIT_STATIC_ERROR: i32 = 65;

/// Exit code for an uncaught runtime error.
pub const EXIT_RUNTIME_ERROR: i32 = 70;

pub struct Lox {
    interpreter: Interpreter,
    next_expr_id: ExprId,
    had_error: bool,
    had_runtime_error: bool,
}

impl Lox {
    pub fn new() -> Self {
        Lox {
            interpreter: Interpreter::new(),
            next_expr_id: 0,
            had_error: false,
            had_runtime_error: false,
        }
    }

    /// Run a script file once.  Returns the process exit code.
    pub fn run_file(&mut self, path: &Path) -> Result<i32> {
        let bytes = fs::read(path)?;
        let source = String::from_utf8(bytes)?;

        self.run(&source);

        if self.had_error {
            return Ok(EXIT_STATIC_ERROR);
        }
        if self.had_runtime_error {
            return Ok(EXIT_RUNTIME_ERROR);
        }

        Ok(0)
    }

    /// Interactive prompt.  Errors are reported and forgotten; the REPL
    /// itself always exits cleanly on EOF.
    pub fn run_prompt(&mut self) -> Result<()> {
        println!("loxide {}", env!("CARGO_PKG_VERSION"));

        let stdin = io::stdin();
        let mut line = String::new();

        loop {
            print!("> ");
            io::stdout().flush()?;

            line.clear();
            let read = stdin.lock().read_line(&mut line)?;
            if read == 0 {
                break;
            }

            self.run(line.trim_end());

            self.had_error = false;
            self.had_runtime_error = false;
        }

        Ok(())
    }

    /// Scan, parse, resolve, interpret.  Each pass reports every diagnostic
    /// it produced; a pass with errors stops the pipeline before the next
    /// one runs.
    pub fn run(&mut self, source: &str) {
        info!("Running {} bytes of source", source.len());

        let mut tokens: Vec<Token> = Vec::new();
        for result in Scanner::new(source.as_bytes()) {
            match result {
                Ok(token) => tokens.push(token),

                Err(e) => self.report_static(&e),
            }
        }

        let mut parser = Parser::new(tokens, self.next_expr_id);
        let (statements, parse_errors) = parser.parse();
        self.next_expr_id = parser.next_expr_id();

        for e in &parse_errors {
            self.report_static(e);
        }

        if self.had_error {
            return;
        }

        let (locals, resolve_errors) = Resolver::new().resolve(&statements);

        for e in &resolve_errors {
            self.report_static(e);
        }

        if self.had_error {
            return;
        }

        self.interpreter.add_locals(locals);

        if let Err(e) = self.interpreter.interpret(&statements) {
            eprintln!("{}", e);
            self.had_runtime_error = true;
        }
    }

    fn report_static(&mut self, error: &LoxError) {
        eprintln!("{}", error);
        self.had_error = true;
    }
}

impl Default for Lox {
    fn default() -> Self {
        Self::new()
    }
}
