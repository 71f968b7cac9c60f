// File: src/lib.rs
//
// Library interface for the Fun interpreter.
// Exposes the AST, front end, interpreter and driver modules for the binary,
// integration tests and external use.

pub mod ast;
pub mod config;
pub mod errors;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod test_runner;

pub use errors::{Error, Result};

use interpreter::{Flow, Interpreter};
use std::io::Write;

/// Parses `source` and runs it in a fresh interpreter with default settings
pub fn run_source(source: &str, out: &mut dyn Write) -> Result<Flow> {
    let file = parser::parse_source(source)?;
    Ok(Interpreter::new().run(&file, out)?)
}
