// File: src/interpreter/native_functions/mod.rs
//
// Built-in functions available to every Fun program.
//
// Built-ins are consulted only after user function lookup fails, so a user
// definition with the same name always wins.

pub mod io;

use crate::errors::EvalError;
use std::io::Write;

/// Names of all built-in functions
pub const BUILTIN_NAMES: &[&str] = &["println"];

/// Main dispatcher that routes native function calls to their category module.
/// Returns None when no built-in has that name.
pub fn call_native_function(
    out: &mut dyn Write,
    name: &str,
    arg_values: &[i32],
) -> Option<Result<i32, EvalError>> {
    if let Some(result) = io::handle(out, name, arg_values) {
        return Some(result);
    }

    None
}
