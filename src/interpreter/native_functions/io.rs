// File: src/interpreter/native_functions/io.rs
//
// I/O-related native functions (println)

use crate::errors::EvalError;
use std::io::Write;

/// Handle I/O-related function calls
/// Returns Some(result) if the function was handled, None if not recognized
pub fn handle(
    out: &mut dyn Write,
    name: &str,
    arg_values: &[i32],
) -> Option<Result<i32, EvalError>> {
    let result = match name {
        "println" => println(out, arg_values),
        _ => return None,
    };
    Some(result)
}

/// Writes the arguments space-separated on one line. Always yields 0.
fn println(out: &mut dyn Write, arg_values: &[i32]) -> Result<i32, EvalError> {
    let parts: Vec<String> = arg_values.iter().map(i32::to_string).collect();
    writeln!(out, "{}", parts.join(" "))?;
    Ok(0)
}
