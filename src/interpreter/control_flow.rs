// File: src/interpreter/control_flow.rs
//
// Result of evaluating a statement, carrying the early-return signal.
//
// A `return` produces `Flow::Returned`, which every enclosing block, loop and
// conditional hands back unchanged until a function call consumes it. Nothing
// else produces it, so checking for it is the only unwinding the interpreter does.

/// Outcome of one statement, block, or whole program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Completed normally without a value
    Unit,
    /// Completed normally with a value (an expression statement)
    Value(i32),
    /// A `return` was executed with this value
    Returned(i32),
}

impl Flow {
    /// The value carried, if any
    pub fn value(self) -> Option<i32> {
        match self {
            Flow::Unit => None,
            Flow::Value(v) | Flow::Returned(v) => Some(v),
        }
    }

    /// True if evaluation stopped because of a `return`
    pub fn is_returning(self) -> bool {
        matches!(self, Flow::Returned(_))
    }
}
