// File: src/interpreter/mod.rs
//
// Tree-walking interpreter for the Fun language.
// Executes Fun programs by traversing the Abstract Syntax Tree (AST).
//
// The interpreter keeps a scope chain (Environment) for variables and
// functions, evaluates expressions to 32-bit integers, and executes
// statements producing a Flow that carries the early-return signal. It
// supports:
// - Variable declaration and assignment through the scope chain
// - Function calls that see the caller's scope chain (no closures)
// - while loops and if/else, both passing returns outward
// - Binary operations with wrapping integer arithmetic
// - The println built-in, writing to a caller-supplied sink
//
// The scope chain is passed explicitly to every evaluation method. Each
// block and each call enters a child frame through a guard that releases it
// on every exit path. Blocks and expressions recurse through
// `ensure_sufficient_stack`, so nesting never overflows the native stack; only
// the call depth limit ends a run early.
//
// All failures are fatal and surface as EvalError. The interpreter does not log.

mod control_flow;
mod environment;
mod native_functions;

pub use control_flow::Flow;
pub use environment::{Environment, ScopeGuard};
pub use native_functions::BUILTIN_NAMES;

use crate::ast::{BinaryOp, Block, Expr, File, Stmt};
use crate::config::Config;
use crate::errors::EvalError;
use std::io::Write;

/// Value of a call whose body finishes without `return`
const FALL_THROUGH_VALUE: i32 = 0;

/// Keep at least this much native stack free before recursing
const RED_ZONE: usize = 128 * 1024;

/// Native stack segment allocated when the red zone is reached
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Main interpreter that executes Fun programs
///
/// The interpreter owns the global frame. [`Interpreter::run`] evaluates a whole
/// file as a block nested in that frame, so a file's declarations are discarded
/// when it finishes; [`Interpreter::run_toplevel`] evaluates statements directly in
/// the global frame, which is how the REPL keeps state between inputs.
pub struct Interpreter {
    env: Environment,
    max_call_depth: usize,
}

impl Interpreter {
    /// Creates a new interpreter with an empty global frame and default limits
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    pub fn with_config(config: &Config) -> Self {
        Interpreter {
            env: Environment::new(),
            max_call_depth: config.max_call_depth,
        }
    }

    /// The scope chain as it stands between runs
    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Drops every global declaration
    pub fn reset(&mut self) {
        self.env = Environment::new();
    }

    /// Evaluates a program, writing `println` output to `out` and flushing it.
    ///
    /// The result is the program block's flow: `Flow::Returned` if a top-level
    /// `return` ran, `Flow::Unit` otherwise.
    pub fn run(&mut self, file: &File, out: &mut dyn Write) -> Result<Flow, EvalError> {
        let flow = Evaluator::new(out, self.max_call_depth)
            .eval_block(&mut self.env, &file.body)?;
        out.flush()?;
        Ok(flow)
    }

    /// Evaluates statements in the global frame and returns the last statement's flow.
    pub fn run_toplevel(&mut self, block: &Block, out: &mut dyn Write) -> Result<Flow, EvalError> {
        let flow = Evaluator::new(out, self.max_call_depth)
            .eval_sequence(&mut self.env, &block.statements)?;
        out.flush()?;
        Ok(flow)
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// State of one evaluation run: the output sink and the call depth
struct Evaluator<'o> {
    out: &'o mut dyn Write,
    depth: usize,
    max_depth: usize,
}

impl<'o> Evaluator<'o> {
    fn new(out: &'o mut dyn Write, max_depth: usize) -> Self {
        Evaluator {
            out,
            depth: 0,
            max_depth,
        }
    }

    /// Runs a block in a fresh child frame.
    ///
    /// A return stops the block and is passed on unchanged; any other
    /// completion yields `Flow::Unit`.
    fn eval_block(&mut self, env: &mut Environment, block: &Block) -> Result<Flow, EvalError> {
        ensure_sufficient_stack(|| {
            let mut frame = env.child_scope();
            self.eval_sequence(&mut frame, &block.statements)
                .map(|flow| match flow {
                    Flow::Returned(value) => Flow::Returned(value),
                    Flow::Unit | Flow::Value(_) => Flow::Unit,
                })
        })
    }

    /// Evaluates statements in the current frame, stopping at the first return
    fn eval_sequence(&mut self, env: &mut Environment, stmts: &[Stmt]) -> Result<Flow, EvalError> {
        let mut last = Flow::Unit;
        for stmt in stmts {
            last = self.eval_stmt(env, stmt)?;
            if last.is_returning() {
                break;
            }
        }
        Ok(last)
    }

    /// Evaluates a single statement
    fn eval_stmt(&mut self, env: &mut Environment, stmt: &Stmt) -> Result<Flow, EvalError> {
        match stmt {
            Stmt::Function(function) => {
                env.declare_function(function)?;
                Ok(Flow::Unit)
            }
            Stmt::Variable { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.eval_expr(env, expr)?,
                    None => 0,
                };
                env.declare_variable(name.as_str(), value)?;
                Ok(Flow::Unit)
            }
            Stmt::While { condition, body } => {
                while self.eval_expr(env, condition)? != 0 {
                    let flow = self.eval_block(env, body)?;
                    if flow.is_returning() {
                        return Ok(flow);
                    }
                }
                Ok(Flow::Unit)
            }
            Stmt::If {
                condition,
                then_body,
                else_body,
            } => {
                if self.eval_expr(env, condition)? != 0 {
                    self.eval_block(env, then_body)
                } else if let Some(else_body) = else_body {
                    self.eval_block(env, else_body)
                } else {
                    Ok(Flow::Unit)
                }
            }
            Stmt::Assignment { target, value } => {
                let value = self.eval_expr(env, value)?;
                env.write_variable(target.as_str(), value)?;
                Ok(Flow::Unit)
            }
            Stmt::Return { value } => Ok(Flow::Returned(self.eval_expr(env, value)?)),
            Stmt::Expr { expr } => Ok(Flow::Value(self.eval_expr(env, expr)?)),
        }
    }

    fn eval_expr(&mut self, env: &mut Environment, expr: &Expr) -> Result<i32, EvalError> {
        ensure_sufficient_stack(|| self.eval_expr_node(env, expr))
    }

    fn eval_expr_node(&mut self, env: &mut Environment, expr: &Expr) -> Result<i32, EvalError> {
        match expr {
            Expr::Identifier { name } => env.read_variable(name.as_str()),
            Expr::Literal { text } => {
                text.parse::<i32>().map_err(|_| EvalError::LiteralOverflow(text.clone()))
            }
            Expr::Binary { left, op, right } => {
                // Both sides always run, && and || included
                let left = self.eval_expr(env, left)?;
                let right = self.eval_expr(env, right)?;
                apply_binary(*op, left, right)
            }
            Expr::Call { callee, arguments } => {
                let mut arg_values = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    arg_values.push(self.eval_expr(env, argument)?);
                }
                self.eval_call(env, callee.as_str(), &arg_values)
            }
        }
    }

    /// Calls a user function, falling back to built-ins when none is visible
    fn eval_call(
        &mut self,
        env: &mut Environment,
        name: &str,
        arg_values: &[i32],
    ) -> Result<i32, EvalError> {
        let Some(function) = env.resolve_function(name) else {
            return native_functions::call_native_function(self.out, name, arg_values)
                .unwrap_or_else(|| Err(EvalError::UndefinedFunction(name.to_string())));
        };

        if function.parameters.len() != arg_values.len() {
            return Err(EvalError::ArityMismatch {
                name: name.to_string(),
                expected: function.parameters.len(),
                found: arg_values.len(),
            });
        }

        if self.depth >= self.max_depth {
            return Err(EvalError::StackExhaustion {
                limit: self.max_depth,
            });
        }

        let mut activation = env.child_scope();
        for (parameter, value) in function.parameters.iter().zip(arg_values) {
            activation.declare_variable(parameter.as_str(), *value)?;
        }

        self.depth += 1;
        let flow = self.eval_block(&mut activation, &function.body);
        self.depth -= 1;

        match flow? {
            Flow::Returned(value) => Ok(value),
            Flow::Unit | Flow::Value(_) => Ok(FALL_THROUGH_VALUE),
        }
    }
}

/// Runs `f`, first growing the native stack if less than `RED_ZONE` remains
fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// Applies a binary operator with 32-bit wrapping arithmetic
fn apply_binary(op: BinaryOp, left: i32, right: i32) -> Result<i32, EvalError> {
    let truth = |b: bool| if b { 1 } else { 0 };
    let value = match op {
        BinaryOp::Add => left.wrapping_add(right),
        BinaryOp::Sub => left.wrapping_sub(right),
        BinaryOp::Mul => left.wrapping_mul(right),
        BinaryOp::Div => {
            if right == 0 {
                return Err(EvalError::ArithmeticFailure("Division by zero"));
            }
            left.wrapping_div(right)
        }
        BinaryOp::Mod => {
            if right == 0 {
                return Err(EvalError::ArithmeticFailure("Modulo by zero"));
            }
            left.wrapping_rem(right)
        }
        BinaryOp::Gt => truth(left > right),
        BinaryOp::Lt => truth(left < right),
        BinaryOp::Ge => truth(left >= right),
        BinaryOp::Le => truth(left <= right),
        BinaryOp::Eq => truth(left == right),
        BinaryOp::Ne => truth(left != right),
        // The left operand is evaluated but does not affect the result
        BinaryOp::And | BinaryOp::Or => truth(right != 0),
    };
    Ok(value)
}
