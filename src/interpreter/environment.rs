// File: src/interpreter/environment.rs
//
// Lexical scope chain for the Fun interpreter.
// Implements a stack of frames where inner frames shadow outer ones.

use crate::ast::Function;
use crate::errors::{DeclarationKind, EvalError};
use ahash::AHashMap;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

/// One level of the scope chain: its own variables and functions
#[derive(Debug, Default)]
struct Frame {
    variables: AHashMap<String, i32>,
    functions: AHashMap<String, Rc<Function>>,
}

/// Variable and function storage using lexical scoping
///
/// The Environment keeps a stack of frames. The first frame is the global one
/// and always exists; the last frame is the current one. Lookups search from the
/// current frame outward, so an inner declaration shadows an outer one for as
/// long as its frame lives. Declarations only ever collide within one frame.
///
/// Frames are entered with [`Environment::child_scope`], which returns a guard
/// that pops the frame when dropped.
///
/// # Examples
///
/// ```
/// use fun::interpreter::Environment;
///
/// let mut env = Environment::new();
/// env.declare_variable("x", 10).unwrap();
/// {
///     let mut inner = env.child_scope();
///     inner.declare_variable("x", 20).unwrap();
///     assert_eq!(inner.read_variable("x").unwrap(), 20);
/// }
/// assert_eq!(env.read_variable("x").unwrap(), 10);
/// ```
#[derive(Debug)]
pub struct Environment {
    frames: Vec<Frame>,
}

impl Environment {
    /// Create a new environment with a single global frame
    pub fn new() -> Self {
        Environment {
            frames: vec![Frame::default()],
        }
    }

    /// Number of live frames, the global one included
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    fn current(&mut self) -> &mut Frame {
        // The global frame is never popped, see `ScopeGuard::drop`
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    /// Declare a variable in the current frame.
    ///
    /// Fails only if the current frame already has a variable of that name;
    /// outer declarations are shadowed.
    pub fn declare_variable(&mut self, name: &str, value: i32) -> Result<(), EvalError> {
        let frame = self.current();
        if frame.variables.contains_key(name) {
            return Err(EvalError::DuplicateDeclaration {
                kind: DeclarationKind::Variable,
                name: name.to_string(),
            });
        }
        frame.variables.insert(name.to_string(), value);
        Ok(())
    }

    /// Read a variable, searching from the current frame outward
    pub fn read_variable(&self, name: &str) -> Result<i32, EvalError> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.variables.get(name).copied())
            .ok_or_else(|| EvalError::UndefinedName(name.to_string()))
    }

    /// Overwrite the innermost existing binding. Never creates one.
    pub fn write_variable(&mut self, name: &str, value: i32) -> Result<(), EvalError> {
        for frame in self.frames.iter_mut().rev() {
            if let Some(slot) = frame.variables.get_mut(name) {
                *slot = value;
                return Ok(());
            }
        }
        Err(EvalError::UndefinedName(name.to_string()))
    }

    /// Register a function in the current frame
    pub fn declare_function(&mut self, function: &Function) -> Result<(), EvalError> {
        let frame = self.current();
        let name = function.name.as_str();
        if frame.functions.contains_key(name) {
            return Err(EvalError::DuplicateDeclaration {
                kind: DeclarationKind::Function,
                name: name.to_string(),
            });
        }
        frame.functions.insert(name.to_string(), Rc::new(function.clone()));
        Ok(())
    }

    /// Find the innermost function of that name.
    ///
    /// Absence is not an error here; the caller decides whether a built-in
    /// applies.
    pub fn resolve_function(&self, name: &str) -> Option<Rc<Function>> {
        self.frames.iter().rev().find_map(|frame| frame.functions.get(name).cloned())
    }

    /// Enter a new frame whose parent is the current one
    pub fn child_scope(&mut self) -> ScopeGuard<'_> {
        self.frames.push(Frame::default());
        ScopeGuard { env: self }
    }

    /// Every variable and function name visible from the current frame, sorted
    pub fn visible_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .frames
            .iter()
            .flat_map(|frame| frame.variables.keys().chain(frame.functions.keys()))
            .cloned()
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Global variables with their values, sorted by name
    pub fn global_variables(&self) -> Vec<(String, i32)> {
        let mut vars: Vec<(String, i32)> = self.frames[0]
            .variables
            .iter()
            .map(|(name, value)| (name.clone(), *value))
            .collect();
        vars.sort();
        vars
    }

    /// Global function names, sorted
    pub fn global_functions(&self) -> Vec<String> {
        let mut names: Vec<String> = self.frames[0].functions.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

/// A live child frame. Dereferences to the environment and pops the frame on drop,
/// so the frame is released on every exit path, early returns and errors included.
pub struct ScopeGuard<'a> {
    env: &'a mut Environment,
}

impl Deref for ScopeGuard<'_> {
    type Target = Environment;

    fn deref(&self) -> &Environment {
        &*self.env
    }
}

impl DerefMut for ScopeGuard<'_> {
    fn deref_mut(&mut self) -> &mut Environment {
        &mut *self.env
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        if self.env.frames.len() > 1 {
            self.env.frames.pop();
        }
    }
}
