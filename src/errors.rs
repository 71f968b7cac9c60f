// File: src/errors.rs
//
// Error types and error reporting for the Fun interpreter.
//
// Three layers:
// - ParseError: raised by the front end before the interpreter runs
// - EvalError: the fatal runtime failures of the evaluator
// - Error: crate-level wrapper used by the driver (I/O, config, AST JSON)
//
// Diagnostic renders any of them for a human, with source context and a
// "did you mean" suggestion when a misspelled name is likely.

use colored::Colorize;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Source location information for tracking where code appears in a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Categories of failures that can occur while running Fun code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ParseError,
    DuplicateDeclaration,
    UndefinedName,
    UndefinedFunction,
    ArityMismatch,
    LiteralOverflow,
    ArithmeticFailure,
    StackExhaustion,
    IoError,
    ConfigError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorKind::ParseError => write!(f, "Parse Error"),
            ErrorKind::DuplicateDeclaration => write!(f, "Duplicate Declaration"),
            ErrorKind::UndefinedName => write!(f, "Undefined Name"),
            ErrorKind::UndefinedFunction => write!(f, "Undefined Function"),
            ErrorKind::ArityMismatch => write!(f, "Arity Mismatch"),
            ErrorKind::LiteralOverflow => write!(f, "Literal Overflow"),
            ErrorKind::ArithmeticFailure => write!(f, "Arithmetic Failure"),
            ErrorKind::StackExhaustion => write!(f, "Stack Exhaustion"),
            ErrorKind::IoError => write!(f, "I/O Error"),
            ErrorKind::ConfigError => write!(f, "Configuration Error"),
        }
    }
}

/// What kind of binding a duplicate declaration collided with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    Variable,
    Function,
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DeclarationKind::Variable => write!(f, "Variable"),
            DeclarationKind::Function => write!(f, "Function"),
        }
    }
}

/// Fatal runtime failures. Evaluation stops at the first one.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("{kind} '{name}' is already defined in this scope")]
    DuplicateDeclaration { kind: DeclarationKind, name: String },

    #[error("Variable '{0}' is not defined")]
    UndefinedName(String),

    #[error("Function '{0}' is not defined")]
    UndefinedFunction(String),

    #[error("Function '{name}' takes {expected} argument(s) but {found} were given")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("Number {0} does not fit in a 32-bit integer")]
    LiteralOverflow(String),

    #[error("{0}")]
    ArithmeticFailure(&'static str),

    #[error("Call depth exceeded the limit of {limit}")]
    StackExhaustion { limit: usize },

    #[error("Failed to write program output: {0}")]
    Output(#[from] io::Error),
}

impl EvalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EvalError::DuplicateDeclaration { .. } => ErrorKind::DuplicateDeclaration,
            EvalError::UndefinedName(_) => ErrorKind::UndefinedName,
            EvalError::UndefinedFunction(_) => ErrorKind::UndefinedFunction,
            EvalError::ArityMismatch { .. } => ErrorKind::ArityMismatch,
            EvalError::LiteralOverflow(_) => ErrorKind::LiteralOverflow,
            EvalError::ArithmeticFailure(_) => ErrorKind::ArithmeticFailure,
            EvalError::StackExhaustion { .. } => ErrorKind::StackExhaustion,
            EvalError::Output(_) => ErrorKind::IoError,
        }
    }

    /// The unresolved name, for errors where a misspelling is plausible
    pub fn unresolved_name(&self) -> Option<&str> {
        match self {
            EvalError::UndefinedName(name) | EvalError::UndefinedFunction(name) => Some(name),
            _ => None,
        }
    }
}

/// Front-end failures; the interpreter never sees a program that produced one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unexpected character '{ch}'")]
    UnexpectedChar { ch: char, location: SourceLocation },

    #[error("Expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        location: SourceLocation,
    },

    #[error("Unexpected end of input, expected {expected}")]
    UnexpectedEof {
        expected: String,
        location: SourceLocation,
    },

    #[error("Program nests deeper than {limit} levels")]
    NestingTooDeep {
        limit: usize,
        location: SourceLocation,
    },
}

impl ParseError {
    pub fn location(&self) -> SourceLocation {
        match self {
            ParseError::UnexpectedChar { location, .. }
            | ParseError::UnexpectedToken { location, .. }
            | ParseError::UnexpectedEof { location, .. }
            | ParseError::NestingTooDeep { location, .. } => *location,
        }
    }
}

/// Crate-level error for everything outside the evaluator core
#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid AST JSON: {0}")]
    AstJson(#[from] serde_json::Error),

    #[error("Line editor failed: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}

impl Error {
    /// An I/O failure on `path`
    pub fn io(path: &Path, source: io::Error) -> Self {
        Error::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io { .. } | Error::Readline(_) => ErrorKind::IoError,
            Error::Parse(_) | Error::AstJson(_) => ErrorKind::ParseError,
            Error::Eval(e) => e.kind(),
            Error::Config(_) => ErrorKind::ConfigError,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A rendered error report with optional source context
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub message: String,
    pub file: Option<String>,
    pub location: Option<SourceLocation>,
    pub source_line: Option<String>,
    pub suggestion: Option<String>,
    pub help: Option<String>,
}

impl Diagnostic {
    pub fn new(kind: ErrorKind, message: String) -> Self {
        Self {
            kind,
            message,
            file: None,
            location: None,
            source_line: None,
            suggestion: None,
            help: None,
        }
    }

    /// Builds a report for any crate error, pulling the location out of parse errors.
    pub fn from_error(error: &Error) -> Self {
        let mut diagnostic = Self::new(error.kind(), error.to_string());
        if let Error::Parse(parse) = error {
            diagnostic.location = Some(parse.location());
        }
        match error {
            Error::Parse(ParseError::NestingTooDeep { .. }) => {
                diagnostic.with_help("split the expression using intermediate variables".into())
            }
            Error::Eval(EvalError::StackExhaustion { .. }) => diagnostic.with_help(
                "raise `max_call_depth` in fun.toml or pass --max-call-depth".into(),
            ),
            Error::Eval(EvalError::ArithmeticFailure(_)) => {
                diagnostic.with_help("check the divisor before dividing".into())
            }
            _ => diagnostic,
        }
    }

    pub fn with_file(mut self, file: String) -> Self {
        self.file = Some(file);
        self
    }

    /// Attaches the offending line, if the report has a location inside `source`.
    pub fn with_source(mut self, source: &str) -> Self {
        if let Some(location) = self.location {
            self.source_line = location
                .line
                .checked_sub(1)
                .and_then(|index| source.lines().nth(index))
                .map(str::to_string);
        }
        self
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestion = Some(suggestion);
        self
    }

    pub fn with_help(mut self, help: String) -> Self {
        self.help = Some(help);
        self
    }

    /// Suggests the closest visible name when the error is about an unknown one.
    pub fn suggest_from(self, error: &Error, candidates: &[String]) -> Self {
        let unresolved = match error {
            Error::Eval(eval) => eval.unresolved_name(),
            _ => None,
        };
        match unresolved.and_then(|name| find_closest_match(name, candidates)) {
            Some(found) => {
                let found = found.to_string();
                self.with_suggestion(found)
            }
            None => self,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind_str = format!("{}", self.kind);
        writeln!(f, "{}: {}", kind_str.red().bold(), self.message.bold())?;

        let position = match (&self.file, self.location) {
            (Some(file), Some(location)) => Some(format!("{}:{}", file, location)),
            (Some(file), None) => Some(file.clone()),
            (None, Some(location)) => Some(location.to_string()),
            (None, None) => None,
        };
        if let Some(position) = position {
            writeln!(f, "{}", format!("  --> {}", position).bright_blue())?;
        }

        if let (Some(source), Some(location)) = (&self.source_line, self.location) {
            writeln!(f, "   {}", "|".bright_blue())?;
            writeln!(
                f,
                "{} {} {}",
                format!("{:3}", location.line).bright_blue(),
                "|".bright_blue(),
                source
            )?;
            writeln!(
                f,
                "   {} {}{}",
                "|".bright_blue(),
                " ".repeat(location.column.saturating_sub(1)),
                "^".red().bold()
            )?;
        }

        if let Some(ref help) = self.help {
            writeln!(
                f,
                "   {} {}",
                "=".bright_yellow(),
                format!("help: {}", help).bright_yellow()
            )?;
        }

        if let Some(ref suggestion) = self.suggestion {
            writeln!(
                f,
                "   {} {}",
                "=".bright_green(),
                format!("Did you mean '{}'?", suggestion).bright_green()
            )?;
        }

        Ok(())
    }
}

/// Computes the Levenshtein distance between two strings
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Single rolling row instead of the full matrix
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for i in 1..=a.len() {
        let mut diagonal = row[0];
        row[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            let next = (row[j] + 1).min(row[j - 1] + 1).min(diagonal + cost);
            diagonal = row[j];
            row[j] = next;
        }
    }

    row[b.len()]
}

/// Finds the closest candidate within an edit distance of 3
pub fn find_closest_match<'a>(target: &str, candidates: &'a [String]) -> Option<&'a str> {
    let mut best_match = None;
    let mut best_distance = usize::MAX;

    for candidate in candidates {
        let distance = levenshtein_distance(target, candidate);
        if distance <= 3 && distance < best_distance && candidate != target {
            best_distance = distance;
            best_match = Some(candidate.as_str());
        }
    }

    best_match
}
