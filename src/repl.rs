// File: src/repl.rs
//
// Interactive REPL (Read-Eval-Print Loop) for the Fun language.
// Provides an interactive shell for executing Fun code with features like:
// - Multi-line input while braces or parentheses are unbalanced
// - Command history with up/down arrow navigation
// - Special commands (:help, :vars, :reset, :clear, :quit)
// - Declarations that persist across inputs
// - Errors that are reported without ending the session

use crate::ast::{Expr, Stmt};
use crate::config::Config;
use crate::errors::{Diagnostic, Error, Result};
use crate::interpreter::{Flow, Interpreter, BUILTIN_NAMES};
use crate::parser;
use colored::Colorize;
use log::debug;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::{self, Write};

/// Interpreter state shared by all inputs of one REPL session
pub struct ReplSession {
    interpreter: Interpreter,
    config: Config,
}

impl ReplSession {
    pub fn new(config: Config) -> Self {
        ReplSession {
            interpreter: Interpreter::with_config(&config),
            config,
        }
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    pub fn reset(&mut self) {
        self.interpreter = Interpreter::with_config(&self.config);
    }

    /// Runs one complete input in the global frame.
    ///
    /// Returns the value to echo: the value of a trailing expression statement,
    /// unless that expression is a `println` call whose output already showed.
    pub fn eval_input(&mut self, input: &str, out: &mut dyn Write) -> Result<Option<i32>> {
        let file = parser::parse_source(input)?;
        let flow = self.interpreter.run_toplevel(&file.body, out)?;

        let echoes = match file.body.statements.last() {
            Some(Stmt::Expr {
                expr: Expr::Call { callee, .. },
            }) => callee.as_str() != "println",
            Some(Stmt::Expr { .. }) => true,
            _ => false,
        };
        Ok(match flow {
            Flow::Value(value) if echoes => Some(value),
            Flow::Returned(value) => Some(value),
            _ => None,
        })
    }

    /// Names to draw "did you mean" suggestions from
    fn known_names(&self) -> Vec<String> {
        let mut names = self.interpreter.environment().visible_names();
        names.extend(BUILTIN_NAMES.iter().map(|name| name.to_string()));
        names
    }
}

/// Checks if the input is complete: braces and parentheses balanced outside comments
pub fn is_input_complete(input: &str) -> bool {
    let mut brace_count = 0i32;
    let mut paren_count = 0i32;

    for line in input.lines() {
        let code = line.split("//").next().unwrap_or("");
        for ch in code.chars() {
            match ch {
                '{' => brace_count += 1,
                '}' => brace_count -= 1,
                '(' => paren_count += 1,
                ')' => paren_count -= 1,
                _ => {}
            }
        }
    }

    brace_count <= 0 && paren_count <= 0
}

/// REPL session that maintains interpreter state and handles user interaction
pub struct Repl {
    session: ReplSession,
    editor: DefaultEditor,
}

impl Repl {
    /// Creates a new REPL session with a fresh interpreter
    pub fn new(config: Config) -> Result<Self> {
        let editor = DefaultEditor::new()?;
        Ok(Repl {
            session: ReplSession::new(config),
            editor,
        })
    }

    /// Displays the welcome banner with version and help information
    fn show_banner(&self) {
        println!(
            "{}",
            format!(
                "Fun REPL v{} - Interactive Shell",
                env!("CARGO_PKG_VERSION")
            )
            .bright_cyan()
        );
        println!(
            "  {} Use {} for commands or {}",
            "Welcome!".bright_green(),
            ":help".bright_yellow(),
            ":quit".bright_yellow()
        );
        println!(
            "  {} Multi-line input: End with unclosed braces",
            "Tip:".bright_magenta()
        );
        println!();
    }

    /// Starts the REPL loop
    pub fn run(&mut self) -> Result<()> {
        self.show_banner();

        let mut buffer = String::new();

        loop {
            let prompt = if buffer.is_empty() {
                "fun> ".bright_green().to_string()
            } else {
                "...> ".bright_blue().to_string()
            };

            match self.editor.readline(&prompt) {
                Ok(line) => {
                    let _ = self.editor.add_history_entry(line.as_str());

                    if buffer.is_empty() && line.trim().starts_with(':') {
                        if self.handle_command(line.trim()) {
                            continue;
                        } else {
                            break;
                        }
                    }

                    buffer.push_str(&line);
                    buffer.push('\n');

                    if is_input_complete(&buffer) {
                        self.eval_input(&buffer);
                        buffer.clear();
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("{}", "^C (Ctrl+D or :quit to exit)".bright_yellow());
                    buffer.clear();
                }
                Err(ReadlineError::Eof) => {
                    println!("{}", "Goodbye!".bright_cyan());
                    break;
                }
                Err(err) => return Err(Error::from(err)),
            }
        }

        Ok(())
    }

    /// Handles special REPL commands starting with ':'
    /// Returns true to continue REPL, false to quit
    fn handle_command(&mut self, cmd: &str) -> bool {
        match cmd {
            ":help" | ":h" => {
                self.show_help();
                true
            }
            ":quit" | ":q" | ":exit" => {
                println!("{}", "Goodbye!".bright_cyan());
                false
            }
            ":clear" | ":c" => {
                print!("\x1B[2J\x1B[1;1H");
                self.show_banner();
                true
            }
            ":vars" | ":v" => {
                self.show_definitions();
                true
            }
            ":reset" | ":r" => {
                self.session.reset();
                println!("{}", "✓ Environment reset".bright_green());
                true
            }
            _ => {
                println!(
                    "{} Unknown command: {}. Type {} for available commands.",
                    "Error:".bright_red(),
                    cmd.bright_yellow(),
                    ":help".bright_yellow()
                );
                true
            }
        }
    }

    fn show_help(&self) {
        println!();
        println!("{}", "REPL Commands:".bright_cyan().bold());
        println!(
            "  {}{}  Display this help message",
            ":help".bright_yellow(),
            " or :h ".dimmed()
        );
        println!(
            "  {}{}  Exit the REPL",
            ":quit".bright_yellow(),
            " or :q ".dimmed()
        );
        println!(
            "  {}{}  Clear the screen",
            ":clear".bright_yellow(),
            " or :c".dimmed()
        );
        println!(
            "  {}{}  Show global variables and functions",
            ":vars".bright_yellow(),
            " or :v ".dimmed()
        );
        println!(
            "  {}{}  Forget all declarations",
            ":reset".bright_yellow(),
            " or :r".dimmed()
        );
        println!();
        println!("{}", "Examples:".bright_cyan().bold());
        println!("  {}", "fun> var x = 42".dimmed());
        println!("  {}", "fun> fun double(n) {".dimmed());
        println!("  {}", "...>     return n * 2".dimmed());
        println!("  {}", "...> }".dimmed());
        println!("  {}", "fun> println(double(x))".dimmed());
        println!();
    }

    /// Displays global variables and functions
    fn show_definitions(&self) {
        let env = self.session.interpreter().environment();
        let variables = env.global_variables();
        let functions = env.global_functions();

        if variables.is_empty() && functions.is_empty() {
            println!("  {}", "(nothing defined yet)".dimmed());
            return;
        }
        for (name, value) in variables {
            println!(
                "  {} = {}",
                name.bright_yellow(),
                value.to_string().bright_white()
            );
        }
        for name in functions {
            println!("  {}", format!("fun {}(...)", name).bright_cyan());
        }
    }

    /// Evaluates the input code and displays the result
    fn eval_input(&mut self, input: &str) {
        if input.trim().is_empty() {
            return;
        }
        debug!("evaluating {} bytes of REPL input", input.len());

        let stdout = io::stdout();
        let mut out = stdout.lock();
        match self.session.eval_input(input, &mut out) {
            Ok(Some(value)) => {
                println!(
                    "{} {}",
                    "=>".bright_blue(),
                    value.to_string().bright_white()
                );
            }
            Ok(None) => {}
            Err(err) => {
                let diagnostic = Diagnostic::from_error(&err)
                    .with_source(input)
                    .suggest_from(&err, &self.session.known_names());
                eprint!("{}", diagnostic);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balanced_input_is_complete() {
        assert!(is_input_complete("var x = 1"));
        assert!(is_input_complete("fun f(n) { return n }"));
        assert!(!is_input_complete("fun f(n) {\n"));
        assert!(!is_input_complete("println(1,\n"));
        assert!(is_input_complete("x = 1 // {"));
    }

    #[test]
    fn declarations_persist_between_inputs() {
        let mut session = ReplSession::new(Config::default());
        let mut out: Vec<u8> = Vec::new();

        assert_eq!(session.eval_input("var x = 20", &mut out).unwrap(), None);
        assert_eq!(
            session
                .eval_input("fun twice(n) { return n * 2 }", &mut out)
                .unwrap(),
            None
        );
        assert_eq!(
            session.eval_input("twice(x) + 2", &mut out).unwrap(),
            Some(42)
        );
        assert_eq!(session.eval_input("println(x)", &mut out).unwrap(), None);
        assert_eq!(String::from_utf8(out).unwrap(), "20\n");
    }

    #[test]
    fn errors_leave_the_session_usable() {
        let mut session = ReplSession::new(Config::default());
        let mut out: Vec<u8> = Vec::new();

        session.eval_input("var x = 1", &mut out).unwrap();
        assert!(session.eval_input("var x = 2", &mut out).is_err());
        assert!(session.eval_input("x = ", &mut out).is_err());
        assert_eq!(session.eval_input("x", &mut out).unwrap(), Some(1));

        session.reset();
        assert!(session.eval_input("x", &mut out).is_err());
    }

    #[test]
    fn known_names_include_builtins() {
        let mut session = ReplSession::new(Config::default());
        session.eval_input("var counter", &mut Vec::<u8>::new()).unwrap();
        let names = session.known_names();
        assert!(names.contains(&"counter".to_string()));
        assert!(names.contains(&"println".to_string()));
    }
}
