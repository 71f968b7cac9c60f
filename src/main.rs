// File: src/main.rs
//
// Main entry point for the Fun interpreter.
// Handles command-line argument parsing and dispatches to the appropriate
// subcommand (run, ast, repl, or test).

use clap::{Parser as ClapParser, Subcommand};
use fun::ast::File;
use fun::config::Config;
use fun::errors::{Diagnostic, Error, Result};
use fun::interpreter::{Interpreter, BUILTIN_NAMES};
use fun::parser;
use fun::repl::Repl;
use fun::test_runner;
use log::{debug, info};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(ClapParser)]
#[command(
    name = "fun",
    about = "Fun: a small imperative language over 32-bit integers",
    version = env!("CARGO_PKG_VERSION"),
    long_about = None
)]
struct Cli {
    /// Configuration file (defaults to ./fun.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Maximum nested function calls before the run fails
    #[arg(long, global = true)]
    max_call_depth: Option<usize>,

    /// Disable colored diagnostics
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
#[command(arg_required_else_help = true)]
enum Commands {
    /// Run a Fun program
    Run {
        /// Path to the .fun file
        file: PathBuf,

        /// Treat the file as a JSON syntax tree instead of source text
        #[arg(long)]
        ast: bool,
    },

    /// Print the syntax tree of a program as JSON
    Ast {
        /// Path to the .fun file
        file: PathBuf,
    },

    /// Launch the interactive Fun REPL
    Repl,

    /// Run every program in a directory against its .out file
    Test {
        /// Directory holding the .fun and .out files
        #[arg(long, default_value = "tests/programs")]
        dir: PathBuf,

        /// Regenerate all .out files based on actual output
        #[arg(long)]
        update: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprint!("{}", Diagnostic::from_error(&err));
            return ExitCode::from(2);
        }
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&config.log_level),
    )
    .init();
    if !config.color {
        colored::control::set_override(false);
    }
    debug!("configuration: {:?}", config);

    match cli.command {
        Commands::Run { file, ast } => run_file(&file, ast, &config),

        Commands::Ast { file } => match print_ast(&file) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => report(&err, Some(file.as_path()), None, &[]),
        },

        Commands::Repl => match Repl::new(config).and_then(|mut repl| repl.run()) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => report(&err, None, None, &[]),
        },

        Commands::Test { dir, update } => match test_runner::run_all_tests(&dir, update, &config) {
            Ok(report_card) => {
                report_card.print();
                if report_card.all_passed() {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::FAILURE
                }
            }
            Err(err) => report(&err, None, None, &[]),
        },
    }
}

/// Config file first, then command-line overrides
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(depth) = cli.max_call_depth {
        config.max_call_depth = depth;
    }
    if cli.no_color {
        config.color = false;
    }
    config.validate()?;
    Ok(config)
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| Error::io(path, source))
}

fn run_file(path: &Path, from_json: bool, config: &Config) -> ExitCode {
    let source = match read_file(path) {
        Ok(source) => source,
        Err(err) => return report(&err, None, None, &[]),
    };

    let program: Result<File> = if from_json {
        serde_json::from_str(&source).map_err(Error::from)
    } else {
        parser::parse_source(&source).map_err(Error::from)
    };
    let program = match program {
        Ok(program) => program,
        Err(err) => {
            let shown = (!from_json).then_some(source.as_str());
            return report(&err, Some(path), shown, &[]);
        }
    };

    info!("running {}", path.display());
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = Interpreter::with_config(config).run(&program, &mut out);

    match result {
        Ok(flow) => {
            debug!("program finished with {:?}", flow);
            ExitCode::SUCCESS
        }
        Err(err) => {
            let mut names = program.declared_names();
            names.extend(BUILTIN_NAMES.iter().map(|name| name.to_string()));
            report(&Error::from(err), Some(path), None, &names)
        }
    }
}

fn print_ast(path: &Path) -> Result<()> {
    let source = read_file(path)?;
    let program = parser::parse_source(&source)?;
    println!("{}", serde_json::to_string_pretty(&program)?);
    Ok(())
}

/// Renders `err` to stderr and picks the failure exit code
fn report(err: &Error, file: Option<&Path>, source: Option<&str>, names: &[String]) -> ExitCode {
    let mut diagnostic = Diagnostic::from_error(err).suggest_from(err, names);
    if let Some(file) = file {
        diagnostic = diagnostic.with_file(file.display().to_string());
    }
    if let Some(source) = source {
        diagnostic = diagnostic.with_source(source);
    }
    eprint!("{}", diagnostic);
    ExitCode::FAILURE
}
