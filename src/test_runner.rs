// File: src/test_runner.rs
//
// Golden-file runner for Fun programs.
//
// Every `*.fun` file in a directory is parsed and run with its output
// captured; the transcript is compared with the sibling `*.out` file. A failing
// program's transcript ends with an `error:` line naming the error kind, so
// expected failures can be pinned down the same way as expected output.

use crate::config::Config;
use crate::errors::{Error, Result};
use crate::interpreter::{Flow, Interpreter};
use crate::parser;
use colored::Colorize;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Extension of runnable programs
pub const PROGRAM_EXTENSION: &str = "fun";

/// Extension of expected transcripts
pub const EXPECTED_EXTENSION: &str = "out";

/// Captured output and result of one program
#[derive(Debug)]
pub struct ProgramRun {
    pub output: String,
    pub result: Result<Flow>,
}

impl ProgramRun {
    /// Printed output followed by an `error:` line if the run failed
    pub fn transcript(&self) -> String {
        let mut transcript = self.output.clone();
        if let Err(error) = &self.result {
            transcript.push_str(&format!("error: {}: {}\n", error.kind(), error));
        }
        transcript
    }
}

/// Parses and runs `source` in a fresh interpreter, capturing printed lines
pub fn run_program(source: &str, config: &Config) -> ProgramRun {
    let mut buffer: Vec<u8> = Vec::new();
    let result = parser::parse_source(source)
        .map_err(Error::from)
        .and_then(|file| {
            Interpreter::with_config(config)
                .run(&file, &mut buffer)
                .map_err(Error::from)
        });
    ProgramRun {
        output: String::from_utf8_lossy(&buffer).into_owned(),
        result,
    }
}

/// Result from executing a single program
#[derive(Debug, Clone)]
pub struct TestResult {
    pub path: PathBuf,
    pub passed: bool,
    pub expected: String,
    pub actual: String,
    pub duration: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct TestReport {
    pub results: Vec<TestResult>,
}

impl TestReport {
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn all_passed(&self) -> bool {
        self.passed() == self.total()
    }

    /// Prints one line per program, a diff body for failures, and a summary
    pub fn print(&self) {
        for result in &self.results {
            if result.passed {
                println!(
                    "{} {} ({:.2?})",
                    "[✓]".bright_green(),
                    result.path.display(),
                    result.duration
                );
            } else {
                println!("{} {}", "[✗]".bright_red(), result.path.display());
                println!("Expected:\n{}\nGot:\n{}\n", result.expected, result.actual);
            }
        }

        let summary = format!("Passed {}/{} programs", self.passed(), self.total());
        if self.all_passed() {
            println!("\n{} {}", "[✓]".bright_green(), summary);
        } else {
            println!("\n{} {}", "[✗]".bright_red(), summary.bright_red());
        }
    }
}

/// Runs every program in `test_dir` against its expected transcript.
///
/// With `update_snapshots`, or when an expected file is missing, the actual
/// transcript is written as the new expectation.
pub fn run_all_tests(
    test_dir: &Path,
    update_snapshots: bool,
    config: &Config,
) -> Result<TestReport> {
    let entries = fs::read_dir(test_dir).map_err(|source| Error::io(test_dir, source))?;

    let mut programs: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|e| e == PROGRAM_EXTENSION))
        .collect();
    programs.sort();
    info!(
        "running {} programs from {}",
        programs.len(),
        test_dir.display()
    );

    let mut report = TestReport::default();
    for path in programs {
        let source = fs::read_to_string(&path).map_err(|source| Error::io(&path, source))?;
        let expected_path = path.with_extension(EXPECTED_EXTENSION);

        let start = Instant::now();
        let actual = run_program(&source, config).transcript();
        let duration = start.elapsed();

        let expected = if expected_path.exists() && !update_snapshots {
            fs::read_to_string(&expected_path)
                .map_err(|source| Error::io(&expected_path, source))?
        } else {
            debug!("writing {}", expected_path.display());
            fs::write(&expected_path, &actual)
                .map_err(|source| Error::io(&expected_path, source))?;
            actual.clone()
        };

        let passed = actual.trim_end() == expected.trim_end();
        report.results.push(TestResult {
            path,
            passed,
            expected,
            actual,
            duration,
        });
    }

    Ok(report)
}
