// Integration tests for the Fun interpreter
//
// These tests verify the interpreter's behavior by running complete Fun programs
// and checking printed output and results. Tests cover:
// - Variable declaration, assignment and block scoping
// - Functions: parameters, shadowing, fall-through, recursion
// - Control flow and return propagation
// - The && / || evaluation rules
// - Every runtime error kind
// - Syntax trees handed over as JSON

use fun::ast::File;
use fun::config::Config;
use fun::errors::{DeclarationKind, Error, ErrorKind, EvalError, ParseError};
use fun::interpreter::{Flow, Interpreter};
use fun::parser::parse_source;
use pretty_assertions::assert_eq;

/// Runs `code` in a fresh interpreter and returns the result and printed output
fn run_code(code: &str) -> (Result<Flow, Error>, String) {
    run_with_config(code, &Config::default())
}

fn run_with_config(code: &str, config: &Config) -> (Result<Flow, Error>, String) {
    let mut out: Vec<u8> = Vec::new();
    let result = parse_source(code)
        .map_err(Error::from)
        .and_then(|file| {
            Interpreter::with_config(config)
                .run(&file, &mut out)
                .map_err(Error::from)
        });
    (result, String::from_utf8(out).unwrap())
}

fn output_of(code: &str) -> String {
    let (result, output) = run_code(code);
    if let Err(err) = result {
        panic!("program failed: {}\n{}", err, code);
    }
    output
}

fn error_of(code: &str) -> Error {
    match run_code(code).0 {
        Ok(flow) => panic!("program succeeded with {:?}:\n{}", flow, code),
        Err(err) => err,
    }
}

#[test]
fn test_if_else_scenario() {
    let (result, output) =
        run_code("var a = 10; var b = 20; if (a > b) { println(1) } else { println(0) }");
    assert_eq!(output, "0\n");
    let flow = result.unwrap();
    assert_eq!(flow, Flow::Unit);
    assert_eq!(flow.value(), None);
    assert!(!flow.is_returning());
}

#[test]
fn test_function_call_scenario() {
    assert_eq!(
        output_of("function f(n) { return n + 1 } println(f(41))"),
        "42\n"
    );
}

#[test]
fn test_println_multiple_values() {
    assert_eq!(output_of("println(1, 2 + 3, -4)\nprintln()"), "1 5 -4\n\n");
}

#[test]
fn test_println_returns_zero() {
    assert_eq!(output_of("var x = println(7)\nprintln(x)"), "7\n0\n");
}

#[test]
fn test_variable_default_is_zero() {
    assert_eq!(output_of("var x\nprintln(x)"), "0\n");
}

#[test]
fn test_block_variable_is_gone_after_block() {
    let err = error_of(
        r#"
        if (1) {
            var inner = 5
            println(inner)
        }
        println(inner)
        "#,
    );
    assert_eq!(err.kind(), ErrorKind::UndefinedName);
    assert!(matches!(
        err,
        Error::Eval(EvalError::UndefinedName(ref name)) if name == "inner"
    ));
}

#[test]
fn test_block_output_before_scope_error_is_kept() {
    let (result, output) = run_code("if (1) { var inner = 5 println(inner) } println(inner)");
    assert!(result.is_err());
    assert_eq!(output, "5\n");
}

#[test]
fn test_assignment_reaches_outer_frames() {
    let code = r#"
        var total = 0
        var i = 1
        while (i <= 4) {
            total = total + i
            i = i + 1
        }
        println(total, i)
    "#;
    assert_eq!(output_of(code), "10 5\n");
}

#[test]
fn test_inner_declaration_shadows_outer() {
    let code = r#"
        var x = 1
        if (1) {
            var x = 2
            x = 3
            println(x)
        }
        println(x)
    "#;
    assert_eq!(output_of(code), "3\n1\n");
}

#[test]
fn test_parameter_shadows_outer_variable() {
    let code = r#"
        var n = 100
        fun bump(n) {
            n = n + 1
            println(n)
        }
        bump(5)
        println(n)
    "#;
    assert_eq!(output_of(code), "6\n100\n");
}

#[test]
fn test_function_sees_callers_scope() {
    let code = r#"
        fun show() {
            println(secret)
        }
        fun caller() {
            var secret = 9
            show()
        }
        caller()
    "#;
    assert_eq!(output_of(code), "9\n");
}

#[test]
fn test_function_without_return_yields_zero() {
    assert_eq!(
        output_of("fun nothing() { }\nprintln(nothing() + 5)"),
        "5\n"
    );
    assert_eq!(
        output_of("fun noop(a) { a = a + 1 }\nprintln(noop(1))"),
        "0\n"
    );
}

#[test]
fn test_return_inside_while_inside_if_stops_the_call() {
    let code = r#"
        fun find(limit) {
            var i = 0
            if (limit > 0) {
                while (1) {
                    i = i + 1
                    if (i == limit) {
                        return i * 10
                    }
                    println(i)
                }
                println(999)
            }
            println(888)
            return 0 - 1
        }
        println(find(3))
        println(find(0))
    "#;
    assert_eq!(output_of(code), "1\n2\n30\n888\n-1\n");
}

#[test]
fn test_return_in_else_branch() {
    let code = r#"
        fun sign(n) {
            if (n > 0) {
                return 1
            } else if (n < 0) {
                return -1
            } else {
                return 0
            }
            println(123)
        }
        println(sign(5), sign(-5), sign(0))
    "#;
    assert_eq!(output_of(code), "1 -1 0\n");
}

#[test]
fn test_and_evaluates_both_sides_and_uses_right() {
    let code = r#"
        fun a() { println(1) return 0 }
        fun b() { println(2) return 7 }
        println(a() && b())
        println(b() && a())
    "#;
    assert_eq!(output_of(code), "1\n2\n1\n2\n1\n0\n");
}

#[test]
fn test_or_evaluates_both_sides_and_uses_right() {
    let code = r#"
        fun a() { println(1) return 5 }
        fun b() { println(2) return 0 }
        println(a() || b())
        println(b() || a())
    "#;
    assert_eq!(output_of(code), "1\n2\n0\n2\n1\n1\n");
}

#[test]
fn test_comparisons_yield_zero_or_one() {
    assert_eq!(
        output_of("println(3 > 2, 3 < 2, 2 >= 2, 1 <= 0, 4 == 4, 4 != 4)"),
        "1 0 1 0 1 0\n"
    );
}

#[test]
fn test_arithmetic_and_precedence() {
    assert_eq!(
        output_of("println(2 + 3 * 4, (2 + 3) * 4, 10 - 4 - 3, 17 / 5, 17 % 5)"),
        "14 20 3 3 2\n"
    );
    assert_eq!(output_of("println(-7 / 2, -7 % 2)"), "-3 -1\n");
}

#[test]
fn test_arithmetic_wraps_at_32_bits() {
    assert_eq!(output_of("println(2147483647 + 1)"), "-2147483648\n");
    assert_eq!(output_of("println(-2147483648 - 1)"), "2147483647\n");
}

#[test]
fn test_undeclared_assignment_fails() {
    let err = error_of("x = 1");
    assert!(matches!(
        err,
        Error::Eval(EvalError::UndefinedName(ref name)) if name == "x"
    ));
}

#[test]
fn test_duplicate_variable_in_same_block_fails() {
    let err = error_of("var x; var x;");
    assert!(matches!(
        err,
        Error::Eval(EvalError::DuplicateDeclaration { kind: DeclarationKind::Variable, ref name })
            if name == "x"
    ));
}

#[test]
fn test_duplicate_function_in_same_block_fails() {
    let err = error_of("fun f() { }\nfun f() { }");
    assert_eq!(err.kind(), ErrorKind::DuplicateDeclaration);
    assert_eq!(
        err.to_string(),
        "Function 'f' is already defined in this scope"
    );
}

#[test]
fn test_duplicate_parameters_fail() {
    assert_eq!(
        error_of("fun f(a, a) { }\nf(1, 2)").kind(),
        ErrorKind::DuplicateDeclaration
    );
}

#[test]
fn test_same_name_in_different_frames_is_allowed() {
    let code = r#"
        var x = 1
        if (1) { var x = 2 }
        fun g(x) { var x = 3 return x }
        println(g(0))
    "#;
    assert_eq!(output_of(code), "3\n");
}

#[test]
fn test_undefined_function_fails() {
    let err = error_of("printline(1)");
    assert!(matches!(
        err,
        Error::Eval(EvalError::UndefinedFunction(ref name)) if name == "printline"
    ));
}

#[test]
fn test_arity_mismatch_fails() {
    let err = error_of("fun add(a, b) { return a + b }\nprintln(add(1))");
    assert!(matches!(
        err,
        Error::Eval(EvalError::ArityMismatch { expected: 2, found: 1, .. })
    ));
    assert_eq!(
        err.to_string(),
        "Function 'add' takes 2 argument(s) but 1 were given"
    );
}

#[test]
fn test_literal_bounds() {
    assert_eq!(
        output_of("println(2147483647, -2147483648)"),
        "2147483647 -2147483648\n"
    );
    let err = error_of("println(2147483648)");
    assert!(matches!(
        err,
        Error::Eval(EvalError::LiteralOverflow(ref text)) if text == "2147483648"
    ));
    assert_eq!(
        error_of("var big = 99999999999").kind(),
        ErrorKind::LiteralOverflow
    );
}

#[test]
fn test_division_and_modulo_by_zero_fail() {
    assert_eq!(
        error_of("println(1 / 0)").kind(),
        ErrorKind::ArithmeticFailure
    );
    assert_eq!(
        error_of("var z = 0\nprintln(5 % z)").kind(),
        ErrorKind::ArithmeticFailure
    );
}

#[test]
fn test_unbounded_recursion_reports_stack_exhaustion() {
    let config = Config {
        max_call_depth: 64,
        ..Config::default()
    };
    let (result, _) = run_with_config("fun down(n) { return down(n + 1) }\ndown(0)", &config);
    let err = result.unwrap_err();
    assert!(matches!(
        err,
        Error::Eval(EvalError::StackExhaustion { limit: 64 })
    ));
}

#[test]
fn test_recursion_within_limit_succeeds() {
    let config = Config {
        max_call_depth: 64,
        ..Config::default()
    };
    let code = "fun sum(n) { if (n == 0) { return 0 } return n + sum(n - 1) }\nprintln(sum(63))";
    let (result, output) = run_with_config(code, &config);
    assert!(result.is_ok());
    assert_eq!(output, "2016\n");
}

#[test]
fn test_deep_recursion_with_default_limit() {
    let code = r#"
        fun count(n) {
            if (n == 0) { return 0 }
            return 1 + count(n - 1)
        }
        println(count(5000))
    "#;
    assert_eq!(output_of(code), "5000\n");
}

#[test]
fn test_overlong_expression_is_rejected_before_running() {
    let code = format!("println(0)\nprintln({})", vec!["1"; 300_000].join("+"));
    let (result, output) = run_code(&code);
    assert_eq!(output, "");
    assert!(matches!(
        result,
        Err(Error::Parse(ParseError::NestingTooDeep { .. }))
    ));
}

#[test]
fn test_long_expression_within_limit_runs() {
    let code = format!("println({})", vec!["1"; 2_000].join(" + "));
    assert_eq!(output_of(&code), "2000\n");
}

#[test]
fn test_deeply_nested_blocks_are_rejected() {
    let code = format!(
        "{}println(1){}",
        "if (1) { ".repeat(10_000),
        "}".repeat(10_000)
    );
    assert_eq!(error_of(&code).kind(), ErrorKind::ParseError);
}

#[test]
fn test_user_println_takes_precedence() {
    let code = r#"
        fun println(n) {
            return n * 2
        }
        var x = println(21)
        x
    "#;
    let (result, output) = run_code(code);
    assert!(result.is_ok());
    assert_eq!(output, "");
}

#[test]
fn test_top_level_return_ends_program() {
    let (result, output) = run_code("println(1)\nreturn 5\nprintln(2)");
    assert_eq!(result.unwrap(), Flow::Returned(5));
    assert_eq!(output, "1\n");
}

#[test]
fn test_fibonacci() {
    let code = r#"
        // iterative Fibonacci
        fun fib(n) {
            var a = 0
            var b = 1
            while (n > 0) {
                var next = a + b
                a = b
                b = next
                n = n - 1
            }
            return b
        }
        var i = 0
        while (i < 6) {
            println(i, fib(i))
            i = i + 1
        }
    "#;
    assert_eq!(output_of(code), "0 1\n1 1\n2 2\n3 3\n4 5\n5 8\n");
}

#[test]
fn test_nested_function_declarations() {
    let code = r#"
        fun foo(x) {
            fun bar(y) {
                return x + y
            }
            return bar(2)
        }
        println(foo(40))
    "#;
    assert_eq!(output_of(code), "42\n");
}

#[test]
fn test_nested_function_is_local_to_its_call() {
    let code = "fun outer() { fun inner() { return 1 } return inner() }\nouter()\ninner()";
    assert_eq!(error_of(code).kind(), ErrorKind::UndefinedFunction);
}

#[test]
fn test_runs_tree_received_as_json() {
    let source = "fun f(n) { return n * 3 }\nprintln(f(14))";
    let file = parse_source(source).unwrap();
    let json = serde_json::to_string(&file).unwrap();
    let decoded: File = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, file);

    let mut out: Vec<u8> = Vec::new();
    Interpreter::new().run(&decoded, &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "42\n");
}

#[test]
fn test_json_literal_text_is_range_checked() {
    let json = r#"{"body": {"statements": [
        {"kind": "Expr", "expr": {"kind": "Literal", "text": "4294967296"}}
    ]}}"#;
    let file: File = serde_json::from_str(json).unwrap();
    let err = Interpreter::new().run(&file, &mut Vec::<u8>::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LiteralOverflow);
}

#[test]
fn test_parse_errors_stop_before_running() {
    let (result, output) = run_code("println(1)\nvar = 2");
    assert_eq!(output, "");
    assert_eq!(result.unwrap_err().kind(), ErrorKind::ParseError);
}

#[test]
fn test_run_source_helper() {
    let mut out: Vec<u8> = Vec::new();
    let flow = fun::run_source("var a = 6\nprintln(a * 7)", &mut out).unwrap();
    assert_eq!(flow, Flow::Unit);
    assert_eq!(String::from_utf8(out).unwrap(), "42\n");
}
