use std::{
    fs::{read_dir, read_to_string},
    path::Path,
};

use arbor::{
    diagnostic::BufferedSink,
    interpreter::{context::BufferedContext, TreeWalkInterpreter},
    lexer::scan,
    parser::Parser,
    pipeline::{run_source, RunReport, Session, EXIT_COMPILE_ERROR, EXIT_RUNTIME_ERROR},
    value::{error::RuntimeErrorKind, LoxValue},
};
use color_eyre::{eyre::Context, Result};

fn run(source: &str) -> (String, BufferedSink, RunReport) {
    let mut context = BufferedContext::new();
    let mut sink = BufferedSink::new();
    let report = run_source(source, &mut context, &mut sink);
    (context.into_data(), sink, report)
}

fn evaluate(source: &str) -> Result<LoxValue, RuntimeErrorKind> {
    let expr = Parser::new(scan(source).tokens)
        .parse_expression()
        .expect("Test expressions are valid.");
    let mut interpreter = TreeWalkInterpreter::new(BufferedContext::new());
    interpreter.evaluate(&expr).map_err(|e| e.kind)
}

#[test]
fn subtraction_is_left_associative() {
    assert_eq!(evaluate("1 - 2 - 3"), Ok(LoxValue::Number(-4.0)));
}

#[test]
fn multiplication_before_addition() {
    assert_eq!(evaluate("1 + 2 * 3"), Ok(LoxValue::Number(7.0)));
}

#[test]
fn plus_adds_numbers_and_concatenates_strings() {
    assert_eq!(evaluate("1 + 2"), Ok(LoxValue::Number(3.0)));
    assert_eq!(evaluate("\"a\" + \"b\""), Ok(LoxValue::String("ab".into())));
    assert!(matches!(
        evaluate("1 + \"b\""),
        Err(RuntimeErrorKind::NonAddable(..))
    ));
}

#[test]
fn truthiness() {
    assert_eq!(evaluate("!nil"), Ok(LoxValue::Bool(true)));
    assert_eq!(evaluate("!0"), Ok(LoxValue::Bool(false)));
    assert_eq!(evaluate("!false"), Ok(LoxValue::Bool(true)));
    assert_eq!(evaluate("!\"\""), Ok(LoxValue::Bool(false)));
}

#[test]
fn inner_declarations_do_not_leak() {
    let mut session = Session::new(BufferedContext::new());
    let mut sink = BufferedSink::new();
    let report = session.run("{ var a = 1; { var a = 2; } print a; }", &mut sink);
    assert!(report.succeeded());

    let environment = session.get_interpreter().get_environment();
    assert_eq!(environment.depth(), 1);
    assert_eq!(environment.access(environment.global(), "a"), None);
    assert_eq!(session.into_context().into_data(), "1\n");
}

#[test]
fn assignment_yields_the_assigned_value() {
    let mut session = Session::new(BufferedContext::new());
    let mut sink = BufferedSink::new();
    session.run("var a; print a = 5;", &mut sink);

    let environment = session.get_interpreter().get_environment();
    assert_eq!(
        environment.access(environment.global(), "a"),
        Some(&LoxValue::Number(5.0))
    );
    assert_eq!(session.into_context().into_data(), "5\n");
}

#[test]
fn if_without_else_and_falsy_condition_does_nothing() {
    let (output, sink, report) = run("if (false) print 1;");
    assert_eq!(output, "");
    assert!(sink.is_empty());
    assert_eq!(report.exit_code(), 0);
}

#[test]
fn globals_survive_between_runs() {
    let mut session = Session::new(BufferedContext::new());
    let mut sink = BufferedSink::new();
    session.run("var a = \"kept\";", &mut sink);
    session.run("print a;", &mut sink);
    assert!(sink.is_empty());
    assert_eq!(session.into_context().into_data(), "kept\n");
}

#[test]
fn undefined_variable_stops_the_run() {
    let (output, sink, report) = run("print 1;\nprint a;\nprint 2;");
    assert_eq!(output, "1\n");
    assert_eq!(sink.render(), "[line 2] Undefined variable 'a'.");
    assert_eq!(report.exit_code(), EXIT_RUNTIME_ERROR);
}

#[test]
fn compile_errors_still_run_remaining_statements() {
    let (output, sink, report) = run("print 1;\nprint ;\nprint 2; $");
    assert_eq!(output, "1\n2\n");
    assert_eq!(
        sink.entries(),
        &[
            (3, "Error: Unexpected character '$'.".to_string()),
            (2, "Error at ';': Expect expression.".to_string()),
        ]
    );
    assert_eq!(report.lexical_errors, 1);
    assert_eq!(report.parser_errors, 1);
    assert_eq!(report.exit_code(), EXIT_COMPILE_ERROR);
}

#[test]
fn failed_declaration_never_runs_any_part() {
    let (output, sink, report) =
        run("if (false) { print ; print \"guarded\"; }\nprint \"after\";");
    assert_eq!(output, "after\n");
    assert_eq!(sink.render(), "[line 1] Error at ';': Expect expression.");
    assert_eq!(report.exit_code(), EXIT_COMPILE_ERROR);

    let (output, sink, _) = run("var a = \"global\";\n{ var a = ; var a = \"inner\"; }\nprint a;");
    assert_eq!(output, "global\n");
    assert_eq!(sink.render(), "[line 2] Error at ';': Expect expression.");
}

#[test]
fn runtime_error_releases_block_scope() {
    let mut session = Session::new(BufferedContext::new());
    let mut sink = BufferedSink::new();
    let report = session.run("{ var x = 1; print nil + 1; }", &mut sink);
    assert!(matches!(
        report.runtime_error.map(|e| e.kind),
        Some(RuntimeErrorKind::NonAddable(..))
    ));
    assert_eq!(session.get_interpreter().get_environment().depth(), 1);

    let report = session.run("print x;", &mut sink);
    assert_eq!(
        report.runtime_error.map(|e| e.kind),
        Some(RuntimeErrorKind::UndefinedVariable("x".into()))
    );
    assert_eq!(
        sink.render(),
        "[line 1] Operands must be two numbers or two strings.\n[line 1] Undefined variable 'x'."
    );
}

#[test]
fn deeply_nested_source_is_rejected_without_crashing() {
    let depth = 20_000;
    let source = format!("print {}1{};\nprint 2;", "(".repeat(depth), ")".repeat(depth));
    let (output, sink, report) = run(&source);
    assert_eq!(output, "2\n");
    assert_eq!(sink.entries().len(), 1);
    assert!(sink.entries()[0].1.ends_with("Too much nesting."));
    assert_eq!(report.exit_code(), EXIT_COMPILE_ERROR);
}

#[test]
fn numbers_print_without_trailing_zero() {
    let (output, _, _) = run("print 3.0; print 10 / 4; print -0.5;");
    assert_eq!(output, "3\n2.5\n-0.5\n");
}

#[test]
fn test_assignment() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/assignment");
    test_engine(input_dir)
}

#[test]
fn test_block() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/block");
    test_engine(input_dir)
}

#[test]
fn test_comments() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/comments");
    test_engine(input_dir)
}

#[test]
fn test_if() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/if");
    test_engine(input_dir)
}

#[test]
fn test_operator() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/operator");
    test_engine(input_dir)
}

#[test]
fn test_print() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/print");
    test_engine(input_dir)
}

#[test]
fn test_variable() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/variable");
    test_engine(input_dir)
}

struct TestCase {
    name: String,
    source: String,
    output: String,
    errors: String,
    exit_code: u8,
}

impl TestCase {
    pub fn check(&self) {
        let (output, sink, report) = run(&self.source);
        assert_eq!(self.errors, sink.render(), "Failed test {} errors.", self.name);
        assert_eq!(self.output, output, "Failed test {} at print.", self.name);
        assert_eq!(
            self.exit_code,
            report.exit_code(),
            "Failed test {} exit code.",
            self.name
        );
    }
}

fn test_engine(input_dir: &Path) -> Result<()> {
    let mut succeeded = true;
    for entry in read_dir(input_dir).context("Failed to open input test data folder")? {
        let entry = entry?;
        let path = entry.path();

        let Some(extension) = path.extension() else {
            continue;
        };

        if extension != "lox" {
            continue;
        }

        println!("Parsing {path:?}");
        let test_case = parse_test_case(&path)?;
        println!("Checking {}", test_case.name);

        let res = std::panic::catch_unwind(|| {
            test_case.check();
        });
        if res.is_err() {
            println!("\tFails test case {}", test_case.name);
            succeeded = false;
        }
    }

    assert!(succeeded);

    Ok(())
}

fn parse_test_case(input_path: &Path) -> Result<TestCase> {
    let test_name = AsRef::<Path>::as_ref(
        input_path
            .file_name()
            .expect("File name can't be none as the path is to a real file."),
    )
    .to_string_lossy();

    let input = read_to_string(input_path).context("Failed to open input test data file")?;

    let mut source_lines = Vec::new();
    let mut expected_outputs = Vec::new();
    let mut expected_compiler_errors = Vec::new();
    let mut expected_runtime_errors = Vec::new();

    for (line_index, line) in input.lines().enumerate() {
        let line_number = line_index + 1;
        if let Some((_, expected)) = line.split_once("// expect:") {
            expected_outputs.push(format!("{}\n", expected.trim()));
        } else if let Some((_, expected)) = line.split_once("// Error") {
            expected_compiler_errors.push(format!("[line {line_number}] Error{}", expected.trim_end()));
        } else if let Some((_, expected)) = line.split_once("// [line ") {
            expected_compiler_errors.push(format!("[line {}", expected.trim()));
        } else if let Some((_, expected)) = line.split_once("// expect runtime error:") {
            expected_runtime_errors.push(format!("[line {line_number}] {}", expected.trim()));
        }
        source_lines.push(line.to_string());
    }

    let exit_code = if !expected_compiler_errors.is_empty() {
        EXIT_COMPILE_ERROR
    } else if !expected_runtime_errors.is_empty() {
        EXIT_RUNTIME_ERROR
    } else {
        0
    };
    expected_compiler_errors.extend(expected_runtime_errors);

    Ok(TestCase {
        name: test_name.into_owned(),
        source: source_lines.join("\n"),
        output: expected_outputs.concat(),
        errors: expected_compiler_errors.join("\n"),
        exit_code,
    })
}
