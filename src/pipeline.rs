use crate::diagnostic::ErrorSink;
use crate::interpreter::{context::SystemContext, TreeWalkInterpreter};
use crate::lexer::{self, LineBreaks};
use crate::parser::Parser;
use crate::value::error::RuntimeError;
use tracing::{debug, info};

/// Exit status for malformed input, matching `EX_DATAERR`.
pub const EXIT_COMPILE_ERROR: u8 = 65;
/// Exit status for a failure while running, matching `EX_SOFTWARE`.
pub const EXIT_RUNTIME_ERROR: u8 = 70;

/// What happened while running one source text.
#[derive(Debug, Default)]
pub struct RunReport {
    pub lexical_errors: usize,
    pub parser_errors: usize,
    pub runtime_error: Option<RuntimeError>,
}

impl RunReport {
    pub fn had_compile_error(&self) -> bool {
        self.lexical_errors > 0 || self.parser_errors > 0
    }

    pub fn succeeded(&self) -> bool {
        !self.had_compile_error() && self.runtime_error.is_none()
    }

    pub fn exit_code(&self) -> u8 {
        if self.had_compile_error() {
            EXIT_COMPILE_ERROR
        } else if self.runtime_error.is_some() {
            EXIT_RUNTIME_ERROR
        } else {
            0
        }
    }
}

/// An interpreter whose global scope survives across source texts.
pub struct Session<C: SystemContext> {
    interpreter: TreeWalkInterpreter<C>,
}

impl<C: SystemContext> Session<C> {
    pub fn new(context: C) -> Self {
        Self {
            interpreter: TreeWalkInterpreter::new(context),
        }
    }

    /// Scans, parses and runs `source`, reporting every error to `sink`.
    ///
    /// Declarations that fail to scan or parse are dropped; the remaining
    /// statements still run. The first runtime error stops the run.
    pub fn run<S: ErrorSink>(&mut self, source: &str, sink: &mut S) -> RunReport {
        let line_breaks = LineBreaks::new(source);
        let mut report = RunReport::default();

        let scan = lexer::scan(source);
        debug!(
            tokens = scan.tokens.len(),
            errors = scan.errors.len(),
            "scanned source"
        );
        for error in scan.errors.iter() {
            sink.report_diagnostic(error, &line_breaks);
        }
        report.lexical_errors = scan.errors.len();

        let parsed = Parser::new(scan.tokens).parse();
        debug!(
            statements = parsed.program.len(),
            errors = parsed.errors.len(),
            "parsed program"
        );
        for error in parsed.errors.iter() {
            sink.report_diagnostic(error, &line_breaks);
        }
        report.parser_errors = parsed.errors.len();

        if let Err(error) = self.interpreter.run(&parsed.program) {
            info!(code = error.code(), %error, "runtime error");
            sink.report_diagnostic(&error, &line_breaks);
            report.runtime_error = Some(error);
        }
        report
    }

    pub fn get_interpreter(&self) -> &TreeWalkInterpreter<C> {
        &self.interpreter
    }

    pub fn into_context(self) -> C {
        self.interpreter.into_context()
    }
}

/// One-shot convenience over [`Session::run`].
pub fn run_source<C: SystemContext, S: ErrorSink>(
    source: &str,
    context: C,
    sink: &mut S,
) -> RunReport {
    Session::new(context).run(source, sink)
}
