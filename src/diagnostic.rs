use crate::lexer::{LexicalError, LexicalErrorKind, LineBreaks, Span};
use crate::parser::{ParserError, ParserErrorKind};
use crate::value::error::{RuntimeError, RuntimeErrorKind};
use ariadne::{Color, Label, Report, ReportKind, Source};

const ARIADNE_WRITE_MSG: &str = "Write into buffer should not fail.";

/// Common view over the errors of every phase.
pub trait Diagnostic {
    fn code(&self) -> &'static str;
    /// One-line description, e.g. `Error at ';': Expect expression.`
    fn message(&self) -> String;
    /// Short annotation placed under the offending source text.
    fn label(&self) -> String;
    fn span(&self) -> Span;

    fn line(&self, line_breaks: &LineBreaks) -> u32 {
        line_breaks.get_line_from_span(self.span())
    }
}

impl Diagnostic for LexicalError {
    fn code(&self) -> &'static str {
        LexicalError::code(self)
    }

    fn message(&self) -> String {
        format!("Error: {self}")
    }

    fn label(&self) -> String {
        match self.kind {
            LexicalErrorKind::Unrecognized(c) => format!("`{c}` is not part of the language"),
            LexicalErrorKind::UnterminatedString => "String literal is never closed".into(),
        }
    }

    fn span(&self) -> Span {
        self.span
    }

    fn line(&self, _: &LineBreaks) -> u32 {
        self.line
    }
}

impl Diagnostic for ParserError {
    fn code(&self) -> &'static str {
        ParserError::code(self)
    }

    fn message(&self) -> String {
        format!("{self}")
    }

    fn label(&self) -> String {
        match self.kind {
            ParserErrorKind::MissingToken { expected, .. } => {
                format!("Expected {expected} here")
            }
            ParserErrorKind::ExpectedVariableName => "Expected an identifier here".into(),
            ParserErrorKind::ExpectedExpression => "Not the start of an expression".into(),
            ParserErrorKind::InvalidAssignmentTarget => {
                "Only variables can be assigned to".into()
            }
            ParserErrorKind::TooDeeplyNested => "Nested too deeply to parse".into(),
        }
    }

    fn span(&self) -> Span {
        self.span
    }

    fn line(&self, _: &LineBreaks) -> u32 {
        self.line
    }
}

impl Diagnostic for RuntimeError {
    fn code(&self) -> &'static str {
        RuntimeError::code(self)
    }

    fn message(&self) -> String {
        format!("{self}")
    }

    fn label(&self) -> String {
        match self.kind {
            RuntimeErrorKind::NonNumeric(ref v) => {
                format!("Type is {} instead of numeric", v.describe())
            }
            RuntimeErrorKind::NonNumerics(ref lhs, ref rhs) => format!(
                "One or both of {} and {} is not numeric",
                lhs.describe(),
                rhs.describe()
            ),
            RuntimeErrorKind::NonAddable(ref lhs, ref rhs) => format!(
                "{} and {} are not both numbers or both strings",
                lhs.describe(),
                rhs.describe()
            ),
            RuntimeErrorKind::UndefinedVariable(ref name) => {
                format!("`{name}` has not been defined in any enclosing scope")
            }
        }
    }

    fn span(&self) -> Span {
        self.span
    }
}

/// Receives `(line, message)` pairs for every scan, parse and runtime error.
pub trait ErrorSink {
    fn report(&mut self, line: u32, message: &str);

    fn report_diagnostic(&mut self, diagnostic: &dyn Diagnostic, line_breaks: &LineBreaks) {
        self.report(diagnostic.line(line_breaks), &diagnostic.message());
    }
}

impl<S: ErrorSink + ?Sized> ErrorSink for &mut S {
    fn report(&mut self, line: u32, message: &str) {
        (**self).report(line, message)
    }

    fn report_diagnostic(&mut self, diagnostic: &dyn Diagnostic, line_breaks: &LineBreaks) {
        (**self).report_diagnostic(diagnostic, line_breaks)
    }
}

/// Keeps every report in memory.
#[derive(Debug, Default)]
pub struct BufferedSink {
    entries: Vec<(u32, String)>,
}

impl BufferedSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[(u32, String)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All reports as `[line N] message`, one per line.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|(line, message)| format!("[line {line}] {message}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl ErrorSink for BufferedSink {
    fn report(&mut self, line: u32, message: &str) {
        self.entries.push((line, message.into()));
    }
}

/// Writes `[line N] message` to standard error.
pub struct StderrSink;

impl ErrorSink for StderrSink {
    fn report(&mut self, line: u32, message: &str) {
        eprintln!("[line {line}] {message}");
    }
}

/// Writes source-annotated reports to standard error.
pub struct PrettySink<'src> {
    text: &'src str,
    path: &'src str,
}

impl<'src> PrettySink<'src> {
    pub fn new(text: &'src str, path: &'src str) -> Self {
        Self { text, path }
    }

    pub fn render(&self, diagnostic: &dyn Diagnostic) -> String {
        let span = diagnostic.span().range();
        let mut output = Vec::new();
        Report::build(ReportKind::Error, (self.path, span.clone()))
            .with_code(diagnostic.code())
            .with_message(diagnostic.message())
            .with_label(
                Label::new((self.path, span))
                    .with_message(diagnostic.label())
                    .with_color(Color::BrightRed),
            )
            .finish()
            .write((self.path, Source::from(self.text)), &mut output)
            .expect(ARIADNE_WRITE_MSG);
        String::from_utf8_lossy(&output).into_owned()
    }
}

impl<'src> ErrorSink for PrettySink<'src> {
    fn report(&mut self, line: u32, message: &str) {
        eprintln!("[line {line}] {message}");
    }

    fn report_diagnostic(&mut self, diagnostic: &dyn Diagnostic, _: &LineBreaks) {
        eprint!("{}", self.render(diagnostic));
    }
}
