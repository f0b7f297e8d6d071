use arbor::diagnostic::{PrettySink, StderrSink};
use arbor::interpreter::context::StdioContext;
use arbor::pipeline::{self, EXIT_COMPILE_ERROR};
use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::Result;
use std::path::PathBuf;
use std::{fs::read_to_string, process::ExitCode};

#[derive(Debug, Parser)]
#[clap(name = "arbor", version)]
pub struct CLArgs {
    #[clap(subcommand)]
    pub routine: ArborCommand,
}

#[derive(Debug, Subcommand)]
pub enum ArborCommand {
    /// Print every token of the file.
    Tokenize {
        path: PathBuf,
        #[clap(long = "format", value_enum, default_value = "basic")]
        format: TokenFormat,
    },
    /// Print the syntax tree of every declaration in the file.
    Parse {
        path: PathBuf,
        #[clap(long = "format", value_enum, default_value = "sexpr")]
        format: ProgramFormat,
    },
    /// Run the file.
    Run {
        path: PathBuf,
        #[clap(long = "errors", value_enum, default_value = "basic")]
        errors: ErrorFormat,
    },
}

#[derive(Debug, Clone, ValueEnum)]
pub enum TokenFormat {
    Debug,
    Basic,
    Line,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ProgramFormat {
    Debug,
    #[clap(name = "sexpr")]
    SExpr,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ErrorFormat {
    /// `[line N] message`
    Basic,
    /// Source snippets with the offending region highlighted.
    Pretty,
}

fn main() -> ExitCode {
    arbor_main().expect("Encountered an error!")
}

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // Only initialize if RUST_LOG is set
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true),
            )
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn arbor_main() -> Result<ExitCode> {
    color_eyre::install().expect("Can't fail at first call!");
    init_tracing();
    let args = CLArgs::parse();
    let succeeded = match args.routine {
        ArborCommand::Tokenize { path, format } => {
            tracing::info!(?path, "tokenizing");
            let src = read_to_string(path)?;
            tokenize(&src, &format)
        }
        ArborCommand::Parse { path, format } => {
            tracing::info!(?path, "parsing");
            let src = read_to_string(path)?;
            parse(&src, &format)
        }
        ArborCommand::Run { path, errors } => {
            tracing::info!(?path, "running");
            let src = read_to_string(&path)?;
            let report = match errors {
                ErrorFormat::Basic => pipeline::run_source(&src, StdioContext, &mut StderrSink),
                ErrorFormat::Pretty => {
                    let name = path.to_string_lossy();
                    let mut sink = PrettySink::new(&src, &name);
                    pipeline::run_source(&src, StdioContext, &mut sink)
                }
            };
            return Ok(ExitCode::from(report.exit_code()));
        }
    };
    if succeeded {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_COMPILE_ERROR))
    }
}

fn tokenize(src: &str, format: &TokenFormat) -> bool {
    use arbor::lexer::formatter::{
        BasicFormatter, DebugFormatter, LineFormatter, ToFormatter, TokenFormatter,
    };
    use arbor::lexer::{Lexer, TokenKind};

    let mut scanner = Lexer::new(src);
    let formatter: Box<dyn TokenFormatter> = match format {
        TokenFormat::Debug => Box::new(ToFormatter::<DebugFormatter>::create_formatter(&scanner)),
        TokenFormat::Basic => Box::new(ToFormatter::<BasicFormatter>::create_formatter(&scanner)),
        TokenFormat::Line => Box::new(ToFormatter::<LineFormatter>::create_formatter(&scanner)),
    };
    let mut succeeded = true;
    loop {
        match scanner.next_token() {
            Ok(token) => {
                println!("{}", formatter.format(&token));
                if matches!(token.kind, TokenKind::Eof) {
                    return succeeded;
                }
            }
            Err(error) => {
                eprintln!("{}", formatter.format_lexical_error(&error));
                succeeded = false;
            }
        };
    }
}

fn parse(src: &str, format: &ProgramFormat) -> bool {
    use arbor::lexer::{formatter::BasicFormatter, formatter::TokenFormatter, scan};
    use arbor::parser::formatter::{
        DebugFormatter, ExpressionFormatter, ProgramFormatter, SExpressionFormatter,
    };
    use arbor::parser::Parser;

    let scan = scan(src);
    for error in scan.errors.iter() {
        eprintln!("{}", BasicFormatter.format_lexical_error(error));
    }
    let parsed = Parser::new(scan.tokens).parse();
    let (program_formatter, error_formatter): (
        Box<dyn ProgramFormatter>,
        Box<dyn ExpressionFormatter>,
    ) = match format {
        ProgramFormat::Debug => (Box::new(DebugFormatter), Box::new(DebugFormatter)),
        ProgramFormat::SExpr => (
            Box::new(SExpressionFormatter),
            Box::new(SExpressionFormatter),
        ),
    };
    print!("{}", program_formatter.format_program(&parsed.program));
    for error in parsed.errors.iter() {
        eprintln!("{}", error_formatter.format_error(error));
    }
    scan.errors.is_empty() && parsed.errors.is_empty()
}
