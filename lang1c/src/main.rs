use clap::Parser;
use diagnostics::{Diagnostic, DiagnosticPrinter, Severity};
use lang1::{
    Allocator, BoundedAlloc, CharSource, Config, Global, HasSpan, Lexer, ParseErrorKind,
    Parser as TokenWindow, Position, ReadSource, Span,
};
use std::cell::RefCell;
use std::error::Error;
use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::exit;
use tracing::info;
use tracing::level_filters::LevelFilter;

mod diagnostics;

/// Prints the token stream of a lang1 source file.
#[derive(clap::Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The file to lex. Reads standard input if omitted.
    file: Option<PathBuf>,
    /// Document name shown in diagnostics. Defaults to the file path.
    #[arg(long)]
    name: Option<String>,
    #[arg(long, default_value_t = Config::default().value_capacity)]
    value_capacity: usize,
    #[arg(long, default_value_t = Config::default().slot_capacity)]
    slot_capacity: usize,
    /// Byte budget shared by all token text buffers
    #[arg(long)]
    max_memory: Option<usize>,
    /// Repeat for more log output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }

    fn document_name(&self) -> String {
        match (&self.name, &self.file) {
            (Some(name), _) => name.clone(),
            (None, Some(file)) => file.display().to_string(),
            (None, None) => "<stdin>".to_string(),
        }
    }

    fn config(&self) -> Config {
        Config {
            value_capacity: self.value_capacity,
            slot_capacity: self.slot_capacity,
        }
    }
}

struct Report<'doc> {
    diagnostics: Vec<Diagnostic<'doc>>,
    // the input as far as it was read, for rendering diagnostics
    code: Vec<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(args.level())
        .init();

    let name = args.document_name();
    let report = match &args.file {
        Some(path) => run(
            &name,
            ReadSource::new(File::open(path)?),
            args.config(),
            args.max_memory,
        ),
        None => run(&name, lang1::source::stdin(), args.config(), args.max_memory),
    };

    if report.diagnostics.is_empty() {
        exit(0);
    }
    let printer = DiagnosticPrinter {
        diagnostics: &report.diagnostics,
        code: report.code,
    };
    eprint!("{}", printer);
    if report
        .diagnostics
        .iter()
        .any(|diagnostic| diagnostic.severity() == Severity::Error)
    {
        exit(1);
    }
    Ok(())
}

fn run<R>(
    name: &str,
    mut input: ReadSource<R>,
    config: Config,
    max_memory: Option<usize>,
) -> Report<'_>
where
    R: Read,
{
    let transcript = RefCell::new(Vec::new());
    let source = || {
        let ch = input.next_char();
        if let Some(ch) = ch {
            transcript.borrow_mut().push(ch);
        }
        ch
    };
    let mut diagnostics = match max_memory {
        Some(limit) => {
            let alloc = BoundedAlloc::new(limit);
            dump_tokens(name, source, config, &alloc)
        }
        None => dump_tokens(name, source, config, Global),
    };

    let mut transcript = transcript.into_inner();
    if let Some(err) = input.take_error() {
        let end = transcript
            .iter()
            .fold(Position::zero(), |pos, &ch| pos.advance(ch));
        diagnostics.push(Diagnostic::io_error(end.to(name, end), &err));
    } else if !diagnostics.is_empty() {
        // show the whole line the error is on
        while let Some(ch) = input.next_char() {
            if ch == b'\n' {
                break;
            }
            transcript.push(ch);
        }
    }

    Report {
        diagnostics,
        code: String::from_utf8_lossy(&transcript)
            .lines()
            .map(|line| line.to_string())
            .collect(),
    }
}

/// Prints one line per token until the end of input or the first error.
fn dump_tokens<S, A>(name: &str, source: S, config: Config, alloc: A) -> Vec<Diagnostic<'_>>
where
    S: CharSource,
    A: Allocator + Clone,
{
    let lexer = match Lexer::with_config_in(source, config, alloc) {
        Ok(lexer) => lexer,
        Err(err) => return vec![Diagnostic::out_of_memory(Span::empty(name), err)],
    };
    let mut window = match TokenWindow::with_config(name, lexer, config) {
        Ok(window) => window,
        // nothing to print for an empty document
        Err(err) if err.kind == ParseErrorKind::EndOfInput => return vec![],
        Err(err) => return vec![err.into()],
    };
    loop {
        let current = window.current();
        let span = current.span();
        match current.value() {
            Some(value) => println!(
                "{}-{}\t{}\t{}",
                span.start(),
                span.end(),
                current.token(),
                value
            ),
            None => println!("{}-{}\t{}", span.start(), span.end(), current.token()),
        }
        match window.advance() {
            Ok(()) => {}
            Err(err) if err.kind == ParseErrorKind::EndOfInput => break,
            Err(err) => return vec![err.into()],
        }
    }
    let lexer = window.lexer();
    info!(
        tokens = lexer.produced(),
        characters = lexer.consumed(),
        "finished"
    );
    vec![]
}

#[cfg(test)]
mod tests {
    use crate::diagnostics::ErrorCode;
    use crate::run;
    use lang1::{Config, ReadSource};
    use std::io::{Seek, Write};

    fn file_with(content: &str) -> ReadSource<std::fs::File> {
        let mut file = tempfile::tempfile().expect("Could not create file");
        file.write_all(content.as_bytes()).unwrap();
        file.rewind().unwrap();
        ReadSource::new(file)
    }

    #[test]
    fn clean_input_has_no_diagnostics() {
        let report = run("ok", file_with("fn f() {\n  return 1;\n}\n"), Config::default(), None);
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn empty_input_has_no_diagnostics() {
        for text in ["", " \n\n "] {
            let report = run("empty", file_with(text), Config::default(), None);
            assert!(report.diagnostics.is_empty());
        }
    }

    #[test]
    fn error_reports_the_whole_line() {
        let report = run(
            "bad",
            file_with("var a = 1;\nvar b = # 2 + 3;\nvar c;\n"),
            Config::default(),
            None,
        );
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].code, ErrorCode::UnexpectedCharacter);
        assert_eq!(format!("{}", report.diagnostics[0].span), "bad:2:9");
        assert_eq!(report.code, vec!["var a = 1;", "var b = # 2 + 3;"]);
    }

    #[test]
    fn memory_budget_is_enforced() {
        let config = Config {
            value_capacity: 4,
            slot_capacity: 4,
        };
        let report = run("oom", file_with("a_very_long_name"), config, Some(12));
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].code, ErrorCode::OutOfMemory);
    }
}
