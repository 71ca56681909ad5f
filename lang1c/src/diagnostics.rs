use lang1::{AllocError, HasSpan, ParseError, ParseErrorKind, Span};
use std::fmt::{Display, Formatter};
use std::io;
use strum::{AsRefStr, EnumString};

#[derive(PartialEq, Debug, Copy, Clone, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorCode {
    UnexpectedCharacter,
    UnexpectedEof,
    OutOfMemory,
    IoError,
}

impl ErrorCode {
    pub fn severity(&self) -> Severity {
        match self {
            ErrorCode::UnexpectedCharacter | ErrorCode::UnexpectedEof | ErrorCode::OutOfMemory => {
                Severity::Error
            }
            // everything lexed before the failure is still valid
            ErrorCode::IoError => Severity::Warning,
        }
    }
}

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum Severity {
    Error,
    Warning,
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct Diagnostic<'doc> {
    pub code: ErrorCode,
    pub span: Span<'doc>,
    pub message: String,
}

impl<'doc> Diagnostic<'doc> {
    pub fn new(span: Span<'doc>, code: ErrorCode, message: impl Into<String>) -> Diagnostic<'doc> {
        Diagnostic {
            code,
            span,
            message: message.into(),
        }
    }

    pub fn out_of_memory(span: Span<'doc>, err: AllocError) -> Diagnostic<'doc> {
        Diagnostic::new(span, ErrorCode::OutOfMemory, format!("{err}"))
    }

    pub fn io_error(span: Span<'doc>, err: &io::Error) -> Diagnostic<'doc> {
        Diagnostic::new(span, ErrorCode::IoError, format!("input truncated: {err}"))
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }
}

impl<'doc> From<ParseError<'doc>> for Diagnostic<'doc> {
    fn from(err: ParseError<'doc>) -> Self {
        match err.kind {
            ParseErrorKind::Lex(token) => {
                Diagnostic::new(err.span, ErrorCode::UnexpectedCharacter, format!("{token}"))
            }
            ParseErrorKind::EndOfInput => {
                Diagnostic::new(err.span, ErrorCode::UnexpectedEof, "unexpected end of input")
            }
            ParseErrorKind::OutOfMemory(alloc_err) => Diagnostic::out_of_memory(err.span, alloc_err),
        }
    }
}

impl<'doc> HasSpan<'doc> for Diagnostic<'doc> {
    fn span(&self) -> Span<'doc> {
        self.span
    }
}

pub struct DiagnosticPrinter<'a, 'doc> {
    pub diagnostics: &'a [Diagnostic<'doc>],
    pub code: Vec<String>,
}

impl DiagnosticPrinter<'_, '_> {
    fn fmt_diagnostic(&self, f: &mut Formatter<'_>, diagnostic: &Diagnostic) -> std::fmt::Result {
        let start = diagnostic.span.start();
        let end = diagnostic.span.end();
        let line = self
            .code
            .get(start.row() as usize)
            .map(String::as_str)
            .unwrap_or_default();
        // keep tabs so the caret lines up
        let line_empty: String = line
            .chars()
            .map(|ch| if !ch.is_ascii_whitespace() { ' ' } else { ch })
            .take(start.col() as usize)
            .collect();

        let prefix = format!("{}", start.row() + 1);
        let prefix_empty = " ".repeat(prefix.len());
        writeln!(
            f,
            "{}[{}] --> {}",
            diagnostic.severity(),
            diagnostic.code.as_ref(),
            diagnostic.span
        )?;
        writeln!(f, "{} |", prefix_empty)?;
        writeln!(f, "{} | {}", prefix, line)?;
        let len = if start.row() == end.row() && end.col() > start.col() {
            end.col() - start.col()
        } else {
            1
        };
        write!(
            f,
            "{} | {}{}",
            prefix_empty,
            line_empty,
            "^".repeat(len as usize)
        )?;
        write!(f, " {}", diagnostic.message)?;
        Ok(())
    }
}

impl Display for DiagnosticPrinter<'_, '_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for diagnostic in self.diagnostics.iter() {
            self.fmt_diagnostic(f, diagnostic)?;
            writeln!(f)?;
            writeln!(f)?;
        }
        Ok(())
    }
}
