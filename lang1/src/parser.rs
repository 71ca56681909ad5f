use crate::alloc::{AllocError, Allocator, Global};
use crate::bytebuf::ByteBuf;
use crate::config::Config;
use crate::data::{HasSpan, Span};
use crate::lexer::Lexer;
use crate::source::CharSource;
use crate::token::Token;
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("{0}")]
    Lex(Token),
    #[error("unexpected end of input")]
    EndOfInput,
    #[error(transparent)]
    OutOfMemory(#[from] AllocError),
}

/// The error that stopped a [`Parser`]. Once raised, it is returned by every
/// later call to [`Parser::advance`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{span}: {kind}")]
pub struct ParseError<'doc> {
    pub span: Span<'doc>,
    pub kind: ParseErrorKind,
}

impl<'doc> HasSpan<'doc> for ParseError<'doc> {
    fn span(&self) -> Span<'doc> {
        self.span
    }
}

/// One slot of the lookahead window.
///
/// Each slot owns its text buffer so that moving the lookahead into the
/// current slot is a swap rather than a copy.
pub struct TokenContext<'doc, A = Global>
where
    A: Allocator,
{
    token: Token,
    span: Span<'doc>,
    has_value: bool,
    value_buf: ByteBuf<A>,
}

impl<'doc, A> TokenContext<'doc, A>
where
    A: Allocator,
{
    fn with_capacity_in(
        document: &'doc str,
        capacity: usize,
        alloc: A,
    ) -> Result<TokenContext<'doc, A>, AllocError> {
        Ok(TokenContext {
            token: Token::Eof,
            span: Span::empty(document),
            has_value: false,
            value_buf: ByteBuf::with_capacity_in(capacity, alloc)?,
        })
    }

    pub fn token(&self) -> Token {
        self.token
    }

    /// The text of an identifier or literal.
    pub fn value(&self) -> Option<&str> {
        if self.has_value {
            self.value_buf.as_str()
        } else {
            None
        }
    }
}

impl<'doc, A> HasSpan<'doc> for TokenContext<'doc, A>
where
    A: Allocator,
{
    fn span(&self) -> Span<'doc> {
        self.span
    }
}

/// A two-token window over a [`Lexer`] for a grammar to match against.
///
/// `current` is the token being matched, `lookahead` the one after it.
/// The first lexical failure or end of input that reaches `current` stops
/// the parser for good: from then on no more input is read.
pub struct Parser<'doc, S, A = Global>
where
    S: CharSource,
    A: Allocator + Clone,
{
    document: &'doc str,
    lexer: Lexer<S, A>,
    current: TokenContext<'doc, A>,
    lookahead: TokenContext<'doc, A>,
    error: Option<ParseError<'doc>>,
}

impl<'doc, S, A> Parser<'doc, S, A>
where
    S: CharSource,
    A: Allocator + Clone,
{
    /// Wraps `lexer` and fills both slots, so that `current` holds the first
    /// token of the document and `lookahead` the second.
    ///
    /// Fails if the document holds no token at all, or if the first token
    /// is a lexical failure.
    pub fn new(document: &'doc str, lexer: Lexer<S, A>) -> Result<Self, ParseError<'doc>> {
        Parser::with_config(document, lexer, Config::default())
    }

    pub fn with_config(
        document: &'doc str,
        lexer: Lexer<S, A>,
        config: Config,
    ) -> Result<Self, ParseError<'doc>> {
        let slot = || {
            TokenContext::with_capacity_in(
                document,
                config.slot_capacity,
                lexer.allocator().clone(),
            )
            .map_err(|err| ParseError {
                span: Span::empty(document),
                kind: err.into(),
            })
        };
        let current = slot()?;
        let lookahead = slot()?;
        let mut parser = Parser {
            document,
            lexer,
            current,
            lookahead,
            error: None,
        };
        // the placeholder shifted out of `current` here is never checked
        parser.shift()?;
        parser.advance()?;
        Ok(parser)
    }

    pub fn document(&self) -> &'doc str {
        self.document
    }

    pub fn current(&self) -> &TokenContext<'doc, A> {
        &self.current
    }

    pub fn lookahead(&self) -> &TokenContext<'doc, A> {
        &self.lookahead
    }

    /// The error that stopped the parser, if any.
    pub fn error(&self) -> Option<&ParseError<'doc>> {
        self.error.as_ref()
    }

    pub fn lexer(&self) -> &Lexer<S, A> {
        &self.lexer
    }

    /// Releases the slots and hands the lexer back.
    pub fn into_lexer(self) -> Lexer<S, A> {
        self.lexer
    }

    fn stop(&mut self, span: Span<'doc>, kind: ParseErrorKind) -> ParseError<'doc> {
        let err = ParseError { span, kind };
        debug!(%err, "parser stopped");
        self.error = Some(err.clone());
        err
    }

    /// Moves the window one token forward.
    ///
    /// Fails if the token moved into `current` is a lexical failure or the
    /// end of input, or if memory runs out. After the first failure the
    /// window stays where it is and the same error is returned without
    /// touching the lexer.
    pub fn advance(&mut self) -> Result<(), ParseError<'doc>> {
        self.shift()?;
        match self.current.token {
            Token::Eof => Err(self.stop(self.current.span, ParseErrorKind::EndOfInput)),
            token if token.is_error() => {
                Err(self.stop(self.current.span, ParseErrorKind::Lex(token)))
            }
            _ => Ok(()),
        }
    }

    // Pulls one token into `lookahead`, moving the old lookahead into
    // `current`. Running out of memory leaves both slots as they were.
    fn shift(&mut self) -> Result<(), ParseError<'doc>> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }

        let token = match self.lexer.next() {
            Ok(token) => token,
            Err(err) => return Err(self.stop(self.lexer.span(self.document), err.into())),
        };
        let span = self.lexer.span(self.document);

        // the lexer reuses its buffer on the next call, so the text is copied
        // into the slot that leaves the window before it is rotated in
        let has_value = match self.lexer.value_buf() {
            Some(value) => match value.copy_into(&mut self.current.value_buf) {
                Ok(()) => true,
                Err(err) => return Err(self.stop(span, err.into())),
            },
            None => false,
        };
        self.current.token = token;
        self.current.span = span;
        self.current.has_value = has_value;
        std::mem::swap(&mut self.current, &mut self.lookahead);

        trace!(
            current = ?self.current.token,
            lookahead = ?self.lookahead.token,
            "advanced"
        );
        Ok(())
    }
}
