//! Lexical front end of the lang1 compiler.
//!
//! A [`CharSource`] feeds a [`Lexer`], which a [`Parser`] wraps in a
//! two-token lookahead window for the grammar to consume.
pub mod alloc;
pub mod ast;
pub mod bytebuf;
mod config;
mod data;
pub mod lexer;
pub mod parser;
pub mod source;
pub mod token;

pub use alloc::{AllocError, Allocator, BoundedAlloc, Global};
pub use bytebuf::ByteBuf;
pub use config::Config;
pub use data::{HasSpan, Position, Span};
pub use lexer::Lexer;
pub use parser::{ParseError, ParseErrorKind, Parser, TokenContext};
pub use source::{CharSource, ReadSource, StrSource};
pub use token::{Keyword, Token};
