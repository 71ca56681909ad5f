use std::fmt::{Display, Formatter};
use strum::{EnumIter, EnumString, IntoStaticStr};

/// Reserved words. The string form of each variant is its spelling in source.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, EnumString, IntoStaticStr, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Keyword {
    If,
    Return,
    Goto,
    Fn,
    Const,
    Var,
    Val,
    Export,
    Void,
    Int,
    Bool,
    True,
    False,
    Ptr,
}

impl Keyword {
    /// Exact, case-sensitive lookup of a whole word.
    pub fn from_word(word: &str) -> Option<Keyword> {
        word.parse().ok()
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Token {
    Ident,
    DecLit,

    Colon,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Semi,
    Assign,
    Comma,

    Keyword(Keyword),

    BoolAnd,
    BoolOr,
    BoolNot,

    Eq,
    NEq,
    GtEq,
    LtEq,
    Gt,
    Lt,

    Add,
    Sub,
    Mul,
    Div,

    BinOr,
    BinAnd,
    BinNot,
    XOr,
    XAnd,
    RShift,
    LShift,

    /// No more input. Every later request yields this again.
    Eof,
    /// A character that starts no token.
    Unexpected(u8),
}

impl Token {
    /// The textual representation of the token class.
    pub fn text(&self) -> &'static str {
        use Token::*;
        match self {
            Ident => "(ident)",
            DecLit => "(decimal_lit)",
            Colon => ":",
            LParen => "(",
            RParen => ")",
            LBrace => "{",
            RBrace => "}",
            Semi => ";",
            Assign => "=",
            Comma => ",",
            Token::Keyword(keyword) => (*keyword).into(),
            BoolAnd => "&&",
            BoolOr => "||",
            BoolNot => "!",
            Eq => "==",
            NEq => "!=",
            GtEq => ">=",
            LtEq => "<=",
            Gt => ">",
            Lt => "<",
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            BinOr => "|",
            BinAnd => "&",
            BinNot => "~",
            XOr => "~|",
            XAnd => "~&",
            RShift => ">>",
            LShift => "<<",
            Eof => "(eof)",
            Unexpected(_) => "(unexpected)",
        }
    }

    /// Whether the token carries text in addition to its kind.
    pub fn has_value(&self) -> bool {
        matches!(self, Token::Ident | Token::DecLit)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Token::Unexpected(_))
    }

    /// Whether no token can follow this one.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Token::Eof | Token::Unexpected(_))
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Ident => write!(f, "identifier"),
            Token::DecLit => write!(f, "decimal literal"),
            Token::Eof => write!(f, "end of input"),
            Token::Unexpected(ch) => write!(f, "unexpected character '{}'", ch.escape_ascii()),
            other => write!(f, "'{}'", other.text()),
        }
    }
}

/// How the first character of a token decides what is lexed next.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum CharClass {
    Whitespace,
    IdentStart,
    Digit,
    Operator,
    Unrecognized,
}

pub fn classify(ch: u8) -> CharClass {
    match ch {
        b' ' | b'\t' | b'\n' | b'\r' | b'\x0b' | b'\x0c' => CharClass::Whitespace,
        b'a'..=b'z' | b'A'..=b'Z' | b'_' => CharClass::IdentStart,
        b'0'..=b'9' => CharClass::Digit,
        b'(' | b')' | b'{' | b'}' | b';' | b',' | b':' | b'+' | b'-' | b'*' | b'/' | b'!'
        | b'>' | b'<' | b'=' | b'|' | b'&' | b'~' => CharClass::Operator,
        _ => CharClass::Unrecognized,
    }
}

/// Characters that may continue an identifier or keyword.
pub fn is_word_char(ch: u8) -> bool {
    ch.is_ascii_alphanumeric() || ch == b'_'
}
