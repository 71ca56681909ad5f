use crate::alloc::{AllocError, Allocator, Global};
use crate::bytebuf::ByteBuf;
use crate::config::Config;
use crate::data::{Position, Span};
use crate::source::{CharSource, StrSource};
use crate::token::{classify, is_word_char, CharClass, Keyword, Token};
use tracing::trace;

/// A streaming lexer over a [`CharSource`].
///
/// The lexer looks exactly one character past the one it is classifying.
/// Lexical failures are not errors: the end of input is reported as
/// [`Token::Eof`] and an unclassifiable character as [`Token::Unexpected`].
/// The only failure `next` can return is running out of memory.
pub struct Lexer<S, A = Global>
where
    S: CharSource,
    A: Allocator,
{
    source: S,
    // set once the source reported the end of the stream; it is not asked again
    exhausted: bool,
    seeded: bool,
    cur_char: Option<u8>,
    next_char: Option<u8>,
    consumed: usize,
    produced: usize,
    value_buf: ByteBuf<A>,
    has_value: bool,
    start_pos: Position,
    // position of `cur_char`
    char_pos: Position,
    // position just past `cur_char`
    cur_pos: Position,
}

impl Lexer<StrSource> {
    pub fn from_text(text: impl Into<String>) -> Result<Lexer<StrSource>, AllocError> {
        Lexer::new(StrSource::from_string(text))
    }
}

impl<S> Lexer<S>
where
    S: CharSource,
{
    pub fn new(source: S) -> Result<Lexer<S>, AllocError> {
        Lexer::with_config_in(source, Config::default(), Global)
    }
}

impl<S, A> Lexer<S, A>
where
    S: CharSource,
    A: Allocator,
{
    pub fn with_config_in(source: S, config: Config, alloc: A) -> Result<Lexer<S, A>, AllocError> {
        Ok(Lexer {
            source,
            exhausted: false,
            seeded: false,
            cur_char: None,
            next_char: None,
            consumed: 0,
            produced: 0,
            value_buf: ByteBuf::with_capacity_in(config.value_capacity, alloc)?,
            has_value: false,
            start_pos: Position::zero(),
            char_pos: Position::zero(),
            cur_pos: Position::zero(),
        })
    }

    /// Starts over on a new source, keeping the allocated storage.
    /// Returns the previous source.
    pub fn reset(&mut self, source: S) -> S {
        self.exhausted = false;
        self.seeded = false;
        self.cur_char = None;
        self.next_char = None;
        self.consumed = 0;
        self.produced = 0;
        self.value_buf.clear();
        self.has_value = false;
        self.start_pos = Position::zero();
        self.char_pos = Position::zero();
        self.cur_pos = Position::zero();
        std::mem::replace(&mut self.source, source)
    }

    pub fn into_source(self) -> S {
        self.source
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// The running total of characters consumed.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// The running total of tokens produced.
    /// Neither the end of input nor unexpected characters count.
    pub fn produced(&self) -> usize {
        self.produced
    }

    /// Where the last token started.
    pub fn start_pos(&self) -> Position {
        self.start_pos
    }

    /// The position just past the last consumed character.
    pub fn cur_pos(&self) -> Position {
        self.cur_pos
    }

    /// The span of the last token.
    pub fn span<'doc>(&self, document: &'doc str) -> Span<'doc> {
        self.start_pos.to(document, self.cur_pos)
    }

    /// The text of the last token, for identifiers and literals.
    ///
    /// The borrow ends before the next call to [`Lexer::next`]; copy the
    /// text out to keep it longer.
    pub fn token_value(&self) -> Option<&str> {
        if self.has_value {
            self.value_buf.as_str()
        } else {
            None
        }
    }

    pub(crate) fn value_buf(&self) -> Option<&ByteBuf<A>> {
        self.has_value.then_some(&self.value_buf)
    }

    pub fn allocator(&self) -> &A {
        self.value_buf.allocator()
    }

    fn read(&mut self) -> Option<u8> {
        if self.exhausted {
            return None;
        }
        let ch = self.source.next_char();
        self.exhausted = ch.is_none();
        ch
    }

    // Admits the lookahead character. Returns `None` at the end of input.
    fn advance(&mut self) -> Option<u8> {
        self.cur_char = if self.seeded {
            self.next_char
        } else {
            self.seeded = true;
            self.read()
        };
        self.next_char = self.read();

        let Some(ch) = self.cur_char else {
            self.has_value = false;
            return None;
        };
        self.consumed += 1;
        self.char_pos = self.cur_pos;
        self.cur_pos = self.cur_pos.advance(ch);
        Some(ch)
    }

    fn take_while<F>(&mut self, cond: F) -> Result<(), AllocError>
    where
        F: Fn(u8) -> bool,
    {
        while let Some(ch) = self.next_char.filter(|&ch| cond(ch)) {
            self.advance();
            self.value_buf.push(ch)?;
        }
        Ok(())
    }

    // alpha-numeric sequence, possibly starting with '_'
    fn word(&mut self) -> Result<Token, AllocError> {
        self.take_while(is_word_char)?;
        match self.value_buf.as_str().and_then(Keyword::from_word) {
            Some(keyword) => Ok(Token::Keyword(keyword)),
            None => Ok(Token::Ident),
        }
    }

    // decimal integer literal
    fn number(&mut self) -> Result<Token, AllocError> {
        self.take_while(|ch| ch.is_ascii_digit())?;
        Ok(Token::DecLit)
    }

    // Picks the first two-character token whose second character is next,
    // falling back to the single-character token.
    fn longest(&mut self, candidates: &[(u8, Token)], single: Token) -> Token {
        let next = self.next_char;
        match candidates.iter().find(|(second, _)| next == Some(*second)) {
            Some((_, token)) => {
                self.advance();
                *token
            }
            None => single,
        }
    }

    fn operator(&mut self, ch: u8) -> Option<Token> {
        use Token::*;
        let token = match ch {
            b'(' => LParen,
            b')' => RParen,
            b'{' => LBrace,
            b'}' => RBrace,
            b';' => Semi,
            b',' => Comma,
            b':' => Colon,
            b'+' => Add,
            b'-' => Sub,
            b'*' => Mul,
            b'/' => Div,
            b'!' => self.longest(&[(b'=', NEq)], BoolNot),
            b'>' => self.longest(&[(b'=', GtEq), (b'>', RShift)], Gt),
            b'<' => self.longest(&[(b'<', LShift), (b'=', LtEq)], Lt),
            b'=' => self.longest(&[(b'=', Eq)], Assign),
            b'|' => self.longest(&[(b'|', BoolOr)], BinOr),
            b'&' => self.longest(&[(b'&', BoolAnd)], BinAnd),
            b'~' => self.longest(&[(b'&', XAnd), (b'|', XOr)], BinNot),
            _ => return None,
        };
        Some(token)
    }

    fn classified(&mut self, ch: u8, class: CharClass) -> Result<Option<Token>, AllocError> {
        self.value_buf.push(ch)?;
        Ok(match class {
            CharClass::IdentStart => Some(self.word()?),
            CharClass::Digit => Some(self.number()?),
            CharClass::Operator => self.operator(ch),
            CharClass::Whitespace | CharClass::Unrecognized => None,
        })
    }

    /// Lexes the next token.
    pub fn next(&mut self) -> Result<Token, AllocError> {
        self.value_buf.clear();
        self.has_value = false;

        let (ch, class) = loop {
            let Some(ch) = self.advance() else {
                self.start_pos = self.cur_pos;
                return Ok(Token::Eof);
            };
            match classify(ch) {
                CharClass::Whitespace => continue,
                class => break (ch, class),
            }
        };

        // counted up front, taken back if no token comes of it
        self.produced += 1;
        self.start_pos = self.char_pos;

        let token = match self.classified(ch, class) {
            Ok(Some(token)) => token,
            Ok(None) => {
                self.produced -= 1;
                Token::Unexpected(ch)
            }
            Err(err) => {
                self.produced -= 1;
                self.has_value = false;
                return Err(err);
            }
        };
        self.has_value = token.has_value();
        trace!(
            ?token,
            value = self.token_value(),
            start = %self.start_pos,
            end = %self.cur_pos,
            "lexed token"
        );
        Ok(token)
    }
}

/// Yields every token with its text up to, but not including, the end of
/// input. Unexpected characters are yielded and lexing continues after them.
impl<S, A> Iterator for Lexer<S, A>
where
    S: CharSource,
    A: Allocator,
{
    type Item = Result<(Token, Option<String>), AllocError>;

    fn next(&mut self) -> Option<Self::Item> {
        match Lexer::next(self) {
            Ok(Token::Eof) => None,
            Ok(token) => Some(Ok((token, self.token_value().map(str::to_string)))),
            Err(err) => Some(Err(err)),
        }
    }
}

#[cfg(test)]
mod test {
    use crate::alloc::{AllocError, BoundedAlloc};
    use crate::config::Config;
    use crate::data::Position;
    use crate::lexer::Lexer;
    use crate::source::StrSource;
    use crate::test::CountingSource;
    use crate::token::Keyword::*;
    use crate::token::Token;
    use crate::token::Token::*;
    use itertools::Itertools;

    fn tokenize_fully(text: &str) -> Vec<(Token, Option<String>)> {
        Lexer::from_text(text)
            .unwrap()
            .map(|lexed| lexed.unwrap())
            .collect_vec()
    }

    fn kinds(text: &str) -> Vec<Token> {
        tokenize_fully(text)
            .into_iter()
            .map(|(token, _)| token)
            .collect_vec()
    }

    #[test]
    pub fn identifiers_across_lines() {
        let mut lexer = Lexer::from_text("hello\n there").unwrap();

        assert_eq!(lexer.next(), Ok(Ident));
        assert_eq!(lexer.consumed(), "hello".len());
        assert_eq!(lexer.token_value(), Some("hello"));

        assert_eq!(lexer.next(), Ok(Ident));
        assert_eq!(lexer.token_value(), Some("there"));

        assert_eq!(lexer.next(), Ok(Eof));
        assert_eq!(lexer.token_value(), None);
        assert_eq!(lexer.produced(), 2);
        assert_eq!(lexer.consumed(), "hello\n there".len());
    }

    #[test]
    pub fn keywords_and_operators() {
        assert_eq!(
            kinds("if (true) <="),
            vec![Keyword(If), LParen, Keyword(True), RParen, LtEq]
        );
    }

    #[test]
    pub fn keywords_carry_no_value() {
        let mut lexer = Lexer::from_text("return").unwrap();
        assert_eq!(lexer.next(), Ok(Keyword(Return)));
        assert_eq!(lexer.token_value(), None);
        assert_eq!(lexer.produced(), 1);
    }

    #[test]
    pub fn keyword_prefixes_and_case_are_identifiers() {
        assert_eq!(
            tokenize_fully("iff If _if fn_ ptr0"),
            vec![
                (Ident, Some("iff".into())),
                (Ident, Some("If".into())),
                (Ident, Some("_if".into())),
                (Ident, Some("fn_".into())),
                (Ident, Some("ptr0".into())),
            ]
        );
    }

    #[test]
    pub fn every_keyword() {
        assert_eq!(
            kinds("if return goto fn const var val export void int bool true false ptr"),
            vec![
                Keyword(If),
                Keyword(Return),
                Keyword(Goto),
                Keyword(Fn),
                Keyword(Const),
                Keyword(Var),
                Keyword(Val),
                Keyword(Export),
                Keyword(Void),
                Keyword(Int),
                Keyword(Bool),
                Keyword(True),
                Keyword(False),
                Keyword(Ptr),
            ]
        );
    }

    #[test]
    pub fn decimal_literals() {
        assert_eq!(
            tokenize_fully("0 42 007"),
            vec![
                (DecLit, Some("0".into())),
                (DecLit, Some("42".into())),
                (DecLit, Some("007".into())),
            ]
        );
        // a digit run ends where the first non-digit starts
        assert_eq!(
            tokenize_fully("12ab"),
            vec![(DecLit, Some("12".into())), (Ident, Some("ab".into()))]
        );
    }

    #[test]
    pub fn single_character_tokens() {
        assert_eq!(
            kinds("( ) { } ; , : + - * / ! > < = | & ~"),
            vec![
                LParen, RParen, LBrace, RBrace, Semi, Comma, Colon, Add, Sub, Mul, Div, BoolNot,
                Gt, Lt, Assign, BinOr, BinAnd, BinNot,
            ]
        );
    }

    #[test]
    pub fn two_character_tokens() {
        assert_eq!(
            kinds("!= >= >> << <= == || && ~& ~|"),
            vec![NEq, GtEq, RShift, LShift, LtEq, Eq, BoolOr, BoolAnd, XAnd, XOr]
        );
    }

    #[test]
    pub fn longest_match_leaves_the_rest() {
        let mut lexer = Lexer::from_text("<a").unwrap();
        assert_eq!(lexer.next(), Ok(Lt));
        assert_eq!(lexer.consumed(), 1);
        assert_eq!(lexer.next(), Ok(Ident));
        assert_eq!(lexer.token_value(), Some("a"));

        assert_eq!(kinds("<<="), vec![LShift, Assign]);
        assert_eq!(kinds("==="), vec![Eq, Assign]);
        assert_eq!(kinds("~~&"), vec![BinNot, XAnd]);
        assert_eq!(kinds("a<=b"), vec![Ident, LtEq, Ident]);
    }

    #[test]
    pub fn unexpected_character() {
        let mut lexer = Lexer::from_text("a $ b").unwrap();
        assert_eq!(lexer.next(), Ok(Ident));
        assert_eq!(lexer.next(), Ok(Unexpected(b'$')));
        assert_eq!(lexer.token_value(), None);
        assert_eq!(lexer.produced(), 1);
        assert_eq!(
            lexer.span("doc"),
            Position::new(0, 2).to("doc", Position::new(0, 3))
        );
        // lexing may continue past the offending character
        assert_eq!(lexer.next(), Ok(Ident));
        assert_eq!(lexer.produced(), 2);
    }

    #[test]
    pub fn bytes_outside_ascii_are_unexpected() {
        let mut lexer = Lexer::new(StrSource::from_bytes(vec![b'a', 0xff, b'1'])).unwrap();
        assert_eq!(lexer.next(), Ok(Ident));
        assert_eq!(lexer.next(), Ok(Unexpected(0xff)));
        assert_eq!(lexer.token_value(), None);
        assert_eq!(lexer.next(), Ok(DecLit));
        assert_eq!(lexer.token_value(), Some("1"));
        assert_eq!(lexer.produced(), 2);
    }

    #[test]
    pub fn whitespace_only() {
        for text in ["", " ", " \t\n\n  ", "\r\n"] {
            let mut lexer = Lexer::from_text(text).unwrap();
            assert_eq!(lexer.next(), Ok(Eof));
            assert_eq!(lexer.produced(), 0);
            assert_eq!(lexer.consumed(), text.len());
        }
    }

    #[test]
    pub fn end_of_input_is_idempotent() {
        let (source, calls) = CountingSource::new("x");
        let mut lexer = Lexer::new(source).unwrap();
        assert_eq!(lexer.next(), Ok(Ident));
        assert_eq!(lexer.next(), Ok(Eof));
        let (consumed, produced, pos) = (lexer.consumed(), lexer.produced(), lexer.cur_pos());
        let reads = calls.get();
        for _ in 0..5 {
            assert_eq!(lexer.next(), Ok(Eof));
        }
        assert_eq!(lexer.consumed(), consumed);
        assert_eq!(lexer.produced(), produced);
        assert_eq!(lexer.cur_pos(), pos);
        assert_eq!(calls.get(), reads);
    }

    #[test]
    pub fn positions() {
        let mut lexer = Lexer::from_text("ab\ncd").unwrap();
        assert_eq!(lexer.next(), Ok(Ident));
        assert_eq!(lexer.start_pos(), Position::new(0, 0));
        assert_eq!(lexer.cur_pos(), Position::new(0, 2));

        assert_eq!(lexer.next(), Ok(Ident));
        assert_eq!(lexer.start_pos(), Position::new(1, 0));
        assert_eq!(lexer.cur_pos(), Position::new(1, 2));
    }

    #[test]
    pub fn spans_of_simple_tokens() {
        let mut lexer = Lexer::from_text("x  >=\n\t (").unwrap();
        let mut spans = vec![];
        while !lexer.next().unwrap().is_terminal() {
            spans.push((lexer.start_pos(), lexer.cur_pos()));
        }
        assert_eq!(
            spans,
            vec![
                (Position::new(0, 0), Position::new(0, 1)),
                (Position::new(0, 3), Position::new(0, 5)),
                (Position::new(1, 2), Position::new(1, 3)),
            ]
        );
        // end of input sits at the very end
        assert_eq!(lexer.start_pos(), Position::new(1, 3));
    }

    #[test]
    pub fn reset_starts_over() {
        let mut lexer = Lexer::from_text("first").unwrap();
        assert_eq!(lexer.next(), Ok(Ident));
        let old = lexer.reset(StrSource::from_string("fn"));
        assert_eq!(old.offset(), 5);
        assert_eq!(lexer.consumed(), 0);
        assert_eq!(lexer.next(), Ok(Keyword(Fn)));
        assert_eq!(lexer.start_pos(), Position::zero());
    }

    #[test]
    pub fn long_identifiers_grow_the_buffer() {
        let name = "a".repeat(500);
        assert_eq!(tokenize_fully(&name), vec![(Ident, Some(name.clone()))]);
    }

    #[test]
    pub fn out_of_memory_mid_token() {
        let alloc = BoundedAlloc::new(4);
        let config = Config {
            value_capacity: 4,
            ..Config::default()
        };
        let mut lexer =
            Lexer::with_config_in(StrSource::from_string("abcdefgh"), config, &alloc).unwrap();
        assert_eq!(lexer.next(), Err(AllocError { requested: 8 }));
        assert_eq!(lexer.produced(), 0);
        assert_eq!(lexer.token_value(), None);
    }
}
