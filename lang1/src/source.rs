use std::io;
use std::io::{BufReader, Bytes, Read, Stdin};
use tracing::warn;

/// Supplies the lexer with one byte at a time.
///
/// `None` signals the end of the stream. Sources may block (for example
/// while waiting on a terminal) but must eventually return.
pub trait CharSource {
    fn next_char(&mut self) -> Option<u8>;
}

impl<F> CharSource for F
where
    F: FnMut() -> Option<u8>,
{
    fn next_char(&mut self) -> Option<u8> {
        self()
    }
}

/// A source over bytes held in memory.
pub struct StrSource {
    data: Box<[u8]>,
    offset: usize,
}

impl StrSource {
    pub fn from_string(string: impl Into<String>) -> StrSource {
        StrSource {
            data: string.into().into_bytes().into(),
            offset: 0,
        }
    }

    pub fn from_bytes(bytes: impl Into<Box<[u8]>>) -> StrSource {
        StrSource {
            data: bytes.into(),
            offset: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The number of bytes handed out so far.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl CharSource for StrSource {
    fn next_char(&mut self) -> Option<u8> {
        let ch = *self.data.get(self.offset)?;
        self.offset += 1;
        Some(ch)
    }
}

/// A buffered source over anything implementing [`Read`].
///
/// A read error ends the stream. The error is kept so the embedder can
/// tell a truncated input from a complete one.
pub struct ReadSource<R>
where
    R: Read,
{
    bytes: Bytes<BufReader<R>>,
    error: Option<io::Error>,
}

impl<R> ReadSource<R>
where
    R: Read,
{
    pub fn new(read: R) -> ReadSource<R> {
        ReadSource {
            bytes: BufReader::new(read).bytes(),
            error: None,
        }
    }

    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }
}

impl<R> CharSource for ReadSource<R>
where
    R: Read,
{
    fn next_char(&mut self) -> Option<u8> {
        if self.error.is_some() {
            return None;
        }
        match self.bytes.next()? {
            Ok(ch) => Some(ch),
            Err(err) => {
                warn!("reading input failed: {err}");
                self.error = Some(err);
                None
            }
        }
    }
}

/// Reads from the standard input of the process.
pub fn stdin() -> ReadSource<Stdin> {
    ReadSource::new(io::stdin())
}
