//! Surface language.
//!
//! The parser works directly on the source text. Each production receives the
//! current [`Scope`] and advances a cursor over the source, appending every
//! character it consumes to an accumulator. Alternatives are tried one after
//! another against a checkpoint of the cursor; a failed alternative is rewound
//! completely, including the text it appended, before the next one is tried.

use codespan_reporting::diagnostic::{Diagnostic, Label};
use std::fmt;

use crate::core::Term;
use crate::env::Scope;
use crate::source::{BytePos, ByteRange, FileId, MAX_SOURCE_LEN};

pub mod definitions;
mod desugar;
mod grammar;
pub(crate) mod lexer;

pub use self::definitions::{companion_path, parse_defs, Module};
pub use self::desugar::{NAT_SUCC, NAT_ZERO};

use self::lexer::Lexeme;

/// The number of characters of remaining input shown in parse errors.
const SNIPPET_LEN: usize = 16;

/// A failed production: the literal that was expected, and the start of what
/// was found instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    range: ByteRange,
    expected: &'static str,
    found: String,
}

impl ParseError {
    pub fn range(&self) -> ByteRange {
        self.range
    }

    pub fn expected(&self) -> &'static str {
        self.expected
    }

    pub fn found(&self) -> &str {
        &self.found
    }

    pub fn to_diagnostic(&self, file_id: FileId) -> Diagnostic<FileId> {
        Diagnostic::error()
            .with_message(self.to_string())
            .with_labels(vec![Label::primary(file_id, self.range)
                .with_message(format!("expected `{}`", self.expected))])
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected `{}`, found `{}`", self.expected, self.found)
    }
}

impl std::error::Error for ParseError {}

/// A production of the grammar, tried as one alternative among several.
type Production<'source, T> = fn(&mut Parser<'source>, &Scope) -> Result<T, ParseError>;

/// A saved cursor position, used to undo a failed alternative.
#[derive(Debug, Copy, Clone)]
struct Checkpoint {
    pos: usize,
    consumed_len: usize,
}

/// A cursor over the source, along with the text consumed so far.
pub struct Parser<'source> {
    source: &'source str,
    pos: usize,
    consumed: String,
}

impl<'source> Parser<'source> {
    pub fn new(source: &'source str) -> Parser<'source> {
        assert!(
            source.len() <= MAX_SOURCE_LEN,
            "`source` must be less than 4GiB in length"
        );

        Parser {
            source,
            pos: 0,
            consumed: String::new(),
        }
    }

    /// The current byte offset into the source.
    pub fn pos(&self) -> BytePos {
        self.pos as BytePos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos == self.source.len()
    }

    /// The text consumed by the parser, in source order.
    pub fn consumed(&self) -> &str {
        &self.consumed
    }

    pub fn into_consumed(self) -> String {
        self.consumed
    }

    fn remainder(&self) -> &'source str {
        &self.source[self.pos..]
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            pos: self.pos,
            consumed_len: self.consumed.len(),
        }
    }

    fn rewind(&mut self, checkpoint: Checkpoint) {
        self.pos = checkpoint.pos;
        self.consumed.truncate(checkpoint.consumed_len);
    }

    /// Run `parse`, undoing everything it consumed if it fails.
    fn attempt<T>(
        &mut self,
        parse: impl FnOnce(&mut Parser<'source>) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        let checkpoint = self.checkpoint();
        let result = parse(self);
        if result.is_err() {
            self.rewind(checkpoint);
        }
        result
    }

    /// Try each production in order from the same starting point, committing
    /// to the first that succeeds. If none do, the last failure is returned.
    fn first_of<T>(
        &mut self,
        scope: &Scope,
        productions: &[Production<'source, T>],
    ) -> Result<T, ParseError> {
        let mut last_error = None;
        for production in productions {
            match self.attempt(|parser| production(parser, scope)) {
                Ok(result) => return Ok(result),
                Err(error) => last_error = Some(error),
            }
        }
        Err(last_error.unwrap_or_else(|| self.error("term")))
    }

    fn advance(&mut self, len: usize) {
        let text = &self.source[self.pos..(self.pos + len)];
        self.consumed.push_str(text);
        self.pos += len;
    }

    /// Skip any mixture of whitespace and comments.
    fn skip_trivia(&mut self) {
        while let Some((lexeme, len)) = lexer::peek(self.remainder()) {
            if !lexeme.is_trivia() {
                break;
            }
            self.advance(len);
        }
    }

    /// Skip whitespace, leaving comments in place.
    fn skip_whitespace(&mut self) {
        while let Some((Lexeme::Whitespace, len)) = lexer::peek(self.remainder()) {
            self.advance(len);
        }
    }

    fn accept(&mut self, token: &str) -> bool {
        if self.remainder().starts_with(token) {
            self.advance(token.len());
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &'static str) -> Result<(), ParseError> {
        match self.accept(token) {
            true => Ok(()),
            false => Err(self.error(token)),
        }
    }

    /// Parse a non-empty name.
    fn name(&mut self) -> Result<&'source str, ParseError> {
        match lexer::peek(self.remainder()) {
            Some((Lexeme::Name, len)) => {
                let name = &self.remainder()[..len];
                self.advance(len);
                Ok(name)
            }
            _ => Err(self.error("name")),
        }
    }

    /// Parse a name, which may be empty.
    fn name_or_empty(&mut self) -> &'source str {
        self.name().unwrap_or("")
    }

    fn range_from(&self, start: BytePos) -> ByteRange {
        ByteRange::new(start, self.pos())
    }

    fn error(&self, expected: &'static str) -> ParseError {
        self.error_at(self.pos, expected)
    }

    fn error_at(&self, pos: usize, expected: &'static str) -> ParseError {
        let found = self.source[pos..].chars().take(SNIPPET_LEN).collect::<String>();
        let start = pos as BytePos;
        ParseError {
            range: ByteRange::new(start, start + found.len() as BytePos),
            expected,
            found,
        }
    }
}

/// Parse a single term in `scope`. Apart from trailing whitespace and
/// comments, the whole source must be consumed.
pub fn parse_term(source: &str, scope: &Scope) -> Result<Term, ParseError> {
    let mut parser = Parser::new(source);
    let term = parser.term(scope)?;
    parser.skip_trivia();
    match parser.is_at_end() {
        true => Ok(term),
        false => Err(parser.error("end of input")),
    }
}
