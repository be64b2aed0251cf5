//! Types related to source files.

use std::fmt;
use std::ops::{Deref, Range};

/// File identifiers, as handed out by
/// [`SimpleFiles`](codespan_reporting::files::SimpleFiles).
pub type FileId = usize;

/// Byte offsets into source files.
pub type BytePos = u32;

/// Byte ranges in source files.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct ByteRange {
    start: BytePos,
    end: BytePos,
}

impl fmt::Debug for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByteRange({}..{})", self.start, self.end)
    }
}

impl ByteRange {
    pub const fn new(start: BytePos, end: BytePos) -> Self {
        Self { start, end }
    }
}

impl From<ByteRange> for Range<usize> {
    fn from(range: ByteRange) -> Self {
        (range.start as usize)..(range.end as usize)
    }
}

/// A smart constructor around `String`, which guarantees its length is <=
/// `u32::MAX`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramSource(String);

pub const MAX_SOURCE_LEN: usize = u32::MAX as usize;

impl fmt::Display for ProgramSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Deref for ProgramSource {
    type Target = String;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for ProgramSource {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<ProgramSource> for String {
    fn from(source: ProgramSource) -> Self {
        source.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTooBig {
    pub actual_len: usize,
}

impl TryFrom<String> for ProgramSource {
    type Error = SourceTooBig;

    fn try_from(string: String) -> Result<Self, Self::Error> {
        if string.len() <= MAX_SOURCE_LEN {
            Ok(Self(string))
        } else {
            Err(SourceTooBig {
                actual_len: string.len(),
            })
        }
    }
}
