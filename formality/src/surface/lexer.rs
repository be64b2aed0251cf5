use logos::Logos;

/// The pieces of source text that the parser recognises without looking at the
/// surrounding grammar: trivia and names. Everything else is matched as a
/// literal string by the grammar itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Logos)]
pub enum Lexeme {
    #[regex(r"[ \t\n]+")]
    Whitespace,
    #[regex(r"//[^\n]*\n?")]
    #[regex(r"--[^\n]*\n?")]
    LineComment,
    #[token("/*", |lexer| block_comment(lexer, "*/"))]
    #[token("{-", |lexer| block_comment(lexer, "-}"))]
    BlockComment,
    #[regex(r"[.0-9A-Za-z_]+")]
    Name,

    #[error]
    Error,
}

impl Lexeme {
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            Lexeme::Whitespace | Lexeme::LineComment | Lexeme::BlockComment
        )
    }
}

/// Consume the rest of a block comment. An unterminated comment runs to the end
/// of the source.
fn block_comment<'source>(lexer: &mut logos::Lexer<'source, Lexeme>, close: &str) -> bool {
    let len = match lexer.remainder().find(close) {
        Some(offset) => offset + close.len(),
        None => lexer.remainder().len(),
    };
    lexer.bump(len);
    true
}

/// Classify the lexeme at the start of `source`, along with its length in
/// bytes.
pub fn peek(source: &str) -> Option<(Lexeme, usize)> {
    let mut lexer = Lexeme::lexer(source);
    let lexeme = lexer.next()?;
    Some((lexeme, lexer.span().end))
}

pub fn is_name_char(c: char) -> bool {
    matches!(c, '.' | '0'..='9' | 'A'..='Z' | '_' | 'a'..='z')
}
