//! Token classification for the `logos`-driven lexer.

use logos::Logos;
use thiserror::Error;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r]+")]
#[logos(skip r"#[^\n]*")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*([^*]|\*[^/])*\*/")]
pub enum Tok {
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,
    #[regex(r"-?[0-9]+(\.[0-9]+)?")]
    Number,
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    DString,
    #[regex(r"'([^'\\\n]|\\.)*'")]
    SString,
    #[token("@")]
    At,
    #[regex(r"\$[A-Za-z_][A-Za-z0-9_]*")]
    Reference,
    #[regex(r"\?[A-Za-z_][A-Za-z0-9_]*")]
    Hole,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token("\n")]
    Newline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: u32,
    pub col: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexedToken<'a> {
    pub tok: Tok,
    pub text: &'a str,
    pub pos: Position,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unexpected character at line {line}, column {col}")]
pub struct LexError {
    pub line: u32,
    pub col: u32,
}

/// Precomputes line-start byte offsets once so span -> (line, col) lookups
/// during tokenization and later parse-error reporting are O(log n) instead
/// of a full rescan per token.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn build(src: &str) -> Self {
        let mut starts = vec![0];
        for (i, b) in src.bytes().enumerate() {
            if b == b'\n' {
                starts.push(i + 1);
            }
        }
        Self { starts }
    }

    fn position(&self, offset: usize) -> Position {
        let line = match self.starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        let col = offset - self.starts[line];
        Position {
            line: line as u32 + 1,
            col: col as u32 + 1,
        }
    }
}

/// Tokenizes `src` in full, failing fast (no infinite loops possible: logos
/// always advances the cursor or reports an error token, and we bail on the
/// first error) — the "never loops on malformed input" guarantee from
///.
pub fn tokenize(src: &str) -> Result<Vec<LexedToken<'_>>, LexError> {
    let index = LineIndex::build(src);
    let mut lexer = Tok::lexer(src);
    let mut out = Vec::new();
    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let pos = index.position(span.start);
        match result {
            Ok(tok) => out.push(LexedToken {
                tok,
                text: &src[span.clone()],
                pos,
            }),
            Err(()) => return Err(LexError { line: pos.line, col: pos.col }),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_empty_program() {
        assert_eq!(tokenize("").unwrap().len(), 0);
    }

    #[test]
    fn whitespace_and_comments_vanish() {
        let toks = tokenize("   # a comment\n// also a comment\n/* block */\n").unwrap();
        assert!(toks.iter().all(|t| t.tok == Tok::Newline));
    }

    #[test]
    fn reports_line_and_column() {
        let err = tokenize("isA a b\n%").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.col, 1);
    }

    #[test]
    fn classifies_reference_and_hole() {
        let toks = tokenize("$x ?y").unwrap();
        assert_eq!(toks[0].tok, Tok::Reference);
        assert_eq!(toks[0].text, "$x");
        assert_eq!(toks[1].tok, Tok::Hole);
        assert_eq!(toks[1].text, "?y");
    }
}
