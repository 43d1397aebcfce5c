//! Lexer and recursive-descent parser for the fact/rule/graph/solve DSL.

pub mod ast;
mod lexer;
mod parser;

pub use ast::{ConfigEntry, Destination, Expr, Program, Statement};
pub use lexer::{LexError, LexedToken, Position, Tok};
pub use parser::{ParseError, ParseErrorKind};

use bumpalo::Bump;

/// Tokenizes and parses `src` into a `Program`. Each call gets its own
/// arena, freed the moment this function returns — no parse-time state
/// outlives a single `learn` invocation.
pub fn parse_program(src: &str) -> Result<Program, ParseError> {
    let arena = Bump::new();
    let toks = lexer::tokenize(src)?;
    parser::parse_program(&toks, &arena)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_small_program() {
        let prog = parse_program("isA Socrates Human\nisA Human Mortal\n").unwrap();
        assert_eq!(prog.len(), 2);
    }

    #[test]
    fn lex_errors_surface_through_the_top_level_entry_point() {
        let err = parse_program("isA a b\n%").unwrap_err();
        assert_eq!(err.line, 2);
    }
}
