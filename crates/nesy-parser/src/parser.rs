//! Recursive-descent parser over the token stream from `lexer`, a
//! `TokenCursor`-driven descent through statements and expressions.
//!
//! Escaped string literals are unescaped into a scratch `bumpalo::Bump`
//! arena during parsing and then copied out into the owned `Expr::Str`; the
//! arena is dropped the moment `parse_program` returns, so transient
//! unescape buffers never survive past a single `learn` call.

use crate::ast::{ConfigEntry, Destination, Expr, Program, Statement};
use crate::lexer::{LexError, LexedToken, Position, Tok};
use bumpalo::collections::String as ArenaString;
use bumpalo::Bump;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    UnexpectedChar,
    UnterminatedString,
    EmptyDestination,
    MultipleDestinations,
    MismatchedParen,
    UnexpectedToken { expected: String, found: String },
    UnexpectedEof,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("parse error at line {line}, column {col}: {kind:?}")]
pub struct ParseError {
    pub line: u32,
    pub col: u32,
    pub kind: ParseErrorKind,
}

impl From<LexError> for ParseError {
    fn from(e: LexError) -> Self {
        ParseError {
            line: e.line,
            col: e.col,
            kind: ParseErrorKind::UnexpectedChar,
        }
    }
}

const KW_MACRO: &str = "macro";
const KW_GRAPH: &str = "graph";
const KW_SOLVE: &str = "solve";
const KW_END: &str = "end";
const KW_RETURN: &str = "return";
const KW_FROM: &str = "from";
const KW_PERSIST: &str = "persist";

struct Cursor<'a> {
    toks: &'a [LexedToken<'a>],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(toks: &'a [LexedToken<'a>]) -> Self {
        Self { toks, pos: 0 }
    }

    fn peek(&self) -> Option<&LexedToken<'a>> {
        self.toks.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&LexedToken<'a>> {
        self.toks.get(self.pos + offset)
    }

    fn bump(&mut self) -> Option<&LexedToken<'a>> {
        let t = self.toks.get(self.pos);
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn last_pos(&self) -> Position {
        self.toks
            .get(self.pos.saturating_sub(1))
            .or_else(|| self.toks.last())
            .map(|t| t.pos)
            .unwrap_or(Position { line: 1, col: 1 })
    }

    fn is_ident(&self, text: &str) -> bool {
        matches!(self.peek(), Some(t) if t.tok == Tok::Ident && t.text == text)
    }

    fn eat_ident(&mut self, text: &str) -> bool {
        if self.is_ident(text) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn skip_newlines(&mut self) {
        while matches!(self.peek(), Some(t) if t.tok == Tok::Newline) {
            self.bump();
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let found = match self.peek() {
            Some(t) => format!("{:?}({})", t.tok, t.text),
            None => "<eof>".to_string(),
        };
        ParseError {
            line: self.last_pos().line,
            col: self.last_pos().col,
            kind: ParseErrorKind::UnexpectedToken {
                expected: expected.to_string(),
                found,
            },
        }
    }

    fn expect(&mut self, tok: Tok, expected: &str) -> Result<&LexedToken<'a>, ParseError> {
        match self.peek() {
            Some(t) if t.tok == tok => Ok(self.bump().unwrap()),
            _ => Err(self.unexpected(expected)),
        }
    }

    fn expect_ident(&mut self) -> Result<&'a str, ParseError> {
        match self.peek() {
            Some(t) if t.tok == Tok::Ident => {
                let text = t.text;
                self.bump();
                Ok(text)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }
}

/// Entry point: tokens in, a full program out. `arena` backs only the
/// transient string-unescaping scratch space used while parsing string
/// literals.
pub fn parse_program<'a>(toks: &[LexedToken<'a>], arena: &Bump) -> Result<Program, ParseError> {
    let mut cur = Cursor::new(toks);
    let mut stmts = Vec::new();
    cur.skip_newlines();
    while cur.peek().is_some() {
        stmts.push(parse_statement(&mut cur, arena)?);
        end_of_statement(&mut cur)?;
        cur.skip_newlines();
    }
    Ok(stmts)
}

fn end_of_statement(cur: &mut Cursor) -> Result<(), ParseError> {
    match cur.peek() {
        None => Ok(()),
        Some(t) if t.tok == Tok::Newline => {
            cur.bump();
            Ok(())
        }
        _ => Err(cur.unexpected("newline or end of input")),
    }
}

fn parse_destination(cur: &mut Cursor) -> Result<Option<Destination>, ParseError> {
    if !matches!(cur.peek(), Some(t) if t.tok == Tok::At) {
        return Ok(None);
    }
    cur.bump();
    if matches!(cur.peek(), Some(t) if t.tok == Tok::At) {
        return Err(ParseError {
            line: cur.last_pos().line,
            col: cur.last_pos().col,
            kind: ParseErrorKind::MultipleDestinations,
        });
    }
    let name = match cur.peek() {
        Some(t) if t.tok == Tok::Ident => {
            let text = t.text.to_string();
            cur.bump();
            text
        }
        _ => {
            return Err(ParseError {
                line: cur.last_pos().line,
                col: cur.last_pos().col,
                kind: ParseErrorKind::EmptyDestination,
            })
        }
    };
    let mut persist = false;
    if matches!(cur.peek(), Some(t) if t.tok == Tok::Colon) {
        cur.bump();
        if !cur.eat_ident(KW_PERSIST) {
            return Err(cur.unexpected("persist"));
        }
        persist = true;
    }
    Ok(Some(Destination { name, persist }))
}

fn parse_statement(cur: &mut Cursor, arena: &Bump) -> Result<Statement, ParseError> {
    let dest = parse_destination(cur)?;
    let pos = cur.peek().map(|t| t.pos).unwrap_or(Position { line: 0, col: 0 });

    if cur.is_ident(KW_MACRO) {
        let dest = dest.ok_or_else(|| ParseError {
            line: pos.line,
            col: pos.col,
            kind: ParseErrorKind::EmptyDestination,
        })?;
        return parse_macro(cur, arena, dest, pos);
    }
    if cur.is_ident(KW_GRAPH) {
        let dest = dest.ok_or_else(|| ParseError {
            line: pos.line,
            col: pos.col,
            kind: ParseErrorKind::EmptyDestination,
        })?;
        return parse_graph(cur, arena, dest, pos);
    }
    if cur.is_ident(KW_SOLVE) {
        let dest = dest.ok_or_else(|| ParseError {
            line: pos.line,
            col: pos.col,
            kind: ParseErrorKind::EmptyDestination,
        })?;
        return parse_solve(cur, arena, dest, pos);
    }

    let operator = parse_primary(cur, arena)?;
    let mut args = Vec::new();
    while can_start_expr(cur) {
        args.push(parse_primary(cur, arena)?);
    }
    Ok(Statement::Assert {
        dest,
        operator,
        args,
        comment: None,
        line: pos.line,
        col: pos.col,
    })
}

fn can_start_expr(cur: &Cursor) -> bool {
    matches!(
        cur.peek().map(|t| t.tok),
        Some(Tok::Ident)
            | Some(Tok::Number)
            | Some(Tok::DString)
            | Some(Tok::SString)
            | Some(Tok::Reference)
            | Some(Tok::Hole)
            | Some(Tok::LParen)
            | Some(Tok::LBracket)
    )
}

fn parse_params(cur: &mut Cursor) -> Vec<String> {
    let mut params = Vec::new();
    while matches!(cur.peek(), Some(t) if t.tok == Tok::Ident) {
        params.push(cur.bump().unwrap().text.to_string());
    }
    params
}

fn parse_body(cur: &mut Cursor, arena: &Bump) -> Result<Vec<Statement>, ParseError> {
    let mut body = Vec::new();
    loop {
        cur.skip_newlines();
        if cur.is_ident(KW_END) {
            cur.bump();
            break;
        }
        if cur.peek().is_none() {
            return Err(ParseError {
                line: cur.last_pos().line,
                col: cur.last_pos().col,
                kind: ParseErrorKind::UnexpectedEof,
            });
        }
        body.push(parse_statement(cur, arena)?);
        end_of_statement(cur)?;
    }
    Ok(body)
}

fn parse_macro(
    cur: &mut Cursor,
    arena: &Bump,
    dest: Destination,
    pos: Position,
) -> Result<Statement, ParseError> {
    cur.bump();
    let params = parse_params(cur);
    end_of_statement(cur)?;
    let body = parse_body(cur, arena)?;
    Ok(Statement::Macro {
        dest,
        params,
        body,
        line: pos.line,
        col: pos.col,
    })
}

fn parse_graph(
    cur: &mut Cursor,
    arena: &Bump,
    dest: Destination,
    pos: Position,
) -> Result<Statement, ParseError> {
    cur.bump();
    let params = parse_params(cur);
    end_of_statement(cur)?;
    let mut body = Vec::new();
    let mut ret = None;
    loop {
        cur.skip_newlines();
        if cur.is_ident(KW_END) {
            cur.bump();
            break;
        }
        if cur.is_ident(KW_RETURN) {
            cur.bump();
            ret = Some(parse_primary(cur, arena)?);
            end_of_statement(cur)?;
            cur.skip_newlines();
            if !cur.eat_ident(KW_END) {
                return Err(cur.unexpected("end"));
            }
            break;
        }
        if cur.peek().is_none() {
            return Err(ParseError {
                line: cur.last_pos().line,
                col: cur.last_pos().col,
                kind: ParseErrorKind::UnexpectedEof,
            });
        }
        body.push(parse_statement(cur, arena)?);
        end_of_statement(cur)?;
    }
    Ok(Statement::Graph {
        dest,
        params,
        body,
        ret,
        line: pos.line,
        col: pos.col,
    })
}

fn parse_solve(
    cur: &mut Cursor,
    arena: &Bump,
    dest: Destination,
    pos: Position,
) -> Result<Statement, ParseError> {
    cur.bump();
    let kind = cur.expect_ident()?.to_string();
    let config = if matches!(cur.peek(), Some(t) if t.tok == Tok::LBracket) {
        parse_bracket_config(cur, arena)?
    } else {
        end_of_statement(cur)?;
        parse_block_config(cur, arena)?
    };
    Ok(Statement::Solve {
        dest,
        kind,
        config,
        line: pos.line,
        col: pos.col,
    })
}

fn parse_bracket_config(cur: &mut Cursor, arena: &Bump) -> Result<Vec<ConfigEntry>, ParseError> {
    cur.expect(Tok::LBracket, "[")?;
    let mut entries = Vec::new();
    cur.skip_newlines();
    if !matches!(cur.peek(), Some(t) if t.tok == Tok::RBracket) {
        loop {
            entries.push(parse_config_entry(cur, arena)?);
            cur.skip_newlines();
            if matches!(cur.peek(), Some(t) if t.tok == Tok::Comma) {
                cur.bump();
                cur.skip_newlines();
                continue;
            }
            break;
        }
    }
    cur.expect(Tok::RBracket, "]")?;
    Ok(entries)
}

fn parse_block_config(cur: &mut Cursor, arena: &Bump) -> Result<Vec<ConfigEntry>, ParseError> {
    let mut entries = Vec::new();
    loop {
        cur.skip_newlines();
        if cur.is_ident(KW_END) {
            cur.bump();
            break;
        }
        if cur.peek().is_none() {
            return Err(ParseError {
                line: cur.last_pos().line,
                col: cur.last_pos().col,
                kind: ParseErrorKind::UnexpectedEof,
            });
        }
        entries.push(parse_config_entry(cur, arena)?);
        end_of_statement(cur)?;
    }
    Ok(entries)
}

fn parse_config_entry(cur: &mut Cursor, arena: &Bump) -> Result<ConfigEntry, ParseError> {
    let key = cur.expect_ident()?.to_string();
    if cur.is_ident(KW_FROM) {
        cur.bump();
        let source = cur.expect_ident()?.to_string();
        return Ok(ConfigEntry::KeyFrom(key, source));
    }
    let value = parse_primary(cur, arena)?;
    Ok(ConfigEntry::KeyValue(key, value))
}

fn parse_primary(cur: &mut Cursor, arena: &Bump) -> Result<Expr, ParseError> {
    let t = match cur.peek() {
        Some(t) => *t,
        None => return Err(cur.unexpected("expression")),
    };
    match t.tok {
        Tok::Ident => {
            cur.bump();
            if matches!(cur.peek(), Some(n) if n.tok == Tok::LParen) {
                return parse_compound(cur, arena, t.text.to_string());
            }
            Ok(Expr::Ident(t.text.to_string()))
        }
        Tok::Reference => {
            cur.bump();
            Ok(Expr::Reference(t.text.trim_start_matches('$').to_string()))
        }
        Tok::Hole => {
            cur.bump();
            Ok(Expr::Hole(t.text.trim_start_matches('?').to_string()))
        }
        Tok::Number => {
            cur.bump();
            t.text
                .parse::<f64>()
                .map(Expr::Number)
                .map_err(|_| cur.unexpected("number"))
        }
        Tok::DString => {
            cur.bump();
            Ok(Expr::Str(unescape(t.text, arena)))
        }
        Tok::SString => {
            cur.bump();
            Ok(Expr::Str(unescape(t.text, arena)))
        }
        Tok::LParen => parse_compound(cur, arena, String::new()),
        Tok::LBracket => parse_list(cur, arena),
        _ => Err(cur.unexpected("expression")),
    }
}

fn parse_compound(cur: &mut Cursor, arena: &Bump, head: String) -> Result<Expr, ParseError> {
    cur.expect(Tok::LParen, "(")?;
    let mut items = Vec::new();
    cur.skip_newlines();
    if !matches!(cur.peek(), Some(t) if t.tok == Tok::RParen) {
        loop {
            items.push(parse_primary(cur, arena)?);
            cur.skip_newlines();
            if matches!(cur.peek(), Some(t) if t.tok == Tok::Comma) {
                cur.bump();
                cur.skip_newlines();
                continue;
            }
            break;
        }
    }
    match cur.peek() {
        Some(t) if t.tok == Tok::RParen => {
            cur.bump();
        }
        _ => {
            return Err(ParseError {
                line: cur.last_pos().line,
                col: cur.last_pos().col,
                kind: ParseErrorKind::MismatchedParen,
            })
        }
    }
    if head.is_empty() {
        Ok(Expr::List(items))
    } else {
        Ok(Expr::Compound(head, items))
    }
}

fn parse_list(cur: &mut Cursor, arena: &Bump) -> Result<Expr, ParseError> {
    cur.expect(Tok::LBracket, "[")?;
    let mut items = Vec::new();
    cur.skip_newlines();
    if !matches!(cur.peek(), Some(t) if t.tok == Tok::RBracket) {
        loop {
            items.push(parse_primary(cur, arena)?);
            cur.skip_newlines();
            if matches!(cur.peek(), Some(t) if t.tok == Tok::Comma) {
                cur.bump();
                cur.skip_newlines();
                continue;
            }
            break;
        }
    }
    cur.expect(Tok::RBracket, "]")?;
    Ok(Expr::List(items))
}

/// Strips the surrounding quotes and resolves backslash escapes using a
/// scratch arena buffer before copying the result into an owned `String`.
fn unescape(raw: &str, arena: &Bump) -> String {
    let inner = &raw[1..raw.len() - 1];
    let mut buf = ArenaString::new_in(arena);
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => buf.push('\n'),
                Some('t') => buf.push('\t'),
                Some('"') => buf.push('"'),
                Some('\'') => buf.push('\''),
                Some('\\') => buf.push('\\'),
                Some(other) => buf.push(other),
                None => {}
            }
        } else {
            buf.push(c);
        }
    }
    buf.as_str().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse(src: &str) -> Result<Program, ParseError> {
        let arena = Bump::new();
        let toks = tokenize(src).map_err(ParseError::from)?;
        parse_program(&toks, &arena)
    }

    #[test]
    fn parses_bare_assertion() {
        let prog = parse("isA Socrates Human\n").unwrap();
        assert_eq!(prog.len(), 1);
        match &prog[0] {
            Statement::Assert { operator, args, dest, .. } => {
                assert_eq!(operator, &Expr::Ident("isA".into()));
                assert_eq!(args, &vec![Expr::Ident("Socrates".into()), Expr::Ident("Human".into())]);
                assert!(dest.is_none());
            }
            _ => panic!("expected assert"),
        }
    }

    #[test]
    fn parses_destination_with_persist() {
        let prog = parse("@f1:persist isA Socrates Human\n").unwrap();
        match &prog[0] {
            Statement::Assert { dest: Some(d), .. } => {
                assert_eq!(d.name, "f1");
                assert!(d.persist);
            }
            _ => panic!("expected assert with destination"),
        }
    }

    #[test]
    fn rejects_empty_destination() {
        let err = parse("@ isA a b\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::EmptyDestination);
    }

    #[test]
    fn parses_compound_and_holes() {
        let prog = parse("query findColor(?x) isA ?x Red\n").unwrap();
        match &prog[0] {
            Statement::Assert { operator, args, .. } => {
                assert_eq!(operator, &Expr::Ident("query".into()));
                assert_eq!(
                    args[0],
                    Expr::Compound("findColor".into(), vec![Expr::Hole("x".into())])
                );
            }
            _ => panic!(),
        }
    }

    #[test]
    fn parses_macro_with_body_and_params() {
        let prog = parse("@isMortal macro x\nisA x Human\nend\n").unwrap();
        match &prog[0] {
            Statement::Macro { params, body, .. } => {
                assert_eq!(params, &vec!["x".to_string()]);
                assert_eq!(body.len(), 1);
            }
            _ => panic!("expected macro"),
        }
    }

    #[test]
    fn parses_graph_with_return() {
        let prog = parse("@g graph x\nisA x Human\nreturn x\nend\n").unwrap();
        match &prog[0] {
            Statement::Graph { ret, body, .. } => {
                assert_eq!(ret, &Some(Expr::Ident("x".into())));
                assert_eq!(body.len(), 1);
            }
            _ => panic!("expected graph"),
        }
    }

    #[test]
    fn parses_bracketed_solve_config() {
        let prog =
            parse("@seating solve WeddingSeating [guests from Guest, tables from Table, noConflict conflictsWith]\n")
                .unwrap();
        match &prog[0] {
            Statement::Solve { kind, config, .. } => {
                assert_eq!(kind, "WeddingSeating");
                assert_eq!(config.len(), 3);
                assert_eq!(config[0], ConfigEntry::KeyFrom("guests".into(), "Guest".into()));
                assert_eq!(
                    config[2],
                    ConfigEntry::KeyValue("noConflict".into(), Expr::Ident("conflictsWith".into()))
                );
            }
            _ => panic!("expected solve"),
        }
    }

    #[test]
    fn unescapes_string_literals() {
        let prog = parse("label a \"line\\nbreak\"\n").unwrap();
        match &prog[0] {
            Statement::Assert { args, .. } => {
                assert_eq!(args[1], Expr::Str("line\nbreak".into()));
            }
            _ => panic!(),
        }
    }

    #[test]
    fn mismatched_paren_is_reported() {
        let err = parse("isA (a b\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MismatchedParen);
    }
}
