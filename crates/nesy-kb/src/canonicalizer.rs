//! Statement-AST canonicalization and `canonicalRewrite` declarations —
//!.

use crate::fact::ArgValue;
use crate::synonyms::SynonymGraph;
use nesy_parser::{Expr, Statement};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CanonicalizerError {
    #[error("conflicting canonicalRewrite already registered for operator {0}")]
    ConflictingRewrite(String),
}

#[derive(Debug, Clone)]
struct Rewrite {
    macro_op: String,
    arg_index_list: Vec<usize>,
    permutation: Vec<usize>,
}

/// Rewrites `Identifier` arguments of a parsed statement to their synonym
/// canonical representative, and applies `canonicalRewrite` declarations to
/// primitive operator facts before they reach the KB. Operators themselves
/// are *not* synonym-rewritten.
#[derive(Debug, Default, Clone)]
pub struct Canonicalizer {
    rewrites: std::collections::HashMap<String, Rewrite>,
}

impl Canonicalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_rewrite(
        &mut self,
        prim_op: &str,
        macro_op: &str,
        arg_index_list: Vec<usize>,
        permutation: Vec<usize>,
    ) -> Result<(), CanonicalizerError> {
        if let Some(existing) = self.rewrites.get(prim_op) {
            if existing.macro_op != macro_op
                || existing.arg_index_list != arg_index_list
                || existing.permutation != permutation
            {
                return Err(CanonicalizerError::ConflictingRewrite(prim_op.to_string()));
            }
        }
        self.rewrites.insert(
            prim_op.to_string(),
            Rewrite { macro_op: macro_op.to_string(), arg_index_list, permutation },
        );
        Ok(())
    }

    pub fn apply_rewrite(&self, operator: &str, args: &[ArgValue]) -> Option<(String, Vec<ArgValue>)> {
        let rw = self.rewrites.get(operator)?;
        let selected: Vec<ArgValue> = rw.arg_index_list.iter().filter_map(|&i| args.get(i).cloned()).collect();
        let permuted: Vec<ArgValue> = rw.permutation.iter().filter_map(|&i| selected.get(i).cloned()).collect();
        Some((rw.macro_op.clone(), permuted))
    }

    pub fn canonicalize_statement(&self, graph: &SynonymGraph, stmt: &Statement) -> Statement {
        match stmt.clone() {
            Statement::Assert { dest, operator, args, comment, line, col } => Statement::Assert {
                dest,
                operator,
                args: args.iter().map(|a| canonicalize_expr(graph, a)).collect(),
                comment,
                line,
                col,
            },
            Statement::Macro { dest, params, body, line, col } => Statement::Macro {
                dest,
                params,
                body: body.iter().map(|s| self.canonicalize_statement(graph, s)).collect(),
                line,
                col,
            },
            Statement::Graph { dest, params, body, ret, line, col } => Statement::Graph {
                dest,
                params,
                body: body.iter().map(|s| self.canonicalize_statement(graph, s)).collect(),
                ret: ret.map(|e| canonicalize_expr(graph, &e)),
                line,
                col,
            },
            other @ Statement::Solve { .. } => other,
        }
    }
}

fn canonicalize_expr(graph: &SynonymGraph, expr: &Expr) -> Expr {
    match expr {
        Expr::Ident(name) => Expr::Ident(graph.canonicalize(name)),
        Expr::List(items) => Expr::List(items.iter().map(|e| canonicalize_expr(graph, e)).collect()),
        Expr::Compound(head, items) => {
            Expr::Compound(head.clone(), items.iter().map(|e| canonicalize_expr(graph, e)).collect())
        }
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrite_selects_and_permutes_args() {
        let mut c = Canonicalizer::new();
        c.register_rewrite("before", "locatedIn", vec![1, 0], vec![1, 0]).unwrap();
        let args = vec![ArgValue::Name("Door".into()), ArgValue::Name("Kitchen".into())];
        let (op, rewritten) = c.apply_rewrite("before", &args).unwrap();
        assert_eq!(op, "locatedIn");
        assert_eq!(rewritten, vec![ArgValue::Name("Door".into()), ArgValue::Name("Kitchen".into())]);
    }

    #[test]
    fn conflicting_rewrite_is_rejected() {
        let mut c = Canonicalizer::new();
        c.register_rewrite("before", "locatedIn", vec![0, 1], vec![0, 1]).unwrap();
        let err = c.register_rewrite("before", "after", vec![0, 1], vec![0, 1]).unwrap_err();
        assert_eq!(err, CanonicalizerError::ConflictingRewrite("before".into()));
    }

    #[test]
    fn canonicalize_statement_rewrites_identifiers_not_operator() {
        let mut graph = SynonymGraph::new();
        graph.add_alias("car", "automobile");
        let c = Canonicalizer::new();
        let stmt = Statement::Assert {
            dest: None,
            operator: Expr::Ident("isA".into()),
            args: vec![Expr::Ident("car".into()), Expr::Ident("Vehicle".into())],
            comment: None,
            line: 1,
            col: 1,
        };
        let rewritten = c.canonicalize_statement(&graph, &stmt);
        match rewritten {
            Statement::Assert { operator, args, .. } => {
                assert_eq!(operator, Expr::Ident("isA".into()));
                assert_eq!(args[0], Expr::Ident("automobile".into()));
            }
            _ => panic!(),
        }
    }
}
