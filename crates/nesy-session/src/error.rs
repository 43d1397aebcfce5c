//! Error taxonomy: `LexerError`/`ParseError` and
//! `ExecutionError` are fatal to the enclosing `learn` and trigger
//! rollback; `ContradictionRejected` and `LoadError` likewise. `ProofError`
//! never surfaces (the proof engine always returns a result object).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("parse error: {0}")]
    Parse(#[from] nesy_parser::ParseError),
    #[error("undefined reference: {0}")]
    UndefinedReference(String),
    #[error("vector error: {0}")]
    Vector(#[from] nesy_vector::VectorError),
    #[error("unknown operator {0} in strict mode")]
    UnknownOperator(String),
    #[error("missing type marker for {0}")]
    MissingType(String),
    #[error("contradiction rejected: {0}")]
    ContradictionRejected(String),
    #[error("load error: {0}")]
    Load(String),
    #[error("query error: {0}")]
    Query(#[from] nesy_query::QueryError),
}
