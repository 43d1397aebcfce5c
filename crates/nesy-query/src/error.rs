use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("query has no holes to fill")]
    NoHoles,
    #[error("operator {0} has no vocabulary atom")]
    UnknownOperator(String),
    #[error(transparent)]
    Vector(#[from] nesy_vector::VectorError),
}
