//! Unified proof engine, independent validator, and contradiction
//! detector.

pub mod contradiction;
pub mod forward;
pub mod proof_object;
pub mod prover;
pub mod theory;
pub mod unify;
pub mod validator;

pub use contradiction::{ContradictionDetector, ContradictionReport};
pub use forward::ForwardChainer;
pub use proof_object::{ProofObject, ProofResult, Step, StepKind, UsesFact};
pub use prover::{ProofConfig, Prover};
pub use theory::{CardinalityConstraint, TheoryConstraints};
pub use validator::validate_proof;
