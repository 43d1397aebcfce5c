//! Symbolic knowledge base: facts, rules, synonym/alias canonicalization,
//! and the incrementally bundled KB vector (see module-level docs in
//! `component_kb`).

pub mod canonicalizer;
pub mod component_kb;
pub mod fact;
pub mod synonyms;

pub use canonicalizer::{Canonicalizer, CanonicalizerError};
pub use component_kb::ComponentKB;
pub use fact::{ArgValue, Fact, FactMetadata, Rule};
pub use synonyms::SynonymGraph;
