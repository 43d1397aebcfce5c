//! Scope bindings: bare `@name` binds into scope only, without persisting
//! to the KB.

use nesy_kb::FactMetadata;
use nesy_vector::Vector;

/// A scope-bound name carries both the vector (for `$ref` algebra) and the
/// structured metadata (so e.g. `Implies $a $b` can reconstruct condition/
/// conclusion facts, not just bind vectors).
#[derive(Debug, Clone)]
pub struct ScopeValue {
    pub vector: Vector,
    pub metadata: FactMetadata,
}
