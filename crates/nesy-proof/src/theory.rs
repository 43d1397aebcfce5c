//! Theory-declared constraints shared by the proof engine (symmetric,
//! transitive, inverse relations, quantifier disjointness) and the
//! contradiction detector. Populated by the executor from
//! `__SymmetricRelation`/`__TransitiveRelation`/`inverseRelation`/
//! `mutuallyExclusive`/`contradictsSameArgs`/`DISJOINT_WITH`/functional/
//! cardinality declarations.

use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
pub struct CardinalityConstraint {
    pub type_name: String,
    pub relation: String,
    pub min: u32,
    pub max: u32,
}

#[derive(Debug, Clone, Default)]
pub struct TheoryConstraints {
    pub symmetric: HashSet<String>,
    pub transitive: HashSet<String>,
    pub inverse: HashMap<String, String>,
    /// operator -> pairs of values that cannot both hold for the same subject
    pub mutually_exclusive: HashMap<String, Vec<(String, String)>>,
    pub contradicts_same_args: Vec<(String, String)>,
    pub disjoint: Vec<(String, String)>,
    pub functional: HashSet<String>,
    pub cardinality: Vec<CardinalityConstraint>,
}

impl TheoryConstraints {
    pub fn is_transitive(&self, op: &str) -> bool {
        op == "isA" || op == "locatedIn" || self.transitive.contains(op)
    }

    pub fn is_symmetric(&self, op: &str) -> bool {
        self.symmetric.contains(op)
    }

    pub fn inverse_of(&self, op: &str) -> Option<&str> {
        self.inverse.get(op).map(|s| s.as_str())
    }

    pub fn is_disjoint(&self, a: &str, b: &str) -> bool {
        self.disjoint.iter().any(|(x, y)| (x == a && y == b) || (x == b && y == a))
    }

    pub fn contradicts(&self, op1: &str, op2: &str) -> bool {
        self.contradicts_same_args
            .iter()
            .any(|(a, b)| (a == op1 && b == op2) || (a == op2 && b == op1))
    }

    pub fn mutually_exclusive_values(&self, op: &str, v1: &str, v2: &str) -> bool {
        self.mutually_exclusive
            .get(op)
            .map(|pairs| pairs.iter().any(|(a, b)| (a == v1 && b == v2) || (a == v2 && b == v1)))
            .unwrap_or(false)
    }
}
