//! Name <-> vector vocabulary, the "Atom" table backing the engine.
//!
//! Interns every atom name through a `lasso::Rodeo` and pairs it with a
//! bidirectional name/vector table.

use lasso::{Rodeo, Spur};
use nesy_vector::{AllocatorCtx, HdcAlgebra, Strategy, StrategyId, Vector, VectorResult};
use std::collections::HashMap;

/// Name -> vector table. Reverse lookup is by the vector's own `Hash`/`Eq`
/// (derived per-strategy, see `nesy_vector::Vector`), i.e. exact equality
/// via per-strategy hash rather than nearest-neighbor search.
pub struct Vocabulary {
    strategy_id: StrategyId,
    strategy: Strategy,
    geometry: usize,
    interner: Rodeo,
    atoms: HashMap<Spur, Vector>,
    reverse: HashMap<Vector, Spur>,
}

impl Vocabulary {
    pub fn new(strategy_id: StrategyId, geometry: usize) -> Self {
        Self {
            strategy_id,
            strategy: Strategy::from_id(strategy_id),
            geometry,
            interner: Rodeo::new(),
            atoms: HashMap::new(),
            reverse: HashMap::new(),
        }
    }

    pub fn strategy_id(&self) -> StrategyId {
        self.strategy_id
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    pub fn geometry(&self) -> usize {
        self.geometry
    }

    /// Returns the existing vector for `name` if present; within one session
    /// a name always maps to the same vector instance.
    pub fn get(&self, name: &str) -> Option<Vector> {
        let spur = self.interner.get(name)?;
        self.atoms.get(&spur).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.interner.get(name).is_some()
    }

    /// Look up or deterministically create the atom for `name`.
    pub fn get_or_create(
        &mut self,
        name: &str,
        theory: Option<&str>,
        ctx: &mut dyn AllocatorCtx,
    ) -> VectorResult<Vector> {
        if let Some(v) = self.get(name) {
            return Ok(v);
        }
        let v = self.strategy.create_from_name(name, self.geometry, theory, ctx)?;
        let spur = self.interner.get_or_intern(name);
        self.atoms.insert(spur, v.clone());
        self.reverse.insert(v.clone(), spur);
        tracing::debug!(name, strategy = ?self.strategy_id, "vocabulary atom created");
        Ok(v)
    }

    /// Reverse lookup: the name whose atom vector equals `v` exactly.
    pub fn lookup_name(&self, v: &Vector) -> Option<&str> {
        let spur = self.reverse.get(v)?;
        Some(self.interner.resolve(spur))
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// All (name, vector) pairs, the decoding pool for
    /// `decodeUnboundCandidates`.
    pub fn atom_pairs(&self) -> Vec<(&str, &Vector)> {
        self.atoms
            .iter()
            .map(|(spur, v)| (self.interner.resolve(spur), v))
            .collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.atoms.keys().map(|spur| self.interner.resolve(spur))
    }

    /// Snapshot of the atom count, used by `Session`'s undo-log rollback:
    /// restoring a vocabulary to a prior length requires a full rebuild
    /// since new atoms also occupy allocator indices, so we return a
    /// cheap-to-compare fingerprint instead of implying O(1) truncation.
    pub fn fingerprint(&self) -> usize {
        self.atoms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nesy_vector::ExactAllocator;

    #[test]
    fn same_name_returns_same_vector() {
        let mut vocab = Vocabulary::new(StrategyId::DenseBinary, 256);
        let mut ctx = ExactAllocator::new();
        let a = vocab.get_or_create("Socrates", None, &mut ctx).unwrap();
        let b = vocab.get_or_create("Socrates", None, &mut ctx).unwrap();
        assert_eq!(a, b);
        assert_eq!(vocab.len(), 1);
    }

    #[test]
    fn reverse_lookup_finds_exact_match() {
        let mut vocab = Vocabulary::new(StrategyId::DenseBinary, 256);
        let mut ctx = ExactAllocator::new();
        let v = vocab.get_or_create("Socrates", None, &mut ctx).unwrap();
        assert_eq!(vocab.lookup_name(&v), Some("Socrates"));
    }

    #[test]
    fn unknown_vector_has_no_reverse_name() {
        let mut vocab = Vocabulary::new(StrategyId::DenseBinary, 256);
        let mut ctx = ExactAllocator::new();
        vocab.get_or_create("Socrates", None, &mut ctx).unwrap();
        let stray = vocab.strategy().create_random(256, 999).unwrap();
        assert_eq!(vocab.lookup_name(&stray), None);
    }
}
