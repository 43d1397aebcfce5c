use crate::strategy::{AllocatorCtx, HdcAlgebra};
use crate::vector::{StrategyId, Vector, VectorData, VectorError, VectorResult};
use std::collections::{BTreeMap, HashMap};

const RING: u64 = 1u64 << 32;

/// Session-local name -> index table for the exact strategy. Reserved
/// runtime atoms (position vectors, `Implies`/`And`/`Or`/`Not`/`ForAll`/
/// `Exists`) must be reserved here before any user atom so the invariant
/// "reserved atoms precede user atoms" holds; the `Session` constructor is
/// responsible for that ordering (see nesy-session).
#[derive(Debug, Default, Clone)]
pub struct ExactAllocator {
    next_index: u32,
    name_to_index: HashMap<String, u32>,
}

impl ExactAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.name_to_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.name_to_index.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<u32> {
        self.name_to_index.get(name).copied()
    }
}

impl AllocatorCtx for ExactAllocator {
    fn reserve(&mut self, name: &str) -> u32 {
        if let Some(&idx) = self.name_to_index.get(name) {
            return idx;
        }
        let idx = self.next_index;
        self.next_index = self.next_index.wrapping_add(1);
        self.name_to_index.insert(name.to_string(), idx);
        idx
    }
}

/// One-hot / superposed-one-hot algebra. `bind` is addition in Z_2^32 on
/// basis indices (a cyclic-group permutation binding), which makes `unbind`
/// an exact inverse for atomic operands — the spec's headline invariant for
/// this strategy.
#[derive(Debug, Clone, Copy)]
pub struct Exact;

fn idx_add(a: u64, b: u64) -> u64 {
    (a + b) % RING
}

fn idx_sub(a: u64, b: u64) -> u64 {
    (a + RING - (b % RING)) % RING
}

impl HdcAlgebra for Exact {
    fn strategy_id(&self) -> StrategyId {
        StrategyId::Exact
    }

    fn create_from_name(
        &self,
        name: &str,
        geometry: usize,
        theory: Option<&str>,
        ctx: &mut dyn AllocatorCtx,
    ) -> VectorResult<Vector> {
        crate::vector::validate_geometry(geometry)?;
        let key = match theory {
            Some(t) => format!("{t}::{name}"),
            None => name.to_string(),
        };
        let idx = ctx.reserve(&key) as u64;
        let mut map = BTreeMap::new();
        map.insert(idx, 1);
        Ok(Vector::new(StrategyId::Exact, geometry, VectorData::OneHot(map)))
    }

    fn create_random(&self, geometry: usize, seed: u64) -> VectorResult<Vector> {
        crate::vector::validate_geometry(geometry)?;
        let idx = (crate::rng::seed_from_key(seed) % RING) as u64;
        let mut map = BTreeMap::new();
        map.insert(idx, 1);
        Ok(Vector::new(StrategyId::Exact, geometry, VectorData::OneHot(map)))
    }

    fn bind(&self, a: &Vector, b: &Vector) -> VectorResult<Vector> {
        a.check_same_strategy(b)?;
        let (VectorData::OneHot(ma), VectorData::OneHot(mb)) = (&a.data, &b.data) else {
            return Err(VectorError::StrategyMismatch { a: a.strategy, b: b.strategy });
        };
        let mut out = BTreeMap::new();
        for (&ia, &wa) in ma {
            for (&ib, &wb) in mb {
                *out.entry(idx_add(ia, ib)).or_insert(0) += wa * wb;
            }
        }
        Ok(Vector::new(StrategyId::Exact, a.geometry, VectorData::OneHot(out)))
    }

    fn unbind(&self, a: &Vector, b: &Vector) -> VectorResult<Vector> {
        a.check_same_strategy(b)?;
        let (VectorData::OneHot(ma), VectorData::OneHot(mb)) = (&a.data, &b.data) else {
            return Err(VectorError::StrategyMismatch { a: a.strategy, b: b.strategy });
        };
        let mut out = BTreeMap::new();
        for (&ia, &wa) in ma {
            for (&ib, &wb) in mb {
                *out.entry(idx_sub(ia, ib)).or_insert(0) += wa * wb;
            }
        }
        Ok(Vector::new(StrategyId::Exact, a.geometry, VectorData::OneHot(out)))
    }

    fn bundle(&self, vs: &[&Vector]) -> VectorResult<Vector> {
        let Some(first) = vs.first() else {
            return Err(VectorError::EmptyBundle);
        };
        for v in vs {
            first.check_same_strategy(v)?;
        }
        let mut out = BTreeMap::new();
        for v in vs {
            let VectorData::OneHot(map) = &v.data else {
                return Err(VectorError::StrategyMismatch { a: v.strategy, b: v.strategy });
            };
            for (&idx, &w) in map {
                *out.entry(idx).or_insert(0) += w;
            }
        }
        Ok(Vector::new(StrategyId::Exact, first.geometry, VectorData::OneHot(out)))
    }

    fn similarity(&self, a: &Vector, b: &Vector) -> VectorResult<f64> {
        a.check_same_strategy(b)?;
        let (VectorData::OneHot(ma), VectorData::OneHot(mb)) = (&a.data, &b.data) else {
            return Err(VectorError::StrategyMismatch { a: a.strategy, b: b.strategy });
        };
        let total_a: i64 = ma.values().map(|&w| w as i64).sum();
        let total_b: i64 = mb.values().map(|&w| w as i64).sum();
        if total_a == 0 && total_b == 0 {
            return Ok(1.0);
        }
        let mut overlap = 0i64;
        for (idx, &wa) in ma {
            if let Some(&wb) = mb.get(idx) {
                overlap += wa.min(wb) as i64;
            }
        }
        let denom = total_a.max(total_b).max(1) as f64;
        Ok(overlap as f64 / denom)
    }

    fn equals(&self, a: &Vector, b: &Vector) -> VectorResult<bool> {
        a.check_same_strategy(b)?;
        Ok(a.data == b.data)
    }
}
