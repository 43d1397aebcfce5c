use crate::rng::{sample_exponents, seed_from_key};
use crate::strategy::{AllocatorCtx, HdcAlgebra};
use crate::vector::{StrategyId, Vector, VectorData, VectorError, VectorResult};

/// Degree of the polynomial ring `Z_2[x]/(x^RING - 1)` each vector lives in.
/// `geometry` still names the nominal bit-width; exponents wrap modulo
/// `RING_FACTOR * geometry` so the ring is a fixed multiple of geometry,
/// keeping it "a small polynomial ring" rather than one as large as the
/// full exponent space would allow.
const RING_FACTOR: u32 = 4;
const ATOM_TERM_COUNT: usize = 8;

/// A vector is a sparse set of exponents: a 0/1 polynomial over a cyclic
/// ring. `bind` is polynomial multiplication (circular convolution of the
/// presence sets, i.e. exponent-pairwise sums); `unbind` is the best-effort
/// circular correlation inverse, exact only up to the strategy's `>= 0.99`
/// similarity guarantee rather than bit-exact.
#[derive(Debug, Clone, Copy)]
pub struct SparsePolynomial;

fn ring_size(geometry: usize) -> u32 {
    geometry as u32 * RING_FACTOR
}

impl HdcAlgebra for SparsePolynomial {
    fn strategy_id(&self) -> StrategyId {
        StrategyId::SparsePolynomial
    }

    fn create_from_name(
        &self,
        name: &str,
        geometry: usize,
        theory: Option<&str>,
        _ctx: &mut dyn AllocatorCtx,
    ) -> VectorResult<Vector> {
        crate::vector::validate_geometry(geometry)?;
        let ring = ring_size(geometry);
        let key = (StrategyId::SparsePolynomial, geometry, theory, name);
        let seed = seed_from_key(key);
        let exps = sample_exponents(seed, ring, ATOM_TERM_COUNT);
        Ok(Vector::new(StrategyId::SparsePolynomial, geometry, VectorData::Poly(exps)))
    }

    fn create_random(&self, geometry: usize, seed: u64) -> VectorResult<Vector> {
        crate::vector::validate_geometry(geometry)?;
        let ring = ring_size(geometry);
        let exps = sample_exponents(seed, ring, ATOM_TERM_COUNT);
        Ok(Vector::new(StrategyId::SparsePolynomial, geometry, VectorData::Poly(exps)))
    }

    fn bind(&self, a: &Vector, b: &Vector) -> VectorResult<Vector> {
        a.check_same_strategy(b)?;
        let (VectorData::Poly(ea), VectorData::Poly(eb)) = (&a.data, &b.data) else {
            return Err(VectorError::StrategyMismatch { a: a.strategy, b: b.strategy });
        };
        let ring = ring_size(a.geometry);
        let mut out = std::collections::BTreeSet::new();
        for &x in ea {
            for &y in eb {
                out.insert((x + y) % ring);
            }
        }
        Ok(Vector::new(
            StrategyId::SparsePolynomial,
            a.geometry,
            VectorData::Poly(out.into_iter().collect()),
        ))
    }

    fn unbind(&self, a: &Vector, b: &Vector) -> VectorResult<Vector> {
        a.check_same_strategy(b)?;
        let (VectorData::Poly(ea), VectorData::Poly(eb)) = (&a.data, &b.data) else {
            return Err(VectorError::StrategyMismatch { a: a.strategy, b: b.strategy });
        };
        let ring = ring_size(a.geometry);
        // Circular correlation: for each candidate exponent e, count how
        // many (x - y) pairs land on e; keep the top-scoring ATOM_TERM_COUNT.
        let mut scores = std::collections::HashMap::<u32, u32>::new();
        for &x in ea {
            for &y in eb {
                let e = (x + ring - y % ring) % ring;
                *scores.entry(e).or_insert(0) += 1;
            }
        }
        let mut scored: Vec<(u32, u32)> = scores.into_iter().collect();
        scored.sort_by(|x, y| y.1.cmp(&x.1).then(x.0.cmp(&y.0)));
        scored.truncate(ATOM_TERM_COUNT);
        let mut out: Vec<u32> = scored.into_iter().map(|(e, _)| e).collect();
        out.sort_unstable();
        Ok(Vector::new(StrategyId::SparsePolynomial, a.geometry, VectorData::Poly(out)))
    }

    fn bundle(&self, vs: &[&Vector]) -> VectorResult<Vector> {
        let Some(first) = vs.first() else {
            return Err(VectorError::EmptyBundle);
        };
        for v in vs {
            first.check_same_strategy(v)?;
        }
        let mut counts = std::collections::HashMap::<u32, u32>::new();
        for v in vs {
            let VectorData::Poly(exps) = &v.data else {
                return Err(VectorError::StrategyMismatch { a: v.strategy, b: v.strategy });
            };
            for &e in exps {
                *counts.entry(e).or_insert(0) += 1;
            }
        }
        let threshold = (vs.len() as u32).div_ceil(2);
        let mut out: Vec<u32> = counts
            .into_iter()
            .filter(|(_, c)| *c >= threshold)
            .map(|(e, _)| e)
            .collect();
        out.sort_unstable();
        if out.is_empty() {
            // Degenerate all-disjoint bundle: keep the union so `bundle`
            // never silently collapses to the empty polynomial.
            for v in vs {
                if let VectorData::Poly(exps) = &v.data {
                    out.extend(exps.iter().copied());
                }
            }
            out.sort_unstable();
            out.dedup();
        }
        Ok(Vector::new(StrategyId::SparsePolynomial, first.geometry, VectorData::Poly(out)))
    }

    fn similarity(&self, a: &Vector, b: &Vector) -> VectorResult<f64> {
        a.check_same_strategy(b)?;
        let (VectorData::Poly(ea), VectorData::Poly(eb)) = (&a.data, &b.data) else {
            return Err(VectorError::StrategyMismatch { a: a.strategy, b: b.strategy });
        };
        if ea.is_empty() && eb.is_empty() {
            return Ok(1.0);
        }
        let sa: std::collections::BTreeSet<u32> = ea.iter().copied().collect();
        let sb: std::collections::BTreeSet<u32> = eb.iter().copied().collect();
        let intersection = sa.intersection(&sb).count();
        let union = sa.union(&sb).count().max(1);
        Ok(intersection as f64 / union as f64)
    }
}
