use crate::rng::{fill_random_bits, seed_from_key};
use crate::strategy::{AllocatorCtx, HdcAlgebra};
use crate::vector::{StrategyId, Vector, VectorData, VectorError, VectorResult};

/// XOR-binding over packed bits: the textbook binary-spatter-code algebra.
/// `bind`/`unbind` are the same operation (XOR is self-inverse); `bundle` is
/// per-bit majority vote, ties broken to `1` so the result stays
/// deterministic across calls.
#[derive(Debug, Clone, Copy)]
pub struct DenseBinary;

fn word_count(geometry: usize) -> usize {
    geometry.div_ceil(32)
}

fn xor_words(a: &[u32], b: &[u32]) -> Vec<u32> {
    a.iter().zip(b.iter()).map(|(x, y)| x ^ y).collect()
}

impl HdcAlgebra for DenseBinary {
    fn strategy_id(&self) -> StrategyId {
        StrategyId::DenseBinary
    }

    fn create_from_name(
        &self,
        name: &str,
        geometry: usize,
        theory: Option<&str>,
        _ctx: &mut dyn AllocatorCtx,
    ) -> VectorResult<Vector> {
        crate::vector::validate_geometry(geometry)?;
        let key = (StrategyId::DenseBinary, geometry, theory, name);
        let seed = seed_from_key(key);
        let words = fill_random_bits(seed, word_count(geometry));
        Ok(Vector::new(StrategyId::DenseBinary, geometry, VectorData::Bits(words)))
    }

    fn create_random(&self, geometry: usize, seed: u64) -> VectorResult<Vector> {
        crate::vector::validate_geometry(geometry)?;
        let words = fill_random_bits(seed, word_count(geometry));
        Ok(Vector::new(StrategyId::DenseBinary, geometry, VectorData::Bits(words)))
    }

    fn bind(&self, a: &Vector, b: &Vector) -> VectorResult<Vector> {
        a.check_same_strategy(b)?;
        let (VectorData::Bits(wa), VectorData::Bits(wb)) = (&a.data, &b.data) else {
            return Err(VectorError::StrategyMismatch { a: a.strategy, b: b.strategy });
        };
        Ok(Vector::new(a.strategy, a.geometry, VectorData::Bits(xor_words(wa, wb))))
    }

    fn unbind(&self, a: &Vector, b: &Vector) -> VectorResult<Vector> {
        // XOR is its own inverse.
        self.bind(a, b)
    }

    fn bundle(&self, vs: &[&Vector]) -> VectorResult<Vector> {
        let Some(first) = vs.first() else {
            return Err(VectorError::EmptyBundle);
        };
        for v in vs {
            first.check_same_strategy(v)?;
        }
        let geometry = first.geometry;
        let n_words = word_count(geometry);
        let threshold = vs.len() as u32;
        let mut counts = vec![0u32; geometry];
        for v in vs {
            let VectorData::Bits(words) = &v.data else {
                return Err(VectorError::StrategyMismatch { a: v.strategy, b: v.strategy });
            };
            for bit in 0..geometry {
                let word = words[bit / 32];
                if (word >> (bit % 32)) & 1 == 1 {
                    counts[bit] += 1;
                }
            }
        }
        let mut out = vec![0u32; n_words];
        for bit in 0..geometry {
            // Majority vote; ties (even count, count*2 == n) resolved to 1.
            if counts[bit] * 2 >= threshold {
                out[bit / 32] |= 1 << (bit % 32);
            }
        }
        Ok(Vector::new(StrategyId::DenseBinary, geometry, VectorData::Bits(out)))
    }

    fn similarity(&self, a: &Vector, b: &Vector) -> VectorResult<f64> {
        a.check_same_strategy(b)?;
        let (VectorData::Bits(wa), VectorData::Bits(wb)) = (&a.data, &b.data) else {
            return Err(VectorError::StrategyMismatch { a: a.strategy, b: b.strategy });
        };
        let hamming: u32 = wa.iter().zip(wb.iter()).map(|(x, y)| (x ^ y).count_ones()).sum();
        Ok(1.0 - hamming as f64 / a.geometry as f64)
    }
}
