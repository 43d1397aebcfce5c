use crate::rng::{fill_random_bytes, seed_from_key};
use crate::strategy::{AllocatorCtx, HdcAlgebra};
use crate::vector::{StrategyId, Vector, VectorData, VectorError, VectorResult};

/// Ring size for the non-elastic variant. With 3 symbols per element, two
/// independent elements agree exactly 1/3 of the time and otherwise sit at
/// cyclic distance 1 (the only other distance in Z_3) — giving a
/// random-baseline similarity of ~0.67 for unrelated names.
const MODULUS: i32 = 3;

/// Modular-integer algebra: a vector is `geometry` bytes, each an element of
/// Z_3 (elastic: Z_16 for finer-grained drift tolerance). `bind`/`unbind` are
/// elementwise modular addition/subtraction — an exact group inverse in both
/// variants. The flag changes only `similarity`: elastic tolerates small
/// per-element drift instead of demanding exact agreement.
#[derive(Debug, Clone, Copy)]
pub struct MetricAffine {
    pub elastic: bool,
}

impl MetricAffine {
    fn id(&self) -> StrategyId {
        if self.elastic {
            StrategyId::MetricAffineElastic
        } else {
            StrategyId::MetricAffine
        }
    }

    fn modulus(&self) -> i32 {
        if self.elastic { 16 } else { MODULUS }
    }
}

fn mod_add(x: u8, y: u8, m: i32) -> u8 {
    (((x as i32 + y as i32).rem_euclid(m)) % m) as u8
}

fn mod_sub(x: u8, y: u8, m: i32) -> u8 {
    (((x as i32 - y as i32).rem_euclid(m)) % m) as u8
}

impl HdcAlgebra for MetricAffine {
    fn strategy_id(&self) -> StrategyId {
        self.id()
    }

    fn create_from_name(
        &self,
        name: &str,
        geometry: usize,
        theory: Option<&str>,
        _ctx: &mut dyn AllocatorCtx,
    ) -> VectorResult<Vector> {
        crate::vector::validate_geometry(geometry)?;
        let key = (self.id(), geometry, theory, name);
        let seed = seed_from_key(key);
        let m = self.modulus();
        let bytes: Vec<u8> = fill_random_bytes(seed, geometry)
            .into_iter()
            .map(|b| (b as i32 % m) as u8)
            .collect();
        Ok(Vector::new(self.id(), geometry, VectorData::Bytes(bytes)))
    }

    fn create_random(&self, geometry: usize, seed: u64) -> VectorResult<Vector> {
        crate::vector::validate_geometry(geometry)?;
        let m = self.modulus();
        let bytes: Vec<u8> = fill_random_bytes(seed, geometry)
            .into_iter()
            .map(|b| (b as i32 % m) as u8)
            .collect();
        Ok(Vector::new(self.id(), geometry, VectorData::Bytes(bytes)))
    }

    fn bind(&self, a: &Vector, b: &Vector) -> VectorResult<Vector> {
        a.check_same_strategy(b)?;
        let (VectorData::Bytes(xa), VectorData::Bytes(xb)) = (&a.data, &b.data) else {
            return Err(VectorError::StrategyMismatch { a: a.strategy, b: b.strategy });
        };
        let m = self.modulus();
        let out: Vec<u8> = xa.iter().zip(xb.iter()).map(|(x, y)| mod_add(*x, *y, m)).collect();
        Ok(Vector::new(a.strategy, a.geometry, VectorData::Bytes(out)))
    }

    fn unbind(&self, a: &Vector, b: &Vector) -> VectorResult<Vector> {
        a.check_same_strategy(b)?;
        let (VectorData::Bytes(xa), VectorData::Bytes(xb)) = (&a.data, &b.data) else {
            return Err(VectorError::StrategyMismatch { a: a.strategy, b: b.strategy });
        };
        let m = self.modulus();
        let out: Vec<u8> = xa.iter().zip(xb.iter()).map(|(x, y)| mod_sub(*x, *y, m)).collect();
        Ok(Vector::new(a.strategy, a.geometry, VectorData::Bytes(out)))
    }

    fn bundle(&self, vs: &[&Vector]) -> VectorResult<Vector> {
        let Some(first) = vs.first() else {
            return Err(VectorError::EmptyBundle);
        };
        for v in vs {
            first.check_same_strategy(v)?;
        }
        let geometry = first.geometry;
        let m = self.modulus();
        // Per-element mode vote (ties resolved to the smallest symbol),
        // the modular-ring analogue of dense-binary's majority vote.
        let mut out = vec![0u8; geometry];
        let mut tallies = vec![[0u32; 16]; geometry];
        for v in vs {
            let VectorData::Bytes(bytes) = &v.data else {
                return Err(VectorError::StrategyMismatch { a: v.strategy, b: v.strategy });
            };
            for (i, b) in bytes.iter().enumerate() {
                tallies[i][*b as usize] += 1;
            }
        }
        for i in 0..geometry {
            let (best_symbol, _) = tallies[i][..m as usize]
                .iter()
                .enumerate()
                .max_by_key(|(_, count)| **count)
                .unwrap();
            out[i] = best_symbol as u8;
        }
        Ok(Vector::new(self.id(), geometry, VectorData::Bytes(out)))
    }

    fn similarity(&self, a: &Vector, b: &Vector) -> VectorResult<f64> {
        a.check_same_strategy(b)?;
        let (VectorData::Bytes(xa), VectorData::Bytes(xb)) = (&a.data, &b.data) else {
            return Err(VectorError::StrategyMismatch { a: a.strategy, b: b.strategy });
        };
        let m = self.modulus();
        // +1 so the farthest cyclic distance still scores > 0, matching the
        // ~0.67 independent-name baseline at m=3.
        let divisor = (m / 2 + 1) as f64;
        let total: f64 = xa
            .iter()
            .zip(xb.iter())
            .map(|(x, y)| {
                let raw = (*x as i32 - *y as i32).rem_euclid(m);
                let cyclic_dist = raw.min(m - raw) as f64;
                (1.0 - cyclic_dist / divisor).max(0.0)
            })
            .sum();
        Ok((total / xa.len() as f64).clamp(0.0, 1.0))
    }
}
