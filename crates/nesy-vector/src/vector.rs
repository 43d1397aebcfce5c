use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Which algebra a [`Vector`] was built under. Carried in the header so the
/// facade can refuse cross-strategy operations instead of silently producing
/// garbage (spec invariant: "no operation crosses strategies").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StrategyId {
    DenseBinary,
    SparsePolynomial,
    MetricAffine,
    MetricAffineElastic,
    Exact,
}

impl StrategyId {
    pub fn name(self) -> &'static str {
        match self {
            StrategyId::DenseBinary => "dense-binary",
            StrategyId::SparsePolynomial => "sparse-polynomial",
            StrategyId::MetricAffine => "metric-affine",
            StrategyId::MetricAffineElastic => "metric-affine-elastic",
            StrategyId::Exact => "exact",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "dense-binary" => Some(StrategyId::DenseBinary),
            "sparse-polynomial" => Some(StrategyId::SparsePolynomial),
            "metric-affine" => Some(StrategyId::MetricAffine),
            "metric-affine-elastic" => Some(StrategyId::MetricAffineElastic),
            "exact" => Some(StrategyId::Exact),
            _ => None,
        }
    }
}

/// The strategy-specific payload. Kept as a closed enum rather than a trait
/// object: vectors are plain data, the algebra lives in `crate::strategy`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VectorData {
    /// dense-binary: packed bits, `ceil(geometry/32)` words.
    Bits(Vec<u32>),
    /// sparse-polynomial: set of exponents (mod ring size) with unit coefficients.
    Poly(Vec<u32>),
    /// metric-affine / metric-affine-elastic: `geometry` bytes of modular integers.
    Bytes(Vec<u8>),
    /// exact: sparse superposition of one-hot basis indices, index -> weight.
    OneHot(BTreeMap<u64, i32>),
}

#[derive(Debug, Error)]
pub enum VectorError {
    #[error("strategy mismatch: {a:?} vs {b:?}")]
    StrategyMismatch { a: StrategyId, b: StrategyId },
    #[error("geometry mismatch: {a} vs {b}")]
    GeometryMismatch { a: usize, b: usize },
    #[error("invalid geometry {0}: must be a multiple of 32, >= 32")]
    InvalidGeometry(usize),
    #[error("position {0} out of range: must be 1..=20")]
    InvalidPosition(u8),
    #[error("empty bundle")]
    EmptyBundle,
    #[error("exact-strategy allocator exhausted")]
    AllocatorExhausted,
}

pub type VectorResult<T> = Result<T, VectorError>;

/// A single fixed-geometry hypervector, tagged with the strategy that
/// produced it. Every binary operation on two vectors must check this tag
/// before touching the payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vector {
    pub strategy: StrategyId,
    pub geometry: usize,
    pub data: VectorData,
}

impl Vector {
    pub fn new(strategy: StrategyId, geometry: usize, data: VectorData) -> Self {
        Self {
            strategy,
            geometry,
            data,
        }
    }

    pub fn check_same_strategy(&self, other: &Vector) -> VectorResult<()> {
        if self.strategy != other.strategy {
            return Err(VectorError::StrategyMismatch {
                a: self.strategy,
                b: other.strategy,
            });
        }
        if self.geometry != other.geometry {
            return Err(VectorError::GeometryMismatch {
                a: self.geometry,
                b: other.geometry,
            });
        }
        Ok(())
    }

    /// Popcount / weight, used by dense-binary density and by the exact
    /// strategy's "one or more live basis indices" checks.
    pub fn density(&self) -> f64 {
        match &self.data {
            VectorData::Bits(words) => {
                let bits: u32 = words.iter().map(|w| w.count_ones()).sum();
                bits as f64 / self.geometry as f64
            }
            VectorData::Bytes(bytes) => {
                let nonzero = bytes.iter().filter(|&&b| b != 0).count();
                nonzero as f64 / bytes.len().max(1) as f64
            }
            VectorData::Poly(exps) => exps.len() as f64 / self.geometry.max(1) as f64,
            VectorData::OneHot(map) => map.len() as f64 / self.geometry.max(1) as f64,
        }
    }

    /// Serialize to the persisted wire layout:
    /// `{geometry, strategyId, data:base64}`.
    pub fn to_persisted(&self) -> PersistedVector {
        let raw = serde_json::to_vec(&self.data).expect("VectorData serializes");
        PersistedVector {
            geometry: self.geometry,
            strategy_id: self.strategy,
            data: base64::Engine::encode(&base64::engine::general_purpose::STANDARD, raw),
        }
    }

    pub fn from_persisted(p: &PersistedVector) -> VectorResult<Self> {
        use base64::Engine;
        let raw = base64::engine::general_purpose::STANDARD
            .decode(&p.data)
            .map_err(|_| VectorError::InvalidGeometry(p.geometry))?;
        let data: VectorData =
            serde_json::from_slice(&raw).map_err(|_| VectorError::InvalidGeometry(p.geometry))?;
        Ok(Vector::new(p.strategy_id, p.geometry, data))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedVector {
    pub geometry: usize,
    pub strategy_id: StrategyId,
    pub data: String,
}

pub fn validate_geometry(geometry: usize) -> VectorResult<()> {
    if geometry < 32 || geometry % 32 != 0 {
        return Err(VectorError::InvalidGeometry(geometry));
    }
    Ok(())
}
