use crate::vector::{StrategyId, Vector, VectorResult};

/// Threaded into every `create_from_name` call so the exact strategy can
/// assign allocator indices without the facade needing to know which
/// strategies are stateful. Non-exact strategies ignore it.
///
/// Per the session-local-allocator design note, the real implementation of
/// this trait lives on the `Session`'s owned `ExactAllocator` — strategies
/// themselves stay stateless and never hold allocator state.
pub trait AllocatorCtx {
    /// Reserve (or look up) the index for `name`, returning the same index
    /// on every call with the same name within one session.
    fn reserve(&mut self, name: &str) -> u32;
}

/// An allocator context that panics if used — for strategies that do not
/// need one, so callers can pass `&mut NullAllocatorCtx` without an `Option`.
pub struct NullAllocatorCtx;
impl AllocatorCtx for NullAllocatorCtx {
    fn reserve(&mut self, _name: &str) -> u32 {
        0
    }
}

/// A ranked candidate returned by `decode_unbound_candidates`.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub name: String,
    pub similarity: f64,
}

/// The contract every HDC strategy implements.
pub trait HdcAlgebra {
    fn strategy_id(&self) -> StrategyId;

    fn create_from_name(
        &self,
        name: &str,
        geometry: usize,
        theory: Option<&str>,
        ctx: &mut dyn AllocatorCtx,
    ) -> VectorResult<Vector>;

    fn create_random(&self, geometry: usize, seed: u64) -> VectorResult<Vector>;

    fn bind(&self, a: &Vector, b: &Vector) -> VectorResult<Vector>;
    fn unbind(&self, a: &Vector, b: &Vector) -> VectorResult<Vector>;
    fn bundle(&self, vs: &[&Vector]) -> VectorResult<Vector>;
    fn similarity(&self, a: &Vector, b: &Vector) -> VectorResult<f64>;

    fn equals(&self, a: &Vector, b: &Vector) -> VectorResult<bool> {
        Ok(self.similarity(a, b)? >= 0.999)
    }

    /// Rank named vocabulary vectors by similarity to `residual`, optionally
    /// restricted to `domain` (a subset of names). Default implementation is
    /// a linear scan, adequate at the scale this engine targets (spec is
    /// explicit that HNSW-grade indexing is out of scope).
    fn decode_unbound_candidates(
        &self,
        residual: &Vector,
        pool: &[(&str, &Vector)],
        max_candidates: usize,
    ) -> VectorResult<Vec<Candidate>> {
        let mut scored = Vec::with_capacity(pool.len());
        for (name, v) in pool {
            let sim = self.similarity(residual, v)?;
            scored.push(Candidate {
                name: (*name).to_string(),
                similarity: sim,
            });
        }
        scored.sort_by(|a, b| b.similarity.partial_cmp(&a.similarity).unwrap());
        scored.truncate(max_candidates);
        Ok(scored)
    }
}

/// The closed set of strategies the facade dispatches over. A tagged-variant
/// enum rather than a trait object: cheap to match on, and `Strategy`
/// instances themselves are zero-sized / stateless (allocator state is
/// threaded in explicitly via `AllocatorCtx`, never stored here).
#[derive(Debug, Clone, Copy)]
pub enum Strategy {
    DenseBinary(crate::dense_binary::DenseBinary),
    SparsePolynomial(crate::sparse_polynomial::SparsePolynomial),
    MetricAffine(crate::metric_affine::MetricAffine),
    MetricAffineElastic(crate::metric_affine::MetricAffine),
    Exact(crate::exact::Exact),
}

impl Strategy {
    pub fn from_id(id: StrategyId) -> Self {
        match id {
            StrategyId::DenseBinary => Strategy::DenseBinary(crate::dense_binary::DenseBinary),
            StrategyId::SparsePolynomial => {
                Strategy::SparsePolynomial(crate::sparse_polynomial::SparsePolynomial)
            }
            StrategyId::MetricAffine => {
                Strategy::MetricAffine(crate::metric_affine::MetricAffine { elastic: false })
            }
            StrategyId::MetricAffineElastic => {
                Strategy::MetricAffineElastic(crate::metric_affine::MetricAffine { elastic: true })
            }
            StrategyId::Exact => Strategy::Exact(crate::exact::Exact),
        }
    }

    fn algebra(&self) -> &dyn HdcAlgebra {
        match self {
            Strategy::DenseBinary(s) => s,
            Strategy::SparsePolynomial(s) => s,
            Strategy::MetricAffine(s) => s,
            Strategy::MetricAffineElastic(s) => s,
            Strategy::Exact(s) => s,
        }
    }
}

impl HdcAlgebra for Strategy {
    fn strategy_id(&self) -> StrategyId {
        self.algebra().strategy_id()
    }

    fn create_from_name(
        &self,
        name: &str,
        geometry: usize,
        theory: Option<&str>,
        ctx: &mut dyn AllocatorCtx,
    ) -> VectorResult<Vector> {
        self.algebra().create_from_name(name, geometry, theory, ctx)
    }

    fn create_random(&self, geometry: usize, seed: u64) -> VectorResult<Vector> {
        self.algebra().create_random(geometry, seed)
    }

    fn bind(&self, a: &Vector, b: &Vector) -> VectorResult<Vector> {
        self.algebra().bind(a, b)
    }

    fn unbind(&self, a: &Vector, b: &Vector) -> VectorResult<Vector> {
        self.algebra().unbind(a, b)
    }

    fn bundle(&self, vs: &[&Vector]) -> VectorResult<Vector> {
        self.algebra().bundle(vs)
    }

    fn similarity(&self, a: &Vector, b: &Vector) -> VectorResult<f64> {
        self.algebra().similarity(a, b)
    }

    fn equals(&self, a: &Vector, b: &Vector) -> VectorResult<bool> {
        self.algebra().equals(a, b)
    }

    fn decode_unbound_candidates(
        &self,
        residual: &Vector,
        pool: &[(&str, &Vector)],
        max_candidates: usize,
    ) -> VectorResult<Vec<Candidate>> {
        self.algebra()
            .decode_unbound_candidates(residual, pool, max_candidates)
    }
}
