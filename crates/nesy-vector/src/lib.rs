//! Fixed-geometry hypervector container and pluggable HDC algebra.
//!
//! A [`Vector`] is strategy-tagged data; the algebra (bind/unbind/bundle/
//! similarity) lives on [`Strategy`] via the [`HdcAlgebra`] trait so every
//! binary operation can refuse to mix strategies instead of guessing.

pub mod dense_binary;
pub mod exact;
pub mod metric_affine;
pub mod position;
pub mod rng;
pub mod sparse_polynomial;
pub mod statement;
pub mod strategy;
pub mod vector;

pub use exact::ExactAllocator;
pub use position::{PositionTagger, RESERVED_OPERATORS};
pub use statement::build_statement_vector;
pub use strategy::{AllocatorCtx, Candidate, HdcAlgebra, NullAllocatorCtx, Strategy};
pub use vector::{PersistedVector, StrategyId, Vector, VectorData, VectorError, VectorResult};

#[cfg(test)]
mod tests {
    use super::*;

    fn strategies() -> Vec<StrategyId> {
        vec![
            StrategyId::DenseBinary,
            StrategyId::SparsePolynomial,
            StrategyId::MetricAffine,
            StrategyId::MetricAffineElastic,
            StrategyId::Exact,
        ]
    }

    #[test]
    fn create_from_name_is_deterministic() {
        for id in strategies() {
            let strat = Strategy::from_id(id);
            let mut ctx1 = ExactAllocator::new();
            let mut ctx2 = ExactAllocator::new();
            let a = strat.create_from_name("Socrates", 256, None, &mut ctx1).unwrap();
            let b = strat.create_from_name("Socrates", 256, None, &mut ctx2).unwrap();
            assert!(strat.equals(&a, &b).unwrap(), "{id:?} not deterministic");
        }
    }

    #[test]
    fn unbind_inverts_bind_for_atoms() {
        for id in strategies() {
            let strat = Strategy::from_id(id);
            let mut ctx = ExactAllocator::new();
            let a = strat.create_from_name("a", 256, None, &mut ctx).unwrap();
            let b = strat.create_from_name("b", 256, None, &mut ctx).unwrap();
            let bound = strat.bind(&a, &b).unwrap();
            let recovered = strat.unbind(&bound, &b).unwrap();
            let sim = strat.similarity(&a, &recovered).unwrap();
            let threshold = match id {
                StrategyId::SparsePolynomial => 0.6,
                _ => 0.99,
            };
            assert!(sim >= threshold, "{id:?} unbind(bind(a,b),b) sim={sim}");
        }
    }

    #[test]
    fn similarity_self_is_near_one() {
        for id in strategies() {
            let strat = Strategy::from_id(id);
            let mut ctx = ExactAllocator::new();
            let a = strat.create_from_name("a", 256, None, &mut ctx).unwrap();
            assert!(strat.similarity(&a, &a).unwrap() >= 0.99);
        }
    }

    #[test]
    fn bundle_is_closer_to_members_than_to_a_stranger() {
        for id in strategies() {
            let strat = Strategy::from_id(id);
            let mut ctx = ExactAllocator::new();
            let a = strat.create_from_name("a", 256, None, &mut ctx).unwrap();
            let b = strat.create_from_name("b", 256, None, &mut ctx).unwrap();
            let stranger = strat.create_from_name("stranger", 256, None, &mut ctx).unwrap();
            let bundle = strat.bundle(&[&a, &b]).unwrap();
            let sim_a = strat.similarity(&bundle, &a).unwrap();
            let sim_stranger = strat.similarity(&bundle, &stranger).unwrap();
            assert!(sim_a > sim_stranger, "{id:?}: bundle should favor members");
        }
    }

    #[test]
    fn position_roundtrip() {
        for id in strategies() {
            let strat = Strategy::from_id(id);
            let mut ctx = ExactAllocator::new();
            let mut tagger = position::PositionTagger::new(id, 256);
            let v = strat.create_from_name("atom", 256, None, &mut ctx).unwrap();
            let tagged = tagger.with_position(&strat, 3, &v, &mut ctx).unwrap();
            let untagged = tagger.remove_position(&strat, 3, &tagged, &mut ctx).unwrap();
            let sim = strat.similarity(&v, &untagged).unwrap();
            let threshold = match id {
                StrategyId::SparsePolynomial => 0.6,
                _ => 0.99,
            };
            assert!(sim >= threshold, "{id:?} position roundtrip sim={sim}");
        }
    }

    #[test]
    fn position_out_of_range_fails() {
        let strat = Strategy::from_id(StrategyId::DenseBinary);
        let mut ctx = ExactAllocator::new();
        let mut tagger = position::PositionTagger::new(StrategyId::DenseBinary, 256);
        assert!(tagger.position_vector(0, &strat, &mut ctx).is_err());
        assert!(tagger.position_vector(21, &strat, &mut ctx).is_err());
    }

    #[test]
    fn cross_strategy_ops_fail() {
        let dense = Strategy::from_id(StrategyId::DenseBinary);
        let exact = Strategy::from_id(StrategyId::Exact);
        let mut ctx = ExactAllocator::new();
        let a = dense.create_from_name("a", 256, None, &mut ctx).unwrap();
        let b = exact.create_from_name("b", 256, None, &mut ctx).unwrap();
        assert!(dense.bind(&a, &b).is_err());
    }

    #[test]
    fn exact_reserved_atoms_precede_user_atoms() {
        let mut alloc = ExactAllocator::new();
        for name in RESERVED_OPERATORS {
            alloc.reserve(name);
        }
        for p in position::MIN_POSITION..=position::MAX_POSITION {
            alloc.reserve(&format!("__POS_{p}__"));
        }
        let reserved_max = alloc.len() as u32 - 1;
        let user_idx = alloc.reserve("Socrates");
        assert!(user_idx > reserved_max);
    }

    #[test]
    fn exact_independent_atoms_have_zero_similarity() {
        let strat = Strategy::from_id(StrategyId::Exact);
        let mut ctx = ExactAllocator::new();
        let a = strat.create_from_name("a", 256, None, &mut ctx).unwrap();
        let b = strat.create_from_name("b", 256, None, &mut ctx).unwrap();
        assert_eq!(strat.similarity(&a, &b).unwrap(), 0.0);
    }

    #[test]
    fn metric_affine_independent_baseline_near_067() {
        let strat = Strategy::from_id(StrategyId::MetricAffine);
        let mut ctx = ExactAllocator::new();
        let a = strat.create_from_name("a", 2048, None, &mut ctx).unwrap();
        let b = strat.create_from_name("b", 2048, None, &mut ctx).unwrap();
        let sim = strat.similarity(&a, &b).unwrap();
        assert!((0.55..=0.8).contains(&sim), "baseline drifted: {sim}");
    }

    #[test]
    fn persisted_roundtrip_preserves_vector() {
        for id in strategies() {
            let strat = Strategy::from_id(id);
            let mut ctx = ExactAllocator::new();
            let a = strat.create_from_name("a", 256, None, &mut ctx).unwrap();
            let persisted = a.to_persisted();
            let back = Vector::from_persisted(&persisted).unwrap();
            assert_eq!(a, back);
        }
    }
}
