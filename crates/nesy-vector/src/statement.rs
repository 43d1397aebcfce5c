//! Statement vector construction shared by the executor and the query
//! engine, so both build exactly the same geometry for a given
//! `op arg1 .. argN`.
//! `bind(op_vec, withPos(1,A1)) ⊕ withPos(2,A2) ⊕ ... ⊕ withPos(n,An)`.

use crate::position::PositionTagger;
use crate::strategy::{AllocatorCtx, HdcAlgebra, Strategy};
use crate::vector::{Vector, VectorResult};

pub fn build_statement_vector(
    strategy: &Strategy,
    tagger: &mut PositionTagger,
    op_vec: &Vector,
    arg_vecs: &[Vector],
    ctx: &mut dyn AllocatorCtx,
) -> VectorResult<Vector> {
    if arg_vecs.is_empty() {
        return Ok(op_vec.clone());
    }
    let first_term = strategy.bind(op_vec, &tagger.with_position(strategy, 1, &arg_vecs[0], ctx)?)?;
    let mut parts = vec![first_term];
    for (i, arg) in arg_vecs.iter().enumerate().skip(1) {
        let p = (i + 1) as u8;
        parts.push(tagger.with_position(strategy, p, arg, ctx)?);
    }
    let refs: Vec<&Vector> = parts.iter().collect();
    strategy.bundle(&refs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::NullAllocatorCtx;
    use crate::vector::StrategyId;

    #[test]
    fn single_arg_statement_binds_operator_and_position() {
        let strategy = Strategy::from_id(StrategyId::DenseBinary);
        let mut tagger = PositionTagger::new(StrategyId::DenseBinary, 256);
        let mut ctx = NullAllocatorCtx;
        let op = strategy.create_random(256, 1).unwrap();
        let arg = strategy.create_random(256, 2).unwrap();
        let v = build_statement_vector(&strategy, &mut tagger, &op, &[arg], &mut ctx).unwrap();
        assert_eq!(v.geometry, 256);
    }

    #[test]
    fn multi_arg_statement_is_deterministic() {
        let strategy = Strategy::from_id(StrategyId::DenseBinary);
        let mut tagger = PositionTagger::new(StrategyId::DenseBinary, 256);
        let mut ctx = NullAllocatorCtx;
        let op = strategy.create_random(256, 1).unwrap();
        let a1 = strategy.create_random(256, 2).unwrap();
        let a2 = strategy.create_random(256, 3).unwrap();
        let v1 = build_statement_vector(&strategy, &mut tagger, &op, &[a1.clone(), a2.clone()], &mut ctx).unwrap();
        let v2 = build_statement_vector(&strategy, &mut tagger, &op, &[a1, a2], &mut ctx).unwrap();
        assert_eq!(v1, v2);
    }
}
