use crate::rng::seed_from_key;
use crate::strategy::{AllocatorCtx, HdcAlgebra, Strategy};
use crate::vector::{StrategyId, Vector, VectorError, VectorResult};
use std::collections::HashMap;

pub const MIN_POSITION: u8 = 1;
pub const MAX_POSITION: u8 = 20;

fn reserved_position_name(p: u8) -> String {
    format!("__POS_{p}__")
}

/// Generates and caches the up-to-20 position vectors `Pos_p` for one
/// (geometry, strategy) pair. Quasi-orthogonality comes from seeding each
/// position independently; for the exact strategy the vectors are instead
/// reserved allocator atoms, since positions must occupy the lowest indices
/// reserved in the allocator, ahead of any user atom.
#[derive(Debug, Clone)]
pub struct PositionTagger {
    strategy_id: StrategyId,
    geometry: usize,
    cache: HashMap<u8, Vector>,
}

impl PositionTagger {
    pub fn new(strategy_id: StrategyId, geometry: usize) -> Self {
        Self {
            strategy_id,
            geometry,
            cache: HashMap::new(),
        }
    }

    fn check_position(p: u8) -> VectorResult<()> {
        if !(MIN_POSITION..=MAX_POSITION).contains(&p) {
            return Err(VectorError::InvalidPosition(p));
        }
        Ok(())
    }

    pub fn position_vector(
        &mut self,
        p: u8,
        strategy: &Strategy,
        ctx: &mut dyn AllocatorCtx,
    ) -> VectorResult<Vector> {
        Self::check_position(p)?;
        if let Some(v) = self.cache.get(&p) {
            return Ok(v.clone());
        }
        let v = if self.strategy_id == StrategyId::Exact {
            strategy.create_from_name(&reserved_position_name(p), self.geometry, Some("__reserved__"), ctx)?
        } else {
            let seed = seed_from_key((self.strategy_id, self.geometry, "position", p));
            strategy.create_random(self.geometry, seed)?
        };
        self.cache.insert(p, v.clone());
        Ok(v)
    }

    pub fn with_position(
        &mut self,
        strategy: &Strategy,
        p: u8,
        v: &Vector,
        ctx: &mut dyn AllocatorCtx,
    ) -> VectorResult<Vector> {
        let pos = self.position_vector(p, strategy, ctx)?;
        strategy.bind(v, &pos)
    }

    pub fn remove_position(
        &mut self,
        strategy: &Strategy,
        p: u8,
        v: &Vector,
        ctx: &mut dyn AllocatorCtx,
    ) -> VectorResult<Vector> {
        let pos = self.position_vector(p, strategy, ctx)?;
        strategy.unbind(v, &pos)
    }
}

/// Runtime operator atoms that must be reserved in the exact allocator
/// before any user atom.
pub const RESERVED_OPERATORS: &[&str] = &["Implies", "And", "Or", "Not", "ForAll", "Exists"];
