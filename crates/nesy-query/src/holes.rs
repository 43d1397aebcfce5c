//! Holographic hole-filling query engine. Binds known
//! argument positions into a partial statement vector, unbinds it out of
//! the KB vector to isolate each hole's residual, ranks vocabulary atoms
//! by similarity to that residual, then verifies the best candidates
//! symbolically before committing to an answer.

use crate::error::QueryError;
use nesy_kb::{ArgValue, ComponentKB, FactMetadata};
use nesy_vector::{AllocatorCtx, Candidate, HdcAlgebra, PositionTagger, Strategy, Vector, VectorResult};
use nesy_vocab::Vocabulary;

#[derive(Debug, Clone)]
pub struct HoleBinding {
    pub hole: String,
    pub answer: String,
    pub similarity: f64,
    pub alternatives: Vec<(String, f64)>,
    pub method: String,
}

#[derive(Debug, Clone, Copy)]
pub struct QueryConfig {
    pub max_candidates: usize,
    pub min_similarity: f64,
    pub holographic_priority: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self { max_candidates: 5, min_similarity: 0.2, holographic_priority: true }
    }
}

/// `hdcQueries`/`hdcSuccesses`/`hdcBindings`/`holo_skip_symbolic_supplement`,
/// scoped to the query engine's own holes.
#[derive(Debug, Default, Clone, Copy)]
pub struct QueryStats {
    pub hdc_queries: u64,
    pub hdc_successes: u64,
    pub hdc_bindings: u64,
    pub holo_skip_symbolic_supplement: u64,
}

pub struct HoleFiller<'a> {
    vocab: &'a Vocabulary,
    kb: &'a ComponentKB,
    config: QueryConfig,
}

fn name_of(a: &ArgValue) -> Option<&str> {
    match a {
        ArgValue::Name(n) => Some(n),
        _ => None,
    }
}

fn empty_binding(hole: String) -> HoleBinding {
    HoleBinding { hole, answer: String::new(), similarity: 0.0, alternatives: Vec::new(), method: "none".into() }
}

/// Bundles only the *known* argument positions into a statement vector;
/// the omitted hole position is what makes `unbind(kb, partial)` isolate
/// its residual.
fn build_partial(
    strategy: &Strategy,
    tagger: &mut PositionTagger,
    op_vec: &Vector,
    known: &[(u8, Vector)],
    ctx: &mut dyn AllocatorCtx,
) -> VectorResult<Vector> {
    if known.is_empty() {
        return Ok(op_vec.clone());
    }
    let mut parts = Vec::with_capacity(known.len());
    for (p, v) in known {
        let tagged = tagger.with_position(strategy, *p, v, ctx)?;
        parts.push(if *p == 1 { strategy.bind(op_vec, &tagged)? } else { tagged });
    }
    let refs: Vec<&Vector> = parts.iter().collect();
    strategy.bundle(&refs)
}

impl<'a> HoleFiller<'a> {
    pub fn new(vocab: &'a Vocabulary, kb: &'a ComponentKB, config: QueryConfig) -> Self {
        Self { vocab, kb, config }
    }

    /// Fills every top-level hole in `goal`, optionally restricting
    /// candidates to `domain` (e.g. only `Guest` atoms).
    pub fn fill(
        &self,
        goal: &FactMetadata,
        tagger: &mut PositionTagger,
        domain: Option<&[String]>,
        ctx: &mut dyn AllocatorCtx,
        stats: &mut QueryStats,
    ) -> Result<Vec<HoleBinding>, QueryError> {
        let holes: Vec<(usize, String)> = goal
            .args
            .iter()
            .enumerate()
            .filter_map(|(i, a)| match a {
                ArgValue::Hole(h) => Some((i, h.clone())),
                _ => None,
            })
            .collect();
        if holes.is_empty() {
            return Err(QueryError::NoHoles);
        }
        let kb_vector = match self.kb.kb_vector() {
            Some(v) => v.clone(),
            None => return Ok(holes.into_iter().map(|(_, h)| empty_binding(h)).collect()),
        };
        let strategy = self.vocab.strategy();
        let op_vec = self.vocab.get(&goal.operator).ok_or_else(|| QueryError::UnknownOperator(goal.operator.clone()))?;

        let known: Vec<(u8, Vector)> = goal
            .args
            .iter()
            .enumerate()
            .filter_map(|(i, a)| match a {
                ArgValue::Name(n) => self.vocab.get(n).map(|v| ((i + 1) as u8, v)),
                _ => None,
            })
            .collect();
        let partial = build_partial(strategy, tagger, &op_vec, &known, ctx)?;

        let pool: Vec<(&str, &Vector)> = match domain {
            Some(names) => self.vocab.atom_pairs().into_iter().filter(|(n, _)| names.iter().any(|d| d.as_str() == *n)).collect(),
            None => self.vocab.atom_pairs(),
        };

        let mut bindings = Vec::with_capacity(holes.len());
        for (idx, hole) in holes {
            let position = (idx + 1) as u8;
            stats.hdc_queries += 1;
            let unbound_from_kb = strategy.unbind(&kb_vector, &partial)?;
            let residual = tagger.remove_position(strategy, position, &unbound_from_kb, ctx)?;
            let candidates = strategy.decode_unbound_candidates(&residual, &pool, self.config.max_candidates)?;
            bindings.push(self.resolve_binding(goal, &hole, candidates, stats));
        }
        Ok(bindings)
    }

    fn resolve_binding(&self, goal: &FactMetadata, hole: &str, candidates: Vec<Candidate>, stats: &mut QueryStats) -> HoleBinding {
        let filtered: Vec<Candidate> = candidates.into_iter().filter(|c| c.similarity >= self.config.min_similarity).collect();
        if filtered.is_empty() {
            return empty_binding(hole.to_string());
        }
        let best = filtered[0].clone();
        let verified = self.verify_symbolically(goal, hole, &best.name);
        stats.hdc_successes += 1;
        stats.hdc_bindings += 1;
        if self.config.holographic_priority && verified {
            stats.holo_skip_symbolic_supplement += 1;
        }
        HoleBinding {
            hole: hole.to_string(),
            answer: best.name,
            similarity: best.similarity,
            alternatives: filtered.into_iter().skip(1).map(|c| (c.name, c.similarity)).collect(),
            method: if verified { "holographic+symbolic".into() } else { "holographic".into() },
        }
    }

    /// Rebuilds the candidate statement with `hole` bound to `candidate`
    /// and checks it lands among the KB's indexed facts.
    fn verify_symbolically(&self, goal: &FactMetadata, hole: &str, candidate: &str) -> bool {
        let substituted: Vec<ArgValue> = goal
            .args
            .iter()
            .map(|a| match a {
                ArgValue::Hole(h) if h == hole => ArgValue::Name(candidate.to_string()),
                other => other.clone(),
            })
            .collect();
        let a0 = substituted.first().and_then(name_of);
        let a1 = substituted.get(1).and_then(name_of);
        self.kb.find_by_operator(&goal.operator).into_iter().filter_map(|id| self.kb.fact(id)).any(|fact| self.kb.matches_with_synonyms(fact, Some(&goal.operator), a0, a1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nesy_vector::{build_statement_vector, ExactAllocator, StrategyId};

    fn setup() -> (Vocabulary, ComponentKB, ExactAllocator) {
        let mut ctx = ExactAllocator::new();
        let mut vocab = Vocabulary::new(StrategyId::Exact, 256);
        vocab.get_or_create("isA", None, &mut ctx).unwrap();
        vocab.get_or_create("Socrates", None, &mut ctx).unwrap();
        vocab.get_or_create("Human", None, &mut ctx).unwrap();
        vocab.get_or_create("Rock", None, &mut ctx).unwrap();
        let mut kb = ComponentKB::new(*vocab.strategy(), 256);
        let mut tagger = PositionTagger::new(StrategyId::Exact, 256);
        let op = vocab.get("isA").unwrap();
        let subj = vocab.get("Socrates").unwrap();
        let val = vocab.get("Human").unwrap();
        let stmt_vec = build_statement_vector(vocab.strategy(), &mut tagger, &op, &[subj, val], &mut ctx).unwrap();
        kb.add_fact(stmt_vec, None, FactMetadata::simple("isA", vec![ArgValue::Name("Socrates".into()), ArgValue::Name("Human".into())])).unwrap();
        (vocab, kb, ctx)
    }

    /// With the pool restricted to one candidate name, the top candidate
    /// must be that name regardless of how noisy the residual decode is —
    /// this isolates the domain-restriction mechanics from the HDC decode
    /// numerics.
    #[test]
    fn fills_hole_restricted_to_a_singleton_domain() {
        let (vocab, kb, mut ctx) = setup();
        let mut tagger = PositionTagger::new(StrategyId::Exact, 256);
        let filler = HoleFiller::new(&vocab, &kb, QueryConfig::default());
        let goal = FactMetadata::simple("isA", vec![ArgValue::Name("Socrates".into()), ArgValue::Hole("v".into())]);
        let mut stats = QueryStats::default();
        let domain = vec!["Human".to_string()];
        let bindings = filler.fill(&goal, &mut tagger, Some(&domain), &mut ctx, &mut stats).unwrap();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].answer, "Human");
        assert_eq!(stats.hdc_queries, 1);
    }

    #[test]
    fn no_holes_is_an_error() {
        let (vocab, kb, _ctx) = setup();
        let filler = HoleFiller::new(&vocab, &kb, QueryConfig::default());
        let goal = FactMetadata::simple("isA", vec![ArgValue::Name("Socrates".into()), ArgValue::Name("Human".into())]);
        let mut tagger = PositionTagger::new(StrategyId::Exact, 256);
        let mut ctx2 = ExactAllocator::new();
        let mut stats = QueryStats::default();
        assert!(filler.fill(&goal, &mut tagger, None, &mut ctx2, &mut stats).is_err());
    }
}
