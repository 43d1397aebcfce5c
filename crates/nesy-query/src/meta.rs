//! Meta-operator dispatch table: `deduce`, `whatif`,
//! `explain`, `findAll`. Each is a thin handler over `ComponentKB`/
//! `Prover` rather than a new inference mechanism, dispatched through a
//! pipeline-routing style handler keyed by meta-operator name.

use nesy_kb::{ArgValue, ComponentKB, FactMetadata};
use nesy_proof::{ForwardChainer, ProofConfig, ProofResult, Prover, TheoryConstraints};
use std::collections::HashSet;

fn name_of(a: Option<&ArgValue>) -> Option<&str> {
    match a {
        Some(ArgValue::Name(n)) => Some(n),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct DeduceResult {
    pub results: Vec<FactMetadata>,
    pub chain: Vec<u64>,
}

/// `deduce src filter ?result depth limit` — forward BFS from `src` over
/// facts whose operator is `filter`, stopping at `depth` hops or `limit`
/// results.
pub fn deduce(kb: &ComponentKB, src: &str, filter_operator: &str, depth: usize, limit: usize) -> DeduceResult {
    let mut results = Vec::new();
    let mut chain = Vec::new();
    let mut seen = HashSet::new();
    seen.insert(src.to_string());
    let mut frontier = vec![src.to_string()];
    for _ in 0..depth {
        if results.len() >= limit || frontier.is_empty() {
            break;
        }
        let mut next_frontier = Vec::new();
        'frontier: for subj in &frontier {
            for id in kb.find_by_operator_and_arg0(filter_operator, subj) {
                let Some(fact) = kb.fact(id) else { continue };
                let Some(value) = name_of(fact.metadata.arg1()) else { continue };
                if seen.insert(value.to_string()) {
                    chain.push(id);
                    results.push(fact.metadata.clone());
                    next_frontier.push(value.to_string());
                    if results.len() >= limit {
                        break 'frontier;
                    }
                }
            }
        }
        frontier = next_frontier;
    }
    DeduceResult { results, chain }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhatIfOutcome {
    Unchanged,
    Uncertain,
    WouldFail,
}

/// `whatif cause target ?outcome` — rebuilds the KB without facts whose
/// operator is `cause_operator` (optionally restricted to `cause_subject`),
/// reproves `target` against the reduced KB, and classifies the delta.
pub fn whatif(
    kb: &ComponentKB,
    theory: &TheoryConstraints,
    cause_operator: &str,
    cause_subject: Option<&str>,
    target: &FactMetadata,
    config: ProofConfig,
) -> (WhatIfOutcome, ProofResult, ProofResult) {
    let baseline_forward = ForwardChainer::new();
    let baseline_prover = Prover::new(kb, &baseline_forward, theory, config.clone());
    let baseline = baseline_prover.prove(target);

    let mut reduced = ComponentKB::new(*kb.strategy(), kb.geometry());
    reduced.synonyms = kb.synonyms.clone();
    for fact in kb.facts() {
        let is_cause = fact.metadata.operator == cause_operator
            && cause_subject.is_none_or(|s| name_of(fact.metadata.arg0()) == Some(s));
        if is_cause {
            continue;
        }
        let _ = reduced.add_fact(fact.vector.clone(), fact.name.clone(), fact.metadata.clone());
    }

    let mut reduced_forward = ForwardChainer::new();
    for fact in reduced.facts() {
        if let (Some(a0), Some(a1)) = (name_of(fact.metadata.arg0()), name_of(fact.metadata.arg1())) {
            reduced_forward.assert_triple(&fact.metadata.operator, a0, a1);
        }
    }
    let reduced_prover = Prover::new(&reduced, &reduced_forward, theory, config);
    let counterfactual = reduced_prover.prove(target);

    let outcome = match (baseline.valid, counterfactual.valid) {
        (true, false) => WhatIfOutcome::WouldFail,
        (true, true) => WhatIfOutcome::Unchanged,
        (false, false) => WhatIfOutcome::Uncertain,
        (false, true) => WhatIfOutcome::Uncertain,
    };
    (outcome, baseline, counterfactual)
}

#[derive(Debug, Clone)]
pub struct ExplainResult {
    pub why: String,
    pub via_method: String,
}

/// `explain (goal) ?why` — prove-first, abduce-fallback; the abduce
/// fallback is supplied by the caller (`nesy-session`'s `Executor`, which
/// owns the abduction routine) as `abduce_fallback`.
pub fn explain(
    kb: &ComponentKB,
    forward: &ForwardChainer,
    theory: &TheoryConstraints,
    goal: &FactMetadata,
    config: ProofConfig,
    abduce_fallback: impl FnOnce() -> Option<String>,
) -> ExplainResult {
    let prover = Prover::new(kb, forward, theory, config);
    let result = prover.prove(goal);
    if result.valid {
        return ExplainResult {
            why: format!("{} holds via {}", goal.render(), result.method),
            via_method: result.method,
        };
    }
    match abduce_fallback() {
        Some(explanation) => ExplainResult { why: explanation, via_method: "abduce".into() },
        None => ExplainResult { why: format!("{} could not be proved or explained", goal.render()), via_method: "none".into() },
    }
}

/// `findAll pattern` — exhaustive enumeration of every KB fact whose
/// operator and non-hole args match `pattern`, returning one binding map
/// per match (hole name -> bound value).
pub fn find_all(kb: &ComponentKB, pattern: &FactMetadata) -> Vec<std::collections::HashMap<String, String>> {
    let mut out = Vec::new();
    for id in kb.find_by_operator(&pattern.operator) {
        let Some(fact) = kb.fact(id) else { continue };
        if fact.metadata.args.len() != pattern.args.len() {
            continue;
        }
        let mut bindings = std::collections::HashMap::new();
        let mut ok = true;
        for (p, f) in pattern.args.iter().zip(&fact.metadata.args) {
            match (p, f) {
                (ArgValue::Hole(h), ArgValue::Name(n)) => {
                    bindings.insert(h.clone(), n.clone());
                }
                (ArgValue::Hole(h), ArgValue::Literal(s)) => {
                    bindings.insert(h.clone(), s.clone());
                }
                (ArgValue::Name(pn), ArgValue::Name(fn_)) => {
                    if kb.synonyms.canonicalize(pn) != kb.synonyms.canonicalize(fn_) {
                        ok = false;
                        break;
                    }
                }
                (pv, fv) if pv == fv => {}
                _ => {
                    ok = false;
                    break;
                }
            }
        }
        if ok {
            out.push(bindings);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use nesy_vector::{HdcAlgebra, Strategy, StrategyId};

    fn kb_with_chain() -> ComponentKB {
        let mut kb = ComponentKB::new(Strategy::from_id(StrategyId::Exact), 64);
        let v = |n: u64| kb.strategy().create_random(64, n).unwrap();
        kb.add_fact(v(1), None, FactMetadata::simple("isA", vec![ArgValue::Name("Socrates".into()), ArgValue::Name("Philosopher".into())])).unwrap();
        kb.add_fact(v(2), None, FactMetadata::simple("isA", vec![ArgValue::Name("Philosopher".into()), ArgValue::Name("Human".into())])).unwrap();
        kb
    }

    #[test]
    fn deduce_walks_the_chain() {
        let kb = kb_with_chain();
        let result = deduce(&kb, "Socrates", "isA", 5, 10);
        assert_eq!(result.results.len(), 2);
        assert_eq!(result.chain.len(), 2);
    }

    #[test]
    fn deduce_respects_limit() {
        let kb = kb_with_chain();
        let result = deduce(&kb, "Socrates", "isA", 5, 1);
        assert_eq!(result.results.len(), 1);
    }

    #[test]
    fn whatif_removing_a_link_makes_goal_fail() {
        let kb = kb_with_chain();
        let theory = TheoryConstraints::default();
        let target = FactMetadata::simple("isA", vec![ArgValue::Name("Socrates".into()), ArgValue::Name("Human".into())]);
        let (outcome, baseline, counterfactual) =
            whatif(&kb, &theory, "isA", Some("Philosopher"), &target, ProofConfig::default());
        assert!(baseline.valid);
        assert!(!counterfactual.valid);
        assert_eq!(outcome, WhatIfOutcome::WouldFail);
    }

    #[test]
    fn whatif_unrelated_cause_leaves_goal_unchanged() {
        let kb = kb_with_chain();
        let theory = TheoryConstraints::default();
        let target = FactMetadata::simple("isA", vec![ArgValue::Name("Socrates".into()), ArgValue::Name("Human".into())]);
        let (outcome, ..) = whatif(&kb, &theory, "nonexistentOp", None, &target, ProofConfig::default());
        assert_eq!(outcome, WhatIfOutcome::Unchanged);
    }

    #[test]
    fn find_all_binds_holes_to_every_match() {
        let kb = kb_with_chain();
        let pattern = FactMetadata::simple("isA", vec![ArgValue::Hole("x".into()), ArgValue::Name("Human".into())]);
        let results = find_all(&kb, &pattern);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].get("x"), Some(&"Philosopher".to_string()));
    }

    #[test]
    fn explain_reports_proof_method_on_success() {
        let kb = kb_with_chain();
        let theory = TheoryConstraints::default();
        let forward = ForwardChainer::new();
        let goal = FactMetadata::simple("isA", vec![ArgValue::Name("Socrates".into()), ArgValue::Name("Human".into())]);
        let result = explain(&kb, &forward, &theory, &goal, ProofConfig::default(), || None);
        assert_eq!(result.via_method, "transitive_chain");
    }

    #[test]
    fn explain_falls_back_to_abduction() {
        let kb = ComponentKB::new(Strategy::from_id(StrategyId::Exact), 64);
        let theory = TheoryConstraints::default();
        let forward = ForwardChainer::new();
        let goal = FactMetadata::simple("isA", vec![ArgValue::Name("X".into()), ArgValue::Name("Y".into())]);
        let result = explain(&kb, &forward, &theory, &goal, ProofConfig::default(), || Some("abduced explanation".into()));
        assert_eq!(result.via_method, "abduce");
        assert_eq!(result.why, "abduced explanation");
    }
}
