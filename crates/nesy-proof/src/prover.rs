//! Unified proof engine. Eleven strategies tried in order,
//! first success wins, hand-rolled over `ComponentKB`/`Rule`, grounded in
//! SLD-resolution unification (`unify.rs`) and a proof object kept as
//! plain data (`proof_object.rs`).

use crate::forward::ForwardChainer;
use crate::proof_object::{ProofObject, ProofResult, Step};
use crate::theory::TheoryConstraints;
use crate::unify::{apply_subst, try_unify, Substitution};
use nesy_kb::{ArgValue, ComponentKB, FactMetadata};
use std::collections::HashSet;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct ProofConfig {
    pub max_depth: usize,
    pub timeout: Duration,
    pub cwa: bool,
}

impl Default for ProofConfig {
    fn default() -> Self {
        Self { max_depth: 5, timeout: Duration::from_millis(2000), cwa: false }
    }
}

fn not_inner(goal: &FactMetadata) -> Option<FactMetadata> {
    if goal.operator != "Not" || goal.args.len() != 1 {
        return None;
    }
    match &goal.args[0] {
        ArgValue::Compound(op, args) => Some(FactMetadata::simple(op.clone(), args.clone())),
        _ => None,
    }
}

fn make_not(inner: &FactMetadata) -> FactMetadata {
    FactMetadata::simple("Not", vec![ArgValue::Compound(inner.operator.clone(), inner.args.clone())])
}

fn conclusion_atoms(meta: &FactMetadata) -> Vec<FactMetadata> {
    if meta.operator == "And" {
        meta.body.clone().unwrap_or_default()
    } else {
        vec![meta.clone()]
    }
}

fn name_of(arg: Option<&ArgValue>) -> Option<&str> {
    match arg {
        Some(ArgValue::Name(n)) => Some(n.as_str()),
        _ => None,
    }
}

pub struct Prover<'a> {
    kb: &'a ComponentKB,
    forward: &'a ForwardChainer,
    theory: &'a TheoryConstraints,
    config: ProofConfig,
    start: Instant,
}

impl<'a> Prover<'a> {
    pub fn new(kb: &'a ComponentKB, forward: &'a ForwardChainer, theory: &'a TheoryConstraints, config: ProofConfig) -> Self {
        Self { kb, forward, theory, config, start: Instant::now() }
    }

    pub fn prove(&self, goal: &FactMetadata) -> ProofResult {
        let mut seen = HashSet::new();
        let (valid, method, steps, uses_facts, reason) = self.prove_inner(goal, &mut seen, 0);
        let proof_object = ProofObject {
            goal: goal.clone(),
            valid,
            method: method.clone(),
            steps: steps.clone(),
            uses_facts,
            validator_ok: None,
        };
        ProofResult { valid, method, confidence: if valid { 1.0 } else { 0.0 }, steps, proof_object, reason }
    }

    fn prove_inner(
        &self,
        goal: &FactMetadata,
        seen: &mut HashSet<String>,
        depth: usize,
    ) -> (bool, String, Vec<Step>, Vec<crate::proof_object::UsesFact>, Option<String>) {
        if self.start.elapsed() > self.config.timeout {
            return (false, "timeout".into(), vec![], vec![], Some("proof timed out".into()));
        }
        if depth > self.config.max_depth {
            return (false, "max_depth".into(), vec![], vec![], Some("max proof depth exceeded".into()));
        }
        let fingerprint = goal.render();
        if seen.contains(&fingerprint) {
            return (false, "cycle".into(), vec![Step::cycle(&fingerprint)], vec![], Some("cycle detected".into()));
        }
        seen.insert(fingerprint.clone());
        let result = self.dispatch(goal, seen, depth);
        seen.remove(&fingerprint);
        result
    }

    fn dispatch(
        &self,
        goal: &FactMetadata,
        seen: &mut HashSet<String>,
        depth: usize,
    ) -> (bool, String, Vec<Step>, Vec<crate::proof_object::UsesFact>, Option<String>) {
        if let Some(found) = self.direct_match(goal) {
            return (true, "direct_match".into(), vec![found.0], vec![found.1], None);
        }

        let canonical = self.canonicalize_goal(goal);
        if canonical != *goal {
            if let Some(found) = self.direct_match(&canonical) {
                return (
                    true,
                    "canonical_rewrite".into(),
                    vec![Step::synonym(format!("canonicalized to {}", canonical.render())), found.0],
                    vec![found.1],
                    None,
                );
            }
        }

        if self.theory.is_symmetric(&goal.operator) && goal.args.len() == 2 {
            let flipped = FactMetadata::simple(goal.operator.clone(), vec![goal.args[1].clone(), goal.args[0].clone()]);
            let (valid, method, mut steps, uses, reason) = self.prove_inner(&flipped, seen, depth + 1);
            if valid {
                steps.insert(0, Step::synonym("symmetric flip"));
                return (true, format!("symmetric_flip({method})"), steps, uses, reason);
            }
        }

        if let Some(inv) = self.theory.inverse_of(&goal.operator) {
            if goal.args.len() == 2 {
                let inverted = FactMetadata::simple(inv.to_string(), vec![goal.args[1].clone(), goal.args[0].clone()]);
                let (valid, method, mut steps, uses, reason) = self.prove_inner(&inverted, seen, depth + 1);
                if valid {
                    steps.insert(0, Step::synonym(format!("inverse of {}", goal.operator)));
                    return (true, format!("inverse({method})"), steps, uses, reason);
                }
            }
        }

        if self.theory.is_transitive(&goal.operator) && goal.args.len() == 2 {
            if let (Some(a0), Some(a1)) = (name_of(goal.arg0()), name_of(goal.arg1())) {
                if let Some(chain) = self.find_chain(&goal.operator, a0, a1) {
                    let uses = chain.iter().map(|&id| crate::proof_object::UsesFact { id }).collect();
                    return (
                        true,
                        "transitive_chain".into(),
                        vec![Step::transitive(format!("{} chain {} -> {}", goal.operator, a0, a1))],
                        uses,
                        None,
                    );
                }
            }
        }

        if goal.args.len() == 2 {
            if let (Some(subject), Some(value)) = (name_of(goal.arg0()), name_of(goal.arg1())) {
                if let Some((chain, fact_id)) = self.property_inheritance(&goal.operator, subject, value) {
                    let mut uses: Vec<_> = chain.iter().map(|&id| crate::proof_object::UsesFact { id }).collect();
                    uses.push(crate::proof_object::UsesFact { id: fact_id });
                    return (
                        true,
                        "property_inheritance".into(),
                        vec![Step::transitive(format!("property {} inherited by {}", goal.operator, subject))],
                        uses,
                        None,
                    );
                }
            }
        }

        for rule in self.kb.rules() {
            for atom in conclusion_atoms(&rule.conclusion) {
                if let Some(subst) = try_unify(&atom, goal, &Substitution::new()) {
                    let condition = apply_subst(&rule.condition, &subst);
                    let (valid, _method, mut steps, uses, _reason) = self.prove_condition(&condition, seen, depth + 1);
                    if valid {
                        steps.insert(0, Step::rule(format!("rule {} matched {}", rule.id, goal.render()), rule.id));
                        return (true, "backward_chaining".into(), steps, uses, None);
                    }
                }
            }
        }

        // Modus tollens: goal `Not P(a)` where some rule's condition `P`
        // unifies with `a` — derive `Q(a)` from the conclusion and recurse
        // on `Not Q(a)`, which may already be a known/derivable fact.
        if let Some(inner) = not_inner(goal) {
            for rule in self.kb.rules() {
                for atom in conclusion_atoms(&rule.condition) {
                    if let Some(subst) = try_unify(&atom, &inner, &Substitution::new()) {
                        let conclusion = apply_subst(&rule.conclusion, &subst);
                        let negated_conclusion = make_not(&conclusion);
                        let (valid, _m, mut steps, uses, _r) = self.prove_inner(&negated_conclusion, seen, depth + 1);
                        if valid {
                            steps.insert(0, Step::rule(format!("modus tollens via rule {}", rule.id), rule.id));
                            return (true, "modus_tollens".into(), steps, uses, None);
                        }
                    }
                }
            }
        }

        if goal.operator == "Exists" && goal.args.len() == 2 {
            if let Some((var, step, uses)) = self.prove_exists(goal) {
                let _ = var;
                return (true, "quantifier_exists".into(), vec![step], uses, None);
            }
        }

        if let Some(inner) = not_inner(goal) {
            if inner.operator == "Exists" {
                if let Some((t1, t2)) = self.disjoint_pair(&inner) {
                    if self.theory.is_disjoint(&t1, &t2) {
                        return (
                            true,
                            "quantifier_not_exists".into(),
                            vec![Step::transitive(format!("{t1} and {t2} declared DISJOINT_WITH"))],
                            vec![],
                            None,
                        );
                    }
                }
            }
        }

        if let Some(inner) = not_inner(goal) {
            if let Some(found) = self.direct_match(goal) {
                return (true, "explicit_negation".into(), vec![found.0], vec![found.1], None);
            }
            if self.config.cwa {
                let (inner_valid, _m, _s, _u, _r) = self.prove_inner(&inner, seen, depth + 1);
                if !inner_valid {
                    return (
                        true,
                        "cwa".into(),
                        vec![Step::validation(format!("{} unprovable under closed-world assumption", inner.render()))],
                        vec![],
                        None,
                    );
                }
            }
        }

        (false, "no_strategy".into(), vec![], vec![], Some("no proof strategy succeeded".into()))
    }

    fn prove_condition(
        &self,
        condition: &FactMetadata,
        seen: &mut HashSet<String>,
        depth: usize,
    ) -> (bool, String, Vec<Step>, Vec<crate::proof_object::UsesFact>, Option<String>) {
        match condition.operator.as_str() {
            "And" => {
                let mut all_steps = Vec::new();
                let mut all_uses = Vec::new();
                for item in condition.body.clone().unwrap_or_default() {
                    let (valid, _m, steps, uses, reason) = self.prove_condition(&item, seen, depth + 1);
                    if !valid {
                        return (false, "and".into(), vec![], vec![], reason);
                    }
                    all_steps.extend(steps);
                    all_uses.extend(uses);
                }
                (true, "and".into(), all_steps, all_uses, None)
            }
            "Or" => {
                for item in condition.body.clone().unwrap_or_default() {
                    let (valid, _m, steps, uses, _r) = self.prove_condition(&item, seen, depth + 1);
                    if valid {
                        return (true, "or".into(), steps, uses, None);
                    }
                }
                (false, "or".into(), vec![], vec![], Some("no disjunct proved".into()))
            }
            "Not" => self.prove_inner(condition, seen, depth + 1),
            _ => self.prove_inner(condition, seen, depth + 1),
        }
    }

    fn args_match(&self, goal_args: &[ArgValue], fact_args: &[ArgValue]) -> bool {
        if goal_args.len() != fact_args.len() {
            return false;
        }
        goal_args.iter().zip(fact_args).all(|(g, f)| match (g, f) {
            (ArgValue::Name(gn), ArgValue::Name(fn_)) => self.kb.synonyms.canonicalize(gn) == self.kb.synonyms.canonicalize(fn_),
            _ => g == f,
        })
    }

    fn direct_match(&self, goal: &FactMetadata) -> Option<(Step, crate::proof_object::UsesFact)> {
        let candidates = self.kb.find_by_operator(&goal.operator);
        for id in candidates {
            let fact = self.kb.fact(id)?;
            if self.args_match(&goal.args, &fact.metadata.args) {
                return Some((Step::fact(format!("matched fact {}", fact.metadata.render()), id), crate::proof_object::UsesFact { id }));
            }
        }
        None
    }

    fn canonicalize_goal(&self, goal: &FactMetadata) -> FactMetadata {
        let args = goal
            .args
            .iter()
            .map(|a| match a {
                ArgValue::Name(n) => ArgValue::Name(self.kb.synonyms.canonicalize(n)),
                other => other.clone(),
            })
            .collect();
        FactMetadata { args, ..goal.clone() }
    }

    fn find_chain(&self, operator: &str, start: &str, target: &str) -> Option<Vec<u64>> {
        use std::collections::{HashMap, VecDeque};
        let mut visited: HashSet<String> = HashSet::new();
        let mut parent: HashMap<String, (String, u64)> = HashMap::new();
        let mut queue = VecDeque::new();
        queue.push_back(start.to_string());
        visited.insert(start.to_string());
        while let Some(node) = queue.pop_front() {
            if node == target && node != start {
                let mut path = Vec::new();
                let mut cur = node;
                while let Some((prev, fact_id)) = parent.get(&cur) {
                    path.push(*fact_id);
                    cur = prev.clone();
                }
                path.reverse();
                return Some(path);
            }
            for id in self.kb.find_by_operator_and_arg0(operator, &node) {
                if let Some(fact) = self.kb.fact(id) {
                    if let Some(next) = name_of(fact.metadata.arg1()) {
                        if visited.insert(next.to_string()) {
                            parent.insert(next.to_string(), (node.clone(), id));
                            queue.push_back(next.to_string());
                        }
                    }
                }
            }
        }
        None
    }

    /// Walks the `isA` chain nearest-ancestor-first; an explicit
    /// `Not op node value` fact at any level blocks inheritance past that
    /// point, so a closer exception (e.g. `Not can Penguin Fly`) wins over
    /// a farther default (`can Bird Fly`).
    fn property_inheritance(&self, operator: &str, subject: &str, value: &str) -> Option<(Vec<u64>, u64)> {
        use std::collections::{HashMap, VecDeque};
        let mut visited = HashSet::new();
        let mut parent: HashMap<String, (String, u64)> = HashMap::new();
        let mut queue = VecDeque::new();
        queue.push_back(subject.to_string());
        visited.insert(subject.to_string());
        while let Some(node) = queue.pop_front() {
            if self.explicit_not(operator, &node, value) {
                continue;
            }
            for id in self.kb.find_by_operator_and_arg0(operator, &node) {
                if let Some(fact) = self.kb.fact(id) {
                    if name_of(fact.metadata.arg1()) == Some(value) {
                        let mut chain = Vec::new();
                        let mut cur = node.clone();
                        while let Some((prev, fact_id)) = parent.get(&cur) {
                            chain.push(*fact_id);
                            cur = prev.clone();
                        }
                        chain.reverse();
                        return Some((chain, id));
                    }
                }
            }
            for id in self.kb.find_by_operator_and_arg0("isA", &node) {
                if let Some(fact) = self.kb.fact(id) {
                    if let Some(next) = name_of(fact.metadata.arg1()) {
                        if visited.insert(next.to_string()) {
                            parent.insert(next.to_string(), (node.clone(), id));
                            queue.push_back(next.to_string());
                        }
                    }
                }
            }
        }
        None
    }

    fn explicit_not(&self, operator: &str, subject: &str, value: &str) -> bool {
        self.kb.find_by_operator("Not").into_iter().any(|id| {
            self.kb.fact(id).is_some_and(|fact| match fact.metadata.args.first() {
                Some(ArgValue::Compound(op, args)) => {
                    op == operator && name_of(args.first()) == Some(subject) && name_of(args.get(1)) == Some(value)
                }
                _ => false,
            })
        })
    }

    fn prove_exists(&self, goal: &FactMetadata) -> Option<(String, Step, Vec<crate::proof_object::UsesFact>)> {
        let var = match &goal.args[0] {
            ArgValue::Hole(h) => h.clone(),
            _ => return None,
        };
        let phi = match &goal.args[1] {
            ArgValue::Compound(op, args) => FactMetadata::simple(op.clone(), args.clone()),
            _ => return None,
        };
        for id in self.kb.find_by_operator(&phi.operator) {
            let fact = self.kb.fact(id)?;
            let mut subst = Substitution::new();
            if try_unify(&phi, &fact.metadata, &Substitution::new()).is_some() {
                subst.insert(var.clone(), name_of(fact.metadata.arg0()).map(|n| ArgValue::Name(n.to_string())).unwrap_or(ArgValue::Name(String::new())));
                return Some((
                    var,
                    Step::unification(format!("witness {} for {}", fact.metadata.render(), goal.render())),
                    vec![crate::proof_object::UsesFact { id }],
                ));
            }
        }
        None
    }

    fn disjoint_pair(&self, exists_goal: &FactMetadata) -> Option<(String, String)> {
        if exists_goal.args.len() != 2 {
            return None;
        }
        let body = match &exists_goal.args[1] {
            ArgValue::Compound(op, args) if op == "And" => args.clone(),
            _ => return None,
        };
        if body.len() != 2 {
            return None;
        }
        let t1 = match &body[0] {
            ArgValue::Compound(_, args) if args.len() == 2 => name_of(args.get(1)).map(str::to_string),
            _ => None,
        }?;
        let t2 = match &body[1] {
            ArgValue::Compound(_, args) if args.len() == 2 => name_of(args.get(1)).map(str::to_string),
            _ => None,
        }?;
        Some((t1, t2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nesy_kb::FactMetadata;
    use nesy_vector::{HdcAlgebra, Strategy, StrategyId};

    fn setup() -> (ComponentKB, ForwardChainer, TheoryConstraints) {
        (ComponentKB::new(Strategy::from_id(StrategyId::Exact), 64), ForwardChainer::new(), TheoryConstraints::default())
    }

    fn v(kb: &ComponentKB, seed: u64) -> nesy_vector::Vector {
        kb.strategy().create_random(kb.geometry(), seed).unwrap()
    }

    #[test]
    fn transitive_isa_proves() {
        let (mut kb, fc, theory) = setup();
        let v1 = v(&kb, 1);
        let v2 = v(&kb, 2);
        kb.add_fact(v1, None, FactMetadata::simple("isA", vec![ArgValue::Name("Socrates".into()), ArgValue::Name("Philosopher".into())])).unwrap();
        kb.add_fact(v2, None, FactMetadata::simple("isA", vec![ArgValue::Name("Philosopher".into()), ArgValue::Name("Human".into())])).unwrap();
        let prover = Prover::new(&kb, &fc, &theory, ProofConfig::default());
        let goal = FactMetadata::simple("isA", vec![ArgValue::Name("Socrates".into()), ArgValue::Name("Human".into())]);
        let result = prover.prove(&goal);
        assert!(result.valid);
        assert_eq!(result.method, "transitive_chain");
    }

    #[test]
    fn property_inheritance_proves() {
        let (mut kb, fc, theory) = setup();
        kb.add_fact(v(&kb, 1), None, FactMetadata::simple("isA", vec![ArgValue::Name("Bird".into()), ArgValue::Name("Animal".into())])).unwrap();
        kb.add_fact(v(&kb, 2), None, FactMetadata::simple("isA", vec![ArgValue::Name("Tweety".into()), ArgValue::Name("Bird".into())])).unwrap();
        kb.add_fact(v(&kb, 3), None, FactMetadata::simple("can", vec![ArgValue::Name("Bird".into()), ArgValue::Name("Fly".into())])).unwrap();
        let prover = Prover::new(&kb, &fc, &theory, ProofConfig::default());
        let goal = FactMetadata::simple("can", vec![ArgValue::Name("Tweety".into()), ArgValue::Name("Fly".into())]);
        let result = prover.prove(&goal);
        assert!(result.valid);
    }

    #[test]
    fn explicit_negation_blocks_property_inheritance() {
        let (mut kb, fc, theory) = setup();
        kb.add_fact(v(&kb, 1), None, FactMetadata::simple("isA", vec![ArgValue::Name("Bird".into()), ArgValue::Name("Animal".into())])).unwrap();
        kb.add_fact(v(&kb, 2), None, FactMetadata::simple("isA", vec![ArgValue::Name("Penguin".into()), ArgValue::Name("Bird".into())])).unwrap();
        kb.add_fact(v(&kb, 3), None, FactMetadata::simple("isA", vec![ArgValue::Name("Opus".into()), ArgValue::Name("Penguin".into())])).unwrap();
        kb.add_fact(v(&kb, 4), None, FactMetadata::simple("can", vec![ArgValue::Name("Bird".into()), ArgValue::Name("Fly".into())])).unwrap();
        kb.add_fact(
            v(&kb, 5),
            None,
            FactMetadata::simple("Not", vec![ArgValue::Compound("can".into(), vec![ArgValue::Name("Penguin".into()), ArgValue::Name("Fly".into())])]),
        )
        .unwrap();
        let prover = Prover::new(&kb, &fc, &theory, ProofConfig::default());
        let goal = FactMetadata::simple("can", vec![ArgValue::Name("Opus".into()), ArgValue::Name("Fly".into())]);
        let result = prover.prove(&goal);
        assert!(!result.valid, "Penguin's closer exception should block inheritance from Bird");
    }

    #[test]
    fn modus_tollens_proves_negated_condition() {
        let (mut kb, fc, theory) = setup();
        let condition = FactMetadata::simple("isA", vec![ArgValue::Hole("x".into()), ArgValue::Name("Lorpus".into())]);
        let conclusion = FactMetadata::simple("isA", vec![ArgValue::Hole("x".into()), ArgValue::Name("Impus".into())]);
        kb.add_rule(v(&kb, 1), condition, conclusion);
        kb.add_fact(
            v(&kb, 2),
            None,
            FactMetadata::simple("Not", vec![ArgValue::Compound("isA".into(), vec![ArgValue::Name("Max".into()), ArgValue::Name("Impus".into())])]),
        )
        .unwrap();
        let prover = Prover::new(&kb, &fc, &theory, ProofConfig::default());
        let goal = FactMetadata::simple("Not", vec![ArgValue::Compound("isA".into(), vec![ArgValue::Name("Max".into()), ArgValue::Name("Lorpus".into())])]);
        let result = prover.prove(&goal);
        assert!(result.valid);
        assert_eq!(result.method, "modus_tollens");
    }

    #[test]
    fn unrelated_goal_fails() {
        let (kb, fc, theory) = setup();
        let prover = Prover::new(&kb, &fc, &theory, ProofConfig::default());
        let goal = FactMetadata::simple("isA", vec![ArgValue::Name("Nothing".into()), ArgValue::Name("Nowhere".into())]);
        let result = prover.prove(&goal);
        assert!(!result.valid);
    }
}
