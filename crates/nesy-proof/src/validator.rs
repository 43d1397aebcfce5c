//! Independent proof validator — re-checks a `ProofObject` against the
//! current KB without re-running search  =
//! true`").

use crate::proof_object::{ProofObject, StepKind};
use nesy_kb::ComponentKB;

/// Every `fact` step (and every `UsesFact` reference) must still name an
/// existing KB fact; every `rule` step must still name an existing rule.
/// A proof object that claims `valid = false` validates vacuously to
/// `false` — there is nothing to certify.
pub fn validate_proof(proof: &ProofObject, kb: &ComponentKB) -> bool {
    if !proof.valid {
        return false;
    }
    for used in &proof.uses_facts {
        if kb.fact(used.id).is_none() {
            return false;
        }
    }
    for step in &proof.steps {
        if step.kind == StepKind::Rule {
            match step.rule_id {
                Some(id) if kb.rule(id).is_some() => {}
                _ => return false,
            }
        }
        if step.kind == StepKind::Fact {
            match step.fact_id {
                Some(id) if kb.fact(id).is_some() => {}
                _ => return false,
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proof_object::{ProofResult, Step};
    use nesy_kb::{ArgValue, FactMetadata};
    use nesy_vector::{HdcAlgebra, Strategy, StrategyId};

    fn kb_with_one_fact() -> (ComponentKB, u64) {
        let mut kb = ComponentKB::new(Strategy::from_id(StrategyId::Exact), 64);
        let v = kb.strategy().create_random(64, 1).unwrap();
        let id = kb
            .add_fact(v, None, FactMetadata::simple("isA", vec![ArgValue::Name("Socrates".into()), ArgValue::Name("Human".into())]))
            .unwrap();
        (kb, id)
    }

    #[test]
    fn validates_proof_referencing_existing_fact() {
        let (kb, id) = kb_with_one_fact();
        let goal = FactMetadata::simple("isA", vec![ArgValue::Name("Socrates".into()), ArgValue::Name("Human".into())]);
        let proof = ProofObject {
            goal,
            valid: true,
            method: "direct_match".into(),
            steps: vec![Step::fact("matched", id)],
            uses_facts: vec![crate::proof_object::UsesFact { id }],
            validator_ok: None,
        };
        assert!(validate_proof(&proof, &kb));
    }

    #[test]
    fn rejects_proof_referencing_removed_fact() {
        let (mut kb, id) = kb_with_one_fact();
        kb.remove_fact(id);
        let goal = FactMetadata::simple("isA", vec![ArgValue::Name("Socrates".into()), ArgValue::Name("Human".into())]);
        let proof = ProofObject {
            goal,
            valid: true,
            method: "direct_match".into(),
            steps: vec![Step::fact("matched", id)],
            uses_facts: vec![crate::proof_object::UsesFact { id }],
            validator_ok: None,
        };
        assert!(!validate_proof(&proof, &kb));
    }

    #[test]
    fn invalid_proof_validates_to_false() {
        let (kb, _id) = kb_with_one_fact();
        let goal = FactMetadata::simple("isA", vec![ArgValue::Name("X".into()), ArgValue::Name("Y".into())]);
        let proof = ProofObject::failure(goal, "no_strategy");
        assert!(!validate_proof(&proof, &kb));
    }

    #[test]
    fn proof_result_type_is_constructible() {
        let (kb, id) = kb_with_one_fact();
        let goal = FactMetadata::simple("isA", vec![ArgValue::Name("Socrates".into()), ArgValue::Name("Human".into())]);
        let result = ProofResult {
            valid: true,
            method: "direct_match".into(),
            confidence: 1.0,
            steps: vec![Step::fact("matched", id)],
            proof_object: ProofObject {
                goal: goal.clone(),
                valid: true,
                method: "direct_match".into(),
                steps: vec![Step::fact("matched", id)],
                uses_facts: vec![crate::proof_object::UsesFact { id }],
                validator_ok: None,
            },
            reason: None,
        };
        assert!(validate_proof(&result.proof_object, &kb));
    }
}
