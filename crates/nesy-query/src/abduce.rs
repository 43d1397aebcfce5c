//! Abduction. For a goal that is not
//! directly provable, finds every rule whose conclusion unifies with it
//! and returns the rule's (substituted) condition as a candidate
//! explanation — "what would make this true".

use nesy_kb::{ComponentKB, FactMetadata};
use nesy_proof::unify::{apply_subst, try_unify, Substitution};

#[derive(Debug, Clone)]
pub struct Explanation {
    pub condition: FactMetadata,
    pub rule_id: u64,
}

fn conclusion_atoms(meta: &FactMetadata) -> Vec<FactMetadata> {
    if meta.operator == "And" {
        meta.body.clone().unwrap_or_default()
    } else {
        vec![meta.clone()]
    }
}

pub fn abduce(kb: &ComponentKB, goal: &FactMetadata) -> Vec<Explanation> {
    let mut out = Vec::new();
    for rule in kb.rules() {
        for atom in conclusion_atoms(&rule.conclusion) {
            if let Some(subst) = try_unify(&atom, goal, &Substitution::new()) {
                out.push(Explanation { condition: apply_subst(&rule.condition, &subst), rule_id: rule.id });
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use nesy_kb::ArgValue;
    use nesy_vector::{HdcAlgebra, Strategy, StrategyId};

    #[test]
    fn abduces_condition_from_matching_rule() {
        let mut kb = ComponentKB::new(Strategy::from_id(StrategyId::Exact), 64);
        let v = kb.strategy().create_random(64, 1).unwrap();
        let condition = FactMetadata::simple("isA", vec![ArgValue::Hole("x".into()), ArgValue::Name("Bird".into())]);
        let conclusion = FactMetadata::simple("can", vec![ArgValue::Hole("x".into()), ArgValue::Name("Fly".into())]);
        kb.add_rule(v, condition, conclusion);

        let goal = FactMetadata::simple("can", vec![ArgValue::Name("Tweety".into()), ArgValue::Name("Fly".into())]);
        let explanations = abduce(&kb, &goal);
        assert_eq!(explanations.len(), 1);
        assert_eq!(explanations[0].condition.render(), "isA Tweety Bird");
    }

    #[test]
    fn no_matching_rule_yields_no_explanations() {
        let kb = ComponentKB::new(Strategy::from_id(StrategyId::Exact), 64);
        let goal = FactMetadata::simple("can", vec![ArgValue::Name("Rock".into()), ArgValue::Name("Fly".into())]);
        assert!(abduce(&kb, &goal).is_empty());
    }
}
