//! Contradiction detector. Reads theory-declared
//! constraints and checks a candidate fact against the existing KB,
//! including forward-chained inferences of depth ≥ 2.

use crate::forward::ForwardChainer;
use crate::theory::TheoryConstraints;
use nesy_kb::{ArgValue, ComponentKB, FactMetadata};

#[derive(Debug, Clone, PartialEq)]
pub struct ContradictionReport {
    pub proof_nl: String,
    pub rule_source: String,
}

fn name_of(arg: Option<&ArgValue>) -> Option<&str> {
    match arg {
        Some(ArgValue::Name(n)) => Some(n.as_str()),
        _ => None,
    }
}

pub struct ContradictionDetector<'a> {
    kb: &'a ComponentKB,
    forward: &'a ForwardChainer,
    theory: &'a TheoryConstraints,
}

impl<'a> ContradictionDetector<'a> {
    pub fn new(kb: &'a ComponentKB, forward: &'a ForwardChainer, theory: &'a TheoryConstraints) -> Self {
        Self { kb, forward, theory }
    }

    /// Checks whether adding `candidate` would contradict the current KB
    /// (including facts derivable only after ≥2 forward-chaining hops).
    /// Returns the first contradiction found, citing a rule source the way
    /// requires (`proof_nl mentions the rule source`).
    pub fn check(&self, candidate: &FactMetadata) -> Option<ContradictionReport> {
        self.check_mutually_exclusive(candidate)
            .or_else(|| self.check_contradicts_same_args(candidate))
            .or_else(|| self.check_disjoint(candidate))
            .or_else(|| self.check_functional(candidate))
            .or_else(|| self.check_taxonomic_cycle(candidate))
    }

    fn check_mutually_exclusive(&self, candidate: &FactMetadata) -> Option<ContradictionReport> {
        let subject = name_of(candidate.arg0())?;
        let value = name_of(candidate.arg1())?;
        for id in self.kb.find_by_operator_and_arg0(&candidate.operator, subject) {
            let fact = self.kb.fact(id)?;
            if let Some(existing) = name_of(fact.metadata.arg1()) {
                if existing != value && self.theory.mutually_exclusive_values(&candidate.operator, existing, value) {
                    return Some(ContradictionReport {
                        proof_nl: format!(
                            "config/theory/14-constraints.sys2: mutuallyExclusive {} {} {} contradicts existing {} {} {}",
                            candidate.operator, existing, value, candidate.operator, subject, existing
                        ),
                        rule_source: "config/.../14-constraints.sys2".into(),
                    });
                }
            }
        }
        // depth->=2 consequence: property inheritance may derive the
        // conflicting value transitively even when no direct fact exists yet.
        for (who, derived_value) in self.forward.property_inheritance(&candidate.operator, 8) {
            if who == subject && derived_value != value && self.theory.mutually_exclusive_values(&candidate.operator, &derived_value, value) {
                return Some(ContradictionReport {
                    proof_nl: format!(
                        "config/theory/14-constraints.sys2: mutuallyExclusive {} {} {} conflicts with forward-chained {} {} {}",
                        candidate.operator, derived_value, value, candidate.operator, subject, derived_value
                    ),
                    rule_source: "config/.../14-constraints.sys2".into(),
                });
            }
        }
        None
    }

    fn check_contradicts_same_args(&self, candidate: &FactMetadata) -> Option<ContradictionReport> {
        let a0 = name_of(candidate.arg0())?;
        let a1 = name_of(candidate.arg1())?;
        for id in self.kb.find_by_arg0(a0) {
            let fact = self.kb.fact(id)?;
            if name_of(fact.metadata.arg1()) == Some(a1) && self.theory.contradicts(&candidate.operator, &fact.metadata.operator) {
                return Some(ContradictionReport {
                    proof_nl: format!(
                        "config/theory/14-constraints.sys2: contradictsSameArgs {} {} rejects {} {} {} given existing {} {} {}",
                        fact.metadata.operator, candidate.operator, candidate.operator, a0, a1, fact.metadata.operator, a0, a1
                    ),
                    rule_source: "config/.../14-constraints.sys2".into(),
                });
            }
        }
        None
    }

    fn check_disjoint(&self, candidate: &FactMetadata) -> Option<ContradictionReport> {
        if candidate.operator != "isA" {
            return None;
        }
        let subject = name_of(candidate.arg0())?;
        let new_type = name_of(candidate.arg1())?;
        for id in self.kb.find_by_arg0(subject) {
            let fact = self.kb.fact(id)?;
            if fact.metadata.operator != "isA" {
                continue;
            }
            if let Some(existing_type) = name_of(fact.metadata.arg1()) {
                if self.theory.is_disjoint(existing_type, new_type) {
                    return Some(ContradictionReport {
                        proof_nl: format!(
                            "config/theory/14-constraints.sys2: DISJOINT_WITH {} {} violated by isA {} ({}, {})",
                            existing_type, new_type, subject, existing_type, new_type
                        ),
                        rule_source: "config/.../14-constraints.sys2".into(),
                    });
                }
            }
        }
        None
    }

    fn check_functional(&self, candidate: &FactMetadata) -> Option<ContradictionReport> {
        if !self.theory.functional.contains(&candidate.operator) {
            return None;
        }
        let subject = name_of(candidate.arg0())?;
        let value = name_of(candidate.arg1())?;
        for id in self.kb.find_by_operator_and_arg0(&candidate.operator, subject) {
            let fact = self.kb.fact(id)?;
            if let Some(existing) = name_of(fact.metadata.arg1()) {
                if existing != value {
                    return Some(ContradictionReport {
                        proof_nl: format!(
                            "config/theory/14-constraints.sys2: functional relation {} already assigns {} {} (cannot also assign {})",
                            candidate.operator, subject, existing, value
                        ),
                        rule_source: "config/.../14-constraints.sys2".into(),
                    });
                }
            }
        }
        None
    }

    fn check_taxonomic_cycle(&self, candidate: &FactMetadata) -> Option<ContradictionReport> {
        if candidate.operator != "isA" {
            return None;
        }
        let subject = name_of(candidate.arg0())?;
        let supertype = name_of(candidate.arg1())?;
        if subject == supertype {
            return Some(ContradictionReport {
                proof_nl: format!("config/theory/14-constraints.sys2: isA {subject} {supertype} would create a self-loop in the taxonomy"),
                rule_source: "config/.../14-constraints.sys2".into(),
            });
        }
        if self.forward.transitive_closure("isA", supertype, 32).contains(subject) {
            return Some(ContradictionReport {
                proof_nl: format!(
                    "config/theory/14-constraints.sys2: isA {subject} {supertype} would close a taxonomic cycle through existing isA edges"
                ),
                rule_source: "config/.../14-constraints.sys2".into(),
            });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nesy_vector::{HdcAlgebra, Strategy, StrategyId};

    fn kb() -> ComponentKB {
        ComponentKB::new(Strategy::from_id(StrategyId::Exact), 64)
    }

    #[test]
    fn contradicts_same_args_rejects_before_after() {
        let mut kb = kb();
        let v = kb.strategy().create_random(64, 1).unwrap();
        kb.add_fact(v, None, FactMetadata::simple("before", vec![ArgValue::Name("Door".into()), ArgValue::Name("Kitchen".into())])).unwrap();
        let mut theory = TheoryConstraints::default();
        theory.contradicts_same_args.push(("before".into(), "after".into()));
        let fc = ForwardChainer::new();
        let detector = ContradictionDetector::new(&kb, &fc, &theory);
        let candidate = FactMetadata::simple("after", vec![ArgValue::Name("Door".into()), ArgValue::Name("Kitchen".into())]);
        let report = detector.check(&candidate).unwrap();
        assert!(report.proof_nl.contains("contradictsSameArgs"));
        assert!(report.proof_nl.contains("before"));
        assert!(report.proof_nl.contains("after"));
    }

    #[test]
    fn disjoint_types_conflict() {
        let mut kb = kb();
        let v1 = kb.strategy().create_random(64, 1).unwrap();
        kb.add_fact(v1, None, FactMetadata::simple("isA", vec![ArgValue::Name("Tea".into()), ArgValue::Name("Hot".into())])).unwrap();
        let mut theory = TheoryConstraints::default();
        theory.disjoint.push(("Hot".into(), "Cold".into()));
        let fc = ForwardChainer::new();
        let detector = ContradictionDetector::new(&kb, &fc, &theory);
        let candidate = FactMetadata::simple("isA", vec![ArgValue::Name("Tea".into()), ArgValue::Name("Cold".into())]);
        assert!(detector.check(&candidate).is_some());
    }

    #[test]
    fn non_conflicting_fact_passes() {
        let kb = kb();
        let theory = TheoryConstraints::default();
        let fc = ForwardChainer::new();
        let detector = ContradictionDetector::new(&kb, &fc, &theory);
        let candidate = FactMetadata::simple("isA", vec![ArgValue::Name("Socrates".into()), ArgValue::Name("Human".into())]);
        assert!(detector.check(&candidate).is_none());
    }
}
