//! Symbolic fact index — five maps (`operator`, `arg0`, `arg1`,
//! `(operator, arg0)`, synonym graph) plus the incrementally bundled KB
//! vector, following the usual Datalog index-map-per-column idiom.

use crate::fact::{ArgValue, Fact, FactMetadata, Rule};
use crate::synonyms::SynonymGraph;
use nesy_vector::{HdcAlgebra, Strategy, Vector, VectorResult};
use std::collections::{BTreeSet, HashMap};

fn arg_key(arg: &ArgValue) -> Option<String> {
    match arg {
        ArgValue::Name(n) => Some(n.clone()),
        ArgValue::Literal(s) => Some(format!("\"{s}\"")),
        _ => None,
    }
}

#[derive(Debug, Default)]
struct Indices {
    by_operator: HashMap<String, BTreeSet<u64>>,
    by_arg0: HashMap<String, BTreeSet<u64>>,
    by_arg1: HashMap<String, BTreeSet<u64>>,
    by_operator_arg0: HashMap<(String, String), BTreeSet<u64>>,
}

impl Indices {
    fn insert(&mut self, fact: &Fact) {
        self.by_operator.entry(fact.metadata.operator.clone()).or_default().insert(fact.id);
        if let Some(a0) = fact.metadata.arg0().and_then(arg_key) {
            self.by_arg0.entry(a0.clone()).or_default().insert(fact.id);
            self.by_operator_arg0
                .entry((fact.metadata.operator.clone(), a0))
                .or_default()
                .insert(fact.id);
        }
        if let Some(a1) = fact.metadata.arg1().and_then(arg_key) {
            self.by_arg1.entry(a1).or_default().insert(fact.id);
        }
    }

    fn remove(&mut self, fact: &Fact) {
        if let Some(ids) = self.by_operator.get_mut(&fact.metadata.operator) {
            ids.remove(&fact.id);
        }
        if let Some(a0) = fact.metadata.arg0().and_then(arg_key) {
            if let Some(ids) = self.by_arg0.get_mut(&a0) {
                ids.remove(&fact.id);
            }
            if let Some(ids) = self.by_operator_arg0.get_mut(&(fact.metadata.operator.clone(), a0)) {
                ids.remove(&fact.id);
            }
        }
        if let Some(a1) = fact.metadata.arg1().and_then(arg_key) {
            if let Some(ids) = self.by_arg1.get_mut(&a1) {
                ids.remove(&fact.id);
            }
        }
    }
}

pub struct ComponentKB {
    strategy: Strategy,
    geometry: usize,
    facts: HashMap<u64, Fact>,
    insertion_order: Vec<u64>,
    next_id: u64,
    indices: Indices,
    pub synonyms: SynonymGraph,
    kb_vector: Option<Vector>,
    rules: HashMap<u64, Rule>,
    next_rule_id: u64,
}

impl ComponentKB {
    pub fn new(strategy: Strategy, geometry: usize) -> Self {
        Self {
            strategy,
            geometry,
            facts: HashMap::new(),
            insertion_order: Vec::new(),
            next_id: 1,
            indices: Indices::default(),
            synonyms: SynonymGraph::new(),
            kb_vector: None,
            rules: HashMap::new(),
            next_rule_id: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    pub fn kb_vector(&self) -> Option<&Vector> {
        self.kb_vector.as_ref()
    }

    /// Used only by `Session` rollback to restore a pre-image clone.
    pub fn set_kb_vector(&mut self, v: Option<Vector>) {
        self.kb_vector = v;
    }

    pub fn fact(&self, id: u64) -> Option<&Fact> {
        self.facts.get(&id)
    }

    pub fn facts(&self) -> impl Iterator<Item = &Fact> {
        self.insertion_order.iter().filter_map(|id| self.facts.get(id))
    }

    pub fn rule(&self, id: u64) -> Option<&Rule> {
        self.rules.get(&id)
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.values()
    }

    /// `kb := bundle(kb, v)` — the incremental update of.
    pub fn add_fact(&mut self, vector: Vector, name: Option<String>, metadata: FactMetadata) -> VectorResult<u64> {
        let id = self.next_id;
        self.next_id += 1;
        self.kb_vector = Some(match &self.kb_vector {
            None => vector.clone(),
            Some(existing) => self.strategy.bundle(&[existing, &vector])?,
        });
        let fact = Fact { id, vector, name, metadata };
        self.indices.insert(&fact);
        self.facts.insert(id, fact);
        self.insertion_order.push(id);
        Ok(id)
    }

    pub fn add_rule(&mut self, vector: Vector, condition: FactMetadata, conclusion: FactMetadata) -> u64 {
        let id = self.next_rule_id;
        self.next_rule_id += 1;
        self.rules.insert(id, Rule::new(id, vector, condition, conclusion));
        id
    }

    /// Removes a fact added after a snapshot point — part of the
    /// undo-log-based rollback mechanism, not a general-purpose deletion API.
    pub fn remove_fact(&mut self, id: u64) {
        if let Some(fact) = self.facts.remove(&id) {
            self.indices.remove(&fact);
            self.insertion_order.retain(|&x| x != id);
        }
    }

    pub fn remove_rule(&mut self, id: u64) {
        self.rules.remove(&id);
    }

    pub fn next_fact_id(&self) -> u64 {
        self.next_id
    }

    pub fn next_rule_id(&self) -> u64 {
        self.next_rule_id
    }

    fn expand_synonyms(&self, name: &str) -> BTreeSet<String> {
        self.synonyms.component_of(name)
    }

    pub fn find_by_operator(&self, operator: &str) -> BTreeSet<u64> {
        let mut out = BTreeSet::new();
        for name in self.expand_synonyms(operator) {
            if let Some(ids) = self.indices.by_operator.get(&name) {
                out.extend(ids);
            }
        }
        out
    }

    pub fn find_by_arg0(&self, arg0: &str) -> BTreeSet<u64> {
        let mut out = BTreeSet::new();
        for name in self.expand_synonyms(arg0) {
            if let Some(ids) = self.indices.by_arg0.get(&name) {
                out.extend(ids);
            }
        }
        out
    }

    pub fn find_by_arg1(&self, arg1: &str) -> BTreeSet<u64> {
        let mut out = BTreeSet::new();
        for name in self.expand_synonyms(arg1) {
            if let Some(ids) = self.indices.by_arg1.get(&name) {
                out.extend(ids);
            }
        }
        out
    }

    pub fn find_by_operator_and_arg0(&self, operator: &str, arg0: &str) -> BTreeSet<u64> {
        let mut out = BTreeSet::new();
        for op in self.expand_synonyms(operator) {
            for a0 in self.expand_synonyms(arg0) {
                if let Some(ids) = self.indices.by_operator_arg0.get(&(op.clone(), a0)) {
                    out.extend(ids);
                }
            }
        }
        out
    }

    /// `null` parameters act as wildcards; every non-null parameter is
    /// synonym-expanded before comparison.
    pub fn matches_with_synonyms(&self, fact: &Fact, op: Option<&str>, a0: Option<&str>, a1: Option<&str>) -> bool {
        if let Some(op) = op {
            if !self.expand_synonyms(op).contains(&fact.metadata.operator) {
                return false;
            }
        }
        if let Some(a0) = a0 {
            match fact.metadata.arg0().and_then(arg_key) {
                Some(fa0) if self.expand_synonyms(a0).contains(&fa0) => {}
                _ => return false,
            }
        }
        if let Some(a1) = a1 {
            match fact.metadata.arg1().and_then(arg_key) {
                Some(fa1) if self.expand_synonyms(a1).contains(&fa1) => {}
                _ => return false,
            }
        }
        true
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    pub fn geometry(&self) -> usize {
        self.geometry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nesy_vector::StrategyId;

    fn kb() -> ComponentKB {
        ComponentKB::new(Strategy::from_id(StrategyId::Exact), 64)
    }

    fn vec_for(kb: &ComponentKB, n: u64) -> Vector {
        kb.strategy.create_random(kb.geometry, n).unwrap()
    }

    #[test]
    fn indices_find_by_operator_and_args() {
        let mut kb = kb();
        let v = vec_for(&kb, 1);
        let meta = FactMetadata::simple("isA", vec![ArgValue::Name("Socrates".into()), ArgValue::Name("Human".into())]);
        let id = kb.add_fact(v, None, meta).unwrap();
        assert!(kb.find_by_operator("isA").contains(&id));
        assert!(kb.find_by_arg0("Socrates").contains(&id));
        assert!(kb.find_by_arg1("Human").contains(&id));
        assert!(kb.find_by_operator_and_arg0("isA", "Socrates").contains(&id));
    }

    #[test]
    fn synonym_expansion_finds_alias_facts() {
        let mut kb = kb();
        kb.synonyms.add_synonym("car", "automobile");
        let v = vec_for(&kb, 1);
        let meta = FactMetadata::simple("isA", vec![ArgValue::Name("car".into()), ArgValue::Name("Vehicle".into())]);
        let id = kb.add_fact(v, None, meta).unwrap();
        assert!(kb.find_by_arg0("automobile").contains(&id));
    }

    #[test]
    fn remove_fact_clears_all_indices() {
        let mut kb = kb();
        let v = vec_for(&kb, 1);
        let meta = FactMetadata::simple("isA", vec![ArgValue::Name("Socrates".into()), ArgValue::Name("Human".into())]);
        let id = kb.add_fact(v, None, meta).unwrap();
        kb.remove_fact(id);
        assert!(kb.find_by_operator("isA").is_empty());
        assert!(kb.fact(id).is_none());
    }

    #[test]
    fn kb_vector_tracks_bundle_of_all_facts() {
        let mut kb = kb();
        let v1 = vec_for(&kb, 1);
        let v2 = vec_for(&kb, 2);
        kb.add_fact(v1.clone(), None, FactMetadata::simple("a", vec![])).unwrap();
        kb.add_fact(v2.clone(), None, FactMetadata::simple("b", vec![])).unwrap();
        let expected = kb.strategy.bundle(&[&v1, &v2]).unwrap();
        assert_eq!(kb.kb_vector(), Some(&expected));
    }
}
