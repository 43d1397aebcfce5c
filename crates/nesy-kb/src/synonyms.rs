//! Bidirectional synonym/alias graph with transitive-closure canonicalization.
//!
//! Name identity follows the `lasso::Rodeo` interning idiom, with an
//! index-map-per-relation shape for the alias edges; traversal uses an
//! explicit visited set (never reference equality) to stay safe over
//! cyclic synonym declarations.

use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Default)]
pub struct SynonymGraph {
    edges: HashMap<String, BTreeSet<String>>,
    /// Any member of a component mapping to that component's pinned
    /// representative, set by an explicit `alias`/`canonical` declaration.
    overrides: HashMap<String, String>,
}

impl SynonymGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_node(&mut self, name: &str) {
        self.edges.entry(name.to_string()).or_default();
    }

    /// `synonym A B` — adds both edges, no representative change.
    pub fn add_synonym(&mut self, a: &str, b: &str) {
        self.ensure_node(a);
        self.ensure_node(b);
        self.edges.get_mut(a).unwrap().insert(b.to_string());
        self.edges.get_mut(b).unwrap().insert(a.to_string());
    }

    /// `alias A B` / `canonical A B` — synonym edge plus pinning `b` as the
    /// component's canonical representative.
    pub fn add_alias(&mut self, a: &str, b: &str) {
        self.add_synonym(a, b);
        self.overrides.insert(b.to_string(), b.to_string());
    }

    /// Component membership via an explicit-visited-set flood fill —
    /// cycle-safe regardless of how the graph was built.
    pub fn component_of(&self, name: &str) -> BTreeSet<String> {
        let mut visited = BTreeSet::new();
        if !self.edges.contains_key(name) {
            visited.insert(name.to_string());
            return visited;
        }
        let mut stack = vec![name.to_string()];
        visited.insert(name.to_string());
        while let Some(n) = stack.pop() {
            if let Some(neighbors) = self.edges.get(&n) {
                for nb in neighbors {
                    if visited.insert(nb.clone()) {
                        stack.push(nb.clone());
                    }
                }
            }
        }
        visited
    }

    /// The canonical representative of `name`: an explicit override if any
    /// component member has one, else the lexicographically smallest
    /// member. Idempotent: `canonicalize(canonicalize(x)) == canonicalize(x)`
    /// because the representative is itself always a component member.
    pub fn canonicalize(&self, name: &str) -> String {
        let component = self.component_of(name);
        for member in &component {
            if let Some(rep) = self.overrides.get(member) {
                return rep.clone();
            }
        }
        component.into_iter().next().unwrap_or_else(|| name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isolated_name_is_its_own_representative() {
        let g = SynonymGraph::new();
        assert_eq!(g.canonicalize("Socrates"), "Socrates");
    }

    #[test]
    fn default_representative_is_lex_smallest() {
        let mut g = SynonymGraph::new();
        g.add_synonym("car", "automobile");
        assert_eq!(g.canonicalize("automobile"), "automobile");
        assert_eq!(g.canonicalize("car"), "automobile");
    }

    #[test]
    fn alias_overrides_lex_smallest() {
        let mut g = SynonymGraph::new();
        g.add_alias("car", "automobile");
        assert_eq!(g.canonicalize("car"), "automobile");
        assert_eq!(g.canonicalize("automobile"), "automobile");
    }

    #[test]
    fn canonicalization_is_idempotent() {
        let mut g = SynonymGraph::new();
        g.add_synonym("a", "b");
        g.add_synonym("b", "c");
        let once = g.canonicalize("c");
        let twice = g.canonicalize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn transitive_closure_merges_components() {
        let mut g = SynonymGraph::new();
        g.add_synonym("x", "y");
        g.add_synonym("y", "z");
        assert_eq!(g.canonicalize("z"), g.canonicalize("x"));
    }
}
