//! CSP backtracking solver. Variables and domain drawn
//! from `isA` facts, constraints from `noConflict`/`allDifferent`
//! declarations; backtracking-with-pruning enumerates every solution,
//! run over `ComponentKB`-derived variable/domain/constraint sets.

use nesy_kb::{ArgValue, ComponentKB, FactMetadata};
use nesy_vector::{build_statement_vector, AllocatorCtx, HdcAlgebra, PositionTagger, Strategy, Vector, VectorResult};

#[derive(Debug, Clone)]
pub struct CspConfig {
    pub var_type: String,
    pub domain_type: String,
    pub no_conflict_op: Option<String>,
    pub all_different: bool,
}

#[derive(Debug, Clone)]
pub struct CspSolution {
    pub assignments: Vec<(String, String)>,
}

fn type_members(kb: &ComponentKB, type_name: &str) -> Vec<String> {
    let mut out: Vec<String> = kb
        .find_by_arg1(type_name)
        .into_iter()
        .filter_map(|id| kb.fact(id))
        .filter(|f| f.metadata.operator == "isA")
        .filter_map(|f| match f.metadata.arg0() {
            Some(ArgValue::Name(n)) => Some(n.clone()),
            _ => None,
        })
        .collect();
    out.sort();
    out.dedup();
    out
}

fn conflict_pairs(kb: &ComponentKB, op: &str) -> Vec<(String, String)> {
    kb.find_by_operator(op)
        .into_iter()
        .filter_map(|id| kb.fact(id))
        .filter_map(|f| match (f.metadata.arg0(), f.metadata.arg1()) {
            (Some(ArgValue::Name(a)), Some(ArgValue::Name(b))) => Some((a.clone(), b.clone())),
            _ => None,
        })
        .collect()
}

fn conflicts(var: &str, dom: &str, assigned: &[(String, String)], conflicts: &[(String, String)], all_different: bool) -> bool {
    assigned.iter().any(|(v2, d2)| {
        if d2 != dom {
            return false;
        }
        all_different || conflicts.iter().any(|(a, b)| (a == var && b == v2) || (a == v2 && b == var))
    })
}

fn backtrack(
    vars: &[String],
    domain: &[String],
    conflict_set: &[(String, String)],
    all_different: bool,
    assignment: &mut Vec<(String, String)>,
    solutions: &mut Vec<CspSolution>,
) {
    if assignment.len() == vars.len() {
        solutions.push(CspSolution { assignments: assignment.clone() });
        return;
    }
    let var = &vars[assignment.len()];
    for val in domain {
        if conflicts(var, val, assignment, conflict_set, all_different) {
            continue;
        }
        assignment.push((var.clone(), val.clone()));
        backtrack(vars, domain, conflict_set, all_different, assignment, solutions);
        assignment.pop();
    }
}

/// Enumerates every solution to the CSP described by `config` against
/// the current KB. A wedding-seating problem with two guests, two
/// tables, and one `conflictsWith` pair (both directions asserted)
/// yields exactly the two solutions scenario 5 expects.
pub fn solve(kb: &ComponentKB, config: &CspConfig) -> Vec<CspSolution> {
    let vars = type_members(kb, &config.var_type);
    let domain = type_members(kb, &config.domain_type);
    let conflict_set = config.no_conflict_op.as_deref().map(|op| conflict_pairs(kb, op)).unwrap_or_default();
    let mut solutions = Vec::new();
    backtrack(&vars, &domain, &conflict_set, config.all_different, &mut Vec::new(), &mut solutions);
    solutions
}

/// `bundle(statementVector(relName, var, dom) for each assignment)` —
/// the compound solution vector stores under
/// `operator='cspSolution'`. Each assignment is encoded the same way an
/// ordinary `relName var dom` fact would be, so a holographic
/// `query "relName var ?dom"` can unbind it just like any other fact.
pub fn solution_vector(
    strategy: &Strategy,
    tagger: &mut PositionTagger,
    rel_vec: &Vector,
    var_dom_vecs: &[(Vector, Vector)],
    ctx: &mut dyn AllocatorCtx,
) -> VectorResult<Vector> {
    let mut parts = Vec::with_capacity(var_dom_vecs.len());
    for (var_v, dom_v) in var_dom_vecs {
        parts.push(build_statement_vector(strategy, tagger, rel_vec, &[var_v.clone(), dom_v.clone()], ctx)?);
    }
    let refs: Vec<&Vector> = parts.iter().collect();
    strategy.bundle(&refs)
}

/// Structured metadata for the `cspSolution` fact: `solutionRelation` in
/// `inner_operator`, each `(var, domain)` pair rendered as a
/// `relName var dom` compound in `parts` (doubles as the natural-language
/// fact string asks for — `ArgValue::render` already does it).
pub fn solution_metadata(solution_relation: &str, solution: &CspSolution) -> FactMetadata {
    FactMetadata {
        operator: "cspSolution".into(),
        inner_operator: Some(solution_relation.to_string()),
        parts: Some(
            solution
                .assignments
                .iter()
                .map(|(v, d)| ArgValue::Compound(solution_relation.to_string(), vec![ArgValue::Name(v.clone()), ArgValue::Name(d.clone())]))
                .collect(),
        ),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nesy_kb::ArgValue;
    use nesy_vector::{HdcAlgebra, Strategy, StrategyId};

    fn wedding_kb() -> ComponentKB {
        let mut kb = ComponentKB::new(Strategy::from_id(StrategyId::Exact), 64);
        let v = |n: u64| kb.strategy().create_random(64, n).unwrap();
        let isa = |s: &str, t: &str| FactMetadata::simple("isA", vec![ArgValue::Name(s.into()), ArgValue::Name(t.into())]);
        kb.add_fact(v(1), None, isa("Alice", "Guest")).unwrap();
        kb.add_fact(v(2), None, isa("Bob", "Guest")).unwrap();
        kb.add_fact(v(3), None, isa("T1", "Table")).unwrap();
        kb.add_fact(v(4), None, isa("T2", "Table")).unwrap();
        kb.add_fact(v(5), None, FactMetadata::simple("conflictsWith", vec![ArgValue::Name("Alice".into()), ArgValue::Name("Bob".into())])).unwrap();
        kb.add_fact(v(6), None, FactMetadata::simple("conflictsWith", vec![ArgValue::Name("Bob".into()), ArgValue::Name("Alice".into())])).unwrap();
        kb
    }

    #[test]
    fn wedding_seating_has_exactly_two_solutions_with_different_tables() {
        let kb = wedding_kb();
        let config = CspConfig {
            var_type: "Guest".into(),
            domain_type: "Table".into(),
            no_conflict_op: Some("conflictsWith".into()),
            all_different: false,
        };
        let solutions = solve(&kb, &config);
        assert_eq!(solutions.len(), 2);
        for sol in &solutions {
            let alice_table = sol.assignments.iter().find(|(v, _)| v == "Alice").map(|(_, d)| d.clone());
            let bob_table = sol.assignments.iter().find(|(v, _)| v == "Bob").map(|(_, d)| d.clone());
            assert_ne!(alice_table, bob_table);
        }
    }

    #[test]
    fn solution_metadata_renders_as_natural_language_facts() {
        let solution = CspSolution { assignments: vec![("Alice".into(), "T1".into())] };
        let meta = solution_metadata("seating", &solution);
        assert_eq!(meta.parts.unwrap()[0].render(), "(seating Alice T1)");
    }
}
