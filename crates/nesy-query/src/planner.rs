//! STRIPS-style planner. BFS from a start
//! state to a conjunction of goals over `requires`/`causes`/`prevents`
//! action facts, bounded by `maxDepth`, with an optional same-location
//! conflict guard checked in every visited state.

use nesy_kb::FactMetadata;
use std::collections::{HashSet, VecDeque};

#[derive(Debug, Clone)]
pub struct Action {
    pub name: String,
    pub requires: Vec<FactMetadata>,
    pub causes: Vec<FactMetadata>,
    pub prevents: Vec<FactMetadata>,
}

#[derive(Debug, Clone)]
pub struct PlanStep {
    pub action: String,
    pub state_after: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct PlanResult {
    pub steps: Vec<PlanStep>,
    pub length: usize,
}

type State = HashSet<String>;

fn fingerprint(state: &State) -> String {
    let mut rendered: Vec<&String> = state.iter().collect();
    rendered.sort();
    rendered.into_iter().cloned().collect::<Vec<_>>().join("|")
}

/// BFS from `start_state` to a state containing every fact in `goals`.
/// `guard`, when given, must hold for every intermediate state visited —
/// this is the "same-location conflict constraint" a
/// plan can declare via `guard/conflictOp/locationOp`.
pub fn plan(
    start_state: &[FactMetadata],
    goals: &[FactMetadata],
    actions: &[Action],
    max_depth: usize,
    guard: Option<&dyn Fn(&HashSet<String>) -> bool>,
) -> Option<PlanResult> {
    let start: State = start_state.iter().map(FactMetadata::render).collect();
    let goal_strs: State = goals.iter().map(FactMetadata::render).collect();
    if goal_strs.is_subset(&start) {
        return Some(PlanResult { steps: Vec::new(), length: 0 });
    }

    let mut visited = HashSet::new();
    visited.insert(fingerprint(&start));
    let mut queue = VecDeque::new();
    queue.push_back((start, Vec::<PlanStep>::new()));

    while let Some((state, path)) = queue.pop_front() {
        if path.len() >= max_depth {
            continue;
        }
        for action in actions {
            if !action.requires.iter().all(|r| state.contains(&r.render())) {
                continue;
            }
            let mut next_state = state.clone();
            for p in &action.prevents {
                next_state.remove(&p.render());
            }
            for c in &action.causes {
                next_state.insert(c.render());
            }
            if let Some(g) = guard {
                if !g(&next_state) {
                    continue;
                }
            }
            let fp = fingerprint(&next_state);
            if !visited.insert(fp) {
                continue;
            }
            let mut next_path = path.clone();
            let mut rendered: Vec<String> = next_state.iter().cloned().collect();
            rendered.sort();
            next_path.push(PlanStep { action: action.name.clone(), state_after: rendered });
            if goal_strs.is_subset(&next_state) {
                return Some(PlanResult { length: next_path.len(), steps: next_path });
            }
            queue.push_back((next_state, next_path));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use nesy_kb::ArgValue;

    fn at(loc: &str) -> FactMetadata {
        FactMetadata::simple("at", vec![ArgValue::Name("Robot".into()), ArgValue::Name(loc.into())])
    }

    #[test]
    fn finds_a_two_step_plan() {
        let start = vec![at("Kitchen")];
        let goal = vec![at("Garden")];
        let actions = vec![
            Action { name: "goHall".into(), requires: vec![at("Kitchen")], causes: vec![at("Hall")], prevents: vec![at("Kitchen")] },
            Action { name: "goGarden".into(), requires: vec![at("Hall")], causes: vec![at("Garden")], prevents: vec![at("Hall")] },
        ];
        let result = plan(&start, &goal, &actions, 5, None).unwrap();
        assert_eq!(result.length, 2);
        assert_eq!(result.steps[0].action, "goHall");
        assert_eq!(result.steps[1].action, "goGarden");
    }

    #[test]
    fn already_at_goal_yields_empty_plan() {
        let start = vec![at("Garden")];
        let result = plan(&start, &start, &[], 5, None).unwrap();
        assert_eq!(result.length, 0);
    }

    #[test]
    fn unreachable_goal_returns_none() {
        let start = vec![at("Kitchen")];
        let goal = vec![at("Moon")];
        let actions = vec![Action { name: "goHall".into(), requires: vec![at("Kitchen")], causes: vec![at("Hall")], prevents: vec![at("Kitchen")] }];
        assert!(plan(&start, &goal, &actions, 5, None).is_none());
    }

    #[test]
    fn guard_blocks_a_disallowed_intermediate_state() {
        let start = vec![at("Kitchen")];
        let goal = vec![at("Garden")];
        let actions = vec![
            Action { name: "goHall".into(), requires: vec![at("Kitchen")], causes: vec![at("Hall")], prevents: vec![at("Kitchen")] },
            Action { name: "goGarden".into(), requires: vec![at("Hall")], causes: vec![at("Garden")], prevents: vec![at("Hall")] },
        ];
        let guard = |state: &HashSet<String>| !state.contains(&at("Hall").render());
        let result = plan(&start, &goal, &actions, 5, Some(&guard));
        assert!(result.is_none());
    }
}
