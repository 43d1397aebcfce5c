//! End-to-end scenarios over the public `Session` API: six literal
//! concrete scenarios plus two round-trip properties.

use nesy_session::{results::SolveResult, Session, SessionConfig};

fn session() -> Session {
    Session::new(SessionConfig { geometry: 256, strategy: "exact".into(), ..Default::default() }).unwrap()
}

/// Scenario 1: transitive isA.
#[test]
fn transitive_isa() {
    let mut s = session();
    let learned = s.learn("isA Socrates Philosopher\nisA Philosopher Human\n");
    assert!(learned.success);
    let result = s.prove("isA Socrates Human");
    assert!(result.valid);
    assert!(matches!(result.method.as_str(), "transitive_chain" | "transitive_direct"));
}

/// Scenario 2: property inheritance.
#[test]
fn property_inheritance() {
    let mut s = session();
    s.learn("isA Bird Animal\nisA Tweety Bird\ncan Bird Fly\n");
    let result = s.prove("can Tweety Fly");
    assert!(result.valid);
}

/// Scenario 3: a closer explicit negation overrides inherited property.
#[test]
fn negation_exception() {
    let mut s = session();
    s.learn("isA Bird Animal\nisA Penguin Bird\nisA Opus Penguin\ncan Bird Fly\nNot can Penguin Fly\n");
    let result = s.prove("can Opus Fly");
    assert!(!result.valid);
}

/// Scenario 4: modus tollens through an `Implies` rule with a hole variable.
#[test]
fn modus_tollens() {
    let mut s = session();
    s.learn("@a isA ?x Lorpus\n@b isA ?x Impus\nImplies $a $b\nNot isA Max Impus\n");
    let result = s.prove("Not isA Max Lorpus");
    assert!(result.valid);
    assert_eq!(result.method, "modus_tollens");
}

/// Scenario 5: CSP wedding seating — exactly two solutions, Alice and Bob
/// never share a table, and a hole-query resolves Alice's table.
#[test]
fn csp_wedding_seating() {
    let mut s = session();
    let learned = s.learn(
        "isA Alice Guest\nisA Bob Guest\nisA T1 Table\nisA T2 Table\nconflictsWith Alice Bob\nconflictsWith Bob Alice\n\
         @seating solve WeddingSeating [guests from Guest, tables from Table, noConflict conflictsWith]\n",
    );
    assert!(learned.success);
    let solutions = match learned.solve_result {
        Some(SolveResult::Csp { solutions, .. }) => solutions,
        other => panic!("expected a csp solve result, got {other:?}"),
    };
    assert_eq!(solutions.len(), 2);
    for solution in &solutions {
        let alice = solution.assignments.iter().find(|(v, _)| v == "Alice").map(|(_, d)| d.clone());
        let bob = solution.assignments.iter().find(|(v, _)| v == "Bob").map(|(_, d)| d.clone());
        assert_ne!(alice, bob);
    }

    let found = s.query("seating Alice ?table");
    assert!(found.success);
    let answer = found.bindings.get("table").map(|b| b.answer.as_str());
    assert!(matches!(answer, Some("T1") | Some("T2")));
}

/// Scenario 6: a contradiction is rejected and the session rolls back to
/// exactly the prior fact set.
#[test]
fn contradiction_rollback() {
    let mut s = session();
    let before = s.learn("before Door Kitchen\n");
    assert!(before.success);

    let rejected = s.learn("locatedIn Door Kitchen\nafter Door Kitchen\n");
    assert!(!rejected.success);
    assert!(rejected.proof_nl.as_deref().is_some_and(|msg| msg.contains("before") && msg.contains("after")));

    let induced = s.induce();
    assert!(induced.patterns.iter().all(|p| !p.starts_with("locatedIn ") && !p.starts_with("after ")));
}

/// Round-trip: canonical metadata rendered and re-learned through the DSL
/// produces the same canonical shape (idempotent canonicalization).
#[test]
fn canonicalization_is_idempotent() {
    let mut s = session();
    s.learn("synonym Cop Policeman\n");
    s.learn("isA Alice Cop\n");
    let first = s.find_all("isA Alice ?role");
    let second = s.find_all("isA Alice ?role");
    assert_eq!(first.results, second.results);
}

/// Round-trip: a serialized-then-restored vocabulary atom compares equal
/// to the original vector.
#[test]
fn vector_persists_round_trip() {
    use nesy_vector::{HdcAlgebra, Strategy, StrategyId};
    let strategy = Strategy::from_id(StrategyId::DenseBinary);
    let mut ctx = nesy_vector::ExactAllocator::new();
    let original = strategy.create_from_name("Socrates", 256, None, &mut ctx).unwrap();
    let persisted = original.to_persisted();
    let restored = nesy_vector::Vector::from_persisted(&persisted).unwrap();
    assert!(strategy.equals(&original, &restored).unwrap());
}
