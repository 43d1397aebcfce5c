//! Session: the public entry point — `learn`, `query`, `prove`, `abduce`,
//! `induce`, `findAll`, `loadCore`, `close` — wired over the executor
//! (statement dispatch), transaction/rollback, and every lower crate
//! (`nesy-vector`, `nesy-vocab`, `nesy-parser`, `nesy-kb`, `nesy-proof`,
//! `nesy-query`).

pub mod config;
pub mod error;
mod executor;
pub mod results;
mod scope;
mod session;

pub use config::SessionConfig;
pub use error::SessionError;
pub use results::{
    AbduceResult, FindAllResult, InduceResult, LearnResult, LoadCoreResult, ProveResult, QueryAllResult, QueryBinding, QueryResult, SolveResult,
};
pub use scope::ScopeValue;
pub use session::Session;

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(SessionConfig { geometry: 256, strategy: "exact".into(), ..Default::default() }).unwrap()
    }

    #[test]
    fn learn_adds_a_fact() {
        let mut s = session();
        let result = s.learn("isA Socrates Human\n");
        assert!(result.success);
        assert_eq!(result.facts, 1);
    }

    #[test]
    fn learn_rolls_back_on_parse_error() {
        let mut s = session();
        s.learn("isA Socrates Human\n");
        let before = s.induce().patterns.len();
        let bad = s.learn("isA a b\n%\n");
        assert!(!bad.success);
        assert_eq!(s.induce().patterns.len(), before);
    }

    #[test]
    fn transitive_isa_proves_end_to_end() {
        let mut s = session();
        s.learn("isA Socrates Philosopher\nisA Philosopher Human\n");
        let result = s.prove("isA Socrates Human");
        assert!(result.valid);
        assert_eq!(result.method, "transitive_chain");
    }

    #[test]
    fn property_inheritance_with_explicit_negation_exception() {
        let mut s = session();
        s.learn("isA Bird Animal\nisA Penguin Bird\nisA Opus Penguin\ncan Bird Fly\nNot can Penguin Fly\n");
        let result = s.prove("can Opus Fly");
        assert!(!result.valid, "Penguin's closer exception should block inheritance from Bird");
    }

    #[test]
    fn contradiction_is_rejected_and_rolled_back() {
        let mut s = session();
        s.learn("DISJOINT_WITH Hot Cold\nisA Tea Hot\n");
        let before = s.induce().patterns.clone();
        let result = s.learn("isA Tea Cold\n");
        assert!(!result.success);
        assert_eq!(s.induce().patterns, before);
    }

    #[test]
    fn modus_tollens_end_to_end() {
        let mut s = session();
        s.learn("@a isA ?x Lorpus\n@b isA ?x Impus\nImplies $a $b\nNot isA Max Impus\n");
        let result = s.prove("Not isA Max Lorpus");
        assert!(result.valid);
        assert_eq!(result.method, "modus_tollens");
    }

    #[test]
    fn query_fills_a_hole() {
        let mut s = session();
        s.learn("isA Socrates Human\n");
        let result = s.query("isA Socrates ?who");
        assert!(result.success);
        assert_eq!(result.bindings.get("who").map(|b| b.answer.as_str()), Some("Human"));
    }

    #[test]
    fn wedding_seating_csp_solve_yields_two_solutions() {
        let mut s = session();
        let result = s.learn(
            "isA Alice Guest\nisA Bob Guest\nisA T1 Table\nisA T2 Table\nconflictsWith Alice Bob\nconflictsWith Bob Alice\n@plan solve csp [var Guest, domain Table, noConflict conflictsWith]\n",
        );
        assert!(result.success);
        match result.solve_result {
            Some(SolveResult::Csp { solutions, .. }) => assert_eq!(solutions.len(), 2),
            other => panic!("expected csp solve result, got {other:?}"),
        }
    }

    #[test]
    fn close_clears_the_kb_and_scope() {
        let mut s = session();
        s.learn("isA Socrates Human\n");
        s.close();
        assert!(!s.prove("isA Socrates Human").valid);
    }
}
