//! `Session`: transaction semantics and the public API. Owns every
//! session-local data structure; the constructor reserves
//! `RESERVED_OPERATORS` and all `__POS_p__` position names in the exact
//! allocator before any user atom can occupy a lower index, per
//! `nesy-vector`'s `exact.rs`/`position.rs` doc comments.

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::executor::name_of;
use crate::results::{
    AbduceResult, FindAllResult, InduceResult, LearnResult, LoadCoreResult, ProveResult, QueryAllResult, QueryBinding, QueryResult, SolveResult,
};
use crate::scope::ScopeValue;
use nesy_kb::{Canonicalizer, ComponentKB, FactMetadata};
use nesy_parser::{Program, Statement};
use nesy_proof::{ForwardChainer, ProofObject, Prover, TheoryConstraints};
use nesy_query::{abduce, deduce, explain, find_all, whatif, HoleFiller, QueryStats, WhatIfOutcome};
use nesy_vector::{AllocatorCtx, ExactAllocator, PositionTagger, Strategy, StrategyId, Vector, RESERVED_OPERATORS};
use nesy_vocab::Vocabulary;
use std::collections::{HashMap, HashSet};

pub struct Session {
    pub(crate) config: SessionConfig,
    pub(crate) strategy: Strategy,
    pub(crate) geometry: usize,
    pub(crate) allocator: ExactAllocator,
    pub(crate) vocab: Vocabulary,
    pub(crate) tagger: PositionTagger,
    pub(crate) kb: ComponentKB,
    pub(crate) forward: ForwardChainer,
    pub(crate) theory: TheoryConstraints,
    pub(crate) canonicalizer: Canonicalizer,
    pub(crate) scope: HashMap<String, ScopeValue>,
    pub(crate) macros: HashMap<String, (Vec<String>, Vec<Statement>)>,
    pub(crate) graphs: HashMap<String, (Vec<String>, Vec<Statement>, Option<nesy_parser::Expr>)>,
    pub(crate) loaded_files: HashSet<String>,
    pub(crate) pending_solve: Option<SolveResult>,
    provenance: Vec<String>,
}

/// A per-field cheap snapshot for rollback. `kb` is
/// restored via its own undo-log (`next_fact_id`/`next_rule_id` bounds plus
/// `remove_fact`/`remove_rule`), not by cloning (`ComponentKB` is not
/// `Clone`). `forward` has no undo-log either (`egglog::EGraph` isn't
/// `Clone`), so it's restored the same way: a checkpoint index plus replay
/// of the surviving triples. `canonicalizer` is small enough to clone
/// outright. The vocabulary has no removal API at all: atoms created
/// during a rolled-back `learn` remain allocated afterward. That's an
/// accepted, documented deviation from a byte-exact restore — atom
/// creation is a pure function of name, and an orphaned atom is
/// unreferenced by any surviving fact or scope binding.
struct Snapshot {
    kb_fact_floor: u64,
    kb_rule_floor: u64,
    kb_vector: Option<Vector>,
    scope: HashMap<String, ScopeValue>,
    theory: TheoryConstraints,
    synonyms: nesy_kb::SynonymGraph,
    canonicalizer: Canonicalizer,
    forward_checkpoint: usize,
    macros: HashMap<String, (Vec<String>, Vec<Statement>)>,
    graphs: HashMap<String, (Vec<String>, Vec<nesy_parser::Statement>, Option<nesy_parser::Expr>)>,
    loaded_files: HashSet<String>,
    vocab_len: usize,
}

impl Session {
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        let strategy_id = StrategyId::from_name(&config.strategy).unwrap_or(StrategyId::DenseBinary);
        let strategy = Strategy::from_id(strategy_id);
        let geometry = config.geometry;
        let mut allocator = ExactAllocator::new();
        for name in RESERVED_OPERATORS {
            allocator.reserve(name);
        }
        let mut tagger = PositionTagger::new(strategy_id, geometry);
        for p in nesy_vector::position::MIN_POSITION..=nesy_vector::position::MAX_POSITION {
            tagger.position_vector(p, &strategy, &mut allocator)?;
        }
        let mut vocab = Vocabulary::new(strategy_id, geometry);
        for name in RESERVED_OPERATORS {
            vocab.get_or_create(name, None, &mut allocator)?;
        }
        Ok(Self {
            config,
            strategy,
            geometry,
            allocator,
            vocab,
            tagger,
            kb: ComponentKB::new(strategy, geometry),
            forward: ForwardChainer::new(),
            theory: TheoryConstraints::default(),
            canonicalizer: Canonicalizer::new(),
            scope: HashMap::new(),
            macros: HashMap::new(),
            graphs: HashMap::new(),
            loaded_files: HashSet::new(),
            pending_solve: None,
            provenance: Vec::new(),
        })
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            kb_fact_floor: self.kb.next_fact_id(),
            kb_rule_floor: self.kb.next_rule_id(),
            kb_vector: self.kb.kb_vector().cloned(),
            scope: self.scope.clone(),
            theory: self.theory.clone(),
            synonyms: self.kb.synonyms.clone(),
            canonicalizer: self.canonicalizer.clone(),
            forward_checkpoint: self.forward.checkpoint(),
            macros: self.macros.clone(),
            graphs: self.graphs.clone(),
            loaded_files: self.loaded_files.clone(),
            vocab_len: self.vocab.len(),
        }
    }

    fn rollback(&mut self, snap: Snapshot) {
        for id in snap.kb_fact_floor..self.kb.next_fact_id() {
            self.kb.remove_fact(id);
        }
        for id in snap.kb_rule_floor..self.kb.next_rule_id() {
            self.kb.remove_rule(id);
        }
        self.kb.set_kb_vector(snap.kb_vector);
        self.scope = snap.scope;
        self.theory = snap.theory;
        self.kb.synonyms = snap.synonyms;
        self.canonicalizer = snap.canonicalizer;
        self.forward.restore(snap.forward_checkpoint);
        self.macros = snap.macros;
        self.graphs = snap.graphs;
        self.loaded_files = snap.loaded_files;
        let _ = snap.vocab_len;
    }

    fn canonicalize_program(&self, program: &Program) -> Program {
        program.iter().map(|s| self.canonicalizer.canonicalize_statement(&self.kb.synonyms, s)).collect()
    }

    /// Executes every statement, accumulating warnings and propagating the
    /// first error. Returns `(facts_added, rules_added)`. Shared by
    /// top-level `learn` and `@_ Load`.
    pub(crate) fn execute_program(&mut self, program: &Program, warnings: &mut Vec<String>) -> Result<(usize, usize), SessionError> {
        let mut facts = 0usize;
        let mut rules = 0usize;
        for stmt in program {
            let outcome = self.execute_statement(stmt, warnings)?;
            if outcome.fact_added {
                facts += 1;
            }
            if outcome.rule_added {
                rules += 1;
            }
        }
        Ok((facts, rules))
    }

    pub fn learn(&mut self, dsl: &str) -> LearnResult {
        let snap = self.snapshot();
        self.pending_solve = None;
        let mut warnings = Vec::new();
        let result = (|| -> Result<(usize, usize), SessionError> {
            let program = nesy_parser::parse_program(dsl)?;
            let canonical = self.canonicalize_program(&program);
            self.execute_program(&canonical, &mut warnings)
        })();

        match result {
            Ok((facts, rules)) => {
                let _ = rules;
                LearnResult {
                    success: true,
                    facts,
                    errors: Vec::new(),
                    warnings,
                    solve_result: self.pending_solve.take(),
                    proof_nl: None,
                    proof_object: None,
                }
            }
            Err(err) => {
                let proof_nl = match &err {
                    SessionError::ContradictionRejected(msg) => Some(msg.clone()),
                    _ => None,
                };
                self.rollback(snap);
                LearnResult {
                    success: false,
                    facts: 0,
                    errors: vec![err.to_string()],
                    warnings,
                    solve_result: None,
                    proof_nl,
                    proof_object: None,
                }
            }
        }
    }

    /// Parses a single-statement goal DSL string into a `FactMetadata`,
    /// reusing the executor's `args_to_metadata` so e.g. a flat `Not isA
    /// Max Lorpus` goal folds into the same `Not (isA Max Lorpus)` shape
    /// `nesy-proof`'s `not_inner` expects from a persisted `Not` fact.
    fn parse_goal(&self, dsl: &str) -> Result<FactMetadata, SessionError> {
        let program = nesy_parser::parse_program(dsl)?;
        let canonical = self.canonicalize_program(&program);
        let stmt = canonical.first().ok_or_else(|| SessionError::UnknownOperator("empty goal".into()))?;
        match stmt {
            Statement::Assert { operator, args, .. } => {
                let op_name = match operator {
                    nesy_parser::Expr::Ident(n) | nesy_parser::Expr::Reference(n) => n.clone(),
                    _ => return Err(SessionError::UnknownOperator("goal operator must be an identifier".into())),
                };
                self.args_to_metadata(&op_name, args)
            }
            _ => Err(SessionError::UnknownOperator("goal must be an assert statement".into())),
        }
    }

    pub fn query(&mut self, dsl: &str) -> QueryResult {
        let goal = match self.parse_goal(dsl) {
            Ok(g) => g,
            Err(_) => return QueryResult { success: false, bindings: HashMap::new(), all_results: Vec::new(), confidence: 0.0 },
        };
        let has_holes = goal.args.iter().any(|a| matches!(a, nesy_kb::ArgValue::Hole(_)));
        if !has_holes {
            let prover = Prover::new(&self.kb, &self.forward, &self.theory, self.config.proof_config());
            let result = prover.prove(&goal);
            let all_results = vec![QueryAllResult {
                bindings: HashMap::new(),
                proof: Some(result.proof_object.clone()),
                score: result.confidence,
                method: result.method.clone(),
            }];
            return QueryResult { success: result.valid, bindings: HashMap::new(), all_results, confidence: result.confidence };
        }

        let filler = HoleFiller::new(&self.vocab, &self.kb, self.config.query_config());
        let mut stats = QueryStats::default();
        let fill_result = filler.fill(&goal, &mut self.tagger, None, &mut self.allocator, &mut stats);
        match fill_result {
            Ok(hole_bindings) => {
                let mut bindings = HashMap::new();
                let mut confidence = 0.0f64;
                for hb in &hole_bindings {
                    confidence = confidence.max(hb.similarity);
                    bindings.insert(
                        hb.hole.clone(),
                        QueryBinding { answer: hb.answer.clone(), similarity: hb.similarity, alternatives: hb.alternatives.clone(), method: hb.method.clone() },
                    );
                }
                let success = hole_bindings.iter().all(|hb| !hb.answer.is_empty());
                QueryResult { success, bindings, all_results: Vec::new(), confidence }
            }
            Err(_) => QueryResult { success: false, bindings: HashMap::new(), all_results: Vec::new(), confidence: 0.0 },
        }
    }

    pub fn prove(&mut self, dsl: &str) -> ProveResult {
        let goal = match self.parse_goal(dsl) {
            Ok(g) => g,
            Err(e) => {
                let proof_object = ProofObject::failure(FactMetadata::default(), "parse_error");
                return ProveResult { valid: false, method: "parse_error".into(), confidence: 0.0, steps: Vec::new(), proof_object, reason: Some(e.to_string()) };
            }
        };
        let prover = Prover::new(&self.kb, &self.forward, &self.theory, self.config.proof_config());
        let result = prover.prove(&goal);
        ProveResult {
            valid: result.valid,
            method: result.method,
            confidence: result.confidence,
            steps: result.steps,
            proof_object: result.proof_object,
            reason: result.reason,
        }
    }

    pub fn abduce(&mut self, dsl: &str) -> AbduceResult {
        let goal = match self.parse_goal(dsl) {
            Ok(g) => g,
            Err(_) => return AbduceResult { success: false, explanations: Vec::new() },
        };
        let explanations = abduce(&self.kb, &goal);
        AbduceResult { success: !explanations.is_empty(), explanations: explanations.into_iter().map(|e| e.condition).collect() }
    }

    /// `deduce`/`whatif`/`explain`/`findAll` meta-operators are exposed
    /// directly as well, since `query(dsl)` only covers hole-filling and
    /// direct proof.
    pub fn deduce(&self, src: &str, filter_operator: &str, depth: usize, limit: usize) -> Vec<FactMetadata> {
        deduce(&self.kb, src, filter_operator, depth, limit).results
    }

    pub fn whatif(&self, cause_operator: &str, cause_subject: Option<&str>, target: &FactMetadata) -> WhatIfOutcome {
        whatif(&self.kb, &self.theory, cause_operator, cause_subject, target, self.config.proof_config()).0
    }

    pub fn explain(&self, goal: &FactMetadata) -> String {
        explain(&self.kb, &self.forward, &self.theory, goal, self.config.proof_config(), || {
            abduce(&self.kb, goal).into_iter().next().map(|e| e.condition.render())
        })
        .why
    }

    pub fn find_all(&self, pattern_dsl: &str) -> FindAllResult {
        let pattern = match self.parse_goal(pattern_dsl) {
            Ok(p) => p,
            Err(_) => return FindAllResult { success: false, count: 0, results: Vec::new() },
        };
        let results = find_all(&self.kb, &pattern);
        FindAllResult { success: true, count: results.len(), results }
    }

    /// Pattern induction: groups facts by operator and reports operators
    /// with enough instances to suggest a rule, plus the STRIPS actions
    /// already declared.
    pub fn induce(&self) -> InduceResult {
        let mut by_operator: HashMap<String, usize> = HashMap::new();
        for fact in self.kb.facts() {
            *by_operator.entry(fact.metadata.operator.clone()).or_insert(0) += 1;
        }
        let patterns: Vec<String> = by_operator
            .into_iter()
            .filter(|(_, count)| *count >= 2)
            .map(|(op, count)| format!("{op} observed {count} times"))
            .collect();
        InduceResult { success: true, patterns, suggested_rules: self.collect_actions_pub() }
    }

    fn collect_actions_pub(&self) -> Vec<nesy_query::Action> {
        self.kb
            .find_by_operator("actionSig")
            .into_iter()
            .filter_map(|id| self.kb.fact(id))
            .filter_map(|f| {
                name_of(f.metadata.arg0()).map(|n| nesy_query::Action {
                    name: n.to_string(),
                    requires: self.kb.find_by_operator_and_arg0("requires", n).into_iter().filter_map(|i| self.kb.fact(i)).map(|f| f.metadata.clone()).collect(),
                    causes: self.kb.find_by_operator_and_arg0("causes", n).into_iter().filter_map(|i| self.kb.fact(i)).map(|f| f.metadata.clone()).collect(),
                    prevents: self.kb.find_by_operator_and_arg0("prevents", n).into_iter().filter_map(|i| self.kb.fact(i)).map(|f| f.metadata.clone()).collect(),
                })
            })
            .collect()
    }

    /// `loadCore({corePath?, includeIndex?, validate?})` — reads a core
    /// DSL file (and, if `includeIndex` names one, a manifest of further
    /// files) through the same `learn` pipeline as `@_ Load`.
    pub fn load_core(&mut self, core_path: Option<&str>, include_index: Option<&str>, validate: bool) -> LoadCoreResult {
        let mut errors = Vec::new();
        if let Some(path) = core_path {
            match std::fs::read_to_string(path) {
                Ok(src) => {
                    let result = self.learn(&src);
                    if !result.success {
                        errors.extend(result.errors);
                    }
                }
                Err(e) => errors.push(format!("{path}: {e}")),
            }
        }
        if let Some(index_path) = include_index {
            match std::fs::read_to_string(index_path) {
                Ok(manifest) => {
                    for line in manifest.lines().map(str::trim).filter(|l| !l.is_empty()) {
                        match std::fs::read_to_string(line) {
                            Ok(src) => {
                                let result = self.learn(&src);
                                if !result.success {
                                    errors.extend(result.errors);
                                }
                            }
                            Err(e) => errors.push(format!("{line}: {e}")),
                        }
                    }
                }
                Err(e) => errors.push(format!("{index_path}: {e}")),
            }
        }
        if validate {
            for fact in self.kb.facts() {
                let _ = fact;
            }
        }
        LoadCoreResult { success: errors.is_empty(), errors }
    }

    pub fn close(&mut self) {
        self.kb = ComponentKB::new(self.strategy, self.geometry);
        self.scope.clear();
        self.forward = ForwardChainer::new();
        self.loaded_files.clear();
        self.pending_solve = None;
        self.provenance.clear();
    }
}
