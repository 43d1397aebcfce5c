//! Statement execution: one parsed `Statement` at a time,
//! called in order by `Session::learn` inside its transaction.

use crate::error::SessionError;
use crate::results::SolveResult;
use crate::scope::ScopeValue;
use crate::session::Session;
use nesy_kb::{ArgValue as KArg, FactMetadata};
use nesy_parser::{ConfigEntry, Destination, Expr, Statement};
use nesy_vector::{build_statement_vector, HdcAlgebra, Vector};

/// Theory-declaration pseudo-operators handled by the executor itself
/// rather than turned into KB facts.
const THEORY_OPERATORS: &[&str] = &[
    "synonym",
    "alias",
    "canonical",
    "canonicalRewrite",
    "mutuallyExclusive",
    "contradictsSameArgs",
    "DISJOINT_WITH",
    "functional",
    "cardinality",
    "__SymmetricRelation",
    "__TransitiveRelation",
    "inverseRelation",
];

/// Operators the parser leaves as flat `Assert{operator, args}` but whose
/// symbolic shape (`nesy_proof`'s prover, `nesy_kb`'s rule model) expects
/// nested `ArgValue::Compound`/`body` structure — the parser never
/// auto-wraps flat argument lists (confirmed in `nesy-parser/src/parser.rs`:
/// only explicit `(...)` produces `Expr::Compound`), so folding happens here.
const LOGICAL_OPERATORS: &[&str] = &["Not", "And", "Or"];

pub struct ExecOutcome {
    pub fact_added: bool,
    pub rule_added: bool,
}

impl Session {
    pub(crate) fn execute_statement(&mut self, stmt: &Statement, warnings: &mut Vec<String>) -> Result<ExecOutcome, SessionError> {
        match stmt {
            Statement::Assert { dest, operator, args, .. } => self.execute_assert(dest, operator, args, warnings),
            Statement::Macro { dest, params, body, .. } => {
                self.macros.insert(dest.name.clone(), (params.clone(), body.clone()));
                Ok(ExecOutcome { fact_added: false, rule_added: false })
            }
            Statement::Graph { dest, params, body, ret, .. } => {
                self.graphs.insert(dest.name.clone(), (params.clone(), body.clone(), ret.clone()));
                Ok(ExecOutcome { fact_added: false, rule_added: false })
            }
            Statement::Solve { dest, kind, config, .. } => self.execute_solve(dest, kind, config, warnings),
        }
    }

    fn operator_name(&self, operator: &Expr) -> Result<String, SessionError> {
        match operator {
            Expr::Ident(name) | Expr::Reference(name) => Ok(name.clone()),
            _ => Err(SessionError::UnknownOperator("<non-identifier operator>".into())),
        }
    }

    fn execute_assert(
        &mut self,
        dest: &Option<Destination>,
        operator: &Expr,
        args: &[Expr],
        warnings: &mut Vec<String>,
    ) -> Result<ExecOutcome, SessionError> {
        let op_name = self.operator_name(operator)?;

        if op_name == "Load" {
            return self.execute_load(args, warnings);
        }
        if op_name == "Set" {
            return self.execute_set(args);
        }
        if THEORY_OPERATORS.contains(&op_name.as_str()) {
            self.execute_theory_declaration(&op_name, args)?;
            return Ok(ExecOutcome { fact_added: false, rule_added: false });
        }
        if op_name.starts_with("___") {
            return self.execute_l0_builtin(dest, &op_name, args);
        }

        if op_name == "Implies" {
            return self.execute_implies(dest, args);
        }

        let metadata = self.args_to_metadata(&op_name, args)?;
        let op_vec = self.vocab_get_or_create(&op_name, None)?;
        let arg_vecs = self.resolve_args(args)?;
        let stmt_vec = build_statement_vector(&self.strategy, &mut self.tagger, &op_vec, &arg_vecs, &mut self.allocator)?;

        self.bind_and_persist(dest, stmt_vec, metadata, warnings)
    }

    /// Resolves each arg expression to a vector per step 2.
    fn resolve_args(&mut self, args: &[Expr]) -> Result<Vec<Vector>, SessionError> {
        args.iter().map(|a| self.resolve_expr(a)).collect()
    }

    fn resolve_expr(&mut self, expr: &Expr) -> Result<Vector, SessionError> {
        match expr {
            Expr::Ident(name) => self.vocab_get_or_create(name, None),
            Expr::Reference(name) => self
                .scope
                .get(name)
                .map(|sv| sv.vector.clone())
                .ok_or_else(|| SessionError::UndefinedReference(name.clone())),
            Expr::Str(s) => self.vocab_get_or_create(&format!("\"{s}\""), None),
            Expr::Number(n) => self.vocab_get_or_create(&format!("{n}"), None),
            Expr::Hole(name) => self.vocab_get_or_create(&format!("__HOLE_{name}__"), Some("__hole__")),
            Expr::List(items) => {
                let vecs = self.resolve_args(items)?;
                let mut tagged = Vec::with_capacity(vecs.len());
                for (i, v) in vecs.into_iter().enumerate() {
                    let p = (i + 1) as u8;
                    tagged.push(self.tagger.with_position(&self.strategy, p, &v, &mut self.allocator)?);
                }
                let refs: Vec<&Vector> = tagged.iter().collect();
                self.strategy.bundle(&refs).map_err(SessionError::from)
            }
            Expr::Compound(op, items) => {
                let op_vec = self.vocab_get_or_create(op, None)?;
                let arg_vecs = self.resolve_args(items)?;
                build_statement_vector(&self.strategy, &mut self.tagger, &op_vec, &arg_vecs, &mut self.allocator).map_err(SessionError::from)
            }
        }
    }

    pub(crate) fn expr_to_argvalue(&self, expr: &Expr) -> Result<KArg, SessionError> {
        Ok(match expr {
            Expr::Ident(name) => KArg::Name(name.clone()),
            Expr::Reference(name) => match self.scope.get(name) {
                Some(sv) => KArg::Compound(sv.metadata.operator.clone(), sv.metadata.args.clone()),
                None => return Err(SessionError::UndefinedReference(name.clone())),
            },
            Expr::Str(s) => KArg::Literal(s.clone()),
            Expr::Number(n) => KArg::Literal(n.to_string()),
            Expr::Hole(name) => KArg::Hole(name.clone()),
            Expr::List(items) => KArg::List(items.iter().map(|e| self.expr_to_argvalue(e)).collect::<Result<_, _>>()?),
            Expr::Compound(op, items) => KArg::Compound(op.clone(), items.iter().map(|e| self.expr_to_argvalue(e)).collect::<Result<_, _>>()?),
        })
    }

    /// Flat `Not`/`And`/`Or` argument lists get folded into the nested
    /// `FactMetadata` shape `nesy-proof`'s prover expects: `Not (op a b)`,
    /// `And [stmt...]`, `Or [stmt...]` — the operator's single "child"
    /// statement(s) are read back out of the flat `args` list.
    pub(crate) fn args_to_metadata(&self, op_name: &str, args: &[Expr]) -> Result<FactMetadata, SessionError> {
        if LOGICAL_OPERATORS.contains(&op_name) {
            return self.fold_logical(op_name, args);
        }
        let arg_values = args.iter().map(|e| self.expr_to_argvalue(e)).collect::<Result<Vec<_>, _>>()?;
        Ok(FactMetadata::simple(op_name, arg_values))
    }

    /// `Not inner_op a b...` -> `Not (inner_op a b...)`; `And s1 s2 ...` /
    /// `Or s1 s2 ...` where each `s_i` is itself a flat `op a b` triple
    /// (only representable via explicit parens in this DSL, so `args` here
    /// is already the list of `Compound` exprs the parser produced).
    fn fold_logical(&self, op_name: &str, args: &[Expr]) -> Result<FactMetadata, SessionError> {
        match op_name {
            "Not" => {
                if args.len() == 1 {
                    let inner = self.expr_to_argvalue(&args[0])?;
                    return Ok(FactMetadata::simple("Not", vec![inner]));
                }
                if args.is_empty() {
                    return Ok(FactMetadata::simple("Not", vec![]));
                }
                let inner_op = match &args[0] {
                    Expr::Ident(n) => n.clone(),
                    _ => return Err(SessionError::UnknownOperator("Not expects an operator identifier".into())),
                };
                let rest = args[1..].iter().map(|e| self.expr_to_argvalue(e)).collect::<Result<Vec<_>, _>>()?;
                Ok(FactMetadata::simple("Not", vec![KArg::Compound(inner_op, rest)]))
            }
            "And" | "Or" => {
                let body = args
                    .iter()
                    .map(|e| match e {
                        Expr::Compound(op, items) => {
                            let arg_values = items.iter().map(|i| self.expr_to_argvalue(i)).collect::<Result<Vec<_>, _>>()?;
                            Ok(FactMetadata::simple(op.clone(), arg_values))
                        }
                        _ => Err(SessionError::UnknownOperator(format!("{op_name} expects compound conjuncts"))),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(FactMetadata { operator: op_name.to_string(), body: Some(body), ..Default::default() })
            }
            _ => unreachable!(),
        }
    }

    /// `Implies cond concl` — both sides referenced via `$scope` bindings
    /// established by a prior statement.
    fn execute_implies(&mut self, dest: &Option<Destination>, args: &[Expr]) -> Result<ExecOutcome, SessionError> {
        if args.len() != 2 {
            return Err(SessionError::UnknownOperator("Implies expects exactly two references".into()));
        }
        let condition = self.scope_metadata(&args[0])?;
        let conclusion = self.scope_metadata(&args[1])?;
        let cond_vec = self.resolve_expr(&args[0])?;
        let concl_vec = self.resolve_expr(&args[1])?;
        let implies_op = self.vocab_get_or_create("Implies", None)?;
        let rule_vec =
            build_statement_vector(&self.strategy, &mut self.tagger, &implies_op, &[cond_vec, concl_vec], &mut self.allocator)?;
        self.kb.add_rule(rule_vec.clone(), condition.clone(), conclusion.clone());

        let metadata = FactMetadata {
            operator: "Implies".into(),
            condition: Some(Box::new(condition)),
            conclusion: Some(Box::new(conclusion)),
            ..Default::default()
        };
        let outcome = self.bind_and_persist(dest, rule_vec, metadata, &mut Vec::new())?;
        Ok(ExecOutcome { fact_added: outcome.fact_added, rule_added: true })
    }

    fn scope_metadata(&self, expr: &Expr) -> Result<FactMetadata, SessionError> {
        match expr {
            Expr::Reference(name) => self.scope.get(name).map(|sv| sv.metadata.clone()).ok_or_else(|| SessionError::UndefinedReference(name.clone())),
            Expr::Compound(op, items) => {
                let arg_values = items.iter().map(|e| self.expr_to_argvalue(e)).collect::<Result<Vec<_>, _>>()?;
                Ok(FactMetadata::simple(op.clone(), arg_values))
            }
            _ => Err(SessionError::UndefinedReference("Implies expects $reference or (compound) arguments".into())),
        }
    }

    /// Binds `dest` in scope and, if anonymous or `:persist`, adds a KB
    /// fact following the destination grammar.
    fn bind_and_persist(
        &mut self,
        dest: &Option<Destination>,
        vector: Vector,
        metadata: FactMetadata,
        warnings: &mut Vec<String>,
    ) -> Result<ExecOutcome, SessionError> {
        let persist = match dest {
            None => true,
            Some(d) => d.persist,
        };
        if let Some(d) = dest {
            self.scope.insert(d.name.clone(), ScopeValue { vector: vector.clone(), metadata: metadata.clone() });
        }
        if !persist {
            return Ok(ExecOutcome { fact_added: false, rule_added: false });
        }

        let canonical_metadata = self.apply_canonical_rewrite(metadata);
        if self.config.reject_contradictions {
            if let Some(report) = self.contradiction_report(&canonical_metadata) {
                return Err(SessionError::ContradictionRejected(report));
            }
        } else if self.contradiction_report(&canonical_metadata).is_some() {
            warnings.push(format!("accepted despite contradiction: {}", canonical_metadata.render()));
        }

        if let (Some(a0), Some(a1)) = (name_of(canonical_metadata.arg0()), name_of(canonical_metadata.arg1())) {
            self.forward.assert_triple(&canonical_metadata.operator, a0, a1);
        }
        let name = dest.as_ref().map(|d| d.name.clone());
        self.kb.add_fact(vector, name, canonical_metadata)?;
        Ok(ExecOutcome { fact_added: true, rule_added: false })
    }

    fn apply_canonical_rewrite(&self, metadata: FactMetadata) -> FactMetadata {
        match self.canonicalizer.apply_rewrite(&metadata.operator, &metadata.args) {
            Some((op, args)) => FactMetadata { operator: op, args, ..metadata },
            None => metadata,
        }
    }

    fn contradiction_report(&self, metadata: &FactMetadata) -> Option<String> {
        let detector = nesy_proof::ContradictionDetector::new(&self.kb, &self.forward, &self.theory);
        detector.check(metadata).map(|r| r.proof_nl)
    }

    fn execute_theory_declaration(&mut self, op_name: &str, args: &[Expr]) -> Result<(), SessionError> {
        let names: Vec<String> = args
            .iter()
            .map(|e| match e {
                Expr::Ident(n) => Ok(n.clone()),
                _ => Err(SessionError::UnknownOperator(format!("{op_name} expects identifier arguments"))),
            })
            .collect::<Result<_, _>>()?;
        match op_name {
            "synonym" if names.len() == 2 => self.kb.synonyms.add_synonym(&names[0], &names[1]),
            "alias" | "canonical" if names.len() == 2 => self.kb.synonyms.add_alias(&names[0], &names[1]),
            "mutuallyExclusive" if names.len() == 3 => {
                self.theory.mutually_exclusive.entry(names[0].clone()).or_default().push((names[1].clone(), names[2].clone()));
            }
            "contradictsSameArgs" if names.len() == 2 => self.theory.contradicts_same_args.push((names[0].clone(), names[1].clone())),
            "DISJOINT_WITH" if names.len() == 2 => self.theory.disjoint.push((names[0].clone(), names[1].clone())),
            "functional" if names.len() == 1 => {
                self.theory.functional.insert(names[0].clone());
            }
            "__SymmetricRelation" if names.len() == 1 => {
                self.theory.symmetric.insert(names[0].clone());
            }
            "__TransitiveRelation" if names.len() == 1 => {
                self.theory.transitive.insert(names[0].clone());
            }
            "inverseRelation" if names.len() == 2 => {
                self.theory.inverse.insert(names[0].clone(), names[1].clone());
                self.theory.inverse.insert(names[1].clone(), names[0].clone());
            }
            "cardinality" if names.len() == 4 => {
                let min = names[2].parse().unwrap_or(0);
                let max = names[3].parse().unwrap_or(u32::MAX);
                self.theory.cardinality.push(nesy_proof::CardinalityConstraint {
                    type_name: names[0].clone(),
                    relation: names[1].clone(),
                    min,
                    max,
                });
            }
            "canonicalRewrite" if names.len() >= 2 => {
                let prim_op = names[0].clone();
                let macro_op = names[1].clone();
                let rest: Vec<usize> = names[2..].iter().filter_map(|s| s.parse().ok()).collect();
                let half = rest.len() / 2;
                let (arg_index_list, permutation) = rest.split_at(half);
                self.canonicalizer
                    .register_rewrite(&prim_op, &macro_op, arg_index_list.to_vec(), permutation.to_vec())
                    .map_err(|e| SessionError::UnknownOperator(e.to_string()))?;
            }
            _ => return Err(SessionError::UnknownOperator(format!("{op_name} with {} args", names.len()))),
        }
        Ok(())
    }

    fn execute_load(&mut self, args: &[Expr], warnings: &mut Vec<String>) -> Result<ExecOutcome, SessionError> {
        let path = match args.first() {
            Some(Expr::Str(s)) => s.clone(),
            _ => return Err(SessionError::Load("Load expects a string path".into())),
        };
        if !self.loaded_files.insert(path.clone()) {
            return Ok(ExecOutcome { fact_added: false, rule_added: false });
        }
        let bytes = std::fs::read_to_string(&path).map_err(|e| SessionError::Load(format!("{path}: {e}")))?;
        let program = nesy_parser::parse_program(&bytes)?;
        let (facts, rules) = self.execute_program(&program, warnings)?;
        Ok(ExecOutcome { fact_added: facts > 0, rule_added: rules > 0 })
    }

    fn execute_set(&mut self, args: &[Expr]) -> Result<ExecOutcome, SessionError> {
        let flag = match args.first() {
            Some(Expr::Ident(n)) => n.clone(),
            _ => return Err(SessionError::UnknownOperator("Set expects a flag name".into())),
        };
        let on = match args.get(1) {
            Some(Expr::Ident(v)) => v == "on",
            _ => return Err(SessionError::UnknownOperator("Set expects on|off".into())),
        };
        if flag == "CWA" {
            self.config.cwa = on;
        }
        Ok(ExecOutcome { fact_added: false, rule_added: false })
    }

    fn execute_l0_builtin(&mut self, dest: &Option<Destination>, op_name: &str, args: &[Expr]) -> Result<ExecOutcome, SessionError> {
        if !self.config.enable_l0_builtins {
            return Err(SessionError::UnknownOperator(op_name.to_string()));
        }
        let result = match op_name {
            "___Bind" => {
                let a = self.resolve_expr(args.first().ok_or_else(|| SessionError::UnknownOperator("___Bind needs 2 args".into()))?)?;
                let b = self.resolve_expr(args.get(1).ok_or_else(|| SessionError::UnknownOperator("___Bind needs 2 args".into()))?)?;
                self.strategy.bind(&a, &b)?
            }
            "___Bundle" => {
                let vecs = self.resolve_args(args)?;
                let refs: Vec<&Vector> = vecs.iter().collect();
                self.strategy.bundle(&refs)?
            }
            "___BundlePositioned" => {
                let vecs = self.resolve_args(args)?;
                let mut tagged = Vec::with_capacity(vecs.len());
                for (i, v) in vecs.into_iter().enumerate() {
                    tagged.push(self.tagger.with_position(&self.strategy, (i + 1) as u8, &v, &mut self.allocator)?);
                }
                let refs: Vec<&Vector> = tagged.iter().collect();
                self.strategy.bundle(&refs)?
            }
            "___NewVector" => {
                let name = match args.first() {
                    Some(Expr::Ident(n)) => n.clone(),
                    _ => return Err(SessionError::UnknownOperator("___NewVector needs a name".into())),
                };
                let theory = match args.get(1) {
                    Some(Expr::Ident(t)) => Some(t.clone()),
                    _ => None,
                };
                self.vocab_get_or_create(&name, theory.as_deref())?
            }
            "___GetType" => {
                let name = match args.first() {
                    Some(Expr::Ident(n)) => n.clone(),
                    Some(Expr::Reference(n)) => n.clone(),
                    _ => return Err(SessionError::UnknownOperator("___GetType needs a name".into())),
                };
                let ty = self
                    .kb
                    .find_by_operator_and_arg0("isA", &name)
                    .into_iter()
                    .filter_map(|id| self.kb.fact(id))
                    .filter_map(|f| name_of(f.metadata.arg1()))
                    .next();
                match ty {
                    Some(t) => self.vocab_get_or_create(t, None)?,
                    None if self.config.strict_types => return Err(SessionError::MissingType(name)),
                    None => self.vocab_get_or_create("__UNKNOWN_TYPE__", Some("__reserved__"))?,
                }
            }
            _ => return Err(SessionError::UnknownOperator(op_name.to_string())),
        };
        if let Some(d) = dest {
            let meta = FactMetadata::simple(op_name, vec![]);
            self.scope.insert(d.name.clone(), ScopeValue { vector: result, metadata: meta });
        }
        Ok(ExecOutcome { fact_added: false, rule_added: false })
    }

    pub(crate) fn vocab_get_or_create(&mut self, name: &str, theory: Option<&str>) -> Result<Vector, SessionError> {
        self.vocab.get_or_create(name, theory, &mut self.allocator).map_err(SessionError::from)
    }

    fn execute_solve(
        &mut self,
        dest: &Destination,
        kind: &str,
        config: &[ConfigEntry],
        warnings: &mut Vec<String>,
    ) -> Result<ExecOutcome, SessionError> {
        match kind {
            "csp" | "WeddingSeating" => self.execute_csp_solve(dest, config),
            "planning" => self.execute_planning_solve(dest, config, warnings),
            other => Err(SessionError::UnknownOperator(format!("unknown solve kind {other}"))),
        }
    }

    fn config_str(config: &[ConfigEntry], key: &str) -> Option<String> {
        config.iter().find_map(|entry| match entry {
            ConfigEntry::KeyValue(k, Expr::Ident(v)) if k == key => Some(v.clone()),
            ConfigEntry::KeyValue(k, Expr::Str(v)) if k == key => Some(v.clone()),
            ConfigEntry::KeyFrom(k, v) if k == key => Some(v.clone()),
            _ => None,
        })
    }

    fn config_bool(config: &[ConfigEntry], key: &str) -> bool {
        Self::config_str(config, key).as_deref() == Some("true") || Self::config_str(config, key).as_deref() == Some("on")
    }

    /// `KeyFrom` entries in declaration order — `guests from Guest, tables
    /// from Table` parses to two of these, positionally: first is the
    /// variable domain, second the value domain.
    fn config_from_values(config: &[ConfigEntry]) -> Vec<&str> {
        config
            .iter()
            .filter_map(|entry| match entry {
                ConfigEntry::KeyFrom(_, v) => Some(v.as_str()),
                _ => None,
            })
            .collect()
    }

    fn execute_csp_solve(&mut self, dest: &Destination, config: &[ConfigEntry]) -> Result<ExecOutcome, SessionError> {
        let from_values = Self::config_from_values(config);
        let var_type = from_values
            .first()
            .map(|s| s.to_string())
            .or_else(|| Self::config_str(config, "var"))
            .ok_or_else(|| SessionError::UnknownOperator("solve csp needs var".into()))?;
        let domain_type = from_values
            .get(1)
            .map(|s| s.to_string())
            .or_else(|| Self::config_str(config, "domain"))
            .ok_or_else(|| SessionError::UnknownOperator("solve csp needs domain".into()))?;
        let no_conflict_op = Self::config_str(config, "noConflict");
        let all_different = Self::config_bool(config, "allDifferent");
        let csp_config = nesy_query::CspConfig { var_type, domain_type, no_conflict_op, all_different };
        let solutions = nesy_query::solve(&self.kb, &csp_config);
        let rel_name = Self::config_str(config, "relation").unwrap_or_else(|| dest.name.clone());

        let mut added = false;
        for solution in &solutions {
            let rel_vec = self.vocab_get_or_create(&rel_name, None)?;
            let mut pairs = Vec::with_capacity(solution.assignments.len());
            for (var, dom) in &solution.assignments {
                pairs.push((self.vocab_get_or_create(var, None)?, self.vocab_get_or_create(dom, None)?));
            }
            let sol_vec = nesy_query::solution_vector(&self.strategy, &mut self.tagger, &rel_vec, &pairs, &mut self.allocator)?;
            let metadata = nesy_query::solution_metadata(&rel_name, solution);
            self.kb.add_fact(sol_vec, None, metadata)?;
            added = true;
        }
        self.scope.insert(
            dest.name.clone(),
            ScopeValue { vector: self.vocab_get_or_create(&rel_name, None)?, metadata: FactMetadata::simple("cspSolutions", vec![]) },
        );
        self.pending_solve = Some(SolveResult::Csp { relation: rel_name, solutions });
        Ok(ExecOutcome { fact_added: added, rule_added: false })
    }

    fn execute_planning_solve(&mut self, dest: &Destination, config: &[ConfigEntry], warnings: &mut Vec<String>) -> Result<ExecOutcome, SessionError> {
        let max_depth = Self::config_str(config, "maxDepth").and_then(|s| s.parse().ok()).unwrap_or(self.config.max_depth);
        let goals = self.collect_goal_facts(config);
        let start_facts: Vec<FactMetadata> = self.kb.facts().map(|f| f.metadata.clone()).collect();
        let actions = self.collect_actions();
        let plan_result = nesy_query::plan(&start_facts, &goals, &actions, max_depth, None);
        if plan_result.is_none() {
            warnings.push(format!("no plan found within maxDepth={max_depth}"));
        }
        let plan_name = dest.name.clone();
        if let Some(result) = &plan_result {
            for (i, step) in result.steps.iter().enumerate() {
                let meta = FactMetadata::simple("planStep", vec![KArg::Literal(format!("{i}")), KArg::Name(step.action.clone())]);
                let v = self.vocab_get_or_create(&format!("__PLAN_STEP_{plan_name}_{i}__"), Some("__reserved__"))?;
                self.kb.add_fact(v, None, meta)?;
            }
            let plan_meta = FactMetadata::simple("plan", vec![KArg::Name(plan_name.clone()), KArg::Literal(result.length.to_string())]);
            let v = self.vocab_get_or_create(&format!("__PLAN_{plan_name}__"), Some("__reserved__"))?;
            self.kb.add_fact(v, None, plan_meta)?;
        }
        self.scope.insert(
            dest.name.clone(),
            ScopeValue { vector: self.vocab_get_or_create(&plan_name, Some("__reserved__"))?, metadata: FactMetadata::simple("plan", vec![]) },
        );
        self.pending_solve = Some(SolveResult::Planning { plan_name, result: plan_result });
        Ok(ExecOutcome { fact_added: false, rule_added: false })
    }

    fn collect_goal_facts(&self, config: &[ConfigEntry]) -> Vec<FactMetadata> {
        match Self::config_str(config, "goal") {
            Some(name) => self.scope.get(&name).map(|sv| vec![sv.metadata.clone()]).unwrap_or_default(),
            None => Vec::new(),
        }
    }

    fn collect_actions(&self) -> Vec<nesy_query::Action> {
        self.kb
            .find_by_operator("actionSig")
            .into_iter()
            .filter_map(|id| self.kb.fact(id))
            .filter_map(|f| name_of(f.metadata.arg0()).map(|n| nesy_query::Action {
                name: n.to_string(),
                requires: self.kb.find_by_operator_and_arg0("requires", n).into_iter().filter_map(|i| self.kb.fact(i)).map(|f| f.metadata.clone()).collect(),
                causes: self.kb.find_by_operator_and_arg0("causes", n).into_iter().filter_map(|i| self.kb.fact(i)).map(|f| f.metadata.clone()).collect(),
                prevents: self.kb.find_by_operator_and_arg0("prevents", n).into_iter().filter_map(|i| self.kb.fact(i)).map(|f| f.metadata.clone()).collect(),
            }))
            .collect()
    }
}

pub(crate) fn name_of(a: Option<&KArg>) -> Option<&str> {
    match a {
        Some(KArg::Name(n)) => Some(n),
        _ => None,
    }
}
