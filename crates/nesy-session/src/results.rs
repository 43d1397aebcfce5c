//! Result shapes for the public session methods.

use nesy_kb::FactMetadata;
use nesy_proof::ProofObject;
use nesy_query::{Action, CspSolution, PlanResult};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct LearnResult {
    pub success: bool,
    pub facts: usize,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub solve_result: Option<SolveResult>,
    pub proof_nl: Option<String>,
    pub proof_object: Option<ProofObject>,
}

#[derive(Debug, Clone)]
pub enum SolveResult {
    Csp { relation: String, solutions: Vec<CspSolution> },
    Planning { plan_name: String, result: Option<PlanResult> },
}

#[derive(Debug, Clone)]
pub struct QueryBinding {
    pub answer: String,
    pub similarity: f64,
    pub alternatives: Vec<(String, f64)>,
    pub method: String,
}

#[derive(Debug, Clone)]
pub struct QueryAllResult {
    pub bindings: HashMap<String, String>,
    pub proof: Option<ProofObject>,
    pub score: f64,
    pub method: String,
}

#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    pub success: bool,
    pub bindings: HashMap<String, QueryBinding>,
    pub all_results: Vec<QueryAllResult>,
    pub confidence: f64,
}

#[derive(Debug, Clone)]
pub struct ProveResult {
    pub valid: bool,
    pub method: String,
    pub confidence: f64,
    pub steps: Vec<nesy_proof::Step>,
    pub proof_object: ProofObject,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AbduceResult {
    pub success: bool,
    pub explanations: Vec<FactMetadata>,
}

#[derive(Debug, Clone, Default)]
pub struct InduceResult {
    pub success: bool,
    pub patterns: Vec<String>,
    pub suggested_rules: Vec<Action>,
}

#[derive(Debug, Clone, Default)]
pub struct FindAllResult {
    pub success: bool,
    pub count: usize,
    pub results: Vec<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default)]
pub struct LoadCoreResult {
    pub success: bool,
    pub errors: Vec<String>,
}
