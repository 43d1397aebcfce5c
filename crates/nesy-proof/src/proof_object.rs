//! `ProofObject` — a plain, serializable, independently re-checkable record
//! of a proof. Proof-object-as-data, not a live stack frame: nothing here
//! holds a reference into the prover's recursion state.

use nesy_kb::FactMetadata;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StepKind {
    Fact,
    Rule,
    Transitive,
    Synonym,
    Validation,
    UnificationMatch,
    Cycle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub kind: StepKind,
    pub detail: String,
    pub fact_id: Option<u64>,
    pub rule_id: Option<u64>,
}

impl Step {
    pub fn fact(detail: impl Into<String>, fact_id: u64) -> Self {
        Self { kind: StepKind::Fact, detail: detail.into(), fact_id: Some(fact_id), rule_id: None }
    }

    pub fn rule(detail: impl Into<String>, rule_id: u64) -> Self {
        Self { kind: StepKind::Rule, detail: detail.into(), fact_id: None, rule_id: Some(rule_id) }
    }

    pub fn transitive(detail: impl Into<String>) -> Self {
        Self { kind: StepKind::Transitive, detail: detail.into(), fact_id: None, rule_id: None }
    }

    pub fn synonym(detail: impl Into<String>) -> Self {
        Self { kind: StepKind::Synonym, detail: detail.into(), fact_id: None, rule_id: None }
    }

    pub fn unification(detail: impl Into<String>) -> Self {
        Self { kind: StepKind::UnificationMatch, detail: detail.into(), fact_id: None, rule_id: None }
    }

    pub fn cycle(detail: impl Into<String>) -> Self {
        Self { kind: StepKind::Cycle, detail: detail.into(), fact_id: None, rule_id: None }
    }

    pub fn validation(detail: impl Into<String>) -> Self {
        Self { kind: StepKind::Validation, detail: detail.into(), fact_id: None, rule_id: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsesFact {
    pub id: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProofObject {
    pub goal: FactMetadata,
    pub valid: bool,
    pub method: String,
    pub steps: Vec<Step>,
    pub uses_facts: Vec<UsesFact>,
    pub validator_ok: Option<bool>,
}

impl ProofObject {
    pub fn failure(goal: FactMetadata, reason: &str) -> Self {
        Self {
            goal,
            valid: false,
            method: reason.to_string(),
            steps: Vec::new(),
            uses_facts: Vec::new(),
            validator_ok: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProofResult {
    pub valid: bool,
    pub method: String,
    pub confidence: f64,
    pub steps: Vec<Step>,
    pub proof_object: ProofObject,
    pub reason: Option<String>,
}
