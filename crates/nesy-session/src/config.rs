//! `SessionConfig` — geometry/strategy choice, proof depth/timeout,
//! contradiction policy, and the centralized similarity thresholds, kept in
//! one tuning record instead of scattering magic numbers across call sites.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub geometry: usize,
    pub strategy: String,
    pub max_depth: usize,
    pub timeout_ms: u64,
    pub reject_contradictions: bool,
    pub cwa: bool,
    /// `holographicPriority` when true (symbolic supplement skipped once a
    /// candidate validates); `symbolicPriority` when false (symbolic
    /// indexing always runs to supplement).
    pub holographic_priority: bool,
    pub min_similarity: f64,
    pub max_candidates: usize,
    /// Exposes `___Bind`/`___Bundle`/`___BundlePositioned`/`___NewVector`/
    /// `___GetType` — off by default, opt-in.
    pub enable_l0_builtins: bool,
    /// Under strict mode a missing type marker for `___GetType` is an
    /// error rather than an empty result.
    pub strict_types: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            geometry: 2048,
            strategy: "dense-binary".into(),
            max_depth: 5,
            timeout_ms: 2000,
            reject_contradictions: true,
            cwa: false,
            holographic_priority: true,
            min_similarity: 0.2,
            max_candidates: 5,
            enable_l0_builtins: false,
            strict_types: false,
        }
    }
}

impl SessionConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn proof_config(&self) -> nesy_proof::ProofConfig {
        nesy_proof::ProofConfig { max_depth: self.max_depth, timeout: self.timeout(), cwa: self.cwa }
    }

    pub fn query_config(&self) -> nesy_query::QueryConfig {
        nesy_query::QueryConfig {
            max_candidates: self.max_candidates,
            min_similarity: self.min_similarity,
            holographic_priority: self.holographic_priority,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = SessionConfig::default();
        assert_eq!(cfg.geometry % 32, 0);
        assert!(cfg.reject_contradictions);
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let cfg = SessionConfig::from_toml_str("max_depth = 9\n").unwrap();
        assert_eq!(cfg.max_depth, 9);
        assert_eq!(cfg.geometry, 2048);
    }
}
