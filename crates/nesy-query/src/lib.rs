//! Query engine: holographic hole-filling, meta-operators
//! (`deduce`/`whatif`/`explain`/`findAll`), abduction, and the `solve`
//! subsystem (CSP backtracking, STRIPS planning) that `nesy-session`'s
//! `Executor` dispatches into.

pub mod abduce;
pub mod csp;
pub mod error;
pub mod holes;
pub mod meta;
pub mod planner;

pub use abduce::{abduce, Explanation};
pub use csp::{solution_metadata, solution_vector, solve, CspConfig, CspSolution};
pub use error::QueryError;
pub use holes::{HoleBinding, HoleFiller, QueryConfig, QueryStats};
pub use meta::{deduce, explain, find_all, whatif, DeduceResult, ExplainResult, WhatIfOutcome};
pub use planner::{plan, Action, PlanResult, PlanStep};
