// src/backend/composition.rs — Built-in candidate generator

use super::{CollaboratorError, Proposer};
use crate::core::elements::canonical_symbol;
use crate::core::types::{AlloyCandidate, ResearchPlan};

/// Matrix used when the plan suggests nothing.
const FALLBACK_MATRIX: [&str; 2] = ["Fe", "C"];

/// Builds a candidate straight from the plan's suggested elements.
#[derive(Debug, Clone)]
pub struct PlanProposer {
    target_temp_k: f64,
}

impl PlanProposer {
    pub fn new(target_temp_k: f64) -> Self {
        Self { target_temp_k }
    }
}

impl Default for PlanProposer {
    fn default() -> Self {
        Self::new(1000.0)
    }
}

impl Proposer for PlanProposer {
    fn propose(&self, plan: &ResearchPlan) -> Result<AlloyCandidate, CollaboratorError> {
        let matrix = normalize_matrix(&plan.suggested_elements);
        let candidate = if matrix.is_empty() {
            AlloyCandidate::new(FALLBACK_MATRIX, self.target_temp_k)
        } else {
            AlloyCandidate::new(matrix, self.target_temp_k)
        };
        tracing::debug!(
            matrix = ?candidate.matrix,
            target_temp_k = candidate.target_temp_k,
            "Proposed candidate"
        );
        Ok(candidate)
    }
}

/// Canonicalize symbol case and drop duplicates, keeping first occurrence.
/// Symbols outside the table are passed through for the validator to flag.
pub fn normalize_matrix(symbols: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(symbols.len());
    for raw in symbols {
        let symbol = canonical_symbol(raw)
            .map(str::to_string)
            .unwrap_or_else(|| raw.clone());
        if !out.contains(&symbol) {
            out.push(symbol);
        }
    }
    out
}
