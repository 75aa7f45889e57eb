// src/backend/mod.rs — Collaborator layer
//
// One trait per external collaborator. Calls are synchronous from the
// pipeline's point of view; anything asynchronous or networked lives behind
// the implementation.

pub mod composition;
pub mod discovery;
pub mod fallback;
pub mod fea;
pub mod report;
pub mod thermo;

use std::path::PathBuf;

use thiserror::Error;

use crate::core::state::SessionState;
use crate::core::types::{
    AlloyCandidate, FeaResult, Intent, ResearchPlan, SimulationLoad, Verdict,
};

/// Failure reported by a collaborator call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct CollaboratorError {
    pub message: String,
}

impl CollaboratorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Reads the user's prompt and picks the entry route.
pub trait Dispatcher: Send + Sync {
    fn dispatch(&self, prompt: &str) -> Result<Intent, CollaboratorError>;
}

/// Turns an intent into a research plan.
pub trait Researcher: Send + Sync {
    fn research(&self, intent: &str) -> Result<ResearchPlan, CollaboratorError>;
}

/// Generator half of the refinement loop.
pub trait Proposer: Send + Sync {
    fn propose(&self, plan: &ResearchPlan) -> Result<AlloyCandidate, CollaboratorError>;
}

/// Critic half of the refinement loop.
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, candidate: &AlloyCandidate) -> Result<Verdict, CollaboratorError>;
}

/// Physics backend for the finite-element run.
pub trait Simulator: Send + Sync {
    fn simulate(
        &self,
        candidate: &AlloyCandidate,
        load: SimulationLoad,
    ) -> Result<FeaResult, CollaboratorError>;
}

/// Renders artifacts from a finished session. The pipeline never consumes
/// the returned locations.
pub trait Reporter: Send + Sync {
    fn report(&self, state: &SessionState) -> Result<Vec<PathBuf>, CollaboratorError>;
}

/// Round to three decimals, the precision the physics surrogates report.
pub(crate) fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collaborator_error_display() {
        let e = CollaboratorError::new("solver diverged");
        assert_eq!(e.to_string(), "solver diverged");
    }

    #[test]
    fn test_round3() {
        assert!((round3(34.00049) - 34.0).abs() < 1e-12);
        assert!((round3(1.23456) - 1.235).abs() < 1e-12);
    }
}
