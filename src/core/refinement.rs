// src/core/refinement.rs — Bounded generator/critic loop

use super::orchestrator::PipelineFailure;
use super::routing::AgentRoute;
use super::stages::{EvaluateStage, ProposeStage};
use super::state::{update, SessionState, StatePatch};
use super::types::PipelineEvent;
use crate::backend::{Evaluator, Proposer};
use crate::infra::errors::ForgeError;

pub const STAGE: &str = "composition_loop";

/// Proposes and evaluates candidates until one is accepted or the attempt
/// budget runs out. Exactly `max_iterations` rounds are tried at most.
#[derive(Debug, Clone, Copy)]
pub struct RefinementLoop {
    max_iterations: u32,
}

impl RefinementLoop {
    pub fn new(max_iterations: u32) -> Result<Self, ForgeError> {
        if max_iterations == 0 {
            return Err(ForgeError::InvalidInput(
                "max_iterations must be at least 1".into(),
            ));
        }
        Ok(Self { max_iterations })
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Run the loop from `state`.
    ///
    /// `loop_iterations` counts rejected rounds. On acceptance the candidate
    /// is promoted to `final_formulation`. On any failure the returned
    /// [`PipelineFailure`] holds the last state that passed validation.
    pub fn run(
        &self,
        state: &SessionState,
        proposer: &dyn Proposer,
        evaluator: &dyn Evaluator,
        emit: &dyn Fn(PipelineEvent),
    ) -> Result<SessionState, PipelineFailure> {
        let propose = ProposeStage::new(proposer);
        let evaluate = EvaluateStage::new(evaluator);

        let mut current = state.clone();
        let mut iteration: u32 = 0;

        loop {
            if iteration >= self.max_iterations {
                tracing::warn!(attempts = iteration, "Refinement loop exhausted");
                emit(PipelineEvent::Exhausted {
                    attempts: iteration,
                });
                return Err(PipelineFailure::new(
                    STAGE,
                    ForgeError::LoopExhausted {
                        attempts: iteration,
                    },
                    Some(current),
                ));
            }

            let attempt = iteration + 1;
            tracing::info!(attempt, max = self.max_iterations, "Proposing candidate");
            emit(PipelineEvent::AttemptStarted {
                attempt,
                max_attempts: self.max_iterations,
            });

            let (proposed, candidate) = match propose.propose(&current) {
                Ok(v) => v,
                Err(e) => return Err(PipelineFailure::new(STAGE, e, Some(current))),
            };
            current = proposed;

            let (judged, accepted) = match evaluate.judge(&current) {
                Ok(v) => v,
                Err(e) => return Err(PipelineFailure::new(STAGE, e, Some(current))),
            };
            current = judged;

            if accepted {
                let promoted = update(
                    &current,
                    StatePatch::new()
                        .final_formulation(&candidate)
                        .next_agent(AgentRoute::SimulationLead),
                );
                return match promoted {
                    Ok(next) => {
                        tracing::info!(attempt, matrix = ?candidate.matrix, "Candidate accepted");
                        emit(PipelineEvent::Accepted { attempt });
                        Ok(next)
                    }
                    Err(e) => Err(PipelineFailure::new(STAGE, e, Some(current))),
                };
            }

            iteration += 1;
            let phases = current
                .thermo_validation
                .as_ref()
                .map(|t| t.phases.clone())
                .unwrap_or_default();
            tracing::info!(attempt, ?phases, "Candidate rejected");
            current = match update(&current, StatePatch::new().loop_iterations(iteration)) {
                Ok(next) => next,
                Err(e) => return Err(PipelineFailure::new(STAGE, e, Some(current))),
            };
            emit(PipelineEvent::AttemptRejected { attempt, phases });
        }
    }
}
