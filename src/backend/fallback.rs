// src/backend/fallback.rs — Degrade to safe defaults when a collaborator fails

use std::path::PathBuf;

use super::discovery::default_research_plan;
use super::{
    CollaboratorError, Dispatcher, Evaluator, Proposer, Reporter, Researcher, Simulator,
};
use crate::core::routing::AgentRoute;
use crate::core::state::SessionState;
use crate::core::types::{
    AlloyCandidate, FeaResult, Intent, ResearchPlan, SimulationLoad, ThermoResult, Verdict,
};

const FALLBACK_TEMP_K: f64 = 1000.0;
const AMBIENT_TEMP_K: f64 = 300.0;

/// Wraps a collaborator and substitutes a well-formed default when it errors.
///
/// The defaults are deliberately pessimistic: the evaluator fallback rejects,
/// the simulator fallback reports failure.
#[derive(Debug, Clone)]
pub struct WithFallback<C> {
    inner: C,
}

impl<C> WithFallback<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }
}

fn degraded(role: &str, e: &CollaboratorError) {
    tracing::warn!(collaborator = role, "Collaborator failed, using fallback: {}", e);
}

impl<C: Dispatcher> Dispatcher for WithFallback<C> {
    fn dispatch(&self, prompt: &str) -> Result<Intent, CollaboratorError> {
        Ok(self.inner.dispatch(prompt).unwrap_or_else(|e| {
            degraded("dispatcher", &e);
            Intent::new(prompt, AgentRoute::Research)
        }))
    }
}

impl<C: Researcher> Researcher for WithFallback<C> {
    fn research(&self, intent: &str) -> Result<ResearchPlan, CollaboratorError> {
        Ok(self.inner.research(intent).unwrap_or_else(|e| {
            degraded("researcher", &e);
            default_research_plan()
        }))
    }
}

impl<C: Proposer> Proposer for WithFallback<C> {
    fn propose(&self, plan: &ResearchPlan) -> Result<AlloyCandidate, CollaboratorError> {
        Ok(self.inner.propose(plan).unwrap_or_else(|e| {
            degraded("proposer", &e);
            AlloyCandidate::new(["Fe", "C"], FALLBACK_TEMP_K)
        }))
    }
}

impl<C: Evaluator> Evaluator for WithFallback<C> {
    fn evaluate(&self, candidate: &AlloyCandidate) -> Result<Verdict, CollaboratorError> {
        Ok(self.inner.evaluate(candidate).unwrap_or_else(|e| {
            degraded("evaluator", &e);
            let temperature = if candidate.target_temp_k.is_finite() && candidate.target_temp_k > 0.0
            {
                candidate.target_temp_k
            } else {
                AMBIENT_TEMP_K
            };
            Verdict {
                thermo: ThermoResult {
                    is_stable: false,
                    phases: Vec::new(),
                    temperature,
                },
                accepted: false,
            }
        }))
    }
}

impl<C: Simulator> Simulator for WithFallback<C> {
    fn simulate(
        &self,
        candidate: &AlloyCandidate,
        load: SimulationLoad,
    ) -> Result<FeaResult, CollaboratorError> {
        Ok(self.inner.simulate(candidate, load).unwrap_or_else(|e| {
            degraded("simulator", &e);
            let max_temperature_k = if load.thermal_load_k.is_finite() && load.thermal_load_k > 0.0
            {
                load.thermal_load_k
            } else {
                AMBIENT_TEMP_K
            };
            FeaResult {
                survived: false,
                failure_mode: Some("Simulation unavailable".into()),
                max_stress_mpa: 0.0,
                max_temperature_k,
            }
        }))
    }
}

impl<C: Reporter> Reporter for WithFallback<C> {
    fn report(&self, state: &SessionState) -> Result<Vec<PathBuf>, CollaboratorError> {
        Ok(self.inner.report(state).unwrap_or_else(|e| {
            degraded("reporter", &e);
            Vec::new()
        }))
    }
}
