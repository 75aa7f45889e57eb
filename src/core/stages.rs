// src/core/stages.rs — Pipeline stages
//
// Each stage calls exactly one collaborator and folds the result back into
// the session through a validated update. A stage never touches the state it
// was handed; it returns the next one.

use super::routing::AgentRoute;
use super::state::{update, SessionState, StatePatch};
use super::types::{AlloyCandidate, SimulationLoad};
use crate::backend::{CollaboratorError, Dispatcher, Evaluator, Proposer, Researcher, Simulator};
use crate::infra::errors::ForgeError;

/// Uniform unit of work: `(state) -> state`.
pub trait Stage {
    /// Routing token of the logical step this stage implements.
    fn name(&self) -> &'static str;

    fn run(&self, state: &SessionState) -> Result<SessionState, ForgeError>;
}

fn call_failed(stage: &str, e: CollaboratorError) -> ForgeError {
    ForgeError::Collaborator {
        stage: stage.to_string(),
        message: e.message,
    }
}

/// A collaborator answered, but the answer does not fit the session contract.
fn rejected_output(stage: &str, e: ForgeError) -> ForgeError {
    match e {
        ForgeError::InvalidStateUpdate { errors } => ForgeError::Collaborator {
            stage: stage.to_string(),
            message: format!("returned invalid output: {}", errors.join("; ")),
        },
        other => other,
    }
}

fn missing(stage: &str, field: &str) -> ForgeError {
    ForgeError::InvalidInput(format!("stage '{stage}' requires {field} to be set"))
}

// ─── Discovery ──────────────────────────────────────────────────

pub struct DispatchStage<'a> {
    dispatcher: &'a dyn Dispatcher,
}

impl<'a> DispatchStage<'a> {
    pub fn new(dispatcher: &'a dyn Dispatcher) -> Self {
        Self { dispatcher }
    }
}

impl Stage for DispatchStage<'_> {
    fn name(&self) -> &'static str {
        AgentRoute::DiscoveryLead.as_str()
    }

    fn run(&self, state: &SessionState) -> Result<SessionState, ForgeError> {
        let intent = self
            .dispatcher
            .dispatch(&state.initial_prompt)
            .map_err(|e| call_failed(self.name(), e))?;
        update(
            state,
            StatePatch::new()
                .query_intent(&intent.query)
                .next_agent_token(&intent.entry_route),
        )
        .map_err(|e| rejected_output(self.name(), e))
    }
}

pub struct ResearchStage<'a> {
    researcher: &'a dyn Researcher,
}

impl<'a> ResearchStage<'a> {
    pub fn new(researcher: &'a dyn Researcher) -> Self {
        Self { researcher }
    }
}

impl Stage for ResearchStage<'_> {
    fn name(&self) -> &'static str {
        AgentRoute::Research.as_str()
    }

    fn run(&self, state: &SessionState) -> Result<SessionState, ForgeError> {
        let intent = state
            .query_intent
            .as_deref()
            .unwrap_or(&state.initial_prompt);
        let plan = self
            .researcher
            .research(intent)
            .map_err(|e| call_failed(self.name(), e))?;
        update(
            state,
            StatePatch::new()
                .research_plan(&plan)
                .next_agent(AgentRoute::CompositionLoop),
        )
        .map_err(|e| rejected_output(self.name(), e))
    }
}

// ─── Composition ────────────────────────────────────────────────

/// Generator step of the refinement loop.
pub struct ProposeStage<'a> {
    proposer: &'a dyn Proposer,
}

impl<'a> ProposeStage<'a> {
    pub fn new(proposer: &'a dyn Proposer) -> Self {
        Self { proposer }
    }

    /// Propose from the current plan, returning the new state and the candidate.
    pub fn propose(
        &self,
        state: &SessionState,
    ) -> Result<(SessionState, AlloyCandidate), ForgeError> {
        let plan = state
            .research_plan
            .as_ref()
            .ok_or_else(|| missing(self.name(), "research_plan"))?;
        let candidate = self
            .proposer
            .propose(plan)
            .map_err(|e| call_failed(self.name(), e))?;
        let next = update(state, StatePatch::new().proposed_alloy(&candidate))
            .map_err(|e| rejected_output(self.name(), e))?;
        Ok((next, candidate))
    }
}

impl Stage for ProposeStage<'_> {
    fn name(&self) -> &'static str {
        AgentRoute::CompositionLoop.as_str()
    }

    fn run(&self, state: &SessionState) -> Result<SessionState, ForgeError> {
        self.propose(state).map(|(next, _)| next)
    }
}

/// Critic step of the refinement loop.
pub struct EvaluateStage<'a> {
    evaluator: &'a dyn Evaluator,
}

impl<'a> EvaluateStage<'a> {
    pub fn new(evaluator: &'a dyn Evaluator) -> Self {
        Self { evaluator }
    }

    /// Record the thermodynamic result and report whether the critic accepted.
    pub fn judge(&self, state: &SessionState) -> Result<(SessionState, bool), ForgeError> {
        let candidate = state
            .proposed_alloy
            .as_ref()
            .ok_or_else(|| missing(self.name(), "proposed_alloy"))?;
        let verdict = self
            .evaluator
            .evaluate(candidate)
            .map_err(|e| call_failed(self.name(), e))?;
        let next = update(state, StatePatch::new().thermo_validation(&verdict.thermo))
            .map_err(|e| rejected_output(self.name(), e))?;
        Ok((next, verdict.accepted))
    }
}

impl Stage for EvaluateStage<'_> {
    fn name(&self) -> &'static str {
        AgentRoute::CompositionLoop.as_str()
    }

    fn run(&self, state: &SessionState) -> Result<SessionState, ForgeError> {
        self.judge(state).map(|(next, _)| next)
    }
}

// ─── Simulation ─────────────────────────────────────────────────

/// Hands the accepted formulation to the simulator. No collaborator call.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulationDispatchStage;

impl Stage for SimulationDispatchStage {
    fn name(&self) -> &'static str {
        AgentRoute::SimulationLead.as_str()
    }

    fn run(&self, state: &SessionState) -> Result<SessionState, ForgeError> {
        let formulation = state
            .final_formulation
            .as_ref()
            .ok_or_else(|| missing(self.name(), "final_formulation"))?;
        update(
            state,
            StatePatch::new()
                .simulation_target(formulation)
                .next_agent(AgentRoute::Fea),
        )
    }
}

pub struct SimulationStage<'a> {
    simulator: &'a dyn Simulator,
    load: SimulationLoad,
}

impl<'a> SimulationStage<'a> {
    pub fn new(simulator: &'a dyn Simulator, load: SimulationLoad) -> Self {
        Self { simulator, load }
    }
}

impl Stage for SimulationStage<'_> {
    fn name(&self) -> &'static str {
        AgentRoute::Fea.as_str()
    }

    fn run(&self, state: &SessionState) -> Result<SessionState, ForgeError> {
        let target = state
            .simulation_target
            .as_ref()
            .ok_or_else(|| missing(self.name(), "simulation_target"))?;
        let results = self
            .simulator
            .simulate(target, self.load)
            .map_err(|e| call_failed(self.name(), e))?;
        update(
            state,
            StatePatch::new()
                .simulation_results(&results)
                .next_agent(AgentRoute::Complete),
        )
        .map_err(|e| rejected_output(self.name(), e))
    }
}
