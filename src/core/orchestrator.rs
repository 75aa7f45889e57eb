// src/core/orchestrator.rs — Pipeline controller

use thiserror::Error;

use super::refinement::RefinementLoop;
use super::routing::AgentRoute;
use super::stages::{
    DispatchStage, ResearchStage, SimulationDispatchStage, SimulationStage, Stage,
};
use super::state::{self, SessionState};
use super::types::{PipelineEvent, SimulationLoad};
use crate::backend::composition::PlanProposer;
use crate::backend::discovery::{KeywordDispatcher, StaticResearcher};
use crate::backend::fallback::WithFallback;
use crate::backend::fea::SurrogateFea;
use crate::backend::thermo::EquilibriumEvaluator;
use crate::backend::{Dispatcher, Evaluator, Proposer, Researcher, Simulator};
use crate::infra::config::Config;
use crate::infra::errors::ForgeError;

/// A halted run: which stage stopped it, why, and the last valid state.
#[derive(Error, Debug)]
#[error("pipeline stage '{stage}' failed: {error}")]
pub struct PipelineFailure {
    pub stage: &'static str,
    #[source]
    pub error: ForgeError,
    /// `None` only when the initial state could not be built.
    pub state: Option<SessionState>,
}

impl PipelineFailure {
    pub fn new(stage: &'static str, error: ForgeError, state: Option<SessionState>) -> Self {
        Self {
            stage,
            error,
            state,
        }
    }

    pub fn is_loop_exhausted(&self) -> bool {
        self.error.is_loop_exhausted()
    }

    /// Terminal message shown to the user.
    pub fn user_message(&self) -> String {
        match &self.error {
            ForgeError::LoopExhausted { attempts } => {
                format!("formulation could not stabilize after {attempts} attempts")
            }
            e => format!("pipeline stage '{}' failed: {e}", self.stage),
        }
    }
}

/// The external collaborators a pipeline runs against.
pub struct Collaborators {
    pub dispatcher: Box<dyn Dispatcher>,
    pub researcher: Box<dyn Researcher>,
    pub proposer: Box<dyn Proposer>,
    pub evaluator: Box<dyn Evaluator>,
    pub simulator: Box<dyn Simulator>,
}

impl Collaborators {
    /// Deterministic built-ins, each degrading to a safe default on error.
    pub fn builtin(config: &Config) -> Self {
        Self {
            dispatcher: Box::new(WithFallback::new(KeywordDispatcher)),
            researcher: Box::new(WithFallback::new(StaticResearcher)),
            proposer: Box::new(WithFallback::new(PlanProposer::new(
                config.composition.target_temp_k,
            ))),
            evaluator: Box::new(WithFallback::new(EquilibriumEvaluator::new(
                config.thermo.pressure_pa,
            ))),
            simulator: Box::new(WithFallback::new(SurrogateFea::new(
                config.simulation.mesh_geometry.clone(),
            ))),
        }
    }
}

/// Dispatch → Research → Refinement Loop → Simulation Dispatch → Simulation.
///
/// The order is fixed. `next_agent` is written by each stage for observers
/// but never read here.
pub struct Pipeline {
    collaborators: Collaborators,
    refinement: RefinementLoop,
    load: SimulationLoad,
    /// Optional callback for lifecycle events.
    on_progress: Option<Box<dyn Fn(PipelineEvent) + Send>>,
}

impl Pipeline {
    pub fn new(
        collaborators: Collaborators,
        refinement: RefinementLoop,
        load: SimulationLoad,
    ) -> Self {
        Self {
            collaborators,
            refinement,
            load,
            on_progress: None,
        }
    }

    /// Pipeline over the built-in collaborators, configured from `config`.
    pub fn from_config(config: &Config) -> Result<Self, ForgeError> {
        Ok(Self::new(
            Collaborators::builtin(config),
            RefinementLoop::new(config.refinement.max_iterations)?,
            SimulationLoad::from(&config.simulation),
        ))
    }

    pub fn with_progress(mut self, cb: impl Fn(PipelineEvent) + Send + 'static) -> Self {
        self.on_progress = Some(Box::new(cb));
        self
    }

    fn emit(&self, event: PipelineEvent) {
        if let Some(ref cb) = self.on_progress {
            cb(event);
        }
    }

    /// Run every stage once for `prompt`.
    pub fn run(&self, prompt: &str) -> Result<SessionState, PipelineFailure> {
        let run_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("pipeline", %run_id);
        let _enter = span.enter();

        let state = state::initialize(prompt)
            .map_err(|e| self.halt(PipelineFailure::new("initialize", e, None)))?;

        let c = &self.collaborators;
        let state = self.run_stage(&DispatchStage::new(c.dispatcher.as_ref()), state)?;
        let state = self.run_stage(&ResearchStage::new(c.researcher.as_ref()), state)?;

        let loop_stage = AgentRoute::CompositionLoop.as_str();
        self.emit(PipelineEvent::StageStarted { stage: loop_stage });
        let state = self
            .refinement
            .run(
                &state,
                c.proposer.as_ref(),
                c.evaluator.as_ref(),
                &|event| self.emit(event),
            )
            .map_err(|f| self.halt(f))?;
        self.emit(PipelineEvent::StageCompleted {
            stage: loop_stage,
            next_agent: state.next_agent,
        });

        let state = self.run_stage(&SimulationDispatchStage, state)?;
        let state = self.run_stage(
            &SimulationStage::new(c.simulator.as_ref(), self.load),
            state,
        )?;

        tracing::info!(
            loop_iterations = state.loop_iterations,
            "Pipeline complete"
        );
        Ok(state)
    }

    /// Run one stage, keeping `state` as the last good value if it fails.
    fn run_stage(
        &self,
        stage: &dyn Stage,
        state: SessionState,
    ) -> Result<SessionState, PipelineFailure> {
        let name = stage.name();
        tracing::debug!(stage = name, "Stage started");
        self.emit(PipelineEvent::StageStarted { stage: name });

        match stage.run(&state) {
            Ok(next) => {
                tracing::debug!(stage = name, next_agent = %next.next_agent, "Stage completed");
                self.emit(PipelineEvent::StageCompleted {
                    stage: name,
                    next_agent: next.next_agent,
                });
                Ok(next)
            }
            Err(e) => Err(self.halt(PipelineFailure::new(name, e, Some(state)))),
        }
    }

    fn halt(&self, failure: PipelineFailure) -> PipelineFailure {
        tracing::error!(stage = failure.stage, "Pipeline halted: {}", failure.error);
        self.emit(PipelineEvent::Halted {
            stage: failure.stage,
            reason: failure.error.to_string(),
        });
        failure
    }
}
