// src/backend/discovery.rs — Built-in dispatch and research collaborators

use super::{CollaboratorError, Dispatcher, Researcher};
use crate::core::routing::AgentRoute;
use crate::core::types::{Intent, ResearchPlan};

/// Takes the prompt verbatim as the intent and always enters at research.
#[derive(Debug, Clone, Default)]
pub struct KeywordDispatcher;

impl Dispatcher for KeywordDispatcher {
    fn dispatch(&self, prompt: &str) -> Result<Intent, CollaboratorError> {
        let query = prompt.trim();
        if query.is_empty() {
            return Err(CollaboratorError::new("prompt has no content to dispatch"));
        }
        tracing::debug!(intent = query, "Dispatching to research");
        Ok(Intent::new(query, AgentRoute::Research))
    }
}

/// Answers every intent with the same titanium-aluminide plan.
#[derive(Debug, Clone, Default)]
pub struct StaticResearcher;

impl Researcher for StaticResearcher {
    fn research(&self, intent: &str) -> Result<ResearchPlan, CollaboratorError> {
        if intent.trim().is_empty() {
            return Err(CollaboratorError::new("empty research intent"));
        }
        tracing::debug!(intent, "Synthesizing research plan");
        Ok(default_research_plan())
    }
}

/// Plan used by the static researcher and as the research fallback.
pub fn default_research_plan() -> ResearchPlan {
    ResearchPlan {
        required_properties: vec![
            "high_tensile_strength".into(),
            "oxidation_resistance".into(),
            "low_weight".into(),
        ],
        suggested_elements: vec!["Ti".into(), "Al".into(), "V".into()],
        thermodynamic_constraints: "Maintain phase stability below 1000K.".into(),
    }
}
