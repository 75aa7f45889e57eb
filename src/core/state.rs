// src/core/state.rs — Session state store
//
// The single record threaded through the pipeline. It is never mutated in
// place: `update` builds a candidate from the current state plus a patch,
// validates the whole candidate, and only then hands back a new value.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::routing::AgentRoute;
use super::schema::{self, Contract, Validation};
use super::types::{AlloyCandidate, FeaResult, ResearchPlan, ThermoResult};
use crate::infra::errors::ForgeError;

/// Shared session state for one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionState {
    pub initial_prompt: String,
    #[serde(default)]
    pub query_intent: Option<String>,
    #[serde(default)]
    pub research_plan: Option<ResearchPlan>,
    #[serde(default)]
    pub proposed_alloy: Option<AlloyCandidate>,
    #[serde(default)]
    pub final_formulation: Option<AlloyCandidate>,
    #[serde(default)]
    pub thermo_validation: Option<ThermoResult>,
    #[serde(default)]
    pub simulation_target: Option<AlloyCandidate>,
    #[serde(default)]
    pub simulation_results: Option<FeaResult>,
    #[serde(default)]
    pub next_agent: AgentRoute,
    #[serde(default)]
    pub loop_iterations: u32,
}

impl SessionState {
    /// Serialize to the dynamic value model.
    pub fn to_value(&self) -> Result<Value, ForgeError> {
        serde_json::to_value(self).map_err(|e| ForgeError::InvalidStateUpdate {
            errors: vec![format!("SessionState is not serializable: {e}")],
        })
    }

    /// Run the full SessionState contract over this value.
    pub fn validate(&self) -> Validation {
        match self.to_value() {
            Ok(value) => schema::validate(Contract::SessionState, &value),
            Err(e) => Validation {
                errors: e.violations().to_vec(),
            },
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, ForgeError> {
        serde_json::to_string_pretty(self).map_err(|e| ForgeError::Other(e.into()))
    }

    /// Parse and validate a serialized state.
    pub fn from_json(text: &str) -> Result<Self, ForgeError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| ForgeError::InvalidInput(e.to_string()))?;
        from_validated_value(value)
    }
}

/// Build a fresh state for `prompt`, routed to the discovery lead.
pub fn initialize(prompt: &str) -> Result<SessionState, ForgeError> {
    initialize_with_route(prompt, AgentRoute::DiscoveryLead.as_str())
}

/// Build a fresh state with an explicit initial routing token.
pub fn initialize_with_route(prompt: &str, route: &str) -> Result<SessionState, ForgeError> {
    if prompt.trim().is_empty() {
        return Err(ForgeError::InvalidInput(
            "initial_prompt cannot be empty".into(),
        ));
    }
    let next_agent: AgentRoute = route.parse()?;

    Ok(SessionState {
        initial_prompt: prompt.to_string(),
        query_intent: None,
        research_plan: None,
        proposed_alloy: None,
        final_formulation: None,
        thermo_validation: None,
        simulation_target: None,
        simulation_results: None,
        next_agent,
        loop_iterations: 0,
    })
}

/// Overlay `patch` on `state` and validate the result.
///
/// On failure the error carries every violation found and `state` is
/// untouched; callers keep using it as the last good value.
pub fn update(state: &SessionState, patch: StatePatch) -> Result<SessionState, ForgeError> {
    let StatePatch {
        entries,
        mut violations,
    } = patch;

    let mut merged = match state.to_value()? {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    for (key, value) in entries {
        merged.insert(key, value);
    }

    let merged = Value::Object(merged);
    violations.extend(schema::validate(Contract::SessionState, &merged).errors);
    if !violations.is_empty() {
        return Err(ForgeError::InvalidStateUpdate { errors: violations });
    }

    decode(merged)
}

fn from_validated_value(value: Value) -> Result<SessionState, ForgeError> {
    schema::validate(Contract::SessionState, &value).into_result()?;
    decode(value)
}

fn decode(value: Value) -> Result<SessionState, ForgeError> {
    serde_json::from_value(value).map_err(|e| ForgeError::InvalidStateUpdate {
        errors: vec![format!("SessionState could not be decoded: {e}")],
    })
}

/// A set of field overwrites to apply through [`update`].
///
/// Typed setters serialize their argument; a value that cannot be serialized
/// is recorded as a violation and surfaces when the patch is applied.
#[derive(Debug, Clone, Default)]
pub struct StatePatch {
    entries: Vec<(String, Value)>,
    violations: Vec<String>,
}

impl StatePatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a raw value. Used for untrusted or dynamic input.
    pub fn set(mut self, key: impl Into<String>, value: Value) -> Self {
        self.entries.push((key.into(), value));
        self
    }

    fn set_serialized<T: Serialize>(mut self, key: &str, value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(v) => self.entries.push((key.to_string(), v)),
            Err(e) => self
                .violations
                .push(format!("Field '{key}' is not serializable: {e}")),
        }
        self
    }

    pub fn query_intent(self, intent: &str) -> Self {
        self.set("query_intent", Value::String(intent.to_string()))
    }

    pub fn research_plan(self, plan: &ResearchPlan) -> Self {
        self.set_serialized("research_plan", plan)
    }

    pub fn proposed_alloy(self, candidate: &AlloyCandidate) -> Self {
        self.set_serialized("proposed_alloy", candidate)
    }

    pub fn final_formulation(self, candidate: &AlloyCandidate) -> Self {
        self.set_serialized("final_formulation", candidate)
    }

    pub fn thermo_validation(self, result: &ThermoResult) -> Self {
        self.set_serialized("thermo_validation", result)
    }

    pub fn simulation_target(self, candidate: &AlloyCandidate) -> Self {
        self.set_serialized("simulation_target", candidate)
    }

    pub fn simulation_results(self, result: &FeaResult) -> Self {
        self.set_serialized("simulation_results", result)
    }

    pub fn next_agent(self, route: AgentRoute) -> Self {
        self.next_agent_token(route.as_str())
    }

    /// Routing token as produced by a collaborator; checked on apply.
    pub fn next_agent_token(self, token: &str) -> Self {
        self.set("next_agent", Value::String(token.to_string()))
    }

    pub fn loop_iterations(self, n: u32) -> Self {
        self.set("loop_iterations", Value::from(n))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.violations.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn tial_v(temp: f64) -> AlloyCandidate {
        AlloyCandidate::new(["Ti", "Al", "V"], temp)
    }

    fn populated() -> SessionState {
        let s = initialize("Design a high-temp alloy").unwrap();
        update(
            &s,
            StatePatch::new()
                .query_intent("aerospace alloy")
                .research_plan(&ResearchPlan {
                    required_properties: vec!["strength".into()],
                    suggested_elements: vec!["Ti".into(), "Al".into()],
                    thermodynamic_constraints: "stable below 1000K".into(),
                })
                .proposed_alloy(&tial_v(900.0))
                .final_formulation(&tial_v(900.0))
                .thermo_validation(&ThermoResult {
                    is_stable: true,
                    phases: vec!["ALPHA".into(), "BETA".into()],
                    temperature: 900.0,
                })
                .simulation_target(&tial_v(900.0))
                .simulation_results(&FeaResult {
                    survived: false,
                    failure_mode: Some("Yield Criteria Exceeded".into()),
                    max_stress_mpa: 975.0,
                    max_temperature_k: 1500.0,
                })
                .next_agent(AgentRoute::Complete)
                .loop_iterations(2),
        )
        .unwrap()
    }

    // ─── initialize ─────────────────────────────────────────────

    #[test]
    fn test_initialize_with_defaults() {
        let s = initialize("Test prompt").unwrap();
        assert_eq!(s.initial_prompt, "Test prompt");
        assert_eq!(s.next_agent, AgentRoute::DiscoveryLead);
        assert_eq!(s.loop_iterations, 0);
        assert!(s.query_intent.is_none());
        assert!(s.research_plan.is_none());
        assert!(s.proposed_alloy.is_none());
        assert!(s.final_formulation.is_none());
        assert!(s.thermo_validation.is_none());
        assert!(s.simulation_target.is_none());
        assert!(s.simulation_results.is_none());
        assert!(s.validate().ok());
    }

    #[test]
    fn test_initialize_rejects_blank_prompts() {
        for prompt in ["", "   ", "\n\t"] {
            let err = initialize(prompt).unwrap_err();
            assert!(matches!(err, ForgeError::InvalidInput(_)), "{prompt:?}");
        }
    }

    #[test]
    fn test_initialize_with_route() {
        let s = initialize_with_route("p", "research").unwrap();
        assert_eq!(s.next_agent, AgentRoute::Research);
        let err = initialize_with_route("p", "bogus").unwrap_err();
        assert!(matches!(err, ForgeError::InvalidInput(_)));
    }

    #[test]
    fn test_initialized_state_serializes_every_field() {
        let v = initialize("p").unwrap().to_value().unwrap();
        let keys: Vec<&str> = v.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, schema::SESSION_FIELDS.to_vec());
        assert!(v["research_plan"].is_null());
        assert_eq!(v["next_agent"], json!("discovery_lead"));
    }

    // ─── update ─────────────────────────────────────────────────

    #[test]
    fn test_update_single_field() {
        let s = initialize("p").unwrap();
        let next = update(&s, StatePatch::new().query_intent("alloys")).unwrap();
        assert_eq!(next.query_intent.as_deref(), Some("alloys"));
        assert_eq!(next.initial_prompt, "p");
    }

    #[test]
    fn test_update_preserves_original() {
        let s = initialize("p").unwrap();
        let before = s.clone();
        let _ = update(&s, StatePatch::new().next_agent(AgentRoute::Research)).unwrap();
        assert_eq!(s, before);
    }

    #[test]
    fn test_update_rejects_unknown_route_atomically() {
        let s = populated();
        let before = s.clone();
        let err = update(
            &s,
            StatePatch::new()
                .query_intent("changed")
                .next_agent_token("not_a_real_agent"),
        )
        .unwrap_err();
        assert_eq!(err.violations().len(), 1);
        assert!(err.violations()[0].contains("not_a_real_agent"));
        assert_eq!(s, before);
    }

    #[test]
    fn test_update_reports_all_violations() {
        let s = initialize("p").unwrap();
        let err = update(
            &s,
            StatePatch::new()
                .set("initial_prompt", json!(""))
                .set("loop_iterations", json!(-1))
                .proposed_alloy(&AlloyCandidate::new(["Xx"], 0.0)),
        )
        .unwrap_err();
        assert_eq!(err.violations().len(), 4, "{:?}", err.violations());
    }

    #[test]
    fn test_update_rejects_non_finite_numbers() {
        let s = initialize("p").unwrap();
        let err = update(
            &s,
            StatePatch::new().proposed_alloy(&AlloyCandidate::new(["Ti"], f64::NAN)),
        )
        .unwrap_err();
        assert!(err
            .violations()
            .iter()
            .any(|e| e.contains("target_temp_K must be a number")));
    }

    #[test]
    fn test_update_rejects_unknown_keys() {
        let s = initialize("p").unwrap();
        let err = update(&s, StatePatch::new().set("callback", json!("fn"))).unwrap_err();
        assert_eq!(err.violations().to_vec(), vec!["Unknown field: callback".to_string()]);
    }

    #[test]
    fn test_update_rejects_unknown_nested_keys() {
        let s = initialize("p").unwrap();
        let before = s.clone();
        let err = update(
            &s,
            StatePatch::new().set(
                "proposed_alloy",
                json!({"matrix": ["Ti"], "target_temp_K": 900, "note": "keep me"}),
            ),
        )
        .unwrap_err();
        assert_eq!(
            err.violations().to_vec(),
            vec!["proposed_alloy: Unknown field: note".to_string()]
        );
        assert_eq!(s, before);
    }

    #[test]
    fn test_update_reports_oversized_loop_counter_as_violation() {
        let s = initialize("p").unwrap();
        let err = update(
            &s,
            StatePatch::new().set("loop_iterations", json!(5_000_000_000u64)),
        )
        .unwrap_err();
        assert_eq!(err.violations().len(), 1);
        assert!(err.violations()[0].starts_with("loop_iterations must be at most"));
    }

    #[test]
    fn test_update_null_clears_optional_field() {
        let s = populated();
        let next = update(&s, StatePatch::new().set("proposed_alloy", Value::Null)).unwrap();
        assert!(next.proposed_alloy.is_none());
        assert!(next.final_formulation.is_some());
    }

    #[test]
    fn test_empty_patch_is_identity() {
        let s = populated();
        let patch = StatePatch::new();
        assert!(patch.is_empty());
        assert_eq!(update(&s, patch).unwrap(), s);
    }

    #[test]
    fn test_patch_keys_in_insertion_order() {
        let patch = StatePatch::new()
            .query_intent("x")
            .next_agent(AgentRoute::Research);
        assert_eq!(patch.keys().collect::<Vec<_>>(), vec!["query_intent", "next_agent"]);
    }

    // ─── serialization ──────────────────────────────────────────

    #[test]
    fn test_round_trip_preserves_state() {
        for state in [initialize("p").unwrap(), populated()] {
            let text = state.to_json_pretty().unwrap();
            let parsed = SessionState::from_json(&text).unwrap();
            assert!(parsed.validate().ok());
            assert_eq!(parsed, state);
        }
    }

    #[test]
    fn test_from_json_accepts_missing_optionals() {
        let s = SessionState::from_json(r#"{"initial_prompt":"p"}"#).unwrap();
        assert_eq!(s.next_agent, AgentRoute::DiscoveryLead);
        assert_eq!(s.loop_iterations, 0);
    }

    #[test]
    fn test_from_json_rejects_invalid_state() {
        let err = SessionState::from_json(r#"{"initial_prompt":"p","next_agent":"x"}"#)
            .unwrap_err();
        assert!(matches!(err, ForgeError::InvalidStateUpdate { .. }));
        assert!(SessionState::from_json("not json").is_err());
    }
}
