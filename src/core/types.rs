// src/core/types.rs — Core domain types

use serde::{Deserialize, Serialize};

use super::routing::AgentRoute;

/// Research findings that steer candidate generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchPlan {
    pub required_properties: Vec<String>,
    pub suggested_elements: Vec<String>,
    pub thermodynamic_constraints: String,
}

/// An alloy formulation: constituent elements plus an operating temperature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlloyCandidate {
    pub matrix: Vec<String>,
    #[serde(rename = "target_temp_K")]
    pub target_temp_k: f64,
}

impl AlloyCandidate {
    pub fn new<S: Into<String>>(matrix: impl IntoIterator<Item = S>, target_temp_k: f64) -> Self {
        Self {
            matrix: matrix.into_iter().map(Into::into).collect(),
            target_temp_k,
        }
    }
}

/// Phase-equilibrium outcome for one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThermoResult {
    pub is_stable: bool,
    pub phases: Vec<String>,
    pub temperature: f64,
}

/// Finite-element outcome for the simulated component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaResult {
    pub survived: bool,
    pub failure_mode: Option<String>,
    pub max_stress_mpa: f64,
    pub max_temperature_k: f64,
}

/// Output of the dispatch collaborator.
///
/// `entry_route` is kept as a raw token so an out-of-table value reaches the
/// validator instead of being silently coerced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub query: String,
    pub entry_route: String,
}

impl Intent {
    pub fn new(query: impl Into<String>, entry_route: AgentRoute) -> Self {
        Self {
            query: query.into(),
            entry_route: entry_route.as_str().to_string(),
        }
    }
}

/// Output of the evaluator collaborator: the thermodynamic result plus the
/// accept/reject decision. The two are independent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub thermo: ThermoResult,
    pub accepted: bool,
}

/// Loads applied to the component during simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationLoad {
    pub thermal_load_k: f64,
    pub structural_load_mpa: f64,
}

impl Default for SimulationLoad {
    fn default() -> Self {
        Self {
            thermal_load_k: 1500.0,
            structural_load_mpa: 650.0,
        }
    }
}

impl From<&crate::infra::config::SimulationConfig> for SimulationLoad {
    fn from(cfg: &crate::infra::config::SimulationConfig) -> Self {
        Self {
            thermal_load_k: cfg.thermal_load_k,
            structural_load_mpa: cfg.structural_load_mpa,
        }
    }
}

/// Lifecycle events emitted by the pipeline for external observers.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    StageStarted {
        stage: &'static str,
    },
    StageCompleted {
        stage: &'static str,
        next_agent: AgentRoute,
    },
    AttemptStarted {
        attempt: u32,
        max_attempts: u32,
    },
    AttemptRejected {
        attempt: u32,
        phases: Vec<String>,
    },
    Accepted {
        attempt: u32,
    },
    Exhausted {
        attempts: u32,
    },
    Halted {
        stage: &'static str,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloy_candidate_uses_kelvin_suffix_key() {
        let c = AlloyCandidate::new(["Ti", "Al", "V"], 900.0);
        let v = serde_json::to_value(&c).unwrap();
        assert_eq!(v["target_temp_K"], serde_json::json!(900.0));
        assert!(v.get("target_temp_k").is_none());
    }

    #[test]
    fn test_alloy_candidate_accepts_integer_temperature() {
        let c: AlloyCandidate =
            serde_json::from_str(r#"{"matrix":["Ti"],"target_temp_K":900}"#).unwrap();
        assert_eq!(c, AlloyCandidate::new(["Ti"], 900.0));
    }

    #[test]
    fn test_fea_result_serializes_null_failure_mode() {
        let r = FeaResult {
            survived: true,
            failure_mode: None,
            max_stress_mpa: 0.0,
            max_temperature_k: 300.0,
        };
        let v = serde_json::to_value(&r).unwrap();
        assert!(v.get("failure_mode").unwrap().is_null());
    }

    #[test]
    fn test_intent_keeps_route_token() {
        let i = Intent::new("find an alloy", AgentRoute::Research);
        assert_eq!(i.entry_route, "research");
    }

    #[test]
    fn test_simulation_load_from_config() {
        let cfg = crate::infra::config::SimulationConfig {
            mesh_geometry: "disk".into(),
            thermal_load_k: 1200.0,
            structural_load_mpa: 400.0,
        };
        let load = SimulationLoad::from(&cfg);
        assert!((load.thermal_load_k - 1200.0).abs() < f64::EPSILON);
        assert!((load.structural_load_mpa - 400.0).abs() < f64::EPSILON);
    }
}
