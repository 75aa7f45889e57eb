// src/core/schema.rs — Contract validation over serializable values
//
// Every check is structural-then-semantic (presence, type, domain) and all
// violations are accumulated. Nothing here panics on malformed input: the
// malformation is the report.

use serde_json::{Map, Value};

use super::elements::is_element;
use super::routing::AgentRoute;
use crate::infra::errors::ForgeError;

/// Named contracts a value can be checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contract {
    ResearchPlan,
    AlloyCandidate,
    ThermoResult,
    FeaResult,
    SessionState,
}

impl Contract {
    pub fn name(&self) -> &'static str {
        match self {
            Contract::ResearchPlan => "ResearchPlan",
            Contract::AlloyCandidate => "AlloyCandidate",
            Contract::ThermoResult => "ThermoResult",
            Contract::FeaResult => "FEAResult",
            Contract::SessionState => "SessionState",
        }
    }
}

/// Outcome of a validation pass: ok iff no violations were recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
    pub errors: Vec<String>,
}

impl Validation {
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_result(self) -> Result<(), ForgeError> {
        if self.ok() {
            Ok(())
        } else {
            Err(ForgeError::InvalidStateUpdate {
                errors: self.errors,
            })
        }
    }
}

/// SessionState fields, in serialization order.
pub const SESSION_FIELDS: [&str; 10] = [
    "initial_prompt",
    "query_intent",
    "research_plan",
    "proposed_alloy",
    "final_formulation",
    "thermo_validation",
    "simulation_target",
    "simulation_results",
    "next_agent",
    "loop_iterations",
];

const RESEARCH_PLAN_FIELDS: [&str; 3] = [
    "required_properties",
    "suggested_elements",
    "thermodynamic_constraints",
];
const ALLOY_CANDIDATE_FIELDS: [&str; 2] = ["matrix", "target_temp_K"];
const THERMO_RESULT_FIELDS: [&str; 3] = ["is_stable", "phases", "temperature"];
const FEA_RESULT_FIELDS: [&str; 4] = [
    "survived",
    "failure_mode",
    "max_stress_mpa",
    "max_temperature_k",
];

/// Check `value` against `contract`.
pub fn validate(contract: Contract, value: &Value) -> Validation {
    let mut errors = Vec::new();
    match value.as_object() {
        None => errors.push(format!(
            "{} must be a map, got: {}",
            contract.name(),
            type_name(value)
        )),
        Some(map) => match contract {
            Contract::ResearchPlan => research_plan(map, &mut errors),
            Contract::AlloyCandidate => alloy_candidate(map, &mut errors),
            Contract::ThermoResult => thermo_result(map, &mut errors),
            Contract::FeaResult => fea_result(map, &mut errors),
            Contract::SessionState => session_state(map, &mut errors),
        },
    }
    Validation { errors }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}

fn research_plan(map: &Map<String, Value>, errors: &mut Vec<String>) {
    match map.get("required_properties") {
        None => errors.push("Missing required field: required_properties".into()),
        Some(Value::Array(items)) if items.is_empty() => {
            errors.push("required_properties cannot be empty".into())
        }
        Some(Value::Array(items)) => {
            if !items.iter().all(Value::is_string) {
                errors.push("All required_properties must be strings".into());
            }
        }
        Some(_) => errors.push("required_properties must be a list".into()),
    }

    match map.get("suggested_elements") {
        None => errors.push("Missing required field: suggested_elements".into()),
        Some(Value::Array(items)) => element_symbols(items, errors),
        Some(_) => errors.push("suggested_elements must be a list".into()),
    }

    match map.get("thermodynamic_constraints") {
        None => errors.push("Missing required field: thermodynamic_constraints".into()),
        Some(Value::String(s)) if s.trim().is_empty() => {
            errors.push("thermodynamic_constraints cannot be empty".into())
        }
        Some(Value::String(_)) => {}
        Some(_) => errors.push("thermodynamic_constraints must be a string".into()),
    }

    known_fields(map, &RESEARCH_PLAN_FIELDS, errors);
}

fn alloy_candidate(map: &Map<String, Value>, errors: &mut Vec<String>) {
    match map.get("matrix") {
        None => errors.push("Missing required field: matrix".into()),
        Some(Value::Array(items)) if items.is_empty() => {
            errors.push("matrix cannot be empty".into())
        }
        Some(Value::Array(items)) => element_symbols(items, errors),
        Some(_) => errors.push("matrix must be a list".into()),
    }
    positive_number(map, "target_temp_K", errors);
    known_fields(map, &ALLOY_CANDIDATE_FIELDS, errors);
}

fn thermo_result(map: &Map<String, Value>, errors: &mut Vec<String>) {
    boolean(map, "is_stable", errors);

    match map.get("phases") {
        None => errors.push("Missing required field: phases".into()),
        Some(Value::Array(items)) => {
            if !items.iter().all(Value::is_string) {
                errors.push("All phases must be strings".into());
            }
        }
        Some(_) => errors.push("phases must be a list".into()),
    }

    positive_number(map, "temperature", errors);
    known_fields(map, &THERMO_RESULT_FIELDS, errors);
}

fn fea_result(map: &Map<String, Value>, errors: &mut Vec<String>) {
    boolean(map, "survived", errors);

    match map.get("failure_mode") {
        None => errors.push("Missing required field: failure_mode".into()),
        Some(Value::Null) | Some(Value::String(_)) => {}
        Some(_) => errors.push("failure_mode must be a string or null".into()),
    }

    match map.get("max_stress_mpa") {
        None => errors.push("Missing required field: max_stress_mpa".into()),
        Some(v) => match v.as_f64() {
            None => errors.push("max_stress_mpa must be a number".into()),
            Some(n) if n < 0.0 => errors.push("max_stress_mpa must be non-negative".into()),
            Some(_) => {}
        },
    }

    positive_number(map, "max_temperature_k", errors);
    known_fields(map, &FEA_RESULT_FIELDS, errors);
}

fn session_state(map: &Map<String, Value>, errors: &mut Vec<String>) {
    match map.get("initial_prompt") {
        None => errors.push("Missing required field: initial_prompt".into()),
        Some(Value::String(s)) if s.trim().is_empty() => {
            errors.push("initial_prompt cannot be empty".into())
        }
        Some(Value::String(_)) => {}
        Some(_) => errors.push("initial_prompt must be a string".into()),
    }

    match map.get("query_intent") {
        None | Some(Value::Null) | Some(Value::String(_)) => {}
        Some(_) => errors.push("query_intent must be a string or null".into()),
    }

    let nested = [
        ("research_plan", Contract::ResearchPlan),
        ("proposed_alloy", Contract::AlloyCandidate),
        ("final_formulation", Contract::AlloyCandidate),
        ("thermo_validation", Contract::ThermoResult),
        ("simulation_target", Contract::AlloyCandidate),
        ("simulation_results", Contract::FeaResult),
    ];
    for (field, contract) in nested {
        match map.get(field) {
            None | Some(Value::Null) => {}
            Some(value) => {
                for e in validate(contract, value).errors {
                    errors.push(format!("{field}: {e}"));
                }
            }
        }
    }

    if let Some(v) = map.get("next_agent") {
        match v {
            Value::String(token) => {
                if token.parse::<AgentRoute>().is_err() {
                    errors.push(format!(
                        "next_agent must be one of [{}], got: {token}",
                        AgentRoute::token_list()
                    ));
                }
            }
            _ => errors.push("next_agent must be a string".into()),
        }
    }

    if let Some(v) = map.get("loop_iterations") {
        match v {
            Value::Number(n) => match n.as_u64() {
                Some(count) if count <= u64::from(u32::MAX) => {}
                Some(_) => errors.push(format!(
                    "loop_iterations must be at most {}",
                    u32::MAX
                )),
                None if n.is_i64() => errors.push("loop_iterations must be non-negative".into()),
                None => errors.push("loop_iterations must be an integer".into()),
            },
            _ => errors.push("loop_iterations must be an integer".into()),
        }
    }

    known_fields(map, &SESSION_FIELDS, errors);
}

/// Flag every key outside `fields`, in input order.
fn known_fields(map: &Map<String, Value>, fields: &[&str], errors: &mut Vec<String>) {
    for key in map.keys() {
        if !fields.contains(&key.as_str()) {
            errors.push(format!("Unknown field: {key}"));
        }
    }
}

fn element_symbols(items: &[Value], errors: &mut Vec<String>) {
    for item in items {
        match item {
            Value::String(s) if is_element(s) => {}
            Value::String(s) => errors.push(format!("Invalid element symbol: {s}")),
            other => errors.push(format!(
                "Element must be a string, got {}: {other}",
                type_name(other)
            )),
        }
    }
}

fn boolean(map: &Map<String, Value>, field: &str, errors: &mut Vec<String>) {
    match map.get(field) {
        None => errors.push(format!("Missing required field: {field}")),
        Some(Value::Bool(_)) => {}
        Some(_) => errors.push(format!("{field} must be a boolean")),
    }
}

fn positive_number(map: &Map<String, Value>, field: &str, errors: &mut Vec<String>) {
    match map.get(field) {
        None => errors.push(format!("Missing required field: {field}")),
        Some(v) => match v.as_f64() {
            None => errors.push(format!("{field} must be a number")),
            Some(n) if n <= 0.0 => errors.push(format!("{field} must be positive")),
            Some(_) => {}
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_plan() -> Value {
        json!({
            "required_properties": ["strength", "heat_resistance"],
            "suggested_elements": ["Ti", "Al"],
            "thermodynamic_constraints": "stable below 1000K"
        })
    }

    fn valid_fea() -> Value {
        json!({
            "survived": true,
            "failure_mode": null,
            "max_stress_mpa": 450.0,
            "max_temperature_k": 920.0
        })
    }

    fn has(v: &Validation, needle: &str) -> bool {
        v.errors.iter().any(|e| e.contains(needle))
    }

    // ─── ResearchPlan ───────────────────────────────────────────

    #[test]
    fn test_valid_research_plan() {
        let v = validate(Contract::ResearchPlan, &valid_plan());
        assert!(v.ok(), "{:?}", v.errors);
    }

    #[test]
    fn test_research_plan_missing_every_field() {
        let v = validate(Contract::ResearchPlan, &json!({}));
        assert_eq!(v.errors.len(), 3);
        assert!(has(&v, "required_properties"));
        assert!(has(&v, "suggested_elements"));
        assert!(has(&v, "thermodynamic_constraints"));
    }

    #[test]
    fn test_research_plan_empty_and_mistyped() {
        let v = validate(
            Contract::ResearchPlan,
            &json!({
                "required_properties": [],
                "suggested_elements": "Ti",
                "thermodynamic_constraints": "   "
            }),
        );
        assert_eq!(
            v.errors,
            vec![
                "required_properties cannot be empty",
                "suggested_elements must be a list",
                "thermodynamic_constraints cannot be empty",
            ]
        );
    }

    #[test]
    fn test_research_plan_non_string_property() {
        let mut plan = valid_plan();
        plan["required_properties"] = json!(["strength", 7]);
        let v = validate(Contract::ResearchPlan, &plan);
        assert!(has(&v, "All required_properties must be strings"));
    }

    #[test]
    fn test_research_plan_empty_suggestions_allowed() {
        let mut plan = valid_plan();
        plan["suggested_elements"] = json!([]);
        assert!(validate(Contract::ResearchPlan, &plan).ok());
    }

    // ─── Element symbols ────────────────────────────────────────

    #[test]
    fn test_known_symbols_pass() {
        let v = validate(
            Contract::AlloyCandidate,
            &json!({"matrix": ["Ti", "Al", "V"], "target_temp_K": 900}),
        );
        assert!(v.ok());
    }

    #[test]
    fn test_unknown_symbols_are_each_named() {
        let v = validate(
            Contract::AlloyCandidate,
            &json!({"matrix": ["Xx", "Ti", "Zz", 22], "target_temp_K": 900}),
        );
        assert_eq!(v.errors.len(), 3);
        assert!(has(&v, "Invalid element symbol: Xx"));
        assert!(has(&v, "Invalid element symbol: Zz"));
        assert!(has(&v, "got number: 22"));
    }

    #[test]
    fn test_symbol_check_is_case_sensitive() {
        let v = validate(
            Contract::AlloyCandidate,
            &json!({"matrix": ["ti"], "target_temp_K": 900}),
        );
        assert!(has(&v, "Invalid element symbol: ti"));
    }

    // ─── AlloyCandidate ─────────────────────────────────────────

    #[test]
    fn test_alloy_float_temperature() {
        let v = validate(
            Contract::AlloyCandidate,
            &json!({"matrix": ["Fe", "C"], "target_temp_K": 873.15}),
        );
        assert!(v.ok());
    }

    #[test]
    fn test_alloy_empty_matrix_and_zero_temperature() {
        let v = validate(
            Contract::AlloyCandidate,
            &json!({"matrix": [], "target_temp_K": 0}),
        );
        assert_eq!(
            v.errors,
            vec!["matrix cannot be empty", "target_temp_K must be positive"]
        );
    }

    #[test]
    fn test_alloy_mistyped_fields() {
        let v = validate(
            Contract::AlloyCandidate,
            &json!({"matrix": "TiAlV", "target_temp_K": "hot"}),
        );
        assert_eq!(
            v.errors,
            vec!["matrix must be a list", "target_temp_K must be a number"]
        );
    }

    #[test]
    fn test_alloy_boolean_is_not_a_number() {
        let v = validate(
            Contract::AlloyCandidate,
            &json!({"matrix": ["Ti"], "target_temp_K": true}),
        );
        assert!(has(&v, "target_temp_K must be a number"));
    }

    // ─── ThermoResult ───────────────────────────────────────────

    #[test]
    fn test_thermo_empty_phases_allowed() {
        let v = validate(
            Contract::ThermoResult,
            &json!({"is_stable": false, "phases": [], "temperature": 1500}),
        );
        assert!(v.ok());
    }

    #[test]
    fn test_thermo_all_violations_reported() {
        let v = validate(
            Contract::ThermoResult,
            &json!({"is_stable": "yes", "phases": ["ALPHA", 1], "temperature": -5}),
        );
        assert_eq!(
            v.errors,
            vec![
                "is_stable must be a boolean",
                "All phases must be strings",
                "temperature must be positive",
            ]
        );
    }

    // ─── FEAResult ──────────────────────────────────────────────

    #[test]
    fn test_fea_valid_and_zero_stress() {
        assert!(validate(Contract::FeaResult, &valid_fea()).ok());
        let mut fea = valid_fea();
        fea["max_stress_mpa"] = json!(0);
        assert!(validate(Contract::FeaResult, &fea).ok());
    }

    #[test]
    fn test_fea_failure_mode_must_be_present() {
        let mut fea = valid_fea();
        fea.as_object_mut().unwrap().remove("failure_mode");
        let v = validate(Contract::FeaResult, &fea);
        assert_eq!(v.errors, vec!["Missing required field: failure_mode"]);
    }

    #[test]
    fn test_fea_survived_with_failure_mode_not_enforced() {
        let mut fea = valid_fea();
        fea["failure_mode"] = json!("Yield Criteria Exceeded");
        assert!(validate(Contract::FeaResult, &fea).ok());
    }

    #[test]
    fn test_fea_bad_values() {
        let v = validate(
            Contract::FeaResult,
            &json!({
                "survived": 1,
                "failure_mode": 5,
                "max_stress_mpa": -1.0,
                "max_temperature_k": 0
            }),
        );
        assert_eq!(v.errors.len(), 4);
        assert!(has(&v, "max_stress_mpa must be non-negative"));
        assert!(has(&v, "max_temperature_k must be positive"));
    }

    // ─── SessionState ───────────────────────────────────────────

    fn complete_state() -> Value {
        json!({
            "initial_prompt": "Design a high-temp alloy",
            "query_intent": "aerospace alloy",
            "research_plan": valid_plan(),
            "proposed_alloy": {"matrix": ["Ti", "Al", "V"], "target_temp_K": 900},
            "final_formulation": {"matrix": ["Ti", "Al", "V"], "target_temp_K": 900},
            "thermo_validation": {"is_stable": true, "phases": ["alpha", "beta"], "temperature": 900},
            "simulation_target": {"matrix": ["Ti", "Al", "V"], "target_temp_K": 900},
            "simulation_results": valid_fea(),
            "next_agent": "complete",
            "loop_iterations": 2
        })
    }

    #[test]
    fn test_valid_minimal_and_complete_state() {
        let minimal = json!({
            "initial_prompt": "Test prompt",
            "next_agent": "discovery_lead",
            "loop_iterations": 0
        });
        assert!(validate(Contract::SessionState, &minimal).ok());
        let v = validate(Contract::SessionState, &complete_state());
        assert!(v.ok(), "{:?}", v.errors);
    }

    #[test]
    fn test_each_field_violation_alone_fails() {
        let breakages: Vec<(&str, Value, &str)> = vec![
            ("initial_prompt", json!("  "), "initial_prompt cannot be empty"),
            ("initial_prompt", json!(42), "initial_prompt must be a string"),
            ("query_intent", json!(["x"]), "query_intent must be a string"),
            ("research_plan", json!({"required_properties": ["x"], "suggested_elements": []}), "research_plan: Missing required field: thermodynamic_constraints"),
            ("proposed_alloy", json!({"matrix": [], "target_temp_K": 1}), "proposed_alloy: matrix cannot be empty"),
            ("final_formulation", json!({"matrix": ["Qq"], "target_temp_K": 1}), "final_formulation: Invalid element symbol: Qq"),
            ("thermo_validation", json!({"is_stable": true, "phases": [], "temperature": 0}), "thermo_validation: temperature must be positive"),
            ("simulation_target", json!("Ti"), "simulation_target: AlloyCandidate must be a map"),
            ("simulation_results", json!({"survived": true, "failure_mode": null, "max_stress_mpa": -2, "max_temperature_k": 1}), "simulation_results: max_stress_mpa must be non-negative"),
            ("next_agent", json!("not_a_real_agent"), "got: not_a_real_agent"),
            ("next_agent", json!(3), "next_agent must be a string"),
            ("loop_iterations", json!(-1), "loop_iterations must be non-negative"),
            ("loop_iterations", json!(1.5), "loop_iterations must be an integer"),
        ];
        for (field, bad, expected) in breakages {
            let mut state = complete_state();
            state[field] = bad;
            let v = validate(Contract::SessionState, &state);
            assert_eq!(v.errors.len(), 1, "{field}: {:?}", v.errors);
            assert!(has(&v, expected), "{field}: {:?}", v.errors);
        }
    }

    #[test]
    fn test_missing_initial_prompt() {
        let v = validate(Contract::SessionState, &json!({"next_agent": "research"}));
        assert_eq!(v.errors, vec!["Missing required field: initial_prompt"]);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let mut state = complete_state();
        state["handle"] = json!("opaque");
        let v = validate(Contract::SessionState, &state);
        assert_eq!(v.errors, vec!["Unknown field: handle"]);
    }

    #[test]
    fn test_unknown_nested_fields_rejected() {
        let mut state = complete_state();
        state["proposed_alloy"]["note"] = json!("keep me");
        state["research_plan"]["source"] = json!("web");
        state["thermo_validation"]["solver"] = json!("calphad");
        state["simulation_results"]["mesh"] = json!("blade");
        let v = validate(Contract::SessionState, &state);
        assert_eq!(
            v.errors,
            vec![
                "research_plan: Unknown field: source",
                "proposed_alloy: Unknown field: note",
                "thermo_validation: Unknown field: solver",
                "simulation_results: Unknown field: mesh",
            ]
        );
    }

    #[test]
    fn test_loop_iterations_bounded_to_u32() {
        let mut state = complete_state();
        state["loop_iterations"] = json!(u64::from(u32::MAX));
        assert!(validate(Contract::SessionState, &state).ok());

        state["loop_iterations"] = json!(5_000_000_000u64);
        let v = validate(Contract::SessionState, &state);
        assert_eq!(v.errors, vec![format!("loop_iterations must be at most {}", u32::MAX)]);
    }

    #[test]
    fn test_multiple_violations_accumulate() {
        let v = validate(
            Contract::SessionState,
            &json!({
                "initial_prompt": "",
                "next_agent": "nowhere",
                "loop_iterations": -3,
                "proposed_alloy": {"matrix": ["Xx"], "target_temp_K": -1}
            }),
        );
        assert_eq!(v.errors.len(), 5, "{:?}", v.errors);
    }

    #[test]
    fn test_non_map_inputs_never_panic() {
        for value in [json!(null), json!(1), json!("state"), json!([1, 2])] {
            for contract in [
                Contract::ResearchPlan,
                Contract::AlloyCandidate,
                Contract::ThermoResult,
                Contract::FeaResult,
                Contract::SessionState,
            ] {
                let v = validate(contract, &value);
                assert_eq!(v.errors.len(), 1);
                assert!(v.errors[0].contains("must be a map"));
            }
        }
    }

    #[test]
    fn test_into_result() {
        assert!(Validation::default().into_result().is_ok());
        let err = Validation {
            errors: vec!["bad".into()],
        }
        .into_result()
        .unwrap_err();
        assert_eq!(err.violations().to_vec(), vec!["bad".to_string()]);
    }
}
