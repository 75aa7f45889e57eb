// src/backend/thermo.rs — Phase-equilibrium surrogate and built-in critic
//
// Stands in for a Gibbs-energy-minimization solver. The rules are coarse but
// deterministic: Ti+Al below the melt line forms alpha/beta, anything at or
// above 1200 K is liquid, everything else has no stable assemblage.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{CollaboratorError, Evaluator};
use crate::core::types::{AlloyCandidate, ThermoResult, Verdict};

pub const STANDARD_PRESSURE_PA: f64 = 101_325.0;
const MELT_LINE_K: f64 = 1200.0;

/// One phase in the equilibrium assemblage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseFraction {
    pub phase: String,
    pub fraction: f64,
    pub composition: BTreeMap<String, f64>,
}

/// Full solver output; reduced to a [`ThermoResult`] for the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquilibriumReport {
    pub elements: Vec<String>,
    pub temperature_k: f64,
    pub pressure_pa: f64,
    pub stable_phases: Vec<PhaseFraction>,
    pub is_stable: bool,
}

impl From<&EquilibriumReport> for ThermoResult {
    fn from(report: &EquilibriumReport) -> Self {
        Self {
            is_stable: report.is_stable,
            phases: report
                .stable_phases
                .iter()
                .map(|p| p.phase.clone())
                .collect(),
            temperature: report.temperature_k,
        }
    }
}

fn phase(name: &str, fraction: f64, composition: &[(&str, f64)]) -> PhaseFraction {
    PhaseFraction {
        phase: name.to_string(),
        fraction,
        composition: composition
            .iter()
            .map(|(el, x)| (el.to_string(), *x))
            .collect(),
    }
}

/// Compute the equilibrium assemblage for `elements` at the given conditions.
pub fn calculate_phase_equilibrium(
    elements: &[String],
    temperature_k: f64,
    pressure_pa: f64,
) -> Result<EquilibriumReport, CollaboratorError> {
    if elements.is_empty() {
        return Err(CollaboratorError::new("no elements to equilibrate"));
    }
    if !(temperature_k.is_finite() && temperature_k > 0.0) {
        return Err(CollaboratorError::new(format!(
            "temperature must be positive, got {temperature_k}"
        )));
    }
    if !(pressure_pa.is_finite() && pressure_pa > 0.0) {
        return Err(CollaboratorError::new(format!(
            "pressure must be positive, got {pressure_pa}"
        )));
    }

    let has = |s: &str| elements.iter().any(|e| e == s);
    let (stable_phases, is_stable) = if temperature_k >= MELT_LINE_K {
        let share = 1.0 / elements.len() as f64;
        let composition: Vec<(&str, f64)> =
            elements.iter().map(|e| (e.as_str(), share)).collect();
        (vec![phase("LIQUID", 1.0, &composition)], false)
    } else if has("Ti") && has("Al") {
        (
            vec![
                phase("ALPHA", 0.85, &[("Ti", 0.9), ("Al", 0.1)]),
                phase("BETA", 0.15, &[("Ti", 0.8), ("V", 0.2)]),
            ],
            true,
        )
    } else {
        (Vec::new(), false)
    };

    Ok(EquilibriumReport {
        elements: elements.to_vec(),
        temperature_k,
        pressure_pa,
        stable_phases,
        is_stable,
    })
}

/// Accepts a candidate iff its equilibrium assemblage is stable.
#[derive(Debug, Clone)]
pub struct EquilibriumEvaluator {
    pressure_pa: f64,
}

impl EquilibriumEvaluator {
    pub fn new(pressure_pa: f64) -> Self {
        Self { pressure_pa }
    }
}

impl Default for EquilibriumEvaluator {
    fn default() -> Self {
        Self::new(STANDARD_PRESSURE_PA)
    }
}

impl Evaluator for EquilibriumEvaluator {
    fn evaluate(&self, candidate: &AlloyCandidate) -> Result<Verdict, CollaboratorError> {
        let report = calculate_phase_equilibrium(
            &candidate.matrix,
            candidate.target_temp_k,
            self.pressure_pa,
        )?;
        tracing::debug!(
            is_stable = report.is_stable,
            phases = report.stable_phases.len(),
            "Equilibrium assessed"
        );
        Ok(Verdict {
            thermo: ThermoResult::from(&report),
            accepted: report.is_stable,
        })
    }
}
