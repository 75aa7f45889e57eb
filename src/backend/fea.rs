// src/backend/fea.rs — Finite-element surrogate

use serde::{Deserialize, Serialize};

use super::{round3, CollaboratorError, Simulator};
use crate::core::types::{AlloyCandidate, FeaResult, SimulationLoad};

const MAX_DISPLACEMENT_MM: f64 = 5.0;
const MAX_VON_MISES_MPA: f64 = 1000.0;
pub const YIELD_FAILURE: &str = "Yield Criteria Exceeded";

/// Raw solver metrics before reduction to an [`FeaResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaReport {
    pub mesh_geometry: String,
    pub max_displacement_mm: f64,
    pub von_mises_stress_mpa: f64,
    pub thermal_gradient_k: f64,
    pub survived: bool,
    pub failure_mode: Option<String>,
}

impl From<&FeaReport> for FeaResult {
    fn from(report: &FeaReport) -> Self {
        Self {
            survived: report.survived,
            failure_mode: report.failure_mode.clone(),
            max_stress_mpa: report.von_mises_stress_mpa,
            max_temperature_k: report.thermal_gradient_k,
        }
    }
}

/// Linear displacement/stress model of the component under load.
pub fn run_fea_analysis(
    mesh_geometry: &str,
    load: SimulationLoad,
) -> Result<FeaReport, CollaboratorError> {
    let SimulationLoad {
        thermal_load_k,
        structural_load_mpa,
    } = load;
    if !(thermal_load_k.is_finite() && thermal_load_k > 0.0) {
        return Err(CollaboratorError::new(format!(
            "thermal load must be positive, got {thermal_load_k}"
        )));
    }
    if !(structural_load_mpa.is_finite() && structural_load_mpa >= 0.0) {
        return Err(CollaboratorError::new(format!(
            "structural load must be non-negative, got {structural_load_mpa}"
        )));
    }

    let displacement = structural_load_mpa * 0.05 + thermal_load_k * 0.001;
    let von_mises = structural_load_mpa * 1.5;
    let survived = displacement < MAX_DISPLACEMENT_MM && von_mises < MAX_VON_MISES_MPA;

    Ok(FeaReport {
        mesh_geometry: mesh_geometry.to_string(),
        max_displacement_mm: round3(displacement),
        von_mises_stress_mpa: round3(von_mises),
        thermal_gradient_k: thermal_load_k,
        survived,
        failure_mode: (!survived).then(|| YIELD_FAILURE.to_string()),
    })
}

/// Runs [`run_fea_analysis`] against a fixed mesh.
#[derive(Debug, Clone)]
pub struct SurrogateFea {
    mesh_geometry: String,
}

impl SurrogateFea {
    pub fn new(mesh_geometry: impl Into<String>) -> Self {
        Self {
            mesh_geometry: mesh_geometry.into(),
        }
    }
}

impl Simulator for SurrogateFea {
    fn simulate(
        &self,
        candidate: &AlloyCandidate,
        load: SimulationLoad,
    ) -> Result<FeaResult, CollaboratorError> {
        let report = run_fea_analysis(&self.mesh_geometry, load)?;
        tracing::debug!(
            matrix = ?candidate.matrix,
            mesh = %report.mesh_geometry,
            displacement_mm = report.max_displacement_mm,
            von_mises_mpa = report.von_mises_stress_mpa,
            survived = report.survived,
            "FEA complete"
        );
        Ok(FeaResult::from(&report))
    }
}
