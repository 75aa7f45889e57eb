// src/infra/config.rs — Configuration loading (TOML)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::infra::errors::ForgeError;
use crate::infra::paths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub refinement: RefinementConfig,

    #[serde(default)]
    pub composition: CompositionConfig,

    #[serde(default)]
    pub thermo: ThermoConfig,

    #[serde(default)]
    pub simulation: SimulationConfig,

    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefinementConfig {
    pub max_iterations: u32,
}

impl Default for RefinementConfig {
    fn default() -> Self {
        Self { max_iterations: 5 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositionConfig {
    /// Operating temperature assigned to proposed candidates, in kelvin.
    pub target_temp_k: f64,
}

impl Default for CompositionConfig {
    fn default() -> Self {
        Self {
            target_temp_k: 1000.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThermoConfig {
    pub pressure_pa: f64,
}

impl Default for ThermoConfig {
    fn default() -> Self {
        Self {
            pressure_pa: 101_325.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub mesh_geometry: String,
    pub thermal_load_k: f64,
    pub structural_load_mpa: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            mesh_geometry: "high_pressure_turbine_blade_v1".into(),
            thermal_load_k: 1500.0,
            structural_load_mpa: 650.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub enabled: bool,
    pub output_dir: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            output_dir: default_report_dir(),
        }
    }
}

fn default_report_dir() -> PathBuf {
    PathBuf::from("./reports")
}

impl Config {
    /// Load config from the default location, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        match paths::config_file_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ForgeError> {
        if self.refinement.max_iterations == 0 {
            return Err(ForgeError::Config(
                "refinement.max_iterations must be at least 1".into(),
            ));
        }
        let positives = [
            ("composition.target_temp_k", self.composition.target_temp_k),
            ("thermo.pressure_pa", self.thermo.pressure_pa),
            ("simulation.thermal_load_k", self.simulation.thermal_load_k),
        ];
        for (name, value) in positives {
            if !(value.is_finite() && value > 0.0) {
                return Err(ForgeError::Config(format!("{name} must be positive")));
            }
        }
        let stress = self.simulation.structural_load_mpa;
        if !(stress.is_finite() && stress >= 0.0) {
            return Err(ForgeError::Config(
                "simulation.structural_load_mpa must be non-negative".into(),
            ));
        }
        Ok(())
    }
}
