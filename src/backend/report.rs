// src/backend/report.rs — Heatmap and briefing artifacts

use std::path::{Path, PathBuf};

use super::{CollaboratorError, Reporter};
use crate::core::state::SessionState;
use crate::core::types::FeaResult;

pub const HEATMAP_FILE: &str = "heatmap_animation.svg";
pub const BRIEFING_FILE: &str = "executive_briefing.txt";

/// Writes an SVG stress heatmap and a plain-text briefing into `output_dir`.
#[derive(Debug, Clone)]
pub struct FileReporter {
    output_dir: PathBuf,
}

impl FileReporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

impl Reporter for FileReporter {
    fn report(&self, state: &SessionState) -> Result<Vec<PathBuf>, CollaboratorError> {
        std::fs::create_dir_all(&self.output_dir).map_err(|e| {
            CollaboratorError::new(format!(
                "cannot create {}: {e}",
                self.output_dir.display()
            ))
        })?;

        let heatmap = self.output_dir.join(HEATMAP_FILE);
        write(&heatmap, &render_heatmap(state.simulation_results.as_ref()))?;
        let briefing = self.output_dir.join(BRIEFING_FILE);
        write(&briefing, &render_briefing(state))?;

        tracing::info!(dir = %self.output_dir.display(), "Report artifacts written");
        Ok(vec![heatmap, briefing])
    }
}

fn write(path: &Path, contents: &str) -> Result<(), CollaboratorError> {
    std::fs::write(path, contents)
        .map_err(|e| CollaboratorError::new(format!("cannot write {}: {e}", path.display())))
}

/// Pulsing disc sized by peak stress; green if the part survived, red otherwise.
pub fn render_heatmap(results: Option<&FeaResult>) -> String {
    let (stress, survived) = results
        .map(|r| (r.max_stress_mpa, r.survived))
        .unwrap_or((0.0, false));
    let color = if survived { "green" } else { "red" };
    let radius = (stress * 0.1 + 50.0).min(200.0);

    format!(
        r##"<svg width="400" height="400" xmlns="http://www.w3.org/2000/svg">
  <rect width="100%" height="100%" fill="#1a1a1a" />
  <circle cx="200" cy="200" r="{radius}" fill="{color}" opacity="0.8">
    <animate attributeName="r" values="50;{radius};50" dur="2s" repeatCount="indefinite" />
  </circle>
  <text x="200" y="50" font-family="Arial" font-size="20" fill="white" text-anchor="middle">Stress Map: {stress} MPa</text>
</svg>
"##
    )
}

pub fn render_briefing(state: &SessionState) -> String {
    let matrix = state
        .final_formulation
        .as_ref()
        .map(|c| c.matrix.join("-"))
        .unwrap_or_else(|| "none".into());
    let outcome = match &state.simulation_results {
        Some(r) if r.survived => format!(
            "The component survived at {} MPa peak stress.",
            r.max_stress_mpa
        ),
        Some(r) => format!(
            "The component failed ({}) at {} MPa peak stress.",
            r.failure_mode.as_deref().unwrap_or("unspecified"),
            r.max_stress_mpa
        ),
        None => "No simulation was run.".into(),
    };

    format!(
        "Executive briefing ({})\n\
         Request: {}\n\
         Selected matrix: {}\n\
         Refinement rounds rejected: {}\n\
         {}\n",
        chrono::Utc::now().format("%Y-%m-%d %H:%M UTC"),
        state.initial_prompt,
        matrix,
        state.loop_iterations,
        outcome
    )
}
