// src/infra/errors.rs — Error types for AeroForge

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForgeError {
    // Caller errors (fatal at the call site)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // State errors (non-fatal, the update is rejected)
    #[error("Invalid session state update: {}", .errors.join("; "))]
    InvalidStateUpdate { errors: Vec<String> },

    // Loop errors (fatal, not retriable)
    #[error("Failed to find stable alloy formulation after {attempts} attempt(s)")]
    LoopExhausted { attempts: u32 },

    // Boundary errors (halt the pipeline)
    #[error("Collaborator '{stage}' failed: {message}")]
    Collaborator { stage: String, message: String },

    // Infra
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ForgeError {
    /// True for the refinement loop's terminal failure.
    pub fn is_loop_exhausted(&self) -> bool {
        matches!(self, ForgeError::LoopExhausted { .. })
    }

    /// Violation messages carried by a rejected update, empty otherwise.
    pub fn violations(&self) -> &[String] {
        match self {
            ForgeError::InvalidStateUpdate { errors } => errors,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_update_joins_all_violations() {
        let err = ForgeError::InvalidStateUpdate {
            errors: vec!["a is wrong".into(), "b is wrong".into()],
        };
        assert_eq!(
            err.to_string(),
            "Invalid session state update: a is wrong; b is wrong"
        );
        assert_eq!(err.violations().len(), 2);
    }

    #[test]
    fn test_loop_exhausted_is_distinguished() {
        let err = ForgeError::LoopExhausted { attempts: 3 };
        assert!(err.is_loop_exhausted());
        assert!(err.to_string().contains("3 attempt"));
        assert!(err.violations().is_empty());

        let other = ForgeError::Collaborator {
            stage: "research".into(),
            message: "timeout".into(),
        };
        assert!(!other.is_loop_exhausted());
    }
}
