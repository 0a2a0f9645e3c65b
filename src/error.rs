use thiserror::Error;

/// Placeholder value shipped in sample `.env` files.
pub const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY_HERE";

/// Errors surfaced by a session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdeaError {
    /// One or more profile fields are empty or whitespace-only.
    #[error("Please fill in: {}", .missing.join(", "))]
    Validation { missing: Vec<&'static str> },

    /// The remote call failed or its response did not have the expected shape.
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// The API credential is absent or still the placeholder value.
    #[error("Please set a valid {env_var} in your environment or .env file!")]
    ConfigurationMissing { env_var: String },

    /// The action is not accepted in the current phase.
    #[error("Cannot {action} while {phase}")]
    Rejected {
        action: &'static str,
        phase: &'static str,
    },
}

impl IdeaError {
    /// Whether this error belongs in the session's error slot.
    pub fn is_generation_error(&self) -> bool {
        matches!(
            self,
            IdeaError::GenerationFailed(_) | IdeaError::ConfigurationMissing { .. }
        )
    }
}
