/// Pipeline error types
use serde_json::{Value, json};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipeError {
    /// The chain finished on the failure path; carries the first value routed
    /// to the error slot after the last declared handler.
    #[error("Pipeline rejected: {0}")]
    Rejected(Value),

    #[error("Invalid configuration for step {step}: {message}")]
    InvalidStepConfig { step: usize, message: String },
}

/// Result type alias using PipeError
pub type Result<T> = std::result::Result<T, PipeError>;

impl PipeError {
    /// Create a rejection carrying `reason`
    pub fn rejected(reason: impl Into<Value>) -> Self {
        Self::Rejected(reason.into())
    }

    /// Create an invalid step configuration error
    pub fn invalid_step_config(step: usize, message: impl Into<String>) -> Self {
        Self::InvalidStepConfig {
            step,
            message: message.into(),
        }
    }

    /// Value pushed onto the error path when this error interrupts a step.
    ///
    /// A rejection hands back its own reason untouched.
    pub fn to_reason(&self) -> Value {
        match self {
            Self::Rejected(reason) => reason.clone(),
            Self::InvalidStepConfig { step, message } => json!({
                "error": "invalid_step_config",
                "step": step,
                "message": message,
            }),
        }
    }

    /// Rejection reason, if the pipeline settled on the failure path
    pub fn reason(&self) -> Option<&Value> {
        match self {
            Self::Rejected(reason) => Some(reason),
            _ => None,
        }
    }
}

impl From<PipeError> for Value {
    fn from(err: PipeError) -> Self {
        err.to_reason()
    }
}
