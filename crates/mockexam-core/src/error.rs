//! Exam configuration error types.
//!
//! Only structural template problems are hard errors. An under-populated
//! question pool or a missing answer never produces one of these; those
//! degrade to warnings and "unanswered" respectively.

use thiserror::Error;

/// Errors raised when an exam template cannot be built at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// The template asks for zero questions.
    #[error("exam template '{template}' requests no questions")]
    NoQuestionsRequested { template: String },

    /// The template has no blueprint areas to sample from.
    #[error("exam template '{template}' defines no blueprint weights")]
    NoBlueprintWeights { template: String },
}

impl ConfigurationError {
    /// The id of the template that failed validation.
    pub fn template(&self) -> &str {
        match self {
            ConfigurationError::NoQuestionsRequested { template }
            | ConfigurationError::NoBlueprintWeights { template } => template,
        }
    }
}
