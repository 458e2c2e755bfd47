//! Error taxonomy for symbolic construction, model assembly and evaluation.
//!
//! Every variant is raised synchronously while a model is being built or
//! evaluated; assembly is deterministic, so nothing here is retryable.
use crate::symbol::Domain;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Domain mismatch in '{op}': {left} is incompatible with {right}")]
    DomainMismatch { op: String, left: Domain, right: Domain },
    #[error("Invalid concatenation: {reason}")]
    InvalidConcatenation { reason: String },
    #[error("'{expression}' is not a concatenation")]
    NotConcatenation { expression: String },
    #[error("Variable '{name}' not found in registry")]
    KeyNotFound { name: String },
    #[error("State variable '{name}' introduced by both '{first}' and '{second}'")]
    DuplicateStateVariable { name: String, first: String, second: String },
    #[error("Incomplete system: state variable '{name}' has no {missing}")]
    IncompleteSystem { name: String, missing: String },
    #[error("State variable '{name}' has more than one {kind}")]
    DuplicateEquation { name: String, kind: String },
    #[error("Invalid equation key '{key}': {reason}")]
    InvalidEquationKey { key: String, reason: String },
    #[error("Parameter '{name}' has no value")]
    UnresolvedParameter { name: String },
    #[error("No value supplied for external variable '{name}'")]
    MissingExternalVariable { name: String },
    #[error("Submodel '{reader}' read '{variable}' before '{writer}' overwrote it")]
    OrderingViolation { reader: String, writer: String, variable: String },
    #[error("Evaluation error: {0}")]
    Evaluation(String),
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<serde_json::Error> for ModelError {
    fn from(e: serde_json::Error) -> Self {
        ModelError::Configuration(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ModelError>;
