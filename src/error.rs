use thiserror::Error;

/// Error types for the dalitz-rs library.
#[derive(Error, Debug)]
pub enum DalitzError {
    /// Malformed expression composition, e.g. a leading subtraction on an empty expression.
    #[error("Invalid expression: {0}")]
    InvalidExpression(String),

    /// A parameter required by an expression is absent from the supplied values.
    #[error("Missing parameter: {name}")]
    MissingParameter { name: String },

    /// Token/opcode arity mismatch or a terminal stack depth other than one.
    #[error("Evaluation stack error at token {position}: {message}")]
    EvaluationStack { position: usize, message: String },

    /// A grid bin outside the integration grid.
    #[error("Invalid bin index {index} (grid has {bins} bins per axis)")]
    InvalidBinIndex { index: usize, bins: usize },

    /// Bounded lookup outside its valid range.
    #[error("Out of range: {0}")]
    OutOfRange(String),

    /// An operation was requested in a state that cannot serve it.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Error raised by the parameter layer.
    #[error("Parameter error: {0}")]
    Parameter(String),

    /// Error while parsing a formula string.
    #[error("Failed to parse formula: {0}")]
    Parse(String),

    /// Persistence of parameter collections failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] crate::parameters::SerializationError),

    /// I/O error wrapper.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<crate::parameters::ParameterError> for DalitzError {
    fn from(err: crate::parameters::ParameterError) -> Self {
        match err {
            crate::parameters::ParameterError::ParameterNotFound { name } => {
                DalitzError::MissingParameter { name }
            }
            other => DalitzError::Parameter(other.to_string()),
        }
    }
}

impl From<crate::parameters::BoundsError> for DalitzError {
    fn from(err: crate::parameters::BoundsError) -> Self {
        DalitzError::Parameter(err.to_string())
    }
}

/// Result type alias for dalitz-rs operations.
pub type Result<T> = std::result::Result<T, DalitzError>;

impl DalitzError {
    pub(crate) fn stack(position: usize, message: impl Into<String>) -> Self {
        DalitzError::EvaluationStack {
            position,
            message: message.into(),
        }
    }

    pub(crate) fn missing(name: &str) -> Self {
        DalitzError::MissingParameter {
            name: name.to_string(),
        }
    }
}
