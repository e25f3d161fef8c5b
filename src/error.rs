use std::fmt;

/// Result type for beliefnet operations
pub type Result<T> = std::result::Result<T, BeliefError>;

/// Main error type for the beliefnet library
#[derive(Debug, Clone)]
pub enum BeliefError {
    /// Invalid dimensions for operations
    DimensionMismatch {
        expected: String,
        actual: String,
    },

    /// Invalid parameter value
    InvalidParameter {
        name: String,
        reason: String,
    },

    /// An operation was called before the layer was ready for it
    PreconditionViolation(String),

    /// No factory is registered under the requested type tag
    UnknownLayerKind(String),

    /// The builder could not produce an instance of the requested layer
    ConstructionFailed {
        kind: String,
        source: Box<BeliefError>,
    },

    /// Shape error reported by ndarray
    Shape(String),

    /// IO errors (file operations)
    IoError(String),

    /// Serialization/deserialization errors
    SerializationError(String),
}

impl fmt::Display for BeliefError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BeliefError::DimensionMismatch { expected, actual } => {
                write!(f, "Dimension mismatch: expected {}, got {}", expected, actual)
            }
            BeliefError::InvalidParameter { name, reason } => {
                write!(f, "Invalid parameter '{}': {}", name, reason)
            }
            BeliefError::PreconditionViolation(msg) => write!(f, "Precondition violated: {}", msg),
            BeliefError::UnknownLayerKind(kind) => write!(f, "Unknown layer kind '{}'", kind),
            BeliefError::ConstructionFailed { kind, source } => {
                write!(f, "Failed to construct layer '{}': {}", kind, source)
            }
            BeliefError::Shape(msg) => write!(f, "Shape error: {}", msg),
            BeliefError::IoError(msg) => write!(f, "IO error: {}", msg),
            BeliefError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for BeliefError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BeliefError::ConstructionFailed { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for BeliefError {
    fn from(err: std::io::Error) -> Self {
        BeliefError::IoError(err.to_string())
    }
}

// Conversion from bincode::Error
impl From<bincode::Error> for BeliefError {
    fn from(err: bincode::Error) -> Self {
        BeliefError::SerializationError(err.to_string())
    }
}

impl From<serde_json::Error> for BeliefError {
    fn from(err: serde_json::Error) -> Self {
        BeliefError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for BeliefError {
    fn from(err: ndarray::ShapeError) -> Self {
        BeliefError::Shape(err.to_string())
    }
}

// Helper functions for common error patterns
impl BeliefError {
    pub fn dimension_mismatch<S: Into<String>>(expected: S, actual: S) -> Self {
        BeliefError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        BeliefError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn construction_failed<S: Into<String>>(kind: S, source: BeliefError) -> Self {
        BeliefError::ConstructionFailed {
            kind: kind.into(),
            source: Box::new(source),
        }
    }

    /// Returns the innermost error of a `ConstructionFailed` chain, or `self`.
    pub fn root_cause(&self) -> &BeliefError {
        match self {
            BeliefError::ConstructionFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
