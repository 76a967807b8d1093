use thiserror::Error;

// ---------------------------------------------------------------------------
// Engine errors
// ---------------------------------------------------------------------------

/// Result alias used across the engine.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Structured failures surfaced to whoever calls the engine.
///
/// None of these are retried internally: bad input stays bad, and a failed
/// load never reaches `Ready`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The loader could not produce a valid dataset.
    #[error("dataset unavailable: {message}")]
    DataUnavailable { message: String },

    /// A query arrived before the dataset finished loading.
    #[error("dataset is not loaded yet; retry once loading completes")]
    NotReady,

    /// A caller-supplied argument broke a documented constraint.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// The engine broke one of its own invariants.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl EngineError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Wrap a loader failure, keeping its whole context chain in the message.
    pub fn unavailable(err: &anyhow::Error) -> Self {
        Self::DataUnavailable {
            message: format!("{err:#}"),
        }
    }

    /// Stable snake_case code a transport can map to its own error shape.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DataUnavailable { .. } => "data_unavailable",
            Self::NotReady => "not_ready",
            Self::InvalidArgument { .. } => "invalid_argument",
            Self::Internal { .. } => "internal",
        }
    }

    /// Whether different input from the caller could make the call succeed.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_keeps_context_chain() {
        let err = anyhow::anyhow!("no such file").context("opening parquet file");
        let engine_err = EngineError::unavailable(&err);
        assert_eq!(
            engine_err.to_string(),
            "dataset unavailable: opening parquet file: no such file"
        );
        assert_eq!(engine_err.kind(), "data_unavailable");
    }

    #[test]
    fn only_invalid_arguments_are_caller_errors() {
        assert!(EngineError::invalid("n must be >= 1").is_caller_error());
        assert!(!EngineError::NotReady.is_caller_error());
        assert_eq!(EngineError::NotReady.kind(), "not_ready");
        let internal = EngineError::Internal {
            message: "unserializable result".to_string(),
        };
        assert!(!internal.is_caller_error());
        assert_eq!(internal.kind(), "internal");
    }
}
