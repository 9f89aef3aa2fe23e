//! Error types for the signal-buffer pipeline

use std::fmt;

/// Errors that can occur in the buffer pipeline and graph math
#[derive(Debug, Clone, PartialEq)]
pub enum GraphError {
    /// Lifecycle violation (e.g. `start()` before `initialise()`)
    UsageError(String),

    /// Operation not supported by this producer (e.g. fixed sample rate)
    ///
    /// Callers should treat this as a no-op and carry on.
    UnsupportedOperation(String),

    /// Zero-crossing analysis could not produce a finite estimate
    DegenerateSignal(String),

    /// Axis range or scale rejected at construction/mutation time
    InvalidAxisConfiguration(String),

    /// Invalid input parameters
    InvalidInput(String),
}

impl GraphError {
    /// Whether the caller can ignore this error and keep running
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            GraphError::UnsupportedOperation(_) | GraphError::DegenerateSignal(_)
        )
    }
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphError::UsageError(msg) => write!(f, "Usage error: {}", msg),
            GraphError::UnsupportedOperation(msg) => write!(f, "Unsupported operation: {}", msg),
            GraphError::DegenerateSignal(msg) => write!(f, "Degenerate signal: {}", msg),
            GraphError::InvalidAxisConfiguration(msg) => {
                write!(f, "Invalid axis configuration: {}", msg)
            }
            GraphError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for GraphError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        let err = GraphError::UsageError("start() before initialise()".to_string());
        assert_eq!(err.to_string(), "Usage error: start() before initialise()");

        let err = GraphError::InvalidAxisConfiguration("span is zero".to_string());
        assert_eq!(err.to_string(), "Invalid axis configuration: span is zero");
    }

    #[test]
    fn test_recoverable_kinds() {
        assert!(GraphError::UnsupportedOperation(String::new()).is_recoverable());
        assert!(GraphError::DegenerateSignal(String::new()).is_recoverable());
        assert!(!GraphError::UsageError(String::new()).is_recoverable());
        assert!(!GraphError::InvalidAxisConfiguration(String::new()).is_recoverable());
    }
}
