//! Error types for graphbench.

/// Result type alias for graphbench operations.
pub type Result<T> = std::result::Result<T, BenchError>;

/// Main error type for graphbench.
#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    /// Connecting to the server failed
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Submitting a statement failed
    #[error("Failed to run statement: {0}")]
    Query(String),

    /// Fetching or decoding a result row failed
    #[error("Failed to fetch result: {0}")]
    Fetch(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Driver library errors outside a single call (init, cleanup, misuse)
    #[error("Driver error: {0}")]
    Driver(String),

    /// Invalid input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped anyhow errors for compatibility
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BenchError {
    /// Create a new connection error
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a new query error
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Create a new fetch error
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    /// Create a new config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new driver error
    pub fn driver(msg: impl Into<String>) -> Self {
        Self::Driver(msg.into())
    }

    /// Create a new invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Check if this is a connection error
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Check if this is a query error
    pub fn is_query(&self) -> bool {
        matches!(self, Self::Query(_))
    }

    /// Check if this is a fetch error
    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = BenchError::connection("refused");
        assert_eq!(err.to_string(), "Connection failed: refused");
        assert!(err.is_connection());

        let err = BenchError::query("syntax error");
        assert_eq!(err.to_string(), "Failed to run statement: syntax error");
        assert!(err.is_query());
        assert!(!err.is_fetch());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: BenchError = io.into();
        assert!(matches!(err, BenchError::Io(_)));
    }
}
