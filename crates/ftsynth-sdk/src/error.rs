//! SDK error types

use thiserror::Error;

/// SDK error type
#[derive(Error, Debug)]
pub enum SdkError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Feature construction error
    #[error("Feature error: {0}")]
    CoreError(#[from] ftsynth_core::CoreError),

    /// Runtime error
    #[error("Runtime error: {0}")]
    RuntimeError(#[from] ftsynth_runtime::RuntimeError),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Invalid YAML configuration
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let error = SdkError::ConfigError("No entity source".to_string());
        assert!(error.to_string().contains("Configuration error"));
        assert!(error.to_string().contains("No entity source"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let sdk_error: SdkError = io_error.into();
        assert!(sdk_error.to_string().contains("I/O error"));
        assert!(sdk_error.to_string().contains("File not found"));
    }

    #[test]
    fn test_runtime_error_conversion() {
        let runtime_error = ftsynth_runtime::RuntimeError::EmptyRequest;
        let sdk_error: SdkError = runtime_error.into();
        assert_eq!(sdk_error.to_string(), "Runtime error: No features requested");
    }

    #[test]
    fn test_core_error_conversion() {
        let core_error = ftsynth_core::CoreError::Arity("two literals".to_string());
        let sdk_error: SdkError = core_error.into();
        assert!(sdk_error.to_string().contains("two literals"));
    }
}
