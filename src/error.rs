use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Remote resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Transport failures: connection refused, DNS, 5xx and friends
    #[error("Network error: {0}")]
    Network(String),

    /// Credential exchange failed or returned no token
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Request exceeded its deadline
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// A value the request depends on is missing (e.g. a container id)
    #[error("Missing prerequisite: {0}")]
    MissingPrerequisite(String),

    /// Remote API answered with a non-success status
    #[error("Upstream rejected request with status {status}: {body}")]
    UpstreamRejected { status: u16, body: String },

    /// Postmortem parent (or template guard) resource is absent
    #[error("Parent does not exist: {0}")]
    ParentNotFound(String),

    /// Template could be located but its content could not be fetched
    #[error("Template unavailable: {0}")]
    TemplateUnavailable(String),
}

impl AppError {
    /// Get error code string
    pub fn error_code(&self) -> &str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Network(_) => "NETWORK_ERROR",
            AppError::Authentication(_) => "AUTHENTICATION_ERROR",
            AppError::Timeout(_) => "TIMEOUT",
            AppError::MissingPrerequisite(_) => "MISSING_PREREQUISITE",
            AppError::UpstreamRejected { .. } => "UPSTREAM_REJECTED",
            AppError::ParentNotFound(_) => "PARENT_NOT_FOUND",
            AppError::TemplateUnavailable(_) => "TEMPLATE_UNAVAILABLE",
        }
    }

    /// Classify a transport error from the HTTP client
    pub fn from_transport(context: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Timeout(format!("{}: {}", context, err))
        } else if err.is_decode() {
            AppError::Serialization(format!("{}: {}", context, err))
        } else {
            AppError::Network(format!("{}: {}", context, err))
        }
    }
}

/// Conversion from serde_json::Error
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Conversion from validator::ValidationErrors
impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

/// Conversion from config::ConfigError
impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::NotFound("test".to_string()).error_code(),
            "NOT_FOUND"
        );
        assert_eq!(
            AppError::ParentNotFound("page".to_string()).error_code(),
            "PARENT_NOT_FOUND"
        );
        assert_eq!(
            AppError::UpstreamRejected {
                status: 400,
                body: String::new()
            }
            .error_code(),
            "UPSTREAM_REJECTED"
        );
    }

    #[test]
    fn test_error_display() {
        let err = AppError::UpstreamRejected {
            status: 502,
            body: "bad gateway".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Upstream rejected request with status 502: bad gateway"
        );
        assert_eq!(
            AppError::TemplateUnavailable("tpl-1".to_string()).to_string(),
            "Template unavailable: tpl-1"
        );
    }

    #[test]
    fn test_json_error_conversion() {
        let err: AppError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }
}
