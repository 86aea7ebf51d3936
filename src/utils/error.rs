use thiserror::Error;

#[derive(Error, Debug)]
pub enum CelestiaError {
    #[error("No geocoding match for '{query}'")]
    NotFound { query: String },

    #[error("{service} unavailable: {message}")]
    ServiceUnavailable { service: String, message: String },

    #[error("Malformed {service} response: {message}")]
    MalformedResponse { service: String, message: String },

    #[error("Invalid {field}: {message}")]
    InvalidInput { field: String, message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Lookup,
    Network,
    Input,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CelestiaError {
    pub fn service_unavailable(service: &str, message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            service: service.to_string(),
            message: message.into(),
        }
    }

    pub fn malformed(service: &str, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            service: service.to_string(),
            message: message.into(),
        }
    }

    pub fn invalid_input(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// True for the failures that ephemeris and chart resolution absorb
    /// into their local/mock fallback.
    pub fn is_fallback_eligible(&self) -> bool {
        matches!(
            self,
            Self::ServiceUnavailable { .. } | Self::MalformedResponse { .. }
        )
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::Lookup,
            Self::ServiceUnavailable { .. } | Self::MalformedResponse { .. } => {
                ErrorCategory::Network
            }
            Self::InvalidInput { .. } => ErrorCategory::Input,
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::IoError(_) | Self::SerializationError(_) | Self::CsvError(_) => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Lookup | ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "Check the spelling of the place name or try a nearby larger city",
            Self::ServiceUnavailable { .. } => "Check your network connection and retry later",
            Self::MalformedResponse { .. } => "The remote service returned unexpected data; retry later or switch the endpoint",
            Self::InvalidInput { .. } => "Use dates like 2024-02-29 or 29.02.2024 and times like 09:30",
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => "Review the configuration file and environment variables",
            Self::IoError(_) => "Check file paths and permissions",
            Self::SerializationError(_) | Self::CsvError(_) => "Report this issue with the input that triggered it",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::NotFound { query } => format!("Could not find a place called '{}'", query),
            Self::ServiceUnavailable { service, .. } => {
                format!("The {} service is currently unavailable", service)
            }
            Self::MalformedResponse { service, .. } => {
                format!("The {} service returned an unreadable response", service)
            }
            Self::InvalidInput { field, message } => format!("Invalid {}: {}", field, message),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CelestiaError>;
