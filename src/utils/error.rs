use thiserror::Error;

#[derive(Error, Debug)]
pub enum FamilyTreeError {
    #[error("Relationship store error: {message}")]
    StoreError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Store,
    Io,
    Data,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl FamilyTreeError {
    pub fn store(message: impl Into<String>) -> Self {
        Self::StoreError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::StoreError { .. } => ErrorCategory::Store,
            Self::IoError(_) => ErrorCategory::Io,
            Self::SerializationError(_) => ErrorCategory::Data,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // Store lookups are transient; the caller may simply ask again.
            Self::StoreError { .. } => ErrorSeverity::Medium,
            Self::SerializationError(_) => ErrorSeverity::High,
            Self::IoError(_) => ErrorSeverity::Critical,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::StoreError { .. } => "Retry the request once the relationship store is reachable",
            Self::IoError(_) => "Check that the file exists and is readable",
            Self::SerializationError(_) => {
                "Check that the relationship records are a JSON array of edges"
            }
            Self::ConfigError { .. } | Self::ConfigValidationError { .. } => {
                "Fix the configuration file and try again"
            }
            Self::InvalidConfigValueError { .. } => "Use a value inside the documented range",
            Self::MissingConfigError { .. } => "Provide the missing setting via CLI or config file",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::StoreError { .. } => "Could not build family tree".to_string(),
            Self::IoError(e) => format!("Could not read input: {}", e),
            Self::SerializationError(e) => format!("Relationship records are malformed: {}", e),
            Self::ConfigError { message } => format!("Configuration problem: {}", message),
            Self::ConfigValidationError { field, message } => {
                format!("Setting '{}' is invalid: {}", field, message)
            }
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting '{}' is invalid: {}", field, reason)
            }
            Self::MissingConfigError { field } => format!("Setting '{}' is required", field),
        }
    }
}

pub type Result<T> = std::result::Result<T, FamilyTreeError>;
