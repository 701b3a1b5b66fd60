use thiserror::Error;

#[derive(Error, Debug)]
pub enum PosError {
    #[error("OpenStreetMap node {node_id} not found")]
    OsmNodeNotFound { node_id: u64 },

    #[error("OpenStreetMap node {node_id} is missing required fields")]
    OsmNodeMissingFields { node_id: u64 },

    #[error("POS with ID {id} not found")]
    PosNotFound { id: u64 },

    #[error("POS with name '{name}' already exists")]
    DuplicatePosName { name: String },

    #[error("API client error: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    NotFound,
    Validation,
    Conflict,
    Configuration,
    Network,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl PosError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PosError::OsmNodeNotFound { .. } | PosError::PosNotFound { .. } => {
                ErrorCategory::NotFound
            }
            PosError::OsmNodeMissingFields { .. } | PosError::ValidationError { .. } => {
                ErrorCategory::Validation
            }
            PosError::DuplicatePosName { .. } => ErrorCategory::Conflict,
            PosError::ApiError(_) => ErrorCategory::Network,
            PosError::IoError(_) | PosError::SerializationError(_) => ErrorCategory::Storage,
            PosError::ConfigError { .. }
            | PosError::ConfigValidationError { .. }
            | PosError::InvalidConfigValueError { .. }
            | PosError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::NotFound => ErrorSeverity::Medium,
            ErrorCategory::Validation | ErrorCategory::Conflict | ErrorCategory::Configuration => {
                ErrorSeverity::High
            }
            ErrorCategory::Network | ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    /// Process exit code used by the CLI for this error.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            PosError::OsmNodeNotFound { .. } => {
                "Check the node ID on openstreetmap.org and that the OSM API is reachable"
                    .to_string()
            }
            PosError::OsmNodeMissingFields { .. } => {
                "Add a name and the addr:street, addr:housenumber, addr:postcode and addr:city tags to the node"
                    .to_string()
            }
            PosError::PosNotFound { .. } => {
                "List the existing POS to find a valid ID, or omit the ID to create a new POS"
                    .to_string()
            }
            PosError::DuplicatePosName { .. } => {
                "Choose a different name or update the existing POS instead".to_string()
            }
            PosError::ApiError(_) => "Check the OSM client settings (timeout, user agent)".to_string(),
            PosError::IoError(_) | PosError::SerializationError(_) => {
                "Check that the store file is readable, writable and contains valid JSON".to_string()
            }
            PosError::ConfigError { .. }
            | PosError::ConfigValidationError { .. }
            | PosError::InvalidConfigValueError { .. }
            | PosError::MissingConfigError { .. } => {
                "Review the configuration file and command line flags".to_string()
            }
            PosError::ValidationError { .. } => "Fix the input document and retry".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            PosError::OsmNodeNotFound { node_id } => {
                format!("Could not load OpenStreetMap node {}", node_id)
            }
            PosError::OsmNodeMissingFields { node_id } => format!(
                "OpenStreetMap node {} lacks the name or address information needed for a POS",
                node_id
            ),
            PosError::PosNotFound { id } => format!("There is no POS with ID {}", id),
            PosError::DuplicatePosName { name } => {
                format!("A POS named '{}' already exists", name)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PosError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_keep_identifying_context() {
        let err = PosError::OsmNodeNotFound { node_id: 42 };
        assert!(err.to_string().contains("42"));
        assert_eq!(err.category(), ErrorCategory::NotFound);

        let err = PosError::DuplicatePosName {
            name: "Rada".to_string(),
        };
        assert!(err.user_friendly_message().contains("Rada"));
        assert_eq!(err.category(), ErrorCategory::Conflict);
    }

    #[test]
    fn test_exit_codes_follow_severity() {
        assert_eq!(PosError::PosNotFound { id: 1 }.exit_code(), 2);
        assert_eq!(PosError::OsmNodeMissingFields { node_id: 1 }.exit_code(), 1);
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk");
        assert_eq!(PosError::from(io).exit_code(), 3);
    }
}
