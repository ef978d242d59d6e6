//! Configuration error types.

use thiserror::Error;

/// Result type alias using `ConfigError`.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading or validating configuration.
///
/// All of these are fatal: startup must abort when one is returned.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The layered sources could not be read or deserialized.
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A required value is absent or blank.
    #[error("Missing configuration value: {0}")]
    Missing(String),

    /// A value is present but unusable.
    #[error("Invalid configuration value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending key.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },
}

impl ConfigError {
    /// Create a missing value error.
    #[must_use]
    pub fn missing(field: impl Into<String>) -> Self {
        Self::Missing(field.into())
    }

    /// Create an invalid value error.
    #[must_use]
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Dotted key path this error refers to, when known.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Load(_) => None,
            Self::Missing(field) | Self::Invalid { field, .. } => Some(field),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            ConfigError::missing("s3.secret_access_key").to_string(),
            "Missing configuration value: s3.secret_access_key"
        );
        assert_eq!(
            ConfigError::invalid("api.port", "must be non-zero").to_string(),
            "Invalid configuration value for api.port: must be non-zero"
        );
    }

    #[test]
    fn test_error_field() {
        assert_eq!(
            ConfigError::missing("s3.bucket").field(),
            Some("s3.bucket")
        );
        assert_eq!(
            ConfigError::invalid("limits.max_post_tags", "too small").field(),
            Some("limits.max_post_tags")
        );
        let load = ConfigError::from(config::ConfigError::Message("boom".into()));
        assert_eq!(load.field(), None);
    }
}
