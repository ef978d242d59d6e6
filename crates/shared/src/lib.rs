//! Shared configuration and errors for the image board.
//!
//! This crate provides the process-wide settings every other crate reads:
//! - Layered application configuration (defaults, files, environment)
//! - Configuration error types
//! - Source URL validation

pub mod config;
pub mod error;
pub mod sources;

pub use config::{
    ApiConfig, AppConfig, CdnConfig, DatabaseConfig, Environment, LimitsConfig, ProxyConfig,
    RedisConfig, S3Config, SecurityConfig, SiteConfig, StorageSettings, UsersConfig,
};
pub use error::{ConfigError, ConfigResult};
pub use sources::{SOURCE_URL_REGEX, is_valid_source_url};
