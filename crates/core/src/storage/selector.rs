//! Picks the storage backend for the process.
//!
//! Development runs against the local filesystem under `<tmp>/public`
//! (protected files in `<tmp>/protected`);
//! every other mode uses S3. The choice depends on the environment alone and
//! a remote backend is never built from partial credentials.

use std::sync::Arc;

use imageboard_shared::AppConfig;
use tracing::info;

use super::backend::StorageBackend;
use super::config::{BackendConfig, Delivery, S3Credentials, Visibility};
use super::error::StorageError;
use super::local::LocalBackend;
use super::s3::S3Backend;

/// Resolve which backend `config` calls for, without building it.
///
/// # Errors
///
/// Returns a configuration error if a value the chosen backend needs is
/// missing or blank.
pub fn resolve_backend_config(config: &AppConfig) -> Result<BackendConfig, StorageError> {
    if config.environment.is_development() {
        let delivery = Delivery::new(&config.cdn.public_url, &config.cdn.protected_url, false)?;
        return Ok(BackendConfig::local_fs(
            config.storage.public_root(),
            config.storage.protected_root(),
            delivery,
        ));
    }

    let s3 = &config.s3;
    let endpoint = required(s3.endpoint_url.as_ref(), "s3.endpoint_url")?;
    let region = required(s3.region.as_ref(), "s3.region")?;
    let access_key_id = required(s3.access_key_id.as_ref(), "s3.access_key_id")?;
    let secret_access_key = required(s3.secret_access_key.as_ref(), "s3.secret_access_key")?;
    let bucket = required(s3.bucket.as_ref(), "s3.bucket")?;
    let protected_bucket = required(s3.protected_bucket.as_ref(), "s3.protected_bucket")?;
    let delivery = Delivery::new(&config.cdn.public_url, &config.cdn.protected_url, true)?;

    Ok(BackendConfig::s3(
        endpoint,
        region,
        S3Credentials::new(access_key_id, secret_access_key),
        bucket,
        protected_bucket,
        delivery,
    ))
}

fn required<'a>(value: Option<&'a String>, field: &str) -> Result<&'a str, StorageError> {
    match value.map(|v| v.trim()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(StorageError::configuration(format!("missing {field}"))),
    }
}

/// Resolve and build the process-wide storage backend.
///
/// # Errors
///
/// Returns a configuration error if the backend cannot be built.
pub fn select_backend(config: &AppConfig) -> Result<Arc<dyn StorageBackend>, StorageError> {
    let backend_config = resolve_backend_config(config)?;
    let backend = backend_config.build()?;
    info!(
        backend = backend.name(),
        environment = %config.environment,
        public_url = backend_config.delivery().base_url(Visibility::Public),
        "Storage backend selected"
    );
    Ok(backend)
}

impl BackendConfig {
    /// Build the backend this config describes.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if OpenDAL rejects the settings.
    pub fn build(&self) -> Result<Arc<dyn StorageBackend>, StorageError> {
        match self {
            Self::LocalFs {
                root,
                protected_root,
                delivery,
            } => Ok(Arc::new(LocalBackend::new(
                root.clone(),
                protected_root.clone(),
                delivery.clone(),
            )?)),
            Self::S3 {
                endpoint,
                region,
                credentials,
                bucket,
                protected_bucket,
                delivery,
            } => Ok(Arc::new(S3Backend::new(
                endpoint,
                region,
                credentials,
                bucket,
                protected_bucket,
                delivery.clone(),
            )?)),
        }
    }
}
