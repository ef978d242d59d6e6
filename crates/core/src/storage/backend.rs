//! The storage backend trait and helpers shared by its implementations.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use opendal::Operator;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use super::config::{Delivery, Visibility};
use super::error::StorageError;

/// Where a stored file ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredLocation {
    /// Normalized storage key.
    pub key: String,
    /// Area the file was written to.
    pub visibility: Visibility,
    /// URL the file is served from.
    pub url: String,
    /// Size in bytes.
    pub size: u64,
    /// Name of the backend that wrote it.
    pub backend: &'static str,
    /// Write completion time.
    pub stored_at: DateTime<Utc>,
}

/// A place uploaded files are persisted to and served from.
///
/// Implementations hold only immutable configuration and are safe to call
/// from many request handlers at once. No timeouts are applied; callers wrap
/// calls with their own deadline.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Short backend name (`local`, `s3`).
    fn name(&self) -> &'static str;

    /// Persist `content` under `key` in the public area.
    async fn store(&self, content: Bytes, key: &str) -> Result<StoredLocation, StorageError> {
        self.store_with_visibility(content, key, Visibility::Public)
            .await
    }

    /// Persist `content` under `key` in the area for `visibility`.
    async fn store_with_visibility(
        &self,
        content: Bytes,
        key: &str,
        visibility: Visibility,
    ) -> Result<StoredLocation, StorageError>;

    /// URL `key` is served from. Pure function of configuration and key.
    fn file_url(&self, key: &str, visibility: Visibility) -> String;
}

/// Check a storage key and return it without leading slashes.
///
/// Keys are `/`-separated segments. Empty segments, segments starting with
/// `.` (which also rules out `.` and `..`), backslashes and control
/// characters are rejected.
pub fn validate_key(key: &str) -> Result<&str, StorageError> {
    let trimmed = key.trim_start_matches('/');
    if trimmed.is_empty() {
        return Err(StorageError::invalid_key("key is empty"));
    }
    if trimmed.chars().any(|c| c == '\\' || c.is_control()) {
        return Err(StorageError::invalid_key(format!(
            "'{key}' contains a backslash or control character"
        )));
    }
    for segment in trimmed.split('/') {
        if segment.is_empty() {
            return Err(StorageError::invalid_key(format!(
                "'{key}' contains an empty segment"
            )));
        }
        if segment.starts_with('.') {
            return Err(StorageError::invalid_key(format!(
                "'{key}' contains a dot-prefixed segment"
            )));
        }
    }
    Ok(trimmed)
}

/// Fresh random key for a file with the given extension.
#[must_use]
pub fn generate_key(extension: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{}/{id}.{}", &id[..2], extension.trim_start_matches('.'))
}

/// Write through an operator and describe the result.
pub(super) async fn write_object(
    operator: &Operator,
    backend: &'static str,
    delivery: &Delivery,
    content: Bytes,
    key: &str,
    visibility: Visibility,
) -> Result<StoredLocation, StorageError> {
    let key = validate_key(key)?;
    let size = u64::try_from(content.len()).unwrap_or(u64::MAX);

    operator.write(key, content).await.map_err(|e| {
        warn!(backend, key, %visibility, error = %e, "Storage write failed");
        StorageError::write(key, e)
    })?;

    debug!(backend, key, %visibility, size, "Stored file");
    Ok(StoredLocation {
        key: key.to_string(),
        visibility,
        url: delivery.file_url(key, visibility),
        size,
        backend,
        stored_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("abc.png", "abc.png")]
    #[case("/abc.png", "abc.png")]
    #[case("ab/abc.png", "ab/abc.png")]
    fn test_validate_key_accepts(#[case] key: &str, #[case] expected: &str) {
        assert_eq!(validate_key(key).expect("valid key"), expected);
    }

    #[rstest]
    #[case("")]
    #[case("/")]
    #[case("../etc/passwd")]
    #[case("a/../b.png")]
    #[case("a//b.png")]
    #[case(".hidden/abc.png")]
    #[case("a\\b.png")]
    #[case("a\nb.png")]
    fn test_validate_key_rejects(#[case] key: &str) {
        assert!(matches!(
            validate_key(key),
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_generate_key_shape() {
        let key = generate_key(".png");
        let (prefix, name) = key.split_once('/').expect("prefixed key");
        assert_eq!(prefix.len(), 2);
        assert!(name.starts_with(prefix));
        assert!(name.ends_with(".png"));
        assert!(validate_key(&key).is_ok());
    }

    proptest! {
        #[test]
        fn prop_generated_keys_are_valid(ext in "[a-z0-9]{1,5}") {
            let key = generate_key(&ext);
            prop_assert!(validate_key(&key).is_ok());
        }

        #[test]
        fn prop_validated_keys_have_no_traversal(key in "[a-z./]{0,24}") {
            if let Ok(valid) = validate_key(&key) {
                prop_assert!(!valid.starts_with('/'));
                prop_assert!(valid.split('/').all(|s| !s.is_empty() && !s.starts_with('.')));
            }
        }
    }
}
