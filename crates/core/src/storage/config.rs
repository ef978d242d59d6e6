//! Storage backend configuration types.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::error::StorageError;

/// Which delivery path a file is served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Publicly accessible CDN path.
    Public,
    /// Access-restricted CDN path.
    Protected,
}

impl Visibility {
    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Protected => "protected",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Base URLs files are served from.
///
/// Bases are normalized once at construction. A base without a scheme gets
/// `https://` when `secure`, `http://` otherwise; an `http://` base is
/// upgraded when `secure`; any other base is kept verbatim. Trailing slashes
/// are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    public_base: String,
    protected_base: String,
    secure: bool,
}

impl Delivery {
    /// Build delivery URLs from the configured CDN bases.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a base is blank, or if two distinct
    /// bases normalize to the same URL.
    pub fn new(
        public_base: impl AsRef<str>,
        protected_base: impl AsRef<str>,
        secure: bool,
    ) -> Result<Self, StorageError> {
        let public_raw = public_base.as_ref().trim();
        let protected_raw = protected_base.as_ref().trim();
        if public_raw.is_empty() {
            return Err(StorageError::configuration("missing cdn.public_url"));
        }
        if protected_raw.is_empty() {
            return Err(StorageError::configuration("missing cdn.protected_url"));
        }

        let public_base = normalize_base(public_raw, secure);
        let protected_base = normalize_base(protected_raw, secure);
        if public_raw != protected_raw && public_base == protected_base {
            return Err(StorageError::configuration(format!(
                "cdn.public_url and cdn.protected_url both resolve to {public_base}"
            )));
        }

        Ok(Self {
            public_base,
            protected_base,
            secure,
        })
    }

    /// Normalized base URL for a visibility.
    #[must_use]
    pub fn base_url(&self, visibility: Visibility) -> &str {
        match visibility {
            Visibility::Public => &self.public_base,
            Visibility::Protected => &self.protected_base,
        }
    }

    /// Whether URLs are composed for TLS delivery.
    #[must_use]
    pub const fn is_secure(&self) -> bool {
        self.secure
    }

    /// URL of `key` under the base for `visibility`.
    #[must_use]
    pub fn file_url(&self, key: &str, visibility: Visibility) -> String {
        format!(
            "{}/{}",
            self.base_url(visibility),
            key.trim_start_matches('/')
        )
    }
}

fn normalize_base(base: &str, secure: bool) -> String {
    const HTTP: &str = "http://";

    let base = base.trim_end_matches('/');
    let is_http = base
        .get(..HTTP.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(HTTP));
    if is_http {
        if secure {
            return format!("https://{}", &base[HTTP.len()..]);
        }
        return base.to_string();
    }
    if base.contains("://") {
        return base.to_string();
    }
    let scheme = if secure { "https" } else { "http" };
    format!("{scheme}://{base}")
}

/// Access key pair for S3.
#[derive(Clone, PartialEq, Eq)]
pub struct S3Credentials {
    /// Access key ID.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
}

impl S3Credentials {
    /// Create a credential pair.
    #[must_use]
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }
}

impl fmt::Debug for S3Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// Fully resolved configuration of one storage backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    /// Local filesystem (development only).
    LocalFs {
        /// Directory for public files.
        root: PathBuf,
        /// Directory for protected files. Must not lie under `root`.
        protected_root: PathBuf,
        /// Delivery URLs.
        delivery: Delivery,
    },
    /// S3-compatible object storage.
    S3 {
        /// Endpoint URL.
        endpoint: String,
        /// Region.
        region: String,
        /// Access key pair.
        credentials: S3Credentials,
        /// Bucket for public files.
        bucket: String,
        /// Bucket for protected files.
        protected_bucket: String,
        /// Delivery URLs.
        delivery: Delivery,
    },
}

impl BackendConfig {
    /// Create local filesystem config.
    #[must_use]
    pub fn local_fs(
        root: impl Into<PathBuf>,
        protected_root: impl Into<PathBuf>,
        delivery: Delivery,
    ) -> Self {
        Self::LocalFs {
            root: root.into(),
            protected_root: protected_root.into(),
            delivery,
        }
    }

    /// Create S3 config.
    #[must_use]
    pub fn s3(
        endpoint: impl Into<String>,
        region: impl Into<String>,
        credentials: S3Credentials,
        bucket: impl Into<String>,
        protected_bucket: impl Into<String>,
        delivery: Delivery,
    ) -> Self {
        Self::S3 {
            endpoint: endpoint.into(),
            region: region.into(),
            credentials,
            bucket: bucket.into(),
            protected_bucket: protected_bucket.into(),
            delivery,
        }
    }

    /// Backend name, as reported by [`super::StorageBackend::name`].
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::LocalFs { .. } => "local",
            Self::S3 { .. } => "s3",
        }
    }

    /// Delivery URLs of this backend.
    #[must_use]
    pub const fn delivery(&self) -> &Delivery {
        match self {
            Self::LocalFs { delivery, .. } | Self::S3 { delivery, .. } => delivery,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://cdn.yiff.rocks", false, "https://cdn.yiff.rocks")]
    #[case("https://cdn.yiff.rocks/", true, "https://cdn.yiff.rocks")]
    #[case("http://cdn.local", false, "http://cdn.local")]
    #[case("http://cdn.local", true, "https://cdn.local")]
    #[case("HTTP://cdn.local", true, "https://cdn.local")]
    #[case("Http://cdn.local", false, "Http://cdn.local")]
    #[case("HTTPS://cdn.local", true, "HTTPS://cdn.local")]
    #[case("cdn.local:8080", false, "http://cdn.local:8080")]
    #[case("cdn.local:8080", true, "https://cdn.local:8080")]
    fn test_normalize_base(#[case] base: &str, #[case] secure: bool, #[case] expected: &str) {
        assert_eq!(normalize_base(base, secure), expected);
    }

    #[test]
    fn test_file_url_joins_with_single_slash() {
        let delivery =
            Delivery::new("https://cdn.yiff.rocks/", "https://protected.cdn.yiff.rocks", true)
                .expect("valid delivery");
        assert_eq!(
            delivery.file_url("/ab/abc.png", Visibility::Public),
            "https://cdn.yiff.rocks/ab/abc.png"
        );
        assert_eq!(
            delivery.file_url("ab/abc.png", Visibility::Protected),
            "https://protected.cdn.yiff.rocks/ab/abc.png"
        );
    }

    #[test]
    fn test_delivery_rejects_blank_base() {
        let err = Delivery::new("  ", "https://protected.cdn.yiff.rocks", true).unwrap_err();
        assert!(matches!(err, StorageError::Configuration(ref m) if m.contains("public_url")));
    }

    #[test]
    fn test_delivery_rejects_colliding_bases() {
        let err = Delivery::new("http://cdn.local", "https://cdn.local", true).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let creds = S3Credentials::new("AKIA", "topsecret");
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("AKIA"));
        assert!(!rendered.contains("topsecret"));
    }

    #[test]
    fn test_visibility_serde() {
        assert_eq!(
            serde_json::to_string(&Visibility::Protected).expect("serialize"),
            "\"protected\""
        );
    }
}
