//! S3-compatible object storage backend.

use async_trait::async_trait;
use bytes::Bytes;
use opendal::{Operator, services};

use super::backend::{StorageBackend, StoredLocation, write_object};
use super::config::{Delivery, S3Credentials, Visibility};
use super::error::StorageError;

/// Stores public and protected files in two buckets of one S3 endpoint.
#[derive(Debug, Clone)]
pub struct S3Backend {
    endpoint: String,
    bucket: String,
    protected_bucket: String,
    public: Operator,
    protected: Operator,
    delivery: Delivery,
}

impl S3Backend {
    /// Create a backend for the given endpoint and buckets.
    ///
    /// No request is made here; bad credentials surface on first write.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a value is blank or OpenDAL rejects
    /// the builder.
    pub fn new(
        endpoint: &str,
        region: &str,
        credentials: &S3Credentials,
        bucket: &str,
        protected_bucket: &str,
        delivery: Delivery,
    ) -> Result<Self, StorageError> {
        for (field, value) in [
            ("s3.endpoint_url", endpoint),
            ("s3.region", region),
            ("s3.access_key_id", credentials.access_key_id.as_str()),
            ("s3.secret_access_key", credentials.secret_access_key.as_str()),
            ("s3.bucket", bucket),
            ("s3.protected_bucket", protected_bucket),
        ] {
            if value.trim().is_empty() {
                return Err(StorageError::configuration(format!("missing {field}")));
            }
        }

        let public = s3_operator(endpoint, region, credentials, bucket)?;
        let protected = s3_operator(endpoint, region, credentials, protected_bucket)?;
        Ok(Self {
            endpoint: endpoint.to_string(),
            bucket: bucket.to_string(),
            protected_bucket: protected_bucket.to_string(),
            public,
            protected,
            delivery,
        })
    }

    /// Endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Bucket holding files of the given visibility.
    #[must_use]
    pub fn bucket(&self, visibility: Visibility) -> &str {
        match visibility {
            Visibility::Public => &self.bucket,
            Visibility::Protected => &self.protected_bucket,
        }
    }

    /// Delivery URLs.
    #[must_use]
    pub const fn delivery(&self) -> &Delivery {
        &self.delivery
    }

    const fn operator(&self, visibility: Visibility) -> &Operator {
        match visibility {
            Visibility::Public => &self.public,
            Visibility::Protected => &self.protected,
        }
    }
}

fn s3_operator(
    endpoint: &str,
    region: &str,
    credentials: &S3Credentials,
    bucket: &str,
) -> Result<Operator, StorageError> {
    let builder = services::S3::default()
        .endpoint(endpoint)
        .bucket(bucket)
        .access_key_id(&credentials.access_key_id)
        .secret_access_key(&credentials.secret_access_key)
        .region(region);

    Ok(Operator::new(builder)
        .map_err(|e| StorageError::configuration(e.to_string()))?
        .finish())
}

#[async_trait]
impl StorageBackend for S3Backend {
    fn name(&self) -> &'static str {
        "s3"
    }

    async fn store_with_visibility(
        &self,
        content: Bytes,
        key: &str,
        visibility: Visibility,
    ) -> Result<StoredLocation, StorageError> {
        write_object(
            self.operator(visibility),
            self.name(),
            &self.delivery,
            content,
            key,
            visibility,
        )
        .await
    }

    fn file_url(&self, key: &str, visibility: Visibility) -> String {
        self.delivery.file_url(key, visibility)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delivery() -> Delivery {
        Delivery::new("https://cdn.yiff.rocks", "https://protected.cdn.yiff.rocks", true)
            .expect("valid delivery")
    }

    fn credentials() -> S3Credentials {
        S3Credentials::new("AKIAEXAMPLE", "secret")
    }

    #[test]
    fn test_new_s3_backend() {
        let backend = S3Backend::new(
            "https://s3.example.com",
            "us-east-1",
            &credentials(),
            "posts",
            "posts-protected",
            delivery(),
        )
        .expect("should create backend");

        assert_eq!(backend.name(), "s3");
        assert_eq!(backend.endpoint(), "https://s3.example.com");
        assert_eq!(backend.bucket(Visibility::Public), "posts");
        assert_eq!(backend.bucket(Visibility::Protected), "posts-protected");
        assert!(backend.delivery().is_secure());
    }

    #[test]
    fn test_blank_secret_is_rejected() {
        let err = S3Backend::new(
            "https://s3.example.com",
            "us-east-1",
            &S3Credentials::new("AKIAEXAMPLE", " "),
            "posts",
            "posts-protected",
            delivery(),
        )
        .unwrap_err();
        assert!(
            matches!(err, StorageError::Configuration(ref m) if m == "missing s3.secret_access_key")
        );
    }

    #[test]
    fn test_file_url_uses_bucket_specific_base() {
        let backend = S3Backend::new(
            "https://s3.example.com",
            "us-east-1",
            &credentials(),
            "posts",
            "posts-protected",
            delivery(),
        )
        .expect("should create backend");

        assert_eq!(
            backend.file_url("ab/abc.png", Visibility::Public),
            "https://cdn.yiff.rocks/ab/abc.png"
        );
        assert_eq!(
            backend.file_url("ab/abc.png", Visibility::Protected),
            "https://protected.cdn.yiff.rocks/ab/abc.png"
        );
    }
}
