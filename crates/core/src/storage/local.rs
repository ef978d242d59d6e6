//! Local filesystem backend (development only).

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use opendal::{Operator, services};

use super::backend::{StorageBackend, StoredLocation, write_object};
use super::config::{Delivery, Visibility};
use super::error::StorageError;

/// Stores files under two local directories.
///
/// Public files live at `<root>/<key>`, protected files at
/// `<protected_root>/<key>`. The two directories are siblings, so no public
/// key can name a protected file. URLs are composed from the configured CDN
/// bases; nothing here serves the files.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    root: PathBuf,
    protected_root: PathBuf,
    public: Operator,
    protected: Operator,
    delivery: Delivery,
}

impl LocalBackend {
    /// Create a backend writing public files under `root` and protected
    /// files under `protected_root`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if either directory is not valid UTF-8,
    /// one contains the other, or OpenDAL rejects it.
    pub fn new(
        root: impl Into<PathBuf>,
        protected_root: impl Into<PathBuf>,
        delivery: Delivery,
    ) -> Result<Self, StorageError> {
        let root = root.into();
        let protected_root = protected_root.into();
        if root.starts_with(&protected_root) || protected_root.starts_with(&root) {
            return Err(StorageError::configuration(format!(
                "public root {} and protected root {} overlap",
                root.display(),
                protected_root.display()
            )));
        }
        let public = fs_operator(&root)?;
        let protected = fs_operator(&protected_root)?;
        Ok(Self {
            root,
            protected_root,
            public,
            protected,
            delivery,
        })
    }

    /// Directory for public files.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for protected files.
    #[must_use]
    pub fn protected_root(&self) -> &Path {
        &self.protected_root
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

fn fs_operator(root: &Path) -> Result<Operator, StorageError> {
    let builder = services::Fs::default().root(
        root.to_str()
            .ok_or_else(|| StorageError::configuration("invalid path"))?,
    );

    Ok(Operator::new(builder)
        .map_err(|e| StorageError::configuration(e.to_string()))?
        .finish())
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn name(&self) -> &'static str {
        "local"
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
        Delivery::new("https://cdn.yiff.rocks", "https://protected.cdn.yiff.rocks", false)
            .expect("valid delivery")
    }

    fn backend_in(dir: &Path) -> LocalBackend {
        LocalBackend::new(dir.join("public"), dir.join("protected"), delivery()).expect("backend")
    }

    #[tokio::test]
    async fn test_store_writes_public_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = backend_in(dir.path());

        let stored = backend
            .store(Bytes::from_static(b"png bytes"), "ab/abc.png")
            .await
            .expect("store");

        assert_eq!(stored.key, "ab/abc.png");
        assert_eq!(stored.visibility, Visibility::Public);
        assert_eq!(stored.size, 9);
        assert_eq!(stored.backend, "local");
        assert_eq!(stored.url, "https://cdn.yiff.rocks/ab/abc.png");
        let on_disk = std::fs::read(dir.path().join("public/ab/abc.png")).expect("file on disk");
        assert_eq!(on_disk, b"png bytes");
    }

    #[tokio::test]
    async fn test_store_protected_goes_to_sibling_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = backend_in(dir.path());

        let stored = backend
            .store_with_visibility(Bytes::from_static(b"x"), "abc.png", Visibility::Protected)
            .await
            .expect("store");

        assert_eq!(stored.url, "https://protected.cdn.yiff.rocks/abc.png");
        assert!(dir.path().join("protected/abc.png").is_file());
        assert!(!dir.path().join("public/abc.png").exists());
    }

    #[tokio::test]
    async fn test_public_key_cannot_name_protected_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = backend_in(dir.path());

        backend
            .store_with_visibility(Bytes::from_static(b"secret"), "abc.png", Visibility::Protected)
            .await
            .expect("store");
        backend
            .store(Bytes::from_static(b"public"), "protected/abc.png")
            .await
            .expect("store");

        let protected = std::fs::read(dir.path().join("protected/abc.png")).expect("file on disk");
        assert_eq!(protected, b"secret");
        assert!(dir.path().join("public/protected/abc.png").is_file());
    }

    #[test]
    fn test_new_rejects_nested_roots() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = LocalBackend::new(dir.path(), dir.path().join("protected"), delivery())
            .unwrap_err();
        assert!(matches!(err, StorageError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_store_rejects_traversal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = backend_in(dir.path());

        let err = backend
            .store(Bytes::from_static(b"x"), "../protected/escape.png")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }

    #[tokio::test]
    async fn test_store_surfaces_write_failure() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = backend_in(dir.path());
        // A regular file where the key needs a directory.
        std::fs::write(dir.path().join("public/ab"), b"file").expect("blocker");

        let err = backend
            .store(Bytes::from_static(b"x"), "ab/x.png")
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::Write { ref key, .. } if key == "ab/x.png"));
        assert!(!err.is_fatal());
    }

    #[tokio::test]
    async fn test_concurrent_stores() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = std::sync::Arc::new(backend_in(dir.path()));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let backend = backend.clone();
                tokio::spawn(async move {
                    backend
                        .store(Bytes::from(vec![0u8; i + 1]), &format!("n/{i}.webm"))
                        .await
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let stored = handle.await.expect("join").expect("store");
            assert_eq!(stored.size, u64::try_from(i + 1).expect("small"));
        }
    }

    #[test]
    fn test_file_url_is_stable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = backend_in(dir.path());
        let first = backend.file_url("abc.png", Visibility::Public);
        assert_eq!(first, backend.file_url("abc.png", Visibility::Public));
        assert_ne!(first, backend.file_url("abc.png", Visibility::Protected));
    }
}
