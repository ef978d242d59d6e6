//! Process-wide state resolved once at startup.

use std::fmt;
use std::sync::Arc;

use imageboard_shared::{AppConfig, Environment};
use tracing::info;

use crate::file_types::FileTypePolicy;
use crate::storage::{StorageBackend, StorageError, Visibility, select_backend};
use crate::tags::TagTaxonomy;

/// Immutable application state handed to request handlers.
///
/// Built once before any request is served and shared by `Arc`; nothing in
/// it changes afterwards.
#[derive(Clone)]
pub struct AppContext {
    environment: Environment,
    storage: Arc<dyn StorageBackend>,
    taxonomy: TagTaxonomy,
    file_types: FileTypePolicy,
}

impl AppContext {
    /// Select the storage backend and assemble the context.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the storage backend cannot be
    /// built.
    pub fn initialize(config: &AppConfig) -> Result<Self, StorageError> {
        let storage = select_backend(config)?;
        let context = Self::with_backend(config.environment, storage);
        info!(
            environment = %context.environment,
            storage = context.storage.name(),
            file_types = ?context.file_types.allowed_file_extensions(),
            "Application context initialized"
        );
        Ok(context)
    }

    /// Assemble a context around an already built backend.
    #[must_use]
    pub fn with_backend(environment: Environment, storage: Arc<dyn StorageBackend>) -> Self {
        Self {
            environment,
            storage,
            taxonomy: TagTaxonomy::standard(),
            file_types: FileTypePolicy::default(),
        }
    }

    /// Deployment mode.
    #[must_use]
    pub const fn environment(&self) -> Environment {
        self.environment
    }

    /// The selected storage backend.
    #[must_use]
    pub fn storage(&self) -> &Arc<dyn StorageBackend> {
        &self.storage
    }

    /// Tag taxonomy.
    #[must_use]
    pub const fn taxonomy(&self) -> &TagTaxonomy {
        &self.taxonomy
    }

    /// Accepted upload formats.
    #[must_use]
    pub const fn file_types(&self) -> &FileTypePolicy {
        &self.file_types
    }

    /// URL `key` is served from.
    #[must_use]
    pub fn file_url(&self, key: &str, visibility: Visibility) -> String {
        self.storage.file_url(key, visibility)
    }
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("environment", &self.environment)
            .field("storage", &self.storage.name())
            .field("taxonomy", &self.taxonomy)
            .field("file_types", &self.file_types)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MockStorageBackend;
    use crate::tags::TagCategory;
    use imageboard_shared::StorageSettings;
    use mockall::predicate::eq;

    #[test]
    fn test_file_url_delegates_to_backend() {
        let mut backend = MockStorageBackend::new();
        backend
            .expect_file_url()
            .with(eq("abc.png"), eq(Visibility::Protected))
            .times(1)
            .returning(|key, _| format!("https://protected.example/{key}"));

        let context = AppContext::with_backend(Environment::Production, Arc::new(backend));
        assert_eq!(
            context.file_url("abc.png", Visibility::Protected),
            "https://protected.example/abc.png"
        );
    }

    #[test]
    fn test_debug_names_backend() {
        let mut backend = MockStorageBackend::new();
        backend.expect_name().return_const("mock");
        let context = AppContext::with_backend(Environment::Development, Arc::new(backend));
        assert!(format!("{context:?}").contains("storage: \"mock\""));
    }

    #[test]
    fn test_initialize_development() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = AppConfig {
            storage: StorageSettings {
                tmp_dir: Some(dir.path().to_path_buf()),
            },
            ..AppConfig::default()
        };

        let context = AppContext::initialize(&config).expect("context");
        assert_eq!(context.environment(), Environment::Development);
        assert_eq!(context.storage().name(), "local");
        assert!(context.taxonomy().is_creation_restricted(TagCategory::Meta));
        assert!(context.file_types().is_mime_type_allowed("image/gif"));
        assert!(dir.path().join("public").is_dir());
        assert!(dir.path().join("protected").is_dir());
    }

    #[test]
    fn test_initialize_production_without_credentials_fails() {
        let config = AppConfig {
            environment: Environment::Production,
            ..AppConfig::default()
        };
        let err = AppContext::initialize(&config).unwrap_err();
        assert!(err.is_fatal());
    }
}
