//! Accepted upload formats.
//!
//! A single ordered list of (MIME type, extension) pairs is the source of
//! truth; the MIME and extension views are derived from it positionally.
//! Earlier entries take precedence when a lookup could match more than one.

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

/// Built-in accepted formats, in precedence order.
pub const DEFAULT_FILE_TYPES: [(&str, &str); 5] = [
    ("image/png", "png"),
    ("image/jpeg", "jpg"),
    ("image/apng", "apng"),
    ("image/gif", "gif"),
    ("video/webm", "webm"),
];

/// File-type policy errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FileTypeError {
    /// MIME type not accepted.
    #[error("MIME type '{0}' is not allowed")]
    NotAllowed(String),

    /// The same MIME type appears twice in a policy.
    #[error("duplicate MIME type '{0}'")]
    DuplicateMimeType(String),

    /// The same extension appears twice in a policy.
    #[error("duplicate file extension '{0}'")]
    DuplicateExtension(String),
}

/// One accepted format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileType {
    /// MIME type, lowercase.
    pub mime_type: String,
    /// Extension without the dot, lowercase.
    pub extension: String,
}

/// Ordered set of accepted formats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTypePolicy {
    types: Vec<FileType>,
}

impl Default for FileTypePolicy {
    fn default() -> Self {
        Self {
            types: DEFAULT_FILE_TYPES
                .iter()
                .map(|(mime, ext)| FileType {
                    mime_type: (*mime).to_string(),
                    extension: (*ext).to_string(),
                })
                .collect(),
        }
    }
}

impl FileTypePolicy {
    /// Build a policy from (MIME, extension) pairs in precedence order.
    ///
    /// # Errors
    ///
    /// Returns an error if a MIME type or extension repeats.
    pub fn new<I, M, E>(types: I) -> Result<Self, FileTypeError>
    where
        I: IntoIterator<Item = (M, E)>,
        M: AsRef<str>,
        E: AsRef<str>,
    {
        let mut mimes = HashSet::new();
        let mut extensions = HashSet::new();
        let mut list = Vec::new();
        for (mime, ext) in types {
            let mime_type = normalize_mime(mime.as_ref());
            let extension = normalize_extension(ext.as_ref());
            if !mimes.insert(mime_type.clone()) {
                return Err(FileTypeError::DuplicateMimeType(mime_type));
            }
            if !extensions.insert(extension.clone()) {
                return Err(FileTypeError::DuplicateExtension(extension));
            }
            list.push(FileType {
                mime_type,
                extension,
            });
        }
        Ok(Self { types: list })
    }

    /// Accepted formats in precedence order.
    #[must_use]
    pub fn file_types(&self) -> &[FileType] {
        &self.types
    }

    /// Accepted MIME types, aligned with [`Self::allowed_file_extensions`].
    #[must_use]
    pub fn allowed_mime_types(&self) -> Vec<&str> {
        self.types.iter().map(|t| t.mime_type.as_str()).collect()
    }

    /// Accepted extensions, aligned with [`Self::allowed_mime_types`].
    #[must_use]
    pub fn allowed_file_extensions(&self) -> Vec<&str> {
        self.types.iter().map(|t| t.extension.as_str()).collect()
    }

    /// Whether a detected MIME type is acceptable. Parameters such as
    /// `; charset=...` and letter case are ignored.
    #[must_use]
    pub fn is_mime_type_allowed(&self, mime_type: &str) -> bool {
        self.lookup_mime(mime_type).is_some()
    }

    /// Accept or reject a detected MIME type.
    pub fn validate(&self, mime_type: &str) -> Result<&FileType, FileTypeError> {
        self.lookup_mime(mime_type)
            .ok_or_else(|| FileTypeError::NotAllowed(mime_type.to_string()))
    }

    /// Canonical extension for a MIME type.
    #[must_use]
    pub fn extension_for(&self, mime_type: &str) -> Option<&str> {
        self.lookup_mime(mime_type).map(|t| t.extension.as_str())
    }

    /// MIME type for an extension, with or without the leading dot.
    #[must_use]
    pub fn mime_for(&self, extension: &str) -> Option<&str> {
        let wanted = normalize_extension(extension);
        self.types
            .iter()
            .find(|t| t.extension == wanted)
            .map(|t| t.mime_type.as_str())
    }

    fn lookup_mime(&self, mime_type: &str) -> Option<&FileType> {
        let wanted = normalize_mime(mime_type);
        self.types.iter().find(|t| t.mime_type == wanted)
    }
}

fn normalize_mime(mime_type: &str) -> String {
    mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_ascii_lowercase()
}
