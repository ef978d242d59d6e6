//! Core policy for the image board.
//!
//! This crate contains pure policy with ZERO web or database dependencies.
//!
//! # Modules
//!
//! - `storage` - Storage backend trait, local and S3 backends, selection
//! - `tags` - Tag categories, restriction flags and display order
//! - `file_types` - Accepted upload formats
//! - `context` - Immutable state assembled once at startup

pub mod context;
pub mod file_types;
pub mod storage;
pub mod tags;

pub use context::AppContext;
pub use file_types::{FileType, FileTypeError, FileTypePolicy};
pub use storage::{StorageBackend, StorageError, StoredLocation, Visibility};
pub use tags::{TagCategory, TagRestrictions, TagTaxonomy, TaxonomyError};
