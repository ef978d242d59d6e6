//! Storage backends for uploaded files using Apache OpenDAL.
//!
//! Exactly one backend is selected at startup and shared for the lifetime of
//! the process:
//! - Local filesystem (development)
//! - S3-compatible object storage with separate public and protected buckets
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  dyn StorageBackend (selected once)              │
//! ├────────────────────────────────┬────────────────────────────────┤
//! │ LocalBackend                   │ S3Backend                      │
//! │   <root>/<key>                 │   <bucket>/<key>               │
//! │   <protected_root>/<key>       │   <protected_bucket>/<key>     │
//! ├────────────────────────────────┴────────────────────────────────┤
//! │ file_url(key, visibility) -> <public|protected base URL>/<key>   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

mod backend;
mod config;
mod error;
mod local;
mod s3;
mod selector;

pub use backend::{StorageBackend, StoredLocation, generate_key, validate_key};
pub use config::{BackendConfig, Delivery, S3Credentials, Visibility};
pub use error::StorageError;
pub use local::LocalBackend;
pub use s3::S3Backend;
pub use selector::{resolve_backend_config, select_backend};

#[cfg(test)]
pub use backend::MockStorageBackend;
