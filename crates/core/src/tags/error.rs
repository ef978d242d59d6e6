//! Taxonomy error types.

use thiserror::Error;

/// Taxonomy lookup errors.
///
/// Typed [`super::TagCategory`] values always resolve; these only surface
/// when raw ids or names coming from storage or requests are looked up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaxonomyError {
    /// No category has this id.
    #[error("unknown tag category id {0}")]
    UnknownCategory(u8),

    /// No category has this name.
    #[error("unknown tag category name '{0}'")]
    UnknownCategoryName(String),
}
