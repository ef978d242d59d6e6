//! Tag taxonomy: category identifiers, restriction flags and display order.
//!
//! The table is fixed at compile time. Restriction flags govern who may
//! create tags in a category; the display order governs presentation and
//! search precedence only.

mod category;
mod error;
mod restriction;
mod taxonomy;

pub use category::TagCategory;
pub use error::TaxonomyError;
pub use restriction::TagRestrictions;
pub use taxonomy::{DISPLAY_ORDER, TAG_TABLE, TagCategoryEntry, TagTaxonomy};
