//! The fixed category table and display order.

use serde::Serialize;

use super::category::TagCategory;
use super::error::TaxonomyError;
use super::restriction::TagRestrictions;

/// One row of the taxonomy table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TagCategoryEntry {
    /// Category.
    pub category: TagCategory,
    /// Flags attached to it.
    pub restrictions: TagRestrictions,
}

impl TagCategoryEntry {
    const fn new(category: TagCategory, restrictions: TagRestrictions) -> Self {
        Self {
            category,
            restrictions,
        }
    }
}

/// Exactly one entry per category.
pub const TAG_TABLE: [TagCategoryEntry; 8] = [
    TagCategoryEntry::new(TagCategory::General, TagRestrictions::NONE),
    TagCategoryEntry::new(TagCategory::Artist, TagRestrictions::NONE),
    TagCategoryEntry::new(TagCategory::Copyright, TagRestrictions::NONE),
    TagCategoryEntry::new(TagCategory::Character, TagRestrictions::NONE),
    TagCategoryEntry::new(TagCategory::Species, TagRestrictions::NONE),
    TagCategoryEntry::new(TagCategory::Invalid, TagRestrictions::RESTRICT_CREATE),
    TagCategoryEntry::new(TagCategory::Lore, TagRestrictions::RESTRICT_CREATE),
    TagCategoryEntry::new(TagCategory::Meta, TagRestrictions::RESTRICT_CREATE),
];

/// Presentation precedence. `Character` is deliberately absent; see
/// [`TagTaxonomy::display_rank`] for where unlisted categories go.
pub const DISPLAY_ORDER: [TagCategory; 7] = [
    TagCategory::Invalid,
    TagCategory::Artist,
    TagCategory::Copyright,
    TagCategory::Species,
    TagCategory::General,
    TagCategory::Meta,
    TagCategory::Lore,
];

/// Read-only view over the taxonomy table and display order.
#[derive(Debug, Clone, Copy)]
pub struct TagTaxonomy {
    entries: &'static [TagCategoryEntry],
    order: &'static [TagCategory],
}

impl Default for TagTaxonomy {
    fn default() -> Self {
        Self::standard()
    }
}

impl TagTaxonomy {
    /// The compiled-in taxonomy.
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            entries: &TAG_TABLE,
            order: &DISPLAY_ORDER,
        }
    }

    /// All table rows.
    #[must_use]
    pub const fn entries(&self) -> &'static [TagCategoryEntry] {
        self.entries
    }

    /// Restrictions for a raw category id.
    pub fn restrictions_for(&self, id: u8) -> Result<TagRestrictions, TaxonomyError> {
        self.entries
            .iter()
            .find(|entry| entry.category.id() == id)
            .map(|entry| entry.restrictions)
            .ok_or(TaxonomyError::UnknownCategory(id))
    }

    /// Restrictions for a category. A category with no table row is
    /// treated as creation-restricted.
    #[must_use]
    pub fn restrictions(&self, category: TagCategory) -> TagRestrictions {
        match self.restrictions_for(category.id()) {
            Ok(restrictions) => restrictions,
            Err(err) => {
                debug_assert!(false, "{err}");
                TagRestrictions::RESTRICT_CREATE
            }
        }
    }

    /// Whether only privileged users may create tags in `category`.
    #[must_use]
    pub fn is_creation_restricted(&self, category: TagCategory) -> bool {
        self.restrictions(category)
            .contains(TagRestrictions::RESTRICT_CREATE)
    }

    /// Categories anyone may create tags in, by id.
    #[must_use]
    pub fn creatable_categories(&self) -> Vec<TagCategory> {
        self.entries
            .iter()
            .filter(|entry| !entry.restrictions.contains(TagRestrictions::RESTRICT_CREATE))
            .map(|entry| entry.category)
            .collect()
    }

    /// Fixed display precedence. Not every category is listed.
    #[must_use]
    pub const fn display_order(&self) -> &'static [TagCategory] {
        self.order
    }

    /// Sort rank of a category. Listed categories rank by position;
    /// unlisted ones rank after all listed ones, by id.
    #[must_use]
    pub fn display_rank(&self, category: TagCategory) -> usize {
        self.order
            .iter()
            .position(|c| *c == category)
            .unwrap_or_else(|| self.order.len() + usize::from(category.id()))
    }

    /// Stable sort of `items` by the display rank of their category.
    pub fn sort_by_display_order<T, F>(&self, items: &mut [T], category_of: F)
    where
        F: Fn(&T) -> TagCategory,
    {
        items.sort_by_key(|item| self.display_rank(category_of(item)));
    }
}
