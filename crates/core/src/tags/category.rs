//! Tag category identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::TaxonomyError;

/// Semantic bucket a tag belongs to.
///
/// The discriminant is the persisted id and must never change. Display
/// names are derived from the constant name, not stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum TagCategory {
    /// Anything not covered below.
    General = 0,
    /// Creator of the work.
    Artist = 1,
    /// Owning franchise or property.
    Copyright = 2,
    /// Named character.
    Character = 3,
    /// Species depicted.
    Species = 4,
    /// Known-bad tags kept so they can be found and fixed.
    Invalid = 5,
    /// Background or story information.
    Lore = 6,
    /// Information about the file rather than its content.
    Meta = 7,
}

impl TagCategory {
    /// Every category, by id.
    pub const ALL: [Self; 8] = [
        Self::General,
        Self::Artist,
        Self::Copyright,
        Self::Character,
        Self::Species,
        Self::Invalid,
        Self::Lore,
        Self::Meta,
    ];

    /// Persisted id.
    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Category for a persisted id.
    pub fn from_id(id: u8) -> Result<Self, TaxonomyError> {
        Self::ALL
            .into_iter()
            .find(|c| c.id() == id)
            .ok_or(TaxonomyError::UnknownCategory(id))
    }

    /// Upper snake case constant name, e.g. `GENERAL`.
    #[must_use]
    pub const fn constant_name(self) -> &'static str {
        match self {
            Self::General => "GENERAL",
            Self::Artist => "ARTIST",
            Self::Copyright => "COPYRIGHT",
            Self::Character => "CHARACTER",
            Self::Species => "SPECIES",
            Self::Invalid => "INVALID",
            Self::Lore => "LORE",
            Self::Meta => "META",
        }
    }

    /// Display name: the constant name split on underscores, each word
    /// pascal cased.
    #[must_use]
    pub fn name(self) -> String {
        pascal_case(self.constant_name())
    }

    /// Category for a display or constant name, ignoring case.
    pub fn from_name(name: &str) -> Result<Self, TaxonomyError> {
        let wanted = name.trim();
        Self::ALL
            .into_iter()
            .find(|c| {
                c.constant_name().eq_ignore_ascii_case(wanted) || c.name().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| TaxonomyError::UnknownCategoryName(name.to_string()))
    }
}

fn pascal_case(constant: &str) -> String {
    constant
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase()
            })
        })
        .collect()
}

impl fmt::Display for TagCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl From<TagCategory> for u8 {
    fn from(category: TagCategory) -> Self {
        category.id()
    }
}

impl TryFrom<u8> for TagCategory {
    type Error = TaxonomyError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Self::from_id(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_unique_and_round_trip() {
        let ids: HashSet<u8> = TagCategory::ALL.iter().map(|c| c.id()).collect();
        assert_eq!(ids.len(), TagCategory::ALL.len());
        for category in TagCategory::ALL {
            assert_eq!(TagCategory::from_id(category.id()), Ok(category));
        }
    }

    #[test]
    fn test_unknown_id() {
        assert_eq!(
            TagCategory::from_id(42),
            Err(TaxonomyError::UnknownCategory(42))
        );
    }

    #[rstest]
    #[case(TagCategory::General, "General")]
    #[case(TagCategory::Copyright, "Copyright")]
    #[case(TagCategory::Meta, "Meta")]
    fn test_name_is_derived(#[case] category: TagCategory, #[case] expected: &str) {
        assert_eq!(category.name(), expected);
        assert_eq!(category.to_string(), expected);
    }

    #[rstest]
    #[case("FAN_ART", "FanArt")]
    #[case("GENERAL", "General")]
    #[case("_LEADING__DOUBLE_", "LeadingDouble")]
    fn test_pascal_case(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(pascal_case(input), expected);
    }

    #[rstest]
    #[case("species", TagCategory::Species)]
    #[case("LORE", TagCategory::Lore)]
    #[case(" Artist ", TagCategory::Artist)]
    fn test_from_name(#[case] name: &str, #[case] expected: TagCategory) {
        assert_eq!(TagCategory::from_name(name), Ok(expected));
    }

    #[test]
    fn test_from_name_unknown() {
        assert!(matches!(
            TagCategory::from_name("pool"),
            Err(TaxonomyError::UnknownCategoryName(_))
        ));
    }

    #[test]
    fn test_serde_uses_id() {
        assert_eq!(
            serde_json::to_string(&TagCategory::Invalid).expect("serialize"),
            "5"
        );
        let parsed: TagCategory = serde_json::from_str("3").expect("deserialize");
        assert_eq!(parsed, TagCategory::Character);
        assert!(serde_json::from_str::<TagCategory>("99").is_err());
    }
}
