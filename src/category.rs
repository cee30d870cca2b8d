//! Closed set of bill-type categories.
//!
//! Every allocator boundary validates against this enumeration; unknown
//! strings are rejected instead of lazily creating new sequences.
use crate::errors::AllocError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bill-type categories recognized by the allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Hr,
    S,
    Hres,
    Sres,
    Hjres,
    Sjres,
    Hconres,
    Sconres,
}

impl Category {
    /// Every recognized category.
    pub const ALL: [Category; 8] = [
        Category::Hr,
        Category::S,
        Category::Hres,
        Category::Sres,
        Category::Hjres,
        Category::Sjres,
        Category::Hconres,
        Category::Sconres,
    ];

    /// Stable lowercase name used as the persisted mapping key.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Hr => "hr",
            Category::S => "s",
            Category::Hres => "hres",
            Category::Sres => "sres",
            Category::Hjres => "hjres",
            Category::Sjres => "sjres",
            Category::Hconres => "hconres",
            Category::Sconres => "sconres",
        }
    }

    /// Uppercase label used when rendering references such as "HR 123".
    pub fn label(self) -> &'static str {
        match self {
            Category::Hr => "HR",
            Category::S => "S",
            Category::Hres => "HRES",
            Category::Sres => "SRES",
            Category::Hjres => "HJRES",
            Category::Sjres => "SJRES",
            Category::Hconres => "HCONRES",
            Category::Sconres => "SCONRES",
        }
    }

    /// Parse user input; trims whitespace and ignores case.
    pub fn parse(value: &str) -> Result<Category, AllocError> {
        let needle = value.trim().to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == needle)
            .ok_or_else(|| AllocError::InvalidCategory(value.trim().to_string()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = AllocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_names_ignoring_case_and_whitespace() {
        assert_eq!(Category::parse("hr").unwrap(), Category::Hr);
        assert_eq!(Category::parse(" HR ").unwrap(), Category::Hr);
        assert_eq!(Category::parse("HConRes").unwrap(), Category::Hconres);
        assert_eq!(Category::parse("sjres").unwrap(), Category::Sjres);
    }

    #[test]
    fn rejects_unknown_names() {
        let err = Category::parse(" xyz ").unwrap_err();
        assert!(matches!(err, AllocError::InvalidCategory(ref raw) if raw == "xyz"));
        assert!(Category::parse("").is_err());
        assert!(Category::parse("hr1").is_err());
    }

    #[test]
    fn wire_names_round_trip_through_serde() {
        for category in Category::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.as_str()));
            let back: Category = serde_json::from_str(&json).unwrap();
            assert_eq!(back, category);
        }
    }

    #[test]
    fn labels_are_uppercase_wire_names() {
        for category in Category::ALL {
            assert_eq!(category.label(), category.as_str().to_ascii_uppercase());
        }
    }
}
