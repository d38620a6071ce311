//! Flat key space for Android resources.
//!
//! Every translatable element of a `strings.xml` document maps to exactly
//! one composite key, derived from tree structure: element kind, name, and
//! (for containers) the item's position or quantity tag. Keys are what the
//! translation run iterates over and what write-back resolves against.

use std::fmt;

/// Identity of one translatable value within a resource document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKey {
    /// A scalar `<string name="...">` value.
    String { name: String },
    /// One `<item>` of a `<string-array name="...">`, by zero-based position.
    ArrayItem { name: String, index: usize },
    /// One `<item quantity="...">` of a `<plurals name="...">`.
    PluralItem { name: String, quantity: String },
}

impl ResourceKey {
    pub fn string(name: impl Into<String>) -> Self {
        ResourceKey::String { name: name.into() }
    }

    pub fn array_item(name: impl Into<String>, index: usize) -> Self {
        ResourceKey::ArrayItem {
            name: name.into(),
            index,
        }
    }

    pub fn plural_item(name: impl Into<String>, quantity: impl Into<String>) -> Self {
        ResourceKey::PluralItem {
            name: name.into(),
            quantity: quantity.into(),
        }
    }

    /// The resource name shared by all keys of one element.
    pub fn name(&self) -> &str {
        match self {
            ResourceKey::String { name }
            | ResourceKey::ArrayItem { name, .. }
            | ResourceKey::PluralItem { name, .. } => name,
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKey::String { name } => write!(f, "string:{name}"),
            ResourceKey::ArrayItem { name, index } => write!(f, "array:{name}:{index}"),
            ResourceKey::PluralItem { name, quantity } => write!(f, "plurals:{name}:{quantity}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_display_shapes() {
        assert_eq!(ResourceKey::string("app_name").to_string(), "string:app_name");
        assert_eq!(
            ResourceKey::array_item("colors", 2).to_string(),
            "array:colors:2"
        );
        assert_eq!(
            ResourceKey::plural_item("songs", "other").to_string(),
            "plurals:songs:other"
        );
    }

    #[test]
    fn test_keys_unique_per_structure() {
        let keys: HashSet<ResourceKey> = [
            ResourceKey::string("x"),
            ResourceKey::array_item("x", 0),
            ResourceKey::array_item("x", 1),
            ResourceKey::plural_item("x", "one"),
            ResourceKey::plural_item("x", "other"),
        ]
        .into_iter()
        .collect();
        assert_eq!(keys.len(), 5);
    }

    #[test]
    fn test_name_accessor() {
        assert_eq!(ResourceKey::plural_item("songs", "few").name(), "songs");
        assert_eq!(ResourceKey::array_item("colors", 7).name(), "colors");
    }
}
