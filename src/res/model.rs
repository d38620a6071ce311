//! In-memory model of a `strings.xml` document.
//!
//! The document is the durable artifact: a translation run derives a flat
//! key→text view from it ([`StringsDocument::extract`]), translates the
//! values, and writes them back by structural identity
//! ([`StringsDocument::apply_translations`]), synthesizing elements for keys
//! the document does not define yet.

use crate::res::escape::escape_android_value;
use crate::res::key::ResourceKey;
use indexmap::IndexMap;

/// A scalar `<string>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringEntry {
    pub name: String,
    pub value: String,
    /// The `translatable` attribute; `None` when absent (defaults to true).
    pub translatable: Option<bool>,
}

/// A `<string-array>` element. Item position is identity, so empty items
/// keep their slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayEntry {
    pub name: String,
    pub translatable: Option<bool>,
    pub items: Vec<String>,
}

/// One `<item quantity="...">` of a plurals element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluralItem {
    pub quantity: String,
    pub value: String,
}

/// A `<plurals>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluralsEntry {
    pub name: String,
    pub translatable: Option<bool>,
    pub items: Vec<PluralItem>,
}

/// One top-level element, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceElement {
    String(StringEntry),
    StringArray(ArrayEntry),
    Plurals(PluralsEntry),
}

/// A parsed `strings.xml` document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringsDocument {
    pub elements: Vec<ResourceElement>,
}

fn is_translatable(flag: Option<bool>) -> bool {
    flag.unwrap_or(true)
}

impl StringsDocument {
    /// Derive the flat key→text view of every translatable value.
    ///
    /// An element marked `translatable="false"` is excluded along with all
    /// its children; values with no non-empty text are skipped but (for
    /// arrays) still consume their index.
    pub fn extract(&self) -> IndexMap<ResourceKey, String> {
        let mut flat = IndexMap::new();
        for element in &self.elements {
            match element {
                ResourceElement::String(entry) => {
                    if is_translatable(entry.translatable) && !entry.value.is_empty() {
                        flat.insert(ResourceKey::string(&entry.name), entry.value.clone());
                    }
                }
                ResourceElement::StringArray(array) => {
                    if !is_translatable(array.translatable) {
                        continue;
                    }
                    for (index, item) in array.items.iter().enumerate() {
                        if !item.is_empty() {
                            flat.insert(ResourceKey::array_item(&array.name, index), item.clone());
                        }
                    }
                }
                ResourceElement::Plurals(plurals) => {
                    if !is_translatable(plurals.translatable) {
                        continue;
                    }
                    for item in &plurals.items {
                        if !item.value.is_empty() {
                            flat.insert(
                                ResourceKey::plural_item(&plurals.name, &item.quantity),
                                item.value.clone(),
                            );
                        }
                    }
                }
            }
        }
        flat
    }

    /// Write a translated flat map back into the document.
    ///
    /// Existing elements are located by name / name+index / name+quantity
    /// and their text replaced; keys with no matching element get one
    /// synthesized and appended. Every written value goes through
    /// [`escape_android_value`] first.
    pub fn apply_translations(&mut self, translations: &IndexMap<ResourceKey, String>) {
        for (key, value) in translations {
            let value = escape_android_value(value);
            match key {
                ResourceKey::String { name } => match self.string_index(name) {
                    Some(i) => {
                        if let ResourceElement::String(entry) = &mut self.elements[i] {
                            entry.value = value;
                        }
                    }
                    None => self.elements.push(ResourceElement::String(StringEntry {
                        name: name.clone(),
                        value,
                        translatable: None,
                    })),
                },
                ResourceKey::ArrayItem { name, index } => {
                    let i = match self.array_index(name) {
                        Some(i) => i,
                        None => {
                            self.elements
                                .push(ResourceElement::StringArray(ArrayEntry {
                                    name: name.clone(),
                                    translatable: None,
                                    items: Vec::new(),
                                }));
                            self.elements.len() - 1
                        }
                    };
                    if let ResourceElement::StringArray(array) = &mut self.elements[i] {
                        if array.items.len() <= *index {
                            array.items.resize(index + 1, String::new());
                        }
                        array.items[*index] = value;
                    }
                }
                ResourceKey::PluralItem { name, quantity } => {
                    let i = match self.plurals_index(name) {
                        Some(i) => i,
                        None => {
                            self.elements.push(ResourceElement::Plurals(PluralsEntry {
                                name: name.clone(),
                                translatable: None,
                                items: Vec::new(),
                            }));
                            self.elements.len() - 1
                        }
                    };
                    if let ResourceElement::Plurals(plurals) = &mut self.elements[i] {
                        match plurals.items.iter_mut().find(|it| it.quantity == *quantity) {
                            Some(item) => item.value = value,
                            None => plurals.items.push(PluralItem {
                                quantity: quantity.clone(),
                                value,
                            }),
                        }
                    }
                }
            }
        }
    }

    pub(crate) fn string_index(&self, name: &str) -> Option<usize> {
        self.elements.iter().position(
            |e| matches!(e, ResourceElement::String(entry) if entry.name == name),
        )
    }

    pub(crate) fn array_index(&self, name: &str) -> Option<usize> {
        self.elements.iter().position(
            |e| matches!(e, ResourceElement::StringArray(array) if array.name == name),
        )
    }

    pub(crate) fn plurals_index(&self, name: &str) -> Option<usize> {
        self.elements.iter().position(
            |e| matches!(e, ResourceElement::Plurals(plurals) if plurals.name == name),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_document() -> StringsDocument {
        StringsDocument {
            elements: vec![
                ResourceElement::String(StringEntry {
                    name: "hello".to_string(),
                    value: "Hello %s".to_string(),
                    translatable: None,
                }),
                ResourceElement::String(StringEntry {
                    name: "api_key".to_string(),
                    value: "opaque".to_string(),
                    translatable: Some(false),
                }),
                ResourceElement::StringArray(ArrayEntry {
                    name: "weekdays".to_string(),
                    translatable: None,
                    items: vec!["Monday".to_string(), String::new(), "Wednesday".to_string()],
                }),
                ResourceElement::Plurals(PluralsEntry {
                    name: "songs".to_string(),
                    translatable: None,
                    items: vec![
                        PluralItem {
                            quantity: "one".to_string(),
                            value: "%d song".to_string(),
                        },
                        PluralItem {
                            quantity: "other".to_string(),
                            value: "%d songs".to_string(),
                        },
                    ],
                }),
            ],
        }
    }

    #[test]
    fn test_extract_honors_translatable_flag() {
        let flat = sample_document().extract();
        assert!(flat.contains_key(&ResourceKey::string("hello")));
        assert!(!flat.contains_key(&ResourceKey::string("api_key")));
    }

    #[test]
    fn test_extract_skips_empty_but_keeps_index() {
        let flat = sample_document().extract();
        assert_eq!(
            flat.get(&ResourceKey::array_item("weekdays", 0)).unwrap(),
            "Monday"
        );
        assert!(!flat.contains_key(&ResourceKey::array_item("weekdays", 1)));
        // The empty middle item still consumed index 1.
        assert_eq!(
            flat.get(&ResourceKey::array_item("weekdays", 2)).unwrap(),
            "Wednesday"
        );
    }

    #[test]
    fn test_extract_plural_quantities() {
        let flat = sample_document().extract();
        assert_eq!(
            flat.get(&ResourceKey::plural_item("songs", "one")).unwrap(),
            "%d song"
        );
        assert_eq!(
            flat.get(&ResourceKey::plural_item("songs", "other"))
                .unwrap(),
            "%d songs"
        );
    }

    #[test]
    fn test_extract_order_follows_document() {
        let keys: Vec<String> = sample_document()
            .extract()
            .keys()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            keys,
            vec![
                "string:hello",
                "array:weekdays:0",
                "array:weekdays:2",
                "plurals:songs:one",
                "plurals:songs:other",
            ]
        );
    }

    #[test]
    fn test_apply_updates_existing_elements() {
        let mut doc = sample_document();
        let mut translations = IndexMap::new();
        translations.insert(ResourceKey::string("hello"), "Hola %s".to_string());
        translations.insert(
            ResourceKey::plural_item("songs", "other"),
            "%d canciones".to_string(),
        );
        doc.apply_translations(&translations);

        match &doc.elements[0] {
            ResourceElement::String(entry) => assert_eq!(entry.value, "Hola %s"),
            _ => panic!("expected string element"),
        }
        match &doc.elements[3] {
            ResourceElement::Plurals(plurals) => {
                assert_eq!(plurals.items[1].value, "%d canciones");
                // Untouched quantity survives.
                assert_eq!(plurals.items[0].value, "%d song");
            }
            _ => panic!("expected plurals element"),
        }
    }

    #[test]
    fn test_apply_synthesizes_missing_string() {
        let mut doc = StringsDocument::default();
        let mut translations = IndexMap::new();
        translations.insert(ResourceKey::string("new_key"), "Nuevo".to_string());
        doc.apply_translations(&translations);

        assert_eq!(
            doc.elements,
            vec![ResourceElement::String(StringEntry {
                name: "new_key".to_string(),
                value: "Nuevo".to_string(),
                translatable: None,
            })]
        );
    }

    #[test]
    fn test_apply_synthesizes_array_with_padding() {
        let mut doc = StringsDocument::default();
        let mut translations = IndexMap::new();
        translations.insert(ResourceKey::array_item("colors", 2), "azul".to_string());
        doc.apply_translations(&translations);

        match &doc.elements[0] {
            ResourceElement::StringArray(array) => {
                assert_eq!(array.name, "colors");
                assert_eq!(array.items, vec!["", "", "azul"]);
            }
            _ => panic!("expected array element"),
        }
    }

    #[test]
    fn test_apply_synthesizes_plural_quantity() {
        let mut doc = sample_document();
        let mut translations = IndexMap::new();
        translations.insert(
            ResourceKey::plural_item("songs", "few"),
            "%d pisni".to_string(),
        );
        doc.apply_translations(&translations);

        match &doc.elements[3] {
            ResourceElement::Plurals(plurals) => {
                assert_eq!(plurals.items.len(), 3);
                assert_eq!(plurals.items[2].quantity, "few");
            }
            _ => panic!("expected plurals element"),
        }
    }

    #[test]
    fn test_apply_escapes_values() {
        let mut doc = StringsDocument::default();
        let mut translations = IndexMap::new();
        translations.insert(ResourceKey::string("tip"), "it\u{2019}s fine".to_string());
        doc.apply_translations(&translations);

        match &doc.elements[0] {
            ResourceElement::String(entry) => assert_eq!(entry.value, r"it\'s fine"),
            _ => panic!("expected string element"),
        }
    }
}
