//! Merging translated documents into a base document.
//!
//! Used by the APK pipeline, where one target language accumulates
//! translations from several discovered source locales: the base document
//! provides the structural template and each addition overlays it, add-wins.

use crate::res::model::{ResourceElement, StringsDocument};

/// Overlay `addition` onto `base`.
///
/// String entries are updated in place by name, or appended when the base
/// does not define them. Array and plurals containers are replaced wholesale
/// by name: the addition's full item set supersedes the base's, with no
/// item-level merging inside a container.
pub fn merge_documents(base: &mut StringsDocument, addition: StringsDocument) {
    for element in addition.elements {
        match element {
            ResourceElement::String(add) => match base.string_index(&add.name) {
                Some(i) => {
                    if let ResourceElement::String(entry) = &mut base.elements[i] {
                        entry.value = add.value;
                    }
                }
                None => base.elements.push(ResourceElement::String(add)),
            },
            ResourceElement::StringArray(add) => match base.array_index(&add.name) {
                Some(i) => base.elements[i] = ResourceElement::StringArray(add),
                None => base.elements.push(ResourceElement::StringArray(add)),
            },
            ResourceElement::Plurals(add) => match base.plurals_index(&add.name) {
                Some(i) => base.elements[i] = ResourceElement::Plurals(add),
                None => base.elements.push(ResourceElement::Plurals(add)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::res::android::from_str;
    use crate::res::key::ResourceKey;

    #[test]
    fn test_addition_value_wins_on_string_conflict() {
        let mut base =
            from_str(r#"<resources><string name="x">old</string></resources>"#).unwrap();
        let addition =
            from_str(r#"<resources><string name="x">new</string></resources>"#).unwrap();
        merge_documents(&mut base, addition);

        assert_eq!(
            base.extract().get(&ResourceKey::string("x")).unwrap(),
            "new"
        );
        assert_eq!(base.elements.len(), 1);
    }

    #[test]
    fn test_missing_string_appended() {
        let mut base =
            from_str(r#"<resources><string name="x">kept</string></resources>"#).unwrap();
        let addition =
            from_str(r#"<resources><string name="y">added</string></resources>"#).unwrap();
        merge_documents(&mut base, addition);

        let flat = base.extract();
        assert_eq!(flat.get(&ResourceKey::string("x")).unwrap(), "kept");
        assert_eq!(flat.get(&ResourceKey::string("y")).unwrap(), "added");
    }

    #[test]
    fn test_array_replaced_wholesale() {
        let mut base = from_str(
            r#"<resources><string-array name="a">
                <item>one</item><item>two</item><item>three</item>
            </string-array></resources>"#,
        )
        .unwrap();
        let addition = from_str(
            r#"<resources><string-array name="a">
                <item>uno</item>
            </string-array></resources>"#,
        )
        .unwrap();
        merge_documents(&mut base, addition);

        match &base.elements[0] {
            ResourceElement::StringArray(array) => {
                // No item-level merge: the shorter addition wins entirely.
                assert_eq!(array.items, vec!["uno"]);
            }
            _ => panic!("expected array element"),
        }
    }

    #[test]
    fn test_plurals_replaced_wholesale() {
        let mut base = from_str(
            r#"<resources><plurals name="p">
                <item quantity="one">1</item>
                <item quantity="other">n</item>
            </plurals></resources>"#,
        )
        .unwrap();
        let addition = from_str(
            r#"<resources><plurals name="p">
                <item quantity="other">muchos</item>
            </plurals></resources>"#,
        )
        .unwrap();
        merge_documents(&mut base, addition);

        match &base.elements[0] {
            ResourceElement::Plurals(plurals) => {
                assert_eq!(plurals.items.len(), 1);
                assert_eq!(plurals.items[0].quantity, "other");
                assert_eq!(plurals.items[0].value, "muchos");
            }
            _ => panic!("expected plurals element"),
        }
    }

    #[test]
    fn test_plural_update_via_flat_map_keeps_siblings() {
        // Only `other` arrives in a translated flat map; `one` must stay
        // untouched in the base. Write-back through apply_translations (not
        // container merge) is the path that edits single quantities.
        let mut base = from_str(
            r#"<resources><plurals name="p">
                <item quantity="one">1 item</item>
                <item quantity="other">%d items</item>
            </plurals></resources>"#,
        )
        .unwrap();
        let mut translations = indexmap::IndexMap::new();
        translations.insert(
            ResourceKey::plural_item("p", "other"),
            "%d elementos".to_string(),
        );
        base.apply_translations(&translations);

        match &base.elements[0] {
            ResourceElement::Plurals(plurals) => {
                assert_eq!(plurals.items[0].value, "1 item");
                assert_eq!(plurals.items[1].value, "%d elementos");
            }
            _ => panic!("expected plurals element"),
        }
    }

    #[test]
    fn test_merge_into_empty_base_synthesizes_everything() {
        let mut base = StringsDocument::default();
        let addition = from_str(
            r#"<resources>
                <string name="s">v</string>
                <plurals name="p"><item quantity="one">1</item></plurals>
            </resources>"#,
        )
        .unwrap();
        merge_documents(&mut base, addition);
        assert_eq!(base.elements.len(), 2);
    }
}
