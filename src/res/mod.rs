//! Android resource model: `strings.xml` documents, the flat key space
//! derived from them, write-back with element synthesis, merging, and value
//! escaping.

pub mod android;
pub mod escape;
pub mod key;
pub mod merge;
pub mod model;

pub use escape::escape_android_value;
pub use key::ResourceKey;
pub use merge::merge_documents;
pub use model::{
    ArrayEntry, PluralItem, PluralsEntry, ResourceElement, StringEntry, StringsDocument,
};
