//! Record patches and the deep-merge rules applied to generated documents.

use bson::{Bson, Document};

/// Describes how a generated record is modified before insertion.
///
/// A patch is applied to every record of a creation call (except for
/// [`pick`](crate::Seeder::pick), which applies it to the standout record
/// only):
///
/// - [`Patch::Merge`] deep-merges a partial document on top of the record's
///   BSON form. Only document-vs-document keys merge recursively; arrays and
///   every other value kind are replaced wholesale by the patch side, and an
///   explicit `null` overrides and persists as `null`.
/// - [`Patch::Map`] invokes a function with the record and its 0-based
///   position in the batch, replacing the record with the return value.
///
/// A `Merge` patch may introduce fields outside `T`'s shape. Those fields
/// are inserted into the store but cannot survive the round-trip back into
/// a typed `T`; use `Seeder<bson::Document>` for free-form fixtures.
pub enum Patch<T> {
    /// Fields deep-merged on top of each generated record.
    Merge(Document),
    /// Function applied to each generated record with its batch index.
    Map(Box<dyn Fn(T, usize) -> T + Send + Sync>),
}

impl<T> Patch<T> {
    /// Patch that deep-merges `fields` on top of each generated record.
    pub fn merge(fields: Document) -> Self {
        Patch::Merge(fields)
    }

    /// Patch that maps each generated record through `f`.
    pub fn map(f: impl Fn(T, usize) -> T + Send + Sync + 'static) -> Self {
        Patch::Map(Box::new(f))
    }
}

impl<T> From<Document> for Patch<T> {
    fn from(fields: Document) -> Self {
        Patch::Merge(fields)
    }
}

/// Deep-merge `patch` on top of `base`.
///
/// For each key in `patch`: if both sides hold an embedded document the two
/// are merged recursively; in every other case the patch value replaces the
/// base value outright. Arrays are replaced wholesale, never concatenated or
/// merged element-wise, and `Bson::Null` is written through so the key ends
/// up present-but-null rather than absent.
pub fn deep_merge(base: &mut Document, patch: &Document) {
    for (key, value) in patch {
        if let (Some(Bson::Document(nested)), Bson::Document(patch_nested)) =
            (base.get_mut(key), value)
        {
            deep_merge(nested, patch_nested);
            continue;
        }
        base.insert(key, value.clone());
    }
}
