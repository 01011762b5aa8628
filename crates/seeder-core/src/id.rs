//! Identifier assignment for seed documents.

use bson::oid::ObjectId;
use bson::{Bson, Document};

/// Ensure `doc` carries an identifier, returning it.
///
/// A missing `_id` is replaced with a freshly generated [`ObjectId`], as is
/// an explicit `_id: null` (which typed records serializing an unset `Option`
/// produce). Any other caller-supplied identifier is kept untouched. Runs
/// after patching and before insertion, so the patch pipeline itself stays
/// identifier-agnostic.
pub fn ensure_id(doc: &mut Document) -> Bson {
    match doc.get("_id") {
        Some(id) if id != &Bson::Null => id.clone(),
        _ => {
            let id = Bson::ObjectId(ObjectId::new());
            doc.insert("_id", id.clone());
            id
        }
    }
}
