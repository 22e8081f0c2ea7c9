pub mod assemble;
pub mod links;
pub mod metadata;
pub mod model;
pub mod status;

pub use assemble::{AssemblerOptions, CollectionAssembler};
pub use links::LinkRewriter;
pub use model::Collection;

use oapm_core::{ConvertError, Document};

/// Convert a loaded document into a Postman collection.
pub fn convert(document: &Document, options: AssemblerOptions) -> Result<Collection, ConvertError> {
    CollectionAssembler::new(document, options).assemble()
}

/// Serialize a collection the way it is written to disk: two-space pretty
/// JSON with non-ASCII characters kept as-is.
pub fn to_json(collection: &Collection) -> Result<String, ConvertError> {
    Ok(serde_json::to_string_pretty(collection)?)
}
