use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::schema::SchemaOrRef;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MediaType {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaOrRef>,
}

/// Content keyed by media type, in declaration order.
pub type Content = IndexMap<String, MediaType>;

/// The first declared media type. Postman bodies and saved responses carry a
/// single content type, so the rest are ignored.
pub fn first_content(content: &Content) -> Option<(&str, &MediaType)> {
    content.first().map(|(ct, media)| (ct.as_str(), media))
}
