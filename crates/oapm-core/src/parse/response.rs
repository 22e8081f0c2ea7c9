use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::media_type::{Content, MediaType, first_content};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Required by OpenAPI, but tolerated when missing; it only feeds the
    /// saved example's name.
    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: Content,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, serde_json::Value>,
}

impl Response {
    pub fn first_content(&self) -> Option<(&str, &MediaType)> {
        first_content(&self.content)
    }
}

/// A reference or inline response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    Response(Response),
}
