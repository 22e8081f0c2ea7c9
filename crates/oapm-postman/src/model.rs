use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const COLLECTION_SCHEMA_URL: &str =
    "https://schema.getpostman.com/json/collection/v2.1.0/collection.json";

pub const MARKDOWN: &str = "text/markdown";
pub const PLAIN_TEXT: &str = "text/plain";

/// A Postman Collection v2.1.0 document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub info: Info,
    pub variable: Vec<Variable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<Auth>,
    pub item: Vec<Folder>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub name: String,
    pub schema: String,
    pub description: Description,
}

/// A description object; `type` is `text/markdown` or `text/plain`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Description {
    pub content: String,
    #[serde(rename = "type")]
    pub content_type: String,
}

impl Description {
    pub fn markdown(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            content_type: MARKDOWN.to_string(),
        }
    }

    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            content_type: PLAIN_TEXT.to_string(),
        }
    }

    pub fn is_markdown(&self) -> bool {
        self.content_type == MARKDOWN
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub key: String,
    pub value: String,
}

/// Collection-level auth: `{"type": "oauth2", "oauth2": [...]}` or
/// `{"type": "bearer", "bearer": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Auth {
    #[serde(rename = "oauth2")]
    OAuth2 { oauth2: Vec<AuthAttribute> },
    Bearer { bearer: Vec<AuthAttribute> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthAttribute {
    pub key: String,
    pub value: Value,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
}

/// A folder, one per OpenAPI tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub name: String,
    pub description: Description,
    pub item: Vec<RequestItem>,
}

/// One operation rendered as a Postman request with its response examples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestItem {
    pub name: String,
    pub description: Description,
    pub request: Request,
    pub response: Vec<ResponseExample>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub method: String,
    pub url: Url,
    pub body: Option<Body>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Url {
    pub host: Vec<String>,
    pub path: Vec<String>,
    pub variable: Vec<Param>,
    pub query: Vec<Param>,
}

/// A path variable or query parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub key: String,
    pub value: String,
    #[serde(rename = "type")]
    pub value_type: Option<String>,
    pub disabled: bool,
    pub description: Description,
}

/// Request body. Exactly one of `raw`, `formdata` and `urlencoded` is set,
/// matching `mode`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub mode: BodyMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formdata: Option<Vec<FormField>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urlencoded: Option<Vec<FormField>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyMode {
    Raw,
    Formdata,
    Urlencoded,
}

impl BodyMode {
    pub fn from_content_type(content_type: &str) -> Self {
        match content_type {
            "multipart/form-data" => BodyMode::Formdata,
            "application/x-www-form-urlencoded" => BodyMode::Urlencoded,
            _ => BodyMode::Raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FormField {
    Text {
        key: String,
        value: String,
        disabled: bool,
        description: String,
    },
    File {
        key: String,
        src: Vec<String>,
        description: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub key: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Description>,
}

impl Header {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            description: None,
        }
    }
}

/// A saved response example.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseExample {
    pub name: String,
    #[serde(rename = "originalRequest")]
    pub original_request: OriginalRequest,
    /// Absent for `default` and range (`2XX`) response keys.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    pub status: String,
    pub header: Vec<Header>,
    pub body: String,
    #[serde(rename = "_postman_previewlanguage")]
    pub preview_language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginalRequest {
    pub method: String,
    pub url: Url,
    pub header: Vec<Header>,
    pub body: Value,
}

impl Collection {
    /// Visit every description object in the tree.
    pub fn visit_descriptions_mut(&mut self, f: &mut impl FnMut(&mut Description)) {
        f(&mut self.info.description);
        for folder in &mut self.item {
            f(&mut folder.description);
            for item in &mut folder.item {
                item.visit_descriptions_mut(f);
            }
        }
    }
}

impl RequestItem {
    pub fn visit_descriptions_mut(&mut self, f: &mut impl FnMut(&mut Description)) {
        f(&mut self.description);
        self.request.url.visit_descriptions_mut(f);
        for response in &mut self.response {
            response.original_request.url.visit_descriptions_mut(f);
            for header in &mut response.original_request.header {
                if let Some(description) = &mut header.description {
                    f(description);
                }
            }
        }
    }
}

impl Url {
    fn visit_descriptions_mut(&mut self, f: &mut impl FnMut(&mut Description)) {
        for param in self.variable.iter_mut().chain(self.query.iter_mut()) {
            f(&mut param.description);
        }
    }
}
