use log::{debug, info};
use minijinja::{Environment, context};
use serde_json::{Value, json};

use oapm_core::config::{AuthMode, DEFAULT_DOCS_BASE_URL, DEFAULT_TAG, OapmConfig};
use oapm_core::parse::Document;
use oapm_core::parse::media_type::MediaType;
use oapm_core::parse::operation::{HttpMethod, Operation, PathItem};
use oapm_core::parse::parameter::{Parameter, ParameterLocation};
use oapm_core::parse::schema::{Schema, SchemaKind, SchemaOrRef};
use oapm_core::parse::spec::Tag;
use oapm_core::resolve::{Dereferencer, RefResolver};
use oapm_core::schema::{STRING_PLACEHOLDER, normalize, render_table, synthesize_schema};
use oapm_core::{ConvertError, ResolveError};

use crate::links::LinkRewriter;
use crate::metadata::{build_auth, build_folders, build_info, build_variables, folder_for_tag};
use crate::model::{
    Body, BodyMode, Collection, Description, FormField, Header, OriginalRequest, Param, Request,
    RequestItem, ResponseExample, Url,
};
use crate::status::{is_success, status_code, status_phrase};

const JSON_CONTENT_TYPE: &str = "application/json";
const ITEM_TEMPLATE: &str = "item_description.md.j2";

/// Knobs for a single conversion.
#[derive(Debug, Clone)]
pub struct AssemblerOptions {
    pub docs_base_url: String,
    pub default_tag: String,
    pub create_missing_folders: bool,
    pub auth: AuthMode,
    /// Replaces `info.description` as the collection description.
    pub description: Option<String>,
}

impl Default for AssemblerOptions {
    fn default() -> Self {
        Self {
            docs_base_url: DEFAULT_DOCS_BASE_URL.to_string(),
            default_tag: DEFAULT_TAG.to_string(),
            create_missing_folders: false,
            auth: AuthMode::Auto,
            description: None,
        }
    }
}

impl AssemblerOptions {
    pub fn from_config(config: &OapmConfig) -> Self {
        Self {
            docs_base_url: config.docs_base_url.clone(),
            default_tag: config.default_tag.clone(),
            create_missing_folders: config.create_missing_folders,
            auth: config.auth,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Parameters of one operation, already split by where Postman puts them.
#[derive(Debug, Default)]
struct UrlParams {
    variable: Vec<Param>,
    query: Vec<Param>,
}

/// Builds a Postman collection from one OpenAPI document.
pub struct CollectionAssembler<'a> {
    document: &'a Document,
    resolver: RefResolver<'a>,
    dereferencer: Dereferencer<'a>,
    templates: Environment<'static>,
    options: AssemblerOptions,
    collection: Collection,
}

impl<'a> CollectionAssembler<'a> {
    pub fn new(document: &'a Document, options: AssemblerOptions) -> Self {
        let spec = document.spec();
        let collection = Collection {
            info: build_info(spec, options.description.as_deref()),
            variable: build_variables(spec),
            auth: build_auth(spec, options.auth),
            item: build_folders(&spec.tags),
        };

        let mut templates = Environment::new();
        templates
            .add_template(
                ITEM_TEMPLATE,
                include_str!("../templates/item_description.md.j2"),
            )
            .expect("template should be valid");

        Self {
            document,
            resolver: RefResolver::new(document),
            dereferencer: Dereferencer::new(document),
            templates,
            options,
            collection,
        }
    }

    /// Convert every operation, file it into its folders and rewrite
    /// documentation links. Any unresolvable reference aborts the conversion.
    pub fn assemble(mut self) -> Result<Collection, ConvertError> {
        let document = self.document;
        let spec = document.spec();
        let mut converted = 0usize;

        for (path, path_item) in &spec.paths {
            for (method, operation) in path_item.operations() {
                let item = self.build_item(path, path_item, method, operation)?;
                self.file_item(&operation.tags, item);
                converted += 1;
            }
        }

        LinkRewriter::new(&self.options.docs_base_url).apply(&mut self.collection);

        info!(
            "assembled {} operations into {} folders",
            converted,
            self.collection.item.len()
        );
        Ok(self.collection)
    }

    fn build_item(
        &mut self,
        path: &str,
        path_item: &PathItem,
        method: HttpMethod,
        operation: &Operation,
    ) -> Result<RequestItem, ConvertError> {
        let params = self.build_params(path_item, operation)?;
        let url = Url {
            host: vec!["{{baseUrl}}".to_string()],
            path: request_path(path),
            variable: params.variable,
            query: params.query,
        };

        let (body, request_fields) = match &operation.request_body {
            Some(node) => {
                let request_body = self.resolver.resolve_request_body(node)?;
                match request_body.first_content() {
                    Some((content_type, media)) => self.build_body(content_type, media)?,
                    None => (None, None),
                }
            }
            None => (None, None),
        };

        let mut response = Vec::with_capacity(operation.responses.len());
        let mut response_fields = None;
        for (key, node) in &operation.responses {
            let resolved = self.resolver.resolve_response(node)?;
            let content = resolved.first_content();

            let schema = match content {
                Some((_, media)) => Some(self.media_schema(media)?),
                None => None,
            };

            if response_fields.is_none()
                && is_success(key)
                && content.is_some_and(|(content_type, _)| content_type == JSON_CONTENT_TYPE)
            {
                response_fields = schema.as_ref().and_then(|s| render_table(s, true));
            }

            let example_body = match &schema {
                Some(schema) => pretty_body(&synthesize_schema(schema, false))?,
                None => String::new(),
            };
            let content_type = content.map(|(content_type, _)| content_type);

            let code = status_code(key);
            response.push(ResponseExample {
                name: format!("[{key}] {}", resolved.description),
                original_request: original_request(method, &url),
                code,
                status: status_phrase(code).to_string(),
                header: content_type
                    .map(|ct| vec![Header::new("Content-Type", ct)])
                    .unwrap_or_default(),
                body: example_body,
                preview_language: if content_type == Some(JSON_CONTENT_TYPE) {
                    "json".to_string()
                } else {
                    "text".to_string()
                },
            });
        }

        let description = self.render_description(
            operation.description.as_deref().unwrap_or_default(),
            request_fields.as_deref(),
            response_fields.as_deref(),
        )?;

        Ok(RequestItem {
            name: operation
                .summary
                .clone()
                .unwrap_or_else(|| format!("{} {}", method.as_str(), path)),
            description: Description::markdown(description),
            request: Request {
                method: method.as_str().to_string(),
                url,
                body,
            },
            response,
        })
    }

    /// Path-level parameters first, then the operation's own.
    fn build_params(
        &self,
        path_item: &PathItem,
        operation: &Operation,
    ) -> Result<UrlParams, ResolveError> {
        let mut params = UrlParams::default();
        for node in path_item.parameters.iter().chain(&operation.parameters) {
            let param = self.resolver.resolve_parameter(node)?;
            let entry = build_param(&param);
            match param.location {
                ParameterLocation::Query => params.query.push(entry),
                _ => params.variable.push(entry),
            }
        }
        Ok(params)
    }

    fn media_schema(&mut self, media: &MediaType) -> Result<Schema, ResolveError> {
        match &media.schema {
            Some(node) => self.dereferencer.dereference_schema(node),
            None => Ok(Schema::default()),
        }
    }

    /// Request body plus its field table (read-only fields left out of both).
    fn build_body(
        &mut self,
        content_type: &str,
        media: &MediaType,
    ) -> Result<(Option<Body>, Option<String>), ConvertError> {
        let schema = self.media_schema(media)?;
        let fields = render_table(&schema, false);

        let body = match BodyMode::from_content_type(content_type) {
            BodyMode::Raw => Body {
                mode: BodyMode::Raw,
                raw: Some(serde_json::to_string_pretty(&synthesize_schema(
                    &schema, true,
                ))?),
                options: Some(json!({"raw": {"language": "json"}})),
                formdata: None,
                urlencoded: None,
            },
            BodyMode::Formdata => Body {
                mode: BodyMode::Formdata,
                raw: None,
                options: None,
                formdata: Some(form_fields(&schema)),
                urlencoded: None,
            },
            BodyMode::Urlencoded => Body {
                mode: BodyMode::Urlencoded,
                raw: None,
                options: None,
                formdata: None,
                urlencoded: Some(form_fields(&schema)),
            },
        };
        Ok((Some(body), fields))
    }

    fn render_description(
        &self,
        description: &str,
        request_fields: Option<&str>,
        response_fields: Option<&str>,
    ) -> Result<String, ConvertError> {
        let template = self
            .templates
            .get_template(ITEM_TEMPLATE)
            .map_err(|e| ConvertError::Render(e.to_string()))?;
        let rendered = template
            .render(context! {
                description => description,
                request_fields => request_fields,
                response_fields => response_fields,
            })
            .map_err(|e| ConvertError::Render(e.to_string()))?;
        Ok(rendered.trim().to_string())
    }

    /// Put a copy of the item into every folder named by its tags.
    fn file_item(&mut self, tags: &[String], item: RequestItem) {
        let default_tag = [self.options.default_tag.clone()];
        let tags = if tags.is_empty() { &default_tag[..] } else { tags };

        for tag in tags {
            let index = match self.collection.item.iter().position(|f| &f.name == tag) {
                Some(index) => index,
                None if self.options.create_missing_folders => {
                    self.collection.item.push(folder_for_tag(&Tag {
                        name: tag.clone(),
                        description: None,
                    }));
                    self.collection.item.len() - 1
                }
                None => {
                    debug!("dropping '{}' from undeclared tag '{}'", item.name, tag);
                    continue;
                }
            };
            self.collection.item[index].item.push(item.clone());
        }
    }
}

/// `/tasks/{task_gid}/subtasks` becomes `["tasks", ":task_gid", "subtasks"]`.
pub fn request_path(path: &str) -> Vec<String> {
    path.strip_prefix('/')
        .unwrap_or(path)
        .split('/')
        .map(|segment| segment.replace('{', ":").replace('}', ""))
        .collect()
}

pub fn build_param(param: &Parameter) -> Param {
    let value = match param.example_value() {
        Some(Value::Array(values)) => values.iter().map(plain_text).collect::<Vec<_>>().join(","),
        Some(Value::Null) | None => String::new(),
        Some(example) => plain_text(example),
    };
    let value_type = param
        .schema
        .as_ref()
        .and_then(SchemaOrRef::as_schema)
        .and_then(Schema::type_name)
        .map(str::to_string);

    Param {
        key: param.name.clone(),
        value,
        value_type,
        disabled: !param.required,
        description: Description::markdown(param.description.clone().unwrap_or_default()),
    }
}

/// One form field per property of the (normalized) object schema.
fn form_fields(schema: &Schema) -> Vec<FormField> {
    let schema = normalize(schema);
    if !matches!(schema.kind(), SchemaKind::Object) {
        return Vec::new();
    }

    schema
        .properties
        .iter()
        .map(|(name, prop)| {
            let fallback = Schema::default();
            let prop = prop.as_schema().unwrap_or(&fallback);
            let description = prop.description.clone().unwrap_or_default();
            if prop.format.as_deref() == Some("binary") {
                FormField::File {
                    key: name.clone(),
                    src: Vec::new(),
                    description,
                }
            } else {
                FormField::Text {
                    key: name.clone(),
                    value: form_value(prop),
                    disabled: !schema.required.contains(name),
                    description,
                }
            }
        })
        .collect()
}

fn form_value(schema: &Schema) -> String {
    match schema.explicit_example() {
        Some(Value::Null) => return String::new(),
        Some(example) => return plain_text(&example),
        None => {}
    }
    if let Some(first) = schema.enum_values.first() {
        return plain_text(first);
    }
    match schema.kind() {
        SchemaKind::String => STRING_PLACEHOLDER.to_string(),
        SchemaKind::Number | SchemaKind::Integer => "0".to_string(),
        SchemaKind::Boolean => "false".to_string(),
        _ => String::new(),
    }
}

/// Strings without JSON quotes, everything else JSON-encoded.
fn plain_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Pretty JSON of a response example, empty for null and empty containers.
fn pretty_body(example: &Value) -> Result<String, serde_json::Error> {
    let empty = match example {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    };
    if empty {
        return Ok(String::new());
    }
    serde_json::to_string_pretty(example)
}

fn original_request(method: HttpMethod, url: &Url) -> OriginalRequest {
    OriginalRequest {
        method: method.as_str().to_string(),
        url: url.clone(),
        header: vec![
            Header::new("Accept", JSON_CONTENT_TYPE),
            Header {
                key: "Authorization".to_string(),
                value: "Bearer <token>".to_string(),
                description: Some(Description::plain(
                    "Added as a part of security scheme: bearer",
                )),
            },
        ],
        body: json!({}),
    }
}
