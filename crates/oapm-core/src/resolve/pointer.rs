use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ResolveError;
use crate::parse::Document;
use crate::parse::parameter::{Parameter, ParameterOrRef};
use crate::parse::request_body::{RequestBody, RequestBodyOrRef};
use crate::parse::response::{Response, ResponseOrRef};

/// A node that is either inline or a `$ref` to another node of the same kind.
pub trait Referable: DeserializeOwned + Clone {
    type Target: Clone;

    /// `Ok` with the inline value, or `Err` with the reference path.
    fn split(&self) -> Result<&Self::Target, &str>;
}

impl Referable for ParameterOrRef {
    type Target = Parameter;

    fn split(&self) -> Result<&Parameter, &str> {
        match self {
            ParameterOrRef::Parameter(p) => Ok(p),
            ParameterOrRef::Ref { ref_path } => Err(ref_path),
        }
    }
}

impl Referable for ResponseOrRef {
    type Target = Response;

    fn split(&self) -> Result<&Response, &str> {
        match self {
            ResponseOrRef::Response(r) => Ok(r),
            ResponseOrRef::Ref { ref_path } => Err(ref_path),
        }
    }
}

impl Referable for RequestBodyOrRef {
    type Target = RequestBody;

    fn split(&self) -> Result<&RequestBody, &str> {
        match self {
            RequestBodyOrRef::RequestBody(rb) => Ok(rb),
            RequestBodyOrRef::Ref { ref_path } => Err(ref_path),
        }
    }
}

/// Resolves local JSON-pointer references (`#/components/schemas/Task`)
/// against the raw document tree.
#[derive(Debug, Clone, Copy)]
pub struct RefResolver<'a> {
    root: &'a Value,
}

impl<'a> RefResolver<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self::from_value(document.raw())
    }

    pub fn from_value(root: &'a Value) -> Self {
        Self { root }
    }

    /// Walk the pointer one segment at a time. A missing segment is an error,
    /// never a silent `null`.
    pub fn resolve(&self, reference: &str) -> Result<&'a Value, ResolveError> {
        if reference == "#" {
            return Ok(self.root);
        }
        let path = reference
            .strip_prefix("#/")
            .ok_or_else(|| ResolveError::InvalidRefFormat(reference.to_string()))?;

        let mut node = self.root;
        for raw_segment in path.split('/') {
            let segment = unescape_segment(raw_segment);
            let next = match node {
                Value::Object(map) => map.get(segment.as_str()),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            };
            node = next.ok_or_else(|| ResolveError::RefNotFound {
                reference: reference.to_string(),
                segment: segment.clone(),
            })?;
        }
        Ok(node)
    }

    /// Resolve a reference and deserialize the target.
    pub fn resolve_as<T: DeserializeOwned>(&self, reference: &str) -> Result<T, ResolveError> {
        let target = self.resolve(reference)?;
        T::deserialize(target).map_err(|e| ResolveError::Deserialize {
            reference: reference.to_string(),
            message: e.to_string(),
        })
    }

    /// Follow a (possibly chained) reference until an inline node is reached.
    pub fn resolve_node<N: Referable>(&self, node: &N) -> Result<N::Target, ResolveError> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut current = node.clone();
        loop {
            let next = match current.split() {
                Ok(target) => return Ok(target.clone()),
                Err(reference) => reference.to_string(),
            };
            if !seen.insert(next.clone()) {
                return Err(ResolveError::CircularRef(next));
            }
            current = self.resolve_as(&next)?;
        }
    }

    pub fn resolve_parameter(&self, param: &ParameterOrRef) -> Result<Parameter, ResolveError> {
        self.resolve_node(param)
    }

    pub fn resolve_response(&self, response: &ResponseOrRef) -> Result<Response, ResolveError> {
        self.resolve_node(response)
    }

    pub fn resolve_request_body(
        &self,
        body: &RequestBodyOrRef,
    ) -> Result<RequestBody, ResolveError> {
        self.resolve_node(body)
    }
}

/// Undo JSON-pointer escaping (`~1` is `/`, `~0` is `~`).
fn unescape_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

/// The last segment of a reference, e.g. `Task` for `#/components/schemas/Task`.
pub fn ref_name(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> Value {
        json!({
            "components": {
                "schemas": {
                    "Task": {"type": "object", "properties": {"gid": {"type": "string"}}},
                    "a/b": {"type": "string"}
                },
                "parameters": {
                    "task_path_gid": {"name": "task_gid", "in": "path", "required": true},
                    "alias": {"$ref": "#/components/parameters/task_path_gid"},
                    "loop_a": {"$ref": "#/components/parameters/loop_b"},
                    "loop_b": {"$ref": "#/components/parameters/loop_a"}
                }
            },
            "servers": [{"url": "https://app.asana.com/api/1.0"}]
        })
    }

    #[test]
    fn test_resolve_schema_pointer() {
        let root = doc();
        let resolver = RefResolver::from_value(&root);
        let task = resolver.resolve("#/components/schemas/Task").unwrap();
        assert_eq!(task["type"], "object");
    }

    #[test]
    fn test_missing_segment_is_an_error() {
        let root = doc();
        let resolver = RefResolver::from_value(&root);
        let err = resolver
            .resolve("#/components/schemas/Missing/properties")
            .unwrap_err();
        match err {
            ResolveError::RefNotFound { reference, segment } => {
                assert_eq!(reference, "#/components/schemas/Missing/properties");
                assert_eq!(segment, "Missing");
            }
            other => panic!("expected RefNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_external_ref_is_rejected() {
        let root = doc();
        let resolver = RefResolver::from_value(&root);
        assert!(matches!(
            resolver.resolve("other.yaml#/components/schemas/Task"),
            Err(ResolveError::InvalidRefFormat(_))
        ));
    }

    #[test]
    fn test_escaped_segment_and_array_index() {
        let root = doc();
        let resolver = RefResolver::from_value(&root);
        assert_eq!(
            resolver.resolve("#/components/schemas/a~1b").unwrap()["type"],
            "string"
        );
        assert_eq!(
            resolver.resolve("#/servers/0/url").unwrap(),
            "https://app.asana.com/api/1.0"
        );
    }

    #[test]
    fn test_chained_parameter_reference() {
        let root = doc();
        let resolver = RefResolver::from_value(&root);
        let param = ParameterOrRef::Ref {
            ref_path: "#/components/parameters/alias".to_string(),
        };
        let resolved = resolver.resolve_parameter(&param).unwrap();
        assert_eq!(resolved.name, "task_gid");
        assert!(resolved.required);
    }

    #[test]
    fn test_reference_loop_between_parameters() {
        let root = doc();
        let resolver = RefResolver::from_value(&root);
        let param = ParameterOrRef::Ref {
            ref_path: "#/components/parameters/loop_a".to_string(),
        };
        assert!(matches!(
            resolver.resolve_parameter(&param),
            Err(ResolveError::CircularRef(_))
        ));
    }

    #[test]
    fn test_ref_name() {
        assert_eq!(ref_name("#/components/schemas/TaskResponse"), "TaskResponse");
    }
}
