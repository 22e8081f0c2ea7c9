use std::collections::HashSet;

use log::debug;
use serde_json::{Map, Value};

use super::pointer::RefResolver;
use crate::error::ResolveError;
use crate::parse::Document;
use crate::parse::schema::{Schema, SchemaOrRef};

/// Key of the marker object that stands in for a reference to a node that is
/// already being expanded.
pub const CIRCULAR_REF_KEY: &str = "x-circular-ref";

/// Replaces every `$ref` in a tree with its fully dereferenced target.
///
/// References currently being expanded are tracked by pointer string. Meeting
/// one of them again produces `{"x-circular-ref": "<pointer>"}` instead of
/// recursing, so self-referential schemas terminate and the output is still
/// free of `$ref` nodes.
pub struct Dereferencer<'a> {
    resolver: RefResolver<'a>,
    in_progress: HashSet<String>,
}

impl<'a> Dereferencer<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self::with_resolver(RefResolver::new(document))
    }

    pub fn with_resolver(resolver: RefResolver<'a>) -> Self {
        Self {
            resolver,
            in_progress: HashSet::new(),
        }
    }

    pub fn dereference_all(&mut self, node: &Value) -> Result<Value, ResolveError> {
        match node {
            Value::Object(map) => {
                if let Some(Value::String(reference)) = map.get("$ref") {
                    return self.dereference_ref(reference);
                }
                let mut rebuilt = Map::with_capacity(map.len());
                for (key, value) in map {
                    rebuilt.insert(key.clone(), self.dereference_all(value)?);
                }
                Ok(Value::Object(rebuilt))
            }
            Value::Array(items) => items
                .iter()
                .map(|item| self.dereference_all(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            scalar => Ok(scalar.clone()),
        }
    }

    /// Resolve a pointer and dereference its target.
    pub fn dereference_ref(&mut self, reference: &str) -> Result<Value, ResolveError> {
        if self.in_progress.contains(reference) {
            debug!("circular reference to {reference}, emitting marker");
            return Ok(circular_marker(reference));
        }
        let target = self.resolver.resolve(reference)?;
        self.in_progress.insert(reference.to_string());
        let result = self.dereference_all(target);
        self.in_progress.remove(reference);
        result
    }

    /// Typed entry point: dereference a schema node into a reference-free `Schema`.
    pub fn dereference_schema(&mut self, node: &SchemaOrRef) -> Result<Schema, ResolveError> {
        let label = match node {
            SchemaOrRef::Ref { ref_path } => ref_path.clone(),
            SchemaOrRef::Schema(_) => "<inline schema>".to_string(),
        };
        let value = serde_json::to_value(node).map_err(|e| ResolveError::Deserialize {
            reference: label.clone(),
            message: e.to_string(),
        })?;
        let resolved = self.dereference_all(&value)?;
        serde_json::from_value(resolved).map_err(|e| ResolveError::Deserialize {
            reference: label,
            message: e.to_string(),
        })
    }
}

fn circular_marker(reference: &str) -> Value {
    let mut marker = Map::new();
    marker.insert(
        CIRCULAR_REF_KEY.to_string(),
        Value::String(reference.to_string()),
    );
    Value::Object(marker)
}

/// Dereference a whole tree against a document.
pub fn dereference_all(document: &Document, node: &Value) -> Result<Value, ResolveError> {
    Dereferencer::new(document).dereference_all(node)
}

/// True when no `$ref` key remains anywhere in the tree.
pub fn is_reference_free(node: &Value) -> bool {
    match node {
        Value::Object(map) => {
            !map.get("$ref").is_some_and(Value::is_string) && map.values().all(is_reference_free)
        }
        Value::Array(items) => items.iter().all(is_reference_free),
        _ => true,
    }
}
