use serde_json::{Map, Value};

use super::normalize::representative_branch;
use crate::error::ResolveError;
use crate::parse::Document;
use crate::parse::schema::{Schema, SchemaKind, SchemaOrRef};
use crate::resolve::{Dereferencer, ref_name};

pub const STRING_PLACEHOLDER: &str = "<string>";
pub const VALUE_PLACEHOLDER: &str = "<value>";

/// Builds representative example values from schemas of one document.
pub struct ExampleSynthesizer<'a> {
    dereferencer: Dereferencer<'a>,
}

impl<'a> ExampleSynthesizer<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self::with_dereferencer(Dereferencer::new(document))
    }

    pub fn with_dereferencer(dereferencer: Dereferencer<'a>) -> Self {
        Self { dereferencer }
    }

    /// Dereference `node` and synthesize an example from it. With
    /// `suppress_read_only`, properties marked `readOnly` are left out (request
    /// bodies must not carry server-assigned fields).
    pub fn synthesize(
        &mut self,
        node: &SchemaOrRef,
        suppress_read_only: bool,
    ) -> Result<Value, ResolveError> {
        let schema = self.dereferencer.dereference_schema(node)?;
        Ok(synthesize_schema(&schema, suppress_read_only))
    }
}

/// Synthesize an example from an already dereferenced schema. Never fails:
/// unknown or missing types degrade to a placeholder.
pub fn synthesize_schema(schema: &Schema, suppress_read_only: bool) -> Value {
    if let Some(pointer) = &schema.circular_ref {
        return Value::String(format!("<circular: {}>", ref_name(pointer)));
    }

    if !schema.all_of.is_empty() {
        let mut merged = Map::new();
        for branch in &schema.all_of {
            if let Value::Object(fields) = synthesize_node(branch, suppress_read_only) {
                merged.extend(fields);
            }
        }
        merged.extend(object_fields(schema, suppress_read_only));
        return Value::Object(merged);
    }

    match schema.kind() {
        SchemaKind::Object => Value::Object(object_fields(schema, suppress_read_only)),
        SchemaKind::Array(items) => {
            let item = match items {
                Some(items) => synthesize_node(items, suppress_read_only),
                None => synthesize_schema(&Schema::default(), suppress_read_only),
            };
            Value::Array(vec![item])
        }
        SchemaKind::Unknown if schema.example.is_none() && schema.enum_values.is_empty() => {
            let branches = if !schema.any_of.is_empty() {
                &schema.any_of
            } else {
                &schema.one_of
            };
            match representative_branch(branches) {
                Some(branch) => synthesize_node(branch, suppress_read_only),
                None => Value::String(VALUE_PLACEHOLDER.to_string()),
            }
        }
        kind => primitive(schema, kind),
    }
}

fn synthesize_node(node: &SchemaOrRef, suppress_read_only: bool) -> Value {
    match node {
        SchemaOrRef::Schema(schema) => synthesize_schema(schema, suppress_read_only),
        // Only reachable when the caller skipped dereferencing.
        SchemaOrRef::Ref { .. } => Value::String(VALUE_PLACEHOLDER.to_string()),
    }
}

fn object_fields(schema: &Schema, suppress_read_only: bool) -> Map<String, Value> {
    schema
        .properties
        .iter()
        .filter(|(_, prop)| {
            !(suppress_read_only && prop.as_schema().is_some_and(Schema::is_read_only))
        })
        .map(|(name, prop)| (name.clone(), synthesize_node(prop, suppress_read_only)))
        .collect()
}

fn primitive(schema: &Schema, kind: SchemaKind<'_>) -> Value {
    if let Some(example) = schema.explicit_example() {
        return example;
    }
    if let Some(first) = schema.enum_values.first() {
        return first.clone();
    }
    match kind {
        SchemaKind::String => Value::String(STRING_PLACEHOLDER.to_string()),
        SchemaKind::Number | SchemaKind::Integer => Value::from(0),
        SchemaKind::Boolean => Value::Bool(false),
        SchemaKind::Null => Value::Null,
        SchemaKind::Object | SchemaKind::Array(_) | SchemaKind::Unknown => {
            Value::String(VALUE_PLACEHOLDER.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn synth(schema: Value, suppress: bool) -> Value {
        let schema: Schema = serde_json::from_value(schema).unwrap();
        synthesize_schema(&schema, suppress)
    }

    #[test]
    fn test_read_only_suppression() {
        let schema = json!({
            "type": "object",
            "properties": {
                "id": {"type": "integer", "readOnly": true},
                "name": {"type": "string"}
            },
            "required": ["name"]
        });
        assert_eq!(synth(schema.clone(), true), json!({"name": "<string>"}));
        assert_eq!(synth(schema, false), json!({"id": 0, "name": "<string>"}));
    }

    #[test]
    fn test_primitive_precedence() {
        assert_eq!(
            synth(json!({"type": "string", "example": "1331", "enum": ["a"]}), false),
            json!("1331")
        );
        assert_eq!(
            synth(json!({"type": "string", "enum": ["low", "high"]}), false),
            json!("low")
        );
        assert_eq!(synth(json!({"type": "number"}), false), json!(0));
        assert_eq!(synth(json!({"type": "integer"}), false), json!(0));
        assert_eq!(synth(json!({"type": "boolean"}), false), json!(false));
        assert_eq!(synth(json!({}), false), json!("<value>"));
        assert_eq!(synth(json!({"type": "file"}), false), json!("<value>"));
    }

    #[test]
    fn test_null_example_used_verbatim() {
        assert_eq!(
            synth(json!({"type": "string", "nullable": true, "example": null}), false),
            Value::Null
        );
    }

    #[test]
    fn test_null_example_survives_dereferencing() {
        let document = crate::parse::from_yaml(
            r##"
openapi: 3.0.0
info: {title: T, version: "1"}
paths: {}
components:
  schemas:
    Task:
      type: object
      properties:
        completed_at: {$ref: "#/components/schemas/Timestamp"}
    Timestamp:
      type: string
      format: date-time
      nullable: true
      example: null
"##,
        )
        .unwrap();
        let node = SchemaOrRef::Ref {
            ref_path: "#/components/schemas/Task".to_string(),
        };
        assert_eq!(
            ExampleSynthesizer::new(&document).synthesize(&node, false).unwrap(),
            json!({"completed_at": null})
        );
    }

    #[test]
    fn test_array_renders_one_element() {
        assert_eq!(
            synth(json!({"type": "array", "items": {"type": "string", "example": "tag"}}), false),
            json!(["tag"])
        );
        assert_eq!(synth(json!({"type": "array"}), false), json!(["<value>"]));
    }

    #[test]
    fn test_all_of_shallow_merge() {
        let schema = json!({
            "allOf": [
                {"type": "object", "properties": {"gid": {"type": "string", "example": "12345"}, "name": {"type": "string"}}},
                {"type": "string"},
                {"type": "object", "properties": {"name": {"type": "string", "example": "Buy milk"}}}
            ]
        });
        assert_eq!(
            synth(schema, false),
            json!({"gid": "12345", "name": "Buy milk"})
        );
    }

    #[test]
    fn test_read_only_inside_all_of_branch() {
        let schema = json!({
            "allOf": [
                {"type": "object", "properties": {"gid": {"type": "string", "readOnly": true}}},
                {"type": "object", "properties": {"notes": {"type": "string"}}}
            ]
        });
        assert_eq!(synth(schema, true), json!({"notes": "<string>"}));
    }

    #[test]
    fn test_one_of_uses_representative_branch() {
        let schema = json!({
            "oneOf": [
                {"type": "string"},
                {"type": "object", "properties": {"gid": {"type": "string"}}}
            ]
        });
        assert_eq!(synth(schema, false), json!({"gid": "<string>"}));
    }

    #[test]
    fn test_circular_marker_placeholder() {
        let schema = json!({
            "type": "object",
            "properties": {"parent": {"x-circular-ref": "#/components/schemas/Task"}}
        });
        assert_eq!(
            synth(schema, false),
            json!({"parent": "<circular: Task>"})
        );
    }

    #[test]
    fn test_shape_matches_declared_type() {
        for declared in ["object", "array", "string", "number", "integer", "boolean"] {
            let value = synth(json!({"type": declared, "items": {}}), false);
            let matches = match declared {
                "object" => value.is_object(),
                "array" => value.is_array(),
                "string" => value.is_string(),
                "number" | "integer" => value.is_number(),
                _ => value.is_boolean(),
            };
            assert!(matches, "bad shape for {declared}: {value}");
        }
    }

    #[test]
    fn test_synthesizer_dereferences_first() {
        let document = crate::parse::from_yaml(
            r##"
openapi: 3.0.0
info: {title: T, version: "1"}
paths: {}
components:
  schemas:
    Task:
      type: object
      properties:
        gid: {type: string, readOnly: true, example: "1"}
        name: {type: string}
        assignee: {$ref: "#/components/schemas/User"}
    User:
      type: object
      properties:
        name: {type: string, example: "Greg"}
"##,
        )
        .unwrap();
        let mut synth = ExampleSynthesizer::new(&document);
        let node = SchemaOrRef::Ref {
            ref_path: "#/components/schemas/Task".to_string(),
        };
        assert_eq!(
            synth.synthesize(&node, true).unwrap(),
            json!({"name": "<string>", "assignee": {"name": "Greg"}})
        );
    }

    #[test]
    fn test_synthesizer_reports_broken_reference() {
        let document = crate::parse::from_yaml(
            "openapi: 3.0.0\ninfo: {title: T, version: \"1\"}\npaths: {}\n",
        )
        .unwrap();
        let mut synth = ExampleSynthesizer::new(&document);
        let node = SchemaOrRef::Ref {
            ref_path: "#/components/schemas/Missing".to_string(),
        };
        assert!(matches!(
            synth.synthesize(&node, false),
            Err(ResolveError::RefNotFound { .. })
        ));
    }
}
