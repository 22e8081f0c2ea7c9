use crate::parse::schema::{Schema, SchemaOrRef};

/// Collapse `allOf` / `anyOf` / `oneOf` into a single schema shape for
/// documentation. Expects a dereferenced schema; references that are still
/// present are treated as opaque.
pub fn normalize(schema: &Schema) -> Schema {
    if !schema.all_of.is_empty() {
        return merge_all_of(schema);
    }

    let branches = if !schema.any_of.is_empty() {
        &schema.any_of
    } else {
        &schema.one_of
    };
    if !branches.is_empty() {
        let mut picked = pick_representative(branches);
        overlay(&mut picked, &normalize(&without_composition(schema)));
        return picked;
    }

    if schema.properties.is_empty() {
        return schema.clone();
    }
    let mut normalized = schema.clone();
    normalized.properties = schema
        .properties
        .iter()
        .map(|(name, prop)| (name.clone(), normalize_node(prop)))
        .collect();
    normalized
}

pub fn normalize_node(node: &SchemaOrRef) -> SchemaOrRef {
    match node {
        SchemaOrRef::Schema(schema) => normalize(schema).into(),
        SchemaOrRef::Ref { .. } => node.clone(),
    }
}

/// The branch of an `anyOf`/`oneOf` used to represent the whole union: the
/// first one that has properties once normalized, else the first one.
pub fn representative_branch(branches: &[SchemaOrRef]) -> Option<&SchemaOrRef> {
    branches
        .iter()
        .find(|branch| {
            branch
                .as_schema()
                .is_some_and(|s| !normalize(s).properties.is_empty())
        })
        .or_else(|| branches.first())
}

fn pick_representative(branches: &[SchemaOrRef]) -> Schema {
    representative_branch(branches)
        .and_then(SchemaOrRef::as_schema)
        .map(normalize)
        .unwrap_or_default()
}

fn merge_all_of(schema: &Schema) -> Schema {
    let mut merged = Schema::default();
    for branch in &schema.all_of {
        if let Some(branch) = branch.as_schema() {
            overlay(&mut merged, &normalize(branch));
        }
    }
    overlay(&mut merged, &normalize(&without_composition(schema)));
    merged
}

fn without_composition(schema: &Schema) -> Schema {
    Schema {
        all_of: Vec::new(),
        any_of: Vec::new(),
        one_of: Vec::new(),
        ..schema.clone()
    }
}

/// Apply every keyword `layer` sets on top of `base`. Properties merge by name
/// (the later definition wins, the earlier position is kept) and `required`
/// names are unioned. Composition keywords are never carried over.
pub fn overlay(base: &mut Schema, layer: &Schema) {
    macro_rules! take_if_set {
        ($($field:ident),* $(,)?) => {
            $(
                if layer.$field.is_some() {
                    base.$field = layer.$field.clone();
                }
            )*
        };
    }

    take_if_set!(
        schema_type,
        format,
        title,
        description,
        default_value,
        nullable,
        additional_properties,
        items,
        discriminator,
        minimum,
        maximum,
        min_length,
        max_length,
        pattern,
        min_items,
        max_items,
        read_only,
        write_only,
        example,
        circular_ref,
    );

    if !layer.enum_values.is_empty() {
        base.enum_values = layer.enum_values.clone();
    }
    for (name, prop) in &layer.properties {
        base.properties.insert(name.clone(), prop.clone());
    }
    for name in &layer.required {
        if !base.required.contains(name) {
            base.required.push(name.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(json: &str) -> Schema {
        serde_json::from_str(json).unwrap()
    }

    fn keys(schema: &Schema) -> Vec<&str> {
        schema.properties.keys().map(String::as_str).collect()
    }

    #[test]
    fn test_overlay_carries_null_example() {
        let mut base = schema(r#"{"type": "string", "example": "draft"}"#);
        overlay(&mut base, &schema(r#"{"example": null}"#));
        assert_eq!(base.explicit_example(), Some(serde_json::Value::Null));
    }

    #[test]
    fn test_all_of_merges_properties_last_wins() {
        let s = schema(
            r#"{"allOf": [
                {"type": "object", "properties": {"gid": {"type": "string"}, "name": {"type": "string"}}, "required": ["gid"]},
                {"properties": {"name": {"type": "integer"}, "notes": {"type": "string"}}, "required": ["name", "gid"], "description": "later"}
            ]}"#,
        );
        let n = normalize(&s);
        assert!(n.all_of.is_empty());
        assert_eq!(keys(&n), ["gid", "name", "notes"]);
        assert_eq!(
            n.properties["name"].as_schema().unwrap().type_name(),
            Some("integer")
        );
        assert_eq!(n.required, ["gid", "name"]);
        assert_eq!(n.description.as_deref(), Some("later"));
        assert_eq!(n.type_name(), Some("object"));
    }

    #[test]
    fn test_all_of_merge_is_associative() {
        let a = r#"{"properties": {"x": {"type": "string"}, "y": {"type": "string"}}}"#;
        let b = r#"{"properties": {"y": {"type": "integer"}, "z": {"type": "boolean"}}}"#;
        let c = r#"{"properties": {"x": {"type": "number"}}}"#;

        let all = normalize(&schema(&format!(r#"{{"allOf": [{a}, {b}, {c}]}}"#)));
        let ab = normalize(&schema(&format!(r#"{{"allOf": [{a}, {b}]}}"#)));
        let ab_json = serde_json::to_string(&ab).unwrap();
        let stepwise = normalize(&schema(&format!(r#"{{"allOf": [{ab_json}, {c}]}}"#)));

        assert_eq!(all.properties, stepwise.properties);
        assert_eq!(
            all.properties["x"].as_schema().unwrap().type_name(),
            Some("number")
        );
    }

    #[test]
    fn test_parent_annotations_survive_all_of() {
        let s = schema(
            r#"{"allOf": [{"type": "object", "description": "A user", "properties": {"gid": {"type": "string"}}}],
                "description": "The assignee", "readOnly": true}"#,
        );
        let n = normalize(&s);
        assert_eq!(n.description.as_deref(), Some("The assignee"));
        assert!(n.is_read_only());
        assert_eq!(keys(&n), ["gid"]);
    }

    #[test]
    fn test_any_of_picks_first_branch_with_properties() {
        let s = schema(
            r#"{"anyOf": [
                {"type": "string"},
                {"allOf": [{"properties": {"gid": {"type": "string"}}}]},
                {"properties": {"other": {"type": "string"}}}
            ]}"#,
        );
        let n = normalize(&s);
        assert_eq!(keys(&n), ["gid"]);
    }

    #[test]
    fn test_one_of_without_properties_takes_first_branch() {
        let s = schema(r#"{"oneOf": [{"type": "string", "format": "date"}, {"type": "integer"}]}"#);
        let n = normalize(&s);
        assert_eq!(n.type_name(), Some("string"));
        assert_eq!(n.format.as_deref(), Some("date"));
    }

    #[test]
    fn test_nested_properties_are_normalized() {
        let s = schema(
            r#"{"type": "object", "properties": {
                "owner": {"allOf": [{"properties": {"gid": {"type": "string"}}}, {"properties": {"name": {"type": "string"}}}]}
            }}"#,
        );
        let n = normalize(&s);
        let owner = n.properties["owner"].as_schema().unwrap();
        assert_eq!(keys(owner), ["gid", "name"]);
    }

    #[test]
    fn test_plain_schema_unchanged() {
        let s = schema(r#"{"type": "array", "items": {"allOf": [{"type": "string"}]}}"#);
        assert_eq!(normalize(&s), s);
    }
}
