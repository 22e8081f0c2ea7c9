use serde_json::Value;

use super::normalize::normalize;
use crate::parse::schema::{Schema, SchemaKind, SchemaOrRef};
use crate::resolve::ref_name;

/// Enum values listed in a cell before the rest are summarized as `+N more`.
pub const ENUM_DISPLAY_LIMIT: usize = 10;

pub const TABLE_HEADER: &str = "| Field | Type | Enum values | Description |\n| --- | --- | --- | --- |";

/// Render a Markdown table of the schema's fields, or `None` when there are
/// no rows to show.
pub fn render_table(schema: &Schema, include_read_only: bool) -> Option<String> {
    let rows = render_rows(schema, include_read_only, "");
    if rows.is_empty() {
        return None;
    }
    Some(format!("{TABLE_HEADER}\n{}", rows.join("\n")))
}

/// One Markdown row per field, depth-first in declaration order. Nested object
/// fields use `parent.child` paths, fields of array items use `parent[].child`.
pub fn render_rows(schema: &Schema, include_read_only: bool, prefix: &str) -> Vec<String> {
    let mut rows = Vec::new();
    collect_rows(&normalize(schema), include_read_only, prefix, &mut rows);
    rows
}

fn collect_rows(schema: &Schema, include_read_only: bool, prefix: &str, rows: &mut Vec<String>) {
    for (name, prop) in &schema.properties {
        let path = format!("{prefix}{name}");
        let prop = match prop {
            SchemaOrRef::Schema(prop) => prop,
            SchemaOrRef::Ref { ref_path } => {
                rows.push(format_row(&path, ref_name(ref_path), "", ""));
                continue;
            }
        };
        if !include_read_only && prop.is_read_only() {
            continue;
        }

        rows.push(format_row(
            &path,
            &type_label(prop),
            &enum_cell(&prop.enum_values),
            &clean_description(prop.description.as_deref()),
        ));

        match prop.kind() {
            SchemaKind::Object if !prop.properties.is_empty() => {
                collect_rows(prop, include_read_only, &format!("{path}."), rows);
            }
            SchemaKind::Array(Some(SchemaOrRef::Schema(items))) => {
                let items = normalize(items);
                if !items.properties.is_empty() {
                    collect_rows(&items, include_read_only, &format!("{path}[]."), rows);
                }
            }
            _ => {}
        }
    }
}

fn format_row(path: &str, type_label: &str, enums: &str, description: &str) -> String {
    format!("| `{path}` | {type_label} | {enums} | {description} |")
}

/// Type column: `array[<item type>]` for arrays, `object` for untyped schemas
/// with properties, otherwise the declared type with an optional `(format)`.
pub fn type_label(schema: &Schema) -> String {
    if schema.circular_ref.is_some() {
        return "circular".to_string();
    }

    let base = match schema.kind() {
        SchemaKind::Array(items) => {
            let item_label = match items {
                Some(SchemaOrRef::Schema(items)) => type_label(&normalize(items)),
                Some(SchemaOrRef::Ref { ref_path }) => ref_name(ref_path).to_string(),
                None => "any".to_string(),
            };
            return format!("array[{item_label}]");
        }
        SchemaKind::Object if schema.schema_type.is_none() => "object",
        _ => schema.type_name().unwrap_or("any"),
    };

    match &schema.format {
        Some(format) => format!("{base}({format})"),
        None => base.to_string(),
    }
}

/// Back-tick quoted, comma separated enum values, truncated after
/// `ENUM_DISPLAY_LIMIT` entries.
pub fn enum_cell(values: &[Value]) -> String {
    if values.is_empty() {
        return String::new();
    }
    let mut cell = values
        .iter()
        .take(ENUM_DISPLAY_LIMIT)
        .map(|v| match v {
            Value::String(s) => format!("`{s}`"),
            other => format!("`{other}`"),
        })
        .collect::<Vec<_>>()
        .join(", ");
    if values.len() > ENUM_DISPLAY_LIMIT {
        cell.push_str(&format!(", ... (+{} more)", values.len() - ENUM_DISPLAY_LIMIT));
    }
    escape_pipes(&cell)
}

/// Collapse newlines and whitespace runs to single spaces and escape `|`.
pub fn clean_description(description: Option<&str>) -> String {
    description
        .map(|d| escape_pipes(&d.split_whitespace().collect::<Vec<_>>().join(" ")))
        .unwrap_or_default()
}

fn escape_pipes(text: &str) -> String {
    text.replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(value: Value) -> Schema {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_enum_truncation() {
        let values: Vec<Value> = (1..=11).map(|i| json!(format!("v{i}"))).collect();
        assert_eq!(
            enum_cell(&values),
            "`v1`, `v2`, `v3`, `v4`, `v5`, `v6`, `v7`, `v8`, `v9`, `v10`, ... (+1 more)"
        );
    }

    #[test]
    fn test_enum_non_string_values() {
        assert_eq!(enum_cell(&[json!(1), json!(true), json!(null)]), "`1`, `true`, `null`");
        assert_eq!(enum_cell(&[]), "");
    }

    #[test]
    fn test_description_cleanup() {
        assert_eq!(
            clean_description(Some("The task's\nname.   Use a | b\n\n  here ")),
            "The task's name. Use a \\| b here"
        );
        assert_eq!(clean_description(None), "");
    }

    #[test]
    fn test_type_labels() {
        assert_eq!(type_label(&schema(json!({"type": "string", "format": "date-time"}))), "string(date-time)");
        assert_eq!(type_label(&schema(json!({"properties": {"a": {}}}))), "object");
        assert_eq!(type_label(&schema(json!({"type": "object"}))), "object");
        assert_eq!(
            type_label(&schema(json!({"type": "array", "items": {"type": "integer", "format": "int64"}}))),
            "array[integer(int64)]"
        );
        assert_eq!(
            type_label(&schema(json!({"type": "array", "items": {"allOf": [{"properties": {"gid": {}}}]}}))),
            "array[object]"
        );
        assert_eq!(type_label(&schema(json!({"type": "array"}))), "array[any]");
        assert_eq!(type_label(&schema(json!({}))), "any");
    }

    #[test]
    fn test_rows_nested_depth_first() {
        let s = schema(json!({
            "type": "object",
            "properties": {
                "gid": {"type": "string", "readOnly": true, "description": "Globally unique identifier"},
                "assignee": {
                    "type": "object",
                    "properties": {"name": {"type": "string"}}
                },
                "memberships": {
                    "type": "array",
                    "items": {"type": "object", "properties": {"project": {"type": "string"}}}
                },
                "tags": {"type": "array", "items": {"type": "string"}}
            }
        }));

        let rows = render_rows(&s, true, "");
        assert_eq!(
            rows,
            [
                "| `gid` | string |  | Globally unique identifier |",
                "| `assignee` | object |  |  |",
                "| `assignee.name` | string |  |  |",
                "| `memberships` | array[object] |  |  |",
                "| `memberships[].project` | string |  |  |",
                "| `tags` | array[string] |  |  |",
            ]
        );

        let rows = render_rows(&s, false, "data.");
        assert_eq!(rows.len(), 5);
        assert!(rows[0].starts_with("| `data.assignee` |"));
    }

    #[test]
    fn test_render_table_snapshot() {
        let s = schema(json!({
            "allOf": [
                {"type": "object", "properties": {"resource_subtype": {"type": "string", "enum": ["default_task", "milestone"], "description": "The subtype\nof this resource."}}},
                {"type": "object", "properties": {"due_on": {"type": "string", "format": "date", "description": "Due date | local"}}}
            ]
        }));
        let table = render_table(&s, false).unwrap();
        insta::assert_snapshot!(table, @r"
        | Field | Type | Enum values | Description |
        | --- | --- | --- | --- |
        | `resource_subtype` | string | `default_task`, `milestone` | The subtype of this resource. |
        | `due_on` | string(date) |  | Due date \| local |
        ");
    }

    #[test]
    fn test_render_table_empty() {
        assert_eq!(render_table(&schema(json!({"type": "string"})), true), None);
    }
}
