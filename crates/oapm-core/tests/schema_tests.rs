use oapm_core::parse::{self, Document, schema::SchemaOrRef};
use oapm_core::resolve::Dereferencer;
use oapm_core::schema::{ExampleSynthesizer, normalize, render_rows, render_table};
use serde_json::json;

const PROJECTS: &str = include_str!("fixtures/projects.yaml");

fn doc() -> Document {
    parse::from_yaml(PROJECTS).expect("should parse projects.yaml")
}

fn schema_ref(name: &str) -> SchemaOrRef {
    SchemaOrRef::Ref {
        ref_path: format!("#/components/schemas/{name}"),
    }
}

#[test]
fn synthesize_project_list() {
    let doc = doc();
    let mut synthesizer = ExampleSynthesizer::new(&doc);
    let example = synthesizer
        .synthesize(&schema_ref("ProjectList"), false)
        .unwrap();

    assert_eq!(
        example,
        json!({
            "data": [{
                "gid": "<string>",
                "name": "<string>",
                "color": "dark-pink",
                "owner": {
                    "gid": "<string>",
                    "projects": ["<circular: Project>"]
                },
                "custom_field": {"number_value": 5.2, "enabled": false},
                "settings": ["<value>"],
                "metadata": "<value>"
            }],
            "next_page": {
                "offset": "eyJ0eXAiOJiKV1iQLCJhbGciOiJIUzI1NiJ9",
                "uri": "<string>"
            }
        })
    );
}

#[test]
fn synthesize_request_suppresses_read_only() {
    let doc = doc();
    let mut synthesizer = ExampleSynthesizer::new(&doc);

    let project = synthesizer.synthesize(&schema_ref("Project"), true).unwrap();
    assert!(project.get("gid").is_none());
    assert_eq!(project["name"], "<string>");

    let item = synthesizer
        .synthesize(&schema_ref("PortfolioItemRequest"), true)
        .unwrap();
    assert_eq!(item, json!({"item": "<string>", "insert_before": "<string>"}));

    let escaped = synthesizer.synthesize(&schema_ref("a~0b~1c"), true).unwrap();
    assert_eq!(escaped, json!(7));
}

#[test]
fn one_of_keeps_parent_description() {
    let doc = doc();
    let custom_field = Dereferencer::new(&doc)
        .dereference_schema(&schema_ref("CustomFieldValue"))
        .unwrap();
    let normalized = normalize(&custom_field);

    assert!(normalized.one_of.is_empty());
    assert_eq!(
        normalized.description.as_deref(),
        Some("The value of a custom field.")
    );
    let names: Vec<&str> = normalized.properties.keys().map(String::as_str).collect();
    assert_eq!(names, ["number_value", "enabled"]);
}

#[test]
fn project_list_field_rows() {
    let doc = doc();
    let list = Dereferencer::new(&doc)
        .dereference_schema(&schema_ref("ProjectList"))
        .unwrap();
    let rows = render_rows(&list, true, "");

    let expected = [
        "| `data` | array[object] |  |  |",
        "| `data[].gid` | string |  |  |",
        "| `data[].color` | string | `dark-pink`, `dark-green`, `dark-blue`, `dark-red`, `dark-teal`, `dark-brown`, `dark-orange`, `dark-purple`, `dark-warm-gray`, `light-pink`, ... (+1 more) |  |",
        "| `data[].owner` | object |  |  |",
        "| `data[].owner.projects` | array[circular] |  |  |",
        "| `data[].custom_field` | object |  | The value of a custom field. |",
        "| `data[].custom_field.number_value` | number |  |  |",
        "| `data[].settings` | array[any] |  |  |",
        "| `next_page.uri` | string(uri) |  |  |",
    ];
    for row in expected {
        assert!(rows.iter().any(|r| r == row), "missing row {row}\n{rows:#?}");
    }

    let without_read_only = render_rows(&list, false, "");
    assert_eq!(without_read_only.len(), rows.len() - 1);
}

#[test]
fn request_table_escapes_pipes() {
    let doc = doc();
    let request = Dereferencer::new(&doc)
        .dereference_schema(&schema_ref("PortfolioItemRequest"))
        .unwrap();

    insta::assert_snapshot!(render_table(&request, false).unwrap(), @r"
    | Field | Type | Enum values | Description |
    | --- | --- | --- | --- |
    | `item` | string |  | The item to add \| move. |
    | `insert_before` | string |  |  |
    ");
}

#[test]
fn scalar_schema_has_no_table() {
    let doc = doc();
    let scalar = Dereferencer::new(&doc)
        .dereference_schema(&schema_ref("a~0b~1c"))
        .unwrap();
    assert!(render_table(&scalar, true).is_none());
}
