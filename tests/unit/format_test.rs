use tdvq::driver::{CellValue, ColumnMeta};
use tdvq::fields::CONNECTION_FIELDS;
use tdvq::format::{serialize_to_toon, to_json, to_toon};
use tdvq::materialize::QueryResult;

/// Helper: encode to TOON and decode back to serde_json::Value (no type coercion)
fn round_trip(result: &QueryResult) -> serde_json::Value {
    let toon = to_toon(result).unwrap();
    toon_format::decode_no_coerce(&toon).unwrap()
}

fn people() -> QueryResult {
    QueryResult {
        columns: vec![
            ColumnMeta { name: "id".to_string(), type_name: "INTEGER".to_string() },
            ColumnMeta { name: "name".to_string(), type_name: "VARCHAR".to_string() },
            ColumnMeta { name: "email".to_string(), type_name: "VARCHAR".to_string() },
        ],
        rows: vec![
            vec![
                CellValue::Text("1".to_string()),
                CellValue::Text("Alice".to_string()),
                CellValue::Text("alice@co.com".to_string()),
            ],
            vec![
                CellValue::Text("2".to_string()),
                CellValue::Text("Bob".to_string()),
                CellValue::Text("bob@co.com".to_string()),
            ],
        ],
        incomplete: false,
    }
}

#[test]
fn test_3_column_2_row_result() {
    let decoded = round_trip(&people());
    let obj = decoded.as_object().expect("output should be a root object");

    let columns = obj.get("columns").expect("should have 'columns' key")
        .as_array().expect("columns should be an array");
    assert_eq!(columns.len(), 3);
    assert_eq!(columns[0], "id");
    assert_eq!(columns[2], "email");

    let types = obj.get("types").expect("should have 'types' key")
        .as_array().expect("types should be an array");
    assert_eq!(types[0], "INTEGER");
    assert_eq!(types[1], "VARCHAR");

    let rows = obj.get("rows").expect("should have 'rows' key")
        .as_array().expect("rows should be an array");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["id"], "1");
    assert_eq!(rows[0]["name"], "Alice");
    assert_eq!(rows[1]["email"], "bob@co.com");

    assert_eq!(obj.get("incomplete").unwrap(), false);
}

#[test]
fn test_incomplete_flag_carried() {
    let mut result = people();
    result.incomplete = true;

    let decoded = round_trip(&result);
    assert_eq!(decoded["incomplete"], true);
}

#[test]
fn test_zero_row_result_keeps_columns() {
    let mut result = people();
    result.rows.clear();

    let decoded = round_trip(&result);
    let obj = decoded.as_object().expect("output should be a root object");

    let columns = obj.get("columns").unwrap().as_array().unwrap();
    assert_eq!(columns.len(), 3);
    let rows = obj.get("rows").unwrap().as_array().unwrap();
    assert!(rows.is_empty(), "rows should be empty for zero-row result");
}

#[test]
fn test_null_cell_value() {
    let result = QueryResult {
        columns: vec![ColumnMeta { name: "val".to_string(), type_name: "INTEGER".to_string() }],
        rows: vec![vec![CellValue::Null]],
        incomplete: false,
    };

    let decoded = round_trip(&result);
    let rows = decoded["rows"].as_array().expect("rows should be an array");
    assert_eq!(rows.len(), 1);
    assert!(rows[0]["val"].is_null(), "NULL cell should decode as null");
}

#[test]
fn test_special_characters_survive() {
    let result = QueryResult {
        columns: vec![ColumnMeta { name: "note".to_string(), type_name: "VARCHAR".to_string() }],
        rows: vec![vec![CellValue::Text("a, b: \"c\"".to_string())]],
        incomplete: false,
    };

    let decoded = round_trip(&result);
    assert_eq!(decoded["rows"][0]["note"], "a, b: \"c\"");
}

#[test]
fn test_to_json_matches_result_shape() {
    let mut result = people();
    result.incomplete = true;

    let json = to_json(&result).unwrap();
    assert!(json.ends_with('\n'));

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["incomplete"], true);
    assert_eq!(value["rows"][1]["name"], "Bob");
    assert!(value.get("columns").is_none());
}

#[test]
fn test_fields_encode_as_toon() {
    let toon = serialize_to_toon(&CONNECTION_FIELDS).unwrap();
    let decoded: serde_json::Value = toon_format::decode_no_coerce(&toon).unwrap();
    let fields = decoded.as_array().expect("fields should be an array");

    assert_eq!(fields.len(), CONNECTION_FIELDS.len());
    let password = fields
        .iter()
        .find(|f| f["key"] == "password")
        .expect("password field present");
    assert_eq!(password["kind"], "password");
    assert_eq!(password["required"], false);
}
