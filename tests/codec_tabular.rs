
#[path = "../src/codec.rs"]
#[allow(dead_code)]
mod codec;

use codec::CodecError;
use test_support::temp_dir;

#[test]
fn tabular_write_then_read_preserves_rows_and_order() {
    let dir = temp_dir("rollbook-codec-roundtrip");
    let path = dir.join("table.csv");

    let header = ["student_id", "course_id", "status"];
    let rows = vec![
        vec!["S-001".to_string(), "CS101".to_string(), "P".to_string()],
        vec!["S-002".to_string(), "CS101".to_string(), "A".to_string()],
        vec!["S-001".to_string(), "MA201".to_string(), "L".to_string()],
    ];
    codec::write_tabular(&path, &header, &rows).expect("write table");

    let tab = codec::read_tabular(&path).expect("read table");
    assert_eq!(tab.header, header);
    assert_eq!(tab.rows, rows);

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn tabular_field_lookup_follows_header_position() {
    let tab = codec::parse_tabular("a,b,c\n1,2,3\n");
    assert_eq!(tab.rows.len(), 1);
    assert_eq!(tab.field(&tab.rows[0], "b"), Some("2"));
    assert_eq!(tab.field(&tab.rows[0], "missing"), None);
}

#[test]
fn tabular_short_row_reports_missing_fields() {
    let tab = codec::parse_tabular("a,b,c\n1,2\n");
    assert_eq!(tab.field(&tab.rows[0], "a"), Some("1"));
    assert_eq!(tab.field(&tab.rows[0], "c"), None);
}

#[test]
fn empty_collection_save_is_a_successful_no_op() {
    let dir = temp_dir("rollbook-codec-empty");
    let path = dir.join("table.csv");

    codec::write_tabular(&path, &["a", "b"], &[]).expect("empty save reports success");
    assert!(!path.exists(), "no file should be created for an empty save");

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn row_not_matching_schema_width_fails_before_touching_disk() {
    let dir = temp_dir("rollbook-codec-width");
    let path = dir.join("table.csv");

    let rows = vec![vec!["only-one-field".to_string()]];
    let err = codec::write_tabular(&path, &["a", "b"], &rows).unwrap_err();
    assert!(matches!(err, CodecError::Malformed(_)));
    assert!(!path.exists());

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn value_containing_delimiter_or_newline_is_rejected() {
    let dir = temp_dir("rollbook-codec-delim");
    let path = dir.join("table.csv");

    let with_comma = vec![vec!["a,b".to_string(), "c".to_string()]];
    assert!(matches!(
        codec::write_tabular(&path, &["x", "y"], &with_comma),
        Err(CodecError::Malformed(_))
    ));

    let with_newline = vec![vec!["a".to_string(), "c\nd".to_string()]];
    assert!(matches!(
        codec::write_tabular(&path, &["x", "y"], &with_newline),
        Err(CodecError::Malformed(_))
    ));
    assert!(!path.exists());

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn missing_files_surface_as_not_found() {
    let dir = temp_dir("rollbook-codec-missing");

    assert!(matches!(
        codec::read_tabular(&dir.join("absent.csv")),
        Err(CodecError::NotFound)
    ));
    assert!(matches!(
        codec::read_json_array::<serde_json::Value>(&dir.join("absent.json")),
        Err(CodecError::NotFound)
    ));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn malformed_json_document_surfaces_as_malformed() {
    let dir = temp_dir("rollbook-codec-badjson");
    let path = dir.join("users.json");
    std::fs::write(&path, "{ definitely not an array").expect("write bad json");

    let err = codec::read_json_array::<serde_json::Value>(&path).unwrap_err();
    assert!(matches!(err, CodecError::Malformed(_)));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn json_array_roundtrip_preserves_document_order() {
    let dir = temp_dir("rollbook-codec-json");
    let path = dir.join("items.json");

    let items: Vec<serde_json::Value> = vec![
        serde_json::json!({"k": "first"}),
        serde_json::json!({"k": "second"}),
    ];
    codec::write_json_array(&path, &items).expect("write json array");
    let loaded: Vec<serde_json::Value> = codec::read_json_array(&path).expect("read json array");
    assert_eq!(loaded, items);

    let _ = std::fs::remove_dir_all(dir);
}
