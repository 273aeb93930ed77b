//! Unit tests for the plant-code coordinate table.
//!
//! Run with: cargo test --test geo_unit_test

use std::io::Write;

use turbine_sync::geo::{FALLBACK_LATITUDE, FALLBACK_LONGITUDE, GeoTable};

#[test]
fn resolves_by_two_character_prefix() {
    let table = GeoTable::from_json(r#"{"15": [56.1, 9.4], "20": [53.55, 9.99]}"#).expect("valid table");

    let point = table.resolve("15S1");
    assert_eq!(point.lat, 56.1);
    assert_eq!(point.lon, 9.4);
    assert!(!point.defaulted);

    let point = table.resolve("  20A7 ");
    assert_eq!(point.lat, 53.55);
    assert!(!point.defaulted);
}

#[test]
fn unknown_or_short_codes_fall_back() {
    let table = GeoTable::from_json(r#"{"15": [56.1, 9.4]}"#).expect("valid table");

    for code in ["99X1", "1", ""] {
        let point = table.resolve(code);
        assert_eq!(point.lat, FALLBACK_LATITUDE, "{code}");
        assert_eq!(point.lon, FALLBACK_LONGITUDE, "{code}");
        assert!(point.defaulted, "{code}");
    }
}

#[test]
fn entry_with_fewer_than_two_numbers_falls_back() {
    let table = GeoTable::from_json(r#"{"15": [56.1], "16": []}"#).expect("valid table");

    assert!(table.resolve("15S1").defaulted);
    assert!(table.resolve("16S1").defaulted);
}

#[test]
fn bad_entries_only_affect_their_own_prefix() {
    let table = GeoTable::from_json(
        r#"{"15": [56.1, 9.4], "99": null, "16": "56.1,9.4", "17": ["57.2", 9.4], "18": [56.1]}"#,
    )
    .expect("object document");

    assert_eq!(table.len(), 2);
    assert_eq!(table.resolve("17S1").lat, 57.2);
    let point = table.resolve("15S1");
    assert_eq!((point.lat, point.lon), (56.1, 9.4));
    assert!(!point.defaulted);
    for code in ["99A1", "16S1", "18S1"] {
        assert!(table.resolve(code).defaulted, "{code}");
    }
}

#[test]
fn file_with_one_bad_entry_keeps_the_rest() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(file, r#"{{"15": [56.1, 9.4], "99": null}}"#).expect("write");

    let table = GeoTable::load_or_empty(file.path());
    assert_eq!(table.len(), 1);
    assert!(!table.resolve("15S1").defaulted);
}

#[test]
fn non_object_document_is_an_error() {
    assert!(GeoTable::from_json(r#"["15", 56.1, 9.4]"#).is_err());
}

#[test]
fn missing_file_yields_empty_table() {
    let dir = tempfile::tempdir().expect("tempdir");
    let table = GeoTable::load_or_empty(&dir.path().join("absent.json"));

    assert!(table.is_empty());
    assert!(table.resolve("15S1").defaulted);
}

#[test]
fn malformed_file_yields_empty_table() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(file, "{{ not json").expect("write");

    let table = GeoTable::load_or_empty(file.path());
    assert!(table.is_empty());
}

#[test]
fn valid_file_is_loaded() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(file, r#"{{"15": [56.1, 9.4], "40": [59.33, 18.07]}}"#).expect("write");

    let table = GeoTable::load_or_empty(file.path());
    assert_eq!(table.len(), 2);
    assert_eq!(table.resolve("40B2").lon, 18.07);
}

#[test]
fn bundled_mapping_parses() {
    let raw = include_str!("../assets/geo_mapping.json");
    let table = GeoTable::from_json(raw).expect("bundled mapping");

    assert!(!table.is_empty());
    assert!(!table.resolve("15S1").defaulted);
}
