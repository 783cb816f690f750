mod common;

use common::record;
use transfer_pdf::{Error, ItemLine, parse_records};

#[test]
fn single_object_or_array() {
    let one = r#"{
        "date": "2024/05/01",
        "sender_store": "A1", "sender_name": "Amy",
        "receiver_store": "B2", "receiver_name": "Ben",
        "items": [{"code": "X1", "description": "Bolt", "quantity": 4}]
    }"#;
    let records = parse_records(one).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].items[0], ItemLine::new("X1", "Bolt", "4"));
    assert_eq!(records[0].notes, None);

    let many = format!("[{one}, {one}]");
    assert_eq!(parse_records(&many).unwrap().len(), 2);
}

#[test]
fn optional_fields_default() {
    let json = r#"{
        "date": "d", "sender_store": "s", "sender_name": "n",
        "receiver_store": "r", "receiver_name": "m",
        "items": [{"code": "X1", "quantity": "2"}]
    }"#;
    let records = parse_records(json).unwrap();
    assert_eq!(records[0].items[0].description, "");

    let no_items = r#"{"date": "d", "sender_store": "s", "sender_name": "n",
        "receiver_store": "r", "receiver_name": "m"}"#;
    assert!(parse_records(no_items).unwrap()[0].items.is_empty());
}

#[test]
fn malformed_json_is_reported() {
    assert!(matches!(parse_records("{"), Err(Error::Json(_))));
}

#[test]
fn validation_rules() {
    assert!(record(3).validate().is_ok());

    let mut rec = record(1);
    rec.receiver_name = "  ".into();
    let err = rec.validate().unwrap_err();
    assert!(err.is_validation());
    assert!(err.to_string().contains("receiver name"));

    let mut rec = record(1);
    rec.items[0].quantity = "two".into();
    assert!(matches!(rec.validate(), Err(Error::InvalidRecord(_))));

    let mut rec = record(1);
    rec.items[0].code = String::new();
    assert!(rec.validate().is_err());
}

#[test]
fn preview_lists_every_item() {
    let mut rec = record(2);
    rec.items[1].description = "d".repeat(80);
    let text = rec.preview();
    assert!(text.contains("Sender / 寄件人: Amy"));
    assert!(text.contains(&"d".repeat(50)));
    assert!(!text.contains(&"d".repeat(51)));
    assert!(text.trim_end().ends_with("Total items: 2"));
}
