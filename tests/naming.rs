mod common;

use common::record;
use transfer_pdf::{FileNaming, find_collisions};

#[test]
fn slashes_in_the_date_become_dashes() {
    let naming = FileNaming::default();
    assert_eq!(
        naming.derive(&record(0), None),
        "調貨單_2024-05-01_A1_to_B2.pdf"
    );
}

#[test]
fn batch_index_follows_the_prefix() {
    let naming = FileNaming::default();
    assert_eq!(
        naming.derive(&record(2), Some(3)),
        "調貨單_3_2024-05-01_A1_to_B2.pdf"
    );
}

#[test]
fn unsafe_characters_are_replaced() {
    let mut rec = record(0);
    rec.sender_store = "Shop: A/1".into();
    rec.receiver_store = " B\\2? ".into();
    let name = FileNaming::default().derive(&rec, None);
    assert_eq!(name, "調貨單_2024-05-01_Shop- A-1_to_B-2-.pdf");
    assert!(!name.contains('/'));
}

#[test]
fn naming_is_configurable() {
    let naming: FileNaming =
        serde_json::from_str(r#"{"prefix": "transfer", "date_separator": "."}"#).unwrap();
    assert_eq!(naming.separator, "_");
    assert_eq!(
        naming.derive(&record(0), None),
        "transfer_2024.05.01_A1_to_B2.pdf"
    );
}

#[test]
fn collisions_report_every_position() {
    let names: Vec<String> = ["a.pdf", "b.pdf", "a.pdf", "c.pdf", "b.pdf", "a.pdf"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(
        find_collisions(&names),
        vec![
            ("a.pdf".to_string(), vec![1, 3, 6]),
            ("b.pdf".to_string(), vec![2, 5]),
        ]
    );
    assert!(find_collisions(&names[..2]).is_empty());
}
