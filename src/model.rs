use std::fmt::Write as _;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Error;

/// One row of the goods table. All three fields are carried as text; the
/// layout engine never parses them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemLine {
    pub code: String,
    #[serde(default)]
    pub description: String,
    #[serde(deserialize_with = "string_or_number")]
    pub quantity: String,
}

impl ItemLine {
    pub fn new(code: impl Into<String>, description: impl Into<String>, quantity: impl Into<String>) -> Self {
        ItemLine {
            code: code.into(),
            description: description.into(),
            quantity: quantity.into(),
        }
    }
}

/// One transfer document: header fields plus the ordered goods list.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Display date, passed through verbatim (e.g. `2024/05/01`)
    pub date: String,
    pub sender_store: String,
    pub sender_name: String,
    pub receiver_store: String,
    pub receiver_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub items: Vec<ItemLine>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Number(serde_json::Number),
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match TextOrNumber::deserialize(deserializer)? {
        TextOrNumber::Text(s) => s,
        TextOrNumber::Number(n) => n.to_string(),
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RecordInput {
    Many(Vec<DocumentRecord>),
    One(Box<DocumentRecord>),
}

/// Parse records from JSON. Accepts either a single record object or an array.
pub fn parse_records(json: &str) -> Result<Vec<DocumentRecord>, Error> {
    Ok(match serde_json::from_str::<RecordInput>(json)? {
        RecordInput::Many(records) => records,
        RecordInput::One(record) => vec![*record],
    })
}

pub fn load_records(path: &Path) -> Result<Vec<DocumentRecord>, Error> {
    let json = std::fs::read_to_string(path).map_err(|e| {
        Error::Io(std::io::Error::new(e.kind(), format!("{}: {}", e, path.display())))
    })?;
    parse_records(&json)
}

impl DocumentRecord {
    /// Notes worth printing: present and not blank.
    pub fn printable_notes(&self) -> Option<&str> {
        self.notes.as_deref().filter(|n| !n.trim().is_empty())
    }

    /// Checks the rules the entry surface enforces before a record reaches
    /// the layout engine. Rendering itself never calls this.
    pub fn validate(&self) -> Result<(), Error> {
        let required = [
            ("sender store", &self.sender_store),
            ("sender name", &self.sender_name),
            ("receiver store", &self.receiver_store),
            ("receiver name", &self.receiver_name),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(Error::InvalidRecord(format!("{field} is required")));
            }
        }
        for (i, item) in self.items.iter().enumerate() {
            if item.code.trim().is_empty() {
                return Err(Error::InvalidRecord(format!("item {} has no code", i + 1)));
            }
            if item.quantity.trim().parse::<i64>().is_err() {
                return Err(Error::InvalidRecord(format!(
                    "item {} ({}): quantity {:?} is not a whole number",
                    i + 1,
                    item.code,
                    item.quantity
                )));
            }
        }
        Ok(())
    }

    /// Plain-text summary of the record, used by the `preview` command.
    pub fn preview(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Transfer Document / 調貨單");
        let _ = writeln!(out, "================");
        let _ = writeln!(out, "Date / 日期: {}", self.date);
        let _ = writeln!(out, "From Store / 寄出店別: {}", self.sender_store);
        let _ = writeln!(out, "Sender / 寄件人: {}", self.sender_name);
        let _ = writeln!(out, "To Store / 收件店別: {}", self.receiver_store);
        let _ = writeln!(out, "Receiver / 收件人: {}", self.receiver_name);
        let _ = writeln!(out, "Notes / 備註: {}", self.notes.as_deref().unwrap_or(""));
        out.push('\n');
        let _ = writeln!(out, "{:<15} {:<50} {:<10}", "Code", "Description", "Qty");
        let _ = writeln!(out, "{}", "-".repeat(75));
        for item in &self.items {
            let desc: String = item.description.chars().take(50).collect();
            let _ = writeln!(out, "{:<15} {:<50} {:<10}", item.code, desc, item.quantity);
        }
        let _ = writeln!(out, "\nTotal items: {}", self.items.len());
        out
    }
}
