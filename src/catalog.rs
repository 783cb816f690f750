use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::error::Error;
use crate::model::DocumentRecord;

#[derive(Deserialize)]
struct CatalogEntry {
    #[serde(rename = "Item No")]
    item_no: Option<Value>,
    #[serde(rename = "Item Description")]
    item_description: Option<Value>,
}

fn as_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Item code → description table, read from an `ims_list.json` style export
/// (`[{"Item No": ..., "Item Description": ...}, ...]`).
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    entries: HashMap<String, String>,
}

impl Catalog {
    /// Entries lacking either key are skipped. Later duplicates win.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let raw: Vec<CatalogEntry> = serde_json::from_str(json)?;
        let entries = raw
            .into_iter()
            .filter_map(|e| Some((as_text(e.item_no)?, as_text(e.item_description)?)))
            .collect();
        Ok(Catalog { entries })
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            Error::Io(std::io::Error::new(e.kind(), format!("{}: {}", e, path.display())))
        })?;
        let catalog = Self::from_json(&json)?;
        log::info!("Loaded {} catalog entries from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn lookup(&self, code: &str) -> Option<&str> {
        self.entries.get(code.trim()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fill blank item descriptions from the catalog. Returns the codes that
    /// had no entry.
    pub fn fill_descriptions(&self, record: &mut DocumentRecord) -> Vec<String> {
        let mut missing = Vec::new();
        for item in record.items.iter_mut().filter(|i| i.description.trim().is_empty()) {
            match self.lookup(&item.code) {
                Some(description) => item.description = description.to_string(),
                None => {
                    log::warn!("No catalog entry for item {}", item.code);
                    missing.push(item.code.clone());
                }
            }
        }
        missing
    }
}
