use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::DocumentRecord;

/// Output file naming:
/// `<prefix>[_<index>]_<date>_<sender_store>_to_<receiver_store>.<extension>`
/// with `_` standing for `separator` and `to` for `link`.
///
/// Characters that are unsafe in file names (`/ \ : * ? " < > |` and control
/// characters) are replaced by `date_separator` in every record-derived
/// component, so `2024/05/01` becomes `2024-05-01` by default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileNaming {
    pub prefix: String,
    pub separator: String,
    pub link: String,
    pub date_separator: String,
    pub extension: String,
}

impl Default for FileNaming {
    fn default() -> Self {
        FileNaming {
            prefix: "調貨單".into(),
            separator: "_".into(),
            link: "to".into(),
            date_separator: "-".into(),
            extension: "pdf".into(),
        }
    }
}

impl FileNaming {
    /// Pure function of the record and the optional 1-based batch index.
    /// Does not look at the filesystem and does not de-duplicate.
    pub fn derive(&self, record: &DocumentRecord, index: Option<usize>) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(6);
        parts.push(self.prefix.clone());
        if let Some(index) = index {
            parts.push(index.to_string());
        }
        parts.push(self.sanitize(&record.date));
        parts.push(self.sanitize(&record.sender_store));
        parts.push(self.link.clone());
        parts.push(self.sanitize(&record.receiver_store));
        format!("{}.{}", parts.join(&self.separator), self.extension)
    }

    fn sanitize(&self, component: &str) -> String {
        let mut out = String::with_capacity(component.len());
        for ch in component.trim().chars() {
            if is_unsafe(ch) {
                out.push_str(&self.date_separator);
            } else {
                out.push(ch);
            }
        }
        out
    }
}

fn is_unsafe(ch: char) -> bool {
    matches!(ch, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') || ch.is_control()
}

/// Names that occur more than once, with the 1-based positions deriving them,
/// in order of first occurrence.
pub fn find_collisions(names: &[String]) -> Vec<(String, Vec<usize>)> {
    let mut seen: HashMap<&str, Vec<usize>> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for (i, name) in names.iter().enumerate() {
        let positions = seen.entry(name.as_str()).or_default();
        if positions.is_empty() {
            order.push(name.as_str());
        }
        positions.push(i + 1);
    }
    order
        .into_iter()
        .filter_map(|name| {
            let positions = &seen[name];
            (positions.len() > 1).then(|| (name.to_string(), positions.clone()))
        })
        .collect()
}
