//! Work list sources: the line-oriented pickup batch file and the JSON name lists.

use crate::operation::{LevelId, Operation};
use anyhow::{Context, Result};
use core_logic::JsonStore;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::Path;

/// One non-blank line of the batch source, not yet parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchLine {
    /// 1-based line number in the source document
    pub number: usize,
    pub text: String,
}

impl fmt::Display for BatchLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}", self.number)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PickupEntry {
    pub level_id: LevelId,
    pub pickup_ids: Vec<Value>,
}

impl PickupEntry {
    pub fn parse(text: &str) -> Result<Self, String> {
        let entry: PickupEntry = serde_json::from_str(text).map_err(|e| e.to_string())?;
        if matches!(&entry.level_id, LevelId::Text(s) if s.is_empty()) {
            return Err("empty level_id".to_string());
        }
        if entry.pickup_ids.is_empty() {
            return Err("empty pickup_ids".to_string());
        }
        Ok(entry)
    }

    pub fn into_operation(self) -> Operation {
        Operation::CollectPickupBatch {
            level_id: self.level_id,
            pickup_ids: self.pickup_ids,
        }
    }
}

/// Splits a batch document into lines, dropping blank ones.
pub fn batch_lines(content: &str) -> Vec<BatchLine> {
    content
        .lines()
        .enumerate()
        .filter_map(|(i, line)| {
            let text = line.trim();
            (!text.is_empty()).then(|| BatchLine {
                number: i + 1,
                text: text.to_string(),
            })
        })
        .collect()
}

pub fn read_batch_source(path: &Path) -> Result<Vec<BatchLine>> {
    if !path.exists() {
        anyhow::bail!(
            "{} not found",
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string())
        );
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(batch_lines(&content))
}

/// JSON array of names; missing or corrupt files read as empty.
pub fn read_name_list(path: &Path) -> Vec<String> {
    JsonStore::load_or_default::<Vec<String>>(path)
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blank_lines_skipped_numbers_kept() {
        let lines = batch_lines("{\"a\":1}\n\n   \n{\"b\":2}\r\n");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].number, 1);
        assert_eq!(lines[1].number, 4);
        assert_eq!(lines[1].text, "{\"b\":2}");
    }

    #[test]
    fn test_parse_entry() {
        let entry = PickupEntry::parse(r#"{"level_id": "Prairie", "pickup_ids": [1, "x"]}"#)
            .unwrap();
        assert_eq!(entry.level_id, LevelId::Text("Prairie".to_string()));
        assert_eq!(entry.pickup_ids, vec![json!(1), json!("x")]);

        let numeric = PickupEntry::parse(r#"{"level_id": 7, "pickup_ids": [1]}"#).unwrap();
        assert_eq!(numeric.level_id, LevelId::Number(7));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(PickupEntry::parse("{not json").is_err());
        assert!(PickupEntry::parse(r#"{"pickup_ids": [1]}"#).is_err());
        assert!(PickupEntry::parse(r#"{"level_id": "L"}"#).is_err());
        assert!(PickupEntry::parse(r#"{"level_id": "L", "pickup_ids": []}"#).is_err());
        assert!(PickupEntry::parse(r#"{"level_id": "", "pickup_ids": [1]}"#).is_err());
        assert!(PickupEntry::parse(r#"{"level_id": null, "pickup_ids": [1]}"#).is_err());
    }
}
