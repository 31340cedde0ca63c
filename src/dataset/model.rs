//! Deserializable representation of a product's `sources.json`.
//!
//! The file is a JSON object keyed by source id. Key order is kept so query
//! results come back in the order the dataset author wrote them. Fields the
//! matcher does not understand stay in `extra` and are written back out
//! unchanged.

use crate::dataset::identity::LanguageTag;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One named download/update location.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SourceRecord {
    /// Canonical name; always the dataset key, never the payload's own field.
    #[serde(skip_deserializing)]
    pub name: String,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub language: Option<LanguageTag>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SourceRecord {
    /// Opaque payload field by name (e.g. `url`).
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

/// Ordered mapping of source id to record, read-only after load.
#[derive(Clone, Debug, Default)]
pub struct SourceDataset {
    entries: IndexMap<String, SourceRecord>,
}

impl SourceDataset {
    /// Decode a dataset from raw JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        let value: Value = serde_json::from_slice(bytes)?;
        Self::from_value(value)
    }

    /// Decode a dataset from an already-parsed JSON value.
    ///
    /// Requires `serde_json`'s `preserve_order` so the object keeps file order
    /// on its way into the index map.
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        let raw: IndexMap<String, SourceRecord> = serde_json::from_value(value)?;
        Ok(Self::from_entries(raw))
    }

    fn from_entries(raw: IndexMap<String, SourceRecord>) -> Self {
        let entries = raw
            .into_iter()
            .map(|(id, mut record)| {
                if let Some(declared) = record.extra.remove("name") {
                    if declared.as_str() != Some(id.as_str()) {
                        tracing::warn!(
                            source = %id,
                            declared = %declared,
                            "source name field disagrees with dataset key; using key"
                        );
                    }
                }
                record.name = id.clone();
                (id, record)
            })
            .collect();
        Self { entries }
    }

    /// Iterates `(id, record)` pairs in dataset order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SourceRecord)> {
        self.entries.iter().map(|(id, record)| (id.as_str(), record))
    }

    pub fn get(&self, id: &str) -> Option<&SourceRecord> {
        self.entries.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, SourceRecord)> for SourceDataset {
    fn from_iter<T: IntoIterator<Item = (String, SourceRecord)>>(iter: T) -> Self {
        Self::from_entries(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keeps_file_order_and_unknown_fields() {
        let raw = br#"{
            "zeta": {"channel": "stable", "url": "https://example.test/z"},
            "alpha": {"channel": "beta", "language": "en", "mirror": true},
            "mid": {}
        }"#;
        let dataset = SourceDataset::from_slice(raw).unwrap();
        assert_eq!(dataset.ids().collect::<Vec<_>>(), ["zeta", "alpha", "mid"]);

        let zeta = dataset.get("zeta").unwrap();
        assert_eq!(zeta.name, "zeta");
        assert_eq!(zeta.field("url"), Some(&json!("https://example.test/z")));
        assert!(zeta.language.is_none());

        let alpha = dataset.get("alpha").unwrap();
        assert_eq!(alpha.language, Some(LanguageTag::new("en")));
        assert_eq!(alpha.field("mirror"), Some(&json!(true)));

        let mid = dataset.get("mid").unwrap();
        assert!(mid.channel.is_none());
        assert!(mid.extra.is_empty());
    }

    #[test]
    fn dataset_key_wins_over_payload_name() {
        let raw = br#"{"canonical": {"name": "legacy", "channel": "stable"}}"#;
        let dataset = SourceDataset::from_slice(raw).unwrap();
        let record = dataset.get("canonical").unwrap();
        assert_eq!(record.name, "canonical");
        assert!(record.field("name").is_none());
    }

    #[test]
    fn serialized_record_passes_payload_through() {
        let raw = br#"{"s1": {"channel": "stable", "url": "https://example.test"}}"#;
        let dataset = SourceDataset::from_slice(raw).unwrap();
        let value = serde_json::to_value(dataset.get("s1").unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "s1",
                "channel": "stable",
                "language": null,
                "url": "https://example.test"
            })
        );
    }

    #[test]
    fn rejects_non_object_documents() {
        assert!(SourceDataset::from_slice(b"[1, 2, 3]").is_err());
        assert!(SourceDataset::from_slice(b"{\"s1\": 5}").is_err());
        assert!(SourceDataset::from_slice(b"not json").is_err());
    }
}
