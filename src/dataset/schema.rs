//! JSON Schema gate for `sources.json` documents.
//!
//! The crate ships `schema/sources.schema.json` embedded in the binary so
//! loaders can reject structurally wrong datasets before typed decoding.
//! Deployments that pin their own contract can load a schema from disk
//! instead.

use anyhow::{Context, Result, anyhow};
use jsonschema::JSONSchema;
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::OnceLock;

const EMBEDDED_SOURCES_SCHEMA: &str = include_str!("../../schema/sources.schema.json");

/// Compiled validator for source datasets.
pub struct SourcesSchema {
    compiled: JSONSchema,
}

impl SourcesSchema {
    /// The schema bundled with the crate, compiled once per process.
    pub fn embedded() -> Result<&'static SourcesSchema, String> {
        static EMBEDDED: OnceLock<Result<SourcesSchema, String>> = OnceLock::new();
        EMBEDDED
            .get_or_init(|| {
                let value: Value = serde_json::from_str(EMBEDDED_SOURCES_SCHEMA)
                    .map_err(|err| format!("parsing embedded sources schema: {err}"))?;
                Self::compile(&value).map_err(|err| format!("{err:#}"))
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Load and compile a schema file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("opening schema {}", path.display()))?;
        let value: Value = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parsing schema {}", path.display()))?;
        Self::compile(&value).with_context(|| format!("compiling schema {}", path.display()))
    }

    fn compile(value: &Value) -> Result<Self> {
        let compiled = JSONSchema::compile(value).map_err(|err| anyhow!("{err}"))?;
        Ok(Self { compiled })
    }

    /// Validate a parsed dataset, joining every violation into one message.
    pub fn check(&self, instance: &Value) -> Result<(), String> {
        if let Err(errors) = self.compiled.validate(instance) {
            let details = errors
                .map(|err| {
                    let path = err.instance_path.to_string();
                    if path.is_empty() {
                        err.to_string()
                    } else {
                        format!("{path}: {err}")
                    }
                })
                .collect::<Vec<_>>()
                .join("\n");
            return Err(details);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn embedded_schema_accepts_minimal_and_extended_records() {
        let schema = SourcesSchema::embedded().unwrap();
        let dataset = json!({
            "s1": {"channel": "stable", "language": "en-US", "url": "https://example.test"},
            "s2": {},
            "s3": {"channel": null, "language": null}
        });
        assert!(schema.check(&dataset).is_ok());
    }

    #[test]
    fn embedded_schema_rejects_wrong_shapes() {
        let schema = SourcesSchema::embedded().unwrap();
        assert!(schema.check(&json!(["s1"])).is_err());
        assert!(schema.check(&json!({"s1": "https://example.test"})).is_err());
        assert!(schema.check(&json!({"s1": {"channel": 3}})).is_err());

        let err = schema
            .check(&json!({"s1": {"language": "not a tag"}}))
            .unwrap_err();
        assert!(err.contains("/s1/language"), "unexpected message: {err}");
    }
}
