use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Language/culture tag attached to sources and product descriptors
/// (e.g., `en`, `en-US`, `pt_BR`).
///
/// Equality is tag equality rather than string equality: subtags compare
/// case-insensitively and `_` is accepted as a separator alongside `-`. The
/// original spelling is kept for display and serialization.
#[derive(Clone, Debug)]
pub struct LanguageTag {
    raw: String,
    normalized: String,
}

impl LanguageTag {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let normalized = normalize(&raw);
        Self { raw, normalized }
    }

    /// Tag as it was written in the dataset or query.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Lowercase, hyphen-separated form used for comparisons.
    pub fn canonical(&self) -> &str {
        &self.normalized
    }
}

fn normalize(raw: &str) -> String {
    raw.trim()
        .split(['-', '_'])
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

impl PartialEq for LanguageTag {
    fn eq(&self, other: &Self) -> bool {
        self.normalized == other.normalized
    }
}

impl Eq for LanguageTag {}

impl Hash for LanguageTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized.hash(state);
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for LanguageTag {
    fn from(value: &str) -> Self {
        LanguageTag::new(value)
    }
}

impl Serialize for LanguageTag {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LanguageTag {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Self::new(value))
    }
}
