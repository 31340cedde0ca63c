use crate::dataset::LanguageTag;
use semver::Version;
use serde::{Deserialize, Serialize};

/// Product a caller wants sources for.
///
/// Every field is optional; an absent field matches anything. `channel` is
/// only a hint: the channel actually compared against records comes from the
/// provider profile's `channel_for`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProductDescriptor {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<Version>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub language: Option<LanguageTag>,
}

impl ProductDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::default().with_name(name)
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_version(mut self, version: Version) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<LanguageTag>) -> Self {
        self.language = Some(language.into());
        self
    }
}

/// Category a caller wants sources for; an absent name matches every category.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CategoryDescriptor {
    #[serde(default)]
    pub name: Option<String>,
}

impl CategoryDescriptor {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }

    pub fn any() -> Self {
        Self::default()
    }
}
