//! Per-product matching customization.
//!
//! A `SourceProfile` supplies the fixed names a provider answers for and the
//! two derivation hooks used by the matcher. `ProductProfile` is the
//! configuration-driven implementation loaded from `profiles.json`; products
//! with bespoke rules implement the trait directly.

use crate::dataset::{LanguageTag, SourceRecord};
use crate::resolver::query::ProductDescriptor;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

pub trait SourceProfile: Send + Sync {
    /// Product this provider serves; also the dataset key.
    fn product_name(&self) -> &str;

    /// Category this provider belongs to. `None` disables the category
    /// stage for product queries.
    fn category_name(&self) -> Option<&str> {
        None
    }

    /// Channel a record must carry to apply to `product`; `None` means this
    /// product does not discriminate by channel.
    fn channel_for(&self, _product: &ProductDescriptor) -> Option<String> {
        None
    }

    /// Language a record declares; `None` makes the record language-neutral.
    fn language_for(&self, _record: &SourceRecord) -> Option<LanguageTag> {
        None
    }
}

/// How the expected channel is derived from a product descriptor.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ChannelRule {
    /// Never discriminate by channel.
    #[default]
    Ignore,
    /// Use the descriptor's channel hint, if any.
    Requested,
    /// Always require this channel.
    Fixed { channel: String },
    /// Pick by the descriptor's version: pre-release versions map to
    /// `prerelease`, others to `stable`. No version, no channel.
    Prerelease { stable: String, prerelease: String },
}

impl ChannelRule {
    pub fn derive(&self, product: &ProductDescriptor) -> Option<String> {
        match self {
            ChannelRule::Ignore => None,
            ChannelRule::Requested => product.channel.clone(),
            ChannelRule::Fixed { channel } => Some(channel.clone()),
            ChannelRule::Prerelease { stable, prerelease } => {
                product.version.as_ref().map(|version| {
                    if version.pre.is_empty() {
                        stable.clone()
                    } else {
                        prerelease.clone()
                    }
                })
            }
        }
    }
}

/// How a record's language is derived.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageRule {
    /// Treat every record as language-neutral.
    #[default]
    Ignore,
    /// Use the record's `language` field.
    Declared,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProductProfile {
    pub product: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub channel: ChannelRule,
    #[serde(default)]
    pub language: LanguageRule,
}

impl ProductProfile {
    pub fn new(product: impl Into<String>) -> Self {
        Self {
            product: product.into(),
            category: None,
            channel: ChannelRule::Ignore,
            language: LanguageRule::Ignore,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_channel(mut self, channel: ChannelRule) -> Self {
        self.channel = channel;
        self
    }

    pub fn with_language(mut self, language: LanguageRule) -> Self {
        self.language = language;
        self
    }
}

impl SourceProfile for ProductProfile {
    fn product_name(&self) -> &str {
        &self.product
    }

    fn category_name(&self) -> Option<&str> {
        self.category.as_deref()
    }

    fn channel_for(&self, product: &ProductDescriptor) -> Option<String> {
        self.channel.derive(product)
    }

    fn language_for(&self, record: &SourceRecord) -> Option<LanguageTag> {
        match self.language {
            LanguageRule::Ignore => None,
            LanguageRule::Declared => record.language.clone(),
        }
    }
}

/// The profiles configured for one deployment, in file order.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ProfileSet {
    pub profiles: Vec<ProductProfile>,
}

impl ProfileSet {
    /// Read and validate a profile file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading profiles {}", path.display()))?;
        let set: ProfileSet = serde_json::from_str(&data)
            .with_context(|| format!("parsing profiles {}", path.display()))?;
        set.validate()
            .with_context(|| format!("validating profiles {}", path.display()))?;
        Ok(set)
    }

    /// Rejects empty sets, duplicate products and names that cannot be used
    /// as a dataset directory.
    pub fn validate(&self) -> Result<()> {
        if self.profiles.is_empty() {
            bail!("profile set contains no profiles");
        }
        let mut seen = BTreeSet::new();
        for profile in &self.profiles {
            validate_product_name(&profile.product)?;
            if !seen.insert(profile.product.as_str()) {
                bail!("duplicate profile for product {}", profile.product);
            }
            if let Some(category) = &profile.category {
                if category.trim().is_empty() {
                    bail!("profile {} has an empty category", profile.product);
                }
            }
            if let ChannelRule::Fixed { channel } = &profile.channel {
                if channel.is_empty() {
                    bail!("profile {} has an empty fixed channel", profile.product);
                }
            }
        }
        Ok(())
    }
}

/// Product names double as directory names under `product/`.
pub fn validate_product_name(name: &str) -> Result<()> {
    if name.is_empty() {
        bail!("product name must not be empty");
    }
    if name == "." || name == ".." {
        bail!("product name must not be a relative path component, got {name}");
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        bail!("product name must match ^[A-Za-z0-9_.-]+$, got {name}");
    }
    Ok(())
}
