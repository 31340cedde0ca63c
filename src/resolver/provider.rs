//! Source provider for one product.
//!
//! A provider pairs a `SourceProfile` with a lazily loaded dataset and
//! answers the three query shapes. Results borrow from the cached dataset
//! and keep dataset order; the dataset is never mutated.

use crate::dataset::loader::LazyDataset;
use crate::dataset::{DatasetLoader, SourceDataset, SourceRecord};
use crate::error::SourceResult;
use crate::resolver::matching::{applies_to, category_visible, provider_admits, record_admits};
use crate::resolver::profile::SourceProfile;
use crate::resolver::query::{CategoryDescriptor, ProductDescriptor};
use serde::Serialize;
use std::sync::Arc;

/// A dataset entry returned by a query; `id` is the canonical source name.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct SourceEntry<'a> {
    pub id: &'a str,
    #[serde(rename = "source")]
    pub record: &'a SourceRecord,
}

pub struct ProductSourceProvider {
    profile: Box<dyn SourceProfile>,
    dataset: LazyDataset,
}

impl ProductSourceProvider {
    /// Build a provider; nothing is read until the first query.
    pub fn new(profile: impl SourceProfile + 'static, loader: Arc<dyn DatasetLoader>) -> Self {
        let product = profile.product_name().to_string();
        Self {
            profile: Box::new(profile),
            dataset: LazyDataset::new(product, loader),
        }
    }

    pub fn product_name(&self) -> &str {
        self.profile.product_name()
    }

    pub fn category_name(&self) -> Option<&str> {
        self.profile.category_name()
    }

    pub fn profile(&self) -> &dyn SourceProfile {
        self.profile.as_ref()
    }

    /// The cached dataset, loading it on first use.
    pub fn dataset(&self) -> SourceResult<&SourceDataset> {
        self.dataset.get()
    }

    /// Whether a load has been attempted (successfully or not).
    pub fn is_loaded(&self) -> bool {
        self.dataset.is_loaded()
    }

    /// Every entry when `category` (or its name) is absent or equals this
    /// provider's category; otherwise nothing.
    pub fn sources_for_category(
        &self,
        category: Option<&CategoryDescriptor>,
    ) -> SourceResult<Vec<SourceEntry<'_>>> {
        let dataset = self.dataset()?;
        if !category_visible(self.profile(), category) {
            return Ok(Vec::new());
        }
        Ok(dataset
            .iter()
            .map(|(id, record)| SourceEntry { id, record })
            .collect())
    }

    /// Entries that pass the specificity chain for `product`, in dataset order.
    pub fn sources_for_product(
        &self,
        product: &ProductDescriptor,
    ) -> SourceResult<Vec<SourceEntry<'_>>> {
        let dataset = self.dataset()?;
        if !provider_admits(self.profile(), product) {
            return Ok(Vec::new());
        }
        Ok(dataset
            .iter()
            .filter(|(_, record)| record_admits(self.profile(), record, product))
            .map(|(id, record)| SourceEntry { id, record })
            .collect())
    }

    /// Records that pass the chain for `product` and are named `source_name`.
    ///
    /// Names are dataset keys, so this holds at most one record; it stays a
    /// sequence so callers check cardinality instead of assuming a hit.
    pub fn exact_source(
        &self,
        product: &ProductDescriptor,
        source_name: &str,
    ) -> SourceResult<Vec<&SourceRecord>> {
        let dataset = self.dataset()?;
        Ok(dataset
            .iter()
            .map(|(_, record)| record)
            .filter(|record| applies_to(self.profile(), record, product))
            .filter(|record| record.name == source_name)
            .collect())
    }
}
