//! Holds one provider per product and fans queries out across them.
//!
//! Providers are kept in registration order, which is also the order of
//! results across products. Providers that cannot match a query on their
//! fixed category or product name are skipped without loading their dataset;
//! any provider that does need loading and fails aborts the query.

use crate::dataset::{DatasetLoader, SourceRecord};
use crate::error::SourceResult;
use crate::resolver::matching::{category_visible, provider_admits};
use crate::resolver::profile::ProfileSet;
use crate::resolver::provider::{ProductSourceProvider, SourceEntry};
use crate::resolver::query::{CategoryDescriptor, ProductDescriptor};
use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Arc;

/// A query hit tagged with the product it came from.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct ProductHit<'a> {
    pub product: &'a str,
    #[serde(flatten)]
    pub entry: SourceEntry<'a>,
}

/// Registered providers keyed by product name.
#[derive(Default)]
pub struct SourceRepository {
    providers: IndexMap<String, ProductSourceProvider>,
}

impl SourceRepository {
    /// One provider per configured profile, all reading through `loader`.
    pub fn from_profiles(profiles: ProfileSet, loader: Arc<dyn DatasetLoader>) -> Self {
        let mut repository = Self::default();
        for profile in profiles.profiles {
            repository.register(ProductSourceProvider::new(profile, loader.clone()));
        }
        repository
    }

    /// Register a provider, replacing any previous one for the same product.
    pub fn register(&mut self, provider: ProductSourceProvider) {
        let product = provider.product_name().to_string();
        if self.providers.insert(product.clone(), provider).is_some() {
            tracing::debug!(product = %product, "replaced source provider");
        }
    }

    pub fn provider(&self, product: &str) -> Option<&ProductSourceProvider> {
        self.providers.get(product)
    }

    pub fn products(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn sources_for_category(
        &self,
        category: Option<&CategoryDescriptor>,
    ) -> SourceResult<Vec<ProductHit<'_>>> {
        let mut hits = Vec::new();
        for provider in self.providers.values() {
            if !category_visible(provider.profile(), category) {
                continue;
            }
            let entries = provider.sources_for_category(category)?;
            hits.extend(tag(provider, entries));
        }
        Ok(hits)
    }

    pub fn sources_for_product(
        &self,
        product: &ProductDescriptor,
    ) -> SourceResult<Vec<ProductHit<'_>>> {
        let mut hits = Vec::new();
        for provider in self.admitting(product) {
            let entries = provider.sources_for_product(product)?;
            hits.extend(tag(provider, entries));
        }
        Ok(hits)
    }

    /// Exact-name lookup across products. Several hits mean several products
    /// publish a source under the same name.
    pub fn exact_source(
        &self,
        product: &ProductDescriptor,
        source_name: &str,
    ) -> SourceResult<Vec<(&str, &SourceRecord)>> {
        let mut hits = Vec::new();
        for provider in self.admitting(product) {
            for record in provider.exact_source(product, source_name)? {
                hits.push((provider.product_name(), record));
            }
        }
        Ok(hits)
    }

    fn admitting<'a, 'p>(
        &'a self,
        product: &'p ProductDescriptor,
    ) -> impl Iterator<Item = &'a ProductSourceProvider> {
        self.providers
            .values()
            .filter(move |provider| provider_admits(provider.profile(), product))
    }
}

fn tag<'a>(
    provider: &'a ProductSourceProvider,
    entries: Vec<SourceEntry<'a>>,
) -> impl Iterator<Item = ProductHit<'a>> + 'a {
    let product = provider.product_name();
    entries
        .into_iter()
        .map(move |entry| ProductHit { product, entry })
}
