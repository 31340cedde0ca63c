//! Product source resolution.
//!
//! Each software product keeps a `sources.json` dataset describing where its
//! builds can be downloaded from, with an optional channel and language per
//! source. The crate loads a product's dataset once, on first query, and
//! answers three questions against it: which sources belong to a category,
//! which sources apply to a product descriptor, and which source of a given
//! name applies to a descriptor.
//!
//! Matching narrows progressively (category, product name, channel,
//! language); any attribute the caller leaves out matches everything.
//! Results always come back in dataset order.

pub mod dataset;
pub mod error;
pub mod resolver;

pub use dataset::{
    DATA_DIR_ENV, DataLayout, DatasetLoader, FileDatasetLoader, LanguageTag, SourceDataset,
    SourceRecord, SourcesSchema, find_data_root,
};
pub use error::{SourceError, SourceResult, UnavailableCause};
pub use resolver::{
    CategoryDescriptor, ChannelRule, LanguageRule, ProductDescriptor, ProductHit,
    ProductProfile, ProductSourceProvider, ProfileSet, SourceEntry, SourceProfile,
    SourceRepository,
};

/// Split comma- or whitespace-delimited configuration lists into tokens.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .replace(',', " ")
        .split_whitespace()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
