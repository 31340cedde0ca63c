//! Source resolution.
//!
//! `ProductSourceProvider` answers queries for one product against its cached
//! dataset; `SourceRepository` fans the same queries out over every
//! configured product. Matching rules live in `matching`, per-product
//! customization in `profile`.

mod matching;
pub mod profile;
pub mod provider;
pub mod query;
pub mod repository;

pub use profile::{
    ChannelRule, LanguageRule, ProductProfile, ProfileSet, SourceProfile, validate_product_name,
};
pub use provider::{ProductSourceProvider, SourceEntry};
pub use query::{CategoryDescriptor, ProductDescriptor};
pub use repository::{ProductHit, SourceRepository};
