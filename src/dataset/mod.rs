//! Source dataset wiring.
//!
//! A dataset is the `sources.json` file for one product: a JSON object keyed
//! by source id. This module covers where the file lives (`DataLayout`), how
//! it is validated and decoded (`SourcesSchema`, `SourceDataset`), and how it
//! is loaded and cached (`DatasetLoader`).

pub mod identity;
pub mod layout;
pub mod loader;
pub mod model;
pub mod schema;

pub use identity::LanguageTag;
pub use layout::{DATA_DIR_ENV, DataLayout, find_data_root};
pub use loader::{DatasetLoader, FileDatasetLoader};
pub use model::{SourceDataset, SourceRecord};
pub use schema::SourcesSchema;
