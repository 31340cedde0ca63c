//! Dataset loading and the once-per-provider cache.
//!
//! `DatasetLoader` is the seam between the resolver and storage. The file
//! implementation reads `sources.json` through a `DataLayout`; tests swap in
//! counting loaders. `LazyDataset` memoizes the first load attempt, success
//! or failure, and blocks concurrent first callers until it completes.

use crate::dataset::layout::DataLayout;
use crate::dataset::model::SourceDataset;
use crate::dataset::schema::SourcesSchema;
use crate::error::{SourceError, SourceResult, UnavailableCause};
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

/// Produces the dataset for a product key.
pub trait DatasetLoader: Send + Sync {
    /// Where the dataset for `product` lives; used in diagnostics.
    fn location(&self, product: &str) -> PathBuf;

    /// Read and decode the dataset for `product`.
    fn load(&self, product: &str) -> SourceResult<SourceDataset>;
}

/// Which schema, if any, guards typed decoding.
enum SchemaGate {
    Embedded,
    Custom(SourcesSchema),
    Disabled,
}

/// Reads datasets from `<root>/product/<name>/sources.json`.
pub struct FileDatasetLoader {
    layout: DataLayout,
    schema: SchemaGate,
}

impl FileDatasetLoader {
    pub fn new(layout: DataLayout) -> Self {
        Self {
            layout,
            schema: SchemaGate::Embedded,
        }
    }

    /// Toggle the schema gate in front of typed decoding.
    pub fn with_schema_validation(mut self, validate: bool) -> Self {
        self.schema = match (validate, self.schema) {
            (false, _) => SchemaGate::Disabled,
            (true, SchemaGate::Disabled) => SchemaGate::Embedded,
            (true, gate) => gate,
        };
        self
    }

    /// Validate against `schema` instead of the bundled one.
    pub fn with_schema(mut self, schema: SourcesSchema) -> Self {
        self.schema = SchemaGate::Custom(schema);
        self
    }

    /// Schema guarding this loader. A bundled schema that fails to compile
    /// makes every dataset unreadable rather than invalid.
    fn gate(&self) -> Result<Option<&SourcesSchema>, UnavailableCause> {
        match &self.schema {
            SchemaGate::Embedded => SourcesSchema::embedded()
                .map(Some)
                .map_err(UnavailableCause::Unreadable),
            SchemaGate::Custom(schema) => Ok(Some(schema)),
            SchemaGate::Disabled => Ok(None),
        }
    }
}

impl DatasetLoader for FileDatasetLoader {
    fn location(&self, product: &str) -> PathBuf {
        self.layout.dataset_path(product)
    }

    fn load(&self, product: &str) -> SourceResult<SourceDataset> {
        let location = self.location(product);
        let unavailable = |cause| SourceError::DatasetUnavailable {
            product: product.to_string(),
            location: location.clone(),
            cause,
        };

        tracing::debug!(product, path = %location.display(), "reading sources dataset");
        let bytes = fs::read(&location).map_err(|err| {
            unavailable(match err.kind() {
                ErrorKind::NotFound => UnavailableCause::Missing,
                _ => UnavailableCause::Unreadable(err.to_string()),
            })
        })?;

        let value: Value = serde_json::from_slice(&bytes)
            .map_err(|err| unavailable(UnavailableCause::Malformed(err.to_string())))?;

        if let Some(schema) = self.gate().map_err(unavailable)? {
            schema
                .check(&value)
                .map_err(|details| unavailable(UnavailableCause::SchemaViolation(details)))?;
        }

        let dataset = SourceDataset::from_value(value)
            .map_err(|err| unavailable(UnavailableCause::Malformed(err.to_string())))?;
        tracing::info!(product, sources = dataset.len(), "loaded sources dataset");
        Ok(dataset)
    }
}

/// Lazily loaded, permanently cached dataset for one product.
pub(crate) struct LazyDataset {
    product: String,
    loader: Arc<dyn DatasetLoader>,
    cell: OnceLock<SourceResult<SourceDataset>>,
}

impl LazyDataset {
    pub(crate) fn new(product: String, loader: Arc<dyn DatasetLoader>) -> Self {
        Self {
            product,
            loader,
            cell: OnceLock::new(),
        }
    }

    /// The cached dataset, loading it on first call.
    ///
    /// A failed first load is cached as well; every later call returns the
    /// same error without touching the loader again.
    pub(crate) fn get(&self) -> SourceResult<&SourceDataset> {
        let outcome = self.cell.get_or_init(|| {
            let outcome = self.loader.load(&self.product);
            if let Err(err) = &outcome {
                tracing::warn!(
                    product = %self.product,
                    error = %err,
                    "sources dataset unavailable"
                );
            }
            outcome
        });
        outcome.as_ref().map_err(Clone::clone)
    }

    pub(crate) fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn gate_follows_builder_choices() {
        let loader = FileDatasetLoader::new(DataLayout::new("."));
        assert!(matches!(loader.gate(), Ok(Some(_))));
        let loader = loader.with_schema_validation(false);
        assert!(matches!(loader.gate(), Ok(None)));
        let loader = loader.with_schema_validation(true);
        assert!(matches!(loader.gate(), Ok(Some(_))));
    }

    #[test]
    fn directory_in_place_of_dataset_is_unreadable() {
        let dir = TempDir::new().unwrap();
        let layout = DataLayout::new(dir.path());
        fs::create_dir_all(layout.dataset_path("X")).unwrap();
        let err = FileDatasetLoader::new(layout).load("X").unwrap_err();
        assert!(
            matches!(err.reason(), UnavailableCause::Unreadable(_)),
            "{err}"
        );
        assert_eq!(err.product(), "X");
    }
}
