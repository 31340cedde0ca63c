//! On-disk layout of product datasets and data root discovery.
//!
//! Every product keeps its sources under `<root>/product/<name>/sources.json`.
//! Path construction is a pure function of the product name so two providers
//! for the same product always read the same file.

use anyhow::{Result, bail};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DATA_DIR_ENV: &str = "PRODUCT_SOURCES_DATA_DIR";
const PRODUCT_DIR: &str = "product";
const DATA_FILE_NAME: &str = "sources.json";
const DATA_DIR_NAME: &str = "data";

/// Data root plus the directory convention used beneath it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Layout rooted at whatever `find_data_root` discovers.
    pub fn discover() -> Result<Self> {
        find_data_root().map(Self::new)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding every product's data.
    pub fn products_dir(&self) -> PathBuf {
        self.root.join(PRODUCT_DIR)
    }

    /// Location of the sources dataset for `product`.
    pub fn dataset_path(&self, product: &str) -> PathBuf {
        self.products_dir().join(product).join(DATA_FILE_NAME)
    }

    /// Product names that have a dataset file, sorted.
    pub fn products(&self) -> Result<Vec<String>> {
        let dir = self.products_dir();
        if !dir.is_dir() {
            bail!("no product directory under {}", self.root.display());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.path().join(DATA_FILE_NAME).is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Returns true when `candidate` looks like a data root.
fn is_data_root(candidate: &Path) -> bool {
    candidate.join(PRODUCT_DIR).is_dir()
}

fn data_root_from_hint(hint: &str) -> Option<PathBuf> {
    if hint.is_empty() {
        return None;
    }
    let hint_path = PathBuf::from(hint);
    if !is_data_root(&hint_path) {
        return None;
    }
    fs::canonicalize(hint_path).ok()
}

fn search_upwards(start: &Path) -> Option<PathBuf> {
    let mut dir = fs::canonicalize(start).ok()?;
    loop {
        let candidate = dir.join(DATA_DIR_NAME);
        if is_data_root(&candidate) {
            return Some(candidate);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

/// Locate the data root.
///
/// Honors `PRODUCT_SOURCES_DATA_DIR` when it points at a directory with a
/// `product/` child, then climbs up from the current executable looking for
/// `data/product`, then falls back to the build-time hint.
pub fn find_data_root() -> Result<PathBuf> {
    if let Ok(env_root) = env::var(DATA_DIR_ENV) {
        if let Some(root) = data_root_from_hint(&env_root) {
            return Ok(root);
        }
        tracing::warn!(path = %env_root, "{DATA_DIR_ENV} does not contain a product directory");
    }

    if let Ok(exe_path) = env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            if let Some(root) = search_upwards(exe_dir) {
                return Ok(root);
            }
        }
    }

    if let Some(hint) = option_env!("PRODUCT_SOURCES_DATA_HINT") {
        if let Some(root) = data_root_from_hint(hint) {
            return Ok(root);
        }
    }

    bail!(
        "Unable to locate a product data root. \
         Set {DATA_DIR_ENV} to a directory containing product/."
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn dataset_path_is_a_pure_function_of_product() {
        let layout = DataLayout::new("/srv/data");
        assert_eq!(
            layout.dataset_path("chdk"),
            PathBuf::from("/srv/data/product/chdk/sources.json")
        );
        assert_eq!(layout.dataset_path("chdk"), layout.dataset_path("chdk"));
        assert_ne!(layout.dataset_path("chdk"), layout.dataset_path("sdm"));
    }

    #[test]
    fn products_lists_only_directories_with_datasets() {
        let dir = TempDir::new().unwrap();
        let layout = DataLayout::new(dir.path());
        for product in ["beta", "alpha"] {
            let path = layout.dataset_path(product);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, "{}").unwrap();
        }
        fs::create_dir_all(layout.products_dir().join("empty")).unwrap();

        assert_eq!(layout.products().unwrap(), ["alpha", "beta"]);
    }

    #[test]
    fn hint_requires_product_directory() {
        let dir = TempDir::new().unwrap();
        assert!(data_root_from_hint(dir.path().to_str().unwrap()).is_none());
        fs::create_dir_all(dir.path().join(PRODUCT_DIR)).unwrap();
        assert!(data_root_from_hint(dir.path().to_str().unwrap()).is_some());
        assert!(data_root_from_hint("").is_none());
    }
}
