use anyhow::{Context, Result, bail};
use product_sources::{DataLayout, DatasetLoader, FileDatasetLoader, SourceDataset, SourceResult};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

/// Temporary data root with helpers for writing product datasets.
pub struct DataRoot {
    dir: TempDir,
}

impl DataRoot {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to allocate data root");
        fs::create_dir_all(dir.path().join("product")).expect("failed to create product dir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn layout(&self) -> DataLayout {
        DataLayout::new(self.path())
    }

    /// Write `contents` verbatim as the dataset for `product`.
    pub fn write_dataset(&self, product: &str, contents: &str) -> PathBuf {
        let path = self.layout().dataset_path(product);
        fs::create_dir_all(path.parent().expect("dataset path has a parent"))
            .expect("failed to create product directory");
        fs::write(&path, contents).expect("failed to write dataset");
        path
    }

    pub fn write_profiles(&self, contents: &str) -> PathBuf {
        let path = self.path().join("profiles.json");
        fs::write(&path, contents).expect("failed to write profiles");
        path
    }
}

/// File loader that counts how often it is asked to load.
pub struct CountingFileLoader {
    inner: FileDatasetLoader,
    loads: AtomicUsize,
}

impl CountingFileLoader {
    pub fn new(layout: DataLayout) -> Self {
        Self {
            inner: FileDatasetLoader::new(layout),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl DatasetLoader for CountingFileLoader {
    fn location(&self, product: &str) -> PathBuf {
        self.inner.location(product)
    }

    fn load(&self, product: &str) -> SourceResult<SourceDataset> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.inner.load(product)
    }
}

pub fn source_query() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_source-query"));
    cmd.env_remove("RUST_LOG");
    cmd
}

pub fn run_command(mut cmd: Command) -> Result<Output> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to run command: {:?}", cmd))?;
    if output.status.success() {
        Ok(output)
    } else {
        bail!(
            "command {:?} failed: status {:?}\nstdout: {}\nstderr: {}",
            cmd,
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    }
}
