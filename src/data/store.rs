use std::path::PathBuf;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use super::loader;
use super::model::Dataset;
use crate::error::Result;

// ---------------------------------------------------------------------------
// DatasetStore – load once, share read-only
// ---------------------------------------------------------------------------

/// Owns the source path and the single in-memory copy of the dataset.
///
/// The first successful [`DatasetStore::load`] publishes the dataset; every
/// later call, from any thread, gets the same `Arc`. Concurrent first callers
/// block on the cell instead of reading the file twice.
#[derive(Debug)]
pub struct DatasetStore {
    path: PathBuf,
    cell: OnceCell<Arc<Dataset>>,
}

impl DatasetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cell: OnceCell::new(),
        }
    }

    /// Return the shared dataset, reading the source on first use.
    pub fn load(&self) -> Result<Arc<Dataset>> {
        self.cell
            .get_or_try_init(|| {
                let dataset = loader::load_file(&self.path).inspect_err(|e| {
                    log::error!("Failed to load {}: {e}", self.path.display());
                })?;
                log::info!(
                    "Loaded {} records from {}",
                    dataset.len(),
                    self.path.display()
                );
                Ok(Arc::new(dataset))
            })
            .cloned()
    }
}
