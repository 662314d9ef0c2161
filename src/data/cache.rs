//! Per-company dataset cache.
//!
//! Datasets are loaded once per company and handed out as `Arc<Dataset>`, so
//! every filter pass works on a shared read-only relation. Entries are never
//! invalidated within a process.
//!
//! Each company owns a `OnceCell` slot: concurrent callers for the same company
//! block on the slot instead of racing a second read, and a failed read leaves
//! the slot empty so the next call retries.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use once_cell::sync::OnceCell;
use tracing::{debug, info};

use crate::data::loader::{Dataset, load_company};
use crate::error::LoadError;

/// Where datasets come from.
pub trait ShipmentSource {
    fn read(&self, company: &str) -> Result<Dataset, LoadError>;
}

/// Production source: `<data_dir>/<company>.csv`.
#[derive(Debug, Clone)]
pub struct CsvDirectory {
    data_dir: PathBuf,
}

impl CsvDirectory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

impl ShipmentSource for CsvDirectory {
    fn read(&self, company: &str) -> Result<Dataset, LoadError> {
        load_company(&self.data_dir, company)
    }
}

type Slot = Arc<OnceCell<Arc<Dataset>>>;

pub struct DatasetCache<S> {
    source: S,
    slots: Mutex<HashMap<String, Slot>>,
}

impl<S: ShipmentSource> DatasetCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Return the cached dataset, reading it on the first request.
    pub fn get_or_load(&self, company: &str) -> Result<Arc<Dataset>, LoadError> {
        let slot = self.slot(company);

        if let Some(dataset) = slot.get() {
            debug!(company = %company, "dataset cache hit");
            return Ok(Arc::clone(dataset));
        }

        let dataset = slot.get_or_try_init(|| {
            info!(company = %company, "dataset cache miss; reading source");
            self.source.read(company).map(Arc::new)
        })?;
        Ok(Arc::clone(dataset))
    }

    pub fn is_cached(&self, company: &str) -> bool {
        self.lock_slots()
            .get(company)
            .is_some_and(|slot| slot.get().is_some())
    }

    /// Number of companies with a loaded dataset.
    pub fn len(&self) -> usize {
        self.lock_slots().values().filter(|slot| slot.get().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, company: &str) -> Slot {
        // Insert-if-absent on the key map; the read itself happens outside the lock.
        let mut slots = self.lock_slots();
        Arc::clone(slots.entry(company.to_string()).or_default())
    }

    fn lock_slots(&self) -> std::sync::MutexGuard<'_, HashMap<String, Slot>> {
        // Slots hold no invariants a panicking reader could break.
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
