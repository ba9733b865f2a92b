//! The data store's single shared mutable state: a snapshot guarded by a
//! plain mutex. Every call into the store runs synchronously to
//! completion including the on-mutation snapshot rewrite, so there is
//! never an `.await` held across the lock — a `parking_lot::Mutex`
//! suffices, matching this service's "value-typed snapshot behind a lock"
//! design rather than an async-aware lock or actor.

use parking_lot::Mutex;
use std::path::PathBuf;

use crate::error::CatalogError;
use crate::snapshot::{self, Snapshot};

pub struct Store {
    path: PathBuf,
    snapshot: Mutex<Snapshot>,
}

impl Store {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CatalogError> {
        let path = path.into();
        let snapshot = snapshot::load(&path)?;
        Ok(Self {
            path,
            snapshot: Mutex::new(snapshot),
        })
    }

    /// Runs `f` against a read-only view of the snapshot. No persistence
    /// happens since nothing was mutated.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Snapshot) -> R,
    {
        let guard = self.snapshot.lock();
        f(&guard)
    }

    /// Runs `f` against a mutable view of the snapshot. On success the
    /// whole snapshot is persisted to disk before returning; on error
    /// nothing is written, so `f` should validate before mutating.
    pub fn write<F, R>(&self, f: F) -> Result<R, CatalogError>
    where
        F: FnOnce(&mut Snapshot) -> Result<R, CatalogError>,
    {
        let mut guard = self.snapshot.lock();
        let result = f(&mut guard)?;
        snapshot::save(&self.path, &guard)?;
        Ok(result)
    }
}
