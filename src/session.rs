//! Shared access to a fact store.
//!
//! A [`Database`] is a cheap, cloneable handle. All work goes through a
//! [`Session`], which holds the store exclusively from `open` until it is
//! dropped. A rule application and a projection therefore never interleave:
//! a reader sees the store either before or after the whole delete/insert.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use tracing::debug;

use crate::construct::FactStore;
use crate::error::{OverlapError, Result};
use crate::project::{Projection, Projector, Rows};
use crate::rewrite::{Plan, Rewrite, RewriteEngine, Rule};

#[derive(Clone, Default)]
pub struct Database {
    store: Arc<Mutex<FactStore>>,
}
impl Database {
    pub fn new(store: FactStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }
    /// Acquires the store. A store left poisoned by a panicking session cannot be opened again.
    pub fn open(&self) -> Result<Session<'_>> {
        let store = self
            .store
            .lock()
            .map_err(|e| OverlapError::Connection(format!("store is unavailable: {}", e)))?;
        debug!(facts = store.len(), generation = store.generation(), "session opened");
        Ok(Session {
            store,
            opened: Instant::now(),
        })
    }
}

pub struct Session<'db> {
    store: MutexGuard<'db, FactStore>,
    opened: Instant,
}
impl Session<'_> {
    pub fn store(&self) -> &FactStore {
        &self.store
    }
    pub fn plan(&self, rule: &Rule) -> Result<Plan> {
        RewriteEngine::plan(&self.store, rule)
    }
    pub fn apply(&mut self, rule: &Rule) -> Result<Rewrite> {
        RewriteEngine::new(&mut self.store).apply(rule)
    }
    pub fn apply_until_stable(&mut self, rule: &Rule, max_passes: usize) -> Result<Vec<Rewrite>> {
        RewriteEngine::new(&mut self.store).apply_until_stable(rule, max_passes)
    }
    pub fn project(&self, projection: &Projection) -> Result<Rows<'_>> {
        Projector::new(&self.store).project(projection)
    }
}
impl Drop for Session<'_> {
    fn drop(&mut self) {
        debug!(
            ms = self.opened.elapsed().as_secs_f64() * 1000.0,
            generation = self.store.generation(),
            "session closed"
        );
    }
}
