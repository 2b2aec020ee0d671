//! Persistence seam for the single best-score integer.

use std::{cell::Cell, error::Error as StdError, rc::Rc};

use thiserror::Error;

/// Platform storage holding the best score across sessions.
pub trait BestScoreStore {
    /// Reads the persisted best score, or zero when none was stored.
    fn load(&self) -> i64;

    /// Persists a new best score.
    fn save(&mut self, best: i64) -> Result<(), StoreError>;
}

/// Failure to persist the best score.
#[derive(Debug, Error)]
#[error("failed to persist best score {best}")]
pub struct StoreError {
    best: i64,
    #[source]
    source: Box<dyn StdError + Send + Sync>,
}

impl StoreError {
    /// Wraps the underlying failure for the provided score.
    pub fn new(best: i64, source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self {
            best,
            source: source.into(),
        }
    }

    /// Score that could not be persisted.
    #[must_use]
    pub const fn best(&self) -> i64 {
        self.best
    }
}

/// In-memory store; clones share the same cell.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    best: Rc<Cell<i64>>,
}

impl MemoryStore {
    /// Creates a store pre-populated with `best`.
    #[must_use]
    pub fn new(best: i64) -> Self {
        Self {
            best: Rc::new(Cell::new(best)),
        }
    }

    /// Value currently held by the store.
    #[must_use]
    pub fn best(&self) -> i64 {
        self.best.get()
    }
}

impl BestScoreStore for MemoryStore {
    fn load(&self) -> i64 {
        self.best.get()
    }

    fn save(&mut self, best: i64) -> Result<(), StoreError> {
        self.best.set(best);
        Ok(())
    }
}
