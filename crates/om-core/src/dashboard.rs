//! In-memory dashboard state.
//!
//! Holds the entries currently loaded from a store. Updates are explicit
//! method calls on an owned value, with both lists kept newest first.

use crate::entry::{DressingEntry, NewDressingEntry, NewOutputEntry, OutputEntry};
use crate::store::EntryStore;

/// Loaded entries of both kinds, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dashboard {
    outputs: Vec<OutputEntry>,
    dressings: Vec<DressingEntry>,
}

impl Dashboard {
    /// Builds state from already-fetched lists in any order.
    pub fn new(mut outputs: Vec<OutputEntry>, mut dressings: Vec<DressingEntry>) -> Self {
        sort_newest_first(&mut outputs, |entry| entry.timestamp);
        sort_newest_first(&mut dressings, |entry| entry.timestamp);
        Self { outputs, dressings }
    }

    /// Fetches both entry kinds from `store`.
    pub fn load<S: EntryStore>(store: &S) -> Result<Self, S::Error> {
        let outputs = store.list_outputs()?;
        let dressings = store.list_dressings()?;
        tracing::debug!(
            outputs = outputs.len(),
            dressings = dressings.len(),
            "loaded entries"
        );
        Ok(Self::new(outputs, dressings))
    }

    pub fn outputs(&self) -> &[OutputEntry] {
        &self.outputs
    }

    pub fn dressings(&self) -> &[DressingEntry] {
        &self.dressings
    }

    /// Adds a stored output reading. Among tied timestamps the latest record
    /// comes first, the same order a store lists them in.
    pub fn record_output(&mut self, entry: OutputEntry) {
        self.outputs.insert(0, entry);
        sort_newest_first(&mut self.outputs, |entry| entry.timestamp);
    }

    /// Adds a stored dressing change. Ties keep the latest record first.
    pub fn record_dressing(&mut self, entry: DressingEntry) {
        self.dressings.insert(0, entry);
        sort_newest_first(&mut self.dressings, |entry| entry.timestamp);
    }

    /// Inserts an output reading into `store` and records the stored result.
    pub fn submit_output<S: EntryStore>(
        &mut self,
        store: &mut S,
        entry: &NewOutputEntry,
    ) -> Result<OutputEntry, S::Error> {
        let stored = store.insert_output(entry)?;
        tracing::debug!(id = %stored.id, amount_ml = stored.amount_ml, "output entry saved");
        self.record_output(stored.clone());
        Ok(stored)
    }

    /// Inserts a dressing change into `store` and records the stored result.
    pub fn submit_dressing<S: EntryStore>(
        &mut self,
        store: &mut S,
        entry: &NewDressingEntry,
    ) -> Result<DressingEntry, S::Error> {
        let stored = store.insert_dressing(entry)?;
        tracing::debug!(id = %stored.id, amount_ml = stored.amount_ml, "dressing entry saved");
        self.record_dressing(stored.clone());
        Ok(stored)
    }
}

fn sort_newest_first<T, K: Ord>(items: &mut [T], key: impl Fn(&T) -> K) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}
