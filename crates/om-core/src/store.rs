//! Contract for the append-only entry store.

use crate::entry::{DressingEntry, NewDressingEntry, NewOutputEntry, OutputEntry};

/// Append-only storage for both entry kinds.
///
/// Implementations return stored records with their store-assigned identity.
/// Lists are ordered newest first. There is no update or delete.
pub trait EntryStore {
    /// Error returned by the underlying store.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Inserts an output reading and returns the stored record.
    fn insert_output(&mut self, entry: &NewOutputEntry) -> Result<OutputEntry, Self::Error>;

    /// Inserts a dressing change and returns the stored record.
    fn insert_dressing(&mut self, entry: &NewDressingEntry) -> Result<DressingEntry, Self::Error>;

    /// Lists every output reading, newest first.
    fn list_outputs(&self) -> Result<Vec<OutputEntry>, Self::Error>;

    /// Lists every dressing change, newest first.
    fn list_dressings(&self) -> Result<Vec<DressingEntry>, Self::Error>;
}
