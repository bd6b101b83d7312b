//! Object stores: string-keyed mappings from GA4GH identifiers to serialized
//! VRS objects.
//!
//! Every store supports `get`/`set`/`contains`. Stores that cannot write
//! or enumerate their keys say so through [`ObjectStore::capabilities`];
//! [`AnyVar`](crate::AnyVar) accepts them anyway and logs a warning.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryObjectStore;
pub use sqlite::SqliteObjectStore;

use crate::errors::{StoreError, StoreResult};

/// What a store can do beyond lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreCapabilities {
    pub writable: bool,
    pub iterable: bool,
}

impl StoreCapabilities {
    pub const FULL: StoreCapabilities = StoreCapabilities {
        writable: true,
        iterable: true,
    };

    /// Lookups and writes only.
    pub const GET_SET: StoreCapabilities = StoreCapabilities {
        writable: true,
        iterable: false,
    };

    /// True for stores that behave as a general mutable mapping.
    pub fn is_mutable_mapping(&self) -> bool {
        self.writable && self.iterable
    }
}

pub trait ObjectStore {
    /// Return the serialized object stored under `id`, if any.
    fn get(&self, id: &str) -> StoreResult<Option<String>>;

    /// Store `object` under `id`, replacing any previous value.
    fn set(&mut self, id: &str, object: &str) -> StoreResult<()>;

    fn contains(&self, id: &str) -> StoreResult<bool> {
        Ok(self.get(id)?.is_some())
    }

    /// All identifiers in the store, sorted.
    fn keys(&self) -> StoreResult<Vec<String>> {
        Err(StoreError::Unsupported("keys"))
    }

    /// Stores that override [`ObjectStore::keys`] must report themselves iterable here.
    fn capabilities(&self) -> StoreCapabilities {
        StoreCapabilities::GET_SET
    }
}

impl<S: ObjectStore + ?Sized> ObjectStore for Box<S> {
    fn get(&self, id: &str) -> StoreResult<Option<String>> {
        (**self).get(id)
    }

    fn set(&mut self, id: &str, object: &str) -> StoreResult<()> {
        (**self).set(id, object)
    }

    fn contains(&self, id: &str) -> StoreResult<bool> {
        (**self).contains(id)
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        (**self).keys()
    }

    fn capabilities(&self) -> StoreCapabilities {
        (**self).capabilities()
    }
}

impl<S: ObjectStore + ?Sized> ObjectStore for &mut S {
    fn get(&self, id: &str) -> StoreResult<Option<String>> {
        (**self).get(id)
    }

    fn set(&mut self, id: &str, object: &str) -> StoreResult<()> {
        (**self).set(id, object)
    }

    fn contains(&self, id: &str) -> StoreResult<bool> {
        (**self).contains(id)
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        (**self).keys()
    }

    fn capabilities(&self) -> StoreCapabilities {
        (**self).capabilities()
    }
}

/// Exposes another store for lookups only. Writes fail with [`StoreError::ReadOnly`].
#[derive(Debug)]
pub struct ReadOnlyStore<S> {
    inner: S,
}

impl<S: ObjectStore> ReadOnlyStore<S> {
    pub fn new(inner: S) -> Self {
        ReadOnlyStore { inner }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: ObjectStore> ObjectStore for ReadOnlyStore<S> {
    fn get(&self, id: &str) -> StoreResult<Option<String>> {
        self.inner.get(id)
    }

    fn set(&mut self, _id: &str, _object: &str) -> StoreResult<()> {
        Err(StoreError::ReadOnly)
    }

    fn contains(&self, id: &str) -> StoreResult<bool> {
        self.inner.contains(id)
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        self.inner.keys()
    }

    fn capabilities(&self) -> StoreCapabilities {
        StoreCapabilities {
            writable: false,
            ..self.inner.capabilities()
        }
    }
}
