use std::collections::HashMap;

use super::{ObjectStore, StoreCapabilities};
use crate::errors::StoreResult;

/// Object store held in a `HashMap` for the lifetime of the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryObjectStore {
    objects: HashMap<String, String>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl ObjectStore for MemoryObjectStore {
    fn get(&self, id: &str) -> StoreResult<Option<String>> {
        Ok(self.objects.get(id).cloned())
    }

    fn set(&mut self, id: &str, object: &str) -> StoreResult<()> {
        self.objects.insert(id.to_string(), object.to_string());
        Ok(())
    }

    fn contains(&self, id: &str) -> StoreResult<bool> {
        Ok(self.objects.contains_key(id))
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        let mut keys: Vec<String> = self.objects.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    fn capabilities(&self) -> StoreCapabilities {
        StoreCapabilities::FULL
    }
}
