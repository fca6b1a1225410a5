use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use storefront_core::{Entity, StoreError};

/// Entity map keyed by `Entity::id`, guarded by one lock.
///
/// Stores that need a check-and-write to be atomic take the write guard once and do
/// both under it.
#[derive(Debug)]
pub struct InMemoryTable<E: Entity> {
    inner: RwLock<HashMap<E::Id, E>>,
}

impl<E: Entity> InMemoryTable<E> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    pub fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<E::Id, E>>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::backend("lock poisoned"))
    }

    pub fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<E::Id, E>>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::backend("lock poisoned"))
    }
}

impl<E: Entity + Clone> InMemoryTable<E> {
    pub fn get(&self, id: &E::Id) -> Result<Option<E>, StoreError> {
        Ok(self.read()?.get(id).cloned())
    }

    /// Insert or replace the record with the same id.
    pub fn upsert(&self, entity: E) -> Result<(), StoreError> {
        let id = entity.id().clone();
        self.write()?.insert(id, entity);
        Ok(())
    }

    pub fn remove(&self, id: &E::Id) -> Result<Option<E>, StoreError> {
        Ok(self.write()?.remove(id))
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.read()?.is_empty())
    }
}

impl<E: Entity> Default for InMemoryTable<E> {
    fn default() -> Self {
        Self::new()
    }
}
