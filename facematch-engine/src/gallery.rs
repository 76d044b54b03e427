use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::GalleryError;
use crate::model::{PersonRecord, ReferenceSet};

/// Read/write access to enrolled people.
///
/// Implementations must make each `put` visible atomically: a reader never
/// observes a partially written reference set. `get_all_enrolled` must
/// return entries in a deterministic order, which recognition uses to break
/// score ties.
pub trait GalleryStore: Send + Sync {
    /// The person's reference set, or `None` if registered but not enrolled.
    fn get(&self, person_id: &str) -> Result<Option<ReferenceSet>, GalleryError>;

    /// Every person with a reference set.
    fn get_all_enrolled(&self) -> Result<Vec<(String, ReferenceSet)>, GalleryError>;

    /// Replace the person's reference set.
    fn put(&self, person_id: &str, references: ReferenceSet) -> Result<(), GalleryError>;

    /// Drop the person's reference set, returning them to "not enrolled".
    fn clear(&self, person_id: &str) -> Result<(), GalleryError>;
}

impl<G: GalleryStore + ?Sized> GalleryStore for &G {
    fn get(&self, person_id: &str) -> Result<Option<ReferenceSet>, GalleryError> {
        (**self).get(person_id)
    }

    fn get_all_enrolled(&self) -> Result<Vec<(String, ReferenceSet)>, GalleryError> {
        (**self).get_all_enrolled()
    }

    fn put(&self, person_id: &str, references: ReferenceSet) -> Result<(), GalleryError> {
        (**self).put(person_id, references)
    }

    fn clear(&self, person_id: &str) -> Result<(), GalleryError> {
        (**self).clear(person_id)
    }
}

/// In-memory gallery for tests and embedding in other services.
/// Entries are kept in registration order.
pub struct MemoryGallery {
    records: RwLock<Vec<PersonRecord>>,
}

impl MemoryGallery {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    /// Register an identity. Returns `false` if it already existed.
    pub fn register(&self, person_id: &str) -> Result<bool, GalleryError> {
        let mut records = self.write()?;
        if records.iter().any(|r| r.person_id == person_id) {
            return Ok(false);
        }
        records.push(PersonRecord::new(person_id));
        Ok(true)
    }

    /// Number of registered people, enrolled or not.
    pub fn registered_count(&self) -> Result<usize, GalleryError> {
        Ok(self.read()?.len())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<PersonRecord>>, GalleryError> {
        self.records
            .read()
            .map_err(|_| GalleryError::Storage("gallery lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<PersonRecord>>, GalleryError> {
        self.records
            .write()
            .map_err(|_| GalleryError::Storage("gallery lock poisoned".into()))
    }
}

impl Default for MemoryGallery {
    fn default() -> Self {
        Self::new()
    }
}

impl GalleryStore for MemoryGallery {
    fn get(&self, person_id: &str) -> Result<Option<ReferenceSet>, GalleryError> {
        let records = self.read()?;
        records
            .iter()
            .find(|r| r.person_id == person_id)
            .map(|r| r.references.clone())
            .ok_or_else(|| GalleryError::NotFound(person_id.to_string()))
    }

    fn get_all_enrolled(&self) -> Result<Vec<(String, ReferenceSet)>, GalleryError> {
        let records = self.read()?;
        Ok(records
            .iter()
            .filter_map(|r| {
                r.references
                    .as_ref()
                    .map(|refs| (r.person_id.clone(), refs.clone()))
            })
            .collect())
    }

    fn put(&self, person_id: &str, references: ReferenceSet) -> Result<(), GalleryError> {
        let mut records = self.write()?;
        let record = records
            .iter_mut()
            .find(|r| r.person_id == person_id)
            .ok_or_else(|| GalleryError::NotFound(person_id.to_string()))?;
        record.references = Some(references);
        Ok(())
    }

    fn clear(&self, person_id: &str) -> Result<(), GalleryError> {
        let mut records = self.write()?;
        let record = records
            .iter_mut()
            .find(|r| r.person_id == person_id)
            .ok_or_else(|| GalleryError::NotFound(person_id.to_string()))?;
        record.references = None;
        Ok(())
    }
}
