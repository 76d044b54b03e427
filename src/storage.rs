//! On-disk gallery: one directory per registered person under a prefix,
//! with the reference set postcard-encoded in `faces.bin`.

use anyhow::{Context, Result};
use log::warn;
use facematch_engine::{EmbeddingVector, GalleryError, GalleryStore, ReferenceSet};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const FACES_FILE: &str = "faces.bin";

#[derive(Debug, Serialize, Deserialize)]
pub struct FaceRecord {
    pub id: String,
    pub embeddings: Vec<Vec<f32>>,
}

impl FaceRecord {
    fn from_references(id: String, references: &ReferenceSet) -> Self {
        Self {
            id,
            embeddings: references.embeddings().iter().map(|e| e.to_vec()).collect(),
        }
    }

    fn into_references(self) -> Result<ReferenceSet> {
        let embeddings = self
            .embeddings
            .into_iter()
            .map(EmbeddingVector::new)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ReferenceSet::new(embeddings)?)
    }
}

pub struct FileGallery {
    prefix: PathBuf,
}

impl FileGallery {
    pub fn new(prefix: impl Into<PathBuf>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    /// Create the person's directory. Returns `false` if it already existed.
    pub fn register(&self, person_id: &str) -> Result<bool> {
        let path = self
            .person_dir(person_id)
            .with_context(|| format!("invalid person id {person_id:?}"))?;
        if path.is_dir() {
            return Ok(false);
        }
        std::fs::create_dir_all(&path)
            .with_context(|| format!("creating {}", path.display()))?;
        Ok(true)
    }

    /// Remove the person and their reference set entirely.
    pub fn purge(&self, person_id: &str) -> Result<()> {
        let path = self
            .person_dir(person_id)
            .with_context(|| format!("invalid person id {person_id:?}"))?;
        if path.exists() {
            std::fs::remove_dir_all(&path)
                .with_context(|| format!("removing {}", path.display()))?;
        }
        Ok(())
    }

    /// `None` for ids that are not a single plain path component.
    fn person_dir(&self, person_id: &str) -> Option<PathBuf> {
        let valid = !person_id.is_empty()
            && person_id != "."
            && person_id != ".."
            && !person_id.starts_with('.')
            && !person_id.contains(['/', '\\', '\0']);
        valid.then(|| self.prefix.join(person_id))
    }

    fn registered_dir(&self, person_id: &str) -> Result<PathBuf, GalleryError> {
        self.person_dir(person_id)
            .filter(|p| p.is_dir())
            .ok_or_else(|| GalleryError::NotFound(person_id.to_string()))
    }

    fn load(&self, dir: &Path) -> Result<Option<ReferenceSet>> {
        let file = dir.join(FACES_FILE);
        if !file.exists() {
            return Ok(None);
        }
        let data = std::fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
        let record: FaceRecord = postcard::from_bytes(&data)
            .with_context(|| format!("decoding {}", file.display()))?;
        let references = record
            .into_references()
            .with_context(|| format!("invalid reference set in {}", file.display()))?;
        Ok(Some(references))
    }

    fn store(&self, dir: &Path, record: &FaceRecord) -> Result<()> {
        let data = postcard::to_allocvec(record)?;
        // One temp file per write so concurrent writers never share one.
        let tmp = dir.join(format!("{FACES_FILE}.{}.tmp", uuid::Uuid::new_v4()));
        std::fs::write(&tmp, data).with_context(|| format!("writing {}", tmp.display()))?;
        // rename is atomic, so readers see either the old or the new set
        let target = dir.join(FACES_FILE);
        if let Err(err) = std::fs::rename(&tmp, &target) {
            std::fs::remove_file(&tmp).ok();
            return Err(err).with_context(|| format!("replacing {}", target.display()));
        }
        Ok(())
    }
}

fn storage_err(err: anyhow::Error) -> GalleryError {
    GalleryError::Storage(format!("{err:#}"))
}

impl GalleryStore for FileGallery {
    fn get(&self, person_id: &str) -> Result<Option<ReferenceSet>, GalleryError> {
        let dir = self.registered_dir(person_id)?;
        self.load(&dir).map_err(storage_err)
    }

    fn get_all_enrolled(&self) -> Result<Vec<(String, ReferenceSet)>, GalleryError> {
        if !self.prefix.exists() {
            return Ok(vec![]);
        }
        let entries = std::fs::read_dir(&self.prefix)
            .with_context(|| format!("listing {}", self.prefix.display()))
            .map_err(storage_err)?;

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| GalleryError::Storage(e.to_string()))?;
            if !entry.path().is_dir() {
                continue;
            }
            if let Some(id) = entry.file_name().to_str() {
                if self.person_dir(id).is_some() {
                    ids.push(id.to_string());
                }
            }
        }
        // Sorted so recognition ties break the same way on every run.
        ids.sort();

        let mut enrolled = Vec::with_capacity(ids.len());
        for id in ids {
            match self.load(&self.prefix.join(&id)) {
                Ok(Some(references)) => enrolled.push((id, references)),
                Ok(None) => {}
                // One damaged record must not take recognition down for everyone.
                Err(err) => warn!("Skipping unreadable reference set for {}: {:#}", id, err),
            }
        }
        Ok(enrolled)
    }

    fn put(&self, person_id: &str, references: ReferenceSet) -> Result<(), GalleryError> {
        let dir = self.registered_dir(person_id)?;
        let record = FaceRecord::from_references(person_id.to_string(), &references);
        self.store(&dir, &record).map_err(storage_err)
    }

    fn clear(&self, person_id: &str) -> Result<(), GalleryError> {
        let dir = self.registered_dir(person_id)?;
        let file = dir.join(FACES_FILE);
        if file.exists() {
            std::fs::remove_file(&file)
                .with_context(|| format!("removing {}", file.display()))
                .map_err(storage_err)?;
        }
        Ok(())
    }
}
