#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use facematch_engine::{DetectionError, EmbeddingVector, FaceEmbeddingProvider, ReferenceSet};

/// Provider that answers from a table keyed by capture bytes.
#[derive(Default)]
pub struct TableProvider {
    table: HashMap<Vec<u8>, Result<EmbeddingVector, DetectionError>>,
    calls: Mutex<usize>,
}

impl TableProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn face(mut self, capture: &str, embedding: EmbeddingVector) -> Self {
        self.table.insert(capture.as_bytes().to_vec(), Ok(embedding));
        self
    }

    pub fn fail(mut self, capture: &str, err: DetectionError) -> Self {
        self.table.insert(capture.as_bytes().to_vec(), Err(err));
        self
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl FaceEmbeddingProvider for TableProvider {
    fn extract_single_face_embedding(&self, image: &[u8]) -> Result<EmbeddingVector, DetectionError> {
        *self.calls.lock().unwrap() += 1;
        self.table
            .get(image)
            .cloned()
            .unwrap_or(Err(DetectionError::NoFace))
    }
}

/// Unit vector in 2-D whose cosine similarity with [`probe`] is `score`.
pub fn at(score: f32) -> EmbeddingVector {
    EmbeddingVector::new(vec![score, (1.0 - score * score).max(0.0).sqrt()]).unwrap()
}

pub fn probe() -> EmbeddingVector {
    EmbeddingVector::new(vec![1.0, 0.0]).unwrap()
}

pub fn set(scores: &[f32]) -> ReferenceSet {
    ReferenceSet::new(scores.iter().map(|&s| at(s)).collect()).unwrap()
}
