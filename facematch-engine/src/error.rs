use serde::Serialize;
use thiserror::Error;

/// Errors raised by embedding arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmbeddingError {
    #[error("embedding is empty")]
    Empty,

    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// Outcome of a failed single-face extraction by the embedding provider.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionError {
    #[error("no face detected")]
    NoFace,

    #[error("{count} faces detected, expected exactly one")]
    MultipleFaces { count: usize },

    #[error("face detection score {score:.3} is too low")]
    LowQuality { score: f32 },

    #[error("embedding extraction failed: {0}")]
    Extraction(String),
}

/// Why a single capture cannot be used, at enrollment or recognition.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleFault {
    #[error(transparent)]
    Detection(#[from] DetectionError),

    #[error("embedding has zero norm")]
    ZeroNorm,

    #[error("embedding contains non-finite values")]
    NonFinite,

    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// Enrollment input rejected; the caller may resubmit better captures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("expected {expected} samples, got {got}")]
    WrongSampleCount { expected: usize, got: usize },

    #[error("sample {index} is invalid: {reason}")]
    InvalidSample { index: usize, reason: SampleFault },
}

/// Errors returned by a gallery store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GalleryError {
    #[error("person not found: {0}")]
    NotFound(String),

    #[error("gallery storage error: {0}")]
    Storage(String),
}

/// Errors returned by [`crate::MatchingEngine::enroll`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnrollError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("person not found: {0}")]
    NotFound(String),

    #[error("gallery storage error: {0}")]
    Storage(String),
}

impl From<GalleryError> for EnrollError {
    fn from(err: GalleryError) -> Self {
        match err {
            GalleryError::NotFound(id) => EnrollError::NotFound(id),
            GalleryError::Storage(msg) => EnrollError::Storage(msg),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("match threshold must be within [-1, 1], got {0}")]
    MatchThreshold(f32),

    #[error("gap threshold must be within [0, 2], got {0}")]
    GapThreshold(f32),

    #[error("centroid pre-filter must be within [-1, 1], got {0}")]
    CentroidPrefilter(f32),

    #[error("required sample count must be at least 1")]
    RequiredSamples,
}
