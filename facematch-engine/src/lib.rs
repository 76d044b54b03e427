//! Face matching and decision engine.
//!
//! Enrollment turns K captures of a person into a [`ReferenceSet`];
//! recognition scores one capture against every enrolled set and applies a
//! consensus and gap policy to accept, abstain, or reject. Face detection,
//! embedding extraction, and persistence are collaborators behind the
//! [`FaceEmbeddingProvider`] and [`GalleryStore`] traits.

pub mod config;
pub mod embedding;
pub mod engine;
pub mod enrollment;
pub mod error;
pub mod gallery;
pub mod matcher;
pub mod model;
pub mod provider;
pub mod similarity;

pub use config::MatchConfig;
pub use embedding::EmbeddingVector;
pub use engine::{EnrollOutcome, MatchingEngine};
pub use enrollment::{EnrollmentAggregator, Sample};
pub use error::{
    ConfigError, DetectionError, EmbeddingError, EnrollError, GalleryError, SampleFault,
    ValidationError,
};
pub use gallery::{GalleryStore, MemoryGallery};
pub use matcher::RecognitionMatcher;
pub use model::{MatchCandidate, MatchDecision, PersonRecord, ReferenceSet};
pub use provider::FaceEmbeddingProvider;
pub use similarity::{cosine_similarity, is_comparable, INCOMPARABLE};
