use serde::Serialize;

use crate::embedding::EmbeddingVector;
use crate::error::{EmbeddingError, SampleFault};

/// The embeddings captured for one person at enrollment, kept individually,
/// plus their elementwise mean.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceSet {
    embeddings: Vec<EmbeddingVector>,
    centroid: EmbeddingVector,
}

impl ReferenceSet {
    /// Build a set from equally sized embeddings, deriving the centroid.
    pub fn new(embeddings: Vec<EmbeddingVector>) -> Result<Self, EmbeddingError> {
        let centroid = EmbeddingVector::mean(&embeddings)?;
        Ok(Self {
            embeddings,
            centroid,
        })
    }

    pub fn embeddings(&self) -> &[EmbeddingVector] {
        &self.embeddings
    }

    pub fn centroid(&self) -> &EmbeddingVector {
        &self.centroid
    }

    pub fn len(&self) -> usize {
        self.embeddings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.embeddings.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.centroid.dim()
    }
}

/// An identity known to the gallery. `references` is `None` until a
/// successful enrollment.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonRecord {
    pub person_id: String,
    pub references: Option<ReferenceSet>,
}

impl PersonRecord {
    pub fn new(person_id: impl Into<String>) -> Self {
        Self {
            person_id: person_id.into(),
            references: None,
        }
    }

    pub fn is_enrolled(&self) -> bool {
        self.references.is_some()
    }
}

/// One gallery entry scored against a probe during recognition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchCandidate {
    pub person_id: String,
    /// Similarity of the probe to each reference embedding, in stored order.
    pub scores: Vec<f32>,
    /// Mean of `scores`.
    pub aggregate: f32,
    /// Every per-sample score reached the match threshold.
    pub consensus: bool,
}

/// Result of a recognition attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum MatchDecision {
    Matched {
        person_id: String,
        confidence: f32,
        gap: f32,
    },
    /// No confident, unambiguous winner. Scores are clamped to >= 0.
    NoMatch { confidence: f32, gap: f32 },
    /// The probe capture was unusable; matching never ran.
    Rejected { reason: SampleFault },
}

impl MatchDecision {
    pub fn no_match() -> Self {
        MatchDecision::NoMatch {
            confidence: 0.0,
            gap: 0.0,
        }
    }

    pub fn person_id(&self) -> Option<&str> {
        match self {
            MatchDecision::Matched { person_id, .. } => Some(person_id),
            _ => None,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, MatchDecision::Matched { .. })
    }
}

impl std::fmt::Display for MatchDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchDecision::Matched {
                person_id,
                confidence,
                gap,
            } => write!(
                f,
                "matched {person_id} (confidence {confidence:.3}, gap {gap:.3})"
            ),
            MatchDecision::NoMatch { confidence, gap } => {
                write!(f, "no match (best {confidence:.3}, gap {gap:.3})")
            }
            MatchDecision::Rejected { reason } => write!(f, "rejected: {reason}"),
        }
    }
}
