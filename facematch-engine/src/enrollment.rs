use crate::embedding::EmbeddingVector;
use crate::error::{DetectionError, SampleFault, ValidationError};
use crate::model::ReferenceSet;

/// A single enrollment capture as reported by the embedding provider.
pub type Sample = Result<EmbeddingVector, DetectionError>;

/// Turns K per-capture embeddings into a person's reference set.
///
/// All-or-nothing: the first unusable sample aborts the whole enrollment.
#[derive(Debug, Clone)]
pub struct EnrollmentAggregator {
    required_samples: usize,
}

impl EnrollmentAggregator {
    pub fn new(required_samples: usize) -> Self {
        Self { required_samples }
    }

    pub fn required_samples(&self) -> usize {
        self.required_samples
    }

    pub fn check_count(&self, got: usize) -> Result<(), ValidationError> {
        if got != self.required_samples {
            return Err(ValidationError::WrongSampleCount {
                expected: self.required_samples,
                got,
            });
        }
        Ok(())
    }

    /// Validate the samples and build the reference set.
    ///
    /// The count is checked before any sample is pulled, so a lazily
    /// extracting iterator does no work for a wrongly sized submission and
    /// stops at the first invalid capture.
    pub fn aggregate<I>(&self, samples: I) -> Result<ReferenceSet, ValidationError>
    where
        I: IntoIterator<Item = Sample>,
        I::IntoIter: ExactSizeIterator,
    {
        let samples = samples.into_iter();
        self.check_count(samples.len())?;

        let mut embeddings: Vec<EmbeddingVector> = Vec::with_capacity(self.required_samples);
        for (index, sample) in samples.enumerate() {
            let embedding = sample.map_err(|e| ValidationError::InvalidSample {
                index,
                reason: e.into(),
            })?;
            check_sample(&embedding, embeddings.first())
                .map_err(|reason| ValidationError::InvalidSample { index, reason })?;
            embeddings.push(embedding);
        }

        // An iterator may misreport its length; never build a short set.
        self.check_count(embeddings.len())?;

        ReferenceSet::new(embeddings).map_err(|_| ValidationError::WrongSampleCount {
            expected: self.required_samples,
            got: 0,
        })
    }
}

/// Check that an embedding is usable for matching, optionally against the
/// dimensionality of a reference embedding.
pub fn check_sample(
    embedding: &EmbeddingVector,
    reference: Option<&EmbeddingVector>,
) -> Result<(), SampleFault> {
    if !embedding.is_finite() {
        return Err(SampleFault::NonFinite);
    }
    if embedding.is_zero() {
        return Err(SampleFault::ZeroNorm);
    }
    if let Some(reference) = reference {
        if reference.dim() != embedding.dim() {
            return Err(SampleFault::DimensionMismatch {
                expected: reference.dim(),
                got: embedding.dim(),
            });
        }
    }
    Ok(())
}
