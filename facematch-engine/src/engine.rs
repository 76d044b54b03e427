use log::{debug, info};

use crate::config::MatchConfig;
use crate::embedding::EmbeddingVector;
use crate::enrollment::{check_sample, EnrollmentAggregator};
use crate::error::{
    ConfigError, EmbeddingError, EnrollError, GalleryError, SampleFault, ValidationError,
};
use crate::gallery::GalleryStore;
use crate::model::{MatchDecision, ReferenceSet};
use crate::matcher::RecognitionMatcher;
use crate::provider::FaceEmbeddingProvider;

/// Successful enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrollOutcome {
    /// Number of reference embeddings stored.
    pub count: usize,
}

/// Enrollment and recognition over a provider and a gallery.
///
/// The engine holds no mutable state of its own; concurrent calls only
/// share the gallery.
pub struct MatchingEngine<P, G> {
    provider: P,
    gallery: G,
    aggregator: EnrollmentAggregator,
    matcher: RecognitionMatcher,
}

impl<P, G> MatchingEngine<P, G>
where
    P: FaceEmbeddingProvider,
    G: GalleryStore,
{
    pub fn new(config: MatchConfig, provider: P, gallery: G) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            provider,
            gallery,
            aggregator: EnrollmentAggregator::new(config.required_samples),
            matcher: RecognitionMatcher::new(config),
        })
    }

    pub fn config(&self) -> &MatchConfig {
        self.matcher.config()
    }

    pub fn gallery(&self) -> &G {
        &self.gallery
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Enroll a person from exactly K captures, replacing any previous set.
    ///
    /// Nothing is written unless every capture yields a usable embedding.
    pub fn enroll<I>(&self, person_id: &str, images: &[I]) -> Result<EnrollOutcome, EnrollError>
    where
        I: AsRef<[u8]>,
    {
        let samples = images
            .iter()
            .map(|image| self.provider.extract_single_face_embedding(image.as_ref()));
        let references = self.aggregator.aggregate(samples).map_err(|err| {
            info!("Enrollment of {} rejected: {}", person_id, err);
            err
        })?;

        self.check_gallery_dim(person_id, &references)?;

        let count = references.len();
        self.gallery.put(person_id, references)?;
        info!("Enrolled {} with {} reference embeddings", person_id, count);
        Ok(EnrollOutcome { count })
    }

    /// Every stored set must share one dimensionality, otherwise probes
    /// could never be compared against the whole gallery. The person's own
    /// previous set is ignored so a sole enrollee may re-enroll freely.
    fn check_gallery_dim(
        &self,
        person_id: &str,
        references: &ReferenceSet,
    ) -> Result<(), EnrollError> {
        let gallery = self.gallery.get_all_enrolled()?;
        let Some((_, other)) = gallery.iter().find(|(id, _)| id != person_id) else {
            return Ok(());
        };
        if other.dim() != references.dim() {
            let err = ValidationError::InvalidSample {
                index: 0,
                reason: SampleFault::DimensionMismatch {
                    expected: other.dim(),
                    got: references.dim(),
                },
            };
            info!("Enrollment of {} rejected: {}", person_id, err);
            return Err(err.into());
        }
        Ok(())
    }

    /// Identify the single face in `image` against the gallery.
    ///
    /// An unusable capture yields [`MatchDecision::Rejected`]; only gallery
    /// failures are errors.
    pub fn recognize(&self, image: &[u8]) -> Result<MatchDecision, GalleryError> {
        match self.provider.extract_single_face_embedding(image) {
            Ok(probe) => self.recognize_embedding(&probe),
            Err(err) => {
                info!("Probe rejected: {}", err);
                Ok(MatchDecision::Rejected {
                    reason: SampleFault::Detection(err),
                })
            }
        }
    }

    /// Recognize an already extracted probe embedding.
    pub fn recognize_embedding(
        &self,
        probe: &EmbeddingVector,
    ) -> Result<MatchDecision, GalleryError> {
        if let Err(reason) = check_sample(probe, None) {
            info!("Probe rejected: {}", reason);
            return Ok(MatchDecision::Rejected { reason });
        }

        let gallery = self.gallery.get_all_enrolled()?;
        debug!("Scoring probe against {} enrolled people", gallery.len());

        let candidates = gallery.iter().map(|(id, refs)| (id.as_str(), refs));
        let decision = match self.matcher.recognize(probe, candidates) {
            Ok(decision) => decision,
            Err(EmbeddingError::DimensionMismatch { expected, got }) => {
                MatchDecision::Rejected {
                    reason: SampleFault::DimensionMismatch {
                        expected: got,
                        got: expected,
                    },
                }
            }
            Err(EmbeddingError::Empty) => MatchDecision::no_match(),
        };

        info!("Recognition: {}", decision);
        Ok(decision)
    }

    /// Whether the person currently has a complete reference set.
    pub fn is_enrolled(&self, person_id: &str) -> Result<bool, GalleryError> {
        Ok(self
            .gallery
            .get(person_id)?
            .is_some_and(|refs| refs.len() == self.config().required_samples))
    }

    /// Remove the person's reference set.
    pub fn purge(&self, person_id: &str) -> Result<(), GalleryError> {
        self.gallery.clear(person_id)?;
        info!("Purged reference embeddings for {}", person_id);
        Ok(())
    }
}
