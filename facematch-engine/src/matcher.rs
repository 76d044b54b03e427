//! Consensus and gap policy turning raw similarities into a decision.
//!
//! For every enrolled person the probe is scored against each of the K
//! reference embeddings. A person is a consensus candidate only when every
//! per-sample score reaches the match threshold; averaging alone would let
//! one strong sample hide weak ones. Consensus candidates are ranked by the
//! mean of their scores, and the winner is accepted only if it also clears
//! the best-vs-runner-up gap.

use log::debug;

use crate::config::MatchConfig;
use crate::embedding::EmbeddingVector;
use crate::error::EmbeddingError;
use crate::model::{MatchCandidate, MatchDecision, ReferenceSet};
use crate::similarity::{cosine_similarity, is_comparable};

#[derive(Debug, Clone)]
pub struct RecognitionMatcher {
    config: MatchConfig,
}

impl RecognitionMatcher {
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Score one gallery entry against the probe.
    ///
    /// Returns `None` when the entry cannot be ranked at all: a reference
    /// set of the wrong size, a zero-norm probe or reference, or a centroid
    /// below the configured pre-filter.
    pub fn score_candidate(
        &self,
        probe: &EmbeddingVector,
        person_id: &str,
        references: &ReferenceSet,
    ) -> Result<Option<MatchCandidate>, EmbeddingError> {
        if references.len() != self.config.required_samples {
            debug!(
                "{}: {} reference embeddings, expected {}; treating as not enrolled",
                person_id,
                references.len(),
                self.config.required_samples
            );
            return Ok(None);
        }

        if let Some(min) = self.config.centroid_prefilter {
            let score = cosine_similarity(probe, references.centroid())?;
            if !is_comparable(score) || score < min {
                debug!("{}: centroid score {:.3} below pre-filter {:.3}", person_id, score, min);
                return Ok(None);
            }
        }

        let mut scores = Vec::with_capacity(references.len());
        for reference in references.embeddings() {
            let score = cosine_similarity(probe, reference)?;
            if !is_comparable(score) {
                debug!("{}: incomparable reference embedding", person_id);
                return Ok(None);
            }
            scores.push(score);
        }

        let aggregate = scores.iter().sum::<f32>() / scores.len() as f32;
        let consensus = scores.iter().all(|&s| s >= self.config.match_threshold);
        debug!(
            "{}: scores {:?} mean {:.3} consensus {}",
            person_id, scores, aggregate, consensus
        );

        Ok(Some(MatchCandidate {
            person_id: person_id.to_string(),
            scores,
            aggregate,
            consensus,
        }))
    }

    /// Consensus candidates in descending aggregate order.
    ///
    /// The sort is stable: on equal aggregates the candidate that came first
    /// in `candidates` ranks first.
    pub fn rank<'a, I>(
        &self,
        probe: &EmbeddingVector,
        candidates: I,
    ) -> Result<Vec<MatchCandidate>, EmbeddingError>
    where
        I: IntoIterator<Item = (&'a str, &'a ReferenceSet)>,
    {
        let mut ranked = Vec::new();
        for (person_id, references) in candidates {
            if let Some(candidate) = self.score_candidate(probe, person_id, references)? {
                if candidate.consensus {
                    ranked.push(candidate);
                }
            }
        }
        ranked.sort_by(|a, b| b.aggregate.total_cmp(&a.aggregate));
        Ok(ranked)
    }

    /// Decide whether `probe` identifies exactly one enrolled person.
    pub fn recognize<'a, I>(
        &self,
        probe: &EmbeddingVector,
        candidates: I,
    ) -> Result<MatchDecision, EmbeddingError>
    where
        I: IntoIterator<Item = (&'a str, &'a ReferenceSet)>,
    {
        let ranked = self.rank(probe, candidates)?;
        Ok(self.decide(&ranked))
    }

    /// Apply the threshold and gap checks to an already ranked list.
    pub fn decide(&self, ranked: &[MatchCandidate]) -> MatchDecision {
        let Some(best) = ranked.first() else {
            return MatchDecision::no_match();
        };
        // A missing rival counts as a score of 0, never negative.
        let runner_up = ranked.get(1).map_or(0.0, |c| c.aggregate);
        let gap = best.aggregate - runner_up;

        if best.aggregate >= self.config.match_threshold && gap >= self.config.gap_threshold {
            MatchDecision::Matched {
                person_id: best.person_id.clone(),
                confidence: best.aggregate,
                gap,
            }
        } else {
            MatchDecision::NoMatch {
                confidence: best.aggregate.max(0.0),
                gap: gap.max(0.0),
            }
        }
    }
}
