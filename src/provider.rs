use facematch_engine::{DetectionError, EmbeddingVector, FaceEmbeddingProvider};
use serde::Deserialize;

/// Detection produced by an external face detector/embedder.
#[derive(Debug, Clone, Deserialize)]
pub struct FaceObservation {
    pub score: f32,
    pub embedding: Vec<f32>,
}

/// Everything the detector found in one capture.
#[derive(Debug, Clone, Deserialize)]
pub struct DetectionReport {
    #[serde(default)]
    pub faces: Vec<FaceObservation>,
}

/// Reads captures that have already been through a detector, as JSON
/// reports `{"faces": [{"score": 0.93, "embedding": [...]}]}`.
#[derive(Debug, Clone)]
pub struct ReportProvider {
    min_detection_score: f32,
}

impl ReportProvider {
    pub fn new(min_detection_score: f32) -> Self {
        Self {
            min_detection_score,
        }
    }

    pub fn parse(&self, image: &[u8]) -> Result<DetectionReport, DetectionError> {
        serde_json::from_slice(image)
            .map_err(|e| DetectionError::Extraction(format!("unreadable detection report: {e}")))
    }
}

impl FaceEmbeddingProvider for ReportProvider {
    fn extract_single_face_embedding(&self, image: &[u8]) -> Result<EmbeddingVector, DetectionError> {
        let mut report = self.parse(image)?;
        let face = match report.faces.len() {
            0 => return Err(DetectionError::NoFace),
            1 => report.faces.remove(0),
            count => return Err(DetectionError::MultipleFaces { count }),
        };
        if face.score < self.min_detection_score {
            return Err(DetectionError::LowQuality { score: face.score });
        }
        EmbeddingVector::new(face.embedding).map_err(|e| DetectionError::Extraction(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(json: &str) -> Result<EmbeddingVector, DetectionError> {
        ReportProvider::new(0.6).extract_single_face_embedding(json.as_bytes())
    }

    #[test]
    fn test_single_face() {
        let emb = extract(r#"{"faces": [{"score": 0.93, "embedding": [0.1, 0.2, 0.3]}]}"#).unwrap();
        assert_eq!(emb.as_slice(), &[0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_face_count() {
        assert_eq!(extract(r#"{"faces": []}"#), Err(DetectionError::NoFace));
        assert_eq!(extract("{}"), Err(DetectionError::NoFace));
        assert_eq!(
            extract(
                r#"{"faces": [
                    {"score": 0.9, "embedding": [1.0]},
                    {"score": 0.8, "embedding": [0.5]}
                ]}"#
            ),
            Err(DetectionError::MultipleFaces { count: 2 })
        );
    }

    #[test]
    fn test_low_quality() {
        assert_eq!(
            extract(r#"{"faces": [{"score": 0.5, "embedding": [1.0]}]}"#),
            Err(DetectionError::LowQuality { score: 0.5 })
        );
    }

    #[test]
    fn test_unreadable() {
        assert!(matches!(extract("\u{89}PNG"), Err(DetectionError::Extraction(_))));
        assert!(matches!(
            extract(r#"{"faces": [{"score": 0.9, "embedding": []}]}"#),
            Err(DetectionError::Extraction(_))
        ));
    }
}
