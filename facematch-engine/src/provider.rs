use crate::embedding::EmbeddingVector;
use crate::error::DetectionError;

/// Detects exactly one face in a raw capture and embeds it.
///
/// Zero faces, several faces, a low-quality detection, or a failed
/// embedding are all reported as a [`DetectionError`]; the engine never
/// guesses which face was meant.
pub trait FaceEmbeddingProvider: Send + Sync {
    fn extract_single_face_embedding(&self, image: &[u8]) -> Result<EmbeddingVector, DetectionError>;
}

impl<P: FaceEmbeddingProvider + ?Sized> FaceEmbeddingProvider for &P {
    fn extract_single_face_embedding(&self, image: &[u8]) -> Result<EmbeddingVector, DetectionError> {
        (**self).extract_single_face_embedding(image)
    }
}

impl<P: FaceEmbeddingProvider + ?Sized> FaceEmbeddingProvider for Box<P> {
    fn extract_single_face_embedding(&self, image: &[u8]) -> Result<EmbeddingVector, DetectionError> {
        (**self).extract_single_face_embedding(image)
    }
}
