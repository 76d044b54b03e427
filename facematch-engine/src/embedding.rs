use ndarray::{Array1, Zip};

use crate::error::EmbeddingError;

/// Face embedding produced by the external embedding provider.
///
/// The dimensionality is fixed by the provider's model (SFace emits 128,
/// ArcFace 512); every vector compared against another must share it.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingVector {
    values: Array1<f32>,
}

impl EmbeddingVector {
    pub fn new(values: Vec<f32>) -> Result<Self, EmbeddingError> {
        if values.is_empty() {
            return Err(EmbeddingError::Empty);
        }
        Ok(Self {
            values: Array1::from_vec(values),
        })
    }

    pub fn dim(&self) -> usize {
        self.values.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        // Array1 built from a Vec is always contiguous
        self.values.as_slice().unwrap_or(&[])
    }

    pub fn to_vec(&self) -> Vec<f32> {
        self.values.to_vec()
    }

    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }

    /// Euclidean norm, accumulated in f64.
    pub fn norm(&self) -> f64 {
        self.values
            .iter()
            .map(|&v| (v as f64) * (v as f64))
            .sum::<f64>()
            .sqrt()
    }

    pub fn is_zero(&self) -> bool {
        self.norm() == 0.0
    }

    pub fn ensure_same_dim(&self, other: &Self) -> Result<(), EmbeddingError> {
        if self.dim() != other.dim() {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dim(),
                got: other.dim(),
            });
        }
        Ok(())
    }

    /// Dot product, accumulated in f64.
    pub fn dot(&self, other: &Self) -> Result<f64, EmbeddingError> {
        self.ensure_same_dim(other)?;
        let mut acc = 0.0f64;
        Zip::from(&self.values)
            .and(&other.values)
            .for_each(|&a, &b| acc += (a as f64) * (b as f64));
        Ok(acc)
    }

    /// Elementwise mean of a non-empty set of equally sized vectors.
    pub fn mean(vectors: &[EmbeddingVector]) -> Result<Self, EmbeddingError> {
        let first = vectors.first().ok_or(EmbeddingError::Empty)?;
        let mut sum = Array1::<f64>::zeros(first.dim());
        for v in vectors {
            first.ensure_same_dim(v)?;
            Zip::from(&mut sum)
                .and(&v.values)
                .for_each(|s, &x| *s += x as f64);
        }
        let n = vectors.len() as f64;
        Ok(Self {
            values: sum.mapv(|s| (s / n) as f32),
        })
    }
}

impl TryFrom<Vec<f32>> for EmbeddingVector {
    type Error = EmbeddingError;

    fn try_from(values: Vec<f32>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}
