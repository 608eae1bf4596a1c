//! Conversion of detected poses into flat feature vectors.

use itertools::{Itertools, MinMaxResult};
use thiserror::Error;

use crate::pose::Pose;

/// Errors produced while building or validating a [`FeatureVector`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VectorError {
    #[error("cannot build a feature vector without any keypoints")]
    NoKeypoints,
    #[error("invalid feature vector length {0} (expected 3 * K + 1 entries, K >= 1)")]
    InvalidLength(usize),
    #[error("degenerate pose: all keypoint coordinates are identical ({0})")]
    Degenerate(f32),
}

/// A normalized, flattened encoding of one or more poses.
///
/// For `K` keypoints, the layout is `[x0, y0, .., x(K-1), y(K-1), conf0, .., conf(K-1), sum]`.
/// Construction always enforces this layout, so the segment accessors cannot fail.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Box<[f32]>,
}

impl FeatureVector {
    /// Builds a feature vector from all keypoints of `poses`, in order.
    ///
    /// Coordinates are normalized with `(v - max) / (max - min)`, where `max` and `min` are taken
    /// across *all* X and Y values together. Confidence scores are appended unmodified, followed
    /// by their sum.
    ///
    /// If every coordinate has the same value, `max - min` is zero and all coordinates become NaN.
    /// This is not masked: use [`FeatureVector::is_degenerate`] or
    /// [`FeatureVector::check_finite`] to detect it.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::NoKeypoints`] if `poses` contains no keypoints at all.
    pub fn from_poses(poses: &[Pose]) -> Result<Self, VectorError> {
        let keypoints = || poses.iter().flat_map(|pose| pose.keypoints());
        let k = keypoints().count();

        let mut values = Vec::with_capacity(3 * k + 1);
        values.extend(keypoints().flat_map(|kp| [kp.x(), kp.y()]));

        let (min, max) = match values.iter().copied().minmax() {
            MinMaxResult::NoElements => return Err(VectorError::NoKeypoints),
            MinMaxResult::OneElement(v) => (v, v),
            MinMaxResult::MinMax(min, max) => (min, max),
        };
        normalize(&mut values, min, max);

        let mut confidence_sum = 0.0;
        for kp in keypoints() {
            values.push(kp.score());
            confidence_sum += kp.score();
        }
        values.push(confidence_sum);

        Ok(Self {
            values: values.into_boxed_slice(),
        })
    }

    /// Wraps raw, already normalized values.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::InvalidLength`] unless `values` has `3 * K + 1` entries for some
    /// `K >= 1`.
    pub fn from_values(values: impl Into<Vec<f32>>) -> Result<Self, VectorError> {
        let values = values.into();
        if values.len() < 4 || (values.len() - 1) % 3 != 0 {
            return Err(VectorError::InvalidLength(values.len()));
        }
        Ok(Self {
            values: values.into_boxed_slice(),
        })
    }

    /// Number of keypoints `K` encoded in this vector.
    #[inline]
    pub fn keypoint_count(&self) -> usize {
        (self.values.len() - 1) / 3
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false`, since a valid layout has at least 4 entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// The normalized coordinate segment, `2K` entries of interleaved X and Y values.
    #[inline]
    pub fn coords(&self) -> &[f32] {
        &self.values[..2 * self.keypoint_count()]
    }

    /// The per-keypoint confidence segment, `K` entries.
    #[inline]
    pub fn confidences(&self) -> &[f32] {
        let k = self.keypoint_count();
        &self.values[2 * k..3 * k]
    }

    /// The trailing sum of all confidence scores.
    #[inline]
    pub fn confidence_sum(&self) -> f32 {
        self.values[3 * self.keypoint_count()]
    }

    /// Returns `true` if any coordinate is NaN or infinite.
    ///
    /// This happens when all input coordinates were identical (or non-finite to begin with).
    pub fn is_degenerate(&self) -> bool {
        self.coords().iter().any(|v| !v.is_finite())
    }

    /// Turns a degenerate vector into a [`VectorError::Degenerate`] error.
    pub fn check_finite(self) -> Result<Self, VectorError> {
        match self.coords().iter().find(|v| !v.is_finite()) {
            Some(&v) => Err(VectorError::Degenerate(v)),
            None => Ok(self),
        }
    }
}

impl AsRef<[f32]> for FeatureVector {
    fn as_ref(&self) -> &[f32] {
        &self.values
    }
}

/// Maps `max` to 0 and `min` to -1.
fn normalize(coords: &mut [f32], min: f32, max: f32) {
    let range = max - min;
    for v in coords {
        *v = (*v - max) / range;
    }
}
