//! Distance metrics for comparing [`FeatureVector`]s.
//!
//! Both metrics are pure functions and return a *dissimilarity*: 0.0 means the poses match.
//!
//! Division by zero is not masked. It shows up as a NaN or infinite distance, which callers have to
//! check for (see [`Distances::is_finite`]).

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::vector::FeatureVector;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreError {
    #[error("cannot compare feature vectors of different lengths ({left} vs. {right})")]
    LengthMismatch { left: usize, right: usize },
}

fn check_lengths(a: &FeatureVector, b: &FeatureVector) -> Result<(), ScoreError> {
    if a.len() != b.len() {
        return Err(ScoreError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    Ok(())
}

/// Computes the chord distance `sqrt(2 * (1 - s))`, where `s` is the cosine similarity of `a` and
/// `b`.
///
/// All entries take part in the comparison, including confidences and the confidence sum. The
/// result is in range 0.0 to 2.0, and is symmetric in its arguments.
///
/// If either vector is all zeroes, the cosine similarity is undefined and NaN is returned.
///
/// # Errors
///
/// Returns [`ScoreError::LengthMismatch`] if the vectors have different lengths.
pub fn cosine_distance(a: &FeatureVector, b: &FeatureVector) -> Result<f32, ScoreError> {
    check_lengths(a, b)?;

    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (&x, &y) in a.as_slice().iter().zip(b.as_slice()) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    // `clamp` passes NaN through, which is what we want here.
    let similarity = (dot / (norm_a * norm_b).sqrt()).clamp(-1.0, 1.0);
    Ok((2.0 * (1.0 - similarity)).sqrt() as f32)
}

/// Computes the confidence-weighted distance from a `detected` pose to a `reference` pose.
///
/// Every coordinate difference is weighted by the confidence of the corresponding keypoint in
/// `detected`, and the total is divided by the confidence sum of `detected`:
///
/// ```text
/// (1 / detected.sum) * Σ_i detected.conf[i / 2] * |detected.coords[i] - reference.coords[i]|
/// ```
///
/// Only the coordinates of `reference` are used, so this metric is **not** symmetric: the detected
/// pose must always be passed first and the reference second.
///
/// If the confidence sum of `detected` is zero, the result is infinite (or NaN if the weighted sum
/// is zero too).
///
/// # Errors
///
/// Returns [`ScoreError::LengthMismatch`] if the vectors have different lengths.
pub fn weighted_distance(
    detected: &FeatureVector,
    reference: &FeatureVector,
) -> Result<f32, ScoreError> {
    check_lengths(detected, reference)?;

    let confidences = detected.confidences();
    let sum = detected
        .coords()
        .iter()
        .zip(reference.coords())
        .enumerate()
        .map(|(i, (a, b))| confidences[i / 2] * (a - b).abs())
        .sum::<f32>();

    Ok((1.0 / detected.confidence_sum()) * sum)
}

/// Selects one of the distance metrics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Metric {
    #[default]
    Cosine,
    Weighted,
}

impl Metric {
    /// Computes the distance between a `detected` and a `reference` vector with this metric.
    pub fn distance(
        self,
        detected: &FeatureVector,
        reference: &FeatureVector,
    ) -> Result<f32, ScoreError> {
        match self {
            Metric::Cosine => cosine_distance(detected, reference),
            Metric::Weighted => weighted_distance(detected, reference),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Metric::Cosine => "cosine",
            Metric::Weighted => "weighted",
        })
    }
}

/// Both distances between a detected pose and the reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Distances {
    pub cosine: f32,
    pub weighted: f32,
}

impl Distances {
    /// Computes both metrics. `detected` goes first, see [`weighted_distance`].
    pub fn compute(
        detected: &FeatureVector,
        reference: &FeatureVector,
    ) -> Result<Self, ScoreError> {
        Ok(Self {
            cosine: cosine_distance(detected, reference)?,
            weighted: weighted_distance(detected, reference)?,
        })
    }

    pub fn get(&self, metric: Metric) -> f32 {
        match metric {
            Metric::Cosine => self.cosine,
            Metric::Weighted => self.weighted,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.cosine.is_finite() && self.weighted.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    use crate::pose::NUM_KEYPOINTS;
    use crate::test::random_pose;

    use super::*;

    fn vector(values: &[f32]) -> FeatureVector {
        FeatureVector::from_values(values).unwrap()
    }

    #[test]
    fn cosine_self_distance() {
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..100 {
            let v = FeatureVector::from_poses(&[random_pose(&mut rng, NUM_KEYPOINTS)]).unwrap();
            assert_abs_diff_eq!(cosine_distance(&v, &v).unwrap(), 0.0, epsilon = 1e-6);
        }

        let v = vector(&[-1.0, -1.0, 0.0, 0.0, 1.0, 0.5, 1.5]);
        assert_eq!(cosine_distance(&v, &v).unwrap(), 0.0);
    }

    #[test]
    fn cosine_is_symmetric() {
        let mut rng = fastrand::Rng::with_seed(8);
        for _ in 0..100 {
            let a = FeatureVector::from_poses(&[random_pose(&mut rng, NUM_KEYPOINTS)]).unwrap();
            let b = FeatureVector::from_poses(&[random_pose(&mut rng, NUM_KEYPOINTS)]).unwrap();
            let ab = cosine_distance(&a, &b).unwrap();
            let ba = cosine_distance(&b, &a).unwrap();
            assert_eq!(ab, ba);
            assert!((0.0..=2.0).contains(&ab));
        }
    }

    #[test]
    fn cosine_known_values() {
        // Orthogonal -> sqrt(2), opposite -> 2.
        let a = vector(&[1.0, 0.0, 0.0, 0.0]);
        let b = vector(&[0.0, 1.0, 0.0, 0.0]);
        let c = vector(&[-1.0, 0.0, 0.0, 0.0]);
        assert_relative_eq!(cosine_distance(&a, &b).unwrap(), 2.0f32.sqrt());
        assert_relative_eq!(cosine_distance(&a, &c).unwrap(), 2.0);

        // Scaling does not change the angle.
        let d = vector(&[3.0, 0.0, 0.0, 0.0]);
        assert_eq!(cosine_distance(&a, &d).unwrap(), 0.0);
    }

    #[test]
    fn cosine_of_zero_vector_is_nan() {
        let zero = vector(&[0.0; 7]);
        let v = vector(&[-1.0, -1.0, 0.0, 0.0, 1.0, 0.5, 1.5]);
        assert!(cosine_distance(&zero, &v).unwrap().is_nan());
        assert!(cosine_distance(&v, &zero).unwrap().is_nan());
    }

    #[test]
    fn weighted_known_value() {
        let detected = vector(&[-1.0, -1.0, 0.0, 0.0, 1.0, 0.5, 1.5]);
        let reference = vector(&[-0.5, -1.0, 0.0, -0.5, 0.25, 0.25, 0.5]);
        // (1.0 * 0.5 + 1.0 * 0.0 + 0.5 * 0.0 + 0.5 * 0.5) / 1.5
        assert_relative_eq!(weighted_distance(&detected, &reference).unwrap(), 0.5);
        assert_eq!(weighted_distance(&detected, &detected).unwrap(), 0.0);
    }

    #[test]
    fn weighted_is_asymmetric() {
        // Same coordinate offset, but `g` has twice the confidence sum of `h`.
        let g = vector(&[-1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 4.0]);
        let h = vector(&[0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 2.0]);
        let gh = weighted_distance(&g, &h).unwrap();
        let hg = weighted_distance(&h, &g).unwrap();
        assert_relative_eq!(gh, 0.25);
        assert_relative_eq!(hg, 0.5);
        assert_ne!(gh, hg);

        // Only the detected pose's confidences weight the offsets.
        let e = vector(&[-1.0, 0.0, 0.0, 0.0, 0.9, 0.1, 1.0]);
        let f = vector(&[0.0, 0.0, 0.0, -1.0, 0.1, 0.9, 1.0]);
        assert_relative_eq!(weighted_distance(&e, &f).unwrap(), 1.0);
        assert_relative_eq!(weighted_distance(&f, &e).unwrap(), 1.0);
        let f = vector(&[0.0, 0.0, 0.0, 0.0, 0.1, 0.9, 1.0]);
        assert_relative_eq!(weighted_distance(&e, &f).unwrap(), 0.9);
        assert_relative_eq!(weighted_distance(&f, &e).unwrap(), 0.1);
    }

    #[test]
    fn weighted_zero_confidence_sum() {
        let detected = vector(&[-1.0, 0.0, 0.0, 0.0, 1.0, -1.0, 0.0]);
        let reference = vector(&[0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 2.0]);
        assert_eq!(
            weighted_distance(&detected, &reference).unwrap(),
            f32::INFINITY
        );

        let detected = vector(&[-1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert!(weighted_distance(&detected, &reference).unwrap().is_nan());
    }

    #[test]
    fn length_mismatch() {
        let a = vector(&[0.0; 7]);
        let b = vector(&[0.0; 52]);
        let err = ScoreError::LengthMismatch { left: 7, right: 52 };
        assert_eq!(cosine_distance(&a, &b), Err(err.clone()));
        assert_eq!(weighted_distance(&a, &b), Err(err.clone()));
        assert_eq!(Metric::Weighted.distance(&a, &b), Err(err.clone()));
        assert_eq!(Distances::compute(&a, &b), Err(err));
    }

    #[test]
    fn metric_selection() {
        let a = vector(&[-1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 4.0]);
        let b = vector(&[0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 2.0]);
        let both = Distances::compute(&a, &b).unwrap();
        assert_eq!(Metric::Cosine.distance(&a, &b).unwrap(), both.cosine);
        assert_eq!(Metric::Weighted.distance(&a, &b).unwrap(), both.weighted);
        assert_eq!(both.get(Metric::Weighted), both.weighted);
        assert!(both.is_finite());
    }
}
