//! The baseline pose that detected poses are compared against.
//!
//! [`ReferenceVector::builtin`] returns a recorded 17-keypoint PoseNet reference pose. A different
//! reference can be loaded from a JSON array of floats with [`ReferenceVector::load`], or recorded
//! from detector output with [`ReferenceVector::from_poses`].

use std::{fs, ops::Deref, path::Path};

use anyhow::Context;
use once_cell::sync::Lazy;

use crate::pose::{Pose, NUM_KEYPOINTS};
use crate::vector::{FeatureVector, VectorError};

/// An immutable [`FeatureVector`] used as the comparison baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceVector {
    vector: FeatureVector,
}

impl ReferenceVector {
    /// Returns the built-in reference pose (17 keypoints, 52 values).
    pub fn builtin() -> &'static ReferenceVector {
        static BUILTIN: Lazy<ReferenceVector> = Lazy::new(|| {
            debug_assert_eq!(BUILTIN_VALUES.len(), 3 * NUM_KEYPOINTS + 1);
            ReferenceVector {
                vector: FeatureVector::from_values(BUILTIN_VALUES).unwrap(),
            }
        });

        &BUILTIN
    }

    /// Creates a reference from raw feature vector values.
    pub fn from_values(values: impl Into<Vec<f32>>) -> Result<Self, VectorError> {
        FeatureVector::from_values(values).map(Self::new)
    }

    /// Records a reference from detected poses.
    ///
    /// Degenerate poses are rejected, since every distance against them would be NaN.
    pub fn from_poses(poses: &[Pose]) -> Result<Self, VectorError> {
        let vector = FeatureVector::from_poses(poses)?.check_finite()?;
        Ok(Self::new(vector))
    }

    /// Loads a reference from a JSON file containing a flat array of numbers.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Self::load_impl(path.as_ref())
    }

    fn load_impl(path: &Path) -> anyhow::Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read reference vector from {}", path.display()))?;
        let values: Vec<f32> = serde_json::from_str(&json)
            .with_context(|| format!("{} is not a JSON array of numbers", path.display()))?;
        let reference = Self::from_values(values)
            .with_context(|| format!("invalid reference vector in {}", path.display()))?;
        log::info!(
            "loaded reference vector with {} keypoints from {}",
            reference.keypoint_count(),
            path.display(),
        );
        Ok(reference)
    }

    fn new(vector: FeatureVector) -> Self {
        Self { vector }
    }

    #[inline]
    pub fn vector(&self) -> &FeatureVector {
        &self.vector
    }
}

impl Deref for ReferenceVector {
    type Target = FeatureVector;

    fn deref(&self) -> &FeatureVector {
        &self.vector
    }
}

impl Default for ReferenceVector {
    fn default() -> Self {
        Self::builtin().clone()
    }
}

#[rustfmt::skip]
const BUILTIN_VALUES: &[f32] = &[
    // normalized coordinates
    -0.6005329, -0.95988798, -0.57951173, -0.99191673, -0.64091824, -1.0,
    -0.55570164, -0.97588875, -0.66957688, -0.95847919, -0.47063404, -0.83517675,
    -0.71844806, -0.83279533, -0.40617335, -0.64402258, -0.75991853, -0.66462379,
    -0.38394813, -0.49565975, -0.79132717, -0.55802972, -0.51219858, -0.48932954,
    -0.65609639, -0.48505491, -0.52550696, -0.25623461, -0.6221485, -0.25533708,
    -0.49900063, -0.02926444, -0.6085204, 0.0,
    // confidences
    0.99122542, 0.97892076, 0.9861182, 0.78686029, 0.7944119, 0.99782538,
    0.99792498, 0.99420774, 0.9878456, 0.99152875, 0.96837181, 0.99826914,
    0.99934393, 0.99790907, 0.99739105, 0.96918219, 0.977126,
    // confidence sum
    16.41446221,
];

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use crate::pose::Keypoint;
    use crate::test::two_keypoint_pose;

    use super::*;

    #[test]
    fn builtin_layout() {
        let reference = ReferenceVector::builtin();
        assert_eq!(reference.len(), 52);
        assert_eq!(reference.keypoint_count(), NUM_KEYPOINTS);
        assert!(!reference.is_degenerate());

        // Recorded with `(v - max) / (max - min)`, so the coordinates span exactly -1..=0.
        let coords = reference.coords();
        assert_eq!(coords.iter().copied().fold(f32::MAX, f32::min), -1.0);
        assert_eq!(coords.iter().copied().fold(f32::MIN, f32::max), 0.0);

        let sum = reference.confidences().iter().sum::<f32>();
        assert_relative_eq!(sum, reference.confidence_sum(), max_relative = 1e-5);
    }

    #[test]
    fn from_poses_rejects_degenerate() {
        let reference = ReferenceVector::from_poses(&[two_keypoint_pose()]).unwrap();
        assert_eq!(reference.confidence_sum(), 1.5);

        let flat = Pose::new(1.0, [Keypoint::new(1.0, 1.0, 1.0)]);
        assert!(matches!(
            ReferenceVector::from_poses(&[flat]),
            Err(VectorError::Degenerate(_))
        ));
    }

    #[test]
    fn load_from_json() {
        let path = std::env::temp_dir().join(format!("posematch-ref-{}.json", std::process::id()));
        fs::write(&path, "[-1, -1, 0, 0, 1.0, 0.5, 1.5]").unwrap();
        let reference = ReferenceVector::load(&path).unwrap();
        assert_eq!(reference.as_slice(), &[-1.0, -1.0, 0.0, 0.0, 1.0, 0.5, 1.5]);

        fs::write(&path, "[1, 2]").unwrap();
        let err = ReferenceVector::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("invalid feature vector length 2"));

        fs::write(&path, "{}").unwrap();
        assert!(ReferenceVector::load(&path).is_err());

        fs::remove_file(&path).unwrap();
        assert!(ReferenceVector::load(&path).is_err());
    }
}
