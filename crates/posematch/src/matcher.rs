//! Per-frame matching of detected poses against a reference.

use std::slice;

use thiserror::Error;

use crate::config::DetectionConfig;
use crate::num::TotalF32;
use crate::pose::Pose;
use crate::reference::ReferenceVector;
use crate::similarity::{Distances, ScoreError};
use crate::timer::Timer;
use crate::vector::{FeatureVector, VectorError};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    #[error(transparent)]
    Vector(#[from] VectorError),
    #[error(transparent)]
    Score(#[from] ScoreError),
}

/// Why a frame was not scored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Skip {
    /// The frame contains no poses.
    NoPose,
    /// All keypoint coordinates are identical, so the feature vector is NaN.
    Degenerate,
}

/// The result of matching one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Matched(PoseMatch),
    Skipped(Skip),
}

/// A scored frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseMatch {
    pose_score: f32,
    confident: bool,
    vector: FeatureVector,
    distances: Distances,
}

impl PoseMatch {
    /// Overall score of the matched pose.
    pub fn pose_score(&self) -> f32 {
        self.pose_score
    }

    /// Whether the pose score reaches the matcher's minimum pose confidence.
    ///
    /// Low-confidence poses are still scored, but their distances are less trustworthy.
    pub fn is_confident(&self) -> bool {
        self.confident
    }

    /// The feature vector that was compared against the reference.
    pub fn vector(&self) -> &FeatureVector {
        &self.vector
    }

    /// Distances to the reference.
    ///
    /// These can still be NaN or infinite, for example when all keypoint confidences are zero.
    pub fn distances(&self) -> Distances {
        self.distances
    }
}

/// Turns the most confident pose of a frame into a feature vector and scores it against a
/// reference.
///
/// The reference is fixed for the lifetime of the matcher.
pub struct PoseMatcher {
    reference: ReferenceVector,
    min_pose_confidence: f32,
    t_vectorize: Timer,
    t_score: Timer,
}

impl PoseMatcher {
    /// Creates a matcher that considers every pose confident.
    pub fn new(reference: ReferenceVector) -> Self {
        Self {
            reference,
            min_pose_confidence: 0.0,
            t_vectorize: Timer::new("vectorize"),
            t_score: Timer::new("score"),
        }
    }

    pub fn with_config(reference: ReferenceVector, config: &DetectionConfig) -> Self {
        let mut this = Self::new(reference);
        this.set_min_pose_confidence(config.min_pose_confidence);
        this
    }

    /// Sets the overall pose score below which matches are flagged as not confident.
    pub fn set_min_pose_confidence(&mut self, min_pose_confidence: f32) {
        self.min_pose_confidence = min_pose_confidence;
    }

    pub fn reference(&self) -> &ReferenceVector {
        &self.reference
    }

    /// Returns profiling timers for the vectorization and scoring steps.
    pub fn timers(&self) -> impl Iterator<Item = &Timer> + '_ {
        [&self.t_vectorize, &self.t_score].into_iter()
    }

    /// Matches the most confident pose detected in one frame against the reference.
    ///
    /// # Errors
    ///
    /// Fails if the pose has no keypoints, or if its feature vector does not have the same layout
    /// as the reference.
    pub fn match_poses(&self, poses: &[Pose]) -> Result<Outcome, MatchError> {
        let Some(best) = poses.iter().max_by_key(|pose| TotalF32(pose.score())) else {
            return Ok(Outcome::Skipped(Skip::NoPose));
        };

        let vector = self
            .t_vectorize
            .time(|| FeatureVector::from_poses(slice::from_ref(best)))?;
        if vector.is_degenerate() {
            log::warn!("all keypoints of the detected pose coincide, skipping frame");
            return Ok(Outcome::Skipped(Skip::Degenerate));
        }

        let distances = self
            .t_score
            .time(|| Distances::compute(&vector, &self.reference))?;

        let confident = best.is_confident(self.min_pose_confidence);
        if !confident {
            log::trace!(
                "pose score {} is below {}",
                best.score(),
                self.min_pose_confidence,
            );
        }

        Ok(Outcome::Matched(PoseMatch {
            pose_score: best.score(),
            confident,
            vector,
            distances,
        }))
    }
}
