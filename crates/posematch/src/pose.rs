//! Body poses as produced by a 2D pose estimator.
//!
//! The types in this module deserialize directly from the JSON output of PoseNet-style
//! estimators:
//!
//! ```json
//! { "score": 0.93, "keypoints": [ { "score": 0.99, "part": "nose", "position": { "x": 251.3, "y": 98.1 } } ] }
//! ```

use serde::{Deserialize, Serialize};

/// Number of keypoints PoseNet outputs per pose.
pub const NUM_KEYPOINTS: usize = 17;

/// 2D position of a [`Keypoint`], in whatever units the estimator produces.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

/// A detected anatomical landmark with a confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    position: Position,
    score: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    part: Option<Part>,
}

impl Keypoint {
    pub fn new(x: f32, y: f32, score: f32) -> Self {
        Self {
            position: Position { x, y },
            score,
            part: None,
        }
    }

    pub fn with_part(self, part: Part) -> Self {
        Self {
            part: Some(part),
            ..self
        }
    }

    #[inline]
    pub fn position(&self) -> Position {
        self.position
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.position.x
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.position.y
    }

    /// Confidence of this keypoint, by convention in range 0.0 to 1.0.
    #[inline]
    pub fn score(&self) -> f32 {
        self.score
    }

    #[inline]
    pub fn part(&self) -> Option<Part> {
        self.part
    }
}

/// The keypoints of one detected person in one frame, plus an overall pose score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    score: f32,
    keypoints: Vec<Keypoint>,
}

impl Pose {
    pub fn new(score: f32, keypoints: impl IntoIterator<Item = Keypoint>) -> Self {
        Self {
            score,
            keypoints: keypoints.into_iter().collect(),
        }
    }

    /// Overall confidence of the pose.
    #[inline]
    pub fn score(&self) -> f32 {
        self.score
    }

    #[inline]
    pub fn keypoints(&self) -> &[Keypoint] {
        &self.keypoints
    }

    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }

    /// Looks up a keypoint by its part name.
    ///
    /// Keypoints without a part name are assumed to be in PoseNet order (see [`Part`]).
    pub fn get(&self, part: Part) -> Option<&Keypoint> {
        self.keypoints
            .iter()
            .find(|kp| kp.part == Some(part))
            .or_else(|| {
                self.keypoints
                    .get(part as usize)
                    .filter(|kp| kp.part.is_none())
            })
    }

    /// Returns whether the overall pose score reaches `min_pose_confidence`.
    pub fn is_confident(&self, min_pose_confidence: f32) -> bool {
        self.score >= min_pose_confidence
    }
}

/// PoseNet body parts, in the order the network outputs them.
///
/// "Left" and "Right" are from the PoV of the depicted person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Part {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

impl Part {
    pub const ALL: [Part; NUM_KEYPOINTS] = {
        use Part::*;
        [
            Nose,
            LeftEye,
            RightEye,
            LeftEar,
            RightEar,
            LeftShoulder,
            RightShoulder,
            LeftElbow,
            RightElbow,
            LeftWrist,
            RightWrist,
            LeftHip,
            RightHip,
            LeftKnee,
            RightKnee,
            LeftAnkle,
            RightAnkle,
        ]
    };
}
