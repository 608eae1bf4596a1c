use crate::pose::{Keypoint, Pose};

/// `[(0, 0, 1.0), (10, 10, 0.5)]`, whose feature vector is `[-1, -1, 0, 0, 1.0, 0.5, 1.5]`.
pub fn two_keypoint_pose() -> Pose {
    Pose::new(
        0.75,
        [Keypoint::new(0.0, 0.0, 1.0), Keypoint::new(10.0, 10.0, 0.5)],
    )
}

/// A pose with `len` keypoints scattered over a 500x416 frame.
pub fn random_pose(rng: &mut fastrand::Rng, len: usize) -> Pose {
    Pose::new(
        rng.f32(),
        (0..len).map(|_| Keypoint::new(rng.f32() * 500.0, rng.f32() * 416.0, rng.f32())),
    )
}
