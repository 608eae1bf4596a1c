//! Pose feature vectors and similarity scoring.
//!
//! This library consumes the output of a 2D body pose estimator (such as PoseNet), turns the
//! detected [`Pose`]s into a flat [`FeatureVector`], and compares that vector against a fixed
//! [`ReferenceVector`] using one of two distance metrics.
//!
//! # Feature Vector Layout
//!
//! A feature vector built from `K` keypoints always has `3K + 1` entries:
//!
//! ```text
//! [x0, y0, x1, y1, ..., x(K-1), y(K-1), conf0, ..., conf(K-1), confidence_sum]
//! ```
//!
//! The coordinate segment is normalized with a *single* minimum and maximum taken across all X and
//! Y values, using `(v - max) / (max - min)`. Note that this maps the maximum to 0 and the minimum
//! to -1, which is not the usual min-max normalization. Reference vectors have been recorded with
//! this exact formula, so it must not be changed.
//!
//! # Environment Variables
//!
//! * `RUST_LOG`: Overrides the log filter installed by [`init_logger!`].
//!
//! [`Pose`]: pose::Pose
//! [`FeatureVector`]: vector::FeatureVector
//! [`ReferenceVector`]: reference::ReferenceVector

use log::LevelFilter;

pub mod config;
pub mod filter;
pub mod matcher;
pub mod num;
pub mod pose;
pub mod reference;
pub mod session;
pub mod similarity;
pub mod tier;
pub mod timer;
pub mod vector;

#[cfg(test)]
mod test;

/// macro-use only, not part of public API.
#[doc(hidden)]
pub fn init_logger(calling_crate: &'static str) {
    let log_level = if cfg!(debug_assertions) {
        LevelFilter::Trace
    } else {
        LevelFilter::Debug
    };
    env_logger::Builder::new()
        .filter(Some(calling_crate), log_level)
        .filter(Some(env!("CARGO_CRATE_NAME")), log_level)
        .parse_default_env()
        .try_init()
        .ok();
}

/// Initializes logging to *stderr*.
///
/// If `cfg!(debug_assertions)` is enabled, the calling crate and this library will log at *trace*
/// level. Otherwise, they will log at *debug* level.
///
/// If a global logger is already registered, this macro will do nothing.
#[macro_export]
macro_rules! init_logger {
    () => {
        $crate::init_logger(env!("CARGO_CRATE_NAME"))
    };
}
