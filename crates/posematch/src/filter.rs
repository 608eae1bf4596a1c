//! Smoothing of per-frame scores.
//!
//! Distances computed on consecutive frames of a live feed jitter quite a bit, since the pose
//! estimator's keypoints do. These filters can be applied to the stream of distances to get a more
//! stable value for display.

mod moving;

use serde::{Deserialize, Serialize};

pub use moving::{Ema, MovingAvg};

/// A filter for values of type `V`.
pub trait Filter<V> {
    /// Adds a new value to the filter, returning the filtered value.
    fn push(&mut self, value: V) -> V;

    /// Resets the accumulated history and state of the filter to be identical to the state just
    /// after construction.
    fn reset(&mut self);
}

impl<V> Filter<V> for Box<dyn Filter<V> + Send> {
    fn push(&mut self, value: V) -> V {
        (**self).push(value)
    }

    fn reset(&mut self) {
        (**self).reset();
    }
}

/// A filter that passes all values through unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct Passthrough;

impl<V> Filter<V> for Passthrough {
    fn push(&mut self, value: V) -> V {
        value
    }

    fn reset(&mut self) {}
}

/// Configurable choice of score filter.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Smoothing {
    #[default]
    None,
    Ema,
    MovingAverage,
}

impl Smoothing {
    /// Creates the selected filter.
    ///
    /// `ema_alpha` is only used by [`Smoothing::Ema`], `history_len` only by
    /// [`Smoothing::MovingAverage`].
    ///
    /// # Panics
    ///
    /// Panics if the parameter used by the selected filter is out of range (see [`Ema::new`] and
    /// [`MovingAvg::new`]).
    pub fn build(self, ema_alpha: f32, history_len: usize) -> Box<dyn Filter<f32> + Send> {
        match self {
            Smoothing::None => Box::new(Passthrough),
            Smoothing::Ema => Box::new(Ema::new(ema_alpha)),
            Smoothing::MovingAverage => Box::new(MovingAvg::new(history_len)),
        }
    }
}
