//! Moving average variants.

use std::collections::VecDeque;

use super::Filter;

/// Moving Average over a fixed history of values (FIR filter).
///
/// All values are weighted equally.
#[derive(Debug, Clone)]
pub struct MovingAvg {
    history: VecDeque<f32>,
    /// Max. number of values to keep in the history.
    history_size: usize,
    /// Running sum of `history`.
    sum: f32,
}

impl MovingAvg {
    /// Creates a new moving average calculator that averages the last `history_size` values.
    ///
    /// # Panics
    ///
    /// Panics if `history_size` is 0.
    pub fn new(history_size: usize) -> Self {
        assert!(history_size > 0, "moving average needs a history of at least 1");
        Self {
            history: VecDeque::with_capacity(history_size),
            history_size,
            sum: 0.0,
        }
    }
}

impl Filter<f32> for MovingAvg {
    fn push(&mut self, value: f32) -> f32 {
        self.history.push_back(value);
        self.sum += value;

        if self.history.len() > self.history_size {
            if let Some(old) = self.history.pop_front() {
                self.sum -= old;
            }
        }

        self.sum / self.history.len() as f32
    }

    fn reset(&mut self) {
        self.history.clear();
        self.sum = 0.0;
    }
}

/// Exponential Moving Average – a weighted moving average whose weight decreases exponentially.
///
/// This is a tunable IIR filter.
#[derive(Debug, Clone)]
pub struct Ema {
    alpha: f32,
    last: Option<f32>,
}

impl Ema {
    /// Creates a new Exponential Moving Average calculator.
    ///
    /// The `alpha` parameter must be between 0.0 and 1.0 and defines how quickly the weight of
    /// older values should decay. Values close to 1.0 very strongly favor recent values over older
    /// values, while values closer to 0.0 favor more recent values less strongly.
    ///
    /// # Panics
    ///
    /// Panics if `alpha` is not in between 0.0 and 1.0.
    pub fn new(alpha: f32) -> Self {
        assert!((0.0..=1.0).contains(&alpha), "invalid EMA alpha {alpha}");
        Self { alpha, last: None }
    }
}

impl Filter<f32> for Ema {
    fn push(&mut self, value: f32) -> f32 {
        match self.last {
            Some(last) => {
                let avg = self.alpha * value + (1.0 - self.alpha) * last;
                self.last = Some(avg);
                avg
            }
            None => {
                self.last = Some(value);
                value
            }
        }
    }

    fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moving_avg() {
        let mut moving_avg = MovingAvg::new(2);
        assert_eq!(moving_avg.push(1.0), 1.0);
        assert_eq!(moving_avg.push(1.0), 1.0);
        assert_eq!(moving_avg.push(0.0), 0.5);
        assert_eq!(moving_avg.push(0.0), 0.0);
    }

    #[test]
    fn test_ema() {
        let mut ema = Ema::new(0.5);
        assert_eq!(ema.push(1.0), 1.0);
        assert_eq!(ema.push(2.0), 1.5);
        assert_eq!(ema.push(2.0), 1.75);
        ema.reset();
        assert_eq!(ema.push(0.25), 0.25);
    }

    #[test]
    #[should_panic]
    fn ema_alpha_out_of_range() {
        Ema::new(1.5);
    }
}
