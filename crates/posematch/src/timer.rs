//! Timing of the scoring pipeline.

use std::{
    fmt,
    sync::Mutex,
    time::{Duration, Instant},
};

use itertools::Itertools;

use crate::filter::{Ema, Filter};

const EMA_ALPHA: f32 = 0.3;

/// How often [`FrameRate`] logs a report.
const REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// Measures how long a pipeline step takes, averaged with an exponential moving average.
///
/// Displaying the timer with `{}` prints the average and the number of measurements since it was
/// last displayed, then starts over.
pub struct Timer {
    name: &'static str,
    stats: Mutex<Stats>,
}

#[derive(Debug)]
struct Stats {
    ema: Ema,
    avg_secs: f32,
    samples: usize,
}

impl Stats {
    fn new() -> Self {
        Self {
            ema: Ema::new(EMA_ALPHA),
            avg_secs: 0.0,
            samples: 0,
        }
    }

    fn record(&mut self, elapsed: Duration) {
        self.avg_secs = self.ema.push(elapsed.as_secs_f32());
        self.samples += 1;
    }

    /// Returns the sample count and average, and clears both.
    fn take(&mut self) -> (usize, f32) {
        let taken = (self.samples, self.avg_secs);
        *self = Self::new();
        taken
    }
}

impl Timer {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            stats: Mutex::new(Stats::new()),
        }
    }

    /// Runs `step`, recording how long it takes.
    pub fn time<T>(&self, step: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let result = step();
        self.record(start.elapsed());
        result
    }

    fn record(&self, elapsed: Duration) {
        // A poisoned lock only means another measurement panicked; the averages are still usable.
        self.stats
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .record(elapsed);
    }
}

impl fmt::Display for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (samples, avg_secs) = self.stats.lock().unwrap_or_else(|e| e.into_inner()).take();
        write!(f, "{} {samples}x{:.01}ms", self.name, avg_secs * 1000.0)
    }
}

/// Frames handled by a [`FrameRate`] during one report interval.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameCounts {
    pub scored: u32,
    pub skipped: u32,
}

impl FrameCounts {
    pub fn total(&self) -> u32 {
        self.scored + self.skipped
    }
}

/// Logs how many frames per second a session handles, split into scored and skipped frames.
pub struct FrameRate {
    name: String,
    counts: FrameCounts,
    since: Instant,
}

impl FrameRate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            counts: FrameCounts::default(),
            since: Instant::now(),
        }
    }

    /// Counts one frame, and logs the frame rate with the given step timers once per second.
    pub fn tick<'a>(&mut self, scored: bool, timers: impl IntoIterator<Item = &'a Timer>) {
        if let Some(counts) = self.count(scored, Instant::now()) {
            log::debug!(
                "{}: {} FPS ({} scored, {} skipped) [{}]",
                self.name,
                counts.total(),
                counts.scored,
                counts.skipped,
                timers.into_iter().format(", "),
            );
        }
    }

    /// Counts one frame. Returns the counts of the finished interval once `now` is past it.
    fn count(&mut self, scored: bool, now: Instant) -> Option<FrameCounts> {
        if scored {
            self.counts.scored += 1;
        } else {
            self.counts.skipped += 1;
        }

        if now.duration_since(self.since) < REPORT_INTERVAL {
            return None;
        }
        self.since = now;
        Some(std::mem::take(&mut self.counts))
    }
}
