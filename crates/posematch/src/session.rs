//! Frame loop driving a [`PoseMatcher`].
//!
//! A [`Session`] is the explicit-configuration host for per-frame scoring: it pulls frames of
//! detected poses from any iterator (a live detector, or recorded output), matches each of them
//! against the reference, smooths the selected metric, and keeps a running [`Summary`].

use std::fmt;

use anyhow::Context;

use crate::config::Config;
use crate::filter::Filter;
use crate::matcher::{Outcome, PoseMatcher};
use crate::pose::Pose;
use crate::reference::ReferenceVector;
use crate::similarity::Metric;
use crate::timer::FrameRate;

/// The poses detected in one frame.
pub type Frame = Vec<Pose>;

/// Per-frame result reported by [`Session::process`].
#[derive(Debug, Clone, PartialEq)]
pub struct FrameScore {
    /// Zero-based index of the frame within the session.
    pub index: usize,
    pub outcome: Outcome,
    /// The smoothed distance of the configured [`Metric`], if the frame produced a finite one.
    pub smoothed: Option<f32>,
}

/// Running statistics of a [`Session`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Summary {
    pub frames: usize,
    pub matched: usize,
    pub skipped: usize,
    /// Matched frames whose pose score is below `min_pose_confidence`.
    pub low_confidence: usize,
    /// Matched frames whose distances were NaN or infinite. These are not part of the means.
    pub non_finite: usize,
    cosine_sum: f64,
    weighted_sum: f64,
}

impl Summary {
    fn finite(&self) -> usize {
        self.matched - self.non_finite
    }

    /// Mean cosine distance over all finite matches.
    pub fn mean_cosine(&self) -> Option<f32> {
        (self.finite() > 0).then(|| (self.cosine_sum / self.finite() as f64) as f32)
    }

    /// Mean weighted distance over all finite matches.
    pub fn mean_weighted(&self) -> Option<f32> {
        (self.finite() > 0).then(|| (self.weighted_sum / self.finite() as f64) as f32)
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} frames, {} matched ({} low confidence), {} skipped, {} non-finite",
            self.frames, self.matched, self.low_confidence, self.skipped, self.non_finite
        )?;
        if let (Some(cosine), Some(weighted)) = (self.mean_cosine(), self.mean_weighted()) {
            write!(f, "; mean cosine={cosine:.4} weighted={weighted:.4}")?;
        }
        Ok(())
    }
}

pub struct Session {
    matcher: PoseMatcher,
    metric: Metric,
    filter: Box<dyn Filter<f32> + Send>,
    log_distances: bool,
    rate: FrameRate,
    summary: Summary,
}

impl Session {
    /// Creates a session from `config`, loading the configured reference vector.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let reference = config
            .scoring
            .load_reference()
            .context("failed to load reference vector")?;
        Ok(Self::with_reference(config, reference))
    }

    /// Creates a session from `config` that compares against `reference`.
    ///
    /// `config.scoring.reference` is ignored.
    pub fn with_reference(config: &Config, reference: ReferenceVector) -> Self {
        Self {
            matcher: PoseMatcher::with_config(reference, &config.detection),
            metric: config.scoring.metric,
            filter: config.scoring.score_filter(),
            log_distances: config.output.log_distances,
            rate: FrameRate::new("posematch"),
            summary: Summary::default(),
        }
    }

    pub fn matcher(&self) -> &PoseMatcher {
        &self.matcher
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    /// Clears the summary and the smoothing filter's history.
    pub fn reset(&mut self) {
        self.summary = Summary::default();
        self.filter.reset();
    }

    /// Scores a single frame.
    pub fn process(&mut self, poses: &[Pose]) -> anyhow::Result<FrameScore> {
        let index = self.summary.frames;
        let outcome = self
            .matcher
            .match_poses(poses)
            .with_context(|| format!("failed to score frame {index}"))?;
        self.summary.frames += 1;

        let mut smoothed = None;
        match &outcome {
            Outcome::Matched(m) => {
                self.summary.matched += 1;
                if !m.is_confident() {
                    self.summary.low_confidence += 1;
                }
                let distances = m.distances();
                if self.log_distances {
                    log::debug!("weighted: {}", distances.weighted);
                    log::debug!("cosine: {}", distances.cosine);
                }

                if distances.is_finite() {
                    self.summary.cosine_sum += f64::from(distances.cosine);
                    self.summary.weighted_sum += f64::from(distances.weighted);
                    smoothed = Some(self.filter.push(distances.get(self.metric)));
                } else {
                    log::warn!("frame {index}: non-finite distances {distances:?}");
                    self.summary.non_finite += 1;
                }
            }
            Outcome::Skipped(skip) => {
                log::trace!("frame {index} skipped: {skip:?}");
                self.summary.skipped += 1;
            }
        }

        let scored = matches!(outcome, Outcome::Matched(_));
        self.rate.tick(scored, self.matcher.timers());

        Ok(FrameScore {
            index,
            outcome,
            smoothed,
        })
    }

    /// Processes every frame of `frames`, invoking `on_frame` with each result.
    ///
    /// Stops at the first error, either from the frame source or from scoring.
    pub fn run<I, F>(&mut self, frames: I, mut on_frame: F) -> anyhow::Result<&Summary>
    where
        I: IntoIterator<Item = anyhow::Result<Frame>>,
        F: FnMut(&FrameScore),
    {
        for frame in frames {
            let frame = frame.context("failed to read frame")?;
            let score = self.process(&frame)?;
            on_frame(&score);
        }

        log::debug!("session finished: {}", self.summary);
        Ok(&self.summary)
    }
}
