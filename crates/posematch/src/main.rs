//! Scores recorded pose estimator output against a reference pose.
//!
//! ```text
//! posematch <frames.json | frames.jsonl> [config.toml]
//! posematch tier <score>
//! ```
//!
//! `frames.json` contains an array of frames, `frames.jsonl` one frame per line. Each frame is an
//! array of PoseNet poses.

use std::{
    env,
    ffi::OsString,
    fs,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};

use anyhow::{bail, Context};
use posematch::{
    config::Config,
    matcher::Outcome,
    session::{Frame, Session},
    tier::ResultTier,
};

fn main() -> anyhow::Result<()> {
    posematch::init_logger!();

    let mut args = env::args_os().skip(1);
    let Some(first) = args.next() else {
        bail!("usage: posematch <frames.json> [config.toml] | posematch tier <score>");
    };

    if first == "tier" {
        let score = args.next().context("missing score")?;
        return print_tier(score);
    }

    let frames_path = PathBuf::from(first);
    let config = match args.next() {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let mut session = Session::new(&config)?;
    log::info!(
        "scoring {} against a {}-keypoint reference ({} metric)",
        frames_path.display(),
        session.matcher().reference().keypoint_count(),
        config.scoring.metric,
    );

    let frames = read_frames(&frames_path)?;
    let summary = session.run(frames, |score| match &score.outcome {
        Outcome::Matched(m) => {
            let d = m.distances();
            print!(
                "frame {}: cosine={:.4} weighted={:.4}",
                score.index, d.cosine, d.weighted
            );
            match score.smoothed {
                Some(smoothed) => println!(" smoothed={smoothed:.4}"),
                None => println!(),
            }
        }
        Outcome::Skipped(skip) => println!("frame {}: skipped ({skip:?})", score.index),
    })?;

    println!("{summary}");
    Ok(())
}

fn print_tier(score: OsString) -> anyhow::Result<()> {
    let score = score
        .to_str()
        .and_then(|s| s.parse::<f32>().ok())
        .with_context(|| format!("invalid score {score:?}"))?;
    let tier = ResultTier::from_score(score);
    println!("{tier}: {}", tier.video_path());
    Ok(())
}

fn read_frames(path: &Path) -> anyhow::Result<Box<dyn Iterator<Item = anyhow::Result<Frame>>>> {
    let open = || {
        fs::File::open(path).with_context(|| format!("failed to open {}", path.display()))
    };

    if path.extension().map_or(false, |ext| ext == "jsonl") {
        let reader = BufReader::new(open()?);
        Ok(Box::new(
            reader
                .lines()
                .enumerate()
                .filter(|(_, line)| !matches!(line, Ok(l) if l.trim().is_empty()))
                .map(|(i, line)| parse_line(i + 1, line)),
        ))
    } else {
        let frames: Vec<Frame> = serde_json::from_reader(BufReader::new(open()?))
            .with_context(|| format!("failed to parse frames from {}", path.display()))?;
        Ok(Box::new(frames.into_iter().map(Ok)))
    }
}

fn parse_line(line_no: usize, line: io::Result<String>) -> anyhow::Result<Frame> {
    let line = line?;
    serde_json::from_str(&line).with_context(|| format!("invalid frame on line {line_no}"))
}
