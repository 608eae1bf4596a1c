//! Selection of the result clip shown for a final score.

use std::fmt;

/// One of the five result clips, chosen by a final score in range 0 to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResultTier {
    EndingBelow40,
    Ending40To60,
    Ending60To80,
    Ending80To90,
    Above90,
}

impl ResultTier {
    /// All tiers, from worst to best.
    pub const ALL: [ResultTier; 5] = [
        ResultTier::EndingBelow40,
        ResultTier::Ending40To60,
        ResultTier::Ending60To80,
        ResultTier::Ending80To90,
        ResultTier::Above90,
    ];

    /// Picks the tier for `score`.
    ///
    /// Only the top tier uses a strict comparison: 90 is still [`ResultTier::Ending80To90`], while
    /// 80, 60 and 40 already belong to the tier above them. NaN ends up in the lowest tier.
    pub fn from_score(score: f32) -> Self {
        if score > 90.0 {
            ResultTier::Above90
        } else if score >= 80.0 {
            ResultTier::Ending80To90
        } else if score >= 60.0 {
            ResultTier::Ending60To80
        } else if score >= 40.0 {
            ResultTier::Ending40To60
        } else {
            ResultTier::EndingBelow40
        }
    }

    /// Name of the clip, without extension.
    pub fn clip_name(self) -> &'static str {
        match self {
            ResultTier::Above90 => "Above 90",
            ResultTier::Ending80To90 => "Ending80to90",
            ResultTier::Ending60To80 => "Ending60to80",
            ResultTier::Ending40To60 => "Ending40to60",
            ResultTier::EndingBelow40 => "EndingBelow40",
        }
    }

    /// Path of the clip relative to the results directory.
    pub fn video_path(self) -> String {
        format!("videos/{}.mp4", self.clip_name())
    }
}

impl fmt::Display for ResultTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.clip_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries() {
        assert_eq!(ResultTier::from_score(100.0), ResultTier::Above90);
        assert_eq!(ResultTier::from_score(90.5), ResultTier::Above90);
        assert_eq!(ResultTier::from_score(90.0), ResultTier::Ending80To90);
        assert_eq!(ResultTier::from_score(80.0), ResultTier::Ending80To90);
        assert_eq!(ResultTier::from_score(79.9), ResultTier::Ending60To80);
        assert_eq!(ResultTier::from_score(60.0), ResultTier::Ending60To80);
        assert_eq!(ResultTier::from_score(40.0), ResultTier::Ending40To60);
        assert_eq!(ResultTier::from_score(39.99), ResultTier::EndingBelow40);
        assert_eq!(ResultTier::from_score(-5.0), ResultTier::EndingBelow40);
        assert_eq!(ResultTier::from_score(f32::NAN), ResultTier::EndingBelow40);
    }

    #[test]
    fn tiers_are_monotonic() {
        let mut last = ResultTier::EndingBelow40;
        for score in 0..=100 {
            let tier = ResultTier::from_score(score as f32);
            assert!(tier >= last);
            last = tier;
        }
        assert_eq!(last, *ResultTier::ALL.last().unwrap());
    }

    #[test]
    fn clip_paths() {
        assert_eq!(ResultTier::Above90.video_path(), "videos/Above 90.mp4");
        assert_eq!(
            ResultTier::EndingBelow40.video_path(),
            "videos/EndingBelow40.mp4"
        );
        assert_eq!(ResultTier::Ending40To60.to_string(), "Ending40to60");
    }
}
