use super::{Factor, SentimentBoost, SentimentReason, TableScorer};
use crate::models::{GearCategory, GearItem, Genre};

type F = Factor<HeadsetTraits>;

#[derive(Debug, Clone, PartialEq)]
pub struct HeadsetTraits {
    /// Lowercased `Connection` attribute
    pub connection: String,
}

impl HeadsetTraits {
    pub fn from_item(item: &GearItem) -> Self {
        Self {
            connection: item.specs.text("Connection").to_lowercase(),
        }
    }

    fn is_wireless(&self) -> bool {
        self.connection.contains("wireless")
    }

    fn is_wired(&self) -> bool {
        !self.is_wireless() && self.connection.contains("wired")
    }
}

/// Sentiment dominates headsets; the genre adjustments are small nudges
pub fn factors() -> Vec<F> {
    vec![
        F::silent("fps-wired", 5.0, |h, p| p.genre == Genre::Fps && h.is_wired()),
        F::silent("immersive-wireless", 5.0, |h, p| {
            p.genre.is_macro_heavy() && h.is_wireless()
        }),
    ]
}

pub const SENTIMENT: SentimentBoost = SentimentBoost {
    per_point: 4.0,
    cap: 60.0,
    reason: Some(SentimentReason {
        above: 7.0,
        label: "Excellent Sound Quality",
    }),
};

pub fn scorer() -> TableScorer<HeadsetTraits> {
    TableScorer::new(GearCategory::Headset, HeadsetTraits::from_item, factors(), SENTIMENT)
}
