use super::{Factor, SentimentBoost, SentimentReason, TableScorer};
use crate::models::{parse_number, GearCategory, GearItem, Genre, GripStyle, HandSize};

type F = Factor<MouseTraits>;

/// Mouse attributes the factor table reads
#[derive(Debug, Clone, PartialEq)]
pub struct MouseTraits {
    /// Length in cm, from the last component of `H / W / L (cm)`
    pub length: Option<f64>,
    /// Weight in grams
    pub weight: Option<f64>,
    pub shape: String,
}

impl MouseTraits {
    pub fn from_item(item: &GearItem) -> Self {
        let length = item
            .specs
            .get("H / W / L (cm)")
            .and_then(|dims| {
                let parts: Vec<&str> = dims.split('/').collect();
                match parts.as_slice() {
                    [_, _, length] => parse_number(length),
                    _ => None,
                }
            })
            .filter(|l| *l > 0.0);

        let shape = match item.specs.get("Shape") {
            Some(shape) => shape.to_string(),
            None => "Ambidextrous".to_string(),
        };

        Self {
            length,
            weight: item.specs.first_number(&["Weight", "W (g)"]),
            shape,
        }
    }

    fn is_ergonomic(&self) -> bool {
        self.shape.contains("Ergonomic")
    }

    fn length_is(&self, pred: impl Fn(f64) -> bool) -> bool {
        self.length.map(pred).unwrap_or(false)
    }

    fn weight_is(&self, pred: impl Fn(f64) -> bool) -> bool {
        self.weight.map(pred).unwrap_or(false)
    }
}

pub fn factors() -> Vec<F> {
    vec![
        // Hand size fit
        F {
            name: "small-hand-fit",
            bonus: 30.0,
            applies: |m, p| p.hand_size == HandSize::Small && m.length_is(|l| l < 12.0),
            reason: |m| m.length.map(|l| format!("Compact size ({}cm) fits Small Hands", l)),
        },
        F::silent("small-hand-oversize", -20.0, |m, p| {
            p.hand_size == HandSize::Small && m.length_is(|l| l > 12.5)
        }),
        F {
            name: "large-hand-fit",
            bonus: 30.0,
            applies: |m, p| p.hand_size == HandSize::Large && m.length_is(|l| l > 12.4),
            reason: |m| m.length.map(|l| format!("Large size ({}cm) fits Large Hands", l)),
        },
        F::silent("large-hand-undersize", -10.0, |m, p| {
            p.hand_size == HandSize::Large && m.length_is(|l| l < 11.8)
        }),
        F::silent("medium-hand-fit", 15.0, |m, p| {
            p.hand_size == HandSize::Medium && m.length_is(|l| (11.5..=12.6).contains(&l))
        }),
        // Grip compatibility
        F {
            name: "palm-ergonomic",
            bonus: 25.0,
            applies: |m, p| p.grip == GripStyle::Palm && m.is_ergonomic(),
            reason: |_| Some("Ergonomic shape perfect for Palm Grip".to_string()),
        },
        F::silent("palm-large-ambi", 10.0, |m, p| {
            p.grip == GripStyle::Palm && !m.is_ergonomic() && m.length_is(|l| l > 12.5)
        }),
        F {
            name: "claw-ambidextrous",
            bonus: 15.0,
            applies: |m, p| p.grip == GripStyle::Claw && m.shape.contains("Ambidextrous"),
            reason: |_| Some("Ambidextrous shape good for Claw".to_string()),
        },
        F {
            name: "fingertip-short",
            bonus: 30.0,
            applies: |m, p| p.grip == GripStyle::Fingertip && m.length_is(|l| l < 12.1),
            reason: |m| m.length.map(|l| format!("Short length ({}cm) ideal for Fingertip", l)),
        },
        F::silent("fingertip-ergonomic", -10.0, |m, p| {
            p.grip == GripStyle::Fingertip && m.is_ergonomic()
        }),
        // Genre and weight
        F {
            name: "fps-ultralight",
            bonus: 35.0,
            applies: |m, p| p.genre == Genre::Fps && m.weight_is(|w| w < 65.0),
            reason: |m| m.weight.map(|w| format!("Ultra-light ({}g) for fast FPS aim", w)),
        },
        F::silent("fps-light", 15.0, |m, p| {
            p.genre == Genre::Fps && m.weight_is(|w| (65.0..80.0).contains(&w))
        }),
        F {
            name: "moba-balanced",
            bonus: 20.0,
            applies: |m, p| p.genre == Genre::Moba && m.weight_is(|w| (60.0..=90.0).contains(&w)),
            reason: |m| m.weight.map(|w| format!("Balanced weight ({}g) for MOBA", w)),
        },
        F {
            name: "mmo-stable",
            bonus: 20.0,
            applies: |m, p| p.genre.is_macro_heavy() && m.weight_is(|w| w > 75.0),
            reason: |m| m.weight.map(|w| format!("Stable weight ({}g) for MMO/RPG", w)),
        },
    ]
}

pub const SENTIMENT: SentimentBoost = SentimentBoost {
    per_point: 1.5,
    cap: 15.0,
    reason: Some(SentimentReason {
        above: 8.0,
        label: "Top rated by reviewers",
    }),
};

pub fn scorer() -> TableScorer<MouseTraits> {
    TableScorer::new(GearCategory::Mouse, MouseTraits::from_item, factors(), SENTIMENT)
}
