use super::{Factor, SentimentBoost, TableScorer};
use crate::models::{GearCategory, GearItem, Genre};

type F = Factor<KeyboardTraits>;

#[derive(Debug, Clone, PartialEq)]
pub struct KeyboardTraits {
    pub form_factor: String,
}

impl KeyboardTraits {
    pub fn from_item(item: &GearItem) -> Self {
        Self {
            form_factor: item.specs.text("Form Factor").to_string(),
        }
    }

    fn is_compact(&self) -> bool {
        ["60%", "65%", "75%"]
            .iter()
            .any(|size| self.form_factor.contains(size))
    }

    fn is_tkl(&self) -> bool {
        self.form_factor.contains("TKL")
    }
}

pub fn factors() -> Vec<F> {
    vec![
        F {
            name: "fps-compact",
            bonus: 35.0,
            applies: |k, p| p.genre == Genre::Fps && k.is_compact(),
            reason: |k| Some(format!("Compact {} layout: Max mouse space", k.form_factor)),
        },
        F {
            name: "fps-tkl",
            bonus: 20.0,
            applies: |k, p| p.genre == Genre::Fps && !k.is_compact() && k.is_tkl(),
            reason: |_| Some("TKL: Good balance for FPS".to_string()),
        },
        F {
            name: "moba-tkl",
            bonus: 25.0,
            applies: |k, p| p.genre == Genre::Moba && k.is_tkl(),
            reason: |_| Some("TKL: Perfect size for MOBA".to_string()),
        },
        F {
            name: "mmo-full-size",
            bonus: 35.0,
            applies: |k, p| p.genre.is_macro_heavy() && k.form_factor.contains("Full Size"),
            reason: |_| Some("Full Size: Numpad & extra keys for macros".to_string()),
        },
    ]
}

pub const SENTIMENT: SentimentBoost = SentimentBoost {
    per_point: 2.0,
    cap: 20.0,
    reason: None,
};

pub fn scorer() -> TableScorer<KeyboardTraits> {
    TableScorer::new(GearCategory::Keyboard, KeyboardTraits::from_item, factors(), SENTIMENT)
}
