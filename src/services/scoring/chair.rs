use super::{Factor, SentimentBoost, SentimentReason, TableScorer};
use crate::models::{GearCategory, GearItem, HandSize};

type F = Factor<ChairTraits>;

const DEFAULT_MAX_WEIGHT_KG: f64 = 100.0;

/// Chair attributes; hand size stands in for body size
#[derive(Debug, Clone, PartialEq)]
pub struct ChairTraits {
    pub max_weight_kg: f64,
    pub material: String,
    pub lumbar: String,
}

impl ChairTraits {
    pub fn from_item(item: &GearItem) -> Self {
        Self {
            max_weight_kg: item.specs.number("Max weight").unwrap_or(DEFAULT_MAX_WEIGHT_KG),
            material: item.specs.text("Material").to_string(),
            lumbar: item.specs.text("Lumbar support").to_string(),
        }
    }

    fn is_fabric(&self) -> bool {
        self.material.contains("Fabric")
    }
}

pub fn factors() -> Vec<F> {
    vec![
        F {
            name: "large-frame-capacity",
            bonus: 20.0,
            applies: |c, p| p.hand_size == HandSize::Large && c.max_weight_kg >= 130.0,
            reason: |c| Some(format!("High durability {}kg", c.max_weight_kg)),
        },
        F {
            name: "fabric",
            bonus: 10.0,
            applies: |c, _| c.is_fabric(),
            reason: |_| Some("Breathable Fabric".to_string()),
        },
        F {
            name: "real-leather",
            bonus: 15.0,
            applies: |c, _| !c.is_fabric() && c.material.contains("Real Leather"),
            reason: |_| Some("Premium Real Leather".to_string()),
        },
        F {
            name: "adjustable-lumbar",
            bonus: 10.0,
            applies: |c, _| c.lumbar.contains("Adjustable"),
            reason: |_| Some("Adjustable Lumbar Support".to_string()),
        },
    ]
}

pub const SENTIMENT: SentimentBoost = SentimentBoost {
    per_point: 2.0,
    cap: 30.0,
    reason: Some(SentimentReason {
        above: 5.0,
        label: "High reviewer sentiment",
    }),
};

pub fn scorer() -> TableScorer<ChairTraits> {
    TableScorer::new(GearCategory::Chair, ChairTraits::from_item, factors(), SENTIMENT)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::gear;
    use super::super::CategoryScorer;
    use super::*;
    use crate::models::{Genre, GripStyle, UserPreferences};

    #[test]
    fn test_large_user_gets_capacity_bonus() {
        let prefs = UserPreferences::new(Genre::Fps, HandSize::Large, GripStyle::Palm);
        let item = gear(
            1,
            GearCategory::Chair,
            &[
                ("Max weight", "150kg"),
                ("Material", "Real Leather"),
                ("Lumbar support", "Adjustable (4D)"),
            ],
            6.0,
        );
        let candidate = scorer().score(&prefs, &item);
        // 20 + 15 + 10 + 12
        assert_eq!(candidate.score, 57.0);
        assert_eq!(candidate.reasons[0], "High durability 150kg");
        assert_eq!(candidate.reasons.last().unwrap(), "High reviewer sentiment (6/10)");
    }

    #[test]
    fn test_missing_capacity_defaults_to_hundred() {
        let prefs = UserPreferences::new(Genre::Fps, HandSize::Large, GripStyle::Palm);
        let item = gear(1, GearCategory::Chair, &[("Material", "Fabric")], 0.0);
        assert_eq!(ChairTraits::from_item(&item).max_weight_kg, 100.0);
        assert_eq!(scorer().score(&prefs, &item).score, 10.0);
    }
}
