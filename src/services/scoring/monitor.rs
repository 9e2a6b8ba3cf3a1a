use super::{Factor, SentimentBoost, TableScorer};
use crate::models::{GearCategory, GearItem, Genre};

type F = Factor<MonitorTraits>;

const DEFAULT_REFRESH_HZ: f64 = 60.0;

#[derive(Debug, Clone, PartialEq)]
pub struct MonitorTraits {
    pub refresh_hz: f64,
    pub resolution: String,
    pub panel: String,
}

impl MonitorTraits {
    pub fn from_item(item: &GearItem) -> Self {
        Self {
            refresh_hz: Self::stated_refresh_hz(item).unwrap_or(DEFAULT_REFRESH_HZ),
            resolution: item.specs.text("Resolution").to_string(),
            panel: item.specs.first_text(&["Panel Tech", "Panel Type"]).to_string(),
        }
    }

    /// Refresh rate as listed in the catalog, without the 60Hz fallback
    pub fn stated_refresh_hz(item: &GearItem) -> Option<f64> {
        item.specs
            .first_number(&["Refresh Rate", "Max Refresh Rate (Hz)"])
    }

    fn is_high_res(&self) -> bool {
        self.resolution.contains("1440") || self.resolution.contains("2160")
    }

    fn is_1080p(&self) -> bool {
        self.resolution.contains("1080")
    }
}

pub fn factors() -> Vec<F> {
    vec![
        F {
            name: "fps-360hz",
            bonus: 40.0,
            applies: |m, p| p.genre == Genre::Fps && m.refresh_hz >= 360.0,
            reason: |m| Some(format!("Pro-level {}Hz motion clarity", m.refresh_hz.trunc())),
        },
        F {
            name: "fps-240hz",
            bonus: 30.0,
            applies: |m, p| p.genre == Genre::Fps && (240.0..360.0).contains(&m.refresh_hz),
            reason: |m| Some(format!("Competitive {}Hz refresh rate", m.refresh_hz.trunc())),
        },
        F::silent("fps-144hz", 10.0, |m, p| {
            p.genre == Genre::Fps && (144.0..240.0).contains(&m.refresh_hz)
        }),
        F::silent("fps-1080p", 10.0, |m, p| p.genre == Genre::Fps && m.is_1080p()),
        F {
            name: "immersive-high-res",
            bonus: 35.0,
            applies: |m, p| p.genre.is_immersive() && m.is_high_res(),
            reason: |m| Some(format!("High Resolution ({}) for visuals", m.resolution)),
        },
        F::silent("immersive-1080p", -10.0, |m, p| {
            p.genre.is_immersive() && !m.is_high_res() && m.is_1080p()
        }),
        F {
            name: "immersive-panel",
            bonus: 20.0,
            applies: |m, p| {
                p.genre.is_immersive() && (m.panel.contains("OLED") || m.panel.contains("IPS"))
            },
            reason: |m| Some(format!("Vibrant {} colors", m.panel)),
        },
    ]
}

pub const SENTIMENT: SentimentBoost = SentimentBoost {
    per_point: 2.0,
    cap: 20.0,
    reason: None,
};

pub fn scorer() -> TableScorer<MonitorTraits> {
    TableScorer::new(GearCategory::Monitor, MonitorTraits::from_item, factors(), SENTIMENT)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::gear;
    use super::super::CategoryScorer;
    use super::*;
    use crate::models::{GripStyle, HandSize, UserPreferences};

    fn prefs(genre: Genre) -> UserPreferences {
        UserPreferences::new(genre, HandSize::Medium, GripStyle::Palm)
    }

    #[test]
    fn test_refresh_rate_falls_back_to_sixty() {
        let item = gear(1, GearCategory::Monitor, &[("Refresh Rate", "fast")], 0.0);
        assert_eq!(MonitorTraits::from_item(&item).refresh_hz, 60.0);

        let item = gear(2, GearCategory::Monitor, &[("Max Refresh Rate (Hz)", "240")], 0.0);
        assert_eq!(MonitorTraits::from_item(&item).refresh_hz, 240.0);
    }

    #[test]
    fn test_fps_rewards_refresh_rate() {
        let item = gear(
            1,
            GearCategory::Monitor,
            &[("Refresh Rate", "360Hz"), ("Resolution", "1920x1080")],
            0.0,
        );
        let candidate = scorer().score(&prefs(Genre::Fps), &item);
        assert_eq!(candidate.score, 50.0);
        assert_eq!(candidate.reasons, vec!["Pro-level 360Hz motion clarity".to_string()]);
    }

    #[test]
    fn test_rpg_rewards_resolution_and_panel() {
        let item = gear(
            1,
            GearCategory::Monitor,
            &[("Resolution", "2560x1440"), ("Panel Tech", "OLED")],
            5.0,
        );
        let candidate = scorer().score(&prefs(Genre::Rpg), &item);
        assert_eq!(candidate.score, 65.0);
        assert_eq!(candidate.reasons.len(), 2);
    }

    #[test]
    fn test_moba_penalizes_1080p() {
        let item = gear(1, GearCategory::Monitor, &[("Resolution", "1920x1080")], 0.0);
        assert_eq!(scorer().score(&prefs(Genre::Moba), &item).score, -10.0);
    }
}
