use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use super::SpecMap;

/// Catalog primary key of a gear item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GearId(pub i64);

impl Display for GearId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Closed set of gear categories carried by the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GearCategory {
    #[serde(alias = "mouse")]
    Mouse,
    #[serde(alias = "keyboard")]
    Keyboard,
    #[serde(alias = "headset")]
    Headset,
    #[serde(alias = "monitor")]
    Monitor,
    #[serde(alias = "chair")]
    Chair,
    #[serde(alias = "mousepad")]
    Mousepad,
}

impl GearCategory {
    /// Categories that make up a complete rig, in presentation order
    pub const RIG: [GearCategory; 5] = [
        GearCategory::Mouse,
        GearCategory::Keyboard,
        GearCategory::Headset,
        GearCategory::Monitor,
        GearCategory::Chair,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GearCategory::Mouse => "Mouse",
            GearCategory::Keyboard => "Keyboard",
            GearCategory::Headset => "Headset",
            GearCategory::Monitor => "Monitor",
            GearCategory::Chair => "Chair",
            GearCategory::Mousepad => "Mousepad",
        }
    }
}

impl Display for GearCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GearCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mouse" => Ok(GearCategory::Mouse),
            "keyboard" => Ok(GearCategory::Keyboard),
            "headset" => Ok(GearCategory::Headset),
            "monitor" => Ok(GearCategory::Monitor),
            "chair" => Ok(GearCategory::Chair),
            "mousepad" => Ok(GearCategory::Mousepad),
            other => Err(format!("unknown gear category '{}'", other)),
        }
    }
}

/// A catalog gear item with normalized specs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GearItem {
    pub id: GearId,
    pub name: String,
    pub category: GearCategory,
    pub brand: String,
    pub specs: SpecMap,
    /// Review sentiment on a 0–10 scale, 0 when unknown
    pub sentiment: f64,
    pub price: Option<f64>,
    pub image_url: Option<String>,
}

impl GearItem {
    /// Sentiment as presented to users: capped at 9.9 and rounded to one decimal
    pub fn display_sentiment(&self) -> f64 {
        format_sentiment(self.sentiment)
    }
}

/// Caps a raw sentiment at 9.9 and rounds it to one decimal
pub fn format_sentiment(raw: f64) -> f64 {
    if !raw.is_finite() {
        return 0.0;
    }
    (raw.min(9.9) * 10.0).round() / 10.0
}

/// Gear record as delivered by a catalog source, before normalization
#[derive(Debug, Clone, Deserialize, sqlx::FromRow)]
pub struct RawGearRecord {
    #[serde(alias = "gear_id")]
    pub id: i64,
    pub name: String,
    #[serde(alias = "type")]
    pub category: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub specs: serde_json::Value,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default, alias = "image")]
    pub image_url: Option<String>,
}

impl RawGearRecord {
    /// Normalizes the record into a [`GearItem`]
    ///
    /// Returns `None` for records whose category is not part of the catalog enum.
    pub fn into_item(self) -> Option<GearItem> {
        let id = GearId(self.id);
        let category = match self.category.parse::<GearCategory>() {
            Ok(category) => category,
            Err(e) => {
                tracing::warn!(gear_id = %id, error = %e, "Skipping gear with unknown category");
                return None;
            }
        };

        let specs = SpecMap::normalize(&self.specs, id);
        let sentiment = specs.number("sentiment_score").unwrap_or(0.0);

        Some(GearItem {
            id,
            name: self.name,
            category,
            brand: self.brand,
            specs,
            sentiment,
            price: self.price,
            image_url: self.image_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_gear_id_display() {
        assert_eq!(format!("{}", GearId(42)), "42");
    }

    #[test]
    fn test_gear_id_serde_is_transparent() {
        let json = serde_json::to_string(&GearId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_category_from_str_is_case_insensitive() {
        assert_eq!("mouse".parse::<GearCategory>(), Ok(GearCategory::Mouse));
        assert_eq!(" Chair ".parse::<GearCategory>(), Ok(GearCategory::Chair));
        assert!("Speaker".parse::<GearCategory>().is_err());
    }

    #[test]
    fn test_category_serde_accepts_lowercase_alias() {
        let category: GearCategory = serde_json::from_str("\"monitor\"").unwrap();
        assert_eq!(category, GearCategory::Monitor);
        assert_eq!(serde_json::to_string(&category).unwrap(), "\"Monitor\"");
    }

    #[test]
    fn test_format_sentiment_caps_and_rounds() {
        assert_eq!(format_sentiment(10.0), 9.9);
        assert_eq!(format_sentiment(7.46), 7.5);
        assert_eq!(format_sentiment(f64::NAN), 0.0);
    }

    #[test]
    fn test_raw_record_normalizes_text_specs() {
        let record: RawGearRecord = serde_json::from_value(json!({
            "gear_id": 3,
            "name": "Viper V3 Pro",
            "type": "Mouse",
            "brand": "Razer",
            "specs": "{\"W (g)\": \"54\", \"sentiment_score\": 8.7}",
            "price": 159.99
        }))
        .unwrap();

        let item = record.into_item().unwrap();
        assert_eq!(item.id, GearId(3));
        assert_eq!(item.category, GearCategory::Mouse);
        assert_eq!(item.specs.number("W (g)"), Some(54.0));
        assert_eq!(item.sentiment, 8.7);
    }

    #[test]
    fn test_raw_record_with_broken_specs_keeps_item() {
        let record: RawGearRecord = serde_json::from_value(json!({
            "id": 9,
            "name": "Mystery Chair",
            "category": "Chair",
            "specs": "{{{"
        }))
        .unwrap();

        let item = record.into_item().unwrap();
        assert!(item.specs.is_empty());
        assert_eq!(item.sentiment, 0.0);
    }

    #[test]
    fn test_raw_record_with_unknown_category_is_skipped() {
        let record: RawGearRecord = serde_json::from_value(json!({
            "id": 1,
            "name": "Desk Lamp",
            "category": "Lamp"
        }))
        .unwrap();

        assert!(record.into_item().is_none());
    }
}
