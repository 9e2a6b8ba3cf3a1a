use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;

/// Game genre the user mostly plays
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Genre {
    #[default]
    #[serde(rename = "FPS", alias = "fps", alias = "Fps")]
    Fps,
    #[serde(rename = "MOBA", alias = "moba", alias = "Moba")]
    Moba,
    #[serde(rename = "MMO", alias = "mmo", alias = "Mmo")]
    Mmo,
    #[serde(rename = "RPG", alias = "rpg", alias = "Rpg")]
    Rpg,
    /// Any genre the scorers have no specific rules for
    #[serde(other)]
    Other,
}

impl Genre {
    /// Genres where resolution and panel fidelity outweigh refresh rate
    pub fn is_immersive(&self) -> bool {
        matches!(self, Genre::Moba | Genre::Mmo | Genre::Rpg)
    }

    /// Genres built around macros and long sessions
    pub fn is_macro_heavy(&self) -> bool {
        matches!(self, Genre::Mmo | Genre::Rpg)
    }
}

impl Display for Genre {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Genre::Fps => "FPS",
            Genre::Moba => "MOBA",
            Genre::Mmo => "MMO",
            Genre::Rpg => "RPG",
            Genre::Other => "Gaming",
        };
        f.write_str(label)
    }
}

/// Self-reported hand size
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum HandSize {
    #[serde(alias = "small")]
    Small,
    #[serde(alias = "large")]
    Large,
    #[default]
    #[serde(other)]
    Medium,
}

impl Display for HandSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            HandSize::Small => "small",
            HandSize::Medium => "medium",
            HandSize::Large => "large",
        };
        f.write_str(label)
    }
}

/// Mouse grip style
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum GripStyle {
    #[serde(alias = "claw")]
    Claw,
    #[serde(alias = "fingertip")]
    Fingertip,
    #[default]
    #[serde(other)]
    Palm,
}

impl Display for GripStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            GripStyle::Palm => "palm",
            GripStyle::Claw => "claw",
            GripStyle::Fingertip => "fingertip",
        };
        f.write_str(label)
    }
}

/// Stated preferences driving the category scorers
///
/// Every field is optional on the wire; missing, null or unrecognized values
/// fall back to the defaults (FPS, medium hands, palm grip).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UserPreferences {
    #[serde(deserialize_with = "null_as_default")]
    pub genre: Genre,
    #[serde(deserialize_with = "null_as_default")]
    pub hand_size: HandSize,
    #[serde(alias = "grip_style", deserialize_with = "null_as_default")]
    pub grip: GripStyle,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl UserPreferences {
    pub fn new(genre: Genre, hand_size: HandSize, grip: GripStyle) -> Self {
        Self {
            genre,
            hand_size,
            grip,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_preferences_use_defaults() {
        let prefs: UserPreferences = serde_json::from_value(json!({})).unwrap();
        assert_eq!(prefs, UserPreferences::default());
        assert_eq!(prefs.genre, Genre::Fps);
        assert_eq!(prefs.hand_size, HandSize::Medium);
        assert_eq!(prefs.grip, GripStyle::Palm);
    }

    #[test]
    fn test_original_labels_deserialize() {
        let prefs: UserPreferences = serde_json::from_value(json!({
            "genre": "MOBA",
            "hand_size": "Large",
            "grip": "Fingertip"
        }))
        .unwrap();
        assert_eq!(prefs.genre, Genre::Moba);
        assert_eq!(prefs.hand_size, HandSize::Large);
        assert_eq!(prefs.grip, GripStyle::Fingertip);
    }

    #[test]
    fn test_unknown_values_fall_back() {
        let prefs: UserPreferences = serde_json::from_value(json!({
            "genre": "Racing",
            "hand_size": "Huge",
            "grip_style": "Hover"
        }))
        .unwrap();
        assert_eq!(prefs.genre, Genre::Other);
        assert_eq!(prefs.hand_size, HandSize::Medium);
        assert_eq!(prefs.grip, GripStyle::Palm);
    }

    #[test]
    fn test_null_values_use_defaults() {
        let prefs: UserPreferences = serde_json::from_value(json!({
            "genre": null,
            "hand_size": null,
            "grip": null
        }))
        .unwrap();
        assert_eq!(prefs, UserPreferences::default());

        let prefs: UserPreferences =
            serde_json::from_value(json!({ "genre": "RPG", "hand_size": null })).unwrap();
        assert_eq!(prefs.genre, Genre::Rpg);
        assert_eq!(prefs.hand_size, HandSize::Medium);
    }

    #[test]
    fn test_genre_groups() {
        assert!(Genre::Rpg.is_immersive());
        assert!(Genre::Rpg.is_macro_heavy());
        assert!(Genre::Moba.is_immersive());
        assert!(!Genre::Moba.is_macro_heavy());
        assert!(!Genre::Fps.is_immersive());
        assert_eq!(Genre::Other.to_string(), "Gaming");
    }
}
