mod association;
mod gear;
mod setup;
mod specs;
mod user_preferences;

pub use association::*;
pub use gear::*;
pub use setup::*;
pub use specs::*;
pub use user_preferences::*;

use serde::{Deserialize, Serialize};

// ============================================================================
// Recommendation API Types
// ============================================================================

/// Request for complementary gear based on the current selection
#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub gear_ids: Vec<GearId>,
    #[serde(default)]
    pub top_n: Option<usize>,
    #[serde(default)]
    pub exclude_types: Vec<GearCategory>,
}

/// One recommended item as returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendedGear {
    pub gear_id: GearId,
    pub name: String,
    #[serde(rename = "type")]
    pub category: GearCategory,
    pub brand: String,
    pub price: Option<f64>,
    pub image_url: Option<String>,
    /// Confidence as a percentage, one decimal
    pub confidence: f64,
    pub lift: f64,
    pub score: f64,
}

impl From<&Recommendation> for RecommendedGear {
    fn from(rec: &Recommendation) -> Self {
        Self {
            gear_id: rec.gear.id,
            name: rec.gear.name.clone(),
            category: rec.gear.category,
            brand: rec.gear.brand.clone(),
            price: rec.gear.price,
            image_url: rec.gear.image_url.clone(),
            confidence: round_to(rec.confidence * 100.0, 1),
            lift: round_to(rec.lift, 2),
            score: round_to(rec.score, 2),
        }
    }
}

/// Response body of the recommendation endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub success: bool,
    pub recommendations: Vec<RecommendedGear>,
    pub count: usize,
}

/// Response body of the rule refresh endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_count: Option<usize>,
}

/// Response body of the variant endpoint
#[derive(Debug, Serialize)]
pub struct VariantsResponse {
    pub variants: Vec<VariantSetup>,
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
