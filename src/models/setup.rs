use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;

use super::{GearCategory, GearItem};

/// One named factor's contribution to a candidate's score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorContribution {
    pub factor: String,
    pub points: f64,
}

/// A catalog item ranked by a category scorer, with the reasons behind its score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    pub gear: GearItem,
    pub score: f64,
    pub reasons: Vec<String>,
    /// Display sentiment (0–9.9)
    pub sentiment: f64,
    /// Every factor that fired, in table order
    pub breakdown: Vec<FactorContribution>,
}

/// The three named rig alternatives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariantKind {
    Performance,
    Balanced,
    Pro,
}

impl Display for VariantKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            VariantKind::Performance => "Performance",
            VariantKind::Balanced => "Balanced",
            VariantKind::Pro => "Pro",
        };
        f.write_str(label)
    }
}

/// A complete rig: one optional pick per category plus its narrative
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantSetup {
    pub name: VariantKind,
    pub badge: String,
    pub description: String,
    pub analysis: String,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    /// Normalized aggregate score in [0, 100]
    pub score: f64,
    /// `None` when the category has no catalog items
    pub picks: BTreeMap<GearCategory, Option<ScoredCandidate>>,
}

impl VariantSetup {
    pub fn pick(&self, category: GearCategory) -> Option<&ScoredCandidate> {
        self.picks.get(&category).and_then(Option::as_ref)
    }
}
