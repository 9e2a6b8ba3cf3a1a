use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::{GearId, GearItem};

/// An ordered set of gear IDs
pub type Itemset = BTreeSet<GearId>;

/// Frequent itemsets mapped to their support
pub type FrequentItemsets = BTreeMap<Itemset, f64>;

/// A curated bundle as supplied by the bundle source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    pub id: i64,
    pub gear_ids: Vec<GearId>,
}

/// A professional player's use of one gear item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageLink {
    pub player_id: i64,
    pub gear_id: GearId,
}

/// The non-empty set of catalog items found in one bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction(Itemset);

impl Transaction {
    /// Builds a transaction, or `None` when no items remain
    pub fn new(items: impl IntoIterator<Item = GearId>) -> Option<Self> {
        let items: Itemset = items.into_iter().collect();
        if items.is_empty() {
            None
        } else {
            Some(Self(items))
        }
    }

    pub fn items(&self) -> &Itemset {
        &self.0
    }

    pub fn contains_all(&self, itemset: &Itemset) -> bool {
        itemset.is_subset(&self.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// An antecedent → consequent association with its quality metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationRule {
    pub antecedent: Itemset,
    pub consequent: Itemset,
    /// Support of antecedent ∪ consequent
    pub support: f64,
    pub confidence: f64,
    pub lift: f64,
    /// confidence × lift
    pub score: f64,
}

/// The rule list stored under the rule cache key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    pub rules: Vec<AssociationRule>,
    pub transaction_count: usize,
    pub itemset_count: usize,
    pub generated_at: DateTime<Utc>,
}

impl RuleSet {
    pub fn empty() -> Self {
        Self {
            rules: Vec::new(),
            transaction_count: 0,
            itemset_count: 0,
            generated_at: Utc::now(),
        }
    }

    pub fn has_rules(&self) -> bool {
        !self.rules.is_empty()
    }
}

/// A gear item suggested as a complement to the current selection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub gear: GearItem,
    pub confidence: f64,
    pub lift: f64,
    pub score: f64,
}
