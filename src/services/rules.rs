use chrono::Utc;
use std::time::Duration;

use super::apriori::{mine_frequent_itemsets, EPSILON};
use crate::models::{AssociationRule, FrequentItemsets, GearId, Itemset, RuleSet, Transaction};

/// Mining thresholds and cache policy for the recommendation engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MiningSettings {
    pub min_support: f64,
    pub min_confidence: f64,
    pub min_lift: f64,
    pub cache_ttl_secs: u64,
    pub default_top_n: usize,
    pub mining_budget: Duration,
}

impl Default for MiningSettings {
    fn default() -> Self {
        Self {
            min_support: 0.05,
            min_confidence: 0.3,
            min_lift: 1.0,
            cache_ttl_secs: 60 * 60 * 24,
            default_top_n: 5,
            mining_budget: Duration::from_secs(5),
        }
    }
}

/// Derives association rules from frequent itemsets
///
/// Every non-empty proper subset A of an itemset S (|S| >= 2) yields the
/// candidate rule A → S − A, smallest antecedents first. Rules below
/// `min_confidence` or `min_lift` are dropped. The result is sorted by
/// descending score; equal scores keep the order in which they were generated,
/// which is deterministic because the itemsets are iterated in key order.
pub fn generate_rules(
    frequent: &FrequentItemsets,
    min_confidence: f64,
    min_lift: f64,
) -> Vec<AssociationRule> {
    let mut rules = Vec::new();

    for (itemset, &support) in frequent.iter().filter(|(s, _)| s.len() >= 2) {
        let items: Vec<GearId> = itemset.iter().copied().collect();

        for (antecedent, consequent) in Splits::new(&items) {
            let Some(&antecedent_support) = frequent.get(&antecedent) else {
                continue;
            };
            let Some(&consequent_support) = frequent.get(&consequent) else {
                continue;
            };
            if antecedent_support <= 0.0 || consequent_support <= 0.0 {
                continue;
            }

            let confidence = support / antecedent_support;
            if confidence + EPSILON < min_confidence {
                continue;
            }

            let lift = confidence / consequent_support;
            if lift + EPSILON < min_lift {
                continue;
            }

            rules.push(AssociationRule {
                antecedent,
                consequent,
                support,
                confidence,
                lift,
                score: confidence * lift,
            });
        }
    }

    rules.sort_by(|a, b| b.score.total_cmp(&a.score));
    rules
}

/// Every split of an itemset into a non-empty antecedent and a non-empty
/// consequent, walking antecedent sizes upward in lexicographic index order
struct Splits<'a> {
    items: &'a [GearId],
    indices: Vec<usize>,
}

impl<'a> Splits<'a> {
    fn new(items: &'a [GearId]) -> Self {
        Self {
            items,
            indices: vec![0],
        }
    }

    fn advance(&mut self) {
        let n = self.items.len();
        let k = self.indices.len();

        match (0..k).rev().find(|&i| self.indices[i] != i + n - k) {
            Some(pos) => {
                self.indices[pos] += 1;
                for j in pos + 1..k {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
            }
            None => self.indices = (0..=k).collect(),
        }
    }
}

impl Iterator for Splits<'_> {
    type Item = (Itemset, Itemset);

    fn next(&mut self) -> Option<Self::Item> {
        if self.indices.len() >= self.items.len() {
            return None;
        }

        let antecedent: Itemset = self.indices.iter().map(|&i| self.items[i]).collect();
        let consequent: Itemset = self
            .items
            .iter()
            .filter(|id| !antecedent.contains(*id))
            .copied()
            .collect();

        self.advance();
        Some((antecedent, consequent))
    }
}

/// Runs the full mining pipeline over a transaction snapshot
pub fn mine_rule_set(transactions: &[Transaction], settings: &MiningSettings) -> RuleSet {
    let frequent = mine_frequent_itemsets(transactions, settings.min_support);
    let rules = generate_rules(&frequent, settings.min_confidence, settings.min_lift);

    tracing::info!(
        transactions = transactions.len(),
        itemsets = frequent.len(),
        rules = rules.len(),
        "Mined association rules"
    );

    RuleSet {
        rules,
        transaction_count: transactions.len(),
        itemset_count: frequent.len(),
        generated_at: Utc::now(),
    }
}
