use std::collections::{BTreeMap, BTreeSet};

use crate::models::{FrequentItemsets, GearId, Itemset, Transaction};

/// Tolerance applied when comparing a support against its threshold
pub(crate) const EPSILON: f64 = 1e-9;

/// Level-wise Apriori search for itemsets meeting `min_support`
///
/// Size-k candidates are joined only from frequent size-(k-1) itemsets sharing
/// their first k-2 items, and pruned unless every (k-1)-subset is frequent.
/// Mining stops at the first level where no candidate survives.
pub fn mine_frequent_itemsets(transactions: &[Transaction], min_support: f64) -> FrequentItemsets {
    let mut frequent = FrequentItemsets::new();
    if transactions.is_empty() {
        return frequent;
    }

    let total = transactions.len() as f64;

    // Level 1 comes straight from the item counts
    let mut singles: BTreeMap<GearId, usize> = BTreeMap::new();
    for tx in transactions {
        for id in tx.items() {
            *singles.entry(*id).or_default() += 1;
        }
    }

    let mut level: Vec<Itemset> = Vec::new();
    for (id, count) in singles {
        let support = count as f64 / total;
        if support + EPSILON >= min_support {
            let itemset: Itemset = BTreeSet::from([id]);
            frequent.insert(itemset.clone(), support);
            level.push(itemset);
        }
    }

    let mut k = 2;
    while !level.is_empty() {
        let candidates = generate_candidates(&level, &frequent);
        if candidates.is_empty() {
            break;
        }

        let mut next = Vec::new();
        for candidate in candidates {
            let count = transactions
                .iter()
                .filter(|tx| tx.contains_all(&candidate))
                .count();
            let support = count as f64 / total;
            if support + EPSILON >= min_support {
                frequent.insert(candidate.clone(), support);
                next.push(candidate);
            }
        }

        tracing::trace!(level = k, frequent = next.len(), "Apriori level complete");
        level = next;
        k += 1;
    }

    frequent
}

/// Joins frequent (k-1)-itemsets into k-candidates and applies the subset prune
fn generate_candidates(level: &[Itemset], frequent: &FrequentItemsets) -> Vec<Itemset> {
    let mut candidates = BTreeSet::new();

    for (i, left) in level.iter().enumerate() {
        let left_items: Vec<GearId> = left.iter().copied().collect();
        let (left_prefix, _) = left_items.split_at(left_items.len() - 1);

        for right in &level[i + 1..] {
            let right_items: Vec<GearId> = right.iter().copied().collect();
            let (right_prefix, right_last) = right_items.split_at(right_items.len() - 1);
            if left_prefix != right_prefix {
                continue;
            }

            let mut candidate = left.clone();
            candidate.insert(right_last[0]);

            if all_subsets_frequent(&candidate, frequent) {
                candidates.insert(candidate);
            }
        }
    }

    candidates.into_iter().collect()
}

fn all_subsets_frequent(candidate: &Itemset, frequent: &FrequentItemsets) -> bool {
    candidate.iter().all(|id| {
        let mut subset = candidate.clone();
        subset.remove(id);
        frequent.contains_key(&subset)
    })
}
