use std::collections::HashSet;

use crate::models::{Bundle, GearId, Transaction};

/// Turns curated bundles into mining transactions
///
/// IDs missing from the catalog are dropped and bundles left empty are skipped.
/// No bundles (or an empty catalog) yields an empty dataset.
pub fn build_transactions(bundles: &[Bundle], catalog_ids: &HashSet<GearId>) -> Vec<Transaction> {
    let transactions: Vec<Transaction> = bundles
        .iter()
        .filter_map(|bundle| {
            let items = bundle
                .gear_ids
                .iter()
                .copied()
                .filter(|id| catalog_ids.contains(id));
            let tx = Transaction::new(items);
            if tx.is_none() {
                tracing::debug!(bundle_id = bundle.id, "Skipping bundle with no catalog items");
            }
            tx
        })
        .collect();

    tracing::debug!(
        bundles = bundles.len(),
        transactions = transactions.len(),
        "Built transactions"
    );

    transactions
}
