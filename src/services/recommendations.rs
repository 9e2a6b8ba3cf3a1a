use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::rules::{mine_rule_set, MiningSettings};
use super::transactions::build_transactions;
use crate::{
    cached,
    db::{BundleSource, Cache, CacheKey, CatalogStore},
    error::{AppError, AppResult},
    models::{AssociationRule, GearCategory, GearId, GearItem, Itemset, Recommendation, RuleSet, Transaction},
};

/// Parameters of one complementary-gear query
#[derive(Debug, Clone, Default)]
pub struct RecommendationQuery {
    pub selected: Vec<GearId>,
    /// Falls back to the configured default when `None`
    pub top_n: Option<usize>,
    pub exclude: Vec<GearCategory>,
}

/// Mines association rules from curated bundles and answers recommendation queries
///
/// One engine is built per process and shared by reference. The rule cache is
/// its only shared mutable state; refreshes are serialized by `refresh_lock`.
pub struct RecommendationEngine {
    catalog: Arc<dyn CatalogStore>,
    bundles: Arc<dyn BundleSource>,
    cache: Cache,
    settings: MiningSettings,
    refresh_lock: Mutex<()>,
}

impl RecommendationEngine {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        bundles: Arc<dyn BundleSource>,
        cache: Cache,
        settings: MiningSettings,
    ) -> Self {
        Self {
            catalog,
            bundles,
            cache,
            settings,
            refresh_lock: Mutex::new(()),
        }
    }

    /// Snapshot of the current bundles as mining transactions
    pub async fn build_transactions(&self) -> AppResult<Vec<Transaction>> {
        let bundles = self.bundles.bundles().await?;
        let catalog_ids = self.catalog.gear_ids().await?;
        Ok(build_transactions(&bundles, &catalog_ids))
    }

    /// Mines a fresh rule set without touching the cache
    pub async fn mine_rules(&self) -> AppResult<RuleSet> {
        let transactions = self.build_transactions().await?;
        self.mine_within_budget(transactions).await
    }

    /// Runs mining on the blocking pool, bounded by the configured budget
    async fn mine_within_budget(&self, transactions: Vec<Transaction>) -> AppResult<RuleSet> {
        let settings = self.settings;
        let task = tokio::task::spawn_blocking(move || mine_rule_set(&transactions, &settings));

        match tokio::time::timeout(settings.mining_budget, task).await {
            Ok(Ok(rule_set)) => Ok(rule_set),
            Ok(Err(e)) => Err(AppError::Internal(format!("Rule mining task failed: {}", e))),
            Err(_) => {
                tracing::warn!(
                    budget_ms = settings.mining_budget.as_millis() as u64,
                    "Rule mining exceeded its time budget"
                );
                Err(AppError::Timeout(
                    "Rule mining exceeded its time budget".to_string(),
                ))
            }
        }
    }

    /// Cached rules, mining and repopulating the cache when the entry is missing or empty
    pub async fn load_rules(&self) -> AppResult<RuleSet> {
        cached!(
            self.cache,
            CacheKey::AssociationRules,
            self.settings.cache_ttl_secs,
            keep_if = RuleSet::has_rules,
            self.mine_rules()
        )
    }

    /// Recomputes the rules regardless of cache age and overwrites the cache entry
    ///
    /// Fails with `InsufficientData` when fewer than two transactions exist (the
    /// cache is left untouched) or when no rule clears both thresholds (the empty
    /// result is still written).
    pub async fn refresh_rules(&self) -> AppResult<RuleSet> {
        let _guard = self.refresh_lock.lock().await;

        let transactions = self.build_transactions().await?;
        if transactions.len() < 2 {
            tracing::warn!(transactions = transactions.len(), "Not enough transactions to mine rules");
            return Err(AppError::InsufficientData(format!(
                "{} valid transactions, at least 2 required",
                transactions.len()
            )));
        }

        let rule_set = self.mine_within_budget(transactions).await?;
        self.cache
            .set(&CacheKey::AssociationRules, &rule_set, self.settings.cache_ttl_secs)
            .await?;

        if !rule_set.has_rules() {
            return Err(AppError::InsufficientData(
                "No rules met the confidence and lift thresholds".to_string(),
            ));
        }

        tracing::info!(rules = rule_set.rules.len(), "Rule cache refreshed");
        Ok(rule_set)
    }

    /// Complementary items for the current selection, best first
    pub async fn recommend(&self, query: &RecommendationQuery) -> AppResult<Vec<Recommendation>> {
        if query.selected.is_empty() {
            return Err(AppError::InvalidInput("No gear IDs provided".to_string()));
        }

        let top_n = query.top_n.unwrap_or(self.settings.default_top_n);

        let rule_set = match self.load_rules().await {
            Ok(rule_set) => rule_set,
            Err(AppError::Timeout(msg)) => {
                tracing::warn!(reason = %msg, "Serving recommendations without rules");
                RuleSet::empty()
            }
            Err(e) => return Err(e),
        };

        let selected: Itemset = query.selected.iter().copied().collect();
        let candidate_ids: Vec<GearId> = matching_rules(&rule_set.rules, &selected)
            .flat_map(|rule| rule.consequent.iter().copied())
            .filter(|id| !selected.contains(id))
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        if candidate_ids.is_empty() {
            return Ok(Vec::new());
        }

        let items: HashMap<GearId, GearItem> = self
            .catalog
            .gear_by_ids(&candidate_ids)
            .await?
            .into_iter()
            .map(|item| (item.id, item))
            .collect();

        let recommendations =
            rank_candidates(&rule_set.rules, &selected, &items, &query.exclude, top_n);

        tracing::debug!(
            selected = selected.len(),
            returned = recommendations.len(),
            "Recommendations computed"
        );

        Ok(recommendations)
    }
}

fn matching_rules<'a>(
    rules: &'a [AssociationRule],
    selected: &'a Itemset,
) -> impl Iterator<Item = &'a AssociationRule> {
    rules
        .iter()
        .filter(move |rule| rule.antecedent.is_subset(selected))
}

/// Ranks the consequents of every rule whose antecedent lies within the selection
///
/// Selected items, items of excluded categories, and items missing from
/// `catalog` are skipped. An item reached by several rules keeps its best
/// score. Ties keep first-seen order.
pub fn rank_candidates(
    rules: &[AssociationRule],
    selected: &Itemset,
    catalog: &HashMap<GearId, GearItem>,
    exclude: &[GearCategory],
    top_n: usize,
) -> Vec<Recommendation> {
    let mut ranked: Vec<Recommendation> = Vec::new();
    let mut positions: HashMap<GearId, usize> = HashMap::new();

    for rule in matching_rules(rules, selected) {
        for id in &rule.consequent {
            if selected.contains(id) {
                continue;
            }
            let Some(item) = catalog.get(id) else {
                continue;
            };
            if exclude.contains(&item.category) {
                continue;
            }

            let candidate = Recommendation {
                gear: item.clone(),
                confidence: rule.confidence,
                lift: rule.lift,
                score: rule.score,
            };

            match positions.get(id) {
                Some(&pos) if ranked[pos].score >= candidate.score => {}
                Some(&pos) => ranked[pos] = candidate,
                None => {
                    positions.insert(*id, ranked.len());
                    ranked.push(candidate);
                }
            }
        }
    }

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(top_n);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::cache::MockCacheBackend;
    use crate::db::store::{MockBundleSource, MockCatalogStore};
    use crate::db::MemoryStore;
    use crate::models::{Bundle, SpecMap};
    use chrono::Utc;

    fn item(id: i64, category: GearCategory) -> GearItem {
        GearItem {
            id: GearId(id),
            name: format!("Item {}", id),
            category,
            brand: "Brand".to_string(),
            specs: SpecMap::default(),
            sentiment: 0.0,
            price: None,
            image_url: None,
        }
    }

    fn ids(raw: &[i64]) -> Itemset {
        raw.iter().copied().map(GearId).collect()
    }

    fn rule(antecedent: &[i64], consequent: &[i64], confidence: f64, lift: f64) -> AssociationRule {
        AssociationRule {
            antecedent: ids(antecedent),
            consequent: ids(consequent),
            support: 0.5,
            confidence,
            lift,
            score: confidence * lift,
        }
    }

    fn bundle(id: i64, gear: &[i64]) -> Bundle {
        Bundle {
            id,
            gear_ids: gear.iter().copied().map(GearId).collect(),
        }
    }

    /// 1 = mouse, 2 = keyboard, 3 = headset, 4 = monitor
    fn store(bundles: Vec<Bundle>) -> Arc<MemoryStore> {
        let gear = vec![
            item(1, GearCategory::Mouse),
            item(2, GearCategory::Keyboard),
            item(3, GearCategory::Headset),
            item(4, GearCategory::Monitor),
        ];
        Arc::new(MemoryStore::new(gear, bundles, Vec::new()))
    }

    fn engine_with(store: Arc<MemoryStore>, cache: Cache) -> RecommendationEngine {
        let settings = MiningSettings {
            min_support: 0.2,
            ..MiningSettings::default()
        };
        RecommendationEngine::new(store.clone(), store, cache, settings)
    }

    fn query(selected: &[i64]) -> RecommendationQuery {
        RecommendationQuery {
            selected: selected.iter().copied().map(GearId).collect(),
            ..RecommendationQuery::default()
        }
    }

    #[test]
    fn test_rank_candidates_scores_from_rule() {
        let catalog: HashMap<GearId, GearItem> =
            [(GearId(2), item(2, GearCategory::Keyboard))].into_iter().collect();
        let rules = vec![rule(&[1], &[2], 0.8, 1.5)];

        let ranked = rank_candidates(&rules, &ids(&[1]), &catalog, &[], 5);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].gear.id, GearId(2));
        assert!((ranked[0].score - 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_rank_candidates_skips_selected_consequents() {
        let catalog: HashMap<GearId, GearItem> =
            [(GearId(2), item(2, GearCategory::Keyboard))].into_iter().collect();
        let rules = vec![rule(&[1], &[2], 0.8, 1.5)];

        assert!(rank_candidates(&rules, &ids(&[1, 2]), &catalog, &[], 5).is_empty());
    }

    #[test]
    fn test_rank_candidates_dedups_keeping_best_score() {
        let catalog: HashMap<GearId, GearItem> = [
            (GearId(2), item(2, GearCategory::Keyboard)),
            (GearId(3), item(3, GearCategory::Headset)),
        ]
        .into_iter()
        .collect();
        let rules = vec![
            rule(&[1], &[3], 0.9, 1.4),
            rule(&[1], &[2], 0.5, 1.1),
            rule(&[1, 4], &[2], 0.9, 2.0),
        ];

        let ranked = rank_candidates(&rules, &ids(&[1, 4]), &catalog, &[], 5);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].gear.id, GearId(2));
        assert!((ranked[0].score - 1.8).abs() < 1e-9);
        assert_eq!(ranked[1].gear.id, GearId(3));
    }

    #[test]
    fn test_rank_candidates_honors_exclusions_and_limit() {
        let catalog: HashMap<GearId, GearItem> = [
            (GearId(2), item(2, GearCategory::Keyboard)),
            (GearId(3), item(3, GearCategory::Headset)),
            (GearId(4), item(4, GearCategory::Monitor)),
        ]
        .into_iter()
        .collect();
        let rules = vec![
            rule(&[1], &[2], 0.9, 1.5),
            rule(&[1], &[3], 0.8, 1.5),
            rule(&[1], &[4], 0.7, 1.5),
        ];

        let ranked = rank_candidates(&rules, &ids(&[1]), &catalog, &[GearCategory::Keyboard], 1);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].gear.id, GearId(3));
    }

    #[test]
    fn test_rank_candidates_skips_unknown_items() {
        let rules = vec![rule(&[1], &[99], 0.9, 1.5)];
        assert!(rank_candidates(&rules, &ids(&[1]), &HashMap::new(), &[], 5).is_empty());
    }

    #[tokio::test]
    async fn test_empty_selection_is_invalid_input() {
        let engine = engine_with(store(Vec::new()), Cache::in_memory());
        let result = engine.recommend(&query(&[])).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_recommend_uses_cached_rules() {
        let cache = Cache::in_memory();
        let rule_set = RuleSet {
            rules: vec![rule(&[1], &[2], 0.8, 1.5)],
            transaction_count: 10,
            itemset_count: 3,
            generated_at: Utc::now(),
        };
        cache
            .set(&CacheKey::AssociationRules, &rule_set, 60)
            .await
            .unwrap();

        // No bundles: any result must come from the cache
        let engine = engine_with(store(Vec::new()), cache);
        let recs = engine.recommend(&query(&[1])).await.unwrap();

        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].gear.id, GearId(2));
        assert!((recs[0].score - 1.2).abs() < 1e-9);

        let recs = engine.recommend(&query(&[1, 2])).await.unwrap();
        assert!(recs.is_empty());
    }

    #[tokio::test]
    async fn test_cache_miss_mines_and_repopulates() {
        let cache = Cache::in_memory();
        let bundles = vec![
            bundle(1, &[1, 2]),
            bundle(2, &[1, 2]),
            bundle(3, &[1, 2, 3]),
            bundle(4, &[3, 4]),
        ];
        let engine = engine_with(store(bundles), cache.clone());

        let recs = engine.recommend(&query(&[1])).await.unwrap();
        assert_eq!(recs[0].gear.id, GearId(2));

        let cached: Option<RuleSet> = cache.get_from_cache(&CacheKey::AssociationRules).await.unwrap();
        assert!(cached.map(|r| r.has_rules()).unwrap_or(false));
    }

    #[tokio::test]
    async fn test_unknown_selected_ids_are_ignored() {
        let bundles = vec![bundle(1, &[1, 2]), bundle(2, &[1, 2]), bundle(3, &[3, 4])];
        let engine = engine_with(store(bundles), Cache::in_memory());

        let recs = engine.recommend(&query(&[1, 999])).await.unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].gear.id, GearId(2));
    }

    #[tokio::test]
    async fn test_no_rules_yields_empty_list() {
        let engine = engine_with(store(Vec::new()), Cache::in_memory());
        let recs = engine.recommend(&query(&[1])).await.unwrap();
        assert!(recs.is_empty());
    }

    #[tokio::test]
    async fn test_failing_cache_degrades_to_mining() {
        let mut backend = MockCacheBackend::new();
        backend
            .expect_get()
            .returning(|_| Err(AppError::Internal("cache down".to_string())));
        backend.expect_set_in_background().returning(|_, _, _| ());

        let bundles = vec![bundle(1, &[1, 2]), bundle(2, &[1, 2]), bundle(3, &[3, 4])];
        let engine = engine_with(store(bundles), Cache::new(Arc::new(backend)));

        let recs = engine.recommend(&query(&[1])).await.unwrap();
        assert_eq!(recs[0].gear.id, GearId(2));
    }

    #[tokio::test]
    async fn test_refresh_is_deterministic() {
        let bundles = vec![
            bundle(1, &[1, 2, 3]),
            bundle(2, &[1, 2]),
            bundle(3, &[2, 3]),
            bundle(4, &[1, 3, 4]),
        ];
        let engine = engine_with(store(bundles), Cache::in_memory());

        let first = engine.refresh_rules().await.unwrap();
        let second = engine.refresh_rules().await.unwrap();
        assert_eq!(first.rules, second.rules);
        assert_eq!(first.transaction_count, 4);
    }

    #[tokio::test]
    async fn test_refresh_with_too_few_transactions_keeps_cache() {
        let cache = Cache::in_memory();
        let previous = RuleSet {
            rules: vec![rule(&[1], &[2], 0.8, 1.5)],
            transaction_count: 10,
            itemset_count: 3,
            generated_at: Utc::now(),
        };
        cache
            .set(&CacheKey::AssociationRules, &previous, 60)
            .await
            .unwrap();

        let engine = engine_with(store(vec![bundle(1, &[1, 2])]), cache.clone());
        let result = engine.refresh_rules().await;
        assert!(matches!(result, Err(AppError::InsufficientData(_))));

        let cached: Option<RuleSet> = cache.get_from_cache(&CacheKey::AssociationRules).await.unwrap();
        let cached = cached.expect("previous rules should survive");
        assert_eq!(cached.transaction_count, previous.transaction_count);
        assert_eq!(cached.rules.len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_without_rules_is_insufficient_data() {
        // Disjoint bundles: nothing co-occurs
        let bundles = vec![bundle(1, &[1]), bundle(2, &[2]), bundle(3, &[3])];
        let engine = engine_with(store(bundles), Cache::in_memory());

        let result = engine.refresh_rules().await;
        assert!(matches!(result, Err(AppError::InsufficientData(_))));
    }

    #[tokio::test]
    async fn test_build_transactions_reads_both_stores() {
        let mut bundles = MockBundleSource::new();
        bundles
            .expect_bundles()
            .times(1)
            .returning(|| Ok(vec![bundle(1, &[1, 2, 9]), bundle(2, &[9])]));
        let mut catalog = MockCatalogStore::new();
        catalog
            .expect_gear_ids()
            .times(1)
            .returning(|| Ok(HashSet::from([GearId(1), GearId(2)])));

        let engine = RecommendationEngine::new(
            Arc::new(catalog),
            Arc::new(bundles),
            Cache::in_memory(),
            MiningSettings::default(),
        );

        let transactions = engine.build_transactions().await.unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].items(), &ids(&[1, 2]));
    }

    #[tokio::test]
    async fn test_refresh_propagates_bundle_source_failure() {
        let mut bundles = MockBundleSource::new();
        bundles
            .expect_bundles()
            .returning(|| Err(AppError::Internal("bundles unavailable".to_string())));

        // Neither the catalog nor the cache may be touched
        let engine = RecommendationEngine::new(
            Arc::new(MockCatalogStore::new()),
            Arc::new(bundles),
            Cache::new(Arc::new(MockCacheBackend::new())),
            MiningSettings::default(),
        );

        let result = engine.refresh_rules().await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
