use std::sync::Arc;

use crate::config::Config;
use crate::db::{BundleSource, Cache, CatalogStore};
use crate::services::{RecommendationEngine, ScorerSet, VariantComposer};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RecommendationEngine>,
    pub composer: Arc<VariantComposer>,
    /// Token guarding the rule refresh endpoint; `None` disables it
    pub admin_token: Option<Arc<str>>,
}

impl AppState {
    /// Wires the engines to their collaborators
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        bundles: Arc<dyn BundleSource>,
        cache: Cache,
        config: &Config,
    ) -> Self {
        let engine = RecommendationEngine::new(
            catalog.clone(),
            bundles,
            cache,
            config.mining_settings(),
        );
        let composer =
            VariantComposer::new(catalog, ScorerSet::default(), config.variant_score_ceiling);

        Self {
            engine: Arc::new(engine),
            composer: Arc::new(composer),
            admin_token: config
                .admin_token
                .as_deref()
                .filter(|token| !token.is_empty())
                .map(Arc::from),
        }
    }
}
