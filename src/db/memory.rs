use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use super::store::{BundleSource, CatalogStore};
use crate::error::AppResult;
use crate::models::{Bundle, GearCategory, GearId, GearItem, RawGearRecord, UsageLink};

/// Catalog contents as loaded from a JSON seed file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CatalogSeed {
    pub gear: Vec<RawGearRecord>,
    pub bundles: Vec<Bundle>,
    pub usage: Vec<UsageLink>,
}

/// Catalog and bundle source held entirely in memory
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    gear: Vec<GearItem>,
    bundles: Vec<Bundle>,
    usage: Vec<UsageLink>,
}

impl MemoryStore {
    pub fn new(gear: Vec<GearItem>, bundles: Vec<Bundle>, usage: Vec<UsageLink>) -> Self {
        let mut gear = gear;
        gear.sort_by_key(|item| item.id);
        gear.dedup_by_key(|item| item.id);
        Self {
            gear,
            bundles,
            usage,
        }
    }

    /// Normalizes seed records, dropping those with an unknown category
    pub fn from_seed(seed: CatalogSeed) -> Self {
        let gear = seed
            .gear
            .into_iter()
            .filter_map(RawGearRecord::into_item)
            .collect();
        Self::new(gear, seed.bundles, seed.usage)
    }

    pub fn from_seed_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read catalog seed {}: {}", path.display(), e))?;
        let seed: CatalogSeed = serde_json::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("Invalid catalog seed {}: {}", path.display(), e))?;
        let store = Self::from_seed(seed);
        tracing::info!(
            gear = store.gear.len(),
            bundles = store.bundles.len(),
            usage = store.usage.len(),
            "Loaded catalog seed"
        );
        Ok(store)
    }
}

#[async_trait::async_trait]
impl CatalogStore for MemoryStore {
    async fn gear_in_category(&self, category: GearCategory) -> AppResult<Vec<GearItem>> {
        Ok(self
            .gear
            .iter()
            .filter(|item| item.category == category)
            .cloned()
            .collect())
    }

    async fn gear_by_ids(&self, ids: &[GearId]) -> AppResult<Vec<GearItem>> {
        let wanted: HashSet<GearId> = ids.iter().copied().collect();
        Ok(self
            .gear
            .iter()
            .filter(|item| wanted.contains(&item.id))
            .cloned()
            .collect())
    }

    async fn gear_ids(&self) -> AppResult<HashSet<GearId>> {
        Ok(self.gear.iter().map(|item| item.id).collect())
    }

    async fn usage_links(&self, category: GearCategory) -> AppResult<Vec<UsageLink>> {
        let in_category: HashSet<GearId> = self
            .gear
            .iter()
            .filter(|item| item.category == category)
            .map(|item| item.id)
            .collect();
        Ok(self
            .usage
            .iter()
            .filter(|link| in_category.contains(&link.gear_id))
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl BundleSource for MemoryStore {
    async fn bundles(&self) -> AppResult<Vec<Bundle>> {
        Ok(self.bundles.clone())
    }
}
