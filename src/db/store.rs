use std::collections::HashSet;

use crate::error::AppResult;
use crate::models::{Bundle, GearCategory, GearId, GearItem, UsageLink};

/// Read access to the gear catalog and professional usage data
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    /// All items of one category, in ascending ID order
    async fn gear_in_category(&self, category: GearCategory) -> AppResult<Vec<GearItem>>;

    /// Items with the given IDs; unknown IDs are skipped
    async fn gear_by_ids(&self, ids: &[GearId]) -> AppResult<Vec<GearItem>>;

    /// IDs of every item currently in the catalog
    async fn gear_ids(&self) -> AppResult<HashSet<GearId>>;

    /// Professional player links to items of one category
    async fn usage_links(&self, category: GearCategory) -> AppResult<Vec<UsageLink>>;
}

/// Supplies the curated bundles used as mining input
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait BundleSource: Send + Sync {
    async fn bundles(&self) -> AppResult<Vec<Bundle>>;
}
