use sqlx::{postgres::PgPoolOptions, PgPool};
use std::collections::{BTreeMap, HashSet};

use super::store::{BundleSource, CatalogStore};
use crate::error::AppResult;
use crate::models::{Bundle, GearCategory, GearId, GearItem, RawGearRecord, UsageLink};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

const GEAR_COLUMNS: &str = "gear_id::int8 AS id, name, type AS category, \
     COALESCE(brand, '') AS brand, COALESCE(specs, '{}'::jsonb) AS specs, \
     price::float8 AS price, image AS image_url";

/// Catalog and bundle source backed by the gear database
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_gear(&self, query: &str, bind: Option<Vec<i64>>) -> AppResult<Vec<GearItem>> {
        let q = sqlx::query_as::<_, RawGearRecord>(query);
        let q = match bind {
            Some(ids) => q.bind(ids),
            None => q,
        };
        let records = q.fetch_all(&self.pool).await?;
        Ok(records.into_iter().filter_map(RawGearRecord::into_item).collect())
    }
}

#[async_trait::async_trait]
impl CatalogStore for PgStore {
    async fn gear_in_category(&self, category: GearCategory) -> AppResult<Vec<GearItem>> {
        let query = format!(
            "SELECT {} FROM gaming_gear WHERE LOWER(type) = LOWER($1) ORDER BY gear_id",
            GEAR_COLUMNS
        );
        let records = sqlx::query_as::<_, RawGearRecord>(&query)
            .bind(category.as_str())
            .fetch_all(&self.pool)
            .await?;
        Ok(records.into_iter().filter_map(RawGearRecord::into_item).collect())
    }

    async fn gear_by_ids(&self, ids: &[GearId]) -> AppResult<Vec<GearItem>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT {} FROM gaming_gear WHERE gear_id::int8 = ANY($1) ORDER BY gear_id",
            GEAR_COLUMNS
        );
        let ids: Vec<i64> = ids.iter().map(|id| id.0).collect();
        self.fetch_gear(&query, Some(ids)).await
    }

    async fn gear_ids(&self) -> AppResult<HashSet<GearId>> {
        let ids: Vec<i64> = sqlx::query_scalar("SELECT gear_id::int8 FROM gaming_gear")
            .fetch_all(&self.pool)
            .await?;
        Ok(ids.into_iter().map(GearId).collect())
    }

    async fn usage_links(&self, category: GearCategory) -> AppResult<Vec<UsageLink>> {
        let rows: Vec<(i64, i64)> = sqlx::query_as(
            "SELECT p.player_id::int8, p.gear_id::int8 \
             FROM pro_player_gear p \
             JOIN gaming_gear g ON g.gear_id = p.gear_id \
             WHERE LOWER(g.type) = LOWER($1)",
        )
        .bind(category.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(player_id, gear_id)| UsageLink {
                player_id,
                gear_id: GearId(gear_id),
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl BundleSource for PgStore {
    async fn bundles(&self) -> AppResult<Vec<Bundle>> {
        let rows: Vec<(i64, i64)> = sqlx::query_as(
            "SELECT preset_id::int8, gear_id::int8 FROM preset_gear \
             ORDER BY preset_id, gear_id",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: BTreeMap<i64, Vec<GearId>> = BTreeMap::new();
        for (preset_id, gear_id) in rows {
            grouped.entry(preset_id).or_default().push(GearId(gear_id));
        }

        tracing::debug!(bundles = grouped.len(), "Loaded bundles from database");

        Ok(grouped
            .into_iter()
            .map(|(id, gear_ids)| Bundle { id, gear_ids })
            .collect())
    }
}
