/// A macro to simplify read-through caching.
///
/// Looks the key up in the cache and returns the cached value when one is found
/// (and, in the `keep_if` form, when the predicate accepts it). Otherwise the
/// provided future is awaited, its value stored in the background, and returned.
///
/// A failing cache read is logged and treated as a miss, so an unreachable cache
/// degrades to recomputation instead of failing the caller.
///
/// # Arguments
/// * `$cache`: The cache instance. Must have `get_from_cache` and `set_in_background` methods.
/// * `$key`: The key to use for caching the value.
/// * `$ttl`: The time-to-live (TTL) for the cached value in seconds.
/// * `keep_if = $keep`: Optional predicate; a cached value it rejects counts as a miss.
/// * `$block`: The future computing the value on a miss.
///
/// # Example
/// ```rust,ignore
/// let rules: AppResult<RuleSet> = cached!(cache, CacheKey::AssociationRules, ttl,
///     keep_if = RuleSet::has_rules,
///     async { mine_rules().await });
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, keep_if = $keep:expr, $block:expr) => {{
        let hit = match $cache.get_from_cache(&$key).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(error = %e, key = %$key, "Cache read failed, recomputing");
                None
            }
        };

        match hit {
            Some(cached) if ($keep)(&cached) => Ok(cached),
            _ => {
                // Not in cache (or rejected): compute, then store without waiting
                let value = $block.await?;
                $cache.set_in_background(&$key, &value, $ttl);
                Ok(value)
            }
        }
    }};
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {
        $crate::cached!($cache, $key, $ttl, keep_if = |_: &_| true, $block)
    };
}
