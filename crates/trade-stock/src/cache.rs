//! Caching layer for market data to reduce API calls

use crate::api::{HistoricalPrice, IncomeStatement, MarketDataProvider, QuoteRecord};
use crate::config::StockConfig;
use crate::error::{Result, StockError};
use async_trait::async_trait;
use cached::{Cached, TimedCache};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Cache key for market-data requests
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    /// Ticker symbol
    pub symbol: String,
    /// Endpoint the value came from
    pub endpoint: String,
    /// Request parameters as a JSON string
    pub params: String,
}

impl CacheKey {
    /// Create a new cache key
    pub fn new(
        symbol: impl Into<String>,
        endpoint: impl Into<String>,
        params: impl Serialize,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            endpoint: endpoint.into(),
            params: serde_json::to_string(&params).unwrap_or_default(),
        }
    }
}

/// Thread-safe TTL cache of JSON values
#[derive(Clone)]
pub struct StockCache {
    cache: Arc<RwLock<TimedCache<CacheKey, serde_json::Value>>>,
}

impl StockCache {
    /// Create a new cache with specified TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Arc::new(RwLock::new(TimedCache::with_lifespan(ttl))),
        }
    }

    /// Get a live value from the cache
    pub async fn get(&self, key: &CacheKey) -> Option<serde_json::Value> {
        // expired entries are evicted on read, which needs the write lock
        let mut cache = self.cache.write().await;
        cache.cache_get(key).cloned()
    }

    /// Insert a value into the cache, dropping any entries that have expired
    pub async fn insert(&self, key: CacheKey, value: serde_json::Value) {
        let mut cache = self.cache.write().await;
        cache.flush();
        let _ = cache.cache_set(key, value);
    }

    /// Return the cached value, or run `fetcher` and cache what it returns
    ///
    /// Failed fetches are not cached.
    pub async fn get_or_fetch<F, Fut, E>(
        &self,
        key: CacheKey,
        fetcher: F,
    ) -> std::result::Result<serde_json::Value, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<serde_json::Value, E>>,
    {
        if let Some(value) = self.get(&key).await {
            tracing::debug!(?key, "Cache hit");
            return Ok(value);
        }

        tracing::debug!(?key, "Cache miss");
        let value = fetcher().await?;
        self.insert(key, value.clone()).await;
        Ok(value)
    }

    /// Clear all cached entries
    pub async fn clear(&self) {
        let mut cache = self.cache.write().await;
        cache.cache_clear();
    }

    /// Number of stored entries, expired ones included until the next insert
    pub async fn len(&self) -> usize {
        let cache = self.cache.read().await;
        cache.cache_size()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Two cache tiers: short-lived quotes and slow-moving statements and history
#[derive(Clone)]
pub struct CacheManager {
    /// Quotes
    pub realtime: StockCache,
    /// Income statements and daily closes
    pub fundamental: StockCache,
}

impl CacheManager {
    /// Create a new cache manager with specified TTLs
    pub fn new(realtime_ttl: Duration, fundamental_ttl: Duration) -> Self {
        Self {
            realtime: StockCache::new(realtime_ttl),
            fundamental: StockCache::new(fundamental_ttl),
        }
    }

    /// Cache manager using the TTLs of a configuration
    pub fn from_config(config: &StockConfig) -> Self {
        Self::new(config.cache_ttl_realtime, config.cache_ttl_fundamental)
    }

    /// Clear all caches
    pub async fn clear_all(&self) {
        self.realtime.clear().await;
        self.fundamental.clear().await;
    }
}

impl Default for CacheManager {
    fn default() -> Self {
        Self::from_config(&StockConfig::default())
    }
}

/// Provider decorator that serves repeated requests from a [`CacheManager`]
pub struct CachedProvider<P> {
    inner: P,
    caches: CacheManager,
}

impl<P: MarketDataProvider> CachedProvider<P> {
    pub fn new(inner: P, caches: CacheManager) -> Self {
        Self { inner, caches }
    }

    /// Wrap `inner` with caches sized from `config`
    pub fn from_config(inner: P, config: &StockConfig) -> Self {
        Self::new(inner, CacheManager::from_config(config))
    }

    pub fn caches(&self) -> &CacheManager {
        &self.caches
    }
}

async fn through_cache<T, Fut>(cache: &StockCache, key: CacheKey, fetch: Fut) -> Result<T>
where
    T: Serialize + DeserializeOwned + Send,
    Fut: Future<Output = Result<T>> + Send,
{
    let value = cache
        .get_or_fetch(key, || async move {
            let fetched = fetch.await?;
            Ok::<_, StockError>(serde_json::to_value(fetched)?)
        })
        .await?;
    Ok(serde_json::from_value(value)?)
}

#[async_trait]
impl<P: MarketDataProvider> MarketDataProvider for CachedProvider<P> {
    async fn quote(&self, symbol: &str) -> Result<QuoteRecord> {
        let key = CacheKey::new(symbol, "quote", ());
        through_cache(&self.caches.realtime, key, self.inner.quote(symbol)).await
    }

    async fn income_statements(&self, symbol: &str, limit: usize) -> Result<Vec<IncomeStatement>> {
        let key = CacheKey::new(symbol, "income-statement", limit);
        through_cache(
            &self.caches.fundamental,
            key,
            self.inner.income_statements(symbol, limit),
        )
        .await
    }

    async fn price_history(&self, symbol: &str, days: usize) -> Result<Vec<HistoricalPrice>> {
        let key = CacheKey::new(symbol, "historical-price-full", days);
        through_cache(
            &self.caches.fundamental,
            key,
            self.inner.price_history(symbol, days),
        )
        .await
    }
}
