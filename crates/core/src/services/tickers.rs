use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use log::warn;

use crate::errors::CoreError;
use crate::models::config::Period;
use crate::models::ticker::ResolvedTicker;
use crate::providers::traits::QuoteProvider;

/// Upper bound on memoized resolutions; oldest entries are evicted first.
const CACHE_CAPACITY: usize = 100;

type CacheKey = (String, Period);

/// Resolves ticker symbols against the quote provider, memoizing the
/// result for the duration of a render pass.
///
/// Resolution is idempotent: the second lookup of a symbol within one
/// pass returns the cached profile/history without touching the network.
/// The cache is an explicit, bounded object owned by this service — not
/// an ambient global.
pub struct TickerService {
    provider: Arc<dyn QuoteProvider>,
    cache: Mutex<TickerCache>,
}

struct TickerCache {
    entries: HashMap<CacheKey, ResolvedTicker>,
    order: VecDeque<CacheKey>,
}

impl TickerService {
    pub fn new(provider: Arc<dyn QuoteProvider>) -> Self {
        Self {
            provider,
            cache: Mutex::new(TickerCache {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    /// Resolve a symbol: profile, close history over `period`, and
    /// dividend events. Cached per (symbol, period).
    pub async fn resolve(
        &self,
        symbol: &str,
        period: Period,
    ) -> Result<ResolvedTicker, CoreError> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(CoreError::TickerNotFound("<empty symbol>".into()));
        }

        let key = (symbol.to_uppercase(), period);
        if let Ok(cache) = self.cache.lock() {
            if let Some(resolved) = cache.entries.get(&key) {
                return Ok(resolved.clone());
            }
        }

        let profile = self.provider.profile(symbol).await?;
        let history = self.provider.history(symbol, period).await?;

        // Dividend events only decorate the chart; their absence must
        // not sink the whole resolution.
        let dividends = match self.provider.dividends(symbol, period).await {
            Ok(series) => series,
            Err(e) => {
                warn!("could not fetch dividends for {symbol}: {e}");
                Default::default()
            }
        };

        let resolved = ResolvedTicker {
            profile,
            history,
            dividends,
        };

        if let Ok(mut cache) = self.cache.lock() {
            if cache.entries.len() >= CACHE_CAPACITY {
                if let Some(oldest) = cache.order.pop_front() {
                    cache.entries.remove(&oldest);
                }
            }
            if cache.entries.insert(key.clone(), resolved.clone()).is_none() {
                cache.order.push_back(key);
            }
        }

        Ok(resolved)
    }

    /// Number of memoized resolutions (for diagnostics and tests).
    pub fn cached_count(&self) -> usize {
        self.cache.lock().map(|c| c.entries.len()).unwrap_or(0)
    }

    /// Drop all memoized resolutions.
    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.entries.clear();
            cache.order.clear();
        }
    }
}
