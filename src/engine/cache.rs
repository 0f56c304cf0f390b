//! Caller-side memoization of forecast results.
//!
//! The engine is a pure function of history, partial period and
//! configuration, so a result can be reused whenever all three match. The
//! cache sits outside the pipeline; [`ForecastEngine`] never consults it.

use super::config::ForecastConfig;
use super::orchestrator::ForecastEngine;
use super::result::{ForecastResult, PartialPeriod};
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, VecDeque};
use std::hash::{Hash, Hasher};
use tracing::debug;

/// Hit/miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub evictions: usize,
}

/// Exact inputs of a cached run, compared bit for bit on lookup.
#[derive(Debug, Clone, PartialEq)]
struct CacheKey {
    history: Vec<u64>,
    partial: Option<(u64, u64)>,
    config: ForecastConfig,
}

impl CacheKey {
    fn new(config: &ForecastConfig, history: &[f64], partial: Option<PartialPeriod>) -> Self {
        Self {
            history: history.iter().map(|v| v.to_bits()).collect(),
            partial: partial.map(|p| (p.elapsed_fraction.to_bits(), p.observed_value.to_bits())),
            config: config.clone(),
        }
    }

    fn digest(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.history.hash(&mut hasher);
        self.partial.hash(&mut hasher);
        hash_config(&self.config, &mut hasher);
        hasher.finish()
    }
}

struct CacheEntry {
    key: CacheKey,
    result: ForecastResult,
}

/// Least-recently-used cache of [`ForecastResult`]s.
///
/// # Example
/// ```
/// use demand_forecast::engine::{ForecastCache, ForecastEngine};
///
/// let engine = ForecastEngine::default();
/// let mut cache = ForecastCache::new(16);
/// let history = vec![100.0; 24];
///
/// let first = cache.get_or_run(&engine, &history, None);
/// let second = cache.get_or_run(&engine, &history, None);
/// assert_eq!(first, second);
/// assert_eq!(cache.stats().hits, 1);
/// ```
pub struct ForecastCache {
    capacity: usize,
    entries: HashMap<u64, CacheEntry>,
    access_order: VecDeque<u64>,
    stats: CacheStats,
}

impl ForecastCache {
    /// Create a cache holding at most `capacity` results (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            access_order: VecDeque::new(),
            stats: CacheStats::default(),
        }
    }

    /// Return the cached result for these inputs, running the engine on a miss.
    pub fn get_or_run(
        &mut self,
        engine: &ForecastEngine,
        history: &[f64],
        partial: Option<PartialPeriod>,
    ) -> ForecastResult {
        let key = CacheKey::new(engine.config(), history, partial);
        let digest = key.digest();

        let cached = self
            .entries
            .get(&digest)
            .filter(|entry| entry.key == key)
            .map(|entry| entry.result.clone());
        if let Some(result) = cached {
            self.stats.hits += 1;
            self.touch(digest);
            return result;
        }

        self.stats.misses += 1;
        let result = engine.run(history, partial);
        self.insert(digest, key, result.clone());
        result
    }

    /// Look up a result without running the engine.
    pub fn get(
        &mut self,
        config: &ForecastConfig,
        history: &[f64],
        partial: Option<PartialPeriod>,
    ) -> Option<&ForecastResult> {
        let key = CacheKey::new(config, history, partial);
        let digest = key.digest();

        let hit = self.entries.get(&digest).is_some_and(|e| e.key == key);
        if hit {
            self.stats.hits += 1;
            self.touch(digest);
        } else {
            self.stats.misses += 1;
        }
        self.entries
            .get(&digest)
            .filter(|_| hit)
            .map(|entry| &entry.result)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.access_order.clear();
    }

    fn insert(&mut self, digest: u64, key: CacheKey, result: ForecastResult) {
        if self.entries.remove(&digest).is_some() {
            self.access_order.retain(|&d| d != digest);
        }
        while self.entries.len() >= self.capacity {
            let Some(oldest) = self.access_order.pop_back() else {
                break;
            };
            self.entries.remove(&oldest);
            self.stats.evictions += 1;
            debug!(evicted = oldest, "forecast cache eviction");
        }
        self.entries.insert(digest, CacheEntry { key, result });
        self.access_order.push_front(digest);
    }

    fn touch(&mut self, digest: u64) {
        self.access_order.retain(|&d| d != digest);
        self.access_order.push_front(digest);
    }
}

/// Hash every configuration field that influences a result.
fn hash_config<H: Hasher>(config: &ForecastConfig, state: &mut H) {
    use super::config::ParameterSelection;

    config.season_length.hash(state);
    config.horizon.hash(state);
    config.periods_per_year.hash(state);
    config.outlier_sensitivity.to_bits().hash(state);
    match config.parameters {
        ParameterSelection::Search => {
            0u8.hash(state);
            for axis in [&config.grid.alpha, &config.grid.beta, &config.grid.gamma] {
                axis.len().hash(state);
                axis.iter().for_each(|v| v.to_bits().hash(state));
            }
        }
        ParameterSelection::Manual(p) => {
            1u8.hash(state);
            [p.alpha(), p.beta(), p.gamma()]
                .iter()
                .for_each(|v| v.to_bits().hash(state));
        }
    }
    config.blend.model_weight.to_bits().hash(state);
    config.blend.min_elapsed_fraction.to_bits().hash(state);
    config.backtest.min_train_size.hash(state);
    config.backtest.step.hash(state);
    let policy = &config.classification;
    for t in [
        policy.high_confidence,
        policy.medium_confidence,
        policy.excellent,
        policy.good,
        policy.fair,
    ] {
        t.smape.to_bits().hash(state);
        t.mase.to_bits().hash(state);
    }
    config.interval_level.to_bits().hash(state);
}
