//! Memoizing generator decorator with a weight budget.
//!
//! [`CachedGenerator`] wraps any [`CandidateGenerator`] and remembers the
//! candidate sets it returned, up to a configured total weight.
//!
//! # Overview
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                    CachedGenerator<G>                          │
//! │  ┌───────────┬──────────────────────────────────────────────┐  │
//! │  │ delegate  │  Mutex<CacheState>                           │  │
//! │  │    G      │    store:     WeightedLru<Q, CandidateSet>   │  │
//! │  │           │    in_flight: FxHashMap<Q, Arc<Flight>>      │  │
//! │  │           │    stats:     CacheStats                     │  │
//! │  └───────────┴──────────────────────────────────────────────┘  │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **Hit**: the stored set is returned and the entry becomes most recently
//!   used.
//! - **Miss**: the first caller for a key registers a [`Flight`] and computes
//!   the value through the delegate with the lock released; concurrent callers
//!   for the same key wait on that flight instead of recomputing. Different
//!   keys load independently.
//! - **Failure**: a delegate error reaches every waiting caller and nothing is
//!   stored, so the next request retries the lookup.
//! - **Batch**: uncached keys are loaded with one call to the delegate's
//!   batch lookup.
//! - **Eviction**: least recently used entries are dropped until the total
//!   weight fits the budget. Values still being computed are not in the table
//!   and cannot be evicted.
//!
//! # Examples
//!
//! ```
//! use entity_linker::prelude::*;
//!
//! let kb = StaticMapGenerator::new([("Vienna".to_string(), ["/m/0fhp9".to_string()])]);
//! let cached = CacheBuilder::new().max_weight(1024).build(kb).unwrap();
//!
//! let first = cached.find_candidates(&"Vienna".to_string()).unwrap();
//! let second = cached.find_candidates(&"Vienna".to_string()).unwrap();
//! assert_eq!(first, second);
//! assert_eq!(cached.stats().loads, 1);
//! assert_eq!(cached.stats().hits, 1);
//! ```

mod flight;
mod store;
pub mod weigher;

use crate::candidate::{BatchResult, CandidateSet, Key};
use crate::error::{BuilderError, LinkError, Result};
use crate::generator::{CandidateGenerator, SharedGenerator};
use flight::Flight;
use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use store::{Insertion, WeightedLru};

pub use weigher::{string_weight, unit_weight, Weigher};

/// Default budget used with [`unit_weight`].
pub const DEFAULT_MAX_WEIGHT: usize = 1 << 16;

/// Default budget used with [`string_weight`].
pub const DEFAULT_STRING_MAX_WEIGHT: usize = 1 << 20;

/// Counters describing cache activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the table
    pub hits: u64,
    /// Lookups not answered from the table
    pub misses: u64,
    /// Values computed by the delegate and offered to the table
    pub loads: u64,
    /// Delegate computations that failed
    pub load_failures: u64,
    /// Entries dropped to respect the weight budget
    pub evictions: u64,
    /// Entries currently stored
    pub entries: usize,
    /// Sum of stored entry weights
    pub total_weight: usize,
}

impl CacheStats {
    /// Fraction of lookups answered from the table, or `0.0` before any
    /// lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct CacheState<Q, L> {
    store: WeightedLru<Q, L>,
    in_flight: FxHashMap<Q, Arc<Flight<L>>>,
    stats: CacheStats,
}

enum Role<L> {
    Leader(Arc<Flight<L>>),
    Follower(Arc<Flight<L>>),
}

/// Builder configuring the weight budget and weigher of a cache.
pub struct CacheBuilder<Q, L> {
    max_weight: usize,
    weigher: Weigher<Q, L>,
}

impl<Q: Key, L: Key> CacheBuilder<Q, L> {
    /// Builder using [`unit_weight`] and [`DEFAULT_MAX_WEIGHT`].
    pub fn new() -> Self {
        Self {
            max_weight: DEFAULT_MAX_WEIGHT,
            weigher: Arc::new(unit_weight::<Q, L>),
        }
    }

    /// Sets the total weight budget.
    pub fn max_weight(mut self, max_weight: usize) -> Self {
        self.max_weight = max_weight;
        self
    }

    /// Sets the entry weight function.
    pub fn weigher<F>(mut self, weigher: F) -> Self
    where
        F: Fn(&Q, &CandidateSet<L>) -> usize + Send + Sync + 'static,
    {
        self.weigher = Arc::new(weigher);
        self
    }

    /// Wraps `delegate` in a new cache.
    ///
    /// The delegate is wrapped even if it already caches. Use
    /// [`CacheBuilder::wrap`] on a [`SharedGenerator`] to avoid stacking caches.
    ///
    /// # Errors
    ///
    /// [`BuilderError::ZeroWeightBudget`] if the budget is zero.
    pub fn build<G>(self, delegate: G) -> std::result::Result<CachedGenerator<G>, BuilderError>
    where
        G: CandidateGenerator<Query = Q, Candidate = L>,
    {
        if self.max_weight == 0 {
            return Err(BuilderError::ZeroWeightBudget);
        }
        Ok(CachedGenerator::from_parts(delegate, self.max_weight, self.weigher))
    }

    /// Wraps a shared generator, returning it unchanged if it already caches.
    ///
    /// # Errors
    ///
    /// [`BuilderError::ZeroWeightBudget`] if the budget is zero.
    pub fn wrap(
        self,
        inner: SharedGenerator<Q, L>,
    ) -> std::result::Result<SharedGenerator<Q, L>, BuilderError> {
        if inner.is_cached() {
            tracing::warn!("ignoring attempt to cache-wrap a generator that is already cached");
            return Ok(inner);
        }
        Ok(Arc::new(self.build(inner)?))
    }
}

impl<Q, L> CacheBuilder<Q, L>
where
    Q: Key + AsRef<str>,
    L: Key + AsRef<str>,
{
    /// Builder using [`string_weight`] and [`DEFAULT_STRING_MAX_WEIGHT`].
    pub fn for_strings() -> Self {
        Self {
            max_weight: DEFAULT_STRING_MAX_WEIGHT,
            weigher: Arc::new(string_weight::<Q, L>),
        }
    }
}

impl<Q: Key, L: Key> Default for CacheBuilder<Q, L> {
    fn default() -> Self {
        Self::new()
    }
}

/// Memoizing, single-flight decorator around a candidate generator.
///
/// Internally synchronized: share it across threads behind an `Arc`.
pub struct CachedGenerator<G: CandidateGenerator> {
    delegate: G,
    weigher: Weigher<G::Query, G::Candidate>,
    state: Mutex<CacheState<G::Query, G::Candidate>>,
}

impl<G: CandidateGenerator> CachedGenerator<G> {
    /// Wraps `delegate` with [`unit_weight`] and [`DEFAULT_MAX_WEIGHT`].
    ///
    /// Always adds a cache layer, even over another `CachedGenerator`.
    /// [`CachedGenerator::wrap`] is the idempotent form.
    pub fn new(delegate: G) -> Self {
        Self::from_parts(
            delegate,
            DEFAULT_MAX_WEIGHT,
            Arc::new(unit_weight::<G::Query, G::Candidate>),
        )
    }

    fn from_parts(delegate: G, max_weight: usize, weigher: Weigher<G::Query, G::Candidate>) -> Self {
        Self {
            delegate,
            weigher,
            state: Mutex::new(CacheState {
                store: WeightedLru::new(max_weight),
                in_flight: FxHashMap::default(),
                stats: CacheStats::default(),
            }),
        }
    }

    /// Gets a reference to the inner generator.
    #[inline]
    pub fn delegate(&self) -> &G {
        &self.delegate
    }

    /// Snapshot of the activity counters.
    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        CacheStats {
            entries: state.store.len(),
            total_weight: state.store.total_weight(),
            ..state.stats
        }
    }

    /// Whether a value for `query` is stored. Does not affect recency.
    pub fn contains_key(&self, query: &G::Query) -> bool {
        self.state.lock().store.contains(query)
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.state.lock().store.len()
    }

    /// Returns `true` when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of stored entry weights.
    pub fn total_weight(&self) -> usize {
        self.state.lock().store.total_weight()
    }

    /// Configured weight budget.
    pub fn max_weight(&self) -> usize {
        self.state.lock().store.max_weight()
    }

    /// Drops every stored entry. Computations in progress are unaffected.
    pub fn clear(&self) {
        self.state.lock().store.clear();
    }

    fn load_one(&self, query: &G::Query) -> Result<CandidateSet<G::Candidate>> {
        panic::catch_unwind(AssertUnwindSafe(|| self.delegate.find_candidates(query)))
            .unwrap_or_else(|_| {
                Err(LinkError::Unexpected(format!(
                    "candidate computation for {:?} panicked",
                    query
                )))
            })
    }

    fn load_many(&self, queries: &[G::Query]) -> Result<BatchResult<G::Query, G::Candidate>> {
        panic::catch_unwind(AssertUnwindSafe(|| self.delegate.batch_find_candidates(queries)))
            .unwrap_or_else(|_| {
                Err(LinkError::Unexpected(
                    "batch candidate computation panicked".to_string(),
                ))
            })
    }

    /// Weighs a loaded value. Runs without the state lock held.
    fn weigh(&self, query: &G::Query, value: &CandidateSet<G::Candidate>) -> Result<usize> {
        panic::catch_unwind(AssertUnwindSafe(|| (self.weigher)(query, value))).map_err(|_| {
            LinkError::Unexpected(format!("weighing cache entry for {:?} panicked", query))
        })
    }

    /// Loads and weighs one value.
    fn load_weighed(&self, query: &G::Query) -> Result<(CandidateSet<G::Candidate>, usize)> {
        let value = self.load_one(query)?;
        let weight = self.weigh(query, &value)?;
        Ok((value, weight))
    }

    /// Stores a loaded value. Caller holds the state lock.
    fn store_loaded(
        &self,
        state: &mut CacheState<G::Query, G::Candidate>,
        query: &G::Query,
        value: &CandidateSet<G::Candidate>,
        weight: usize,
    ) {
        state.stats.loads += 1;
        match state.store.insert(query.clone(), value.clone(), weight) {
            Insertion::Stored { evicted } => {
                for (key, weight) in &evicted {
                    tracing::debug!(key = ?key, weight, "evicted cache entry");
                }
                state.stats.evictions += evicted.len() as u64;
            }
            Insertion::Oversized => {
                tracing::debug!(
                    key = ?query,
                    weight,
                    max_weight = state.store.max_weight(),
                    "entry exceeds cache budget, not stored"
                );
            }
        }
    }
}

impl<G: CandidateGenerator> CandidateGenerator for CachedGenerator<G> {
    type Query = G::Query;
    type Candidate = G::Candidate;

    fn find_candidates(&self, query: &Self::Query) -> Result<CandidateSet<Self::Candidate>> {
        let role = {
            let mut state = self.state.lock();
            if let Some(value) = state.store.get(query) {
                state.stats.hits += 1;
                tracing::trace!(key = ?query, "cache hit");
                return Ok(value);
            }
            state.stats.misses += 1;
            match state.in_flight.get(query) {
                Some(flight) => Role::Follower(Arc::clone(flight)),
                None => {
                    let flight = Arc::new(Flight::new());
                    state.in_flight.insert(query.clone(), Arc::clone(&flight));
                    Role::Leader(flight)
                }
            }
        };

        match role {
            Role::Follower(flight) => {
                tracing::trace!(key = ?query, "waiting on in-flight lookup");
                flight.wait()
            }
            Role::Leader(flight) => {
                tracing::trace!(key = ?query, "cache miss");
                let loaded = self.load_weighed(query);
                let outcome = {
                    let mut state = self.state.lock();
                    state.in_flight.remove(query);
                    match loaded {
                        Ok((value, weight)) => {
                            self.store_loaded(&mut state, query, &value, weight);
                            Ok(value)
                        }
                        Err(err) => {
                            state.stats.load_failures += 1;
                            Err(err)
                        }
                    }
                };
                flight.complete(outcome.clone());
                outcome
            }
        }
    }

    fn batch_find_candidates(
        &self,
        queries: &[Self::Query],
    ) -> Result<BatchResult<Self::Query, Self::Candidate>> {
        let mut results = BatchResult::with_capacity_and_hasher(queries.len(), Default::default());
        let mut claimed: FxHashSet<&Self::Query> = FxHashSet::default();
        let mut leading: Vec<(Self::Query, Arc<Flight<Self::Candidate>>)> = Vec::new();
        let mut following: Vec<(Self::Query, Arc<Flight<Self::Candidate>>)> = Vec::new();

        {
            let mut state = self.state.lock();
            for query in queries {
                if !claimed.insert(query) {
                    continue;
                }
                if let Some(value) = state.store.get(query) {
                    state.stats.hits += 1;
                    results.insert(query.clone(), value);
                    continue;
                }
                state.stats.misses += 1;
                match state.in_flight.get(query) {
                    Some(flight) => following.push((query.clone(), Arc::clone(flight))),
                    None => {
                        let flight = Arc::new(Flight::new());
                        state.in_flight.insert(query.clone(), Arc::clone(&flight));
                        leading.push((query.clone(), flight));
                    }
                }
            }
        }

        let mut first_error = None;
        if !leading.is_empty() {
            let keys: Vec<Self::Query> = leading.iter().map(|(q, _)| q.clone()).collect();
            tracing::trace!(count = keys.len(), "batch cache miss");
            let loaded = self.load_many(&keys);

            let weighed: Vec<_> = match loaded {
                Ok(mut loaded) => leading
                    .into_iter()
                    .map(|(query, flight)| {
                        let outcome = match loaded.remove(&query) {
                            Some(value) => self.weigh(&query, &value).map(|weight| (value, weight)),
                            None => Err(LinkError::Unexpected(format!(
                                "batch lookup returned no entry for {:?}",
                                query
                            ))),
                        };
                        (query, flight, outcome)
                    })
                    .collect(),
                Err(err) => leading
                    .into_iter()
                    .map(|(query, flight)| (query, flight, Err(err.clone())))
                    .collect(),
            };

            let mut completions = Vec::with_capacity(weighed.len());
            {
                let mut state = self.state.lock();
                for (query, flight, outcome) in weighed {
                    state.in_flight.remove(&query);
                    let outcome = match outcome {
                        Ok((value, weight)) => {
                            self.store_loaded(&mut state, &query, &value, weight);
                            results.insert(query, value.clone());
                            Ok(value)
                        }
                        Err(err) => {
                            state.stats.load_failures += 1;
                            first_error.get_or_insert_with(|| err.clone());
                            Err(err)
                        }
                    };
                    completions.push((flight, outcome));
                }
            }
            for (flight, outcome) in completions {
                flight.complete(outcome);
            }
        }

        if let Some(err) = first_error {
            return Err(err);
        }
        for (query, flight) in following {
            let value = flight.wait()?;
            results.insert(query, value);
        }
        Ok(results)
    }

    fn is_cached(&self) -> bool {
        true
    }
}

impl<Q: Key, L: Key> CachedGenerator<SharedGenerator<Q, L>> {
    /// Caches a shared generator with default settings, returning it
    /// unchanged if it already caches.
    pub fn wrap(inner: SharedGenerator<Q, L>) -> SharedGenerator<Q, L> {
        if inner.is_cached() {
            tracing::warn!("ignoring attempt to cache-wrap a generator that is already cached");
            return inner;
        }
        Arc::new(CachedGenerator::new(inner))
    }
}

impl<G: CandidateGenerator> fmt::Debug for CachedGenerator<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.stats();
        f.debug_struct("CachedGenerator")
            .field("entries", &stats.entries)
            .field("total_weight", &stats.total_weight)
            .field("max_weight", &self.max_weight())
            .finish()
    }
}
