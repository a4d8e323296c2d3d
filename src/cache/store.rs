//! Weight-bounded LRU entry table.
//!
//! Entries carry a weight estimated when they are stored. Inserting an entry
//! evicts least-recently-used entries until the total weight fits the budget.
//! An entry heavier than the whole budget is not stored at all.

use crate::candidate::{CandidateSet, Key};
use lru::LruCache;

#[derive(Debug, Clone)]
struct Entry<L> {
    value: CandidateSet<L>,
    weight: usize,
}

/// Outcome of [`WeightedLru::insert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Insertion<Q> {
    /// Stored; lists `(key, weight)` of every entry evicted to make room.
    Stored { evicted: Vec<(Q, usize)> },
    /// Not stored because the entry alone exceeds the budget.
    Oversized,
}

pub(crate) struct WeightedLru<Q, L> {
    entries: LruCache<Q, Entry<L>>,
    total_weight: usize,
    max_weight: usize,
}

impl<Q: Key, L: Key> WeightedLru<Q, L> {
    pub(crate) fn new(max_weight: usize) -> Self {
        Self {
            entries: LruCache::unbounded(),
            total_weight: 0,
            max_weight,
        }
    }

    /// Looks up `key`, marking it most recently used.
    pub(crate) fn get(&mut self, key: &Q) -> Option<CandidateSet<L>> {
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Checks for `key` without touching recency.
    pub(crate) fn contains(&self, key: &Q) -> bool {
        self.entries.contains(key)
    }

    pub(crate) fn insert(&mut self, key: Q, value: CandidateSet<L>, weight: usize) -> Insertion<Q> {
        if weight > self.max_weight {
            if let Some(stale) = self.entries.pop(&key) {
                self.total_weight -= stale.weight;
            }
            return Insertion::Oversized;
        }

        if let Some((_, replaced)) = self.entries.push(key, Entry { value, weight }) {
            self.total_weight -= replaced.weight;
        }
        self.total_weight += weight;

        let mut evicted = Vec::new();
        while self.total_weight > self.max_weight {
            match self.entries.pop_lru() {
                Some((key, entry)) => {
                    self.total_weight -= entry.weight;
                    evicted.push((key, entry.weight));
                }
                None => break,
            }
        }
        Insertion::Stored { evicted }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn total_weight(&self) -> usize {
        self.total_weight
    }

    pub(crate) fn max_weight(&self) -> usize {
        self.max_weight
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.total_weight = 0;
    }
}
