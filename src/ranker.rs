//! Candidate ranking.
//!
//! A [`CandidateRanker`] orders the candidate set produced for a query. The
//! ranked list is a permutation of the input: rankers never add or drop
//! candidates.

use crate::candidate::{CandidateSet, Key};
use crate::error::Result;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::sync::Arc;

/// Orders candidates for a query, best first.
pub trait CandidateRanker<Q, L>: Send + Sync
where
    Q: Key,
    L: Key,
{
    /// Returns every candidate exactly once, best first.
    ///
    /// # Errors
    ///
    /// Only rankers consulting an external source can fail, with
    /// [`LinkError::Lookup`](crate::error::LinkError::Lookup).
    fn rank_candidates(&self, query: &Q, candidates: &CandidateSet<L>) -> Result<Vec<L>>;
}

impl<Q: Key, L: Key, R: CandidateRanker<Q, L> + ?Sized> CandidateRanker<Q, L> for &R {
    #[inline]
    fn rank_candidates(&self, query: &Q, candidates: &CandidateSet<L>) -> Result<Vec<L>> {
        (**self).rank_candidates(query, candidates)
    }
}

impl<Q: Key, L: Key, R: CandidateRanker<Q, L> + ?Sized> CandidateRanker<Q, L> for Box<R> {
    #[inline]
    fn rank_candidates(&self, query: &Q, candidates: &CandidateSet<L>) -> Result<Vec<L>> {
        (**self).rank_candidates(query, candidates)
    }
}

impl<Q: Key, L: Key, R: CandidateRanker<Q, L> + ?Sized> CandidateRanker<Q, L> for Arc<R> {
    #[inline]
    fn rank_candidates(&self, query: &Q, candidates: &CandidateSet<L>) -> Result<Vec<L>> {
        (**self).rank_candidates(query, candidates)
    }
}

/// Shared ranker trait object.
pub type SharedRanker<Q, L> = Arc<dyn CandidateRanker<Q, L>>;

/// Keeps the order in which the generator produced the candidates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRanker;

impl NullRanker {
    /// Creates a new identity ranker.
    pub fn new() -> Self {
        Self
    }
}

impl<Q: Key, L: Key> CandidateRanker<Q, L> for NullRanker {
    fn rank_candidates(&self, _query: &Q, candidates: &CandidateSet<L>) -> Result<Vec<L>> {
        Ok(candidates.iter().cloned().collect())
    }
}

/// Orders candidates uniformly at random.
///
/// The random source is injectable: a seeded ranker yields the same sequence
/// of permutations on every run, which keeps tests reproducible. Calls from
/// several threads draw from the one source in turn.
///
/// # Examples
///
/// ```
/// use entity_linker::prelude::*;
///
/// let candidates: CandidateSet<u32> = (0..10).collect();
/// let a = RandomRanker::with_seed(7).rank_candidates(&"q", &candidates).unwrap();
/// let b = RandomRanker::with_seed(7).rank_candidates(&"q", &candidates).unwrap();
/// assert_eq!(a, b);
/// ```
pub struct RandomRanker<R = StdRng> {
    rng: Mutex<R>,
}

impl RandomRanker<StdRng> {
    /// Ranker seeded from operating-system entropy.
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Deterministic ranker for the given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for RandomRanker<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> RandomRanker<R> {
    /// Ranker drawing from the given source.
    pub fn from_rng(rng: R) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }
}

impl<Q, L, R> CandidateRanker<Q, L> for RandomRanker<R>
where
    Q: Key,
    L: Key,
    R: Rng + Send,
{
    fn rank_candidates(&self, _query: &Q, candidates: &CandidateSet<L>) -> Result<Vec<L>> {
        let mut ranked: Vec<L> = candidates.iter().cloned().collect();
        let mut rng = self.rng.lock();
        // Fisher-Yates over the copy
        for i in (1..ranked.len()).rev() {
            let j = rng.gen_range(0..=i);
            ranked.swap(i, j);
        }
        Ok(ranked)
    }
}

impl<R> fmt::Debug for RandomRanker<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomRanker").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    fn ids(n: u32) -> CandidateSet<u32> {
        (0..n).collect()
    }

    #[test]
    fn test_null_ranker_preserves_order() {
        let candidates: CandidateSet<&str> = ["k2", "k1", "k3"].into_iter().collect();
        let ranked = NullRanker.rank_candidates(&"q", &candidates).unwrap();
        assert_eq!(ranked, vec!["k2", "k1", "k3"]);
    }

    #[test]
    fn test_null_ranker_empty() {
        let ranked = NullRanker.rank_candidates(&"q", &ids(0)).unwrap();
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_random_ranker_is_permutation() {
        let ranker = RandomRanker::with_seed(42);
        let candidates = ids(50);
        let mut ranked = ranker.rank_candidates(&"q", &candidates).unwrap();
        assert_eq!(ranked.len(), 50);
        ranked.sort_unstable();
        assert_eq!(ranked, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_random_ranker_seed_is_deterministic() {
        let candidates = ids(20);
        let runs: Vec<Vec<Vec<u32>>> = (0..3)
            .map(|_| {
                let ranker = RandomRanker::with_seed(1234);
                (0..4)
                    .map(|_| ranker.rank_candidates(&"q", &candidates).unwrap())
                    .collect()
            })
            .collect();
        assert_eq!(runs[0], runs[1]);
        assert_eq!(runs[1], runs[2]);
    }

    #[test]
    fn test_random_ranker_returns_shuffled_copy() {
        let candidates = ids(20);
        let ranker = RandomRanker::with_seed(9);
        let shuffled = (0..10)
            .map(|_| ranker.rank_candidates(&"q", &candidates).unwrap())
            .any(|ranked| ranked != candidates.clone().into_vec());
        assert!(shuffled);
        // Input is untouched
        assert_eq!(candidates.into_vec(), (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_random_ranker_custom_source() {
        let ranker = RandomRanker::from_rng(StepRng::new(0, 0));
        let ranked = ranker.rank_candidates(&"q", &ids(5)).unwrap();
        assert_eq!(ranked.len(), 5);
    }

    #[test]
    fn test_shared_ranker() {
        let ranker: SharedRanker<&str, u32> = Arc::new(NullRanker);
        assert_eq!(ranker.rank_candidates(&"q", &ids(3)).unwrap(), vec![0, 1, 2]);
    }
}
