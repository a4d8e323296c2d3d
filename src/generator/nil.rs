//! Generator that never finds anything.

use super::CandidateGenerator;
use crate::candidate::{BatchResult, CandidateSet, Key};
use crate::error::Result;
use std::fmt;
use std::marker::PhantomData;

/// Generator that returns the empty set for every query.
///
/// Used as the terminal fallback of the static generators and as a
/// placeholder child in collections.
pub struct NilGenerator<Q, L> {
    _marker: PhantomData<fn() -> (Q, L)>,
}

impl<Q, L> NilGenerator<Q, L> {
    /// Creates a new nil generator.
    #[inline]
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<Q, L> Default for NilGenerator<Q, L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Q, L> Clone for NilGenerator<Q, L> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<Q, L> Copy for NilGenerator<Q, L> {}

impl<Q, L> fmt::Debug for NilGenerator<Q, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NilGenerator")
    }
}

impl<Q: Key, L: Key> CandidateGenerator for NilGenerator<Q, L> {
    type Query = Q;
    type Candidate = L;

    #[inline]
    fn find_candidates(&self, _query: &Q) -> Result<CandidateSet<L>> {
        Ok(CandidateSet::new())
    }

    fn batch_find_candidates(&self, queries: &[Q]) -> Result<BatchResult<Q, L>> {
        Ok(queries
            .iter()
            .map(|query| (query.clone(), CandidateSet::new()))
            .collect())
    }
}
