//! Identity decorator that forwards every call to its delegate.
//!
//! The `ForwardingGenerator` adds no behaviour of its own. It is useful for:
//!
//! - A uniform type when a decorator is conditionally applied
//! - Measuring decorator overhead in benchmarks
//! - A starting point for behaviour-adding decorators, which own their inner
//!   generator the same way
//!
//! # Examples
//!
//! ```
//! use entity_linker::prelude::*;
//!
//! let kb = StaticSetGenerator::new(["Lisbon".to_string()]);
//! let wrapped = ForwardingGenerator::new(kb);
//!
//! // Behaves exactly like the inner generator
//! assert_eq!(wrapped.find_candidates(&"Lisbon".to_string()).unwrap().len(), 1);
//! ```

use super::CandidateGenerator;
use crate::candidate::{BatchResult, CandidateSet};
use crate::error::Result;

/// Identity wrapper around a candidate generator.
#[derive(Debug, Clone)]
pub struct ForwardingGenerator<G> {
    delegate: G,
}

impl<G> ForwardingGenerator<G> {
    /// Wraps the given generator.
    #[inline]
    pub fn new(delegate: G) -> Self {
        Self { delegate }
    }

    /// Gets a reference to the inner generator.
    #[inline]
    pub fn delegate(&self) -> &G {
        &self.delegate
    }

    /// Unwraps the inner generator.
    #[inline]
    pub fn into_inner(self) -> G {
        self.delegate
    }
}

impl<G> CandidateGenerator for ForwardingGenerator<G>
where
    G: CandidateGenerator,
{
    type Query = G::Query;
    type Candidate = G::Candidate;

    #[inline]
    fn find_candidates(&self, query: &Self::Query) -> Result<CandidateSet<Self::Candidate>> {
        self.delegate.find_candidates(query)
    }

    #[inline]
    fn batch_find_candidates(
        &self,
        queries: &[Self::Query],
    ) -> Result<BatchResult<Self::Query, Self::Candidate>> {
        self.delegate.batch_find_candidates(queries)
    }

    #[inline]
    fn is_cached(&self) -> bool {
        self.delegate.is_cached()
    }
}
