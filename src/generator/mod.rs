//! Candidate generator abstractions and implementations.
//!
//! A [`CandidateGenerator`] maps a query to the set of knowledge-base
//! identifiers that might denote it. Leaf generators answer from a fixed table
//! or an external search service; decorators wrap another generator and add
//! behaviour (alias rewriting, caching); a [`GeneratorCollection`] combines
//! several children under an aggregation algebra.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  AliasMappingGenerator<G>   rewrite query via alias table │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │  CachedGenerator<G>      memoize, single-flight    │  │
//! │  │  ┌──────────────────────────────────────────────┐  │  │
//! │  │  │  GeneratorCollection   FIRST / UNION / ∩     │  │  │
//! │  │  │    ├─ RemoteGenerator<C>                     │  │  │
//! │  │  │    └─ StaticMapGenerator                     │  │  │
//! │  │  └──────────────────────────────────────────────┘  │  │
//! │  └────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Decorators own their inner generator by value, so chains are ordinary
//! nested types (`AliasMappingGenerator<CachedGenerator<RemoteGenerator<C>>>`)
//! or, when assembled from configuration, trait objects behind
//! [`SharedGenerator`].
//!
//! # Examples
//!
//! ```
//! use entity_linker::prelude::*;
//!
//! let kb = StaticMapGenerator::new([("Paris".to_string(), ["/m/05qtj".to_string()])]);
//! let aliases = AliasTable::from_pairs([("City of Light".to_string(), "Paris".to_string())]);
//! let generator = AliasMappingGenerator::new(kb, aliases, true);
//!
//! let found = generator.find_candidates(&"City of Light".to_string()).unwrap();
//! assert!(found.contains(&"/m/05qtj".to_string()));
//! ```

use crate::candidate::{BatchResult, CandidateSet, Key};
use crate::error::Result;
use std::sync::Arc;

pub mod alias;
pub mod collection;
pub mod fixed;
pub mod forwarding;
pub mod nil;
pub mod remote;

pub use alias::{AliasMappingGenerator, AliasTable};
pub use collection::{AggregationMethod, GeneratorCollection, GeneratorCollectionBuilder};
pub use fixed::{StaticMapGenerator, StaticSetGenerator};
pub use forwarding::ForwardingGenerator;
pub use nil::NilGenerator;
pub use remote::{RemoteGenerator, SearchClient};

/// Core candidate generation abstraction.
///
/// Implementations are immutable (or internally synchronized) and are shared
/// across threads, hence the `Send + Sync` bound.
///
/// # Contract
///
/// - An unmatched query yields the empty set, never an error.
/// - A failing underlying source yields [`LinkError::Lookup`](crate::error::LinkError::Lookup).
/// - [`batch_find_candidates`](Self::batch_find_candidates) returns exactly one
///   entry per distinct input query.
pub trait CandidateGenerator: Send + Sync {
    /// Query type (usually mention surface text)
    type Query: Key;

    /// Candidate type (usually a knowledge-base identifier)
    type Candidate: Key;

    /// Find candidates for a single query.
    fn find_candidates(&self, query: &Self::Query) -> Result<CandidateSet<Self::Candidate>>;

    /// Find candidates for many queries.
    ///
    /// The default calls [`find_candidates`](Self::find_candidates) once per
    /// distinct query. Generators backed by a service with a real batch
    /// endpoint override this to make a single round trip.
    fn batch_find_candidates(
        &self,
        queries: &[Self::Query],
    ) -> Result<BatchResult<Self::Query, Self::Candidate>> {
        let mut results =
            BatchResult::with_capacity_and_hasher(queries.len(), Default::default());
        for query in queries {
            if !results.contains_key(query) {
                let candidates = self.find_candidates(query)?;
                results.insert(query.clone(), candidates);
            }
        }
        Ok(results)
    }

    /// Whether this generator already memoizes its results.
    ///
    /// Lets [`CachedGenerator::wrap`](crate::cache::CachedGenerator::wrap)
    /// avoid double-caching a chain it only sees as a trait object.
    fn is_cached(&self) -> bool {
        false
    }
}

/// Type-erased generator for a given query/candidate pair.
pub type DynGenerator<Q, L> = dyn CandidateGenerator<Query = Q, Candidate = L>;

/// Shared, type-erased generator.
pub type SharedGenerator<Q, L> = Arc<DynGenerator<Q, L>>;

/// Owned, type-erased generator.
pub type BoxedGenerator<Q, L> = Box<DynGenerator<Q, L>>;

impl<G> CandidateGenerator for &G
where
    G: CandidateGenerator + ?Sized,
{
    type Query = G::Query;
    type Candidate = G::Candidate;

    #[inline]
    fn find_candidates(&self, query: &Self::Query) -> Result<CandidateSet<Self::Candidate>> {
        (**self).find_candidates(query)
    }

    #[inline]
    fn batch_find_candidates(
        &self,
        queries: &[Self::Query],
    ) -> Result<BatchResult<Self::Query, Self::Candidate>> {
        (**self).batch_find_candidates(queries)
    }

    #[inline]
    fn is_cached(&self) -> bool {
        (**self).is_cached()
    }
}

impl<G> CandidateGenerator for Box<G>
where
    G: CandidateGenerator + ?Sized,
{
    type Query = G::Query;
    type Candidate = G::Candidate;

    #[inline]
    fn find_candidates(&self, query: &Self::Query) -> Result<CandidateSet<Self::Candidate>> {
        (**self).find_candidates(query)
    }

    #[inline]
    fn batch_find_candidates(
        &self,
        queries: &[Self::Query],
    ) -> Result<BatchResult<Self::Query, Self::Candidate>> {
        (**self).batch_find_candidates(queries)
    }

    #[inline]
    fn is_cached(&self) -> bool {
        (**self).is_cached()
    }
}

impl<G> CandidateGenerator for Arc<G>
where
    G: CandidateGenerator + ?Sized,
{
    type Query = G::Query;
    type Candidate = G::Candidate;

    #[inline]
    fn find_candidates(&self, query: &Self::Query) -> Result<CandidateSet<Self::Candidate>> {
        (**self).find_candidates(query)
    }

    #[inline]
    fn batch_find_candidates(
        &self,
        queries: &[Self::Query],
    ) -> Result<BatchResult<Self::Query, Self::Candidate>> {
        (**self).batch_find_candidates(queries)
    }

    #[inline]
    fn is_cached(&self) -> bool {
        (**self).is_cached()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{set, RecordingGenerator};
    use super::*;

    struct Echo;

    impl CandidateGenerator for Echo {
        type Query = u32;
        type Candidate = u32;

        fn find_candidates(&self, query: &u32) -> Result<CandidateSet<u32>> {
            Ok(CandidateSet::singleton(query * 10))
        }
    }

    #[test]
    fn test_default_batch_covers_every_query() {
        let results = Echo.batch_find_candidates(&[1, 2, 3]).unwrap();
        assert_eq!(results.len(), 3);
        for q in [1u32, 2, 3] {
            assert_eq!(results[&q], Echo.find_candidates(&q).unwrap());
        }
    }

    #[test]
    fn test_default_batch_deduplicates_queries() {
        let results = Echo.batch_find_candidates(&[4, 4, 5]).unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_default_batch_empty_input() {
        assert!(Echo.batch_find_candidates(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_pointer_impls_forward() {
        let gen = RecordingGenerator::new([("a", vec!["x"])]);
        let shared: SharedGenerator<String, String> = Arc::new(gen);
        let boxed: BoxedGenerator<String, String> = Box::new(Arc::clone(&shared));

        assert_eq!(boxed.find_candidates(&"a".to_string()).unwrap(), set(&["x"]));
        assert_eq!((&shared).find_candidates(&"b".to_string()).unwrap(), set(&[]));
        assert!(!boxed.is_cached());
    }
}
