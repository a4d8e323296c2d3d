//! Query-to-identifier linking.
//!
//! [`TwoPhaseLinker`] resolves a query in two phases: a generator proposes
//! candidates, a ranker orders them, and the top-ranked candidate wins.
//!
//! # Examples
//!
//! ```
//! use entity_linker::prelude::*;
//!
//! let kb = StaticMapGenerator::new([
//!     ("Berlin".to_string(), vec!["/m/0156q".to_string(), "/m/0b90_r".to_string()]),
//! ]);
//! let linker = TwoPhaseLinker::builder()
//!     .generator(kb)
//!     .ranker(NullRanker)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(linker.link(&"Berlin".to_string()).unwrap(), "/m/0156q");
//! assert!(linker.link(&"Atlantis".to_string()).unwrap_err().is_empty_result());
//! ```

use crate::candidate::{CandidateSet, Key};
use crate::error::{BuilderError, LinkError, Result};
use crate::generator::CandidateGenerator;
use crate::ranker::CandidateRanker;
use std::sync::Arc;

/// Resolves queries to a single candidate each.
pub trait Linker<Q: Key, L: Key>: Send + Sync {
    /// Best candidate for `query`.
    ///
    /// # Errors
    ///
    /// [`LinkError::EmptyResult`] when no candidate exists, or any lookup
    /// failure from the underlying sources.
    fn link(&self, query: &Q) -> Result<L>;

    /// Best candidate for each query, in input order.
    fn batch_link(&self, queries: &[Q]) -> Result<Vec<L>>;
}

impl<Q: Key, L: Key, K: Linker<Q, L> + ?Sized> Linker<Q, L> for Arc<K> {
    fn link(&self, query: &Q) -> Result<L> {
        (**self).link(query)
    }

    fn batch_link(&self, queries: &[Q]) -> Result<Vec<L>> {
        (**self).batch_link(queries)
    }
}

/// Generator-then-ranker linker.
#[derive(Debug, Clone)]
pub struct TwoPhaseLinker<G, R> {
    generator: G,
    ranker: R,
}

impl<G, R> TwoPhaseLinker<G, R>
where
    G: CandidateGenerator,
    R: CandidateRanker<G::Query, G::Candidate>,
{
    /// Creates a linker from its two phases.
    pub fn new(generator: G, ranker: R) -> Self {
        Self { generator, ranker }
    }

    /// Starts a builder.
    pub fn builder() -> TwoPhaseLinkerBuilder<G, R> {
        TwoPhaseLinkerBuilder::default()
    }

    /// Gets a reference to the generator.
    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Gets a reference to the ranker.
    pub fn ranker(&self) -> &R {
        &self.ranker
    }

    fn select(&self, query: &G::Query, candidates: &CandidateSet<G::Candidate>) -> Result<G::Candidate> {
        self.ranker
            .rank_candidates(query, candidates)?
            .into_iter()
            .next()
            .ok_or_else(|| LinkError::empty_result(query))
    }
}

impl<G, R> Linker<G::Query, G::Candidate> for TwoPhaseLinker<G, R>
where
    G: CandidateGenerator,
    R: CandidateRanker<G::Query, G::Candidate>,
{
    fn link(&self, query: &G::Query) -> Result<G::Candidate> {
        let candidates = self.generator.find_candidates(query)?;
        self.select(query, &candidates)
    }

    fn batch_link(&self, queries: &[G::Query]) -> Result<Vec<G::Candidate>> {
        let found = self.generator.batch_find_candidates(queries)?;
        queries
            .iter()
            .map(|query| match found.get(query) {
                Some(candidates) => self.select(query, candidates),
                None => Err(LinkError::Unexpected(format!(
                    "batch lookup returned no entry for {:?}",
                    query
                ))),
            })
            .collect()
    }
}

/// Builder for [`TwoPhaseLinker`].
///
/// Both phases are required; [`build`](Self::build) reports whichever is
/// missing.
#[derive(Debug)]
pub struct TwoPhaseLinkerBuilder<G, R> {
    generator: Option<G>,
    ranker: Option<R>,
}

impl<G, R> Default for TwoPhaseLinkerBuilder<G, R> {
    fn default() -> Self {
        Self {
            generator: None,
            ranker: None,
        }
    }
}

impl<G, R> TwoPhaseLinkerBuilder<G, R>
where
    G: CandidateGenerator,
    R: CandidateRanker<G::Query, G::Candidate>,
{
    /// Sets the candidate generator.
    pub fn generator(mut self, generator: G) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Sets the candidate ranker.
    pub fn ranker(mut self, ranker: R) -> Self {
        self.ranker = Some(ranker);
        self
    }

    /// Assembles the linker.
    ///
    /// # Errors
    ///
    /// [`BuilderError::MissingGenerator`] or [`BuilderError::MissingRanker`].
    pub fn build(self) -> std::result::Result<TwoPhaseLinker<G, R>, BuilderError> {
        let generator = self.generator.ok_or(BuilderError::MissingGenerator)?;
        let ranker = self.ranker.ok_or(BuilderError::MissingRanker)?;
        Ok(TwoPhaseLinker::new(generator, ranker))
    }
}
