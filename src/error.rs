//! Error types for candidate resolution and pipeline assembly.

use std::io;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while generating, ranking or selecting candidates.
///
/// The type is `Clone` so that a single computation inside the cache can hand
/// the same outcome to every caller waiting on it.
#[derive(Debug, Clone, Error)]
pub enum LinkError {
    /// An underlying source (remote service, delegate generator) could not
    /// complete the lookup.
    ///
    /// Propagated unchanged through every decorator. The cache never stores
    /// a result for a key whose lookup failed.
    #[error("candidate lookup failed: {0}")]
    Lookup(Arc<io::Error>),

    /// Ranking produced no candidate to select.
    ///
    /// This is a domain outcome rather than a fault: callers that want a NIL
    /// identifier substitute it themselves.
    #[error("no candidates found for query {query}")]
    EmptyResult {
        /// `Debug` rendering of the query that had no candidates.
        query: String,
    },

    /// A delegate failed in a way that is neither a lookup failure nor an
    /// empty result, e.g. it panicked mid-computation or broke the batch
    /// coverage contract.
    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

impl LinkError {
    /// Builds an [`LinkError::EmptyResult`] for the given query.
    pub fn empty_result<Q: std::fmt::Debug>(query: &Q) -> Self {
        LinkError::EmptyResult {
            query: format!("{:?}", query),
        }
    }

    /// Returns `true` for [`LinkError::EmptyResult`].
    pub fn is_empty_result(&self) -> bool {
        matches!(self, LinkError::EmptyResult { .. })
    }

    /// Returns `true` for [`LinkError::Lookup`].
    pub fn is_lookup(&self) -> bool {
        matches!(self, LinkError::Lookup(_))
    }
}

impl From<io::Error> for LinkError {
    fn from(err: io::Error) -> Self {
        LinkError::Lookup(Arc::new(err))
    }
}

/// Precondition failures detected while assembling a pipeline.
///
/// Raised before any lookup work begins. These are programmer or
/// configuration errors and are never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuilderError {
    /// No generator was provided
    #[error("Generator is required. Use .generator() to set it.")]
    MissingGenerator,

    /// No ranker was provided
    #[error("Ranker is required. Use .ranker() to set it.")]
    MissingRanker,

    /// A remote generator was requested but no search client was supplied
    #[error("Remote generator requested but no search client was supplied")]
    MissingSearchClient,

    /// A static generator was requested without a terms source
    #[error("Static generator requested but no terms file was configured")]
    MissingStaticTerms,

    /// The cache weight budget must be positive
    #[error("Cache weight budget must be greater than zero")]
    ZeroWeightBudget,

    /// The configured generator list is empty
    #[error("At least one generator must be configured")]
    NoGenerators,

    /// Unrecognised generator kind name
    #[error("Unknown generator type: {0}")]
    UnknownGenerator(String),

    /// Unrecognised ranker kind name
    #[error("Unknown ranker type: {0}")]
    UnknownRanker(String),

    /// Unrecognised aggregation method name
    #[error("Unknown aggregation method: {0}")]
    UnknownAggregation(String),

    /// A property value could not be parsed
    #[error("Invalid value {value:?} for property {key}")]
    InvalidProperty {
        /// Property name
        key: String,
        /// Offending value
        value: String,
    },

    /// An alias table line was not of the form `alias<TAB>target`
    #[error("Malformed alias entry on line {line}: {content:?}")]
    MalformedAlias {
        /// 1-based line number
        line: usize,
        /// Raw line content
        content: String,
    },

    /// A table or terms file could not be read
    #[error("Failed to read {path}: {message}")]
    Unreadable {
        /// Path or source description
        path: String,
        /// Underlying I/O message
        message: String,
    },
}

/// A specialized `Result` type for candidate resolution operations.
pub type Result<T> = std::result::Result<T, LinkError>;
