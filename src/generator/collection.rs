//! Composite generator aggregating several children.
//!
//! # Aggregation methods
//!
//! - **First**: children are queried in order; the first non-empty result is
//!   returned and the remaining children are not consulted.
//! - **Union**: every child is queried; all distinct candidates are returned.
//! - **Intersection**: children are queried in order keeping a running
//!   intersection, stopping as soon as it becomes empty. No children means an
//!   empty result.
//!
//! # Examples
//!
//! ```
//! use entity_linker::prelude::*;
//!
//! let exact = StaticMapGenerator::new([("Bonn".to_string(), ["/m/01lxd".to_string()])]);
//! let fallback = StaticSetGenerator::new(["Bonn".to_string(), "Köln".to_string()]);
//!
//! let union = GeneratorCollection::builder()
//!     .aggregation(AggregationMethod::Union)
//!     .child(exact)
//!     .child(fallback)
//!     .build();
//!
//! assert_eq!(union.find_candidates(&"Bonn".to_string()).unwrap().len(), 2);
//! ```

use super::{BoxedGenerator, CandidateGenerator};
use crate::candidate::{CandidateSet, Key};
use crate::error::{BuilderError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a [`GeneratorCollection`] combines its children's results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationMethod {
    /// First non-empty child result, in child order
    #[default]
    First,
    /// Union of all child results
    Union,
    /// Intersection of all child results
    Intersection,
}

impl AggregationMethod {
    /// Every aggregation method.
    pub const ALL: [AggregationMethod; 3] = [
        AggregationMethod::First,
        AggregationMethod::Union,
        AggregationMethod::Intersection,
    ];

    /// Combines the results of `children` for `query`.
    pub fn aggregate<G>(
        self,
        children: &[G],
        query: &G::Query,
    ) -> Result<CandidateSet<G::Candidate>>
    where
        G: CandidateGenerator,
    {
        match self {
            AggregationMethod::First => first(children, query),
            AggregationMethod::Union => union(children, query),
            AggregationMethod::Intersection => intersection(children, query),
        }
    }
}

fn first<G: CandidateGenerator>(
    children: &[G],
    query: &G::Query,
) -> Result<CandidateSet<G::Candidate>> {
    for child in children {
        let result = child.find_candidates(query)?;
        if !result.is_empty() {
            return Ok(result);
        }
    }
    Ok(CandidateSet::new())
}

fn union<G: CandidateGenerator>(
    children: &[G],
    query: &G::Query,
) -> Result<CandidateSet<G::Candidate>> {
    let mut result = CandidateSet::new();
    for child in children {
        result.union_with(child.find_candidates(query)?);
    }
    Ok(result)
}

fn intersection<G: CandidateGenerator>(
    children: &[G],
    query: &G::Query,
) -> Result<CandidateSet<G::Candidate>> {
    let mut running: Option<CandidateSet<G::Candidate>> = None;
    for child in children {
        let found = child.find_candidates(query)?;
        let next = match running {
            None => found,
            Some(mut acc) => {
                acc.intersect_with(&found);
                acc
            }
        };
        if next.is_empty() {
            return Ok(CandidateSet::new());
        }
        running = Some(next);
    }
    Ok(running.unwrap_or_default())
}

impl fmt::Display for AggregationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregationMethod::First => write!(f, "first"),
            AggregationMethod::Union => write!(f, "union"),
            AggregationMethod::Intersection => write!(f, "intersection"),
        }
    }
}

impl FromStr for AggregationMethod {
    type Err = BuilderError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(AggregationMethod::First),
            "union" => Ok(AggregationMethod::Union),
            "intersection" => Ok(AggregationMethod::Intersection),
            _ => Err(BuilderError::UnknownAggregation(s.to_string())),
        }
    }
}

/// Ordered list of child generators combined by an [`AggregationMethod`].
///
/// Batch lookups issue one single-query lookup per input; batching, where it
/// matters, belongs to the individual children.
pub struct GeneratorCollection<Q, L> {
    children: Vec<BoxedGenerator<Q, L>>,
    aggregation: AggregationMethod,
}

impl<Q: Key, L: Key> GeneratorCollection<Q, L> {
    /// Creates a collection from already boxed children.
    pub fn new(children: Vec<BoxedGenerator<Q, L>>, aggregation: AggregationMethod) -> Self {
        Self {
            children,
            aggregation,
        }
    }

    /// Starts a builder with [`AggregationMethod::First`].
    pub fn builder() -> GeneratorCollectionBuilder<Q, L> {
        GeneratorCollectionBuilder::new()
    }

    /// The child generators, in query order.
    pub fn children(&self) -> &[BoxedGenerator<Q, L>] {
        &self.children
    }

    /// The aggregation method.
    pub fn aggregation(&self) -> AggregationMethod {
        self.aggregation
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns `true` when there are no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl<Q: Key, L: Key> CandidateGenerator for GeneratorCollection<Q, L> {
    type Query = Q;
    type Candidate = L;

    fn find_candidates(&self, query: &Q) -> Result<CandidateSet<L>> {
        self.aggregation.aggregate(&self.children, query)
    }
}

impl<Q, L> fmt::Debug for GeneratorCollection<Q, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorCollection")
            .field("children", &self.children.len())
            .field("aggregation", &self.aggregation)
            .finish()
    }
}

/// Builder for [`GeneratorCollection`].
pub struct GeneratorCollectionBuilder<Q, L> {
    children: Vec<BoxedGenerator<Q, L>>,
    aggregation: AggregationMethod,
}

impl<Q: Key, L: Key> GeneratorCollectionBuilder<Q, L> {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self {
            children: Vec::new(),
            aggregation: AggregationMethod::default(),
        }
    }

    /// Sets the aggregation method.
    pub fn aggregation(mut self, aggregation: AggregationMethod) -> Self {
        self.aggregation = aggregation;
        self
    }

    /// Appends a child generator.
    pub fn child<G>(mut self, generator: G) -> Self
    where
        G: CandidateGenerator<Query = Q, Candidate = L> + 'static,
    {
        self.children.push(Box::new(generator));
        self
    }

    /// Appends several child generators.
    pub fn children<I, G>(mut self, generators: I) -> Self
    where
        I: IntoIterator<Item = G>,
        G: CandidateGenerator<Query = Q, Candidate = L> + 'static,
    {
        self.children
            .extend(generators.into_iter().map(|g| Box::new(g) as BoxedGenerator<Q, L>));
        self
    }

    /// Builds the collection.
    pub fn build(self) -> GeneratorCollection<Q, L> {
        GeneratorCollection::new(self.children, self.aggregation)
    }
}

impl<Q: Key, L: Key> Default for GeneratorCollectionBuilder<Q, L> {
    fn default() -> Self {
        Self::new()
    }
}
