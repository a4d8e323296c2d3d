//! Query and candidate value types.
//!
//! Generators are generic over the query type (usually mention surface text)
//! and the candidate type (usually a knowledge-base identifier). Both only need
//! to be hashable, comparable and shareable across threads, which the [`Key`]
//! marker trait captures.
//!
//! # Examples
//!
//! ```
//! use entity_linker::candidate::CandidateSet;
//!
//! let mut set: CandidateSet<&str> = ["/m/04jpl", "/m/0dclg"].into_iter().collect();
//! set.insert("/m/04jpl");
//!
//! assert_eq!(set.len(), 2);
//! assert_eq!(set.first(), Some(&"/m/04jpl"));
//! ```

use indexmap::IndexSet;
use rustc_hash::{FxHashMap, FxHasher};
use std::fmt;
use std::hash::{BuildHasherDefault, Hash};

/// Marker trait for values usable as queries or candidates.
///
/// Implemented automatically for every type meeting the bounds.
pub trait Key: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static {}

impl<T> Key for T where T: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static {}

type FxBuildHasher = BuildHasherDefault<FxHasher>;

/// A duplicate-free set of candidates.
///
/// Iteration follows first-insertion order, so "the first candidate a
/// generator produced" is well defined, while equality is plain set equality.
/// Absence of any match is the empty set.
#[derive(Clone)]
pub struct CandidateSet<L> {
    items: IndexSet<L, FxBuildHasher>,
}

impl<L: Key> CandidateSet<L> {
    /// Creates an empty set.
    #[inline]
    pub fn new() -> Self {
        Self {
            items: IndexSet::default(),
        }
    }

    /// Creates a set holding a single candidate.
    pub fn singleton(candidate: L) -> Self {
        let mut set = Self::new();
        set.insert(candidate);
        set
    }

    /// Number of candidates.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` when there are no candidates.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns `true` if the candidate is present.
    #[inline]
    pub fn contains(&self, candidate: &L) -> bool {
        self.items.contains(candidate)
    }

    /// Adds a candidate, returning `false` if it was already present.
    ///
    /// An existing candidate keeps its original position.
    #[inline]
    pub fn insert(&mut self, candidate: L) -> bool {
        self.items.insert(candidate)
    }

    /// First candidate in insertion order.
    #[inline]
    pub fn first(&self) -> Option<&L> {
        self.items.first()
    }

    /// Iterates candidates in insertion order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &L> + '_ {
        self.items.iter()
    }

    /// In-place union: appends every candidate of `other` not already present.
    pub fn union_with(&mut self, other: CandidateSet<L>) {
        self.items.extend(other.items);
    }

    /// In-place intersection: keeps only candidates also present in `other`,
    /// preserving this set's order.
    pub fn intersect_with(&mut self, other: &CandidateSet<L>) {
        self.items.retain(|candidate| other.contains(candidate));
    }

    /// Consumes the set, returning the candidates in insertion order.
    pub fn into_vec(self) -> Vec<L> {
        self.items.into_iter().collect()
    }
}

impl<L: Key> Default for CandidateSet<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Key> PartialEq for CandidateSet<L> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|c| other.contains(c))
    }
}

impl<L: Key> Eq for CandidateSet<L> {}

impl<L: fmt::Debug> fmt::Debug for CandidateSet<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.items.iter()).finish()
    }
}

impl<L: Key> FromIterator<L> for CandidateSet<L> {
    fn from_iter<I: IntoIterator<Item = L>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<L: Key> Extend<L> for CandidateSet<L> {
    fn extend<I: IntoIterator<Item = L>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

impl<L> IntoIterator for CandidateSet<L> {
    type Item = L;
    type IntoIter = indexmap::set::IntoIter<L>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, L> IntoIterator for &'a CandidateSet<L> {
    type Item = &'a L;
    type IntoIter = indexmap::set::Iter<'a, L>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Candidate sets keyed by the query that produced them.
///
/// Returned by batch lookups; its key set equals the set of input queries.
pub type BatchResult<Q, L> = FxHashMap<Q, CandidateSet<L>>;
