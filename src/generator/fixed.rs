//! Generators answering from in-memory tables.
//!
//! Both generators consult their table first and fall back to a delegate for
//! queries the table does not cover. The delegate defaults to
//! [`NilGenerator`], so unknown queries yield the empty set.
//!
//! # Examples
//!
//! ```
//! use entity_linker::prelude::*;
//!
//! // Identity mapping restricted to a known vocabulary
//! let known = StaticSetGenerator::new(["Berlin".to_string(), "Bonn".to_string()]);
//! assert_eq!(known.find_candidates(&"Bonn".to_string()).unwrap().len(), 1);
//! assert!(known.find_candidates(&"Köln".to_string()).unwrap().is_empty());
//! ```

use super::{CandidateGenerator, NilGenerator};
use crate::candidate::{CandidateSet, Key};
use crate::error::Result;
use rustc_hash::{FxHashMap, FxHashSet};

/// Generator mapping members of a fixed set to themselves.
///
/// If the query is a member, the result is the singleton set containing the
/// query; otherwise the delegate answers.
#[derive(Debug, Clone)]
pub struct StaticSetGenerator<T, G = NilGenerator<T, T>> {
    members: FxHashSet<T>,
    delegate: G,
}

impl<T: Key> StaticSetGenerator<T, NilGenerator<T, T>> {
    /// Creates a generator over the given members with an empty fallback.
    pub fn new<I>(members: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        Self::with_delegate(members, NilGenerator::new())
    }
}

impl<T, G> StaticSetGenerator<T, G>
where
    T: Key,
    G: CandidateGenerator<Query = T, Candidate = T>,
{
    /// Creates a generator that falls back to `delegate` for non-members.
    pub fn with_delegate<I>(members: I, delegate: G) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        Self {
            members: members.into_iter().collect(),
            delegate,
        }
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` when the member set is empty.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// The fallback generator.
    #[inline]
    pub fn delegate(&self) -> &G {
        &self.delegate
    }
}

impl<T, G> CandidateGenerator for StaticSetGenerator<T, G>
where
    T: Key,
    G: CandidateGenerator<Query = T, Candidate = T>,
{
    type Query = T;
    type Candidate = T;

    fn find_candidates(&self, query: &T) -> Result<CandidateSet<T>> {
        if self.members.contains(query) {
            Ok(CandidateSet::singleton(query.clone()))
        } else {
            self.delegate.find_candidates(query)
        }
    }
}

/// Generator backed by a query → candidate-set table.
#[derive(Debug, Clone)]
pub struct StaticMapGenerator<Q, L, G = NilGenerator<Q, L>> {
    table: FxHashMap<Q, CandidateSet<L>>,
    delegate: G,
}

impl<Q: Key, L: Key> StaticMapGenerator<Q, L, NilGenerator<Q, L>> {
    /// Creates a generator from `(query, candidates)` pairs with an empty
    /// fallback.
    ///
    /// Repeated queries merge their candidates.
    pub fn new<I, C>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Q, C)>,
        C: IntoIterator<Item = L>,
    {
        Self::with_delegate(entries, NilGenerator::new())
    }
}

impl<T: Key> StaticMapGenerator<T, T, NilGenerator<T, T>> {
    /// Identity mapping restricted to `accepted`: each accepted query maps to
    /// itself, anything else to the empty set.
    pub fn in_set<I>(accepted: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        Self::new(accepted.into_iter().map(|t| (t.clone(), [t])))
    }
}

impl<Q, L, G> StaticMapGenerator<Q, L, G>
where
    Q: Key,
    L: Key,
    G: CandidateGenerator<Query = Q, Candidate = L>,
{
    /// Creates a generator that falls back to `delegate` for unmapped
    /// queries.
    pub fn with_delegate<I, C>(entries: I, delegate: G) -> Self
    where
        I: IntoIterator<Item = (Q, C)>,
        C: IntoIterator<Item = L>,
    {
        let mut table: FxHashMap<Q, CandidateSet<L>> = FxHashMap::default();
        for (query, candidates) in entries {
            table.entry(query).or_default().extend(candidates);
        }
        Self { table, delegate }
    }

    /// Number of mapped queries.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` when no query is mapped.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// The fallback generator.
    #[inline]
    pub fn delegate(&self) -> &G {
        &self.delegate
    }
}

impl<Q, L, G> CandidateGenerator for StaticMapGenerator<Q, L, G>
where
    Q: Key,
    L: Key,
    G: CandidateGenerator<Query = Q, Candidate = L>,
{
    type Query = Q;
    type Candidate = L;

    fn find_candidates(&self, query: &Q) -> Result<CandidateSet<L>> {
        match self.table.get(query) {
            Some(candidates) => Ok(candidates.clone()),
            None => self.delegate.find_candidates(query),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::testing::{set, RecordingGenerator};

    fn s(v: &str) -> String {
        v.to_string()
    }

    #[test]
    fn test_static_set_identity() {
        let gen = StaticSetGenerator::new([s("Berlin"), s("Bonn")]);
        assert_eq!(gen.find_candidates(&s("Berlin")).unwrap(), set(&["Berlin"]));
        assert!(gen.find_candidates(&s("Hamburg")).unwrap().is_empty());
        assert_eq!(gen.len(), 2);
    }

    #[test]
    fn test_static_set_falls_back_to_delegate() {
        let fallback = RecordingGenerator::new([("Hamburg", vec!["/m/03hrz"])]);
        let gen = StaticSetGenerator::with_delegate([s("Berlin")], fallback);

        assert_eq!(gen.find_candidates(&s("Hamburg")).unwrap(), set(&["/m/03hrz"]));
        assert_eq!(gen.find_candidates(&s("Berlin")).unwrap(), set(&["Berlin"]));
        // Members never reach the delegate
        assert_eq!(gen.delegate().queried(), vec![s("Hamburg")]);
    }

    #[test]
    fn test_static_map_lookup() {
        let gen = StaticMapGenerator::new([
            (s("Paris"), vec![s("/m/05qtj"), s("/m/0tmzv")]),
            (s("Rome"), vec![s("/m/06c62")]),
        ]);
        assert_eq!(
            gen.find_candidates(&s("Paris")).unwrap(),
            set(&["/m/05qtj", "/m/0tmzv"])
        );
        assert!(gen.find_candidates(&s("Oslo")).unwrap().is_empty());
    }

    #[test]
    fn test_static_map_merges_repeated_queries() {
        let gen = StaticMapGenerator::new([(1u32, vec![10u32]), (1, vec![11]), (2, vec![])]);
        assert_eq!(gen.len(), 2);
        assert_eq!(gen.find_candidates(&1).unwrap().into_vec(), vec![10, 11]);
        assert!(gen.find_candidates(&2).unwrap().is_empty());
    }

    #[test]
    fn test_static_map_delegate_only_for_unmapped() {
        let fallback = RecordingGenerator::new([("Oslo", vec!["/m/05l64"])]);
        let gen = StaticMapGenerator::with_delegate([(s("Rome"), vec![s("/m/06c62")])], fallback);

        assert_eq!(gen.find_candidates(&s("Oslo")).unwrap(), set(&["/m/05l64"]));
        assert_eq!(gen.find_candidates(&s("Rome")).unwrap(), set(&["/m/06c62"]));
        assert_eq!(gen.delegate().call_count(), 1);
    }

    #[test]
    fn test_in_set() {
        let gen = StaticMapGenerator::in_set([7u8, 9]);
        assert_eq!(gen.find_candidates(&7).unwrap(), CandidateSet::singleton(7));
        assert!(gen.find_candidates(&8).unwrap().is_empty());
    }
}
