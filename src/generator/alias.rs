//! Alias-rewriting decorator.
//!
//! An [`AliasTable`] redirects variant mention forms ("NYC", "Big Apple") to
//! a canonical query ("New York City") before the delegate is consulted.
//! Tables may contain chains and cycles; in recursive mode the generator
//! follows chains and detects cycles.
//!
//! # Resolution in recursive mode
//!
//! The walk pushes every newly reached query on a stack `seen`, starting with
//! the mention, and stops at the first query without an alias or at the first
//! query already on the stack (a loop). Let `query` be where the walk stopped.
//! Entries are then popped while the top of the stack differs from `query`,
//! unioning the delegate's answer for each, and finally the delegate's answer
//! for `query` itself is added.
//!
//! ```text
//! m → a1 → a2 → t          seen = [m, a1, a2, t], query = t
//!                          result = find(t)
//!
//! m → a → b → a (loop)     seen = [m, a, b],      query = a
//!                          result = find(b) ∪ find(a)
//! ```
//!
//! Without a cycle only the terminal query reaches the delegate. With a cycle
//! every node of the cycle contributes, and nodes leading into it do not.

use super::CandidateGenerator;
use crate::candidate::{CandidateSet, Key};
use crate::error::{BuilderError, Result};
use rustc_hash::FxHashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// One-to-one redirection edges from query to query.
#[derive(Debug, Clone)]
pub struct AliasTable<Q> {
    edges: FxHashMap<Q, Q>,
}

impl<Q: Key> AliasTable<Q> {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            edges: FxHashMap::default(),
        }
    }

    /// Builds a table from `(alias, target)` pairs. Later pairs replace
    /// earlier ones with the same alias.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Q, Q)>,
    {
        Self {
            edges: pairs.into_iter().collect(),
        }
    }

    /// Adds or replaces the redirection for `alias`.
    pub fn insert(&mut self, alias: Q, target: Q) -> Option<Q> {
        self.edges.insert(alias, target)
    }

    /// Target of `alias`, if any.
    #[inline]
    pub fn get(&self, alias: &Q) -> Option<&Q> {
        self.edges.get(alias)
    }

    /// Number of redirections.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Returns `true` when there are no redirections.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

impl AliasTable<String> {
    /// Reads `alias<TAB>target` lines.
    ///
    /// Blank lines and lines starting with `#` are skipped. Surrounding
    /// whitespace is trimmed from both fields.
    pub fn from_reader<R: BufRead>(reader: R) -> std::result::Result<Self, BuilderError> {
        let mut table = Self::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(|err| BuilderError::Unreadable {
                path: "alias table".to_string(),
                message: err.to_string(),
            })?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            match trimmed.split_once('\t') {
                Some((alias, target)) if !alias.trim().is_empty() && !target.trim().is_empty() => {
                    table.insert(alias.trim().to_string(), target.trim().to_string());
                }
                _ => {
                    return Err(BuilderError::MalformedAlias {
                        line: index + 1,
                        content: line.clone(),
                    })
                }
            }
        }
        Ok(table)
    }

    /// Reads an alias table file. See [`AliasTable::from_reader`].
    pub fn load<P: AsRef<Path>>(path: P) -> std::result::Result<Self, BuilderError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| BuilderError::Unreadable {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<Q: Key> Default for AliasTable<Q> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Q: Key> FromIterator<(Q, Q)> for AliasTable<Q> {
    fn from_iter<I: IntoIterator<Item = (Q, Q)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

/// Decorator that rewrites queries through an [`AliasTable`] before
/// delegating.
///
/// In non-recursive mode only the mention's direct alias is used. In
/// recursive mode chains are followed with cycle detection, as described in
/// the [module documentation](self).
#[derive(Debug, Clone)]
pub struct AliasMappingGenerator<G: CandidateGenerator> {
    delegate: G,
    aliases: AliasTable<G::Query>,
    recursive: bool,
}

impl<G: CandidateGenerator> AliasMappingGenerator<G> {
    /// Wraps `delegate` with the given alias table.
    pub fn new(delegate: G, aliases: AliasTable<G::Query>, recursive: bool) -> Self {
        Self {
            delegate,
            aliases,
            recursive,
        }
    }

    /// Gets a reference to the inner generator.
    #[inline]
    pub fn delegate(&self) -> &G {
        &self.delegate
    }

    /// The alias table.
    pub fn aliases(&self) -> &AliasTable<G::Query> {
        &self.aliases
    }

    /// Whether alias chains are followed.
    pub fn is_recursive(&self) -> bool {
        self.recursive
    }

    /// Unwraps the inner generator.
    pub fn into_inner(self) -> G {
        self.delegate
    }

    fn resolve_recursive(&self, mention: &G::Query) -> Result<CandidateSet<G::Candidate>> {
        let mut seen: Vec<G::Query> = vec![mention.clone()];
        let mut query = mention.clone();
        let mut loop_detected = false;

        while !loop_detected {
            let Some(target) = self.aliases.get(&query) else {
                break;
            };
            query = target.clone();
            if seen.contains(&query) {
                tracing::debug!(mention = ?mention, closes_at = ?query, "alias loop detected");
                loop_detected = true;
            } else {
                seen.push(query.clone());
            }
        }

        let mut result = CandidateSet::new();
        while let Some(top) = seen.last() {
            if *top == query {
                break;
            }
            if let Some(popped) = seen.pop() {
                result.union_with(self.delegate.find_candidates(&popped)?);
            }
        }
        result.union_with(self.delegate.find_candidates(&query)?);
        Ok(result)
    }
}

impl<G: CandidateGenerator> CandidateGenerator for AliasMappingGenerator<G> {
    type Query = G::Query;
    type Candidate = G::Candidate;

    fn find_candidates(&self, mention: &Self::Query) -> Result<CandidateSet<Self::Candidate>> {
        if self.recursive {
            self.resolve_recursive(mention)
        } else {
            match self.aliases.get(mention) {
                Some(alias) => self.delegate.find_candidates(alias),
                None => self.delegate.find_candidates(mention),
            }
        }
    }
}
