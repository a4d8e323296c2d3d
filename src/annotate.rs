//! Linking of annotated mentions.
//!
//! An upstream annotator supplies [`Mention`]s (surface text plus a span in the
//! source document). [`MentionLinker`] assigns each one a knowledge-base
//! identifier, falling back to a NIL identifier for mentions without
//! candidates.

use crate::candidate::Key;
use crate::error::{LinkError, Result};
use crate::generator::CandidateGenerator;
use crate::ranker::CandidateRanker;
use rustc_hash::{FxHashMap, FxHashSet};
use std::ops::Range;

/// A named-entity mention located in a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mention {
    /// Surface text
    pub text: String,
    /// Byte offsets in the source document
    pub span: Range<usize>,
}

impl Mention {
    /// Creates a mention.
    pub fn new(text: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            text: text.into(),
            span,
        }
    }
}

/// A mention together with the identifier it was linked to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedMention<L> {
    /// The mention as supplied
    pub mention: Mention,
    /// Assigned identifier; the NIL identifier when nothing matched
    pub link: L,
    /// Whether `link` is the NIL identifier
    pub is_nil: bool,
}

/// Links batches of mentions with one candidate lookup per batch.
///
/// Mentions sharing surface text are looked up once. Mentions whose
/// candidate set is empty receive the NIL identifier; lookup and ranking
/// failures abort the batch.
///
/// # Examples
///
/// ```
/// use entity_linker::prelude::*;
///
/// let kb = StaticMapGenerator::new([("Lisbon".to_string(), ["/m/04llb".to_string()])]);
/// let linker = MentionLinker::new(kb, NullRanker, "/NIL".to_string());
///
/// let linked = linker
///     .link_mentions(&[Mention::new("Lisbon", 0..6), Mention::new("Gondor", 11..17)])
///     .unwrap();
/// assert_eq!(linked[0].link, "/m/04llb");
/// assert!(linked[1].is_nil);
/// ```
#[derive(Debug, Clone)]
pub struct MentionLinker<G: CandidateGenerator, R> {
    generator: G,
    ranker: R,
    nil_id: G::Candidate,
}

impl<G, R> MentionLinker<G, R>
where
    G: CandidateGenerator<Query = String>,
    R: CandidateRanker<String, G::Candidate>,
{
    /// Creates a mention linker.
    pub fn new(generator: G, ranker: R, nil_id: G::Candidate) -> Self {
        Self {
            generator,
            ranker,
            nil_id,
        }
    }

    /// Gets a reference to the generator.
    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// The identifier assigned to mentions without candidates.
    pub fn nil_id(&self) -> &G::Candidate {
        &self.nil_id
    }

    /// Links every mention, preserving input order.
    pub fn link_mentions(&self, mentions: &[Mention]) -> Result<Vec<LinkedMention<G::Candidate>>> {
        let mut seen = FxHashSet::default();
        let texts: Vec<String> = mentions
            .iter()
            .filter(|mention| seen.insert(mention.text.as_str()))
            .map(|mention| mention.text.clone())
            .collect();
        let found = self.generator.batch_find_candidates(&texts)?;

        let mut chosen = FxHashMap::default();
        for text in &texts {
            let candidates = found.get(text).ok_or_else(|| {
                LinkError::Unexpected(format!("batch lookup returned no entry for {:?}", text))
            })?;
            let top = self.ranker.rank_candidates(text, candidates)?.into_iter().next();
            chosen.insert(text.as_str(), top);
        }

        Ok(mentions
            .iter()
            .map(|mention| {
                let top = chosen.get(mention.text.as_str()).cloned().flatten();
                link_or_nil(mention.clone(), top, &self.nil_id)
            })
            .collect())
    }
}

fn link_or_nil<L: Key>(mention: Mention, top: Option<L>, nil_id: &L) -> LinkedMention<L> {
    match top {
        Some(link) => LinkedMention {
            mention,
            link,
            is_nil: false,
        },
        None => LinkedMention {
            mention,
            link: nil_id.clone(),
            is_nil: true,
        },
    }
}
