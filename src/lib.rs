//! # entity-linker
//!
//! Candidate resolution and linking for named-entity mentions.
//!
//! Linking runs in two phases. A [`CandidateGenerator`](generator::CandidateGenerator)
//! maps a mention's surface text to the set of knowledge-base identifiers it
//! might denote; a [`CandidateRanker`](ranker::CandidateRanker) orders that set
//! and the linker picks the top entry. Generators compose: alias mapping,
//! weight-bounded caching and multi-source aggregation are decorators over any
//! other generator.
//!
//! ## Example
//!
//! ```
//! use entity_linker::prelude::*;
//!
//! let kb = StaticMapGenerator::new([
//!     ("Amsterdam".to_string(), vec!["/m/0k3p".to_string()]),
//! ]);
//! let aliases = AliasTable::from_pairs([("Mokum".to_string(), "Amsterdam".to_string())]);
//! let generator = AliasMappingGenerator::new(CachedGenerator::new(kb), aliases, true);
//!
//! let linker = TwoPhaseLinker::new(generator, NullRanker);
//! assert_eq!(linker.link(&"Mokum".to_string()).unwrap(), "/m/0k3p");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod annotate;
pub mod cache;
pub mod candidate;
pub mod config;
pub mod error;
pub mod factory;
pub mod generator;
pub mod linker;
pub mod ranker;

/// Common imports for convenient usage
pub mod prelude {
    pub use crate::annotate::{LinkedMention, Mention, MentionLinker};
    pub use crate::cache::{CacheBuilder, CacheStats, CachedGenerator};
    pub use crate::candidate::{BatchResult, CandidateSet, Key};
    pub use crate::config::{GeneratorKind, LinkerConfig, RankerKind};
    pub use crate::error::{BuilderError, LinkError};
    pub use crate::factory::PipelineFactory;
    pub use crate::generator::{
        AggregationMethod, AliasMappingGenerator, AliasTable, BoxedGenerator, CandidateGenerator,
        ForwardingGenerator, GeneratorCollection, NilGenerator, RemoteGenerator, SearchClient,
        SharedGenerator, StaticMapGenerator, StaticSetGenerator,
    };
    pub use crate::linker::{Linker, TwoPhaseLinker};
    pub use crate::ranker::{CandidateRanker, NullRanker, RandomRanker, SharedRanker};
}
