//! Pipeline assembly from configuration.
//!
//! [`PipelineFactory`] turns a [`LinkerConfig`] into a generator chain, a
//! ranker and the linkers built from them. The chain is assembled inside out:
//!
//! ```text
//! alias mapping (optional)
//!   └─ cache (optional)
//!        └─ collection (when several base generators are configured)
//!             └─ base generators: nil / static / remote
//! ```
//!
//! # Example
//!
//! ```
//! use entity_linker::prelude::*;
//!
//! let config = LinkerConfig {
//!     generators: vec![GeneratorKind::Nil],
//!     ..Default::default()
//! };
//! let linker = PipelineFactory::new(config).build_linker().unwrap();
//! assert!(linker.link(&"anything".to_string()).unwrap_err().is_empty_result());
//! ```

use crate::annotate::MentionLinker;
use crate::cache::CacheBuilder;
use crate::config::{GeneratorKind, LinkerConfig, RankerKind};
use crate::error::BuilderError;
use crate::generator::{
    AliasMappingGenerator, AliasTable, BoxedGenerator, GeneratorCollection, NilGenerator,
    RemoteGenerator, SearchClient, SharedGenerator, StaticSetGenerator,
};
use crate::linker::TwoPhaseLinker;
use crate::ranker::{NullRanker, RandomRanker, SharedRanker};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Generator chain over string mentions and identifiers.
pub type StringGenerator = SharedGenerator<String, String>;

/// Ranker over string mentions and identifiers.
pub type StringRanker = SharedRanker<String, String>;

/// Linker produced by [`PipelineFactory::build_linker`].
pub type ConfiguredLinker = TwoPhaseLinker<StringGenerator, StringRanker>;

/// Mention linker produced by [`PipelineFactory::build_mention_linker`].
pub type ConfiguredMentionLinker = MentionLinker<StringGenerator, StringRanker>;

/// Assembles pipelines described by a [`LinkerConfig`].
pub struct PipelineFactory {
    config: LinkerConfig,
    search_client: Option<Arc<dyn SearchClient>>,
}

impl PipelineFactory {
    /// Creates a factory for `config`.
    pub fn new(config: LinkerConfig) -> Self {
        Self {
            config,
            search_client: None,
        }
    }

    /// Supplies the client used by [`GeneratorKind::Remote`].
    pub fn with_search_client<C: SearchClient + 'static>(mut self, client: C) -> Self {
        self.search_client = Some(Arc::new(client));
        self
    }

    /// The configuration being assembled.
    pub fn config(&self) -> &LinkerConfig {
        &self.config
    }

    /// Builds the configured generator chain.
    ///
    /// # Errors
    ///
    /// A [`BuilderError`] naming the first missing or unusable part.
    pub fn build_generator(&self) -> Result<StringGenerator, BuilderError> {
        let config = &self.config;
        let mut generator: StringGenerator = match config.generators.as_slice() {
            [] => return Err(BuilderError::NoGenerators),
            [kind] => self.base_generator(*kind)?,
            kinds => {
                let children = kinds
                    .iter()
                    .map(|kind| {
                        self.base_generator(*kind)
                            .map(|child| Box::new(child) as BoxedGenerator<_, _>)
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Arc::new(GeneratorCollection::new(children, config.aggregation))
            }
        };

        if config.cached {
            generator = CacheBuilder::for_strings()
                .max_weight(config.max_weight)
                .wrap(generator)?;
        }

        if let Some(path) = &config.aliases {
            let aliases = AliasTable::load(path)?;
            generator = Arc::new(AliasMappingGenerator::new(
                generator,
                aliases,
                config.recursive_aliases,
            ));
        }

        tracing::debug!(
            generators = ?config.generators,
            aggregation = %config.aggregation,
            cached = config.cached,
            aliases = config.aliases.is_some(),
            "assembled generator chain"
        );
        Ok(generator)
    }

    /// Builds the configured ranker.
    pub fn build_ranker(&self) -> StringRanker {
        match (self.config.ranker, self.config.seed) {
            (RankerKind::Null, _) => Arc::new(NullRanker),
            (RankerKind::Random, Some(seed)) => Arc::new(RandomRanker::with_seed(seed)),
            (RankerKind::Random, None) => Arc::new(RandomRanker::new()),
        }
    }

    /// Builds a [`TwoPhaseLinker`] over the configured chain and ranker.
    pub fn build_linker(&self) -> Result<ConfiguredLinker, BuilderError> {
        TwoPhaseLinker::builder()
            .generator(self.build_generator()?)
            .ranker(self.build_ranker())
            .build()
    }

    /// Builds a [`MentionLinker`] using the configured NIL identifier.
    pub fn build_mention_linker(&self) -> Result<ConfiguredMentionLinker, BuilderError> {
        Ok(MentionLinker::new(
            self.build_generator()?,
            self.build_ranker(),
            self.config.nil_id.clone(),
        ))
    }

    fn base_generator(&self, kind: GeneratorKind) -> Result<StringGenerator, BuilderError> {
        Ok(match kind {
            GeneratorKind::Nil => Arc::new(NilGenerator::<String, String>::new()),
            GeneratorKind::Static => {
                let path = self
                    .config
                    .static_terms
                    .as_ref()
                    .ok_or(BuilderError::MissingStaticTerms)?;
                Arc::new(StaticSetGenerator::new(read_terms(path)?))
            }
            GeneratorKind::Remote => {
                let client = self
                    .search_client
                    .clone()
                    .ok_or(BuilderError::MissingSearchClient)?;
                Arc::new(RemoteGenerator::new(client))
            }
        })
    }
}

impl fmt::Debug for PipelineFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineFactory")
            .field("config", &self.config)
            .field("search_client", &self.search_client.is_some())
            .finish()
    }
}

/// One term per line; blank lines are skipped.
fn read_terms(path: &Path) -> Result<Vec<String>, BuilderError> {
    let content = std::fs::read_to_string(path).map_err(|err| BuilderError::Unreadable {
        path: path.display().to_string(),
        message: err.to_string(),
    })?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::CandidateGenerator;
    use crate::linker::Linker;
    use crate::ranker::CandidateRanker;
    use std::collections::HashMap;
    use std::io::{self, Write};
    use tempfile::NamedTempFile;

    struct Directory;

    impl SearchClient for Directory {
        fn search(&self, query: &str) -> io::Result<Vec<String>> {
            Ok(match query {
                "Turin" => vec!["/m/0ly_s".to_string()],
                _ => Vec::new(),
            })
        }

        fn batch_search(&self, queries: &[String]) -> io::Result<HashMap<String, Vec<String>>> {
            queries
                .iter()
                .map(|q| Ok((q.clone(), self.search(q)?)))
                .collect()
        }
    }

    fn temp_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_remote_requires_client() {
        let factory = PipelineFactory::new(LinkerConfig::default());
        assert_eq!(
            factory.build_generator().err().unwrap(),
            BuilderError::MissingSearchClient
        );
    }

    #[test]
    fn test_default_chain_is_cached_remote() {
        let factory = PipelineFactory::new(LinkerConfig::default()).with_search_client(Directory);
        let generator = factory.build_generator().unwrap();
        assert!(generator.is_cached());

        let linker = factory.build_linker().unwrap();
        assert_eq!(linker.link(&"Turin".to_string()).unwrap(), "/m/0ly_s");
    }

    #[test]
    fn test_uncached_chain() {
        let config = LinkerConfig {
            cached: false,
            ..Default::default()
        };
        let generator = PipelineFactory::new(config)
            .with_search_client(Directory)
            .build_generator()
            .unwrap();
        assert!(!generator.is_cached());
    }

    #[test]
    fn test_empty_generator_list() {
        let config = LinkerConfig {
            generators: Vec::new(),
            ..Default::default()
        };
        assert_eq!(
            PipelineFactory::new(config).build_generator().err().unwrap(),
            BuilderError::NoGenerators
        );
    }

    #[test]
    fn test_static_requires_terms() {
        let config = LinkerConfig {
            generators: vec![GeneratorKind::Static],
            ..Default::default()
        };
        assert_eq!(
            PipelineFactory::new(config).build_generator().err().unwrap(),
            BuilderError::MissingStaticTerms
        );
    }

    #[test]
    fn test_collection_with_aliases() {
        let terms = temp_file("Torino\n\nMilano\n");
        let aliases = temp_file("Turin\tTorino\n");
        let config = LinkerConfig {
            generators: vec![GeneratorKind::Remote, GeneratorKind::Static],
            aggregation: crate::generator::AggregationMethod::Union,
            static_terms: Some(terms.path().to_path_buf()),
            aliases: Some(aliases.path().to_path_buf()),
            ..Default::default()
        };
        let generator = PipelineFactory::new(config)
            .with_search_client(Directory)
            .build_generator()
            .unwrap();

        // Alias rewrites Turin to Torino, which only the static terms know
        let found = generator.find_candidates(&"Turin".to_string()).unwrap();
        assert_eq!(found.into_vec(), vec!["Torino"]);
        let found = generator.find_candidates(&"Milano".to_string()).unwrap();
        assert_eq!(found.into_vec(), vec!["Milano"]);
    }

    #[test]
    fn test_missing_alias_file() {
        let config = LinkerConfig {
            generators: vec![GeneratorKind::Nil],
            aliases: Some("/nonexistent/aliases.tsv".into()),
            ..Default::default()
        };
        assert!(matches!(
            PipelineFactory::new(config).build_generator(),
            Err(BuilderError::Unreadable { .. })
        ));
    }

    #[test]
    fn test_seeded_random_ranker_is_reproducible() {
        let config = LinkerConfig {
            ranker: RankerKind::Random,
            seed: Some(11),
            ..Default::default()
        };
        let candidates: crate::candidate::CandidateSet<String> =
            (0..10).map(|i| format!("/m/{}", i)).collect();
        let a = PipelineFactory::new(config.clone()).build_ranker();
        let b = PipelineFactory::new(config).build_ranker();
        let q = "q".to_string();
        assert_eq!(
            a.rank_candidates(&q, &candidates).unwrap(),
            b.rank_candidates(&q, &candidates).unwrap()
        );
    }

    #[test]
    fn test_mention_linker_uses_nil_id() {
        let config = LinkerConfig {
            generators: vec![GeneratorKind::Nil],
            nil_id: "--NME--".to_string(),
            ..Default::default()
        };
        let linker = PipelineFactory::new(config).build_mention_linker().unwrap();
        let linked = linker
            .link_mentions(&[crate::annotate::Mention::new("Turin", 0..5)])
            .unwrap();
        assert_eq!(linked[0].link, "--NME--");
    }
}
