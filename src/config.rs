//! Pipeline configuration.
//!
//! A [`LinkerConfig`] selects the generator chain and ranker that
//! [`PipelineFactory`](crate::factory::PipelineFactory) assembles. It can be
//! read from JSON or from `nel.*` key/value properties.
//!
//! # Properties
//!
//! | key | values |
//! |-----|--------|
//! | `nel.generator` | comma-separated `nil`, `static`, `remote` (alias `freebase_search`) |
//! | `nel.generator.cached` | `true` / `false` |
//! | `nel.generator.aggregation` | `first`, `union`, `intersection` |
//! | `nel.generator.max_weight` | cache weight budget |
//! | `nel.generator.terms` | term file for the static generator |
//! | `nel.aliases` | tab-separated alias file |
//! | `nel.aliases.recursive` | `true` / `false` |
//! | `nel.ranker` | `null`, `random` |
//! | `nel.ranker.seed` | unsigned integer |
//! | `nel.nil` | identifier for unresolvable mentions |

use crate::cache::DEFAULT_STRING_MAX_WEIGHT;
use crate::error::BuilderError;
use crate::generator::AggregationMethod;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Base generator kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorKind {
    /// Never finds anything
    Nil,
    /// Accepts the terms listed in a file
    Static,
    /// Queries the remote search service
    #[serde(alias = "freebase_search")]
    Remote,
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GeneratorKind::Nil => "nil",
            GeneratorKind::Static => "static",
            GeneratorKind::Remote => "remote",
        })
    }
}

impl FromStr for GeneratorKind {
    type Err = BuilderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nil" => Ok(GeneratorKind::Nil),
            "static" => Ok(GeneratorKind::Static),
            "remote" | "freebase_search" => Ok(GeneratorKind::Remote),
            _ => Err(BuilderError::UnknownGenerator(s.to_string())),
        }
    }
}

/// Ranker kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankerKind {
    /// Generator order
    #[default]
    Null,
    /// Uniform shuffle
    Random,
}

impl fmt::Display for RankerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RankerKind::Null => "null",
            RankerKind::Random => "random",
        })
    }
}

impl FromStr for RankerKind {
    type Err = BuilderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "null" => Ok(RankerKind::Null),
            "random" => Ok(RankerKind::Random),
            _ => Err(BuilderError::UnknownRanker(s.to_string())),
        }
    }
}

/// Settings for assembling a linking pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkerConfig {
    /// Base generators; more than one are combined under `aggregation`
    pub generators: Vec<GeneratorKind>,
    /// How several base generators are combined
    pub aggregation: AggregationMethod,
    /// Newline-separated term file for [`GeneratorKind::Static`]
    pub static_terms: Option<PathBuf>,
    /// Tab-separated alias file; enables alias mapping
    pub aliases: Option<PathBuf>,
    /// Follow alias chains instead of a single redirect
    pub recursive_aliases: bool,
    /// Memoize base generator results
    pub cached: bool,
    /// Cache weight budget
    pub max_weight: usize,
    /// Candidate ranker
    pub ranker: RankerKind,
    /// Seed for [`RankerKind::Random`]; entropy when absent
    pub seed: Option<u64>,
    /// Identifier assigned to mentions without candidates
    pub nil_id: String,
}

impl Default for LinkerConfig {
    fn default() -> Self {
        Self {
            generators: vec![GeneratorKind::Remote],
            aggregation: AggregationMethod::First,
            static_terms: None,
            aliases: None,
            recursive_aliases: true,
            cached: true,
            max_weight: DEFAULT_STRING_MAX_WEIGHT,
            ranker: RankerKind::Null,
            seed: None,
            nil_id: "/NIL".to_string(),
        }
    }
}

impl LinkerConfig {
    /// Parses a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse linker configuration")
    }

    /// Reads a JSON configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_json_str(&json)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Writes the configuration as pretty-printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Builds a configuration from `nel.*` properties over the defaults.
    ///
    /// Keys outside the `nel.` namespace are ignored.
    pub fn from_properties<I, K, V>(properties: I) -> Result<Self, BuilderError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        for (key, value) in properties {
            let (key, value) = (key.as_ref().trim(), value.as_ref().trim());
            match key {
                "nel.generator" => {
                    config.generators = value
                        .split(',')
                        .filter(|kind| !kind.trim().is_empty())
                        .map(str::parse::<GeneratorKind>)
                        .collect::<Result<Vec<_>, _>>()?;
                }
                "nel.generator.cached" => config.cached = parse_bool(key, value)?,
                "nel.generator.aggregation" => config.aggregation = value.parse()?,
                "nel.generator.max_weight" => config.max_weight = parse_number(key, value)?,
                "nel.generator.terms" => config.static_terms = Some(PathBuf::from(value)),
                "nel.aliases" => config.aliases = Some(PathBuf::from(value)),
                "nel.aliases.recursive" => config.recursive_aliases = parse_bool(key, value)?,
                "nel.ranker" => config.ranker = value.parse()?,
                "nel.ranker.seed" => config.seed = Some(parse_number(key, value)?),
                "nel.nil" => config.nil_id = value.to_string(),
                other if other.starts_with("nel.") => {
                    tracing::debug!(key = other, "ignoring unknown linker property");
                }
                _ => {}
            }
        }
        Ok(config)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, BuilderError> {
    match value.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(invalid(key, value)),
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T, BuilderError> {
    value.parse().map_err(|_| invalid(key, value))
}

fn invalid(key: &str, value: &str) -> BuilderError {
    BuilderError::InvalidProperty {
        key: key.to_string(),
        value: value.to_string(),
    }
}
