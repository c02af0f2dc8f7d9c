//! Named choices for the pluggable pieces, shared by the binaries.

use crate::corpus::Corpus;
use crate::index::{InMemoryInvertedIndex, InvertedIndex};
use crate::normalizer::{DummyNormalizer, Normalizer, PorterNormalizer, SimpleNormalizer};
use crate::ranker::{BetterRanker, Ranker, SimpleRanker};
use crate::tokenizer::{DummyTokenizer, SimpleTokenizer, Tokenizer, UnigramTokenizer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

macro_rules! named_kind {
    ($kind:ident { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $kind {
            pub const NAMES: &'static [&'static str] = &[$($name),+];

            pub fn name(self) -> &'static str {
                match self {
                    $($kind::$variant => $name),+
                }
            }
        }

        impl FromStr for $kind {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_ascii_lowercase().as_str() {
                    $($name => Ok($kind::$variant),)+
                    other => Err(format!("unknown {} '{other}', expected one of: {}", stringify!($kind), Self::NAMES.join(", "))),
                }
            }
        }

        impl fmt::Display for $kind {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizerKind {
    #[default]
    Simple,
    Porter,
    Dummy,
}

named_kind!(NormalizerKind { Simple => "simple", Porter => "porter", Dummy => "dummy" });

impl NormalizerKind {
    pub fn create(self) -> Arc<dyn Normalizer> {
        match self {
            NormalizerKind::Simple => Arc::new(SimpleNormalizer),
            NormalizerKind::Porter => Arc::new(PorterNormalizer::new()),
            NormalizerKind::Dummy => Arc::new(DummyNormalizer::new(true)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenizerKind {
    #[default]
    Simple,
    Unigram,
    Dummy,
}

named_kind!(TokenizerKind { Simple => "simple", Unigram => "unigram", Dummy => "dummy" });

impl TokenizerKind {
    pub fn create(self) -> Arc<dyn Tokenizer> {
        match self {
            TokenizerKind::Simple => Arc::new(SimpleTokenizer),
            TokenizerKind::Unigram => Arc::new(UnigramTokenizer),
            TokenizerKind::Dummy => Arc::new(DummyTokenizer),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankerKind {
    #[default]
    Simple,
    Better,
}

named_kind!(RankerKind { Simple => "simple", Better => "better" });

impl RankerKind {
    pub fn create<'a>(self, corpus: &'a dyn Corpus, index: &'a dyn InvertedIndex) -> Box<dyn Ranker + 'a> {
        match self {
            RankerKind::Simple => Box::new(SimpleRanker::new()),
            RankerKind::Better => Box::new(BetterRanker::new(corpus, index)),
        }
    }
}

/// How to build an index over a corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub fields: Vec<String>,
    pub compressed: bool,
    pub normalizer: NormalizerKind,
    pub tokenizer: TokenizerKind,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            fields: vec!["body".to_string()],
            compressed: false,
            normalizer: NormalizerKind::default(),
            tokenizer: TokenizerKind::default(),
        }
    }
}

impl IndexConfig {
    pub fn build<C: Corpus + ?Sized>(&self, corpus: &C) -> InMemoryInvertedIndex {
        tracing::debug!(
            fields = ?self.fields,
            normalizer = %self.normalizer,
            tokenizer = %self.tokenizer,
            compressed = self.compressed,
            "building index"
        );
        InMemoryInvertedIndex::build(
            corpus,
            self.fields.as_slice(),
            self.normalizer.create(),
            self.tokenizer.create(),
            self.compressed,
        )
    }
}
