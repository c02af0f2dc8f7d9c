//! In-memory inverted index with Boolean and ranked N-of-M retrieval.
//!
//! The index is built once over a [`Corpus`] using an explicitly supplied
//! [`Normalizer`] and [`Tokenizer`]; the same pair processes queries. Two
//! engines run on top of it:
//! - [`BooleanSearchEngine`]: unranked `AND`/`OR`/`ANDNOT` expressions,
//!   optionally reordered by estimated cost before evaluation.
//! - [`SimpleSearchEngine`]: ranked N-of-M matching using document-at-a-time
//!   traversal, a pluggable [`Ranker`] and a bounded [`Sieve`].

pub mod boolean;
pub mod codec;
pub mod config;
pub mod corpus;
pub mod dictionary;
pub mod document;
pub mod index;
pub mod merger;
pub mod normalizer;
pub mod posting;
pub mod postinglist;
pub mod ranker;
pub mod search;
pub mod sieve;
pub mod tokenizer;

pub use boolean::{BooleanOptions, BooleanSearchEngine, Expr, QueryError};
pub use config::{IndexConfig, NormalizerKind, RankerKind, TokenizerKind};
pub use corpus::{Corpus, InMemoryCorpus};
pub use dictionary::Dictionary;
pub use document::Document;
pub use index::{AccessLoggedInvertedIndex, InMemoryInvertedIndex, InvertedIndex, Postings};
pub use normalizer::{DummyNormalizer, Normalizer, PorterNormalizer, SimpleNormalizer};
pub use posting::Posting;
pub use postinglist::PostingList;
pub use ranker::{BetterRanker, Ranker, SimpleRanker};
pub use search::{Hit, SearchOptions, SimpleSearchEngine};
pub use sieve::Sieve;
pub use tokenizer::{DummyTokenizer, SimpleTokenizer, Tokenizer, UnigramTokenizer};

pub type TermId = u32;
pub type DocId = u32;
