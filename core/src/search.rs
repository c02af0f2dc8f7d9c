//! N-of-M ranked retrieval.
//!
//! For a query with `M` unique terms and match threshold `T`, a document
//! qualifies if it contains at least `N = max(1, floor(T * M))` of them. With
//! `T = 1.0` this is an AND over the unique terms; small `T` approaches an OR.
//! Qualifying documents are scored with a [`Ranker`] and the best `hit_count`
//! are returned, highest score first.

use crate::corpus::Corpus;
use crate::document::Document;
use crate::index::{InvertedIndex, Postings};
use crate::posting::Posting;
use crate::ranker::Ranker;
use crate::sieve::Sieve;
use crate::DocId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.5;
pub const DEFAULT_HIT_COUNT: usize = 10;
pub const MAX_HIT_COUNT: usize = 100;

/// Per-query knobs. Out-of-range values are clamped, not rejected.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    pub match_threshold: f64,
    pub hit_count: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self { match_threshold: DEFAULT_MATCH_THRESHOLD, hit_count: DEFAULT_HIT_COUNT }
    }
}

impl SearchOptions {
    /// Threshold clamped to `[0, 1]`; NaN falls back to the default.
    pub fn effective_match_threshold(&self) -> f64 {
        if self.match_threshold.is_nan() {
            DEFAULT_MATCH_THRESHOLD
        } else {
            self.match_threshold.clamp(0.0, 1.0)
        }
    }

    pub fn effective_hit_count(&self) -> usize {
        self.hit_count.clamp(1, MAX_HIT_COUNT)
    }

    /// How many of `unique_terms` query terms a document must contain.
    pub fn required_minimum(&self, unique_terms: usize) -> usize {
        let n = (self.effective_match_threshold() * unique_terms as f64).floor() as usize;
        n.min(unique_terms).max(1)
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Hit<'a> {
    pub score: f64,
    pub document: &'a Document,
}

/// Position in one unique query term's posting list.
struct TermCursor<'a> {
    term: String,
    multiplicity: u32,
    postings: Postings<'a>,
    current: Option<Posting>,
}

impl<'a> TermCursor<'a> {
    fn new(term: String, multiplicity: u32, mut postings: Postings<'a>) -> Self {
        let current = postings.next();
        Self { term, multiplicity, postings, current }
    }

    fn document_id(&self) -> Option<DocId> {
        self.current.map(|posting| posting.document_id)
    }

    fn advance(&mut self) {
        self.current = self.postings.next();
    }
}

pub struct SimpleSearchEngine<'a> {
    corpus: &'a dyn Corpus,
    index: &'a dyn InvertedIndex,
}

impl<'a> SimpleSearchEngine<'a> {
    pub fn new(corpus: &'a dyn Corpus, index: &'a dyn InvertedIndex) -> Self {
        Self { corpus, index }
    }

    /// Unique terms of `query` in first-occurrence order, with how often each
    /// occurs.
    pub fn unique_terms(&self, query: &str) -> Vec<(String, u32)> {
        let mut slots: HashMap<String, usize> = HashMap::new();
        let mut terms: Vec<(String, u32)> = Vec::new();
        for term in self.index.get_terms(query) {
            match slots.get(&term) {
                Some(&slot) => terms[slot].1 += 1,
                None => {
                    slots.insert(term.clone(), terms.len());
                    terms.push((term, 1));
                }
            }
        }
        terms
    }

    /// Ranks documents matching at least N of the M unique query terms.
    ///
    /// Posting lists are traversed document at a time, so each qualifying
    /// document is scored exactly once and only the winners are fetched from
    /// the corpus.
    pub fn evaluate(
        &self,
        query: &str,
        options: &SearchOptions,
        ranker: &mut dyn Ranker,
    ) -> impl Iterator<Item = Hit<'a>> + 'a {
        let terms = self.unique_terms(query);
        let required_minimum = options.required_minimum(terms.len());
        let unique_terms = terms.len();

        let mut cursors: Vec<TermCursor<'a>> = terms
            .into_iter()
            .map(|(term, multiplicity)| {
                let postings = self.index.get_postings_iterator(&term);
                TermCursor::new(term, multiplicity, postings)
            })
            .filter(|cursor| cursor.current.is_some())
            .collect();

        let mut sieve = Sieve::new(options.effective_hit_count());
        let mut scored = 0usize;
        while cursors.len() >= required_minimum {
            let Some(document_id) = cursors.iter().filter_map(TermCursor::document_id).min() else {
                break;
            };
            let frontier: Vec<usize> = (0..cursors.len())
                .filter(|&i| cursors[i].document_id() == Some(document_id))
                .collect();

            if frontier.len() >= required_minimum {
                ranker.reset(document_id);
                for &i in &frontier {
                    let cursor = &cursors[i];
                    if let Some(posting) = &cursor.current {
                        ranker.update(&cursor.term, cursor.multiplicity, posting);
                    }
                }
                sieve.sift(ranker.evaluate(), document_id);
                scored += 1;
            }

            for &i in &frontier {
                cursors[i].advance();
            }
            cursors.retain(|cursor| cursor.current.is_some());
        }

        tracing::debug!(unique_terms, required_minimum, scored, "ranked query");

        let corpus = self.corpus;
        sieve.winners().into_iter().filter_map(move |(score, document_id)| {
            corpus.get_document(document_id).map(|document| Hit { score, document })
        })
    }
}
