use crate::corpus::Corpus;
use crate::index::InvertedIndex;
use crate::posting::Posting;
use crate::DocId;

/// Per-document score accumulator for document-at-a-time traversal.
///
/// A search calls `reset` once per candidate document, `update` once per
/// matching unique query term, then `evaluate`.
pub trait Ranker {
    fn reset(&mut self, document_id: DocId);

    /// `multiplicity` is how many times `term` occurs in the query.
    fn update(&mut self, term: &str, multiplicity: u32, posting: &Posting);

    fn evaluate(&self) -> f64;
}

fn check_update(current: Option<DocId>, multiplicity: u32, posting: &Posting) {
    assert_eq!(current, Some(posting.document_id), "posting does not belong to the current document");
    assert!(multiplicity > 0, "query term multiplicity must be positive");
    assert!(posting.term_frequency > 0, "term frequency must be positive");
}

/// Scores by raw term frequency, weighted by query multiplicity.
#[derive(Debug, Default, Clone)]
pub struct SimpleRanker {
    document_id: Option<DocId>,
    score: f64,
}

impl SimpleRanker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Ranker for SimpleRanker {
    fn reset(&mut self, document_id: DocId) {
        self.document_id = Some(document_id);
        self.score = 0.0;
    }

    fn update(&mut self, _term: &str, multiplicity: u32, posting: &Posting) {
        check_update(self.document_id, multiplicity, posting);
        self.score += f64::from(multiplicity) * f64::from(posting.term_frequency);
    }

    fn evaluate(&self) -> f64 {
        self.score
    }
}

/// TF-IDF with log-scaled term frequency, plus an optional static document
/// score read from the `static_quality_score` field.
pub struct BetterRanker<'a> {
    corpus: &'a dyn Corpus,
    index: &'a dyn InvertedIndex,
    document_id: Option<DocId>,
    score: f64,
}

impl<'a> BetterRanker<'a> {
    pub const DYNAMIC_SCORE_WEIGHT: f64 = 1.0;
    pub const STATIC_SCORE_WEIGHT: f64 = 1.0;
    pub const STATIC_SCORE_FIELD: &'static str = "static_quality_score";
    pub const STATIC_SCORE_DEFAULT: f64 = 0.0;

    pub fn new(corpus: &'a dyn Corpus, index: &'a dyn InvertedIndex) -> Self {
        Self { corpus, index, document_id: None, score: 0.0 }
    }

    fn static_score(&self, document_id: DocId) -> f64 {
        self.corpus
            .get_document(document_id)
            .and_then(|document| document.get_number(Self::STATIC_SCORE_FIELD))
            .unwrap_or(Self::STATIC_SCORE_DEFAULT)
    }
}

impl Ranker for BetterRanker<'_> {
    fn reset(&mut self, document_id: DocId) {
        self.document_id = Some(document_id);
        self.score = Self::STATIC_SCORE_WEIGHT * self.static_score(document_id);
    }

    fn update(&mut self, term: &str, multiplicity: u32, posting: &Posting) {
        check_update(self.document_id, multiplicity, posting);
        let document_frequency = self.index.get_document_frequency(term);
        if document_frequency == 0 {
            return;
        }
        let tf = 1.0 + f64::from(posting.term_frequency).log10();
        let idf = (self.corpus.size() as f64 / document_frequency as f64).log10();
        self.score += Self::DYNAMIC_SCORE_WEIGHT * f64::from(multiplicity) * tf * idf;
    }

    fn evaluate(&self) -> f64 {
        self.score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::InMemoryCorpus;
    use crate::document::Document;
    use crate::index::InMemoryInvertedIndex;
    use crate::normalizer::SimpleNormalizer;
    use crate::tokenizer::SimpleTokenizer;
    use serde_json::{json, Value};
    use std::sync::Arc;

    #[test]
    fn simple_ranker_sums_weighted_term_frequencies() {
        let mut ranker = SimpleRanker::new();
        ranker.reset(21);
        ranker.update("foo", 2, &Posting::new(21, 4));
        ranker.update("bar", 1, &Posting::new(21, 3));
        assert_eq!(ranker.evaluate(), 11.0);
        ranker.reset(42);
        ranker.update("foo", 1, &Posting::new(42, 1));
        ranker.update("baz", 2, &Posting::new(42, 2));
        assert_eq!(ranker.evaluate(), 5.0);
    }

    #[test]
    #[should_panic(expected = "current document")]
    fn simple_ranker_rejects_foreign_posting() {
        let mut ranker = SimpleRanker::new();
        ranker.reset(21);
        ranker.update("foo", 1, &Posting::new(42, 4));
    }

    #[test]
    #[should_panic(expected = "multiplicity")]
    fn simple_ranker_rejects_zero_multiplicity() {
        let mut ranker = SimpleRanker::new();
        ranker.reset(1);
        ranker.update("foo", 0, &Posting::new(1, 1));
    }

    fn corpus() -> InMemoryCorpus {
        let rows: [(&str, Option<f64>); 8] = [
            ("the foo", Some(0.9)),
            ("the foo", Some(0.2)),
            ("the foo foo", Some(0.2)),
            ("the bar", None),
            ("the bar bar", None),
            ("the baz", None),
            ("the baz", None),
            ("the baz baz", None),
        ];
        let mut corpus = InMemoryCorpus::new();
        for (id, (title, quality)) in rows.into_iter().enumerate() {
            let mut fields: Vec<(&str, Value)> = vec![("title", json!(title))];
            if let Some(quality) = quality {
                fields.push(("static_quality_score", json!(quality)));
            }
            corpus.add_document(Document::new(id as DocId, fields));
        }
        corpus
    }

    fn score(ranker: &mut BetterRanker<'_>, term: &str, posting: Posting) -> f64 {
        ranker.reset(posting.document_id);
        ranker.update(term, 1, &posting);
        ranker.evaluate()
    }

    #[test]
    fn better_ranker_behaviour() {
        let corpus = corpus();
        let index = InMemoryInvertedIndex::build(&corpus, &["title"], Arc::new(SimpleNormalizer), Arc::new(SimpleTokenizer), false);
        let mut ranker = BetterRanker::new(&corpus, &index);

        // Higher term frequency scores higher.
        let low = score(&mut ranker, "foo", Posting::new(1, 1));
        let high = score(&mut ranker, "foo", Posting::new(2, 2));
        assert!(low > 0.0 && high > low);

        // A term in every document carries no weight.
        assert!(score(&mut ranker, "the", Posting::new(3, 1)).abs() < 1e-8);

        // Rarer terms score higher.
        let bar = score(&mut ranker, "bar", Posting::new(3, 1));
        let baz = score(&mut ranker, "baz", Posting::new(5, 1));
        assert!(baz > 0.0 && bar > baz);

        // Static quality breaks otherwise equal scores.
        let good = score(&mut ranker, "foo", Posting::new(0, 1));
        let poor = score(&mut ranker, "foo", Posting::new(1, 1));
        assert!(poor > 0.0 && good > poor);
        assert!((good - poor - 0.7).abs() < 1e-9);

        // Unknown terms contribute nothing.
        assert!(score(&mut ranker, "wtf", Posting::new(3, 1)).abs() < 1e-12);
    }

    #[test]
    #[should_panic(expected = "current document")]
    fn better_ranker_rejects_foreign_posting() {
        let corpus = corpus();
        let index = InMemoryInvertedIndex::build(&corpus, &["title"], Arc::new(SimpleNormalizer), Arc::new(SimpleTokenizer), false);
        let mut ranker = BetterRanker::new(&corpus, &index);
        ranker.reset(21);
        ranker.update("foo", 1, &Posting::new(4, 4));
    }
}
