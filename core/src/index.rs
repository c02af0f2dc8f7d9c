use crate::corpus::Corpus;
use crate::dictionary::Dictionary;
use crate::normalizer::Normalizer;
use crate::posting::Posting;
use crate::postinglist::PostingList;
use crate::tokenizer::Tokenizer;
use crate::DocId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Lazy sequence of postings in ascending document id order.
pub type Postings<'a> = Box<dyn Iterator<Item = Posting> + 'a>;

/// Read-only view of an inverted index.
pub trait InvertedIndex: Send + Sync {
    /// Runs `buffer` through the same canonicalize/tokenize/normalize pipeline
    /// used at build time. Terms need not be in the vocabulary.
    fn get_terms<'a>(&'a self, buffer: &str) -> Box<dyn Iterator<Item = String> + 'a>;

    /// The vocabulary, in no particular order.
    fn get_indexed_terms(&self) -> Box<dyn Iterator<Item = &str> + '_>;

    /// Postings for `term`; empty for out-of-vocabulary terms.
    fn get_postings_iterator(&self, term: &str) -> Postings<'_>;

    fn get_document_frequency(&self, term: &str) -> usize;

    /// Total occurrences of `term` across the corpus.
    fn get_collection_frequency(&self, term: &str) -> u64 {
        self.get_postings_iterator(term).map(|p| u64::from(p.term_frequency)).sum()
    }
}

/// Single-pass, single-block in-memory index: one posting list per term id.
///
/// Only posting lists are compressed when compression is enabled; the
/// dictionary is always plain.
pub struct InMemoryInvertedIndex {
    dictionary: Dictionary,
    posting_lists: Vec<PostingList>,
    normalizer: Arc<dyn Normalizer>,
    tokenizer: Arc<dyn Tokenizer>,
    document_count: usize,
}

impl InMemoryInvertedIndex {
    /// Indexes the named fields of every document in `corpus`.
    ///
    /// The corpus must iterate in ascending document id order; posting lists
    /// rely on it to stay sorted without an explicit sort.
    pub fn build<C, S>(
        corpus: &C,
        fields: &[S],
        normalizer: Arc<dyn Normalizer>,
        tokenizer: Arc<dyn Tokenizer>,
        compressed: bool,
    ) -> Self
    where
        C: Corpus + ?Sized,
        S: AsRef<str>,
    {
        let mut index = Self {
            dictionary: Dictionary::new(),
            posting_lists: Vec::new(),
            normalizer,
            tokenizer,
            document_count: corpus.size(),
        };
        for document in corpus.iter() {
            // Term frequencies across all fields, in first-occurrence order.
            let mut slots: HashMap<String, usize> = HashMap::new();
            let mut counts: Vec<(String, u32)> = Vec::new();
            for field in fields {
                let text = document.get_field(field.as_ref(), "");
                for term in index.get_terms(&text) {
                    match slots.get(&term) {
                        Some(&slot) => counts[slot].1 += 1,
                        None => {
                            slots.insert(term.clone(), counts.len());
                            counts.push((term, 1));
                        }
                    }
                }
            }
            for (term, term_frequency) in counts {
                let term_id = index.dictionary.add_if_absent(&term);
                index.append(term_id as usize, document.document_id, term_frequency, compressed);
            }
        }
        for posting_list in &mut index.posting_lists {
            posting_list.finalize();
        }
        tracing::info!(
            documents = index.document_count,
            terms = index.dictionary.size(),
            compressed,
            posting_bytes = index.heap_size(),
            "built inverted index"
        );
        index
    }

    fn append(&mut self, slot: usize, document_id: DocId, term_frequency: u32, compressed: bool) {
        if slot == self.posting_lists.len() {
            self.posting_lists.push(if compressed { PostingList::compressed() } else { PostingList::new() });
        }
        assert!(slot < self.posting_lists.len(), "term id {slot} skips ahead of the posting lists");
        self.posting_lists[slot].append_posting(Posting::new(document_id, term_frequency));
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn posting_list(&self, term: &str) -> Option<&PostingList> {
        let term_id = self.dictionary.get_term_id(term)?;
        self.posting_lists.get(term_id as usize)
    }

    /// Number of documents the index was built over.
    pub fn document_count(&self) -> usize {
        self.document_count
    }

    /// Bytes held by posting payloads.
    pub fn heap_size(&self) -> usize {
        self.posting_lists.iter().map(PostingList::heap_size).sum()
    }
}

impl InvertedIndex for InMemoryInvertedIndex {
    fn get_terms<'a>(&'a self, buffer: &str) -> Box<dyn Iterator<Item = String> + 'a> {
        let canonical = self.normalizer.canonicalize(buffer);
        let tokens: Vec<String> = self.tokenizer.strings(&canonical).map(str::to_string).collect();
        Box::new(tokens.into_iter().map(move |token| self.normalizer.normalize(&token)))
    }

    fn get_indexed_terms(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        Box::new(self.dictionary.iter().map(|(term, _)| term))
    }

    fn get_postings_iterator(&self, term: &str) -> Postings<'_> {
        match self.posting_list(term) {
            Some(posting_list) => Box::new(posting_list.iter()),
            None => Box::new(std::iter::empty()),
        }
    }

    fn get_document_frequency(&self, term: &str) -> usize {
        self.posting_list(term).map_or(0, PostingList::len)
    }
}

/// Wraps another index and records every `(term, document_id)` posting that
/// callers pull through it.
pub struct AccessLoggedInvertedIndex<'a> {
    inner: &'a dyn InvertedIndex,
    history: Mutex<Vec<(String, DocId)>>,
}

impl<'a> AccessLoggedInvertedIndex<'a> {
    pub fn new(inner: &'a dyn InvertedIndex) -> Self {
        Self { inner, history: Mutex::new(Vec::new()) }
    }

    pub fn history(&self) -> Vec<(String, DocId)> {
        self.history.lock().clone()
    }

    pub fn access_count(&self) -> usize {
        self.history.lock().len()
    }
}

impl InvertedIndex for AccessLoggedInvertedIndex<'_> {
    fn get_terms<'b>(&'b self, buffer: &str) -> Box<dyn Iterator<Item = String> + 'b> {
        self.inner.get_terms(buffer)
    }

    fn get_indexed_terms(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        self.inner.get_indexed_terms()
    }

    fn get_postings_iterator(&self, term: &str) -> Postings<'_> {
        let term = term.to_string();
        let history = &self.history;
        Box::new(
            self.inner
                .get_postings_iterator(&term)
                .inspect(move |posting| history.lock().push((term.clone(), posting.document_id))),
        )
    }

    fn get_document_frequency(&self, term: &str) -> usize {
        self.inner.get_document_frequency(term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::InMemoryCorpus;
    use crate::document::Document;
    use crate::normalizer::SimpleNormalizer;
    use crate::tokenizer::SimpleTokenizer;

    fn corpus() -> InMemoryCorpus {
        let mut corpus = InMemoryCorpus::new();
        corpus
            .add_document(Document::new(0, [("body", "this is a Test"), ("title", "Test title")]))
            .add_document(Document::new(1, [("body", "test TEST prØve"), ("title", "")]))
            .add_document(Document::new(2, [("body", "nothing here"), ("title", "a test")]));
        corpus
    }

    fn build(fields: &[&str], compressed: bool) -> InMemoryInvertedIndex {
        InMemoryInvertedIndex::build(&corpus(), fields, Arc::new(SimpleNormalizer), Arc::new(SimpleTokenizer), compressed)
    }

    fn postings(index: &dyn InvertedIndex, term: &str) -> Vec<(DocId, u32)> {
        index.get_postings_iterator(term).map(|p| (p.document_id, p.term_frequency)).collect()
    }

    #[test]
    fn access_postings() {
        for compressed in [false, true] {
            let index = build(&["body"], compressed);
            assert_eq!(postings(&index, "test"), vec![(0, 1), (1, 2)]);
            assert_eq!(postings(&index, "prøve"), vec![(1, 1)]);
            assert!(postings(&index, "Test").is_empty());
            assert!(postings(&index, "wtf").is_empty());
            assert_eq!(index.get_document_frequency("test"), 2);
            assert_eq!(index.get_document_frequency("wtf"), 0);
            assert_eq!(index.get_collection_frequency("test"), 3);
            assert_eq!(index.get_collection_frequency("wtf"), 0);
        }
    }

    #[test]
    fn access_vocabulary() {
        let index = build(&["body"], false);
        let mut terms: Vec<&str> = index.get_indexed_terms().collect();
        terms.sort_unstable();
        assert_eq!(terms, vec!["a", "here", "is", "nothing", "prøve", "test", "this"]);
        assert_eq!(index.dictionary().get_term_id("this"), Some(0));
    }

    #[test]
    fn multiple_fields_share_term_frequencies() {
        let index = build(&["body", "title"], false);
        assert_eq!(postings(&index, "test"), vec![(0, 2), (1, 2), (2, 1)]);
        assert_eq!(postings(&index, "title"), vec![(0, 1)]);
        assert_eq!(index.document_count(), 3);
    }

    #[test]
    fn compressed_and_plain_agree() {
        let plain = build(&["body", "title"], false);
        let packed = build(&["body", "title"], true);
        for term in plain.get_indexed_terms() {
            assert_eq!(postings(&plain, term), postings(&packed, term), "term {term}");
        }
    }

    #[test]
    fn get_terms_uses_the_shared_pipeline() {
        let index = build(&["body"], false);
        let terms: Vec<String> = index.get_terms("ﾘﾝｸ, Water  POLLUTION").collect();
        assert_eq!(terms, vec!["リンク", "water", "pollution"]);
    }

    #[test]
    fn access_log_records_pulled_postings() {
        let index = build(&["body"], false);
        let logged = AccessLoggedInvertedIndex::new(&index);
        let mut it = logged.get_postings_iterator("test");
        it.next();
        assert_eq!(logged.history(), vec![("test".to_string(), 0)]);
        it.next();
        drop(it);
        assert_eq!(logged.access_count(), 2);
        assert_eq!(logged.get_document_frequency("test"), 2);
    }
}
