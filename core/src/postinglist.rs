//! Append-only posting lists, plain or gap + variable-byte compressed.

use crate::codec;
use crate::posting::Posting;
use crate::DocId;

#[derive(Debug, Clone)]
enum Storage {
    Plain(Vec<Posting>),
    Compressed { data: Vec<u8>, len: usize },
}

/// Postings for one term, strictly increasing by document id.
///
/// Appending out of order, appending a zero term frequency, or appending
/// after [`PostingList::finalize`] indicates a broken indexing invariant and
/// panics.
#[derive(Debug, Clone)]
pub struct PostingList {
    storage: Storage,
    last_document_id: Option<DocId>,
    finalized: bool,
}

impl PostingList {
    pub fn new() -> Self {
        Self::with_storage(Storage::Plain(Vec::new()))
    }

    pub fn compressed() -> Self {
        Self::with_storage(Storage::Compressed { data: Vec::new(), len: 0 })
    }

    fn with_storage(storage: Storage) -> Self {
        Self { storage, last_document_id: None, finalized: false }
    }

    pub fn is_compressed(&self) -> bool {
        matches!(self.storage, Storage::Compressed { .. })
    }

    pub fn len(&self) -> usize {
        match &self.storage {
            Storage::Plain(postings) => postings.len(),
            Storage::Compressed { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the posting payload in bytes.
    pub fn heap_size(&self) -> usize {
        match &self.storage {
            Storage::Plain(postings) => postings.len() * std::mem::size_of::<Posting>(),
            Storage::Compressed { data, .. } => data.len(),
        }
    }

    pub fn append_posting(&mut self, posting: Posting) {
        assert!(!self.finalized, "append to a finalized posting list");
        assert!(posting.term_frequency > 0, "posting for document {} has zero term frequency", posting.document_id);
        let previous = self.last_document_id.unwrap_or(0);
        if let Some(last) = self.last_document_id {
            assert!(
                posting.document_id > last,
                "posting for document {} appended after document {}",
                posting.document_id,
                last
            );
        }
        match &mut self.storage {
            Storage::Plain(postings) => postings.push(posting),
            Storage::Compressed { data, len } => {
                codec::encode(posting.document_id - previous, data);
                codec::encode(posting.term_frequency, data);
                *len += 1;
            }
        }
        self.last_document_id = Some(posting.document_id);
    }

    /// Marks the list complete. Both encodings write eagerly, so this only
    /// seals the list against further appends.
    pub fn finalize(&mut self) {
        self.finalized = true;
        if let Storage::Plain(postings) = &mut self.storage {
            postings.shrink_to_fit();
        }
    }

    /// A fresh cursor positioned before the first posting.
    pub fn iter(&self) -> PostingsIter<'_> {
        match &self.storage {
            Storage::Plain(postings) => PostingsIter::Plain(postings.iter()),
            Storage::Compressed { data, .. } => PostingsIter::Compressed(CompressedIter { data, offset: 0, document_id: 0 }),
        }
    }
}

impl Default for PostingList {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a PostingList {
    type Item = Posting;
    type IntoIter = PostingsIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub enum PostingsIter<'a> {
    Plain(std::slice::Iter<'a, Posting>),
    Compressed(CompressedIter<'a>),
}

impl Iterator for PostingsIter<'_> {
    type Item = Posting;

    fn next(&mut self) -> Option<Posting> {
        match self {
            PostingsIter::Plain(it) => it.next().copied(),
            PostingsIter::Compressed(it) => it.next(),
        }
    }
}

/// Decodes `(gap, term_frequency)` pairs, accumulating document ids.
pub struct CompressedIter<'a> {
    data: &'a [u8],
    offset: usize,
    document_id: DocId,
}

impl Iterator for CompressedIter<'_> {
    type Item = Posting;

    fn next(&mut self) -> Option<Posting> {
        if self.offset >= self.data.len() {
            return None;
        }
        let (gap, read) = codec::decode(self.data, self.offset)?;
        self.offset += read;
        let (term_frequency, read) = codec::decode(self.data, self.offset)?;
        self.offset += read;
        self.document_id += gap;
        Some(Posting::new(self.document_id, term_frequency))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample() -> Vec<Posting> {
        vec![Posting::new(3, 1), Posting::new(7, 4), Posting::new(130, 2), Posting::new(100_000, 300)]
    }

    fn check_append_and_iterate(mut list: PostingList) {
        for posting in sample() {
            list.append_posting(posting);
        }
        list.finalize();
        assert_eq!(list.len(), 4);
        assert_eq!(list.iter().collect::<Vec<_>>(), sample());
        // Restartable: a second pass sees the same sequence.
        assert_eq!(list.iter().collect::<Vec<_>>(), sample());
    }

    #[test]
    fn plain_append_and_iterate() {
        check_append_and_iterate(PostingList::new());
    }

    #[test]
    fn compressed_append_and_iterate() {
        check_append_and_iterate(PostingList::compressed());
    }

    #[test]
    fn first_posting_may_be_document_zero() {
        let mut list = PostingList::compressed();
        list.append_posting(Posting::new(0, 5));
        list.append_posting(Posting::new(1, 1));
        assert_eq!(list.iter().collect::<Vec<_>>(), vec![Posting::new(0, 5), Posting::new(1, 1)]);
    }

    #[test]
    fn compressed_is_smaller_for_clustered_ids() {
        let mut plain = PostingList::new();
        let mut packed = PostingList::compressed();
        for id in 0..1000 {
            plain.append_posting(Posting::new(id, 1));
            packed.append_posting(Posting::new(id, 1));
        }
        assert_eq!(packed.heap_size(), 2000);
        assert!(plain.heap_size() > 3 * packed.heap_size());
    }

    #[test]
    #[should_panic(expected = "appended after document")]
    fn rejects_out_of_order_append() {
        let mut list = PostingList::new();
        list.append_posting(Posting::new(5, 1));
        list.append_posting(Posting::new(5, 1));
    }

    #[test]
    #[should_panic(expected = "appended after document")]
    fn compressed_rejects_out_of_order_append() {
        let mut list = PostingList::compressed();
        list.append_posting(Posting::new(5, 1));
        list.append_posting(Posting::new(2, 1));
    }

    #[test]
    #[should_panic(expected = "zero term frequency")]
    fn rejects_zero_frequency() {
        PostingList::new().append_posting(Posting::new(1, 0));
    }

    #[test]
    #[should_panic(expected = "finalized")]
    fn rejects_append_after_finalize() {
        let mut list = PostingList::new();
        list.finalize();
        list.append_posting(Posting::new(1, 1));
    }

    /// Strictly increasing ids from a start and positive gaps, cut off
    /// before the id would overflow.
    fn postings() -> impl Strategy<Value = Vec<Posting>> {
        let start = prop_oneof![Just(0u32), any::<u32>()];
        let gap = prop_oneof![1u32..200, 1u32..=u32::MAX];
        let tf = prop_oneof![1u32..10, 1u32..=u32::MAX];
        (start, prop::collection::vec((gap, tf), 0..100)).prop_map(|(start, steps)| {
            let mut postings = Vec::new();
            let mut next = Some(start);
            for (gap, tf) in steps {
                let Some(document_id) = next else { break };
                postings.push(Posting::new(document_id, tf));
                next = document_id.checked_add(gap);
            }
            postings
        })
    }

    proptest! {
        #[test]
        fn compressed_matches_plain(postings in postings()) {
            let mut plain = PostingList::new();
            let mut packed = PostingList::compressed();
            for posting in &postings {
                plain.append_posting(*posting);
                packed.append_posting(*posting);
            }
            packed.finalize();
            prop_assert_eq!(packed.len(), postings.len());
            prop_assert_eq!(packed.iter().collect::<Vec<_>>(), plain.iter().collect::<Vec<_>>());
            prop_assert_eq!(packed.iter().collect::<Vec<_>>(), postings);
        }
    }
}
