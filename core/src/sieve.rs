use ordered_float::OrderedFloat;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Keeps the `capacity` highest-scoring items seen so far.
///
/// Ties at the cut-off are resolved in favour of the item sifted first.
#[derive(Debug, Clone)]
pub struct Sieve<T> {
    capacity: usize,
    sequence: u64,
    heap: BinaryHeap<Reverse<Entry<T>>>,
}

#[derive(Debug, Clone)]
struct Entry<T> {
    score: OrderedFloat<f64>,
    // Later arrivals rank lower among equal scores.
    sequence: Reverse<u64>,
    item: T,
}

impl<T> Entry<T> {
    fn key(&self) -> (OrderedFloat<f64>, Reverse<u64>) {
        (self.score, self.sequence)
    }
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl<T> Sieve<T> {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "sieve capacity must be positive");
        Self { capacity, sequence: 0, heap: BinaryHeap::with_capacity(capacity + 1) }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Offers an item. It is kept if the sieve has room or it beats the
    /// current minimum.
    pub fn sift(&mut self, score: f64, item: T) {
        let entry = Entry { score: OrderedFloat(score), sequence: Reverse(self.sequence), item };
        self.sequence += 1;
        if self.heap.len() < self.capacity {
            self.heap.push(Reverse(entry));
            return;
        }
        if let Some(Reverse(min)) = self.heap.peek() {
            if entry.score > min.score {
                self.heap.pop();
                self.heap.push(Reverse(entry));
            }
        }
    }

    pub fn sift_all<I: IntoIterator<Item = (f64, T)>>(&mut self, items: I) {
        for (score, item) in items {
            self.sift(score, item);
        }
    }

    /// Score of the weakest retained item, once the sieve is full.
    pub fn threshold(&self) -> Option<f64> {
        if self.heap.len() < self.capacity {
            return None;
        }
        self.heap.peek().map(|Reverse(entry)| entry.score.into_inner())
    }

    /// Retained items, highest score first.
    pub fn winners(self) -> Vec<(f64, T)> {
        let mut entries: Vec<Entry<T>> = self.heap.into_iter().map(|Reverse(entry)| entry).collect();
        entries.sort_unstable_by(|a, b| b.cmp(a));
        entries.into_iter().map(|entry| (entry.score.into_inner(), entry.item)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn keeps_top_k_in_descending_order() {
        let mut sieve = Sieve::new(3);
        sieve.sift_all([(1.0, 'a'), (5.0, 'b'), (3.0, 'c'), (4.0, 'd'), (2.0, 'e')]);
        assert_eq!(sieve.len(), 3);
        assert_eq!(sieve.threshold(), Some(3.0));
        assert_eq!(sieve.winners(), vec![(5.0, 'b'), (4.0, 'd'), (3.0, 'c')]);
    }

    #[test]
    fn fewer_items_than_capacity() {
        let mut sieve = Sieve::new(10);
        sieve.sift(0.5, "x");
        assert_eq!(sieve.threshold(), None);
        assert_eq!(sieve.winners(), vec![(0.5, "x")]);
        assert!(Sieve::<u8>::new(1).winners().is_empty());
    }

    #[test]
    fn ties_keep_earliest_items() {
        let mut sieve = Sieve::new(2);
        sieve.sift_all([(1.0, 0), (1.0, 1), (1.0, 2), (1.0, 3)]);
        assert_eq!(sieve.winners(), vec![(1.0, 0), (1.0, 1)]);
    }

    #[test]
    fn items_need_not_be_comparable() {
        struct Opaque;
        let mut sieve = Sieve::new(1);
        sieve.sift(1.0, Opaque);
        sieve.sift(2.0, Opaque);
        assert_eq!(sieve.winners().len(), 1);
    }

    #[test]
    #[should_panic(expected = "capacity must be positive")]
    fn zero_capacity_is_rejected() {
        Sieve::<u8>::new(0);
    }

    proptest! {
        #[test]
        fn matches_sorting(scores in prop::collection::vec(0u32..50, 0..60), k in 1usize..10) {
            let mut sieve = Sieve::new(k);
            sieve.sift_all(scores.iter().enumerate().map(|(i, &s)| (f64::from(s), i)));
            let got: Vec<f64> = sieve.winners().into_iter().map(|(s, _)| s).collect();
            let mut expected: Vec<f64> = scores.iter().map(|&s| f64::from(s)).collect();
            expected.sort_by(|a, b| b.partial_cmp(a).unwrap());
            expected.truncate(k);
            prop_assert_eq!(got, expected);
        }
    }
}
