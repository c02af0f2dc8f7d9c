//! Single-pass merges of posting sequences sorted by document id.
//!
//! Every merge is a lazy iterator that holds the current head of each input
//! and only ever moves forward, so merging runs in `O(|a| + |b|)`.
//!
//! When both inputs hold a posting for the same document the left operand's
//! posting is emitted. Which term frequency survives a merge is not part of
//! the contract; callers must only rely on document ids.

use crate::posting::Posting;
use std::cmp::Ordering;

/// Pull-based cursor over a posting iterator: the current head plus advance.
struct Cursor<I: Iterator<Item = Posting>> {
    inner: I,
    current: Option<Posting>,
}

impl<I: Iterator<Item = Posting>> Cursor<I> {
    fn new(mut inner: I) -> Self {
        let current = inner.next();
        Self { inner, current }
    }

    fn advance(&mut self) -> Option<Posting> {
        std::mem::replace(&mut self.current, self.inner.next())
    }
}

fn compare(a: &Option<Posting>, b: &Option<Posting>) -> Option<Ordering> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.document_id.cmp(&b.document_id)),
        _ => None,
    }
}

/// `AND(a, b)`.
pub fn intersection<A, B>(a: A, b: B) -> Intersection<A::IntoIter, B::IntoIter>
where
    A: IntoIterator<Item = Posting>,
    B: IntoIterator<Item = Posting>,
{
    Intersection { left: Cursor::new(a.into_iter()), right: Cursor::new(b.into_iter()) }
}

/// `OR(a, b)`.
pub fn union<A, B>(a: A, b: B) -> Union<A::IntoIter, B::IntoIter>
where
    A: IntoIterator<Item = Posting>,
    B: IntoIterator<Item = Posting>,
{
    Union { left: Cursor::new(a.into_iter()), right: Cursor::new(b.into_iter()) }
}

/// `ANDNOT(a, b)`: postings of `a` whose document is absent from `b`.
pub fn difference<A, B>(a: A, b: B) -> Difference<A::IntoIter, B::IntoIter>
where
    A: IntoIterator<Item = Posting>,
    B: IntoIterator<Item = Posting>,
{
    Difference { left: Cursor::new(a.into_iter()), right: Cursor::new(b.into_iter()) }
}

pub struct Intersection<A: Iterator<Item = Posting>, B: Iterator<Item = Posting>> {
    left: Cursor<A>,
    right: Cursor<B>,
}

impl<A, B> Iterator for Intersection<A, B>
where
    A: Iterator<Item = Posting>,
    B: Iterator<Item = Posting>,
{
    type Item = Posting;

    fn next(&mut self) -> Option<Posting> {
        loop {
            match compare(&self.left.current, &self.right.current)? {
                Ordering::Less => {
                    self.left.advance();
                }
                Ordering::Greater => {
                    self.right.advance();
                }
                Ordering::Equal => {
                    self.right.advance();
                    return self.left.advance();
                }
            }
        }
    }
}

pub struct Union<A: Iterator<Item = Posting>, B: Iterator<Item = Posting>> {
    left: Cursor<A>,
    right: Cursor<B>,
}

impl<A, B> Iterator for Union<A, B>
where
    A: Iterator<Item = Posting>,
    B: Iterator<Item = Posting>,
{
    type Item = Posting;

    fn next(&mut self) -> Option<Posting> {
        match compare(&self.left.current, &self.right.current) {
            Some(Ordering::Less) => self.left.advance(),
            Some(Ordering::Greater) => self.right.advance(),
            Some(Ordering::Equal) => {
                self.right.advance();
                self.left.advance()
            }
            // One side is exhausted: drain the other.
            None => self.left.advance().or_else(|| self.right.advance()),
        }
    }
}

pub struct Difference<A: Iterator<Item = Posting>, B: Iterator<Item = Posting>> {
    left: Cursor<A>,
    right: Cursor<B>,
}

impl<A, B> Iterator for Difference<A, B>
where
    A: Iterator<Item = Posting>,
    B: Iterator<Item = Posting>,
{
    type Item = Posting;

    fn next(&mut self) -> Option<Posting> {
        loop {
            match compare(&self.left.current, &self.right.current) {
                Some(Ordering::Less) => return self.left.advance(),
                Some(Ordering::Greater) => {
                    self.right.advance();
                }
                Some(Ordering::Equal) => {
                    self.left.advance();
                    self.right.advance();
                }
                None => return self.left.advance(),
            }
        }
    }
}
