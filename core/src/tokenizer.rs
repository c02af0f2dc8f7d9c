use lazy_static::lazy_static;
use regex::Regex;
use std::ops::Range;

lazy_static! {
    static ref WORD: Regex = Regex::new(r"\w+").expect("valid regex");
}

/// Splits a buffer into tokens. Spans are byte ranges into the buffer.
///
/// The same tokenizer instance must be used when building an index and when
/// processing queries against it.
pub trait Tokenizer: Send + Sync {
    fn spans<'a>(&self, buffer: &'a str) -> Box<dyn Iterator<Item = Range<usize>> + 'a>;

    fn strings<'a>(&self, buffer: &'a str) -> Box<dyn Iterator<Item = &'a str> + 'a> {
        Box::new(self.spans(buffer).map(move |span| &buffer[span]))
    }

    fn tokens<'a>(&self, buffer: &'a str) -> Box<dyn Iterator<Item = (&'a str, Range<usize>)> + 'a> {
        Box::new(self.spans(buffer).map(move |span| (&buffer[span.clone()], span)))
    }
}

/// Word characters (`\w+`, Unicode aware); everything else separates tokens.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimpleTokenizer;

impl Tokenizer for SimpleTokenizer {
    fn spans<'a>(&self, buffer: &'a str) -> Box<dyn Iterator<Item = Range<usize>> + 'a> {
        Box::new(WORD.find_iter(buffer).map(|m| m.range()))
    }
}

/// Treats the whole buffer as a single token.
#[derive(Debug, Default, Clone, Copy)]
pub struct DummyTokenizer;

impl Tokenizer for DummyTokenizer {
    fn spans<'a>(&self, buffer: &'a str) -> Box<dyn Iterator<Item = Range<usize>> + 'a> {
        Box::new((!buffer.is_empty()).then_some(0..buffer.len()).into_iter())
    }
}

/// One token per Unicode scalar value.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnigramTokenizer;

impl Tokenizer for UnigramTokenizer {
    fn spans<'a>(&self, buffer: &'a str) -> Box<dyn Iterator<Item = Range<usize>> + 'a> {
        Box::new(buffer.char_indices().map(|(i, c)| i..i + c.len_utf8()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_splits_on_non_word_characters() {
        let tokens: Vec<_> = SimpleTokenizer.strings("Hello, wide_world! 42x").collect();
        assert_eq!(tokens, vec!["Hello", "wide_world", "42x"]);
        let spans: Vec<_> = SimpleTokenizer.spans("  ab cd").collect();
        assert_eq!(spans, vec![2..4, 5..7]);
    }

    #[test]
    fn dummy_yields_whole_buffer() {
        assert_eq!(DummyTokenizer.strings("a b c").collect::<Vec<_>>(), vec!["a b c"]);
        assert_eq!(DummyTokenizer.strings("").count(), 0);
    }

    #[test]
    fn unigram_respects_multibyte_characters() {
        let tokens: Vec<_> = UnigramTokenizer.tokens("aé").collect();
        assert_eq!(tokens, vec![("a", 0..1), ("é", 1..3)]);
    }
}
