use rust_stemmers::{Algorithm, Stemmer};
use unicode_normalization::UnicodeNormalization;

/// Turns raw text into index terms: `canonicalize` runs on whole buffers
/// before tokenization, `normalize` on each token afterwards.
pub trait Normalizer: Send + Sync {
    /// NFKC canonicalization, so that e.g. half-width and full-width forms or
    /// precomposed and combining sequences index identically.
    fn canonicalize(&self, buffer: &str) -> String {
        buffer.nfkc().collect()
    }

    fn normalize(&self, token: &str) -> String;
}

/// Case folding only.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimpleNormalizer;

impl Normalizer for SimpleNormalizer {
    fn normalize(&self, token: &str) -> String {
        token.to_lowercase()
    }
}

/// Identity normalization. Canonicalization is opt-in.
#[derive(Debug, Default, Clone, Copy)]
pub struct DummyNormalizer {
    canonicalize: bool,
}

impl DummyNormalizer {
    pub fn new(canonicalize: bool) -> Self {
        Self { canonicalize }
    }
}

impl Normalizer for DummyNormalizer {
    fn canonicalize(&self, buffer: &str) -> String {
        if self.canonicalize {
            buffer.nfkc().collect()
        } else {
            buffer.to_string()
        }
    }

    fn normalize(&self, token: &str) -> String {
        token.to_string()
    }
}

/// Lowercases and applies English Snowball (Porter 2) stemming.
pub struct PorterNormalizer {
    stemmer: Stemmer,
}

impl PorterNormalizer {
    pub fn new() -> Self {
        Self { stemmer: Stemmer::create(Algorithm::English) }
    }
}

impl Default for PorterNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer for PorterNormalizer {
    fn normalize(&self, token: &str) -> String {
        self.stemmer.stem(&token.to_lowercase()).into_owned()
    }
}
