use crate::TermId;
use std::collections::HashMap;

/// Maps vocabulary terms to dense term ids `0..size()`, first come first served.
///
/// Supports concurrent lookups through `&self`; inserts need `&mut self`.
#[derive(Debug, Default, Clone)]
pub struct Dictionary {
    ids: HashMap<String, TermId>,
    terms: Vec<String>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Returns the id of `term`, assigning the next free id if it is new.
    pub fn add_if_absent(&mut self, term: &str) -> TermId {
        if let Some(&id) = self.ids.get(term) {
            return id;
        }
        let id = self.terms.len() as TermId;
        self.ids.insert(term.to_string(), id);
        self.terms.push(term.to_string());
        id
    }

    pub fn get_term_id(&self, term: &str) -> Option<TermId> {
        self.ids.get(term).copied()
    }

    pub fn get_term(&self, term_id: TermId) -> Option<&str> {
        self.terms.get(term_id as usize).map(String::as_str)
    }

    /// All `(term, term_id)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, TermId)> + '_ {
        self.terms.iter().enumerate().map(|(id, term)| (term.as_str(), id as TermId))
    }
}
