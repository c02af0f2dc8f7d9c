use crate::DocId;
use serde::{Deserialize, Serialize};

/// One entry of a non-positional posting list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub document_id: DocId,
    pub term_frequency: u32,
}

impl Posting {
    pub fn new(document_id: DocId, term_frequency: u32) -> Self {
        Self { document_id, term_frequency }
    }
}
