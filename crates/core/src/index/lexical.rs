use super::{order_hits, EvidenceIndex};
use crate::error::SearchError;
use crate::models::{EvidenceChunk, EvidenceHit};
use async_trait::async_trait;
use std::collections::BTreeSet;

/// Lexical stub backend: no model dependency, no build-time state beyond
/// the chunk list itself. Each query re-scans the chunks and scores by the
/// fraction of distinct query terms the chunk contains. Drop-in substitute
/// for the vector backend under the same search contract.
pub struct LexicalIndex {
    chunks: Vec<EvidenceChunk>,
    doc_ids: BTreeSet<String>,
}

impl LexicalIndex {
    pub fn build(chunks: Vec<EvidenceChunk>) -> Self {
        let doc_ids = chunks.iter().map(|chunk| chunk.doc_id.clone()).collect();
        Self { chunks, doc_ids }
    }
}

fn query_terms(query: &str) -> Vec<String> {
    let mut terms: Vec<String> = query
        .split_whitespace()
        .map(|token| token.to_lowercase())
        .filter(|token| token.len() > 2)
        .collect();
    terms.sort_unstable();
    terms.dedup();
    terms
}

/// Bounded overlap score in [0, 1]: matched distinct terms over total
/// distinct terms, case-insensitive substring matching.
fn overlap_score(text: &str, terms: &[String]) -> f64 {
    if terms.is_empty() {
        return 0.0;
    }

    let lowered = text.to_lowercase();
    let matched = terms
        .iter()
        .filter(|term| lowered.contains(term.as_str()))
        .count();

    matched as f64 / terms.len() as f64
}

#[async_trait]
impl EvidenceIndex for LexicalIndex {
    async fn search(
        &self,
        query: &str,
        top_k: usize,
        doc_id: Option<&str>,
    ) -> Result<Vec<EvidenceHit>, SearchError> {
        if let Some(filter) = doc_id {
            if !self.doc_ids.contains(filter) {
                return Err(SearchError::UnknownDocument(filter.to_string()));
            }
        }

        let terms = query_terms(query);

        // Filter before scoring: only the named document's chunks are scored.
        let mut hits: Vec<EvidenceHit> = self
            .chunks
            .iter()
            .filter(|chunk| doc_id.map_or(true, |filter| chunk.doc_id == filter))
            .filter_map(|chunk| {
                let score = overlap_score(&chunk.text, &terms);
                if score > 0.0 {
                    Some(EvidenceHit {
                        chunk: chunk.clone(),
                        score,
                    })
                } else {
                    None
                }
            })
            .collect();

        order_hits(&mut hits);
        hits.truncate(top_k.max(1));
        Ok(hits)
    }
}
