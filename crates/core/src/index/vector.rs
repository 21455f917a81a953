use super::{order_hits, EvidenceIndex};
use crate::embeddings::Embedder;
use crate::error::SearchError;
use crate::models::{EvidenceChunk, EvidenceHit};
use async_trait::async_trait;
use std::collections::BTreeSet;

struct EmbeddedChunk {
    chunk: EvidenceChunk,
    vector: Vec<f32>,
}

/// Similarity-search backend. Every chunk is embedded once at build time
/// through the supplied transform; queries go through the same transform
/// and rank by cosine similarity. The transform itself is a black box to
/// this index.
pub struct VectorIndex {
    entries: Vec<EmbeddedChunk>,
    doc_ids: BTreeSet<String>,
    embedder: Box<dyn Embedder>,
}

impl VectorIndex {
    pub fn build(
        chunks: Vec<EvidenceChunk>,
        embedder: Box<dyn Embedder>,
    ) -> Result<Self, SearchError> {
        let mut entries = Vec::with_capacity(chunks.len());
        let mut doc_ids = BTreeSet::new();

        for chunk in chunks {
            let vector = embedder.embed(&chunk.text)?;
            if vector.len() != embedder.dimensions() {
                return Err(SearchError::BackendResponse {
                    backend: "embedding".to_string(),
                    details: format!(
                        "vector length {} is not {}",
                        vector.len(),
                        embedder.dimensions()
                    ),
                });
            }

            doc_ids.insert(chunk.doc_id.clone());
            entries.push(EmbeddedChunk {
                vector: unit_normalize(vector),
                chunk,
            });
        }

        Ok(Self {
            entries,
            doc_ids,
            embedder,
        })
    }
}

fn unit_normalize(mut vector: Vec<f32>) -> Vec<f32> {
    let magnitude = vector.iter().map(|value| value * value).sum::<f32>().sqrt();
    if magnitude > 0.0 {
        for value in &mut vector {
            *value /= magnitude;
        }
    }
    vector
}

fn dot(left: &[f32], right: &[f32]) -> f64 {
    left.iter()
        .zip(right)
        .map(|(l, r)| (l * r) as f64)
        .sum()
}

#[async_trait]
impl EvidenceIndex for VectorIndex {
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

        let query_vector = unit_normalize(self.embedder.embed(query)?);

        // Filter before scoring: only the named document's chunks are scored.
        let mut hits: Vec<EvidenceHit> = self
            .entries
            .iter()
            .filter(|entry| doc_id.map_or(true, |filter| entry.chunk.doc_id == filter))
            .filter_map(|entry| {
                let score = dot(&entry.vector, &query_vector);
                if score > 0.0 {
                    Some(EvidenceHit {
                        chunk: entry.chunk.clone(),
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
