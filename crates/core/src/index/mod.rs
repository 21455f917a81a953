pub mod lexical;
pub mod vector;

pub use lexical::LexicalIndex;
pub use vector::VectorIndex;

use crate::error::SearchError;
use crate::models::EvidenceHit;
use async_trait::async_trait;

/// Uniform ranked-search contract over a chunked corpus.
///
/// Returned hits number at most `top_k` and are ordered by descending
/// score, ties broken by ascending `chunk_id`. An unknown `doc_id` filter
/// fails with `SearchError::UnknownDocument`; an empty corpus or a query
/// nothing matches returns an empty Vec, which is not an error. When a
/// filter is given, only that document's chunks are ever scored.
#[async_trait]
pub trait EvidenceIndex {
    async fn search(
        &self,
        query: &str,
        top_k: usize,
        doc_id: Option<&str>,
    ) -> Result<Vec<EvidenceHit>, SearchError>;
}

/// Concrete backend, chosen once when the index is built. Keeps backend
/// branching out of the orchestrator.
pub enum EvidenceBackend {
    Vector(VectorIndex),
    Lexical(LexicalIndex),
}

#[async_trait]
impl EvidenceIndex for EvidenceBackend {
    async fn search(
        &self,
        query: &str,
        top_k: usize,
        doc_id: Option<&str>,
    ) -> Result<Vec<EvidenceHit>, SearchError> {
        match self {
            EvidenceBackend::Vector(index) => index.search(query, top_k, doc_id).await,
            EvidenceBackend::Lexical(index) => index.search(query, top_k, doc_id).await,
        }
    }
}

pub(crate) fn order_hits(hits: &mut [EvidenceHit]) {
    hits.sort_by(|left, right| {
        right
            .score
            .total_cmp(&left.score)
            .then_with(|| left.chunk.chunk_id.cmp(&right.chunk.chunk_id))
    });
}

#[cfg(test)]
mod tests {
    use super::{order_hits, EvidenceBackend, EvidenceIndex, LexicalIndex};
    use crate::models::{EvidenceChunk, EvidenceHit};

    fn chunk(chunk_id: &str, text: &str) -> EvidenceChunk {
        EvidenceChunk {
            chunk_id: chunk_id.to_string(),
            doc_id: "doc".to_string(),
            filename: "doc.pdf".to_string(),
            company: None,
            filing_year: None,
            filing_type: None,
            chunk_index: 0,
            n_chars: text.chars().count(),
            text: text.to_string(),
        }
    }

    fn hit(chunk_id: &str, score: f64) -> EvidenceHit {
        EvidenceHit {
            chunk: chunk(chunk_id, ""),
            score,
        }
    }

    #[test]
    fn ordering_is_score_desc_then_chunk_id_asc() {
        let mut hits = vec![
            hit("doc::chunk_2", 0.5),
            hit("doc::chunk_0", 0.5),
            hit("doc::chunk_1", 0.9),
        ];

        order_hits(&mut hits);

        assert_eq!(hits[0].chunk.chunk_id, "doc::chunk_1");
        assert_eq!(hits[1].chunk.chunk_id, "doc::chunk_0");
        assert_eq!(hits[2].chunk.chunk_id, "doc::chunk_2");
    }

    #[tokio::test]
    async fn backend_enum_delegates_to_the_chosen_index() {
        let index = EvidenceBackend::Lexical(LexicalIndex::build(vec![chunk(
            "doc::chunk_0",
            "Revenue increased 10% year over year.",
        )]));

        let hits = index.search("revenue", 5, None).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].chunk.chunk_id, "doc::chunk_0");
    }
}
