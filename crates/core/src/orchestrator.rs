use crate::catalog::DocumentCatalog;
use crate::error::SearchError;
use crate::index::EvidenceIndex;
use crate::models::{AskRequest, AskResponse, Citation, EvidenceEntry, EvidenceHit};

pub const DEFAULT_PREVIEW_CHARS: usize = 300;

/// How many top-ranked hits appear inline in the composed answer. Every
/// hit still gets a citation and an evidence entry.
const PREVIEWED_HITS: usize = 3;

const ANSWER_LEAD: &str =
    "I found relevant excerpts in the filings. Here are the most relevant sections (with citations):";
const NO_EVIDENCE_ANSWER: &str =
    "I can't answer that from the indexed filings I currently have.";
const NO_EVIDENCE_REASON: &str =
    "No relevant evidence retrieved. Try rephrasing or choose a different filing.";

/// Ties the catalog and one evidence index into the ask/refuse pipeline.
/// Refusal is binary and total: a response either carries an answer with
/// citations and full-text evidence, or nothing but a reason.
pub struct AnswerPipeline<I: EvidenceIndex> {
    catalog: DocumentCatalog,
    index: I,
    preview_chars: usize,
}

impl<I: EvidenceIndex + Send + Sync> AnswerPipeline<I> {
    pub fn new(catalog: DocumentCatalog, index: I) -> Self {
        Self {
            catalog,
            index,
            preview_chars: DEFAULT_PREVIEW_CHARS,
        }
    }

    pub fn with_preview_chars(mut self, preview_chars: usize) -> Self {
        self.preview_chars = preview_chars;
        self
    }

    pub fn catalog(&self) -> &DocumentCatalog {
        &self.catalog
    }

    /// Answers `request` from retrieved evidence or refuses with a reason.
    ///
    /// Hard errors (`Err`) mean the system could not assess evidence at
    /// all — an unreachable embedding endpoint, for instance. Having
    /// assessed the corpus and found nothing is a refusal, not an error.
    pub async fn ask(&self, request: &AskRequest) -> Result<AskResponse, SearchError> {
        if request.question.trim().is_empty() {
            return Err(SearchError::Request("question is empty".to_string()));
        }

        if self.catalog.is_empty() {
            return Ok(AskResponse::refusal(
                "no documents are loaded in the catalog; ingest filings first",
            ));
        }

        if let Some(doc_id) = &request.doc_id {
            if !self.catalog.contains(doc_id) {
                return Ok(AskResponse::refusal(format!("unknown document: {doc_id}")));
            }
        }

        let hits = match self
            .index
            .search(&request.question, request.top_k.max(1), request.doc_id.as_deref())
            .await
        {
            Ok(hits) => hits,
            // A document the catalog holds but the index never saw produced
            // zero chunks; it is known, just without evidence.
            Err(SearchError::UnknownDocument(doc_id)) if self.catalog.contains(&doc_id) => {
                return Ok(no_evidence_refusal());
            }
            Err(SearchError::UnknownDocument(doc_id)) => {
                return Ok(AskResponse::refusal(format!("unknown document: {doc_id}")));
            }
            Err(error) => return Err(error),
        };

        if hits.is_empty() {
            return Ok(no_evidence_refusal());
        }

        Ok(self.compose(&hits))
    }

    fn compose(&self, hits: &[EvidenceHit]) -> AskResponse {
        let mut answer_lines = vec![ANSWER_LEAD.to_string()];
        for hit in hits.iter().take(PREVIEWED_HITS) {
            answer_lines.push(format!(
                "- {} [{}]",
                preview_snippet(&hit.chunk.text, self.preview_chars),
                hit.chunk.chunk_id
            ));
        }

        let citations = hits
            .iter()
            .map(|hit| Citation {
                chunk_id: hit.chunk.chunk_id.clone(),
                doc_id: hit.chunk.doc_id.clone(),
                score: hit.score,
            })
            .collect();

        let evidence = hits
            .iter()
            .map(|hit| EvidenceEntry {
                chunk_id: hit.chunk.chunk_id.clone(),
                doc_id: hit.chunk.doc_id.clone(),
                score: hit.score,
                text: hit.chunk.text.clone(),
            })
            .collect();

        AskResponse {
            answer: answer_lines.join("\n"),
            refused: false,
            refusal_reason: None,
            citations,
            evidence,
        }
    }
}

fn no_evidence_refusal() -> AskResponse {
    AskResponse {
        answer: NO_EVIDENCE_ANSWER.to_string(),
        refused: true,
        refusal_reason: Some(NO_EVIDENCE_REASON.to_string()),
        citations: Vec::new(),
        evidence: Vec::new(),
    }
}

/// Flattens internal newlines to spaces and truncates to `max_chars`
/// characters, appending a marker when anything was cut.
fn preview_snippet(text: &str, max_chars: usize) -> String {
    let flattened = text.replace('\n', " ");
    let flattened = flattened.trim();

    let mut snippet: String = flattened.chars().take(max_chars).collect();
    if flattened.chars().count() > max_chars {
        snippet.push_str("...");
    }
    snippet
}
