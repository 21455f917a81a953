use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One extracted filing, as handed over by the ingestion side.
/// Read-only input to the retrieval core; any content change means a new
/// document with new chunk identities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilingDocument {
    pub doc_id: String,
    pub filename: String,
    pub source_path: String,
    pub checksum: String,
    pub text: String,
    pub ingested_at: DateTime<Utc>,
}

/// Display attributes carried onto every chunk of a filing. Informational
/// only; ranking never looks at these.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilingMeta {
    pub filename: String,
    pub company: Option<String>,
    pub filing_year: Option<String>,
    pub filing_type: Option<String>,
}

impl FilingMeta {
    /// Best-effort parse of a `COMPANY_YEAR_TYPE.ext` filename. Anything
    /// that doesn't match leaves the descriptive fields unset.
    pub fn from_filename(filename: &str) -> Self {
        let stem = match filename.rsplit_once('.') {
            Some((stem, _extension)) => stem,
            None => filename,
        };

        let mut parts = stem.splitn(3, '_');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(company), Some(year), Some(kind))
                if year.len() == 4 && year.chars().all(|c| c.is_ascii_digit()) =>
            {
                Self {
                    filename: filename.to_string(),
                    company: Some(company.to_string()),
                    filing_year: Some(year.to_string()),
                    filing_type: Some(kind.to_string()),
                }
            }
            _ => Self {
                filename: filename.to_string(),
                ..Self::default()
            },
        }
    }
}

/// An immutable, addressable slice of a filing's normalized text. The
/// smallest unit the system ever cites.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvidenceChunk {
    /// `"{doc_id}::chunk_{ordinal}"`, stable across re-chunking runs.
    pub chunk_id: String,
    pub doc_id: String,
    pub filename: String,
    pub company: Option<String>,
    pub filing_year: Option<String>,
    pub filing_type: Option<String>,
    /// Positional ordinal within the document, starting at 0.
    pub chunk_index: u64,
    pub text: String,
    pub n_chars: usize,
}

/// A chunk with its relevance score. Score scale is backend-defined; the
/// only contract is descending order within one response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceHit {
    pub chunk: EvidenceChunk,
    pub score: f64,
}

fn default_top_k() -> usize {
    5
}

/// Caller-facing request shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
    #[serde(default)]
    pub doc_id: Option<String>,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Page bound forwarded to the ingestion side; the retrieval core
    /// itself never reads it.
    #[serde(default)]
    pub max_pages: Option<usize>,
}

impl AskRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            doc_id: None,
            top_k: default_top_k(),
            max_pages: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Citation {
    pub chunk_id: String,
    pub doc_id: String,
    pub score: f64,
}

/// Full untruncated chunk text backing a citation. Everything in the
/// composed answer must be traceable to one of these.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvidenceEntry {
    pub chunk_id: String,
    pub doc_id: String,
    pub score: f64,
    pub text: String,
}

/// Either a grounded answer with citations, or a total refusal. Invariant:
/// `refused == true` exactly when `citations` and `evidence` are empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
    pub refused: bool,
    pub refusal_reason: Option<String>,
    pub citations: Vec<Citation>,
    pub evidence: Vec<EvidenceEntry>,
}

impl AskResponse {
    /// A refusal with an empty answer and the given reason.
    pub fn refusal(reason: impl Into<String>) -> Self {
        Self {
            answer: String::new(),
            refused: true,
            refusal_reason: Some(reason.into()),
            citations: Vec::new(),
            evidence: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filing_meta_parses_company_year_type_stem() {
        let meta = FilingMeta::from_filename("AAPL_2023_10-K.pdf");
        assert_eq!(meta.company.as_deref(), Some("AAPL"));
        assert_eq!(meta.filing_year.as_deref(), Some("2023"));
        assert_eq!(meta.filing_type.as_deref(), Some("10-K"));
        assert_eq!(meta.filename, "AAPL_2023_10-K.pdf");
    }

    #[test]
    fn filing_meta_leaves_unparseable_names_unset() {
        let meta = FilingMeta::from_filename("annual_report.pdf");
        assert_eq!(meta.company, None);
        assert_eq!(meta.filing_year, None);
        assert_eq!(meta.filing_type, None);
        assert_eq!(meta.filename, "annual_report.pdf");
    }

    #[test]
    fn ask_request_defaults_top_k_to_five() {
        let request: AskRequest =
            serde_json::from_str(r#"{"question": "What were revenues?"}"#).unwrap();
        assert_eq!(request.top_k, 5);
        assert_eq!(request.doc_id, None);
        assert_eq!(request.max_pages, None);
    }

    #[test]
    fn refusal_response_carries_no_citations() {
        let response = AskResponse::refusal("unknown document: X");
        assert!(response.refused);
        assert!(response.answer.is_empty());
        assert!(response.citations.is_empty());
        assert!(response.evidence.is_empty());
        assert_eq!(
            response.refusal_reason.as_deref(),
            Some("unknown document: X")
        );
    }
}
