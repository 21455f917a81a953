use crate::ingest::IngestionReport;
use crate::models::FilingDocument;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Catalog listing entry for caller discovery.
#[derive(Debug, Clone, Serialize)]
pub struct SourceInfo {
    pub doc_id: String,
    pub filename: String,
    pub n_chars: usize,
    pub ingested_at: DateTime<Utc>,
}

/// The set of filings currently available for retrieval. Explicitly owned
/// and explicitly passed; built once from an ingestion report and immutable
/// afterwards. Refreshing the corpus means building a new catalog (and a
/// new index) and swapping both in, never mutating in place.
#[derive(Debug, Clone, Default)]
pub struct DocumentCatalog {
    documents: BTreeMap<String, FilingDocument>,
}

impl DocumentCatalog {
    pub fn new(documents: BTreeMap<String, FilingDocument>) -> Self {
        Self { documents }
    }

    pub fn from_report(report: IngestionReport) -> Self {
        Self::new(report.documents)
    }

    pub fn get(&self, doc_id: &str) -> Option<&FilingDocument> {
        self.documents.get(doc_id)
    }

    pub fn contains(&self, doc_id: &str) -> bool {
        self.documents.contains_key(doc_id)
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn documents(&self) -> impl Iterator<Item = &FilingDocument> {
        self.documents.values()
    }

    /// Read-only listing, ordered by `doc_id`.
    pub fn sources(&self) -> Vec<SourceInfo> {
        self.documents
            .values()
            .map(|document| SourceInfo {
                doc_id: document.doc_id.clone(),
                filename: document.filename.clone(),
                n_chars: document.text.chars().count(),
                ingested_at: document.ingested_at,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(doc_id: &str) -> FilingDocument {
        FilingDocument {
            doc_id: doc_id.to_string(),
            filename: format!("{doc_id}.pdf"),
            source_path: format!("/tmp/{doc_id}.pdf"),
            checksum: "checksum".to_string(),
            text: "Some filing text.".to_string(),
            ingested_at: Utc::now(),
        }
    }

    #[test]
    fn sources_are_listed_in_doc_id_order() {
        let mut documents = BTreeMap::new();
        documents.insert("zeta_2022_10K".to_string(), document("zeta_2022_10K"));
        documents.insert("acme_2023_10K".to_string(), document("acme_2023_10K"));

        let catalog = DocumentCatalog::new(documents);
        let sources = catalog.sources();

        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].doc_id, "acme_2023_10K");
        assert_eq!(sources[1].doc_id, "zeta_2022_10K");
        assert_eq!(sources[0].n_chars, "Some filing text.".chars().count());
    }

    #[test]
    fn lookup_reflects_loaded_documents() {
        let mut documents = BTreeMap::new();
        documents.insert("acme_2023_10K".to_string(), document("acme_2023_10K"));
        let catalog = DocumentCatalog::new(documents);

        assert!(catalog.contains("acme_2023_10K"));
        assert!(!catalog.contains("unknown"));
        assert_eq!(catalog.len(), 1);
        assert!(!catalog.is_empty());
        assert!(catalog.get("acme_2023_10K").is_some());
    }

    #[test]
    fn default_catalog_is_empty() {
        let catalog = DocumentCatalog::default();
        assert!(catalog.is_empty());
        assert!(catalog.sources().is_empty());
    }
}
