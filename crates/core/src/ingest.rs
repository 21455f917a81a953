use crate::chunking::{chunk_document, ChunkingConfig};
use crate::error::IngestError;
use crate::extractor::extract_document_text;
use crate::models::{EvidenceChunk, FilingDocument, FilingMeta};
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recursively finds PDF files under `folder`, sorted for deterministic
/// corpus builds. A missing folder is simply an empty listing.
pub fn discover_pdf_files(folder: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .into_iter()
        .filter_map(|item| item.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let is_pdf = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

        if is_pdf {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort_unstable();
    files
}

pub fn digest_file(path: &Path) -> Result<String, IngestError> {
    let bytes = fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

#[derive(Debug)]
pub struct SkippedPdf {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of one corpus load: extracted filings keyed by `doc_id`, plus
/// the files that were omitted and why. Unreadable files never fail the
/// load as a whole.
#[derive(Debug, Default)]
pub struct IngestionReport {
    pub documents: BTreeMap<String, FilingDocument>,
    pub skipped: Vec<SkippedPdf>,
}

/// Loads every readable filing under `folder`. Deterministic for a fixed
/// folder and `max_pages`; an empty or missing folder yields an empty
/// report (an empty corpus is valid input, the orchestrator refuses).
pub fn load_documents(folder: &Path, max_pages: Option<usize>) -> IngestionReport {
    let mut report = IngestionReport::default();

    for path in discover_pdf_files(folder) {
        match load_single_document(&path, max_pages) {
            Ok(document) => {
                report.documents.insert(document.doc_id.clone(), document);
            }
            Err(error) => report.skipped.push(SkippedPdf {
                path,
                reason: error.to_string(),
            }),
        }
    }

    report
}

fn load_single_document(
    path: &Path,
    max_pages: Option<usize>,
) -> Result<FilingDocument, IngestError> {
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| IngestError::MissingFileName(path.display().to_string()))?;
    let doc_id = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| IngestError::MissingFileName(path.display().to_string()))?;

    let checksum = digest_file(path)?;
    let text = extract_document_text(path, max_pages)?;

    Ok(FilingDocument {
        doc_id: doc_id.to_string(),
        filename: filename.to_string(),
        source_path: path.to_string_lossy().to_string(),
        checksum,
        text,
        ingested_at: Utc::now(),
    })
}

/// Chunks every document of a loaded corpus in `doc_id` order.
pub fn chunk_corpus(
    documents: &BTreeMap<String, FilingDocument>,
    config: ChunkingConfig,
) -> Result<Vec<EvidenceChunk>, IngestError> {
    let mut chunks = Vec::new();

    for document in documents.values() {
        let meta = FilingMeta::from_filename(&document.filename);
        chunks.extend(chunk_document(
            &document.text,
            &document.doc_id,
            &meta,
            config,
        )?);
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::{chunk_corpus, digest_file, discover_pdf_files, load_documents};
    use crate::chunking::ChunkingConfig;
    use crate::models::FilingDocument;
    use chrono::Utc;
    use std::collections::BTreeMap;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn discover_pdf_files_is_recursive_and_sorted() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let base = dir.path();
        let nested = base.join("nested");
        fs::create_dir(&nested)?;

        File::create(base.join("b.pdf")).and_then(|mut file| file.write_all(b"%PDF-1.4\n%fake"))?;
        File::create(nested.join("a.pdf"))
            .and_then(|mut file| file.write_all(b"%PDF-1.4\n%fake"))?;
        File::create(base.join("notes.txt")).and_then(|mut file| file.write_all(b"plain"))?;

        let files = discover_pdf_files(base);
        assert_eq!(files.len(), 2);
        assert!(files.windows(2).all(|pair| pair[0] <= pair[1]));
        Ok(())
    }

    #[test]
    fn checksum_is_reproducible() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let file_path = dir.path().join("a.pdf");
        fs::write(&file_path, b"abc")?;

        let first = digest_file(&file_path)?;
        let second = digest_file(&file_path)?;
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn empty_folder_yields_empty_report() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let report = load_documents(dir.path(), None);
        assert!(report.documents.is_empty());
        assert!(report.skipped.is_empty());
        Ok(())
    }

    #[test]
    fn missing_folder_yields_empty_report() {
        let report = load_documents(std::path::Path::new("/nonexistent/filings"), None);
        assert!(report.documents.is_empty());
    }

    #[test]
    fn unreadable_pdfs_are_skipped_not_fatal() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::write(dir.path().join("broken.pdf"), b"%PDF-1.4\n%broken")?;

        let report = load_documents(dir.path(), None);
        assert!(report.documents.is_empty());
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(
            report.skipped[0].path.file_name().and_then(|n| n.to_str()),
            Some("broken.pdf")
        );
        assert!(!report.skipped[0].reason.is_empty());
        Ok(())
    }

    fn document(doc_id: &str, text: &str) -> FilingDocument {
        FilingDocument {
            doc_id: doc_id.to_string(),
            filename: format!("{doc_id}.pdf"),
            source_path: format!("/tmp/{doc_id}.pdf"),
            checksum: "checksum".to_string(),
            text: text.to_string(),
            ingested_at: Utc::now(),
        }
    }

    #[test]
    fn corpus_chunks_follow_doc_id_order() {
        let mut documents = BTreeMap::new();
        documents.insert("b_doc".to_string(), document("b_doc", "Beta filing text."));
        documents.insert("a_doc".to_string(), document("a_doc", "Alpha filing text."));

        let chunks = chunk_corpus(&documents, ChunkingConfig::default()).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chunk_id, "a_doc::chunk_0");
        assert_eq!(chunks[1].chunk_id, "b_doc::chunk_0");
    }
}
