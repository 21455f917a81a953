use crate::error::IngestError;
use lopdf::Document;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct PageText {
    pub number: u32,
    pub text: String,
}

/// Text extraction seam; the retrieval core only ever sees the resulting
/// `(doc_id, text)` pair.
pub trait PdfExtractor {
    fn extract_pages(
        &self,
        path: &Path,
        max_pages: Option<usize>,
    ) -> Result<Vec<PageText>, IngestError>;
}

#[derive(Default)]
pub struct LopdfExtractor;

impl PdfExtractor for LopdfExtractor {
    fn extract_pages(
        &self,
        path: &Path,
        max_pages: Option<usize>,
    ) -> Result<Vec<PageText>, IngestError> {
        let document =
            Document::load(path).map_err(|error| IngestError::PdfParse(error.to_string()))?;

        let mut pages = Vec::new();
        for (index, (page_no, _page_id)) in document.get_pages().into_iter().enumerate() {
            if max_pages.is_some_and(|limit| index >= limit) {
                break;
            }

            let text = document
                .extract_text(&[page_no])
                .map_err(|error| IngestError::PdfParse(error.to_string()))?;
            let text = text.trim();

            if !text.is_empty() {
                pages.push(PageText {
                    number: page_no,
                    text: text.to_string(),
                });
            }
        }

        Ok(pages)
    }
}

/// Extracts a filing into one text blob, pages joined by blank lines.
/// A scanned filing with no extractable text yields an empty string, which
/// downstream chunking turns into an empty chunk sequence.
pub fn extract_document_text(path: &Path, max_pages: Option<usize>) -> Result<String, IngestError> {
    let pages = LopdfExtractor.extract_pages(path, max_pages)?;
    Ok(pages
        .iter()
        .map(|page| page.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n"))
}
