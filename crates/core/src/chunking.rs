use crate::error::IngestError;
use crate::models::{EvidenceChunk, FilingMeta};
use regex::Regex;

/// Character-based chunking parameters. `chunk_chars` must exceed
/// `overlap_chars` so the cursor always advances.
#[derive(Debug, Clone, Copy)]
pub struct ChunkingConfig {
    pub chunk_chars: usize,
    pub overlap_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_chars: 1_400,
            overlap_chars: 200,
        }
    }
}

impl ChunkingConfig {
    fn validate(&self) -> Result<(), IngestError> {
        if self.chunk_chars == 0 || self.overlap_chars >= self.chunk_chars {
            return Err(IngestError::InvalidChunkConfig(format!(
                "chunk_chars {} must exceed overlap_chars {}",
                self.chunk_chars, self.overlap_chars
            )));
        }
        Ok(())
    }
}

/// Whitespace normalization applied to a whole filing before splitting:
/// NUL bytes become spaces, runs of horizontal whitespace collapse to one
/// space, three or more consecutive newlines collapse to two, and the
/// result is trimmed.
pub fn clean_filing_text(text: &str) -> Result<String, IngestError> {
    let horizontal = Regex::new(r"[ \t]+")?;
    let blank_runs = Regex::new(r"\n{3,}")?;

    let text = text.replace('\u{0}', " ");
    let text = horizontal.replace_all(&text, " ");
    let text = blank_runs.replace_all(&text, "\n\n");
    Ok(text.trim().to_string())
}

/// Splits a filing's text into overlapping evidence chunks with
/// deterministic positional identifiers.
///
/// Chunk boundaries tile the cleaned text left to right: each chunk spans
/// `chunk_chars` characters and consecutive chunks share `overlap_chars`,
/// except the final chunk which may be shorter. Ordinals never skip, even
/// when a trimmed span ends up empty, so identical input always yields
/// identical `chunk_id` sequences.
pub fn chunk_document(
    text: &str,
    doc_id: &str,
    meta: &FilingMeta,
    config: ChunkingConfig,
) -> Result<Vec<EvidenceChunk>, IngestError> {
    config.validate()?;

    let cleaned = clean_filing_text(text)?;
    if cleaned.is_empty() {
        return Ok(Vec::new());
    }

    let chars: Vec<char> = cleaned.chars().collect();
    let total = chars.len();

    let mut chunks = Vec::new();
    let mut cursor = 0usize;
    let mut ordinal = 0u64;

    loop {
        let end = (cursor + config.chunk_chars).min(total);
        let piece: String = chars[cursor..end].iter().collect();
        let trimmed = piece.trim();

        chunks.push(EvidenceChunk {
            chunk_id: format!("{doc_id}::chunk_{ordinal}"),
            doc_id: doc_id.to_string(),
            filename: meta.filename.clone(),
            company: meta.company.clone(),
            filing_year: meta.filing_year.clone(),
            filing_type: meta.filing_type.clone(),
            chunk_index: ordinal,
            n_chars: trimmed.chars().count(),
            text: trimmed.to_string(),
        });

        ordinal += 1;
        if end == total {
            break;
        }
        cursor = end.saturating_sub(config.overlap_chars);
    }

    Ok(chunks)
}
