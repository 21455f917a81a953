pub mod catalog;
pub mod chunking;
pub mod embeddings;
pub mod error;
pub mod extractor;
pub mod index;
pub mod ingest;
pub mod models;
pub mod orchestrator;

pub use catalog::{DocumentCatalog, SourceInfo};
pub use chunking::{chunk_document, clean_filing_text, ChunkingConfig};
pub use embeddings::{
    CharacterNgramEmbedder, Embedder, HttpEmbedder, DEFAULT_EMBEDDING_DIMENSIONS,
};
pub use error::{IngestError, SearchError};
pub use extractor::{extract_document_text, LopdfExtractor, PageText, PdfExtractor};
pub use index::{EvidenceBackend, EvidenceIndex, LexicalIndex, VectorIndex};
pub use ingest::{
    chunk_corpus, digest_file, discover_pdf_files, load_documents, IngestionReport, SkippedPdf,
};
pub use models::{
    AskRequest, AskResponse, Citation, EvidenceChunk, EvidenceEntry, EvidenceHit, FilingDocument,
    FilingMeta,
};
pub use orchestrator::{AnswerPipeline, DEFAULT_PREVIEW_CHARS};
