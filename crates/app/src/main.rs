use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use filing_rag_core::{
    chunk_corpus, load_documents, AnswerPipeline, AskRequest, CharacterNgramEmbedder,
    ChunkingConfig, DocumentCatalog, Embedder, EvidenceBackend, HttpEmbedder, IngestionReport,
    LexicalIndex, VectorIndex, DEFAULT_EMBEDDING_DIMENSIONS,
};
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "filing-rag", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Folder that contains filing PDFs recursively.
    #[arg(long, default_value = "data/raw")]
    folder: String,

    /// Limit text extraction to the first N pages per filing.
    #[arg(long)]
    max_pages: Option<usize>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Backend {
    Vector,
    Lexical,
}

#[derive(Subcommand)]
enum Command {
    /// Load filings and report how many evidence chunks they produce.
    Ingest,
    /// List the documents available for question answering.
    Sources,
    /// Ask an evidence-grounded question about the ingested filings.
    Ask {
        #[arg(long)]
        question: String,
        /// Restrict retrieval to one filing.
        #[arg(long)]
        doc_id: Option<String>,
        /// Number of evidence hits to retrieve.
        #[arg(long, default_value = "5")]
        top_k: usize,
        /// Ranking backend to build over the corpus.
        #[arg(long, value_enum, default_value_t = Backend::Vector)]
        backend: Backend,
        /// Remote embedding endpoint; omitted means the local hashing embedder.
        #[arg(long, env = "EMBEDDING_ENDPOINT")]
        embedding_url: Option<String>,
        /// Bearer token for the embedding endpoint.
        #[arg(long, env = "EMBEDDING_API_KEY")]
        embedding_api_key: Option<String>,
        /// Print the raw response as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    let folder = Path::new(&cli.folder);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        started_at = %Utc::now().to_rfc3339(),
        folder = %folder.display(),
        "filing-rag boot"
    );

    let report = load_documents(folder, cli.max_pages);
    log_skipped(&report);

    match cli.command {
        Command::Ingest => {
            let chunks = chunk_corpus(&report.documents, ChunkingConfig::default())
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;
            info!(
                documents = report.documents.len(),
                chunks = chunks.len(),
                "corpus built"
            );
            println!(
                "{} documents, {} evidence chunks at {}",
                report.documents.len(),
                chunks.len(),
                Utc::now().to_rfc3339()
            );
        }
        Command::Sources => {
            let catalog = DocumentCatalog::from_report(report);
            if catalog.is_empty() {
                println!("no documents available");
            }
            for source in catalog.sources() {
                println!(
                    "{}\t{}\t{} chars\tingested {}",
                    source.doc_id,
                    source.filename,
                    source.n_chars,
                    source.ingested_at.to_rfc3339()
                );
            }
        }
        Command::Ask {
            question,
            doc_id,
            top_k,
            backend,
            embedding_url,
            embedding_api_key,
            json,
        } => {
            let chunks = chunk_corpus(&report.documents, ChunkingConfig::default())
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;
            let catalog = DocumentCatalog::from_report(report);

            let index = match backend {
                Backend::Lexical => EvidenceBackend::Lexical(LexicalIndex::build(chunks)),
                Backend::Vector => {
                    let embedder: Box<dyn Embedder> = match embedding_url {
                        Some(url) => Box::new(
                            HttpEmbedder::new(
                                &url,
                                embedding_api_key,
                                DEFAULT_EMBEDDING_DIMENSIONS,
                            )
                            .map_err(|error| anyhow::anyhow!(error.to_string()))?,
                        ),
                        None => Box::new(CharacterNgramEmbedder::default()),
                    };
                    EvidenceBackend::Vector(
                        VectorIndex::build(chunks, embedder)
                            .map_err(|error| anyhow::anyhow!(error.to_string()))?,
                    )
                }
            };

            let pipeline = AnswerPipeline::new(catalog, index);
            let request = AskRequest {
                question,
                doc_id,
                top_k,
                max_pages: cli.max_pages,
            };

            let response = pipeline
                .ask(&request)
                .await
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else if response.refused {
                if !response.answer.is_empty() {
                    println!("{}", response.answer);
                }
                println!(
                    "refused: {}",
                    response.refusal_reason.unwrap_or_default()
                );
            } else {
                println!("{}", response.answer);
                println!();
                for citation in &response.citations {
                    println!(
                        "[{}] score={:.4} doc={}",
                        citation.chunk_id, citation.score, citation.doc_id
                    );
                }
            }
        }
    }

    Ok(())
}

fn log_skipped(report: &IngestionReport) {
    if report.skipped.is_empty() {
        return;
    }
    warn!(skipped = report.skipped.len(), "some filings were not loaded");
    for skipped in &report.skipped {
        warn!(path = %skipped.path.display(), reason = %skipped.reason, "skipped filing");
    }
}
