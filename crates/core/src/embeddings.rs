use crate::error::SearchError;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use url::Url;

const DEFAULT: usize = 128;

pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = DEFAULT;

/// The embedding collaborator: an opaque transform from text to a
/// fixed-length vector. Documents and queries must go through the same
/// transform. Fallible because the transform may live behind the network.
pub trait Embedder: Send + Sync {
    fn dimensions(&self) -> usize;
    fn embed(&self, text: &str) -> Result<Vec<f32>, SearchError>;
}

/// Local hashing embedder over character trigrams. Deterministic and
/// dependency-free; the default when no remote endpoint is configured.
#[derive(Debug, Clone, Copy)]
pub struct CharacterNgramEmbedder {
    pub dimensions: usize,
}

impl Default for CharacterNgramEmbedder {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
        }
    }
}

impl Embedder for CharacterNgramEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, SearchError> {
        let mut vector = vec![0f32; self.dimensions.max(1)];
        let lowered = text.to_lowercase();
        let chars: Vec<char> = lowered.chars().collect();

        if chars.is_empty() {
            return Ok(vector);
        }

        for window in chars.windows(3) {
            let token = window.iter().collect::<String>();
            let mut hash = 1469598103934665603u64;
            for byte in token.bytes() {
                hash ^= byte as u64;
                hash = hash.wrapping_mul(1099511628211);
            }
            let bucket = (hash % vector.len() as u64) as usize;
            vector[bucket] += 1.0;
        }

        let magnitude = vector.iter().map(|value| value * value).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut vector {
                *value /= magnitude;
            }
        }

        Ok(vector)
    }
}

#[derive(Debug, Clone, Serialize)]
struct EmbedRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

/// Remote embedding endpoint speaking `{"text": …}` → `{"embedding": […]}`
/// with optional bearer auth. Any transport or shape problem is a hard
/// `SearchError`, never a refusal.
pub struct HttpEmbedder {
    endpoint: Url,
    api_key: Option<String>,
    client: Client,
    dimensions: usize,
}

impl HttpEmbedder {
    pub fn new(
        endpoint: &str,
        api_key: Option<String>,
        dimensions: usize,
    ) -> Result<Self, SearchError> {
        Ok(Self {
            endpoint: Url::parse(endpoint)?,
            api_key,
            client: Client::new(),
            dimensions,
        })
    }

    fn embed_blocking(&self, text: &str) -> Result<Vec<f32>, SearchError> {
        let mut request = self
            .client
            .post(self.endpoint.clone())
            .json(&EmbedRequest { text });

        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send()?;
        if !response.status().is_success() {
            return Err(SearchError::BackendResponse {
                backend: "embedding".to_string(),
                details: response.status().to_string(),
            });
        }

        let payload: EmbedResponse = response.json()?;
        if payload.embedding.len() != self.dimensions {
            return Err(SearchError::BackendResponse {
                backend: "embedding".to_string(),
                details: format!(
                    "embedding dimension {} is not {}",
                    payload.embedding.len(),
                    self.dimensions
                ),
            });
        }

        Ok(payload.embedding)
    }
}

impl Embedder for HttpEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, SearchError> {
        tokio::task::block_in_place(|| self.embed_blocking(text))
    }
}
