use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    sync::Arc,
    time::Duration,
};

use async_openai::{config::OpenAIConfig, types::CreateEmbeddingRequestArgs, Client};
use serde::Deserialize;
use tokio_retry::{
    strategy::{jitter, ExponentialBackoff},
    RetryIf,
};
use tracing::debug;

use crate::{error::AppError, utils::config::AppConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    OpenAI,
    Hashed,
}

impl Default for EmbeddingBackend {
    fn default() -> Self {
        Self::OpenAI
    }
}

/// Text-to-vector client, constructed once and passed into the pipelines.
/// The `Hashed` backend is a deterministic, network-free stand-in used by
/// tests and offline development.
#[derive(Clone)]
pub struct EmbeddingProvider {
    inner: EmbeddingInner,
}

#[derive(Clone)]
enum EmbeddingInner {
    OpenAI {
        client: Arc<Client<OpenAIConfig>>,
        model: String,
        dimensions: u32,
    },
    Hashed {
        dimension: usize,
    },
}

impl EmbeddingProvider {
    pub fn from_config(
        config: &AppConfig,
        client: Option<Arc<Client<OpenAIConfig>>>,
    ) -> Result<Self, AppError> {
        match config.embedding_backend {
            EmbeddingBackend::OpenAI => {
                let client = client.unwrap_or_else(|| {
                    Arc::new(Client::with_config(
                        OpenAIConfig::new()
                            .with_api_key(&config.openai_api_key)
                            .with_api_base(&config.openai_base_url),
                    ))
                });
                Ok(Self::new_openai(
                    client,
                    config.embedding_model.clone(),
                    config.embedding_dimensions,
                ))
            }
            EmbeddingBackend::Hashed => Ok(Self::new_hashed(config.embedding_dimensions as usize)),
        }
    }

    pub fn new_openai(client: Arc<Client<OpenAIConfig>>, model: String, dimensions: u32) -> Self {
        EmbeddingProvider {
            inner: EmbeddingInner::OpenAI {
                client,
                model,
                dimensions,
            },
        }
    }

    pub fn new_hashed(dimension: usize) -> Self {
        EmbeddingProvider {
            inner: EmbeddingInner::Hashed {
                dimension: dimension.max(1),
            },
        }
    }

    pub fn backend_label(&self) -> &'static str {
        match self.inner {
            EmbeddingInner::OpenAI { .. } => "openai",
            EmbeddingInner::Hashed { .. } => "hashed",
        }
    }

    pub fn dimension(&self) -> usize {
        match &self.inner {
            EmbeddingInner::OpenAI { dimensions, .. } => *dimensions as usize,
            EmbeddingInner::Hashed { dimension } => *dimension,
        }
    }

    pub fn model_code(&self) -> Option<&str> {
        match &self.inner {
            EmbeddingInner::OpenAI { model, .. } => Some(model.as_str()),
            EmbeddingInner::Hashed { .. } => None,
        }
    }

    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, AppError> {
        match &self.inner {
            EmbeddingInner::Hashed { dimension } => Ok(hashed_embedding(text, *dimension)),
            EmbeddingInner::OpenAI {
                client,
                model,
                dimensions,
            } => {
                let request = CreateEmbeddingRequestArgs::default()
                    .model(model.clone())
                    .input([text])
                    .dimensions(*dimensions)
                    .build()?;

                let response = client.embeddings().create(request).await?;

                let embedding = response
                    .data
                    .into_iter()
                    .next()
                    .ok_or_else(|| {
                        AppError::Validation("no embedding data received from provider".into())
                    })?
                    .embedding;

                debug!(dimension = embedding.len(), "embedding generated");

                Ok(embedding)
            }
        }
    }

    pub async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, AppError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        match &self.inner {
            EmbeddingInner::Hashed { dimension } => Ok(texts
                .into_iter()
                .map(|text| hashed_embedding(&text, *dimension))
                .collect()),
            EmbeddingInner::OpenAI {
                client,
                model,
                dimensions,
            } => {
                let request = CreateEmbeddingRequestArgs::default()
                    .model(model.clone())
                    .input(texts)
                    .dimensions(*dimensions)
                    .build()?;

                let response = client.embeddings().create(request).await?;

                Ok(response
                    .data
                    .into_iter()
                    .map(|item| item.embedding)
                    .collect())
            }
        }
    }
}

/// Embed with the retry/deadline policy upstream calls get everywhere in
/// this codebase: bounded exponential backoff on transport failures, a hard
/// caller deadline over the whole attempt chain.
pub async fn embed_with_policy(
    provider: &EmbeddingProvider,
    text: &str,
    deadline: Duration,
) -> Result<Vec<f32>, AppError> {
    let retry_strategy = ExponentialBackoff::from_millis(100).map(jitter).take(3);

    let attempts = RetryIf::spawn(
        retry_strategy,
        || provider.embed(text),
        AppError::is_transient,
    );

    match tokio::time::timeout(deadline, attempts).await {
        Ok(result) => result,
        Err(_) => Err(AppError::Timeout(format!(
            "embedding call exceeded {}ms deadline",
            deadline.as_millis()
        ))),
    }
}

fn hashed_embedding(text: &str, dimension: usize) -> Vec<f32> {
    let dim = dimension.max(1);
    let mut vector = vec![0.0f32; dim];

    let mut token_count = 0usize;
    for token in tokens(text) {
        token_count += 1;
        let idx = bucket(&token, dim);
        if let Some(slot) = vector.get_mut(idx) {
            *slot += 1.0;
        }
    }

    if token_count == 0 {
        return vector;
    }

    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in &mut vector {
            *value /= norm;
        }
    }

    vector
}

// Unicode-aware on purpose: the corpus is Korean.
fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
}

fn bucket(token: &str, dimension: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    token.hash(&mut hasher);
    (hasher.finish() as usize) % dimension
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hashed_backend_is_deterministic() {
        let provider = EmbeddingProvider::new_hashed(16);
        let first = provider.embed("타이레놀 효능").await.expect("embed");
        let second = provider.embed("타이레놀 효능").await.expect("embed");
        assert_eq!(first, second);
        assert_eq!(first.len(), 16);
    }

    #[tokio::test]
    async fn hashed_backend_produces_unit_vectors() {
        let provider = EmbeddingProvider::new_hashed(8);
        let vector = provider.embed("해열 및 진통").await.expect("embed");
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5, "norm was {norm}");
    }

    #[tokio::test]
    async fn hashed_backend_handles_empty_text() {
        let provider = EmbeddingProvider::new_hashed(8);
        let vector = provider.embed("").await.expect("embed");
        assert_eq!(vector, vec![0.0; 8]);
    }

    #[tokio::test]
    async fn batch_matches_single_embeds() {
        let provider = EmbeddingProvider::new_hashed(8);
        let single = provider.embed("아세트아미노펜").await.expect("embed");
        let batch = provider
            .embed_batch(vec!["아세트아미노펜".to_string()])
            .await
            .expect("batch");
        assert_eq!(batch, vec![single]);
    }

    #[tokio::test]
    async fn embed_with_policy_respects_the_deadline_happy_path() {
        let provider = EmbeddingProvider::new_hashed(8);
        let vector = embed_with_policy(&provider, "진통", Duration::from_secs(1))
            .await
            .expect("embed");
        assert_eq!(vector.len(), 8);
    }

    #[test]
    fn backend_labels_and_dimensions() {
        let hashed = EmbeddingProvider::new_hashed(32);
        assert_eq!(hashed.backend_label(), "hashed");
        assert_eq!(hashed.dimension(), 32);
        assert_eq!(hashed.model_code(), None);
    }
}
