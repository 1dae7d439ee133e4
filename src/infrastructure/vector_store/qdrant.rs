use async_trait::async_trait;
use chrono::{DateTime, Utc};
use qdrant_client::qdrant::{
    CountPointsBuilder, CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder,
    UpsertPointsBuilder, Value, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::{
    ports::VectorStore, ChunkMetadata, DocumentChunk, DomainError, Embedding, SearchResult,
};
use crate::infrastructure::config::VectorStoreConfig;

/// Points sent per upsert request.
const UPSERT_BATCH_SIZE: usize = 256;

/// Chunks stored as points in one Qdrant collection.
///
/// The collection is created on the first write, sized to the first vector
/// and using cosine distance.
pub struct QdrantVectorStore {
    client: Qdrant,
    collection: String,
}

impl QdrantVectorStore {
    pub fn new(url: &str, collection: &str, api_key: Option<String>) -> Result<Self, DomainError> {
        let client = Qdrant::from_url(url)
            .api_key(api_key)
            .build()
            .map_err(|e| DomainError::external(e.to_string()))?;

        Ok(Self {
            client,
            collection: collection.to_string(),
        })
    }

    pub fn from_config(config: &VectorStoreConfig) -> Result<Self, DomainError> {
        Self::new(&config.url, &config.collection, config.api_key.clone())
    }

    async fn collection_exists(&self) -> Result<bool, DomainError> {
        self.client
            .collection_exists(&self.collection)
            .await
            .map_err(|e| DomainError::external(e.to_string()))
    }

    async fn ensure_collection(&self, dimension: usize) -> Result<(), DomainError> {
        if self.collection_exists().await? {
            return Ok(());
        }

        tracing::info!(collection = %self.collection, dimension, "creating collection");
        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection)
                    .vectors_config(VectorParamsBuilder::new(dimension as u64, Distance::Cosine)),
            )
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        Ok(())
    }

    fn to_point(chunk: &DocumentChunk, embedding: &Embedding) -> Result<PointStruct, DomainError> {
        let payload: Payload = serde_json::json!({
            "chunk_id": chunk.id.to_string(),
            "content": chunk.content,
            "chunk_index": chunk.chunk_index,
            "source": chunk.metadata.source,
            "page": chunk.metadata.page,
            "ingested_at": chunk.metadata.ingested_at.map(|t| t.to_rfc3339()),
        })
        .try_into()
        .map_err(|_| DomainError::internal("Failed to create payload"))?;

        Ok(PointStruct::new(
            chunk.id.to_string(),
            embedding.as_slice().to_vec(),
            payload,
        ))
    }

    fn from_payload(payload: &HashMap<String, Value>) -> Option<DocumentChunk> {
        let id: Uuid = payload.get("chunk_id")?.as_str()?.parse().ok()?;
        let content = payload.get("content")?.as_str()?.to_string();
        let chunk_index = payload.get("chunk_index")?.as_integer()? as usize;

        let source = payload
            .get("source")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());
        let page = payload
            .get("page")
            .and_then(|v| v.as_integer())
            .map(|p| p as usize);
        let ingested_at = payload
            .get("ingested_at")
            .and_then(|v| v.as_str())
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|t| t.with_timezone(&Utc));

        Some(DocumentChunk {
            id,
            content,
            chunk_index,
            metadata: ChunkMetadata {
                source,
                page,
                ingested_at,
            },
        })
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn upsert(&self, chunk: &DocumentChunk, embedding: &Embedding) -> Result<(), DomainError> {
        self.upsert_batch(std::slice::from_ref(chunk), std::slice::from_ref(embedding))
            .await
    }

    async fn upsert_batch(
        &self,
        chunks: &[DocumentChunk],
        embeddings: &[Embedding],
    ) -> Result<(), DomainError> {
        if chunks.len() != embeddings.len() {
            return Err(DomainError::internal(format!(
                "{} chunks but {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }
        let Some(first) = embeddings.first() else {
            return Ok(());
        };

        self.ensure_collection(first.dimension()).await?;

        let points = chunks
            .iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| Self::to_point(chunk, embedding))
            .collect::<Result<Vec<_>, _>>()?;

        self.client
            .upsert_points_chunked(
                UpsertPointsBuilder::new(&self.collection, points).wait(true),
                UPSERT_BATCH_SIZE,
            )
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        tracing::debug!(collection = %self.collection, count = chunks.len(), "points upserted");
        Ok(())
    }

    async fn search(&self, query: &Embedding, top_k: usize) -> Result<Vec<SearchResult>, DomainError> {
        if top_k == 0 {
            return Ok(Vec::new());
        }
        if !self.collection_exists().await? {
            tracing::warn!(collection = %self.collection, "collection does not exist");
            return Ok(Vec::new());
        }

        let results = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, query.as_slice().to_vec(), top_k as u64)
                    .with_payload(true),
            )
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        let search_results: Vec<SearchResult> = results
            .result
            .into_iter()
            .filter_map(|point| {
                let chunk = Self::from_payload(&point.payload);
                if chunk.is_none() {
                    tracing::warn!(collection = %self.collection, "skipping point with malformed payload");
                }
                chunk.map(|chunk| SearchResult {
                    chunk,
                    score: point.score,
                })
            })
            .collect();

        Ok(search_results)
    }

    async fn count(&self) -> Result<u64, DomainError> {
        if !self.collection_exists().await? {
            return Ok(0);
        }

        let response = self
            .client
            .count(CountPointsBuilder::new(&self.collection).exact(true))
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        Ok(response.result.map(|r| r.count).unwrap_or(0))
    }

    async fn clear(&self) -> Result<(), DomainError> {
        if !self.collection_exists().await? {
            return Ok(());
        }

        self.client
            .delete_collection(&self.collection)
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        tracing::info!(collection = %self.collection, "collection deleted");
        Ok(())
    }
}
