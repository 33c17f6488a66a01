//! Qdrant adapter.
//!
//! Talks to the collection through the `qdrant-client` gRPC client. Payloads
//! are the serialized [`Chunk`] fields; filters use keyword matches on the
//! indexed payload keys.

use async_trait::async_trait;
use devmind_core::{AppError, AppResult, QdrantConfig};
use qdrant_client::qdrant::{
    point_id::PointIdOptions, vectors_config, CollectionStatus, CreateCollectionBuilder,
    CreateFieldIndexCollectionBuilder, DeleteCollectionBuilder, DeletePointsBuilder, Distance,
    FieldType, GetCollectionInfoResponse, PointId, PointStruct, Query, QueryPointsBuilder,
    ScrollPointsBuilder, UpsertPointsBuilder, Value as QdrantValue, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant, QdrantError};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use super::{
    plan_collection, CollectionAction, CollectionInfo, Filter, PayloadField, Point, ScoredChunk,
    ScrollOptions, SearchOptions, VectorStore, UPSERT_BATCH_SIZE,
};
use crate::chunk::Chunk;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Page size when scanning point ids
const ID_SCAN_PAGE: u32 = 256;

pub struct QdrantStore {
    client: Qdrant,
    url: String,
    collection: String,
    vector_size: usize,
}

impl QdrantStore {
    /// Build the client. No request is sent until the first operation.
    pub fn new(config: &QdrantConfig) -> AppResult<Self> {
        let url = config.url.trim_end_matches('/').to_string();
        let api_key = config.api_key.clone().filter(|k| !k.trim().is_empty());

        let client = Qdrant::from_url(&url)
            .api_key(api_key)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .skip_compatibility_check()
            .build()
            .map_err(|e| AppError::Store(format!("Failed to create Qdrant client: {}", e)))?;

        Ok(Self {
            client,
            url,
            collection: config.collection.clone(),
            vector_size: config.vector_size,
        })
    }

    /// Map a client error; a missing collection becomes
    /// [`AppError::CollectionNotFound`].
    fn map_err(&self, op: &str, err: QdrantError) -> AppError {
        let message = err.to_string();
        if is_missing_collection(&message) {
            return AppError::CollectionNotFound(self.collection.clone());
        }
        AppError::Store(format!("Qdrant {} failed at {}: {}", op, self.url, message))
    }

    async fn create_collection(&self) -> AppResult<()> {
        info!(
            "Creating collection '{}' ({}-dim, cosine)",
            self.collection, self.vector_size
        );

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection)
                    .vectors_config(VectorParamsBuilder::new(
                        self.vector_size as u64,
                        Distance::Cosine,
                    ))
                    .on_disk_payload(true),
            )
            .await
            .map_err(|e| self.map_err("create collection", e))?;

        for field in PayloadField::INDEXED {
            self.client
                .create_field_index(
                    CreateFieldIndexCollectionBuilder::new(
                        &self.collection,
                        field.key(),
                        FieldType::Keyword,
                    )
                    .wait(true),
                )
                .await
                .map_err(|e| self.map_err("create payload index", e))?;
        }

        debug!("Collection '{}' created with payload indexes", self.collection);
        Ok(())
    }

    async fn scroll(&self, filter: &Filter, limit: usize) -> AppResult<Vec<Chunk>> {
        let mut request = ScrollPointsBuilder::new(&self.collection)
            .limit(limit.min(u32::MAX as usize) as u32)
            .with_payload(true)
            .with_vectors(false);
        if let Some(filter) = filter.to_qdrant() {
            request = request.filter(filter);
        }

        let response = self
            .client
            .scroll(request)
            .await
            .map_err(|e| self.map_err("scroll", e))?;

        response
            .result
            .into_iter()
            .map(|record| {
                let id = point_id(record.id.as_ref());
                payload_to_chunk(id, record.payload)
            })
            .collect()
    }
}

#[async_trait]
impl VectorStore for QdrantStore {
    fn collection(&self) -> &str {
        &self.collection
    }

    fn vector_size(&self) -> usize {
        self.vector_size
    }

    #[instrument(skip(self), fields(collection = %self.collection))]
    async fn ensure_collection(&self) -> AppResult<CollectionInfo> {
        let existing = self.collection_info().await?;

        match plan_collection(existing.as_ref().map(|i| i.vector_size), self.vector_size) {
            CollectionAction::Keep => {
                if let Some(info) = existing {
                    debug!(
                        "Collection '{}' exists ({} points, {}-dim)",
                        self.collection, info.points_count, info.vector_size
                    );
                    return Ok(info);
                }
            }
            CollectionAction::Recreate { existing } => {
                warn!(
                    "Collection '{}' has vector size {}, expected {}. Recreating",
                    self.collection, existing, self.vector_size
                );
                self.delete_collection().await?;
            }
            CollectionAction::Create => {}
        }

        self.create_collection().await?;
        self.collection_info()
            .await?
            .ok_or_else(|| AppError::CollectionNotFound(self.collection.clone()))
    }

    #[instrument(skip(self), fields(collection = %self.collection))]
    async fn collection_info(&self) -> AppResult<Option<CollectionInfo>> {
        match self.client.collection_info(self.collection.clone()).await {
            Ok(response) => collection_info_from(&self.collection, response).map(Some),
            Err(e) => match self.map_err("get collection", e) {
                AppError::CollectionNotFound(_) => Ok(None),
                e => Err(e),
            },
        }
    }

    #[instrument(skip(self, points), fields(collection = %self.collection, points = points.len()))]
    async fn upsert_points(&self, points: &[Point]) -> AppResult<()> {
        let batches = points.len().div_ceil(UPSERT_BATCH_SIZE);
        for (i, batch) in points.chunks(UPSERT_BATCH_SIZE).enumerate() {
            let batch = batch
                .iter()
                .map(point_struct)
                .collect::<AppResult<Vec<PointStruct>>>()?;

            self.client
                .upsert_points(UpsertPointsBuilder::new(&self.collection, batch).wait(true))
                .await
                .map_err(|e| self.map_err("upsert", e))?;
            debug!("Upserted batch {}/{}", i + 1, batches);
        }
        Ok(())
    }

    #[instrument(skip(self, vector, options), fields(collection = %self.collection, limit = options.limit))]
    async fn search(
        &self,
        vector: &[f32],
        options: &SearchOptions,
    ) -> AppResult<Vec<ScoredChunk>> {
        let mut request = QueryPointsBuilder::new(&self.collection)
            .query(Query::new_nearest(vector.to_vec()))
            .limit(options.limit as u64)
            .score_threshold(options.score_threshold)
            .with_payload(true);
        if let Some(filter) = options.filter().to_qdrant() {
            request = request.filter(filter);
        }

        let response = self
            .client
            .query(request)
            .await
            .map_err(|e| self.map_err("search", e))?;

        response
            .result
            .into_iter()
            .map(|hit| {
                let id = point_id(hit.id.as_ref());
                Ok(ScoredChunk {
                    id,
                    score: hit.score,
                    chunk: payload_to_chunk(id, hit.payload)?,
                })
            })
            .collect()
    }

    async fn scroll_all(&self, options: &ScrollOptions) -> AppResult<Vec<Chunk>> {
        self.scroll(&options.filter(), options.limit).await
    }

    async fn scroll_by_file(&self, source_file: &str, limit: usize) -> AppResult<Vec<Chunk>> {
        self.scroll(&Filter::by_file(source_file), limit).await
    }

    #[instrument(skip(self), fields(collection = %self.collection))]
    async fn max_point_id(&self) -> AppResult<Option<u64>> {
        let mut max = None;
        let mut offset: Option<PointId> = None;

        loop {
            let mut request = ScrollPointsBuilder::new(&self.collection)
                .limit(ID_SCAN_PAGE)
                .with_payload(false)
                .with_vectors(false);
            if let Some(offset) = offset.take() {
                request = request.offset(offset);
            }

            let response = self
                .client
                .scroll(request)
                .await
                .map_err(|e| self.map_err("scroll ids", e))?;

            let page_max = response
                .result
                .iter()
                .filter_map(|record| numeric_id(record.id.as_ref()))
                .max();
            max = max.max(page_max);

            match response.next_page_offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        Ok(max)
    }

    #[instrument(skip(self), fields(collection = %self.collection))]
    async fn delete_by_file(&self, source_file: &str) -> AppResult<()> {
        let Some(filter) = Filter::by_file(source_file).to_qdrant() else {
            return Ok(());
        };

        self.client
            .delete_points(
                DeletePointsBuilder::new(&self.collection)
                    .points(filter)
                    .wait(true),
            )
            .await
            .map_err(|e| self.map_err("delete points", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(collection = %self.collection))]
    async fn delete_collection(&self) -> AppResult<()> {
        match self
            .client
            .delete_collection(DeleteCollectionBuilder::new(&self.collection))
            .await
        {
            Ok(_) => Ok(()),
            Err(e) => match self.map_err("delete collection", e) {
                AppError::CollectionNotFound(_) => Ok(()),
                e => Err(e),
            },
        }
    }
}

/// Whether a Qdrant error message reports a missing collection.
fn is_missing_collection(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("doesn't exist") || message.contains("not found: collection")
}

fn collection_info_from(
    name: &str,
    response: GetCollectionInfoResponse,
) -> AppResult<CollectionInfo> {
    let info = response
        .result
        .ok_or_else(|| AppError::Store(format!("Empty collection info for '{}'", name)))?;

    let vector_size = info
        .config
        .as_ref()
        .and_then(|config| config.params.as_ref())
        .and_then(|params| params.vectors_config.as_ref())
        .and_then(|vectors| vectors.config.as_ref())
        .and_then(|config| match config {
            vectors_config::Config::Params(params) => Some(params.size as usize),
            vectors_config::Config::ParamsMap(_) => None,
        })
        .ok_or_else(|| {
            AppError::Store(format!("Collection '{}' has no single vector config", name))
        })?;

    let status = CollectionStatus::try_from(info.status)
        .map(|s| s.as_str_name().to_lowercase())
        .unwrap_or_else(|_| "unknown".to_string());

    Ok(CollectionInfo {
        name: name.to_string(),
        vector_size,
        points_count: info.points_count.unwrap_or(0),
        status,
    })
}

fn point_struct(point: &Point) -> AppResult<PointStruct> {
    let payload = Payload::try_from(serde_json::to_value(&point.payload)?).map_err(|e| {
        AppError::Serialization(format!("Payload for point {}: {}", point.id, e))
    })?;
    Ok(PointStruct::new(point.id, point.vector.clone(), payload))
}

fn numeric_id(id: Option<&PointId>) -> Option<u64> {
    match id?.point_id_options.as_ref()? {
        PointIdOptions::Num(n) => Some(*n),
        PointIdOptions::Uuid(_) => None,
    }
}

fn point_id(id: Option<&PointId>) -> u64 {
    numeric_id(id).unwrap_or_default()
}

fn payload_to_chunk(id: u64, payload: HashMap<String, QdrantValue>) -> AppResult<Chunk> {
    if payload.is_empty() {
        return Err(AppError::Store(format!("Point {} has no payload", id)));
    }

    let object: serde_json::Map<String, serde_json::Value> = payload
        .into_iter()
        .map(|(key, value)| (key, value.into_json()))
        .collect();
    serde_json::from_value(serde_json::Value::Object(object))
        .map_err(|e| AppError::Store(format!("Malformed payload for point {}: {}", id, e)))
}
