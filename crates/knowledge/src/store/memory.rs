//! In-memory [`VectorStore`] implementation for tests and offline use.
//!
//! Points live in a `BTreeMap` keyed by id behind `std::sync::RwLock`.
//! Search is brute-force cosine similarity with the same filter semantics
//! as the Qdrant adapter.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use devmind_core::{AppError, AppResult};

use super::{
    cosine_similarity, plan_collection, CollectionAction, CollectionInfo, Filter, Point,
    ScoredChunk, ScrollOptions, SearchOptions, VectorStore,
};
use crate::chunk::Chunk;

struct StoredPoint {
    vector: Vec<f32>,
    payload: Chunk,
}

struct Collection {
    vector_size: usize,
    points: BTreeMap<u64, StoredPoint>,
}

impl Collection {
    fn empty(vector_size: usize) -> Self {
        Self {
            vector_size,
            points: BTreeMap::new(),
        }
    }
}

/// In-memory store for a single collection.
pub struct InMemoryStore {
    name: String,
    vector_size: usize,
    collection: RwLock<Option<Collection>>,
}

impl InMemoryStore {
    /// Store with no collection yet; `ensure_collection` creates it.
    pub fn new(name: impl Into<String>, vector_size: usize) -> Self {
        Self {
            name: name.into(),
            vector_size,
            collection: RwLock::new(None),
        }
    }

    /// Store whose collection already exists with `existing_size` dimensions.
    pub fn with_existing_collection(
        name: impl Into<String>,
        vector_size: usize,
        existing_size: usize,
    ) -> Self {
        Self {
            name: name.into(),
            vector_size,
            collection: RwLock::new(Some(Collection::empty(existing_size))),
        }
    }

    /// Insert a point bypassing the dimensionality check (fixture setup).
    pub fn insert_raw(&self, id: u64, vector: Vec<f32>, payload: Chunk) -> AppResult<()> {
        let mut guard = self.write()?;
        let collection = guard
            .as_mut()
            .ok_or_else(|| AppError::CollectionNotFound(self.name.clone()))?;
        collection.points.insert(id, StoredPoint { vector, payload });
        Ok(())
    }

    fn read(&self) -> AppResult<RwLockReadGuard<'_, Option<Collection>>> {
        self.collection
            .read()
            .map_err(|_| AppError::Store("in-memory store lock poisoned".to_string()))
    }

    fn write(&self) -> AppResult<RwLockWriteGuard<'_, Option<Collection>>> {
        self.collection
            .write()
            .map_err(|_| AppError::Store("in-memory store lock poisoned".to_string()))
    }

    fn info_of(&self, collection: &Collection) -> CollectionInfo {
        CollectionInfo {
            name: self.name.clone(),
            vector_size: collection.vector_size,
            points_count: collection.points.len() as u64,
            status: "green".to_string(),
        }
    }

    fn scroll(&self, filter: &Filter, limit: usize) -> AppResult<Vec<Chunk>> {
        let guard = self.read()?;
        let collection = guard
            .as_ref()
            .ok_or_else(|| AppError::CollectionNotFound(self.name.clone()))?;

        Ok(collection
            .points
            .values()
            .filter(|p| filter.matches(&p.payload))
            .take(limit)
            .map(|p| p.payload.clone())
            .collect())
    }
}

#[async_trait]
impl VectorStore for InMemoryStore {
    fn collection(&self) -> &str {
        &self.name
    }

    fn vector_size(&self) -> usize {
        self.vector_size
    }

    async fn ensure_collection(&self) -> AppResult<CollectionInfo> {
        let mut guard = self.write()?;
        let existing = guard.as_ref().map(|c| c.vector_size);

        match plan_collection(existing, self.vector_size) {
            CollectionAction::Keep => {}
            CollectionAction::Recreate { existing } => {
                tracing::warn!(
                    "Collection '{}' has vector size {}, expected {}. Recreating",
                    self.name,
                    existing,
                    self.vector_size
                );
                *guard = Some(Collection::empty(self.vector_size));
            }
            CollectionAction::Create => {
                *guard = Some(Collection::empty(self.vector_size));
            }
        }

        let collection = guard
            .as_ref()
            .ok_or_else(|| AppError::CollectionNotFound(self.name.clone()))?;
        Ok(self.info_of(collection))
    }

    async fn collection_info(&self) -> AppResult<Option<CollectionInfo>> {
        let guard = self.read()?;
        Ok(guard.as_ref().map(|c| self.info_of(c)))
    }

    async fn upsert_points(&self, points: &[Point]) -> AppResult<()> {
        let mut guard = self.write()?;
        let collection = guard
            .as_mut()
            .ok_or_else(|| AppError::CollectionNotFound(self.name.clone()))?;

        if let Some(bad) = points
            .iter()
            .find(|p| p.vector.len() != collection.vector_size)
        {
            return Err(AppError::Store(format!(
                "Point {} has {} dimensions, collection expects {}",
                bad.id,
                bad.vector.len(),
                collection.vector_size
            )));
        }

        for point in points {
            collection.points.insert(
                point.id,
                StoredPoint {
                    vector: point.vector.clone(),
                    payload: point.payload.clone(),
                },
            );
        }
        Ok(())
    }

    async fn search(
        &self,
        vector: &[f32],
        options: &SearchOptions,
    ) -> AppResult<Vec<ScoredChunk>> {
        let guard = self.read()?;
        let collection = guard
            .as_ref()
            .ok_or_else(|| AppError::CollectionNotFound(self.name.clone()))?;

        if vector.len() != collection.vector_size {
            return Err(AppError::Store(format!(
                "Query vector has {} dimensions, collection expects {}",
                vector.len(),
                collection.vector_size
            )));
        }

        let filter = options.filter();
        let mut results: Vec<ScoredChunk> = collection
            .points
            .iter()
            .filter(|(_, p)| filter.matches(&p.payload))
            .map(|(id, p)| ScoredChunk {
                id: *id,
                score: cosine_similarity(vector, &p.vector),
                chunk: p.payload.clone(),
            })
            .filter(|r| r.score >= options.score_threshold)
            .collect();

        // Stable sort keeps id order among equal scores
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(options.limit);

        Ok(results)
    }

    async fn scroll_all(&self, options: &ScrollOptions) -> AppResult<Vec<Chunk>> {
        self.scroll(&options.filter(), options.limit)
    }

    async fn scroll_by_file(&self, source_file: &str, limit: usize) -> AppResult<Vec<Chunk>> {
        self.scroll(&Filter::by_file(source_file), limit)
    }

    async fn max_point_id(&self) -> AppResult<Option<u64>> {
        let guard = self.read()?;
        let collection = guard
            .as_ref()
            .ok_or_else(|| AppError::CollectionNotFound(self.name.clone()))?;
        Ok(collection.points.keys().next_back().copied())
    }

    async fn delete_by_file(&self, source_file: &str) -> AppResult<()> {
        let mut guard = self.write()?;
        let collection = guard
            .as_mut()
            .ok_or_else(|| AppError::CollectionNotFound(self.name.clone()))?;

        let filter = Filter::by_file(source_file);
        collection.points.retain(|_, p| !filter.matches(&p.payload));
        Ok(())
    }

    async fn delete_collection(&self) -> AppResult<()> {
        let mut guard = self.write()?;
        *guard = None;
        Ok(())
    }
}
