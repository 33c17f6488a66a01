//! Context routing against an ingested knowledge base.

use std::collections::HashSet;
use std::sync::Arc;

use devmind_core::{AppError, EmbeddingConfig};

use super::fixtures::*;
use crate::embeddings::create_embedder;
use crate::router::{ContextRouter, IDENTITY_LABEL};
use crate::store::{InMemoryStore, SearchOptions, VectorStore};

const DEBUG_TEXT: &str = "debug the login error by reading the logs before you fix anything";

async fn ingested_workspace() -> Workspace {
    let ws = Workspace::new();
    ws.write(
        IDENTITY,
        "# Senior Dev\n\n## Mindset\nThink like a senior engineer and keep changes small and reviewed.\n",
    );
    ws.write(
        "rules/trace-logs-explain-fix.md",
        &format!("# Trace Logs\n\n## Steps\n{DEBUG_TEXT}\n"),
    );
    ws.write(
        "rules/troubleshooting.md",
        &format!("# Troubleshooting\n\n## Checklist\n{DEBUG_TEXT}\n"),
    );
    ws.write(
        "rules/logging.md",
        "# Logging\n\n## Login errors\ndebug the login error debug the login error debug the login error\n",
    );
    ws.write(
        "rules/styling.md",
        "# Styling\n\n## Colors\nUse the palette tokens for backgrounds, borders and typography.\n",
    );
    ws.ingestor.full_reingest().await.unwrap();
    ws
}

fn router_for(ws: &Workspace) -> ContextRouter {
    let store: Arc<dyn VectorStore> = ws.store.clone();
    ContextRouter::new(store, sparse_embedder(), IDENTITY)
}

#[tokio::test]
async fn test_greeting_returns_empty_context() {
    // No collection at all: the casual path never touches the store.
    let store: Arc<dyn VectorStore> = memory_store();
    let router = ContextRouter::new(store, sparse_embedder(), IDENTITY);

    let result = router.route("hi", 5).await.unwrap();

    assert!(result.casual);
    assert!(result.merged_context.is_empty());
    assert!(result.manifest.entries.is_empty());
    assert_eq!(result.total_rules_applied, 0);
}

#[tokio::test]
async fn test_debug_task_loads_playbooks_deterministically() {
    let ws = ingested_workspace().await;
    let router = router_for(&ws);
    let task = "debug the login error";

    // The playbooks rank well semantically on their own.
    let vector = sparse_embedder().embed(task).await.unwrap();
    let raw = ws.store.search(&vector, &SearchOptions::with_limit(10)).await.unwrap();
    let raw_files: HashSet<&str> = raw.iter().map(|h| h.chunk.source_file.as_str()).collect();
    assert!(raw_files.contains("rules/troubleshooting.md"));
    assert!(raw_files.contains("rules/trace-logs-explain-fix.md"));

    let result = router.route(task, 10).await.unwrap();

    let labels: Vec<&str> = result.deterministic.iter().map(|b| b.label.as_str()).collect();
    assert_eq!(labels, vec![IDENTITY_LABEL, "Debug"]);

    let debug_files: Vec<&str> = result.deterministic[1]
        .chunks
        .iter()
        .map(|c| c.source_file.as_str())
        .collect();
    assert_eq!(
        debug_files,
        vec!["rules/trace-logs-explain-fix.md", "rules/troubleshooting.md"]
    );

    assert!(result
        .semantic
        .iter()
        .all(|h| h.chunk.source_file != "rules/troubleshooting.md"
            && h.chunk.source_file != "rules/trace-logs-explain-fix.md"));
    assert!(result
        .semantic
        .iter()
        .any(|h| h.chunk.source_file == "rules/logging.md"));

    assert!(result.merged_context.starts_with("=== Senior Dev Rule 1 ==="));
    assert!(result.merged_context.contains("=== Debug Rule 2 ==="));
    assert!(result.merged_context.contains("--- Task Rule 1 ("));
    assert_eq!(result.total_rules_applied, result.manifest.entries.len());
}

#[tokio::test]
async fn test_semantic_results_never_repeat_loaded_files() {
    let ws = ingested_workspace().await;
    let router = router_for(&ws);

    for task in [
        "debug the login error",
        "think like a senior engineer about login errors",
        "create a palette for backgrounds and fix the error",
    ] {
        let result = router.route(task, 10).await.unwrap();
        let loaded: HashSet<&str> = result
            .deterministic
            .iter()
            .flat_map(|b| b.chunks.iter().map(|c| c.source_file.as_str()))
            .chain(std::iter::once(IDENTITY))
            .collect();

        for hit in &result.semantic {
            assert!(
                !loaded.contains(hit.chunk.source_file.as_str()),
                "{} duplicated for task {:?}",
                hit.chunk.source_file,
                task
            );
        }
    }
}

#[tokio::test]
async fn test_zero_limit_skips_semantic_search() {
    let ws = ingested_workspace().await;
    let result = router_for(&ws).route("debug the login error", 0).await.unwrap();

    assert!(result.semantic.is_empty());
    assert!(!result.deterministic.is_empty());
}

#[tokio::test]
async fn test_route_before_ingest_reports_not_ingested() {
    let store: Arc<dyn VectorStore> = memory_store();
    let router = ContextRouter::new(store, sparse_embedder(), IDENTITY);

    let err = router.route("explain the login flow", 5).await.unwrap_err();
    assert!(err.is_not_ingested());
}

#[tokio::test]
async fn test_empty_task_is_rejected() {
    let ws = ingested_workspace().await;
    let result = router_for(&ws).route("   ", 5).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_local_failure_without_fallback_is_provider_error() {
    let config = EmbeddingConfig {
        ollama_url: "http://127.0.0.1:1".to_string(),
        ..Default::default()
    };
    let embedder = create_embedder(&config, DIMS).unwrap();
    assert!(!embedder.has_fallback());

    let result = embedder.embed("explain the login flow").await;
    assert!(matches!(result, Err(AppError::Provider(_))));

    // Retrieval fails as a whole rather than returning partial context.
    let ws = ingested_workspace().await;
    let store: Arc<dyn VectorStore> = ws.store.clone();
    let router = ContextRouter::new(store, embedder, IDENTITY);
    let result = router.route("explain the login flow", 5).await;
    assert!(matches!(result, Err(AppError::Provider(_))));
}

#[tokio::test]
async fn test_local_failure_with_groq_key_uses_sparse_fallback() {
    let config = EmbeddingConfig {
        ollama_url: "http://127.0.0.1:1".to_string(),
        groq_api_key: Some("gsk-test".to_string()),
        ..Default::default()
    };
    let embedder = create_embedder(&config, DIMS).unwrap();
    assert!(embedder.has_fallback());

    let vector = embedder.embed("explain the login flow").await.unwrap();
    assert_eq!(vector.len(), DIMS);
}

#[tokio::test]
async fn test_dimension_mismatch_recreates_collection() {
    let store = InMemoryStore::with_existing_collection(COLLECTION, 768, 512);
    store
        .insert_raw(1, vec![0.0; 512], {
            let ws = Workspace::new();
            ws.write("rules/a.md", &doc_with_sections("A", &["One"]));
            crate::chunk::chunk_knowledge_base(ws.root()).unwrap().remove(0)
        })
        .unwrap();

    let info = store.ensure_collection().await.unwrap();

    assert_eq!(info.vector_size, 768);
    assert_eq!(info.points_count, 0);
    assert_eq!(store.collection_info().await.unwrap().unwrap().vector_size, 768);
}
