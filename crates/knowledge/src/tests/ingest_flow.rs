//! Ingestion, re-ingestion, memory notes and watcher sync.

use std::fs;
use std::sync::Arc;

use devmind_core::AppError;

use super::fixtures::*;
use crate::chunk::{chunk_file, Category};
use crate::embeddings::Embedder;
use crate::memory_notes::{save_memory, MemorySummary, MEMORY_DOCUMENT};
use crate::store::{ScrollOptions, VectorStore, DEFAULT_FILE_SCROLL_LIMIT};
use crate::watch::sync_file;

#[tokio::test]
async fn test_single_rule_file_yields_two_rule_chunks() {
    let ws = Workspace::new();
    ws.write("rules/a.md", &doc_with_sections("A", &["First", "Second"]));

    let report = ws.ingestor.full_reingest().await.unwrap();

    assert_eq!(report.chunks_total, 2);
    assert_eq!(report.embedded, 2);
    assert_eq!(report.failed, 0);
    assert_eq!(report.points_count, 2);
    assert_eq!(report.by_category.get("rule"), Some(&2));

    let chunks = ws.store.scroll_all(&ScrollOptions::default()).await.unwrap();
    assert_eq!(chunks.len(), 2);
    assert!(chunks.iter().all(|c| c.category == Category::Rule));
    assert_eq!(ws.store.max_point_id().await.unwrap(), Some(2));
}

#[tokio::test]
async fn test_full_reingest_replaces_previous_collection() {
    let ws = Workspace::new();
    ws.write("rules/a.md", &doc_with_sections("A", &["One", "Two", "Three"]));
    ws.ingestor.full_reingest().await.unwrap();

    ws.write("rules/a.md", &doc_with_sections("A", &["One"]));
    let report = ws.ingestor.full_reingest().await.unwrap();

    assert_eq!(report.points_count, 1);
}

#[tokio::test]
async fn test_scroll_by_file_round_trips_metadata() {
    let ws = Workspace::new();
    ws.write(
        "workflows/deploy.md",
        "# Deploy\n\n## Release\nYou MUST run the api tests before every deploy to staging.\n",
    );
    ws.ingestor.full_reingest().await.unwrap();

    let expected = chunk_file(ws.root(), &ws.root().join("workflows/deploy.md")).unwrap();
    let stored = ws
        .store
        .scroll_by_file("workflows/deploy.md", DEFAULT_FILE_SCROLL_LIMIT)
        .await
        .unwrap();

    assert_eq!(stored, expected);
    assert_eq!(stored[0].category, Category::Workflow);
}

#[tokio::test]
async fn test_failed_chunks_are_reported_not_fatal() {
    let embedder = Embedder::new(Arc::new(FailsOn::new("Broken")));
    let ws = Workspace::with_embedder(embedder);
    ws.write("rules/a.md", &doc_with_sections("A", &["Fine", "Broken"]));
    ws.write("memory/notes.md", &doc_with_sections("Notes", &["Kept"]));

    let report = ws.ingestor.full_reingest().await.unwrap();

    assert_eq!(report.chunks_total, 3);
    assert_eq!(report.embedded, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.failures[0].source_file, "rules/a.md");
    assert_eq!(report.failures[0].section, "Broken");
    assert_eq!(report.points_count, 2);
    assert_eq!(report.by_category.get("memory"), Some(&1));
}

#[tokio::test]
async fn test_reingest_single_file_replaces_its_points() {
    let ws = Workspace::new();
    ws.write("rules/a.md", &doc_with_sections("A", &["One", "Two"]));
    ws.write("rules/b.md", &doc_with_sections("B", &["Other"]));
    ws.ingestor.full_reingest().await.unwrap();

    ws.write("rules/a.md", &doc_with_sections("A", &["Only"]));
    let report = ws.ingestor.reingest_single_file("./rules/a.md").await.unwrap();

    assert_eq!(report.embedded, 1);
    assert_eq!(report.points_count, 2);

    let a = ws.store.scroll_by_file("rules/a.md", 50).await.unwrap();
    assert_eq!(a.len(), 1);
    assert_eq!(a[0].section, "Only");
    assert_eq!(ws.store.scroll_by_file("rules/b.md", 50).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_back_to_back_single_file_runs_keep_every_point() {
    let ws = Workspace::new();
    ws.write("rules/a.md", &doc_with_sections("A", &["One", "Two"]));
    ws.write("rules/b.md", &doc_with_sections("B", &["Three", "Four"]));
    ws.ingestor.full_reingest().await.unwrap();

    ws.ingestor.reingest_single_file("rules/a.md").await.unwrap();
    let report = ws.ingestor.reingest_single_file("rules/b.md").await.unwrap();

    assert_eq!(report.points_count, 4);
    assert_eq!(ws.store.scroll_by_file("rules/a.md", 50).await.unwrap().len(), 2);
    assert_eq!(ws.store.scroll_by_file("rules/b.md", 50).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_concurrent_single_file_runs_keep_every_point() {
    let ws = Workspace::with_embedder(Embedder::new(Arc::new(Yielding::new())));
    ws.write("rules/a.md", &doc_with_sections("A", &["One", "Two"]));
    ws.write("rules/b.md", &doc_with_sections("B", &["Three", "Four"]));
    ws.write("rules/c.md", &doc_with_sections("C", &["Five"]));
    ws.ingestor.full_reingest().await.unwrap();
    ws.ingestor.reingest_single_file("rules/c.md").await.unwrap();

    let (a, b) = tokio::join!(
        ws.ingestor.reingest_single_file("rules/a.md"),
        ws.ingestor.reingest_single_file("rules/b.md"),
    );
    a.unwrap();
    b.unwrap();

    assert_eq!(ws.store.scroll_by_file("rules/a.md", 50).await.unwrap().len(), 2);
    assert_eq!(ws.store.scroll_by_file("rules/b.md", 50).await.unwrap().len(), 2);
    assert_eq!(ws.store.scroll_by_file("rules/c.md", 50).await.unwrap().len(), 1);
    assert_eq!(ws.store.collection_info().await.unwrap().unwrap().points_count, 5);
}

#[tokio::test]
async fn test_reingest_of_emptied_file_drops_stale_points() {
    let ws = Workspace::new();
    ws.write("rules/a.md", &doc_with_sections("A", &["One", "Two"]));
    ws.ingestor.full_reingest().await.unwrap();

    ws.write("rules/a.md", "# A\n\nshort\n");
    let report = ws.ingestor.reingest_single_file("rules/a.md").await.unwrap();

    assert_eq!(report.chunks_total, 0);
    assert_eq!(report.points_count, 0);
}

#[tokio::test]
async fn test_reingest_missing_file_is_chunking_error() {
    let ws = Workspace::new();
    ws.write("rules/a.md", &doc_with_sections("A", &["One"]));

    let result = ws.ingestor.reingest_single_file("rules/missing.md").await;
    assert!(matches!(result, Err(AppError::Chunking(_))));
}

#[tokio::test]
async fn test_remove_file_without_collection_is_ok() {
    let ws = Workspace::new();
    ws.ingestor.remove_file("rules/a.md").await.unwrap();
}

#[tokio::test]
async fn test_save_memory_appends_and_ingests() {
    let ws = Workspace::new();
    ws.write("rules/a.md", &doc_with_sections("A", &["One"]));
    ws.ingestor.full_reingest().await.unwrap();

    save_memory(
        &ws.ingestor,
        "build login page",
        &MemorySummary::List(vec!["used MVVM".into(), "added Zod schema".into()]),
        &["auth".to_string()],
    )
    .await
    .unwrap();
    let report = save_memory(&ws.ingestor, "fix hover bug", &"patched tooltip".into(), &[])
        .await
        .unwrap();

    assert_eq!(report.chunks_total, 2);
    assert_eq!(report.points_count, 3);

    let notes = ws
        .store
        .scroll_by_file(MEMORY_DOCUMENT, DEFAULT_FILE_SCROLL_LIMIT)
        .await
        .unwrap();
    let sections: Vec<&str> = notes.iter().map(|c| c.section.as_str()).collect();
    assert_eq!(sections, vec!["build login page", "fix hover bug"]);
    assert!(notes.iter().all(|c| c.category == Category::Memory));
    assert!(notes[0].content.contains("- added Zod schema"));
}

#[tokio::test]
async fn test_save_memory_rejects_empty_summary() {
    let ws = Workspace::new();
    let result = save_memory(&ws.ingestor, "task", &"   ".into(), &[]).await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(!ws.root().join(MEMORY_DOCUMENT).exists());
}

#[tokio::test]
async fn test_sync_file_follows_the_filesystem() {
    let ws = Workspace::new();
    ws.write("rules/a.md", &doc_with_sections("A", &["One"]));
    ws.ingestor.full_reingest().await.unwrap();

    ws.write("rules/new.md", &doc_with_sections("New", &["Fresh"]));
    sync_file(&ws.ingestor, "rules/new.md").await;
    assert_eq!(ws.store.scroll_by_file("rules/new.md", 50).await.unwrap().len(), 1);

    fs::remove_file(ws.root().join("rules/a.md")).unwrap();
    sync_file(&ws.ingestor, "rules/a.md").await;
    assert!(ws.store.scroll_by_file("rules/a.md", 50).await.unwrap().is_empty());
    assert_eq!(ws.store.collection_info().await.unwrap().unwrap().points_count, 1);
}
