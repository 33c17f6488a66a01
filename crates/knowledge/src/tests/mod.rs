//! End-to-end tests over the in-memory store and the sparse provider.

mod ingest_flow;
mod routing;
