//! Pipeline Bootstrap - build-time and run-start utilities for the
//! transcript analytics pipeline.
//!
//! This library exports the pieces the orchestrator calls directly:
//! folder scaffolding, error journaling, and logger setup. The model
//! prefetcher also lives here so the build entrypoint stays thin.

/// Configuration management
pub mod config;
/// Pipeline folder scaffolding
pub mod folders;
/// Error journal (per-run CSV of failed items)
pub mod journal;
/// Model artifact prefetching from the Hugging Face hub
pub mod prefetch;
/// Object store access (GCS and local)
pub mod storage;
/// Process-wide logging setup
pub mod telemetry;
