//! Search orchestration: composing fetch, extraction, validation,
//! deduplication, and fallback into one pipeline.
//!
//! Submodules:
//! - [`scoring`]: relevance scoring and candidate validation
//! - [`dedup`]: near-duplicate removal
//! - [`search`]: the pipeline state machine and its multi-page, batch,
//!   and merged variants

pub mod dedup;
pub mod scoring;
pub mod search;

pub use search::{process_response, run_batch, run_merged, run_search};
