//! Progress-callback trait for pipeline events.
//!
//! Inject an [`Arc<dyn PipelineProgressCallback>`] via
//! [`crate::config::GenerationConfigBuilder::progress_callback`] to receive
//! events as the pipeline extracts files, calls the language model and waits
//! on the image queue.
//!
//! # Example
//!
//! ```rust
//! use jobad_gen::{PipelineProgressCallback, GenerationConfig, Stage};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     files: AtomicUsize,
//! }
//!
//! impl PipelineProgressCallback for CountingCallback {
//!     fn on_file_extracted(&self, file_name: &str, paragraphs: usize) {
//!         self.files.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{file_name}: {paragraphs} paragraphs");
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { files: AtomicUsize::new(0) });
//!
//! let config = GenerationConfig::builder()
//!     .progress_callback(counter as Arc<dyn PipelineProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::fmt;
use std::sync::Arc;

/// The three pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extract,
    Synthesize,
    Visualize,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Extract => "extract",
            Stage::Synthesize => "synthesize",
            Stage::Visualize => "visualize",
        };
        f.write_str(name)
    }
}

/// Called by the pipeline as it runs.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait PipelineProgressCallback: Send + Sync {
    /// Called when a stage begins.
    fn on_stage_start(&self, stage: Stage) {
        let _ = stage;
    }

    /// Called when a stage finishes successfully.
    fn on_stage_complete(&self, stage: Stage, elapsed_ms: u64) {
        let _ = (stage, elapsed_ms);
    }

    /// Called once per successfully extracted file, single source or folder scan.
    fn on_file_extracted(&self, file_name: &str, paragraphs: usize) {
        let _ = (file_name, paragraphs);
    }

    /// Called once per file a folder scan skipped because extraction failed.
    fn on_file_skipped(&self, file_name: &str, error: &str) {
        let _ = (file_name, error);
    }

    /// Called for each log line the image service reports while the job runs.
    /// Diagnostic only.
    fn on_generation_log(&self, message: &str) {
        let _ = message;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl PipelineProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::GenerationConfig`].
pub type ProgressCallback = Arc<dyn PipelineProgressCallback>;
