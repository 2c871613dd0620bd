//! # jobad-gen
//!
//! Turn a handful of job-description documents into a job advertisement:
//! structured copy from a language model and a poster image from an
//! image-generation queue.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF / DOCX / TXT (file or folder)
//!  │
//!  ├─ 1. Extract     paragraphs per document (spawn_blocking)
//!  ├─ 2. Synthesise  first 5 paragraphs → LLM → JobAdContent (5 fields)
//!  └─ 3. Visualise   title + summary → fal.ai queue → poster on disk
//! ```
//!
//! Stages run strictly in order. A folder scan skips files it cannot read;
//! every other failure stops the run.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use jobad_gen::{generate, GenerationConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / …;
//!     // the image service reads FAL_KEY.
//!     let config = GenerationConfig::default();
//!     let output = generate("data/input", &config).await?;
//!     println!("{}", serde_json::to_string_pretty(&output.content)?);
//!     eprintln!("poster: {}", output.visual.path.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Running one stage
//!
//! ```rust,no_run
//! use jobad_gen::{extract, GenerationConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let batch = extract("data/input", &GenerationConfig::default()).await?.into_batch();
//! println!("{} documents, {} paragraphs", batch.len(), batch.paragraph_count());
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `jobad` binary (clap + anyhow + tracing-subscriber + indicatif + dotenvy) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! jobad-gen = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod generate;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{GenerationConfig, GenerationConfigBuilder};
pub use error::{ExtractionError, JobAdError};
pub use generate::{
    extract, extract_upload, generate, generate_sync, generate_to_files, generate_with,
    read_extracted, synthesize, synthesize_with, visualize, visualize_with, write_json_atomic,
};
pub use output::{
    Document, ExtractedText, ExtractionBatch, GenerationOutput, GenerationStats, JobAdContent,
    VisualAsset,
};
pub use pipeline::llm::TextGenerator;
pub use pipeline::visual::{AssetFetcher, ImageGenerator};
pub use progress::{NoopProgressCallback, PipelineProgressCallback, ProgressCallback, Stage};
