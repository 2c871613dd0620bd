//! Pipeline stages for job-ad generation.
//!
//! Each submodule implements exactly one step and can be tested alone.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ llm ──▶ postprocess ──▶ visual
//! (path)    (paragraphs) (prompt) (JobAdContent)  (poster)
//! ```
//!
//! 1. [`input`]   — classify the source path as a file or a folder
//! 2. [`extract`] — segment PDF/DOCX/TXT into paragraphs; blocking, so the
//!    orchestrator runs it in `spawn_blocking`
//! 3. [`llm`]     — one prompt in, one response out
//! 4. [`postprocess`] — locate and parse the JSON object in the response
//! 5. [`visual`]  — image-queue submission, polling, download and persistence

pub mod extract;
pub mod input;
pub mod llm;
pub mod postprocess;
pub mod visual;
