//! Error types for the jobad-gen library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`JobAdError`] — **Fatal**: the run cannot proceed (source missing,
//!   language-model output unparseable, image service returned nothing).
//!   Returned as `Err(JobAdError)` from every stage entry point.
//!
//! * [`ExtractionError`] — **Per-file**: one document could not be read.
//!   Single-file extraction propagates it (wrapped in
//!   [`JobAdError::Extraction`]); a folder scan logs it and moves on to the
//!   next file.
//!
//! The image stage distinguishes "no image produced" from "transport failure"
//! from "malformed response" with separate variants so callers can react to
//! each without string matching.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the jobad-gen library.
#[derive(Debug, Error)]
pub enum JobAdError {
    // ── Extraction errors ─────────────────────────────────────────────────
    /// A single-file extraction failed.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// The source path does not exist.
    #[error("Source not found: '{path}'\nPass a .pdf/.docx/.txt file or a folder containing them.")]
    SourceNotFound { path: PathBuf },

    /// Extraction finished but produced no paragraphs to synthesise from.
    #[error("No text was extracted from '{source_desc}'")]
    NoParagraphs { source_desc: String },

    // ── LLM errors ────────────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The LLM API call itself failed.
    #[error("LLM API error: {message}")]
    LlmApiError { message: String },

    /// The LLM response contained no parseable JSON object.
    #[error("Could not extract job ad JSON from the model response: {detail}\nResponse began with: {excerpt:?}")]
    SynthesisParse { detail: String, excerpt: String },

    // ── Image-generation errors ───────────────────────────────────────────
    /// No API key is available for the image-generation service.
    #[error("Image service is not configured.\n{hint}")]
    ImageServiceNotConfigured { hint: String },

    /// Network-level failure talking to the image-generation service.
    #[error("Image service request failed: {reason}")]
    ImageTransport { reason: String },

    /// The image-generation service answered with a non-success status.
    #[error("Image service rejected the request (HTTP {status}): {message}")]
    ImageServiceRejected { status: u16, message: String },

    /// The image-generation service answered with a body we cannot read.
    #[error("Malformed image service response: {detail}")]
    MalformedImageResponse { detail: String },

    /// The queued generation job ended in a non-success state.
    #[error("Image generation job ended with status '{status}'")]
    ImageJobFailed { status: String },

    /// The generation job completed but returned an empty image list.
    #[error("No images returned from the image service")]
    NoImageProduced,

    /// The generated image could not be downloaded.
    #[error("Failed to download generated image '{url}': {reason}")]
    ImageDownload { url: String, reason: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not read or parse an intermediate JSON input.
    #[error("Failed to read '{path}': {detail}")]
    InputReadFailed { path: PathBuf, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A failure to extract paragraphs from one source file.
///
/// Fatal for single-file extraction, skipped (and logged) by folder scans.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// File extension is not one of `.pdf`, `.docx`, `.txt`.
    #[error("Unsupported file format: '{extension}' ({path})")]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// The file does not exist.
    #[error("File not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// Opening or reading the file failed (including non-UTF-8 text files).
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The PDF could not be parsed or its text could not be decoded.
    #[error("Failed to extract PDF text from '{path}': {detail}")]
    Pdf { path: PathBuf, detail: String },

    /// The DOCX package could not be opened or parsed.
    #[error("Failed to parse DOCX '{path}': {detail}")]
    Docx { path: PathBuf, detail: String },
}

impl ExtractionError {
    /// The file this error refers to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            ExtractionError::UnsupportedFormat { path, .. }
            | ExtractionError::FileNotFound { path }
            | ExtractionError::Io { path, .. }
            | ExtractionError::Pdf { path, .. }
            | ExtractionError::Docx { path, .. } => path,
        }
    }
}
