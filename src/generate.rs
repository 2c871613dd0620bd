//! Pipeline entry points.
//!
//! [`generate`] runs all three stages in order: extract, synthesise,
//! visualise. Each stage is also exposed on its own ([`extract`],
//! [`synthesize`], [`visualize`]) so the CLI subcommands and library users
//! can run one step against an intermediate artefact.
//!
//! Stages never overlap. A failing stage returns its error and nothing
//! downstream runs.

use crate::config::GenerationConfig;
use crate::error::JobAdError;
use crate::output::{
    Document, ExtractedText, ExtractionBatch, GenerationOutput, GenerationStats, JobAdContent,
    VisualAsset,
};
use crate::pipeline::input::{self, ResolvedInput};
use crate::pipeline::llm::{ProviderGenerator, TextGenerator};
use crate::pipeline::visual::{self, AssetFetcher, FalQueueClient, HttpFetcher, ImageGenerator};
use crate::pipeline::{extract as extractor, postprocess};
use crate::progress::Stage;
use crate::prompts;
use edgequake_llm::{LLMProvider, ProviderFactory};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Default model when only an OpenAI key is available.
pub const DEFAULT_MODEL: &str = "gpt-4.1-nano";

/// Run the full pipeline on a file or folder.
///
/// Provider and image client are resolved from `config` (and the
/// environment); see [`generate_with`] to inject them.
///
/// # Errors
/// Any stage failure. Per-file failures inside a folder scan are skipped
/// and only become fatal if no paragraphs remain
/// ([`JobAdError::NoParagraphs`]).
pub async fn generate(
    source: impl AsRef<Path>,
    config: &GenerationConfig,
) -> Result<GenerationOutput, JobAdError> {
    let source = source.as_ref();

    // Resolve collaborators before doing any work so a missing key fails fast.
    let provider = resolve_provider(config)?;
    let text = ProviderGenerator::new(provider, config);
    let images = FalQueueClient::from_config(config)?;
    let fetcher = HttpFetcher::new();

    generate_with(source, &text, &images, &fetcher, config).await
}

/// [`generate`] with explicit collaborators.
pub async fn generate_with(
    source: impl AsRef<Path>,
    text: &dyn TextGenerator,
    images: &dyn ImageGenerator,
    fetcher: &dyn AssetFetcher,
    config: &GenerationConfig,
) -> Result<GenerationOutput, JobAdError> {
    let total_start = Instant::now();
    let source = source.as_ref();
    info!("Starting job-ad generation: {}", source.display());

    // ── Stage 1: Extract ─────────────────────────────────────────────────
    let extract_start = stage_start(config, Stage::Extract);
    let extraction = extract(source, config).await?.into_batch();
    if extraction.paragraph_count() == 0 {
        return Err(JobAdError::NoParagraphs {
            source_desc: source.display().to_string(),
        });
    }
    let extract_duration_ms = stage_complete(config, Stage::Extract, extract_start);

    // ── Stage 2: Synthesise ──────────────────────────────────────────────
    let synth_start = stage_start(config, Stage::Synthesize);
    let content = synthesize_with(text, extraction.paragraphs(), config).await?;
    let synthesis_duration_ms = stage_complete(config, Stage::Synthesize, synth_start);

    // ── Stage 3: Visualise ───────────────────────────────────────────────
    let visual_start = stage_start(config, Stage::Visualize);
    let visual = visualize_with(
        images,
        fetcher,
        poster_title(&content),
        &content.summary,
        config,
    )
    .await?;
    let visual_duration_ms = stage_complete(config, Stage::Visualize, visual_start);

    let stats = GenerationStats {
        documents: extraction.len(),
        paragraphs: extraction.paragraph_count(),
        context_paragraphs: extraction
            .paragraph_count()
            .min(prompts::MAX_CONTEXT_PARAGRAPHS),
        extract_duration_ms,
        synthesis_duration_ms,
        visual_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Generation complete: {} documents, {} paragraphs, {}ms total",
        stats.documents, stats.paragraphs, stats.total_duration_ms
    );

    Ok(GenerationOutput {
        extraction,
        content,
        visual,
        stats,
    })
}

/// Run the pipeline and write the content JSON to `content_path`.
///
/// The JSON is written atomically. The image is persisted under
/// `config.output_dir` as usual.
pub async fn generate_to_files(
    source: impl AsRef<Path>,
    content_path: impl AsRef<Path>,
    config: &GenerationConfig,
) -> Result<GenerationOutput, JobAdError> {
    let output = generate(source, config).await?;
    write_json_atomic(content_path.as_ref(), &output.content).await?;
    Ok(output)
}

/// Synchronous wrapper around [`generate`].
///
/// Creates a temporary tokio runtime internally.
pub fn generate_sync(
    source: impl AsRef<Path>,
    config: &GenerationConfig,
) -> Result<GenerationOutput, JobAdError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| JobAdError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(generate(source, config))
}

// ── Stage entry points ───────────────────────────────────────────────────

/// Extract paragraphs from a file or folder.
///
/// A single file yields [`ExtractedText::Single`] and propagates its
/// extraction error. A folder yields [`ExtractedText::Batch`]; failing files
/// are skipped. Document parsing is blocking work and runs on the blocking
/// pool.
pub async fn extract(
    source: impl AsRef<Path>,
    config: &GenerationConfig,
) -> Result<ExtractedText, JobAdError> {
    let resolved = input::resolve_input(source)?;
    debug!("Extracting from {}", resolved.path().display());
    let progress = config.progress_callback.clone();

    tokio::task::spawn_blocking(move || -> Result<ExtractedText, JobAdError> {
        match resolved {
            ResolvedInput::File(path) => {
                let doc = extractor::extract_file(&path)?;
                if let Some(ref cb) = progress {
                    cb.on_file_extracted(&doc.file_name, doc.paragraphs.len());
                }
                Ok(ExtractedText::Single(doc))
            }
            ResolvedInput::Folder(dir) => {
                extractor::extract_folder(&dir, progress.as_deref()).map(ExtractedText::Batch)
            }
        }
    })
    .await
    .map_err(|e| JobAdError::Internal(format!("extraction task panicked: {e}")))?
}

/// Extract an uploaded file held in memory.
pub async fn extract_upload(file_name: &str, bytes: &[u8]) -> Result<Document, JobAdError> {
    let file_name = file_name.to_string();
    let bytes = bytes.to_vec();
    tokio::task::spawn_blocking(move || extractor::extract_upload(&file_name, &bytes))
        .await
        .map_err(|e| JobAdError::Internal(format!("upload extraction task panicked: {e}")))?
        .map_err(JobAdError::from)
}

/// Synthesise job-ad content using the configured language model.
pub async fn synthesize<'a, I>(
    paragraphs: I,
    config: &GenerationConfig,
) -> Result<JobAdContent, JobAdError>
where
    I: IntoIterator<Item = &'a str>,
{
    let provider = resolve_provider(config)?;
    let generator = ProviderGenerator::new(provider, config);
    synthesize_with(&generator, paragraphs, config).await
}

/// Synthesise job-ad content with an explicit [`TextGenerator`].
///
/// Only the first [`prompts::MAX_CONTEXT_PARAGRAPHS`] paragraphs are sent.
pub async fn synthesize_with<'a, I>(
    generator: &dyn TextGenerator,
    paragraphs: I,
    config: &GenerationConfig,
) -> Result<JobAdContent, JobAdError>
where
    I: IntoIterator<Item = &'a str>,
{
    let context = prompts::build_context(paragraphs);
    if context.trim().is_empty() {
        return Err(JobAdError::NoParagraphs {
            source_desc: "synthesis input".to_string(),
        });
    }
    let prompt = prompts::job_ad_prompt(config.prompt_template.as_deref(), &context);
    debug!("Synthesis prompt: {} chars", prompt.len());

    let response = generator.generate(&prompt).await?;
    let content = postprocess::parse_job_ad_response(&response)?;
    info!("Synthesised job ad: '{}'", content.job_title);
    Ok(content)
}

/// Generate and persist a poster using the fal.ai queue.
pub async fn visualize(
    title: &str,
    summary: &str,
    config: &GenerationConfig,
) -> Result<VisualAsset, JobAdError> {
    let client = FalQueueClient::from_config(config)?;
    visualize_with(&client, &HttpFetcher::new(), title, summary, config).await
}

/// Generate and persist a poster with explicit collaborators.
pub async fn visualize_with(
    images: &dyn ImageGenerator,
    fetcher: &dyn AssetFetcher,
    title: &str,
    summary: &str,
    config: &GenerationConfig,
) -> Result<VisualAsset, JobAdError> {
    visual::create_visual(images, fetcher, title, summary, config).await
}

/// Read an extracted-text JSON file (single object or list).
pub async fn read_extracted(path: impl AsRef<Path>) -> Result<ExtractionBatch, JobAdError> {
    let path = path.as_ref();
    let read_err = |detail: String| JobAdError::InputReadFailed {
        path: path.to_path_buf(),
        detail,
    };
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| read_err(e.to_string()))?;
    let parsed: ExtractedText = serde_json::from_str(&raw).map_err(|e| read_err(e.to_string()))?;
    Ok(parsed.into_batch())
}

/// Serialise `value` as pretty JSON and write it atomically (temp + rename).
pub async fn write_json_atomic<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
) -> Result<(), JobAdError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| JobAdError::Internal(format!("JSON serialisation failed: {e}")))?;
    write_atomic(path, json.as_bytes()).await
}

/// Write bytes atomically (temp file in the same directory, then rename).
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), JobAdError> {
    let write_err = |source| JobAdError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = tmp_sibling(path);
    tokio::fs::write(&tmp_path, bytes).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Title handed to the visualiser; falls back when the model left it blank.
pub fn poster_title(content: &JobAdContent) -> &str {
    let title = content.job_title.trim();
    if title.is_empty() {
        prompts::FALLBACK_JOB_TITLE
    } else {
        title
    }
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn stage_start(config: &GenerationConfig, stage: Stage) -> Instant {
    info!("Stage {stage} started");
    if let Some(ref cb) = config.progress_callback {
        cb.on_stage_start(stage);
    }
    Instant::now()
}

fn stage_complete(config: &GenerationConfig, stage: Stage, start: Instant) -> u64 {
    let elapsed_ms = start.elapsed().as_millis() as u64;
    debug!("Stage {stage} finished in {elapsed_ms}ms");
    if let Some(ref cb) = config.progress_callback {
        cb.on_stage_complete(stage, elapsed_ms);
    }
    elapsed_ms
}

fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, JobAdError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        JobAdError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the LLM provider, from most-specific to least-specific:
///
/// 1. `config.provider`, used as-is.
/// 2. `config.provider_name` with `config.model` (or [`DEFAULT_MODEL`]).
/// 3. `JOBAD_LLM_PROVIDER` + `JOBAD_MODEL`, when both are set.
/// 4. OpenAI, when `OPENAI_API_KEY` is set.
/// 5. `ProviderFactory::from_env` auto-detection.
pub fn resolve_provider(config: &GenerationConfig) -> Result<Arc<dyn LLMProvider>, JobAdError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
        return create_provider(name, model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("JOBAD_LLM_PROVIDER"),
        std::env::var("JOBAD_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_provider(&prov, &model);
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
            return create_provider("openai", model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| JobAdError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure a provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}
