//! CLI binary for jobad-gen.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `GenerationConfig`, runs one or all pipeline stages and writes the
//! results.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use jobad_gen::generate::{poster_title, write_atomic};
use jobad_gen::{
    extract, generate_to_files, read_extracted, synthesize, visualize, write_json_atomic,
    ExtractedText, GenerationConfig, PipelineProgressCallback, ProgressCallback, Stage,
    VisualAsset,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal spinner with one log line per extracted/skipped file and per
/// finished stage.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new(message: &str) -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("jobad");
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl PipelineProgressCallback for CliProgressCallback {
    fn on_stage_start(&self, stage: Stage) {
        self.bar.set_prefix(stage.to_string());
        let msg = match stage {
            Stage::Extract => "Reading documents…",
            Stage::Synthesize => "Asking the language model…",
            Stage::Visualize => "Waiting for the image queue…",
        };
        self.bar.set_message(msg);
    }

    fn on_stage_complete(&self, stage: Stage, elapsed_ms: u64) {
        self.bar.println(format!(
            "{} {:<11} {}",
            green("✓"),
            stage.to_string(),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
    }

    fn on_file_extracted(&self, file_name: &str, paragraphs: usize) {
        self.bar.println(format!(
            "  {} {}  {}",
            green("·"),
            file_name,
            dim(&format!("{paragraphs} paragraphs")),
        ));
    }

    fn on_file_skipped(&self, file_name: &str, error: &str) {
        // Truncate very long error messages to keep output tidy.
        let msg: String = if error.chars().count() > 80 {
            error.chars().take(79).chain(std::iter::once('…')).collect()
        } else {
            error.to_string()
        };
        self.bar
            .println(format!("  {} {}  {}", red("✗"), file_name, red(&msg)));
    }

    fn on_generation_log(&self, message: &str) {
        self.bar.set_message(message.to_string());
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Full pipeline over a folder of job descriptions
  jobad run data/input -o data/output/job_ad.json --output-image data/output/poster

  # Keep the extracted paragraphs too
  jobad run posting.docx --extracted-json data/output/extracted.json

  # One stage at a time
  jobad extract data/input -o extracted.json
  jobad synthesize extracted.json -o job_ad.json
  jobad visualize --title "Senior Data Analyst" --summary "Turn data into decisions."

  # Use a specific model
  jobad --provider anthropic --model claude-sonnet-4-20250514 run posting.pdf

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY       OpenAI API key
  ANTHROPIC_API_KEY    Anthropic API key
  GEMINI_API_KEY       Google Gemini API key
  JOBAD_LLM_PROVIDER   Provider override (used together with JOBAD_MODEL)
  JOBAD_MODEL          Model override
  FAL_KEY              fal.ai API key for poster generation
  RUST_LOG             Log filter, overrides --verbose/--quiet

  A .env file in the working directory is loaded at startup.
"#;

/// Generate job advertisements (copy + poster) from PDF/DOCX/TXT documents.
#[derive(Parser, Debug)]
#[command(
    name = "jobad",
    version,
    about = "Generate job advertisements from PDF/DOCX/TXT documents",
    long_about = "Extract paragraphs from job-description documents, synthesise a structured \
job advertisement (title, summary, responsibilities, requirements, qualifications) with an LLM, \
and generate a matching poster image through the fal.ai queue.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    global: GlobalArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full pipeline: extract, synthesise, visualise.
    Run {
        /// Source file (.pdf, .docx, .txt) or folder.
        source: PathBuf,

        /// Where to write the job-ad content JSON.
        #[arg(short, long, env = "JOBAD_OUTPUT", default_value = "data/output/job_ad.json")]
        output: PathBuf,

        /// Also copy the poster here (extension replaced by the real one).
        #[arg(long, env = "JOBAD_OUTPUT_IMAGE")]
        output_image: Option<PathBuf>,

        /// Also write the extracted paragraphs here.
        #[arg(long, env = "JOBAD_EXTRACTED_JSON")]
        extracted_json: Option<PathBuf>,
    },

    /// Extract paragraphs only.
    Extract {
        /// Source file (.pdf, .docx, .txt) or folder.
        source: PathBuf,

        /// Write JSON here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Synthesise job-ad content from an extracted-text JSON file.
    Synthesize {
        /// JSON written by `jobad extract` (single object or list).
        extracted_json: PathBuf,

        /// Write JSON here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate a poster for a title and summary.
    Visualize {
        #[arg(long)]
        title: String,

        #[arg(long)]
        summary: String,

        /// Also copy the poster here (extension replaced by the real one).
        #[arg(long)]
        output_image: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// LLM model ID (e.g. gpt-4.1-nano, gpt-4.1-mini, claude-sonnet-4-20250514).
    #[arg(long, global = true, env = "JOBAD_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(long, global = true, env = "JOBAD_PROVIDER")]
    provider: Option<String>,

    /// LLM temperature (0.0–2.0).
    #[arg(long, global = true, env = "JOBAD_TEMPERATURE", default_value_t = 0.2)]
    temperature: f32,

    /// Max LLM output tokens.
    #[arg(long, global = true, env = "JOBAD_MAX_TOKENS", default_value_t = 1024)]
    max_tokens: usize,

    /// Text file with a custom instruction template containing {context}.
    #[arg(long, global = true, env = "JOBAD_PROMPT_TEMPLATE")]
    prompt_template: Option<PathBuf>,

    /// Image model path on the fal.ai queue.
    #[arg(long, global = true, env = "JOBAD_IMAGE_MODEL", default_value = jobad_gen::config::DEFAULT_IMAGE_MODEL)]
    image_model: String,

    /// Image size preset.
    #[arg(long, global = true, env = "JOBAD_IMAGE_SIZE", default_value = "square_hd")]
    image_size: String,

    /// Illustration style preset.
    #[arg(long, global = true, env = "JOBAD_IMAGE_STYLE", default_value = "realistic_image")]
    image_style: String,

    /// fal.ai API key.
    #[arg(long, global = true, env = "FAL_KEY", hide_env_values = true)]
    fal_key: Option<String>,

    /// fal.ai queue base URL.
    #[arg(long, global = true, env = "JOBAD_FAL_QUEUE_URL", default_value = jobad_gen::config::DEFAULT_FAL_QUEUE_URL)]
    fal_queue_url: String,

    /// Image job poll interval in milliseconds.
    #[arg(long, global = true, env = "JOBAD_POLL_INTERVAL_MS", default_value_t = 500)]
    poll_interval_ms: u64,

    /// Directory generated posters are written to.
    #[arg(long, global = true, env = "JOBAD_OUTPUT_DIR", default_value = jobad_gen::config::DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Disable the progress spinner.
    #[arg(long, global = true, env = "JOBAD_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "JOBAD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "JOBAD_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let g = &cli.global;

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs while the spinner is active.
    let show_progress = !g.quiet && !g.no_progress && !g.verbose;
    let filter = if g.verbose {
        "debug"
    } else if g.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let progress = show_progress.then(|| CliProgressCallback::new("Starting…"));
    let config = build_config(
        g,
        progress
            .as_ref()
            .map(|cb| Arc::clone(cb) as Arc<dyn PipelineProgressCallback>),
    )
    .await?;

    let result = run_command(&cli.command, &config, g.quiet).await;
    if let Some(cb) = progress {
        cb.finish();
    }
    result
}

async fn run_command(command: &Command, config: &GenerationConfig, quiet: bool) -> Result<()> {
    match command {
        Command::Run {
            source,
            output,
            output_image,
            extracted_json,
        } => {
            let out = generate_to_files(source, output, config)
                .await
                .context("Job-ad generation failed")?;

            if let Some(path) = extracted_json {
                let extracted = if source.is_file() && out.extraction.len() == 1 {
                    ExtractedText::Single(out.extraction.documents[0].clone())
                } else {
                    ExtractedText::Batch(out.extraction.clone())
                };
                write_json_atomic(path, &extracted)
                    .await
                    .context("Failed to write extracted text")?;
            }

            let image_path = match output_image {
                Some(target) => copy_asset(&out.visual, target).await?,
                None => out.visual.path.clone(),
            };

            if !quiet {
                eprintln!(
                    "{}  {} documents  {} paragraphs  {}ms",
                    green("✔"),
                    out.stats.documents,
                    out.stats.paragraphs,
                    out.stats.total_duration_ms,
                );
                eprintln!("   {}  {}", dim("title "), bold(poster_title(&out.content)));
                eprintln!("   {}  {}", dim("content"), bold(&output.display().to_string()));
                eprintln!("   {}  {}", dim("poster "), bold(&image_path.display().to_string()));
            }
        }

        Command::Extract { source, output } => {
            let extracted = extract(source, config)
                .await
                .context("Extraction failed")?;
            emit_json(output.as_deref(), &extracted).await?;

            if !quiet {
                let batch = extracted.into_batch();
                eprintln!(
                    "{}  {} documents  {} paragraphs",
                    green("✔"),
                    batch.len(),
                    batch.paragraph_count()
                );
            }
        }

        Command::Synthesize {
            extracted_json,
            output,
        } => {
            let batch = read_extracted(extracted_json)
                .await
                .context("Failed to read extracted text")?;
            let content = synthesize(batch.paragraphs(), config)
                .await
                .context("Synthesis failed")?;
            emit_json(output.as_deref(), &content).await?;
        }

        Command::Visualize {
            title,
            summary,
            output_image,
        } => {
            let asset = visualize(title, summary, config)
                .await
                .context("Poster generation failed")?;
            let path = match output_image {
                Some(target) => copy_asset(&asset, target).await?,
                None => asset.path.clone(),
            };
            if !quiet {
                eprintln!("{}  {}", green("✔"), bold(&path.display().to_string()));
            }
        }
    }

    Ok(())
}

/// Map CLI args to `GenerationConfig`.
async fn build_config(g: &GlobalArgs, progress: Option<ProgressCallback>) -> Result<GenerationConfig> {
    let mut builder = GenerationConfig::builder()
        .temperature(g.temperature)
        .max_tokens(g.max_tokens)
        .image_model(&g.image_model)
        .image_size(&g.image_size)
        .image_style(&g.image_style)
        .fal_queue_url(&g.fal_queue_url)
        .poll_interval_ms(g.poll_interval_ms)
        .output_dir(&g.output_dir);

    if let Some(ref model) = g.model {
        builder = builder.model(model);
    }
    if let Some(ref provider) = g.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(ref key) = g.fal_key {
        builder = builder.fal_key(key);
    }
    if let Some(ref path) = g.prompt_template {
        let template = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read prompt template from {:?}", path))?;
        builder = builder.prompt_template(template);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Write `value` as pretty JSON to `path`, or to stdout.
async fn emit_json<T: serde::Serialize>(path: Option<&Path>, value: &T) -> Result<()> {
    match path {
        Some(p) => write_json_atomic(p, value)
            .await
            .with_context(|| format!("Failed to write {}", p.display())),
        None => {
            let json = serde_json::to_string_pretty(value).context("Failed to serialise output")?;
            println!("{json}");
            Ok(())
        }
    }
}

/// Copy the persisted poster to `target`, swapping in the asset's extension.
async fn copy_asset(asset: &VisualAsset, target: &Path) -> Result<PathBuf> {
    let path = target.with_extension(&asset.extension);
    write_atomic(&path, &asset.bytes)
        .await
        .with_context(|| format!("Failed to copy poster to {}", path.display()))?;
    Ok(path)
}
