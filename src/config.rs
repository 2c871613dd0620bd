//! Configuration types for job-advertisement generation.
//!
//! All pipeline behaviour is controlled through [`GenerationConfig`], built
//! via its [`GenerationConfigBuilder`]. One struct carries the language-model
//! settings, the image-service settings and the output location, so a run can
//! be reproduced by logging its config.

use crate::error::JobAdError;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Default image-generation model on the fal.ai queue.
pub const DEFAULT_IMAGE_MODEL: &str = "fal-ai/recraft-v3";

/// Default fal.ai queue endpoint.
pub const DEFAULT_FAL_QUEUE_URL: &str = "https://queue.fal.run";

/// Default directory for generated assets.
pub const DEFAULT_OUTPUT_DIR: &str = "data/output";

/// Configuration for a job-ad generation run.
///
/// Built via [`GenerationConfig::builder()`] or using
/// [`GenerationConfig::default()`].
///
/// # Example
/// ```rust
/// use jobad_gen::GenerationConfig;
///
/// let config = GenerationConfig::builder()
///     .model("gpt-4.1-mini")
///     .image_style("digital_illustration")
///     .output_dir("out")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct GenerationConfig {
    /// LLM model identifier, e.g. "gpt-4.1-nano", "claude-sonnet-4-20250514".
    /// If None, uses the provider default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    /// If None along with `provider`, the provider is auto-detected.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature for the synthesis call. Default: 0.2.
    pub temperature: f32,

    /// Maximum tokens the LLM may generate. Default: 1024.
    ///
    /// Five short fields rarely exceed 600 tokens; a truncated response
    /// loses its closing brace and fails JSON extraction.
    pub max_tokens: usize,

    /// Custom instruction template. Must contain `{context}`.
    /// If None, uses [`crate::prompts::JOB_AD_PROMPT_TEMPLATE`].
    pub prompt_template: Option<String>,

    /// Image model path on the fal.ai queue. Default: `fal-ai/recraft-v3`.
    pub image_model: String,

    /// Image size preset. Default: `square_hd`.
    pub image_size: String,

    /// Illustration style preset. Default: `realistic_image`.
    pub image_style: String,

    /// fal.ai API key. If None, the `FAL_KEY` environment variable is read
    /// when the image stage runs.
    pub fal_key: Option<String>,

    /// fal.ai queue base URL. Default: `https://queue.fal.run`.
    pub fal_queue_url: String,

    /// Delay between job-status polls in milliseconds. Default: 500.
    pub poll_interval_ms: u64,

    /// Directory the generated image is written to. Default: `data/output`.
    pub output_dir: PathBuf,

    /// Receives stage, file and image-queue events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.2,
            max_tokens: 1024,
            prompt_template: None,
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            image_size: "square_hd".to_string(),
            image_style: "realistic_image".to_string(),
            fal_key: None,
            fal_queue_url: DEFAULT_FAL_QUEUE_URL.to_string(),
            poll_interval_ms: 500,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("prompt_template", &self.prompt_template.as_ref().map(|_| "<custom>"))
            .field("image_model", &self.image_model)
            .field("image_size", &self.image_size)
            .field("image_style", &self.image_style)
            .field("fal_key", &self.fal_key.as_ref().map(|_| "<redacted>"))
            .field("fal_queue_url", &self.fal_queue_url)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .field("output_dir", &self.output_dir)
            .finish()
    }
}

impl GenerationConfig {
    /// Create a new builder for `GenerationConfig`.
    pub fn builder() -> GenerationConfigBuilder {
        GenerationConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`GenerationConfig`].
#[derive(Debug)]
pub struct GenerationConfigBuilder {
    config: GenerationConfig,
}

impl GenerationConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn prompt_template(mut self, template: impl Into<String>) -> Self {
        self.config.prompt_template = Some(template.into());
        self
    }

    pub fn image_model(mut self, model: impl Into<String>) -> Self {
        self.config.image_model = model.into();
        self
    }

    pub fn image_size(mut self, size: impl Into<String>) -> Self {
        self.config.image_size = size.into();
        self
    }

    pub fn image_style(mut self, style: impl Into<String>) -> Self {
        self.config.image_style = style.into();
        self
    }

    pub fn fal_key(mut self, key: impl Into<String>) -> Self {
        self.config.fal_key = Some(key.into());
        self
    }

    pub fn fal_queue_url(mut self, url: impl Into<String>) -> Self {
        self.config.fal_queue_url = url.into();
        self
    }

    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.poll_interval_ms = ms.max(50);
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<GenerationConfig, JobAdError> {
        let c = &self.config;
        if let Some(ref template) = c.prompt_template {
            if !template.contains("{context}") {
                return Err(JobAdError::InvalidConfig(
                    "prompt template must contain a {context} placeholder".into(),
                ));
            }
        }
        if c.max_tokens == 0 {
            return Err(JobAdError::InvalidConfig("max_tokens must be ≥ 1".into()));
        }
        if c.image_model.trim().is_empty() {
            return Err(JobAdError::InvalidConfig("image model must not be empty".into()));
        }
        if !(c.fal_queue_url.starts_with("http://") || c.fal_queue_url.starts_with("https://")) {
            return Err(JobAdError::InvalidConfig(format!(
                "fal queue URL must be http(s), got '{}'",
                c.fal_queue_url
            )));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_poster_settings() {
        let c = GenerationConfig::builder().build().unwrap();
        assert_eq!(c.image_model, "fal-ai/recraft-v3");
        assert_eq!(c.image_size, "square_hd");
        assert_eq!(c.image_style, "realistic_image");
        assert_eq!(c.output_dir, PathBuf::from("data/output"));
    }

    #[test]
    fn template_without_placeholder_is_rejected() {
        let err = GenerationConfig::builder()
            .prompt_template("Summarise this job")
            .build()
            .unwrap_err();
        assert!(matches!(err, JobAdError::InvalidConfig(_)));
    }

    #[test]
    fn clamps_are_applied() {
        let c = GenerationConfig::builder()
            .temperature(5.0)
            .poll_interval_ms(1)
            .build()
            .unwrap();
        assert_eq!(c.temperature, 2.0);
        assert_eq!(c.poll_interval_ms, 50);
    }

    #[test]
    fn non_http_queue_url_is_rejected() {
        let err = GenerationConfig::builder()
            .fal_queue_url("queue.fal.run")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("queue.fal.run"));
    }

    #[test]
    fn debug_redacts_key() {
        let c = GenerationConfig::builder().fal_key("secret-123").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("secret-123"));
        assert!(dbg.contains("<redacted>"));
    }
}
