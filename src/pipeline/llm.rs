//! Language-model interaction: one prompt in, one response string out.
//!
//! [`TextGenerator`] is the narrow seam the synthesiser calls. Production
//! code uses [`ProviderGenerator`], which wraps any `edgequake_llm` provider;
//! tests substitute a scripted generator. Prompt wording lives in
//! [`crate::prompts`] and response parsing in
//! [`crate::pipeline::postprocess`], so this module only moves text.
//!
//! There is no retry here: a failed call is returned to the caller as
//! [`JobAdError::LlmApiError`].

use crate::config::GenerationConfig;
use crate::error::JobAdError;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// A synchronous-from-the-caller text completion: prompt in, text out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, JobAdError>;
}

/// [`TextGenerator`] backed by an `edgequake_llm` provider.
pub struct ProviderGenerator {
    provider: Arc<dyn LLMProvider>,
    options: CompletionOptions,
}

impl ProviderGenerator {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &GenerationConfig) -> Self {
        Self {
            provider,
            options: build_options(config),
        }
    }
}

#[async_trait]
impl TextGenerator for ProviderGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, JobAdError> {
        let start = Instant::now();
        let messages = vec![ChatMessage::user(prompt)];

        let response = self
            .provider
            .chat(&messages, Some(&self.options))
            .await
            .map_err(|e| JobAdError::LlmApiError {
                message: e.to_string(),
            })?;

        debug!(
            "Synthesis call: {} input tokens, {} output tokens, {:?}",
            response.prompt_tokens,
            response.completion_tokens,
            start.elapsed()
        );

        Ok(response.content)
    }
}

/// Build `CompletionOptions` from the generation config.
fn build_options(config: &GenerationConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}
