//! Prompts sent to the language model and the image model.
//!
//! Both prompts are fixed text with simple placeholders. Keeping them here
//! lets tests inspect them directly and gives one place to adjust wording.
//! The job-ad template can be overridden via
//! [`crate::config::GenerationConfig::prompt_template`].

/// Number of leading paragraphs sent to the language model.
///
/// Truncation, not summarisation: paragraphs after the fifth are dropped.
pub const MAX_CONTEXT_PARAGRAPHS: usize = 5;

/// Instruction template for job-ad synthesis. `{context}` is replaced with the
/// newline-joined context paragraphs.
pub const JOB_AD_PROMPT_TEMPLATE: &str = "Extract the key details from the job description below and respond in JSON format with keys: \
job_title, summary, responsibilities, requirements, qualifications. \n\n\
Job Description:\n{context}\n";

/// Title used for the poster when the model produced none.
pub const FALLBACK_JOB_TITLE: &str = "Job Ad";

/// Join the first [`MAX_CONTEXT_PARAGRAPHS`] paragraphs with newlines.
pub fn build_context<'a, I>(paragraphs: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    paragraphs
        .into_iter()
        .take(MAX_CONTEXT_PARAGRAPHS)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Embed `context` into `template` (or the default template).
pub fn job_ad_prompt(template: Option<&str>, context: &str) -> String {
    template
        .unwrap_or(JOB_AD_PROMPT_TEMPLATE)
        .replace("{context}", context)
}

/// Prompt for the poster image.
pub fn poster_prompt(title: &str, summary: &str) -> String {
    format!(
        "Generate a visual (image) for the job ad based on the title and summary.\n\
         Professional job advertisement poster for {title} role. {summary}"
    )
}
