use std::time::Duration;
use tracing::debug;

use crate::error::{RagError, Result};
use crate::gemini::GeminiClient;
use crate::intent::Mode;

/// Returned as a normal answer when the model call succeeds but carries no
/// usable output. Callers treat this as text, not as a failure.
pub const NO_VALID_RESPONSE: &str = "Error: No valid response.";

const ANSWER_TEMPLATE: &str = "\
Answer the question using only the information from the provided context. If the answer is not in the context, state: \"Answer is not available in the context.\"

Context:
{context}

Question:
{question}

Answer:
";

const QUALITY_TEMPLATE: &str = "\
Rate the quality of the paper based on the provided context on a scale from 1 to 10.

Context:
{context}

Question:
{question}

Quality Rating:
";

const SUMMARY_TEMPLATE: &str = "\
Summarize the most important points from the paper based on the provided context.

Context:
{context}

Question:
{question}

Important Points:
";

const READABILITY_TEMPLATE: &str = "\
Rate the readability of the paper based on the provided context on a scale from 1 to 10.

Context:
{context}

Question:
{question}

Readability Rating:
";

/// Prompt template for a mode. Every template carries exactly two fill
/// slots, `{context}` and `{question}`.
pub fn template_for(mode: Mode) -> &'static str {
    match mode {
        Mode::Answer => ANSWER_TEMPLATE,
        Mode::QualityRating => QUALITY_TEMPLATE,
        Mode::Summary => SUMMARY_TEMPLATE,
        Mode::ReadabilityRating => READABILITY_TEMPLATE,
    }
}

fn fill_template(template: &str, context: &str, question: &str) -> String {
    template
        .replace("{context}", context)
        .replace("{question}", question)
}

/// Fills the mode's template with retrieved context and the question, then
/// asks the generative model for the final text.
pub struct AnswerGenerator {
    client: GeminiClient,
    model: String,
}

impl AnswerGenerator {
    pub fn new(api_base: &str, api_key: &str, model: &str, timeout: Duration) -> Result<Self> {
        let client =
            GeminiClient::new(api_base, api_key, timeout).map_err(RagError::GenerationService)?;
        Ok(Self {
            client,
            model: model.to_string(),
        })
    }

    pub async fn generate(&self, mode: Mode, context: &str, question: &str) -> Result<String> {
        let prompt = fill_template(template_for(mode), context, question);
        debug!(?mode, prompt_chars = prompt.len(), "Generating answer");

        let output = self
            .client
            .generate(&self.model, None, &prompt, 0.3)
            .await
            .map_err(RagError::GenerationService)?;

        Ok(match output {
            Some(text) => text.trim().to_string(),
            None => NO_VALID_RESPONSE.to_string(),
        })
    }
}
