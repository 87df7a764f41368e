pub mod gemini;

use std::collections::HashMap;

use async_trait::async_trait;
use minijinja::Value;

use crate::error::SentinelError;
use crate::template;

pub use gemini::GeminiClient;

/// Text-generation collaborator.
///
/// Object-safe for dynamic dispatch via `Arc<dyn TextGenerator>`.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for `prompt`.
    ///
    /// `Ok(None)` means the service answered but produced no candidate text.
    async fn generate(&self, prompt: &str) -> Result<Option<String>, SentinelError>;
}

/// The two kinds of AI output the handlers post, which differ only in wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Purpose {
    Review,
    Reply,
}

impl Purpose {
    fn header(&self) -> &'static str {
        match self {
            Purpose::Review => "🤖 **Gemini AI Review:**",
            Purpose::Reply => "🤖 **Gemini AI Reply:**",
        }
    }

    fn noun(&self) -> &'static str {
        match self {
            Purpose::Review => "review",
            Purpose::Reply => "reply",
        }
    }

    fn empty_input(&self) -> &'static str {
        match self {
            Purpose::Review => "No diff content found to review.",
            Purpose::Reply => "No content provided to respond to.",
        }
    }
}

/// Ask for a review of a PR diff. Never fails: errors become a fixed message.
pub async fn review_diff(generator: &dyn TextGenerator, prompt_template: &str, diff: &str) -> String {
    generate_with_fallback(generator, Purpose::Review, prompt_template, "diff", diff).await
}

/// Ask for a reply to an issue or discussion. Never fails.
pub async fn reply_to(generator: &dyn TextGenerator, prompt_template: &str, content: &str) -> String {
    generate_with_fallback(generator, Purpose::Reply, prompt_template, "content", content).await
}

/// Fallback text used when the diff itself could not be fetched.
pub fn review_unavailable() -> String {
    format!(
        "{} Unable to connect to AI service. Please try again later.",
        Purpose::Review.header()
    )
}

async fn generate_with_fallback(
    generator: &dyn TextGenerator,
    purpose: Purpose,
    prompt_template: &str,
    var: &str,
    input: &str,
) -> String {
    let header = purpose.header();

    if input.trim().is_empty() {
        return format!("{header} {}", purpose.empty_input());
    }

    let mut vars = HashMap::new();
    vars.insert(var, Value::from(input));
    let prompt = match template::render(purpose.noun(), prompt_template, vars) {
        Ok(p) => p,
        Err(e) => {
            tracing::error!(error = %e, "failed to render AI prompt");
            return format!(
                "{header} An error occurred while generating the {}.",
                purpose.noun()
            );
        }
    };

    match generator.generate(&prompt).await {
        Ok(Some(text)) => format!("{header}\n{text}"),
        Ok(None) => format!(
            "{header} Unable to generate {} at this time.",
            purpose.noun()
        ),
        Err(e) if e.is_collaborator_failure() => {
            tracing::error!(error = %e, "AI service request failed");
            format!("{header} Unable to connect to AI service. Please try again later.")
        }
        Err(SentinelError::Json(e)) => {
            tracing::error!(error = %e, "unexpected AI service response format");
            format!("{header} Received unexpected response from AI service.")
        }
        Err(e) => {
            tracing::error!(error = %e, "AI {} failed", purpose.noun());
            format!(
                "{header} An error occurred while generating the {}.",
                purpose.noun()
            )
        }
    }
}
