/*!
 * Prompt templates for subtitle translation.
 *
 * The system prompt is fixed for a run; the user message carries the batch
 * as a JSON list and states the exact number of lines expected back.
 */

/// System prompt template for subtitle translation.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Render the template with the given language names.
    pub fn render(&self, source_language: &str, target_language: &str) -> String {
        self.template
            .replace("{source_language}", source_language)
            .replace("{target_language}", target_language)
            .trim()
            .to_string()
    }
}

/// Build the user message for one batch
///
/// The JSON list follows the first newline so the reply can be matched
/// against the request line by line.
pub fn batch_user_message(lines: &[String]) -> String {
    let payload = serde_json::to_string(lines).unwrap_or_else(|_| "[]".to_string());
    format!(
        "Translate these specific {n} lines. Return exactly {n} lines in a JSON list:\n{payload}",
        n = lines.len(),
    )
}
