/*!
 * Prompt construction for subtitle translation.
 *
 * This module provides:
 * - The configurable system prompt template
 * - The per-batch user message
 */

pub mod templates;

// Re-export main types
pub use templates::{PromptTemplate, batch_user_message};
