/*!
 * Subtitle line translation through a generation provider.
 *
 * It is split into several submodules:
 *
 * - `batch`: Retrying, bisecting batch translator
 * - `parser`: Extraction of the line list from a raw reply
 * - `formatting`: Right-to-left embedding of output lines
 * - `prompts`: System prompt template and user message
 */

// Re-export main types for easier usage
pub use self::batch::{AttemptOutcome, BatchError, BatchSettings, BatchTranslator};
pub use self::parser::parse_response;
pub use self::prompts::PromptTemplate;

// Submodules
pub mod batch;
pub mod formatting;
pub mod parser;
pub mod prompts;
