/*!
 * Validation module for translation quality assurance.
 *
 * Model replies are checked before they are accepted:
 * - Line count must match the request
 * - Few lines may be echoed back untranslated
 * - Few prose lines may lack the target script
 *
 * # Architecture
 *
 * - `script`: Per-line heuristics (word count, code detection)
 * - `service`: Batch-level verdict
 */

pub mod script;
pub mod service;

// Re-export main types
pub use service::{TranslationValidator, ValidationVerdict};
