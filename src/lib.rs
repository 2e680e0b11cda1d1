/*!
 * # rtlsub - subtitle folders translated into right-to-left languages
 *
 * A Rust library for translating WebVTT and SRT subtitle files through an
 * OpenAI-compatible generation API.
 *
 * ## Features
 *
 * - Batch translation with retries and recursive bisection of failing batches
 * - Heuristic validation of model replies (echoes, missing target script)
 * - Right-to-left output: bidi embedding per line, RTL style block for WebVTT
 * - Content-based file roles, legacy output migration and idempotent reruns
 * - ISO 639-1 and ISO 639-2 language code support
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `subtitle_processor`: Subtitle parsing and serialization
 * - `translation`: Batch translation:
 *   - `translation::batch`: Retrying, bisecting batch translator
 *   - `translation::parser`: Reply parsing
 *   - `translation::formatting`: Bidi controls
 *   - `translation::prompts`: Prompt construction
 * - `validation`: Reply plausibility checks
 * - `file_roles`: File classification, migration and planning
 * - `file_utils`: File system seam
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code and script utilities
 * - `providers`: Generation service clients:
 *   - `providers::openai`: OpenAI-compatible API client
 *   - `providers::mock`: Scripted provider for tests
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_roles;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod subtitle_processor;
pub mod translation;
pub mod validation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, RunSummary};
pub use errors::{AppError, ProviderError, TranslationError};
pub use file_roles::{FileRole, PipelineItem, PlannedAction, RoleClassifier};
pub use language_utils::{get_language_name, language_codes_match, normalize_to_part2t};
pub use subtitle_processor::{SubtitleCollection, SubtitleEntry, SubtitleFormat};
pub use translation::BatchTranslator;
pub use validation::{TranslationValidator, ValidationVerdict};
