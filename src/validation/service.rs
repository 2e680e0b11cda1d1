/*!
 * Plausibility check for a translated batch.
 *
 * A batch is accepted when it has the right number of lines, few lines were
 * echoed back in the source language, and few prose lines lack any character
 * of the target script. Short lines (a few words) are never counted, since
 * names and technical terms are legitimately left untranslated.
 */

use log::debug;

use crate::app_config::ValidationConfig;
use crate::language_utils::{self, Script};

use super::script::{is_code_like, is_same_text, word_count};

/// Reason given for an accepted batch
pub const REASON_OK: &str = "ok";
/// Reason given when the line counts differ
pub const REASON_LENGTH_MISMATCH: &str = "length mismatch";
/// Reason given when too many lines were echoed back
pub const REASON_TOO_MUCH_ECHOING: &str = "too much echoing";
/// Reason given when too many lines lack the target script
pub const REASON_MISSING_TARGET_LANGUAGE: &str = "missing target language";

/// Outcome of validating one batch
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationVerdict {
    /// Whether the batch is plausible
    pub accepted: bool,
    /// Short machine-readable reason
    pub reason: &'static str,
    /// Lines identical to their source
    pub echo_count: usize,
    /// Prose lines without any target-script character
    pub missing_count: usize,
}

impl ValidationVerdict {
    fn rejected(reason: &'static str, echo_count: usize, missing_count: usize) -> Self {
        Self {
            accepted: false,
            reason,
            echo_count,
            missing_count,
        }
    }
}

/// Heuristic validator for translated batches
#[derive(Debug, Clone)]
pub struct TranslationValidator {
    config: ValidationConfig,
    script: Script,
}

impl TranslationValidator {
    /// Create a validator expecting text in `script`
    pub fn new(config: ValidationConfig, script: Script) -> Self {
        Self { config, script }
    }

    /// Create a validator for a target language code
    pub fn for_language(config: ValidationConfig, target_language: &str) -> Self {
        Self::new(config, language_utils::script_for_language(target_language))
    }

    /// Script expected in translations
    pub fn script(&self) -> Script {
        self.script
    }

    /// Whether a translated line is an untranslated copy of its source
    pub fn is_echo(&self, original: &str, translated: &str) -> bool {
        word_count(translated) > self.config.min_words_for_check && is_same_text(original, translated)
    }

    /// Whether a translated line is prose with no target-script character
    pub fn is_missing_target(&self, translated: &str) -> bool {
        word_count(translated) > self.config.min_words_for_check
            && !self.script.appears_in(translated)
            && !is_code_like(translated)
    }

    /// Decide whether `translations` is a plausible translation of `originals`
    pub fn validate(&self, originals: &[String], translations: &[String]) -> ValidationVerdict {
        if originals.len() != translations.len() {
            debug!(
                "Rejecting batch: sent {} lines, got {}",
                originals.len(),
                translations.len()
            );
            return ValidationVerdict::rejected(REASON_LENGTH_MISMATCH, 0, 0);
        }

        let mut echo_count = 0;
        let mut missing_count = 0;
        for (original, translated) in originals.iter().zip(translations) {
            if self.is_echo(original, translated) {
                echo_count += 1;
            }
            if self.is_missing_target(translated) {
                missing_count += 1;
            }
        }

        let total = originals.len() as f64;
        if echo_count as f64 > self.config.echo_ratio_limit * total {
            debug!("Rejecting batch: {} of {} lines echoed", echo_count, originals.len());
            return ValidationVerdict::rejected(REASON_TOO_MUCH_ECHOING, echo_count, missing_count);
        }
        if missing_count as f64 > self.config.missing_ratio_limit * total {
            debug!(
                "Rejecting batch: {} of {} lines without target script",
                missing_count,
                originals.len()
            );
            return ValidationVerdict::rejected(
                REASON_MISSING_TARGET_LANGUAGE,
                echo_count,
                missing_count,
            );
        }

        ValidationVerdict {
            accepted: true,
            reason: REASON_OK,
            echo_count,
            missing_count,
        }
    }
}
