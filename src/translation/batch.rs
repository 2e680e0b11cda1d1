/*!
 * Batch translation with retries and bisection fallback.
 *
 * A batch is sent as one request. When every attempt for a batch fails, the
 * batch is split in half and each half is translated on its own, recursively,
 * down to single lines. A result is only produced when every line of the
 * original batch was translated, in order.
 */

use futures::future::{BoxFuture, FutureExt};
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::TranslationCommonConfig;
use crate::errors::{ProviderError, TranslationError};
use crate::providers::{CompletionRequest, Provider};
use crate::validation::TranslationValidator;

use super::formatting::{strip_bidi_controls, wrap_rtl};
use super::parser::parse_response;
use super::prompts::batch_user_message;

/// Failure of a whole batch
pub type BatchError = TranslationError;

/// Retry and pacing settings for the batch translator
#[derive(Debug, Clone)]
pub struct BatchSettings {
    /// Attempts per batch before it is split
    pub max_retries: u32,
    /// Largest batch that is given up on instead of split
    pub min_split_size: usize,
    /// Rate-limit pause at depth 0
    pub rate_limit_cooldown: Duration,
    /// Lower bound for the rate-limit pause
    pub min_rate_limit_cooldown: Duration,
    /// Sampling temperature
    pub temperature: f32,
    /// Wrap accepted lines in a right-to-left embedding
    pub wrap_rtl: bool,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self::from_config(&TranslationCommonConfig::default(), 0.1, true)
    }
}

impl BatchSettings {
    /// Build settings from the common translation configuration
    pub fn from_config(config: &TranslationCommonConfig, temperature: f32, wrap_rtl: bool) -> Self {
        Self {
            max_retries: config.max_retries,
            min_split_size: config.min_split_size.max(1),
            rate_limit_cooldown: Duration::from_millis(config.rate_limit_cooldown_ms),
            min_rate_limit_cooldown: Duration::from_millis(config.min_rate_limit_cooldown_ms),
            temperature,
            wrap_rtl,
        }
    }

    /// Pause after a rate-limit response at a given split depth
    ///
    /// Halves per level but never drops below the configured minimum.
    pub fn rate_limit_cooldown_for_depth(&self, depth: u32) -> Duration {
        let base = self.rate_limit_cooldown.as_millis() as u64;
        let halved = base.checked_shr(depth).unwrap_or(0);
        Duration::from_millis(halved).max(self.min_rate_limit_cooldown)
    }
}

/// Classification of a single request attempt
#[derive(Debug)]
pub enum AttemptOutcome {
    /// Parsed and validated lines, ready for output
    Translated(Vec<String>),
    /// The service asked us to slow down
    Transient,
    /// The reply could not be parsed or failed validation
    Malformed(String),
    /// Any other provider error
    Failed(ProviderError),
    /// An error no retry can fix
    Fatal(ProviderError),
}

/// Translates batches of subtitle lines through a provider
#[derive(Debug, Clone)]
pub struct BatchTranslator {
    /// The provider to use
    provider: Arc<dyn Provider>,
    /// Rendered system prompt
    system_prompt: String,
    /// Reply validator
    validator: TranslationValidator,
    /// Retry settings
    settings: BatchSettings,
}

impl BatchTranslator {
    /// Create a new batch translator
    pub fn new(
        provider: Arc<dyn Provider>,
        system_prompt: impl Into<String>,
        validator: TranslationValidator,
        settings: BatchSettings,
    ) -> Self {
        Self {
            provider,
            system_prompt: system_prompt.into(),
            validator,
            settings,
        }
    }

    /// The settings in use
    pub fn settings(&self) -> &BatchSettings {
        &self.settings
    }

    /// Translate a batch, returning `None` if any line could not be translated
    pub async fn translate(&self, batch: &[String]) -> Option<Vec<String>> {
        match self.try_translate(batch).await {
            Ok(lines) => Some(lines),
            Err(e) => {
                error!("{}", e);
                None
            }
        }
    }

    /// Translate a batch, distinguishing fatal errors from untranslatable lines
    pub async fn try_translate(&self, batch: &[String]) -> Result<Vec<String>, BatchError> {
        self.translate_recursive(batch, 0).await
    }

    fn translate_recursive<'a>(
        &'a self,
        batch: &'a [String],
        depth: u32,
    ) -> BoxFuture<'a, Result<Vec<String>, BatchError>> {
        async move {
            if batch.is_empty() {
                return Ok(Vec::new());
            }

            for attempt in 1..=self.settings.max_retries {
                match self.attempt(batch).await {
                    AttemptOutcome::Translated(lines) => return Ok(lines),
                    AttemptOutcome::Transient => {
                        let cooldown = self.settings.rate_limit_cooldown_for_depth(depth);
                        warn!(
                            "Rate limited (attempt {}/{}), cooling down {:?}",
                            attempt, self.settings.max_retries, cooldown
                        );
                        tokio::time::sleep(cooldown).await;
                    }
                    AttemptOutcome::Malformed(reason) => {
                        warn!(
                            "Rejected reply for {} line(s) (attempt {}/{}): {}",
                            batch.len(),
                            attempt,
                            self.settings.max_retries,
                            reason
                        );
                    }
                    AttemptOutcome::Failed(e) => {
                        error!(
                            "API error (attempt {}/{}): {}",
                            attempt, self.settings.max_retries, e
                        );
                    }
                    AttemptOutcome::Fatal(e) => {
                        error!("Aborting translation: {}", e);
                        return Err(BatchError::Fatal(e.to_string()));
                    }
                }
            }

            if batch.len() <= self.settings.min_split_size {
                warn!("Giving up on {} line(s) starting with: {:?}", batch.len(), batch[0]);
                return Err(BatchError::Untranslatable { size: batch.len() });
            }

            let mid = batch.len() / 2;
            info!(
                "Splitting batch of {} into {} and {}",
                batch.len(),
                mid,
                batch.len() - mid
            );

            let left = self.translate_recursive(&batch[..mid], depth + 1).await;
            if let Err(BatchError::Fatal(_)) = left {
                return left;
            }
            let right = self.translate_recursive(&batch[mid..], depth + 1).await;

            match (left, right) {
                (Ok(mut lines), Ok(rest)) => {
                    lines.extend(rest);
                    Ok(lines)
                }
                (_, Err(fatal @ BatchError::Fatal(_))) => Err(fatal),
                _ => Err(BatchError::Untranslatable { size: batch.len() }),
            }
        }
        .boxed()
    }

    /// Issue one request for `batch` and classify the result
    async fn attempt(&self, batch: &[String]) -> AttemptOutcome {
        let request = CompletionRequest::new(self.system_prompt.clone(), batch_user_message(batch))
            .temperature(self.settings.temperature);

        match self.provider.complete(request).await {
            Ok(raw) => self.evaluate(batch, &raw),
            Err(e) if e.is_fatal() => AttemptOutcome::Fatal(e),
            Err(e) if e.is_rate_limit() => AttemptOutcome::Transient,
            Err(e) => AttemptOutcome::Failed(e),
        }
    }

    /// Parse and validate a raw reply for `batch`
    fn evaluate(&self, batch: &[String], raw: &str) -> AttemptOutcome {
        let Some(parsed) = parse_response(raw.trim()) else {
            debug!("Unparsable reply: {}", raw);
            return AttemptOutcome::Malformed("no JSON list in reply".to_string());
        };

        let lines: Vec<String> = parsed.iter().map(|l| strip_bidi_controls(l)).collect();
        let verdict = self.validator.validate(batch, &lines);
        if !verdict.accepted {
            let reason = if lines.len() != batch.len() {
                format!("{} (sent {}, got {})", verdict.reason, batch.len(), lines.len())
            } else {
                verdict.reason.to_string()
            };
            return AttemptOutcome::Malformed(reason);
        }

        if self.settings.wrap_rtl {
            AttemptOutcome::Translated(lines.iter().map(|l| wrap_rtl(l)).collect())
        } else {
            AttemptOutcome::Translated(lines)
        }
    }
}
