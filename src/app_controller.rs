use anyhow::Result;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{debug, error, info, warn};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::Config;
use crate::errors::{AppError, TranslationError};
use crate::file_roles::{PipelineItem, PlannedAction, RoleClassifier, SkipReason};
use crate::file_utils::{FileSystem, RealFileSystem};
use crate::language_utils;
use crate::providers::Provider;
use crate::providers::openai::OpenAI;
use crate::subtitle_processor::SubtitleCollection;
use crate::translation::{BatchSettings, BatchTranslator, PromptTemplate};
use crate::validation::TranslationValidator;

// @module: Application controller for folder translation

/// A file ready to translate: where to read and where to write
#[derive(Debug, Clone, PartialEq, Eq)]
struct WorkUnit {
    source: PathBuf,
    output: PathBuf,
}

/// Outcome of a completed folder run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Legacy renames performed
    pub migrated: usize,
    /// Legacy files left in place
    pub conflicts: usize,
    /// Files needing no work
    pub skipped: usize,
    /// Files whose source rename was refused
    pub blocked: usize,
    /// Output files written, in order
    pub translated: Vec<PathBuf>,
    /// Files that needed the retry pass
    pub retried: usize,
}

impl RunSummary {
    /// Whether the run found nothing to translate
    pub fn is_noop(&self) -> bool {
        self.translated.is_empty() && self.retried == 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} translated ({} after retry), {} skipped, {} migrated, {} conflicts, {} blocked",
            self.translated.len(),
            self.retried,
            self.skipped,
            self.migrated,
            self.conflicts,
            self.blocked
        )
    }
}

/// Main application controller for subtitle translation
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Generation service, shared with the translator
    provider: Arc<dyn Provider>,
    // @field: Batch translator over the configured provider
    translator: BatchTranslator,
    // @field: File role classifier
    classifier: RoleClassifier,
    // @field: Filesystem access
    fs: Arc<dyn FileSystem>,
    // @field: Whether progress bars are drawn
    show_progress: bool,
}

impl Controller {
    // @method: Create a controller talking to the configured HTTP service
    pub fn with_config(config: Config) -> Result<Self> {
        let provider = Arc::new(OpenAI::from_config(&config.translation.provider));
        Ok(Self::with_provider(config, provider, Arc::new(RealFileSystem)))
    }

    // @method: Create a controller with an explicit provider and filesystem
    pub fn with_provider(config: Config, provider: Arc<dyn Provider>, fs: Arc<dyn FileSystem>) -> Self {
        let script = language_utils::script_for_language(&config.target_language);

        let system_prompt = PromptTemplate::new(&config.translation.common.system_prompt).render(
            &Self::language_name(&config.source_language),
            &Self::language_name(&config.target_language),
        );
        let validator = TranslationValidator::new(config.validation.clone(), script);
        let settings = BatchSettings::from_config(
            &config.translation.common,
            config.translation.provider.temperature,
            script.is_rtl(),
        );

        Self {
            translator: BatchTranslator::new(provider.clone(), system_prompt, validator, settings),
            provider,
            classifier: RoleClassifier::new(config.naming(), script),
            config,
            fs,
            show_progress: true,
        }
    }

    /// Disable progress bars
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    fn language_name(code: &str) -> String {
        language_utils::get_language_name(code).unwrap_or_else(|_| code.to_string())
    }

    fn multi_progress(&self) -> MultiProgress {
        if self.show_progress {
            MultiProgress::new()
        } else {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        }
    }

    fn bar_style(unit: &str) -> ProgressStyle {
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{percent}}%) {{msg}}",
                unit
            ))
            .or_else(|_| {
                ProgressStyle::default_bar()
                    .template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}")
            })
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░")
    }

    fn display_name(path: &Path) -> String {
        path.file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Check the service once before any file is touched
    ///
    /// A rejected credential stops the run. Other failures only warn, since
    /// the batch translator retries them per request.
    pub async fn check_provider(&self) -> Result<(), AppError> {
        match self.provider.test_connection().await {
            Ok(()) => {
                debug!("Connected to {}", self.config.translation.provider.endpoint);
                Ok(())
            }
            Err(e) if e.is_fatal() => {
                error!("The service rejected the credentials: {}", e);
                Err(TranslationError::Fatal(e.to_string()).into())
            }
            Err(e) => {
                warn!("Connection check failed, continuing anyway: {}", e);
                Ok(())
            }
        }
    }

    /// Translate every pending subtitle file of `dir`
    ///
    /// Legacy outputs are migrated first. Files that fail are retried once
    /// after all others; a second failure stops the run.
    pub async fn run_folder(&self, dir: &Path) -> Result<RunSummary, AppError> {
        let start_time = std::time::Instant::now();

        if !self.fs.is_dir(dir) {
            return Err(AppError::File(format!("Invalid directory: {:?}", dir)));
        }

        let mut summary = RunSummary::default();

        let report = self.classifier.migrate_legacy(self.fs.as_ref(), dir)?;
        summary.migrated = report.migrated_count();
        summary.conflicts = report.conflicts.len();
        if summary.migrated > 0 || summary.conflicts > 0 {
            info!(
                "Legacy migration: {} renames, {} conflicts",
                summary.migrated, summary.conflicts
            );
        }

        let items = self.classifier.plan(self.fs.as_ref(), dir)?;
        for item in &items {
            if let PlannedAction::Skip(reason) = &item.action {
                debug!("Skipping {:?} ({:?})", item.path, reason);
            }
        }
        summary.skipped = items.iter().filter(|i| !i.needs_translation()).count();
        let legacy_left = items
            .iter()
            .filter(|i| i.action == PlannedAction::Skip(SkipReason::LegacyConflict))
            .count();
        if legacy_left > 0 {
            warn!("{} legacy file(s) could not be migrated", legacy_left);
        }

        let pending: Vec<&PipelineItem> = items.iter().filter(|i| i.needs_translation()).collect();
        info!(
            "Skipped: {} file(s) already translated. Remaining: {} file(s).",
            summary.skipped,
            pending.len()
        );
        if pending.is_empty() {
            info!("All files are already translated!");
            return Ok(summary);
        }

        let multi_progress = self.multi_progress();
        let folder_pb = multi_progress.add(ProgressBar::new(pending.len() as u64));
        folder_pb.set_style(Self::bar_style("files"));

        let mut retry_queue = Vec::new();
        let common = &self.config.translation.common;

        for item in pending {
            folder_pb.set_message(format!("Processing: {}", Self::display_name(&item.path)));

            let unit = match self.classifier.prepare(self.fs.as_ref(), item) {
                Ok(source) => WorkUnit {
                    source,
                    output: item.output_path.clone(),
                },
                Err(e) => {
                    error!("Cannot prepare {:?}: {}", item.path, e);
                    summary.blocked += 1;
                    folder_pb.inc(1);
                    continue;
                }
            };

            match self.process_file(&unit, &multi_progress).await {
                Ok(()) => summary.translated.push(unit.output.clone()),
                Err(e) if e.is_fatal() => {
                    folder_pb.abandon_with_message("Aborted");
                    return Err(e);
                }
                Err(e) => {
                    warn!(
                        "Failed to translate {}: {}. Added to retry queue.",
                        Self::display_name(&unit.source),
                        e
                    );
                    retry_queue.push(unit);
                    tokio::time::sleep(common.failed_file_cooldown()).await;
                }
            }
            folder_pb.inc(1);
        }
        folder_pb.finish_with_message("Folder processing complete");

        if !retry_queue.is_empty() {
            warn!("Retrying {} failed file(s)...", retry_queue.len());
        }

        for unit in retry_queue {
            tokio::time::sleep(common.retry_pass_cooldown()).await;
            info!("Retrying: {}", Self::display_name(&unit.source));

            match self.process_file(&unit, &multi_progress).await {
                Ok(()) => {
                    summary.retried += 1;
                    summary.translated.push(unit.output.clone());
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    error!("Final failure: {}: {}", Self::display_name(&unit.source), e);
                    return Err(AppError::PersistentFailure(unit.source));
                }
            }
        }

        info!(
            "Folder processing completed in {}: {}",
            Self::format_duration(start_time.elapsed()),
            summary
        );
        Ok(summary)
    }

    /// Translate one file and write its output
    async fn process_file(&self, unit: &WorkUnit, multi_progress: &MultiProgress) -> Result<(), AppError> {
        let content = self.fs.read_to_string(&unit.source)?;
        let subtitles = SubtitleCollection::parse(&unit.source, &content)?;
        if subtitles.entries.is_empty() {
            warn!("No cues in {:?}", unit.source);
        }

        let batches = subtitles.text_batches(self.config.translation.common.batch_size);
        let progress_bar = multi_progress.add(ProgressBar::new(batches.len() as u64));
        progress_bar.set_style(Self::bar_style("batches"));
        progress_bar.set_message(Self::display_name(&unit.source));

        let mut translated = Vec::with_capacity(subtitles.entries.len());
        for (index, batch) in batches.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(self.config.translation.common.batch_delay()).await;
            }

            match self.translator.try_translate(batch).await {
                Ok(lines) => translated.extend(lines),
                Err(e) => {
                    progress_bar.abandon();
                    multi_progress.remove(&progress_bar);
                    return Err(e.into());
                }
            }
            progress_bar.inc(1);
        }
        progress_bar.finish_and_clear();
        multi_progress.remove(&progress_bar);

        let output = subtitles.with_translations(translated)?;
        self.fs.write_atomic(&unit.output, &output.render())?;
        info!("Saved {}", Self::display_name(&unit.output));

        Ok(())
    }

    // Format duration in a human-readable format
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
