/*!
 * File roles inside a subtitle folder.
 *
 * Each subtitle file is classified from its content first and its name
 * second:
 * - `stem_en.ext` untranslated: a tagged source, translated into `stem.ext`
 * - `stem.ext` untranslated: a raw source, renamed to `stem_en.ext` first
 *   (an untranslated `stem_ar.ext` is a raw source of `stem.ext`)
 * - translated content: an output, left alone
 * - translated content named `stem_ar.ext`: output of an older naming
 *   scheme, migrated to `stem.ext`
 *
 * Roles are recomputed on every run, which makes the whole pipeline
 * idempotent. Every rename checks its destination first and never overwrites.
 */

use anyhow::Result;
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::app_config::NamingConfig;
use crate::errors::AppError;
use crate::file_utils::FileSystem;
use crate::language_utils::Script;
use crate::translation::formatting::is_bidi_control;

/// RTL styling directive as written in WebVTT style blocks
static RTL_DIRECTIVE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)direction\s*:\s*rtl").unwrap());

/// Role of a subtitle file within its folder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRole {
    /// Untranslated file without the source tag
    RawSource,
    /// Untranslated file carrying the source tag
    TaggedSource,
    /// Translated file in the current naming scheme
    TranslatedOutput,
    /// Translated file still carrying a legacy target tag
    LegacyTranslatedOutput,
}

impl fmt::Display for FileRole {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::RawSource => "raw source",
            Self::TaggedSource => "tagged source",
            Self::TranslatedOutput => "translated output",
            Self::LegacyTranslatedOutput => "legacy translated output",
        };
        write!(f, "{}", name)
    }
}

/// Why a file needs no work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// A translation already exists
    AlreadyTranslated,
    /// A legacy output could not be migrated
    LegacyConflict,
}

/// What the pipeline will do with a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedAction {
    /// Translate the file in place as a source
    Translate {
        /// An untranslated file sits in the output slot and will be replaced
        overwrite: bool,
    },
    /// Rename the file to its tagged name, then translate into the original name
    RenameThenTranslate {
        /// Name the source is moved to
        tagged: PathBuf,
    },
    /// Nothing to do
    Skip(SkipReason),
}

/// One decision of the planner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineItem {
    /// File the decision is about
    pub path: PathBuf,
    /// Its role
    pub role: FileRole,
    /// Where the translation is (or will be) written
    pub output_path: PathBuf,
    /// What to do
    pub action: PlannedAction,
}

impl PipelineItem {
    /// Whether the item requires a translation
    pub fn needs_translation(&self) -> bool {
        !matches!(self.action, PlannedAction::Skip(_))
    }
}

/// A rename that was performed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// A legacy file that could not be migrated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationConflict {
    /// Legacy file left in place
    pub path: PathBuf,
    /// Human-readable explanation
    pub reason: String,
}

/// Result of a migration pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Renames performed, in order
    pub renames: Vec<Rename>,
    /// Legacy files left untouched
    pub conflicts: Vec<MigrationConflict>,
}

impl MigrationReport {
    /// Number of legacy outputs moved to their current name
    pub fn migrated_count(&self) -> usize {
        self.renames.len()
    }

    fn conflict(&mut self, path: &Path, reason: String) {
        warn!("Leaving {:?} in place: {}", path, reason);
        self.conflicts.push(MigrationConflict {
            path: path.to_path_buf(),
            reason,
        });
    }
}

/// Whether subtitle content already holds a translation into `script`
pub fn looks_translated(content: &str, script: Script) -> bool {
    RTL_DIRECTIVE_REGEX.is_match(content)
        || content.chars().any(is_bidi_control)
        || script.appears_in(content)
}

/// Split a file name into stem and extension, both as written
fn split_name(path: &Path) -> Option<(&str, &str)> {
    let stem = path.file_stem()?.to_str()?;
    let ext = path.extension()?.to_str()?;
    Some((stem, ext))
}

/// `stem` without `tag` at its end, case-insensitively; never empty
fn strip_tag<'a>(stem: &'a str, tag: &str) -> Option<&'a str> {
    let cut = stem.len().checked_sub(tag.len())?;
    if cut == 0 || !stem.is_char_boundary(cut) {
        return None;
    }
    stem[cut..].eq_ignore_ascii_case(tag).then(|| &stem[..cut])
}

/// Classifies, migrates and plans the subtitle files of a folder
#[derive(Debug, Clone)]
pub struct RoleClassifier {
    naming: NamingConfig,
    script: Script,
}

impl RoleClassifier {
    /// Create a classifier for the given naming scheme and target script
    pub fn new(naming: NamingConfig, script: Script) -> Self {
        Self { naming, script }
    }

    /// Whether subtitle content already holds a translation
    pub fn looks_translated(&self, content: &str) -> bool {
        looks_translated(content, self.script)
    }

    fn sibling(path: &Path, stem: &str, ext: &str) -> PathBuf {
        path.with_file_name(format!("{}.{}", stem, ext))
    }

    /// Whether the file name carries the source tag
    pub fn has_source_tag(&self, path: &Path) -> bool {
        split_name(path)
            .and_then(|(stem, _)| strip_tag(stem, &self.naming.source_tag))
            .is_some()
    }

    /// `x_ar.ext` -> `x.ext`, for any legacy tag
    pub fn untagged_path(&self, path: &Path) -> Option<PathBuf> {
        let (stem, ext) = split_name(path)?;
        self.naming
            .legacy_target_tags
            .iter()
            .find_map(|tag| strip_tag(stem, tag))
            .map(|base| Self::sibling(path, base, ext))
    }

    /// `x.ext` -> `x_en.ext`
    pub fn tagged_source_path(&self, path: &Path) -> Option<PathBuf> {
        let (stem, ext) = split_name(path)?;
        Some(Self::sibling(path, &format!("{}{}", stem, self.naming.source_tag), ext))
    }

    /// `x_en.ext` -> `x.ext`, and `x_ar_en.ext` -> `x.ext`
    ///
    /// Outputs never carry a legacy tag, or the next run would migrate them away.
    pub fn output_path(&self, source: &Path) -> Option<PathBuf> {
        let (stem, ext) = split_name(source)?;
        let base = strip_tag(stem, &self.naming.source_tag)?;
        let base = self
            .naming
            .legacy_target_tags
            .iter()
            .find_map(|tag| strip_tag(base, tag))
            .unwrap_or(base);
        Some(Self::sibling(source, base, ext))
    }

    /// Role of a file given its content
    pub fn classify_content(&self, path: &Path, content: &str) -> FileRole {
        if self.looks_translated(content) {
            if self.untagged_path(path).is_some() {
                FileRole::LegacyTranslatedOutput
            } else {
                FileRole::TranslatedOutput
            }
        } else if self.has_source_tag(path) {
            FileRole::TaggedSource
        } else {
            FileRole::RawSource
        }
    }

    /// Role of a file, reading its content
    pub fn classify(&self, fs: &dyn FileSystem, path: &Path) -> Result<FileRole> {
        let content = fs.read_to_string(path)?;
        Ok(self.classify_content(path, &content))
    }

    /// Whether the file at `path` exists and already holds a translation
    fn is_translated_file(&self, fs: &dyn FileSystem, path: &Path) -> Result<bool> {
        Ok(self.looks_translated(&fs.read_to_string(path)?))
    }

    /// Move legacy outputs to the current naming scheme
    pub fn migrate_legacy(&self, fs: &dyn FileSystem, dir: &Path) -> Result<MigrationReport> {
        let mut report = MigrationReport::default();

        for path in fs.list_subtitle_files(dir)? {
            // Earlier iterations may have moved this file
            if !fs.exists(&path) {
                continue;
            }

            match self.classify(fs, &path) {
                Ok(FileRole::LegacyTranslatedOutput) => {}
                Ok(_) => continue,
                Err(e) => {
                    warn!("Cannot classify {:?}: {:#}", path, e);
                    continue;
                }
            }

            let Some(untagged) = self.untagged_path(&path) else {
                continue;
            };

            if fs.exists(&untagged) {
                match self.is_translated_file(fs, &untagged) {
                    Ok(true) => {
                        report.conflict(&path, format!("{:?} is already translated", untagged));
                        continue;
                    }
                    Ok(false) => {}
                    Err(e) => {
                        report.conflict(&path, format!("cannot read {:?}: {:#}", untagged, e));
                        continue;
                    }
                }

                let Some(tagged) = self.tagged_source_path(&untagged) else {
                    continue;
                };
                match fs.rename_no_clobber(&untagged, &tagged) {
                    Ok(()) => {
                        info!("Tagged source {:?} -> {:?}", untagged, tagged);
                        report.renames.push(Rename {
                            from: untagged.clone(),
                            to: tagged,
                        });
                    }
                    Err(e) => {
                        report.conflict(&path, e.to_string());
                        continue;
                    }
                }
            }

            match fs.rename_no_clobber(&path, &untagged) {
                Ok(()) => {
                    info!("Migrated {:?} -> {:?}", path, untagged);
                    report.renames.push(Rename {
                        from: path.clone(),
                        to: untagged,
                    });
                }
                Err(e) => report.conflict(&path, e.to_string()),
            }
        }

        Ok(report)
    }

    /// Decide what to do with every subtitle file of `dir`
    pub fn plan(&self, fs: &dyn FileSystem, dir: &Path) -> Result<Vec<PipelineItem>> {
        let mut items = Vec::new();

        for path in fs.list_subtitle_files(dir)? {
            let role = match self.classify(fs, &path) {
                Ok(role) => role,
                Err(e) => {
                    warn!("Skipping unreadable file {:?}: {:#}", path, e);
                    continue;
                }
            };

            let item = match role {
                FileRole::TaggedSource => {
                    let Some(output_path) = self.output_path(&path) else {
                        continue;
                    };
                    let action = if !fs.exists(&output_path) {
                        PlannedAction::Translate { overwrite: false }
                    } else if self.is_translated_file(fs, &output_path).unwrap_or(false) {
                        PlannedAction::Skip(SkipReason::AlreadyTranslated)
                    } else {
                        warn!(
                            "{:?} exists but is not translated; it will be replaced",
                            output_path
                        );
                        PlannedAction::Translate { overwrite: true }
                    };
                    PipelineItem { path, role, output_path, action }
                }
                FileRole::RawSource => {
                    // An untranslated `x_ar.ext` is a source; it becomes `x_en.ext` -> `x.ext`
                    let base = self.untagged_path(&path).unwrap_or_else(|| path.clone());
                    let Some(tagged) = self.tagged_source_path(&base) else {
                        continue;
                    };
                    if fs.exists(&tagged) {
                        if base == path {
                            debug!("{:?} is the output slot of {:?}", path, tagged);
                        } else {
                            warn!("Leaving {:?} alone: {:?} already exists", path, tagged);
                        }
                        continue;
                    }
                    if base != path && fs.exists(&base) {
                        warn!("Leaving {:?} alone: {:?} already exists", path, base);
                        continue;
                    }
                    PipelineItem {
                        output_path: base,
                        path,
                        role,
                        action: PlannedAction::RenameThenTranslate { tagged },
                    }
                }
                FileRole::TranslatedOutput => PipelineItem {
                    output_path: path.clone(),
                    path,
                    role,
                    action: PlannedAction::Skip(SkipReason::AlreadyTranslated),
                },
                FileRole::LegacyTranslatedOutput => PipelineItem {
                    output_path: path.clone(),
                    path,
                    role,
                    action: PlannedAction::Skip(SkipReason::LegacyConflict),
                },
            };

            items.push(item);
        }

        Ok(items)
    }

    /// Perform the renames an item needs and return the path to read from
    pub fn prepare(&self, fs: &dyn FileSystem, item: &PipelineItem) -> Result<PathBuf, AppError> {
        match &item.action {
            PlannedAction::Translate { .. } => Ok(item.path.clone()),
            PlannedAction::RenameThenTranslate { tagged } => {
                fs.rename_no_clobber(&item.path, tagged)?;
                info!("Renamed source {:?} -> {:?}", item.path, tagged);
                Ok(tagged.clone())
            }
            PlannedAction::Skip(reason) => Err(AppError::File(format!(
                "{:?} needs no work ({:?})",
                item.path, reason
            ))),
        }
    }
}
