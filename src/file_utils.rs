use anyhow::{Context, Result, anyhow};
use log::debug;
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

use crate::errors::AppError;
use crate::subtitle_processor::SubtitleFormat;

// @module: Filesystem access for scanning, renaming and writing subtitle files

/// Filesystem operations the pipeline needs
///
/// Classification, migration and planning only go through this trait so they
/// can run against an in-memory tree in tests.
pub trait FileSystem: Send + Sync {
    /// Regular files directly inside `dir`, sorted by path
    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>>;

    /// Whether anything exists at `path`
    fn exists(&self, path: &Path) -> bool;

    /// Whether `path` is a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Read a UTF-8 file
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Replace the content of `path` in a single step
    fn write_atomic(&self, path: &Path, content: &str) -> Result<()>;

    /// Rename without any destination check
    fn rename_unchecked(&self, from: &Path, to: &Path) -> Result<()>;

    /// Rename, refusing to replace an existing destination
    fn rename_no_clobber(&self, from: &Path, to: &Path) -> Result<(), AppError> {
        if self.exists(to) {
            return Err(AppError::RenameConflict {
                from: from.to_path_buf(),
                to: to.to_path_buf(),
            });
        }
        debug!("Renaming {:?} -> {:?}", from, to);
        self.rename_unchecked(from, to)
            .map_err(|e| AppError::File(format!("{:#}", e)))
    }

    /// Subtitle files directly inside `dir`
    fn list_subtitle_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        Ok(self
            .list_files(dir)?
            .into_iter()
            .filter(|p| SubtitleFormat::from_path(p).is_some())
            .collect())
    }
}

// @struct: Local disk implementation
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry.context("Failed to read directory entry")?;
            if entry.file_type().is_file() {
                result.push(entry.into_path());
            }
        }

        Ok(result)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))
    }

    fn write_atomic(&self, path: &Path, content: &str) -> Result<()> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp = NamedTempFile::new_in(parent)
            .with_context(|| format!("Failed to create temporary file in {:?}", parent))?;
        temp.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write temporary file for {:?}", path))?;
        temp.flush()?;
        temp.persist(path)
            .map_err(|e| anyhow!("Failed to move output into place at {:?}: {}", path, e))?;

        Ok(())
    }

    fn rename_unchecked(&self, from: &Path, to: &Path) -> Result<()> {
        fs::rename(from, to).with_context(|| format!("Failed to rename {:?} to {:?}", from, to))
    }
}

// @struct: In-memory implementation for tests
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: Mutex<BTreeMap<PathBuf, String>>,
    dirs: Mutex<BTreeSet<PathBuf>>,
}

impl MemoryFileSystem {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directory
    pub fn add_dir<P: AsRef<Path>>(&self, path: P) {
        self.dirs.lock().insert(path.as_ref().to_path_buf());
    }

    /// Add or replace a file, registering its parent directory
    pub fn add_file<P: AsRef<Path>>(&self, path: P, content: &str) {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            self.add_dir(parent);
        }
        self.files.lock().insert(path.to_path_buf(), content.to_string());
    }

    /// Content of a file, if present
    pub fn content<P: AsRef<Path>>(&self, path: P) -> Option<String> {
        self.files.lock().get(path.as_ref()).cloned()
    }

    /// Every file path, sorted
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.lock().keys().cloned().collect()
    }
}

impl FileSystem for MemoryFileSystem {
    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if !self.is_dir(dir) {
            return Err(anyhow!("Not a directory: {:?}", dir));
        }
        Ok(self
            .files
            .lock()
            .keys()
            .filter(|p| p.parent() == Some(dir))
            .cloned()
            .collect())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.lock().contains_key(path) || self.is_dir(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.lock().contains(path)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.content(path)
            .ok_or_else(|| anyhow!("Failed to read file: {:?}", path))
    }

    fn write_atomic(&self, path: &Path, content: &str) -> Result<()> {
        self.add_file(path, content);
        Ok(())
    }

    fn rename_unchecked(&self, from: &Path, to: &Path) -> Result<()> {
        let mut files = self.files.lock();
        let content = files
            .remove(from)
            .ok_or_else(|| anyhow!("Failed to rename {:?}: no such file", from))?;
        files.insert(to.to_path_buf(), content);
        Ok(())
    }
}
