use anyhow::{Context, Result, anyhow};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};

// @module: Subtitle parsing and serialization for SRT and WebVTT

// @const: Cue timing line, with optional trailing cue settings
static TIMING_LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\S+)\s+-->\s+(\S+)(?:\s+(.*))?$").unwrap()
});

// @const: HH:MM:SS,mmm or HH:MM:SS.mmm, hours optional for WebVTT
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(\d+):)?(\d{2}):(\d{2})[.,](\d{3})$").unwrap()
});

/// Style block that makes players render cues right-to-left
pub const VTT_RTL_HEADER: &str =
    "WEBVTT\n\nSTYLE\n::cue {\n  direction: rtl;\n  text-align: right;\n}\n\n";

/// Cue setting appended to every translated WebVTT cue
pub const VTT_RTL_CUE_SETTINGS: &str = "align:right";

/// Handled subtitle formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleFormat {
    /// SubRip
    Srt,
    /// WebVTT
    Vtt,
}

impl SubtitleFormat {
    /// Detect the format from a file extension, case-insensitively
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "srt" => Some(Self::Srt),
            "vtt" => Some(Self::Vtt),
            _ => None,
        }
    }

    /// Canonical lowercase extension
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Srt => "srt",
            Self::Vtt => "vtt",
        }
    }
}

// @struct: Single subtitle entry
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleEntry {
    // @field: Sequence number
    pub seq_num: usize,

    // @field: Start time in ms
    pub start_time_ms: u64,

    // @field: End time in ms
    pub end_time_ms: u64,

    // @field: Subtitle text, possibly multi-line or empty
    pub text: String,
}

impl SubtitleEntry {
    /// Creates a new subtitle entry
    pub fn new(seq_num: usize, start_time_ms: u64, end_time_ms: u64, text: String) -> Self {
        SubtitleEntry {
            seq_num,
            start_time_ms,
            end_time_ms,
            text,
        }
    }

    // @creates: Validated subtitle entry
    // @validates: Time range
    pub fn new_validated(seq_num: usize, start_time_ms: u64, end_time_ms: u64, text: String) -> Result<Self> {
        if end_time_ms < start_time_ms {
            return Err(anyhow!(
                "Invalid time range: end time {} < start time {}",
                end_time_ms, start_time_ms
            ));
        }

        Ok(SubtitleEntry {
            seq_num,
            start_time_ms,
            end_time_ms,
            text: text.trim().to_string(),
        })
    }

    /// Parse an SRT or WebVTT timestamp to milliseconds
    pub fn parse_timestamp(timestamp: &str) -> Result<u64> {
        let caps = TIMESTAMP_REGEX
            .captures(timestamp.trim())
            .ok_or_else(|| anyhow!("Invalid timestamp format: {}", timestamp))?;

        let hours: u64 = match caps.get(1) {
            Some(m) => m.as_str().parse().context("Failed to parse hours")?,
            None => 0,
        };
        let minutes: u64 = caps[2].parse().context("Failed to parse minutes")?;
        let seconds: u64 = caps[3].parse().context("Failed to parse seconds")?;
        let millis: u64 = caps[4].parse().context("Failed to parse milliseconds")?;

        if minutes >= 60 || seconds >= 60 {
            return Err(anyhow!("Invalid time components in timestamp: {}", timestamp));
        }

        Ok(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        Self::format_with_separator(ms, ',')
    }

    /// Format a timestamp in milliseconds to WebVTT format (HH:MM:SS.mmm)
    pub fn format_vtt_timestamp(ms: u64) -> String {
        Self::format_with_separator(ms, '.')
    }

    fn format_with_separator(ms: u64, separator: char) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02}{}{:03}", hours, minutes, seconds, separator, millis)
    }

    /// Convert start time to formatted SRT timestamp
    pub fn format_start_time(&self) -> String {
        Self::format_timestamp(self.start_time_ms)
    }

    /// Convert end time to formatted SRT timestamp
    pub fn format_end_time(&self) -> String {
        Self::format_timestamp(self.end_time_ms)
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.seq_num)?;
        writeln!(f, "{} --> {}", self.format_start_time(), self.format_end_time())?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Collection of subtitle entries with metadata
#[derive(Debug, Clone)]
pub struct SubtitleCollection {
    /// Source filename
    pub source_file: PathBuf,

    /// Detected format
    pub format: SubtitleFormat,

    /// List of subtitle entries, in file order
    pub entries: Vec<SubtitleEntry>,
}

impl SubtitleCollection {
    /// Create an empty subtitle collection
    pub fn new(source_file: PathBuf, format: SubtitleFormat) -> Self {
        SubtitleCollection {
            source_file,
            format,
            entries: Vec::new(),
        }
    }

    /// Parse file content, detecting the format from the file name
    pub fn parse<P: AsRef<Path>>(source_file: P, content: &str) -> Result<Self> {
        let source_file = source_file.as_ref();
        let format = SubtitleFormat::from_path(source_file)
            .ok_or_else(|| anyhow!("Unsupported subtitle file: {}", source_file.display()))?;

        let entries = match format {
            SubtitleFormat::Srt => Self::parse_srt_string(content),
            SubtitleFormat::Vtt => Self::parse_vtt_string(content),
        }
        .with_context(|| format!("Failed to parse {}", source_file.display()))?;

        debug!("Parsed {} cues from {}", entries.len(), source_file.display());

        Ok(SubtitleCollection {
            source_file: source_file.to_path_buf(),
            format,
            entries,
        })
    }

    /// Cue texts in order
    pub fn texts(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.text.clone()).collect()
    }

    /// Cue texts split into consecutive batches of at most `batch_size`
    pub fn text_batches(&self, batch_size: usize) -> Vec<Vec<String>> {
        self.texts()
            .chunks(batch_size.max(1))
            .map(|chunk| chunk.to_vec())
            .collect()
    }

    /// Copy of this collection with every cue text replaced, index-aligned
    pub fn with_translations(&self, translations: Vec<String>) -> Result<Self> {
        if translations.len() != self.entries.len() {
            return Err(anyhow!(
                "Got {} translated lines for {} cues",
                translations.len(),
                self.entries.len()
            ));
        }

        let entries = self
            .entries
            .iter()
            .zip(translations)
            .map(|(entry, text)| SubtitleEntry { text, ..entry.clone() })
            .collect();

        Ok(SubtitleCollection {
            source_file: self.source_file.clone(),
            format: self.format,
            entries,
        })
    }

    /// Serialize in the collection's own format
    pub fn render(&self) -> String {
        match self.format {
            SubtitleFormat::Srt => self.to_srt_string(),
            SubtitleFormat::Vtt => self.to_vtt_string(),
        }
    }

    /// Serialize as SRT, renumbering from 1
    pub fn to_srt_string(&self) -> String {
        let mut out = String::new();
        for (i, entry) in self.entries.iter().enumerate() {
            let numbered = SubtitleEntry { seq_num: i + 1, ..entry.clone() };
            out.push_str(&numbered.to_string());
        }
        out
    }

    /// Serialize as right-to-left WebVTT
    pub fn to_vtt_string(&self) -> String {
        let mut out = String::from(VTT_RTL_HEADER);
        for entry in &self.entries {
            out.push_str(&format!(
                "{} --> {} {}\n{}\n\n",
                SubtitleEntry::format_vtt_timestamp(entry.start_time_ms),
                SubtitleEntry::format_vtt_timestamp(entry.end_time_ms),
                VTT_RTL_CUE_SETTINGS,
                entry.text
            ));
        }
        out
    }

    /// Split content into blank-line separated blocks of lines
    fn blocks(content: &str) -> Vec<Vec<&str>> {
        let content = content.trim_start_matches('\u{FEFF}');
        let mut blocks = Vec::new();
        let mut current = Vec::new();

        for line in content.lines() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                if !current.is_empty() {
                    blocks.push(std::mem::take(&mut current));
                }
            } else {
                current.push(line);
            }
        }
        if !current.is_empty() {
            blocks.push(current);
        }
        blocks
    }

    /// Parse a timing line into start and end milliseconds
    fn parse_timing_line(line: &str) -> Result<(u64, u64)> {
        let caps = TIMING_LINE_REGEX
            .captures(line)
            .ok_or_else(|| anyhow!("Malformed timing line: {}", line.trim()))?;
        let start = SubtitleEntry::parse_timestamp(&caps[1])?;
        let end = SubtitleEntry::parse_timestamp(&caps[2])?;
        Ok((start, end))
    }

    /// Build an entry from a block whose timing line is at `timing_idx`
    ///
    /// A cue that cannot be timed fails the whole file.
    fn entry_from_block(block: &[&str], timing_idx: usize, seq_num: usize) -> Result<SubtitleEntry> {
        let (start, end) = Self::parse_timing_line(block[timing_idx])
            .with_context(|| format!("Invalid timing in cue {}", seq_num))?;

        let text = block[timing_idx + 1..]
            .iter()
            .map(|l| l.trim())
            .collect::<Vec<_>>()
            .join("\n");

        SubtitleEntry::new_validated(seq_num, start, end, text)
            .with_context(|| format!("Invalid cue {}", seq_num))
    }

    /// Parse SRT format string into subtitle entries
    pub fn parse_srt_string(content: &str) -> Result<Vec<SubtitleEntry>> {
        let mut entries = Vec::new();

        for block in Self::blocks(content) {
            // Sequence number line is optional in the wild
            let timing_idx = if block.len() > 1 && block[0].trim().parse::<usize>().is_ok() {
                1
            } else {
                0
            };

            if !block[timing_idx].contains("-->") {
                warn!("Unexpected text before a timing line: {}", block[0]);
                continue;
            }

            entries.push(Self::entry_from_block(&block, timing_idx, entries.len() + 1)?);
        }

        if entries.is_empty() && !content.trim().is_empty() {
            return Err(anyhow!("No valid subtitle entries were found in the SRT content"));
        }

        Ok(entries)
    }

    /// Parse WebVTT format string into subtitle entries
    pub fn parse_vtt_string(content: &str) -> Result<Vec<SubtitleEntry>> {
        let blocks = Self::blocks(content);
        let header = blocks
            .first()
            .and_then(|b| b.first())
            .ok_or_else(|| anyhow!("Empty WebVTT content"))?;
        if !header.starts_with("WEBVTT") {
            return Err(anyhow!("Missing WEBVTT header"));
        }

        let mut entries = Vec::new();
        for block in blocks.iter().skip(1) {
            let timing_idx = if block[0].contains("-->") {
                0
            } else if block.len() > 1 && block[1].contains("-->") {
                // Cue identifier on the first line
                1
            } else {
                // NOTE, STYLE and REGION blocks
                debug!("Skipping non-cue block starting with: {}", block[0]);
                continue;
            };

            entries.push(Self::entry_from_block(block, timing_idx, entries.len() + 1)?);
        }

        Ok(entries)
    }
}

impl fmt::Display for SubtitleCollection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Collection")?;
        writeln!(f, "Source: {:?}", self.source_file)?;
        writeln!(f, "Format: {}", self.format.extension())?;
        writeln!(f, "Entries: {}", self.entries.len())?;
        Ok(())
    }
}
