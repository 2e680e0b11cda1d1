//! Language utilities for ISO language code handling
//!
//! This module provides functions for normalizing and matching ISO 639-1
//! (2-letter) and ISO 639-2 (3-letter) language codes, and for mapping a
//! language to the writing system its translations are expected to use.

use anyhow::{Result, anyhow};
use isolang::Language;

/// ISO 639-2/B codes that differ from their 639-2/T counterpart
fn bibliographic_to_terminology(code: &str) -> Option<&'static str> {
    match code {
        "fre" => Some("fra"),
        "ger" => Some("deu"),
        "dut" => Some("nld"),
        "gre" => Some("ell"),
        "chi" => Some("zho"),
        "cze" => Some("ces"),
        "ice" => Some("isl"),
        "alb" => Some("sqi"),
        "arm" => Some("hye"),
        "baq" => Some("eus"),
        "bur" => Some("mya"),
        "per" => Some("fas"),
        "geo" => Some("kat"),
        "may" => Some("msa"),
        "mac" => Some("mkd"),
        "rum" => Some("ron"),
        "slo" => Some("slk"),
        "wel" => Some("cym"),
        _ => None,
    }
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    if normalized_code.len() == 2 {
        if let Some(lang) = Language::from_639_1(&normalized_code) {
            return Ok(lang.to_639_3().to_string());
        }
    } else if normalized_code.len() == 3 {
        if Language::from_639_3(&normalized_code).is_some() {
            return Ok(normalized_code);
        }
        if let Some(part2t) = bibliographic_to_terminology(&normalized_code) {
            return Ok(part2t.to_string());
        }
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Normalize a language code to ISO 639-1 (2-letter) format if possible
/// Falls back to ISO 639-2/T if no ISO 639-1 code exists
pub fn normalize_to_part1_or_part2t(code: &str) -> Result<String> {
    let part2t = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&part2t)
        .ok_or_else(|| anyhow!("Cannot normalize invalid language code: {}", code))?;

    Ok(lang
        .to_639_1()
        .map(|c| c.to_string())
        .unwrap_or(part2t))
}

/// Check if two language codes match (represent the same language)
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (normalize_to_part2t(code1), normalize_to_part2t(code2)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Get the language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}

/// Writing system expected in text of a given language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    /// Arabic script (Arabic, Persian, Urdu, Pashto, Kurdish Sorani)
    Arabic,
    /// Hebrew script (Hebrew, Yiddish)
    Hebrew,
    /// Anything that is not plain ASCII; used for targets without a dedicated table
    NonAscii,
}

impl Script {
    /// Whether `c` belongs to this script
    pub fn contains(&self, c: char) -> bool {
        match self {
            Self::Arabic => matches!(
                c,
                '\u{0600}'..='\u{06FF}'
                    | '\u{0750}'..='\u{077F}'
                    | '\u{08A0}'..='\u{08FF}'
                    | '\u{FB50}'..='\u{FDFF}'
                    | '\u{FE70}'..='\u{FEFC}'
            ),
            Self::Hebrew => matches!(c, '\u{0590}'..='\u{05FF}' | '\u{FB1D}'..='\u{FB4F}'),
            Self::NonAscii => c.is_alphabetic() && !c.is_ascii(),
        }
    }

    /// Whether any character of `text` belongs to this script
    pub fn appears_in(&self, text: &str) -> bool {
        text.chars().any(|c| self.contains(c))
    }

    /// Whether the script is written right-to-left
    pub fn is_rtl(&self) -> bool {
        matches!(self, Self::Arabic | Self::Hebrew)
    }
}

/// Map a language code to the script its text is written in
pub fn script_for_language(code: &str) -> Script {
    let normalized = normalize_to_part1_or_part2t(code).unwrap_or_else(|_| code.to_lowercase());

    match normalized.as_str() {
        "ar" | "fa" | "ur" | "ps" | "ku" | "sd" | "ug" => Script::Arabic,
        "he" | "yi" => Script::Hebrew,
        _ => Script::NonAscii,
    }
}
