/*!
 * Per-line heuristics used by the translation validator.
 *
 * Technical subtitles often contain source code, shell commands and
 * identifiers that must stay untranslated; those lines are recognized here so
 * they are not held against a translation.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Structural punctuation that rarely appears in prose
static CODE_PUNCTUATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[{}=<>\[\]`]|;\s*$|::|->|=>|\w\(\)|\.\w+\(").expect("valid code punctuation regex")
});

/// Statement and command shapes; a keyword alone is not enough
static CODE_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^\s*(?:",
        r"\$\s",
        r"|#include\b",
        r"|(?:import|from)\s+[\w.]+(?:\s+import\b|\s+as\s+\w+|\s*;?\s*$)",
        r"|(?:def|fn|function|class|struct|enum|interface)\s+\w+\s*[(:{<]",
        r"|(?:const|let|var)\s+(?:mut\s+)?\w+\s*[:=]",
        r"|(?:if|for|while|switch|catch)\s*\(",
        r"|(?:pub|public|private|protected)\s+(?:fn|class|struct|static|void|def|enum|async)\b",
        r"|(?:SELECT|INSERT INTO|UPDATE|DELETE FROM|CREATE TABLE)\b",
        r"|(?:npm|npx|pip3?|yarn|git|cargo|docker|sudo)\s+(?:install|uninstall|init|run|add|remove|commit|push|pull|clone|checkout|build|test|start|exec|compose|status|new|i)\b",
        r"|cd\s+[~./\w-]*[/~.][\w./~-]*\s*$",
        r"|(?:python3?|node)\s+[\w./-]+\.(?:py|js|mjs|ts)\b",
        r")",
    ))
    .expect("valid code prefix regex")
});

/// Number of whitespace-separated tokens
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Whether a line looks like source code or a shell command rather than prose
pub fn is_code_like(text: &str) -> bool {
    CODE_PUNCTUATION.is_match(text) || CODE_PREFIX.is_match(text)
}

/// Whether two lines are the same text, ignoring surrounding whitespace and case
pub fn is_same_text(original: &str, translated: &str) -> bool {
    original.trim().to_lowercase() == translated.trim().to_lowercase()
}
