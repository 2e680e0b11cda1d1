/*!
 * Bidirectional text handling for translated subtitle lines.
 *
 * Right-to-left lines are wrapped in an explicit embedding so that players
 * keep punctuation and embedded Latin terms in the right place.
 */

/// RIGHT-TO-LEFT EMBEDDING
pub const RLE: char = '\u{202B}';

/// POP DIRECTIONAL FORMATTING
pub const PDF: char = '\u{202C}';

/// RIGHT-TO-LEFT MARK
pub const RLM: char = '\u{200F}';

/// Whether `c` is one of the bidi controls this module emits or recognizes
pub fn is_bidi_control(c: char) -> bool {
    matches!(c, RLE | PDF | RLM)
}

/// Remove every bidi control from `text`
pub fn strip_bidi_controls(text: &str) -> String {
    text.chars().filter(|c| !is_bidi_control(*c)).collect()
}

/// Wrap `text` in a single right-to-left embedding
///
/// Controls already present are stripped first, so wrapping is idempotent.
pub fn wrap_rtl(text: &str) -> String {
    let inner = strip_bidi_controls(text);
    let mut wrapped = String::with_capacity(inner.len() + 6);
    wrapped.push(RLE);
    wrapped.push_str(&inner);
    wrapped.push(PDF);
    wrapped
}
